use crate::core::binding::{PipelineFeatures, PipelineLayout};
use crate::core::rasterizer::CullMode;
use crate::io::config::Config;
use crate::io::image::save_rgba_image;
use crate::pipeline::passes::{post_process_to_rgba, render_main_pass, render_shadow_pass};
use crate::pipeline::renderer::Renderer;
use crate::scene::context::RenderContext;
use crate::scene::loader::init_scene_resources;
use anyhow::{Context, Result};
use log::{debug, info};
use std::time::Instant;

/// Renders one frame of `context` and returns it as RGBA8 rows, top first.
pub fn render_frame(config: &Config, context: &RenderContext) -> Result<Vec<u8>> {
    let mut renderer = Renderer::new(
        config.render.width,
        config.render.height,
        config.render.samples,
    );
    if config.shading.double_sided {
        renderer.rasterizer.set_cull_mode(CullMode::None);
    }

    let size = config.shading.shadow_map_size;
    let mut shadow_renderer = Renderer::new(size, size, 1).with_cull_mode(CullMode::None);

    let shadow_map = render_shadow_pass(config, context, &mut shadow_renderer)
        .context("shadow pass failed")?;
    if shadow_map.is_some() {
        debug!("Shadow pass completed.");
    }

    render_main_pass(config, context, &mut renderer, shadow_map.as_ref())
        .context("pipeline bindings do not match the layout")?;

    Ok(post_process_to_rgba(
        &renderer.framebuffer,
        config.render.exposure,
    ))
}

/// Runs the application in CLI mode (headless) for a single render.
pub fn run_cli(config: &Config) -> Result<()> {
    info!("Starting CLI mode...");
    let context = init_scene_resources(config);
    let start_time = Instant::now();

    let rgba = render_frame(config, &context)?;
    info!("Render completed in {:.2?}", start_time.elapsed());

    info!("Saving output to '{}'...", config.render.output);
    save_rgba_image(
        &rgba,
        config.render.width,
        config.render.height,
        &config.render.output,
    )
    .with_context(|| format!("failed to save '{}'", config.render.output))?;
    info!("Done.");
    Ok(())
}

/// Logs the binding table of every pipeline variant the config can produce.
pub fn print_layouts(config: &Config) {
    let shadowed = config.shading.use_shadows;
    let decomposed_transform = config.shading.decomposed_transform;
    for textured in [false, true] {
        let layout = PipelineLayout::new(PipelineFeatures {
            textured,
            shadowed,
            decomposed_transform,
        });
        info!(
            "Pipeline layout (textured: {}, shadowed: {}, decomposed: {}), {} set(s):\n{}",
            textured,
            shadowed,
            decomposed_transform,
            layout.set_count(),
            layout
        );
    }
}
