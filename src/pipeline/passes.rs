use crate::core::binding::LayoutError;
use crate::core::color::linear_to_srgb8;
use crate::core::framebuffer::FrameBuffer;
use crate::io::config::Config;
use crate::pipeline::fragment_stage::FragmentBindings;
use crate::pipeline::renderer::Renderer;
use crate::pipeline::shaders::forward::ForwardShader;
use crate::pipeline::shaders::shadow::ShadowCasterShader;
use crate::pipeline::vertex_stage::VertexBindings;
use crate::scene::context::RenderContext;
use crate::scene::texture::{DepthTexture, TextureError};
use log::{debug, info};
use nalgebra::{Vector3, Vector4};
use rayon::prelude::*;

/// Executes the Shadow Mapping Pass.
///
/// Texels no caster covered read as the far plane (1.0).
pub fn render_shadow_pass(
    config: &Config,
    context: &RenderContext,
    shadow_renderer: &mut Renderer,
) -> Result<Option<DepthTexture>, TextureError> {
    if !config.shading.use_shadows {
        return Ok(None);
    }

    let light_space = context.light.light_space_matrix();
    shadow_renderer.clear(Vector4::zeros());

    for obj in &context.scene_objects {
        let shader = ShadowCasterShader::new(obj.transform, light_space);
        shadow_renderer.draw_mesh(&obj.mesh, &shader);
    }

    let framebuffer = &shadow_renderer.framebuffer;
    let depths: Vec<f32> = framebuffer
        .depth_snapshot()
        .into_iter()
        .map(|d| if d.is_finite() { d } else { 1.0 })
        .collect();

    debug!(
        "Shadow pass: {}x{} depth map",
        framebuffer.buffer_width, framebuffer.buffer_height
    );
    DepthTexture::new(framebuffer.buffer_width, depths).map(Some)
}

/// Executes the Main Rendering Pass.
///
/// Each object's bindings are checked against its pipeline layout before
/// it is drawn.
pub fn render_main_pass(
    config: &Config,
    context: &RenderContext,
    renderer: &mut Renderer,
    shadow_map: Option<&DepthTexture>,
) -> Result<(), LayoutError> {
    let bg = Vector3::from(config.render.background);
    renderer.clear(Vector4::new(bg.x, bg.y, bg.z, 1.0));

    let shading = config.shading_config();
    let light = context
        .light
        .uniform(shading.shadow.is_some() && shadow_map.is_some());

    for (index, obj) in context.scene_objects.iter().enumerate() {
        let vertex = VertexBindings {
            transform: obj.transform,
            view: context.camera.view_uniform(),
            projection: context.camera.projection_uniform(),
        };
        let fragment = FragmentBindings {
            light,
            diffuse: obj.material.diffuse_binding(),
            shadow_map: shadow_map.cloned(),
        };

        let shader = ForwardShader::new(
            vertex,
            fragment,
            shading.with_texture(obj.material.is_textured()),
        );
        shader.validate()?;
        debug!(
            "Object {}: {} triangles, features {:?}",
            index,
            obj.mesh.triangle_count(),
            shader.layout().features()
        );

        renderer.draw_mesh(&obj.mesh, &shader);
    }

    info!("Main pass: {} object(s) drawn", context.scene_objects.len());
    Ok(())
}

/// Post-processing: Exposure -> sRGB -> RGBA8, row-major from the top.
pub fn post_process_to_rgba(framebuffer: &FrameBuffer, exposure: f32) -> Vec<u8> {
    let mut buffer = vec![0u8; framebuffer.width * framebuffer.height * 4];
    buffer
        .par_chunks_mut(framebuffer.width * 4)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
                if let Some(color) = framebuffer.get_pixel(x, y) {
                    let [r, g, b] = linear_to_srgb8(color.xyz() * exposure);
                    let a = (color.w.clamp(0.0, 1.0) * 255.0).round() as u8;
                    pixel.copy_from_slice(&[r, g, b, a]);
                }
            }
        });
    buffer
}
