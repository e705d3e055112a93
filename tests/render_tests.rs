//! End-to-end frame tests through the software host.

use forward_shading::app::render_frame;
use forward_shading::core::color::linear_to_srgb8;
use forward_shading::core::rasterizer::CullMode;
use forward_shading::core::uniforms::LightUniform;
use forward_shading::io::config::Config;
use forward_shading::io::image::save_rgba_image;
use forward_shading::pipeline::fragment_stage::{
    is_shadowed, project_to_shadow_map, Facing, FragmentBindings, ShadingConfig, DEFAULT_SHADOW_BIAS,
};
use forward_shading::pipeline::passes::render_shadow_pass;
use forward_shading::pipeline::renderer::Renderer;
use forward_shading::pipeline::shaders::forward::ForwardShader;
use forward_shading::pipeline::vertex_stage::VertexBindings;
use forward_shading::scene::loader::init_scene_resources;
use forward_shading::scene::mesh::Mesh;
use nalgebra::{Point3, Vector3, Vector4};

fn small_config() -> Config {
    let mut config = Config::default();
    config.render.width = 48;
    config.render.height = 36;
    config.render.samples = 1;
    config.shading.shadow_map_size = 1024;
    config
}

fn background_rgba(config: &Config) -> [u8; 4] {
    let [r, g, b] = linear_to_srgb8(Vector3::from(config.render.background));
    [r, g, b, 255]
}

#[test]
fn frame_is_opaque_and_shows_geometry() {
    let config = small_config();
    let context = init_scene_resources(&config);
    let rgba = render_frame(&config, &context).unwrap();

    assert_eq!(rgba.len(), 48 * 36 * 4);
    assert!(rgba.chunks_exact(4).all(|p| p[3] == 255));

    let bg = background_rgba(&config);
    let covered = rgba.chunks_exact(4).filter(|p| p[..] != bg[..]).count();
    assert!(covered > 0);
}

#[test]
fn shadows_darken_part_of_the_frame() {
    let mut config = small_config();
    let context = init_scene_resources(&config);
    let shadowed = render_frame(&config, &context).unwrap();

    config.shading.use_shadows = false;
    let unshadowed = render_frame(&config, &context).unwrap();

    let luma = |p: &[u8]| p[0] as u32 + p[1] as u32 + p[2] as u32;
    let darker = shadowed
        .chunks_exact(4)
        .zip(unshadowed.chunks_exact(4))
        .filter(|(s, u)| luma(s) < luma(u))
        .count();
    assert!(darker > 0);
}

#[test]
fn shadow_map_lookup_matches_scene_geometry() {
    let config = small_config();
    let context = init_scene_resources(&config);
    let size = config.shading.shadow_map_size;
    let mut shadow_renderer = Renderer::new(size, size, 1).with_cull_mode(CullMode::None);
    let map = render_shadow_pass(&config, &context, &mut shadow_renderer)
        .unwrap()
        .unwrap();
    let light_space = context.light.light_space_matrix();

    let in_shadow = |p: Point3<f32>| {
        let coord = project_to_shadow_map(&p, &light_space).unwrap();
        is_shadowed(coord.depth, map.fetch(coord.uv), DEFAULT_SHADOW_BIAS)
    };

    // Light travels along (1,-1,1), so the cube casts onto +X/+Z ground.
    assert!(in_shadow(Point3::new(1.0, 0.0, 1.0)));
    assert!(!in_shadow(Point3::new(-1.5, 0.0, -1.5)));
    assert!(!in_shadow(Point3::new(0.0, 1.0, 0.0)));
}

#[test]
fn decomposed_and_combined_scenes_render_alike() {
    let mut config = small_config();
    config.shading.use_shadows = false;
    let combined = render_frame(&config, &init_scene_resources(&config)).unwrap();

    config.shading.decomposed_transform = true;
    let decomposed = render_frame(&config, &init_scene_resources(&config)).unwrap();

    let differing = combined
        .chunks_exact(4)
        .zip(decomposed.chunks_exact(4))
        .filter(|(a, b)| a != b)
        .count();
    // Rounding can move a handful of edge pixels.
    assert!(differing * 50 < 48 * 36, "{differing} pixels differ");
}

#[test]
fn full_screen_quad_takes_fragment_color() {
    // Plane facing +Z after rotating the XZ plane onto the view axis.
    let mut mesh = Mesh::plane(4.0);
    for v in &mut mesh.vertices {
        let (y, z) = (v.position.y, v.position.z);
        v.position.y = -z;
        v.position.z = y;
        v.normal = Vector3::z();
    }

    let shader = ForwardShader::new(
        VertexBindings::default(),
        FragmentBindings::new(LightUniform::new(Vector3::new(0.0, 0.0, -1.0))),
        ShadingConfig::lambert(Facing::OneSided, -0.2),
    );
    shader.validate().unwrap();

    let mut renderer = Renderer::new(4, 4, 1);
    renderer.clear(Vector4::zeros());
    renderer.draw_mesh(&mesh, &shader);

    for y in 0..4 {
        for x in 0..4 {
            let c = renderer.framebuffer.get_pixel(x, y).unwrap();
            assert!((c - Vector4::new(0.8, 0.8, 0.8, 1.0)).norm() < 1e-5);
        }
    }
}

#[test]
fn frame_saves_as_png() {
    let config = small_config();
    let rgba = render_frame(&config, &init_scene_resources(&config)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    save_rgba_image(&rgba, 48, 36, &path).unwrap();

    let loaded = image::open(&path).unwrap().to_rgba8();
    assert_eq!(loaded.dimensions(), (48, 36));
    assert_eq!(loaded.into_raw(), rgba);
}
