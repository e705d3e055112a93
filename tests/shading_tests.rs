//! Fragment stage tests
//!
//! Tests for:
//! - Base, offset and clamped light intensity
//! - Double-sided (absolute value) orientation independence
//! - Shadow depth comparison at and past the bias boundary
//! - End-to-end fragment colors, lit and shadowed

use forward_shading::core::uniforms::LightUniform;
use forward_shading::pipeline::fragment_stage::*;
use forward_shading::pipeline::vertex_stage::ForwardVarying;
use forward_shading::scene::texture::{DepthTexture, Sampler, Texture};
use nalgebra::{Matrix4, Point3, Vector2, Vector3, Vector4};

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-5;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec4_approx(a: Vector4<f32>, b: Vector4<f32>) -> bool {
    (0..4).all(|i| approx_eq(a[i], b[i]))
}

fn varying(normal: Vector3<f32>, world_pos: Point3<f32>) -> ForwardVarying {
    ForwardVarying {
        normal,
        uv: Vector2::new(0.5, 0.5),
        world_pos,
    }
}

// ============================================================================
// Intensity
// ============================================================================

#[test]
fn base_intensity_is_dot_of_reversed_light_and_normal() {
    let config = ShadingConfig::lambert(Facing::OneSided, 0.0);
    let light = Vector3::new(1.0, -1.0, 1.0);
    let normals = [
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(-1.0, 0.0, 0.0),
        Vector3::new(0.0, 0.0, -1.0),
        Vector3::new(1.0, 1.0, 0.0).normalize(),
    ];
    for n in normals {
        let expected = (-light.normalize()).dot(&n);
        assert!(approx_eq(light_intensity(&n, &light, &config), expected));
    }
}

#[test]
fn intensity_decreases_as_normal_turns_away_from_light() {
    let config = ShadingConfig::lambert(Facing::OneSided, 0.0);
    let light = Vector3::new(0.0, -1.0, 0.0);
    let mut previous = f32::INFINITY;
    for step in 0..=18 {
        let angle = (step as f32 * 10.0).to_radians();
        let n = Vector3::new(angle.sin(), angle.cos(), 0.0);
        let i = light_intensity(&n, &light, &config);
        assert!(i < previous + EPSILON, "not monotonic at {} degrees", step * 10);
        previous = i;
    }
}

#[test]
fn clamp_bounds_intensity() {
    let config = ShadingConfig::lambert(Facing::OneSided, 0.1).with_clamp(0.05, 1.0);
    let light = Vector3::new(1.0, -1.0, 1.0);
    for n in [Vector3::y(), -Vector3::y(), Vector3::x(), -Vector3::z()] {
        let i = light_intensity(&n, &light, &config);
        assert!((0.05..=1.0).contains(&i));
    }
}

#[test]
fn double_sided_lights_opposite_normals_equally() {
    let config = ShadingConfig::lambert(Facing::DoubleSided, 0.1);
    let light = Vector3::new(1.0, -1.0, 1.0);
    let n = Vector3::new(0.3, 0.8, -0.2).normalize();
    let front = light_intensity(&n, &light, &config);
    let back = light_intensity(&-n, &light, &config);
    assert!(approx_eq(front, back));
    assert!(front > 0.1);
}

#[test]
fn one_sided_back_face_goes_negative_without_clamp() {
    let config = ShadingConfig::lambert(Facing::OneSided, 0.0);
    let i = light_intensity(&Vector3::y(), &Vector3::y(), &config);
    assert!(approx_eq(i, -1.0));
}

// ============================================================================
// Shadow comparison
// ============================================================================

#[test]
fn depth_exactly_at_bias_boundary_is_lit() {
    let occluder = 0.42_f32;
    let bias = DEFAULT_SHADOW_BIAS;
    let boundary = occluder + bias;
    assert!(!is_shadowed(boundary, occluder, bias));
    assert!(is_shadowed(boundary + 1e-4, occluder, bias));
}

#[test]
fn nearer_fragment_is_never_shadowed() {
    assert!(!is_shadowed(0.1, 0.5, DEFAULT_SHADOW_BIAS));
}

#[test]
fn fragment_outside_shadow_map_is_lit() {
    let shadow = ShadowConfig::default();
    let config = ShadingConfig::shadowed(Facing::OneSided, shadow);
    let bindings = FragmentBindings {
        light: LightUniform::new(-Vector3::y()).with_light_space(Matrix4::identity()),
        diffuse: None,
        shadow_map: Some(DepthTexture::filled(4, 0.0)),
    };
    // x = 3 projects past the right edge of the map.
    let color = fragment_stage(&varying(Vector3::y(), Point3::new(3.0, 0.0, 0.5)), &bindings, &config);
    assert!(vec4_approx(color, Vector4::new(1.0, 1.0, 1.0, 1.0)));
}

// ============================================================================
// End to end
// ============================================================================

#[test]
fn untextured_unshadowed_fragment_with_darkening_offset() {
    let config = ShadingConfig::lambert(Facing::OneSided, -0.2);
    let bindings = FragmentBindings::new(LightUniform::new(Vector3::new(1.0, -1.0, 1.0)));

    let color = fragment_stage(&varying(Vector3::y(), Point3::origin()), &bindings, &config);

    // 1/sqrt(3) - 0.2
    let expected = 0.377_350_26;
    assert!(vec4_approx(color, Vector4::new(expected, expected, expected, 1.0)));
}

#[test]
fn shadowed_fragment_is_texture_color_times_floor() {
    let tex_color = Vector3::new(0.8, 0.4, 0.2);
    let config = ShadingConfig::shadowed(Facing::OneSided, ShadowConfig::default()).with_texture(true);
    let bindings = FragmentBindings {
        light: LightUniform::new(-Vector3::y()).with_light_space(Matrix4::identity()),
        diffuse: Some(DiffuseBinding {
            texture: Texture::solid(tex_color),
            sampler: Sampler::default(),
        }),
        shadow_map: Some(DepthTexture::filled(8, 0.2)),
    };

    // Light-space depth 0.5 * 0.5 + 0.5 = 0.75, behind the 0.2 occluder.
    // The normal faces the light head on, so the dot term alone would be 1.
    let color = fragment_stage(&varying(Vector3::y(), Point3::new(0.0, 0.0, 0.5)), &bindings, &config);

    let expected = tex_color * DEFAULT_SHADOW_FLOOR;
    assert!(vec4_approx(color, Vector4::new(expected.x, expected.y, expected.z, 1.0)));
}

#[test]
fn unoccluded_fragment_keeps_full_texture_color() {
    let tex_color = Vector3::new(0.8, 0.4, 0.2);
    let config = ShadingConfig::shadowed(Facing::OneSided, ShadowConfig::default()).with_texture(true);
    let bindings = FragmentBindings {
        light: LightUniform::new(-Vector3::y()).with_light_space(Matrix4::identity()),
        diffuse: Some(DiffuseBinding {
            texture: Texture::solid(tex_color),
            sampler: Sampler::default(),
        }),
        shadow_map: Some(DepthTexture::filled(8, 0.9)),
    };

    let color = fragment_stage(&varying(Vector3::y(), Point3::new(0.0, 0.0, 0.5)), &bindings, &config);
    assert!(vec4_approx(color, Vector4::new(0.8, 0.4, 0.2, 1.0)));
}

#[test]
fn textured_config_without_bound_texture_is_white() {
    let config = ShadingConfig::lambert(Facing::OneSided, 0.0).with_texture(true);
    let bindings = FragmentBindings::new(LightUniform::new(-Vector3::y()));
    let color = fragment_stage(&varying(Vector3::y(), Point3::origin()), &bindings, &config);
    assert!(vec4_approx(color, Vector4::new(1.0, 1.0, 1.0, 1.0)));
}

#[test]
fn alpha_is_always_one() {
    let config = ShadingConfig::lambert(Facing::OneSided, -0.2);
    let bindings = FragmentBindings::new(LightUniform::new(Vector3::y()));
    let color = fragment_stage(&varying(Vector3::y(), Point3::origin()), &bindings, &config);
    assert_eq!(color.w, 1.0);
}
