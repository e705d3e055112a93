//! Lighting and shadow evaluation (fragment stage).
//!
//! One expression tree covers every variant: a signed or double-sided
//! Lambert term, an additive ambient offset, an optional clamp, an optional
//! shadow-map test and an optional diffuse texture. Disabled capabilities
//! are skipped, not duplicated.
//!
//! Shadow bias trades two artifacts against each other. Too small and a
//! surface shadows itself in a stipple pattern (acne); too large and shadows
//! detach from their casters and light leaks under contact points
//! (peter-panning). Neither is corrected here; the bias is configuration.

use crate::core::uniforms::LightUniform;
use crate::pipeline::vertex_stage::ForwardVarying;
use crate::scene::texture::{DepthTexture, Sampler, Texture};
use nalgebra::{Matrix4, Point3, Vector2, Vector3, Vector4};

pub const DEFAULT_SHADOW_BIAS: f32 = 0.001;
pub const DEFAULT_SHADOW_FLOOR: f32 = 0.05;
/// Largest PCF radius the stage honours; larger values are clamped to it.
pub const MAX_PCF_RADIUS: u32 = 8;

/// Whether back-facing normals receive light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// `dot(-L, N)`; faces pointing away go dark or negative.
    OneSided,
    /// `abs(dot(-L, N))`; both orientations are lit equally. For thin
    /// geometry whose winding is unreliable.
    DoubleSided,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensityClamp {
    pub min: f32,
    pub max: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowConfig {
    /// Added to the stored occluder depth before comparing.
    pub bias: f32,
    /// Intensity of a fully shadowed fragment.
    pub floor: f32,
    /// PCF kernel radius in texels; 0 takes one tap. Capped at
    /// [`MAX_PCF_RADIUS`].
    pub pcf_radius: u32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            bias: DEFAULT_SHADOW_BIAS,
            floor: DEFAULT_SHADOW_FLOOR,
            pcf_radius: 0,
        }
    }
}

/// Capability set of the fragment stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingConfig {
    pub facing: Facing,
    /// Added after the Lambert term (e.g. `0.1` floor, `-0.2` darkening).
    pub ambient: f32,
    pub clamp: Option<IntensityClamp>,
    pub shadow: Option<ShadowConfig>,
    pub textured: bool,
}

impl ShadingConfig {
    /// Lambert term plus an ambient offset, nothing else.
    pub fn lambert(facing: Facing, ambient: f32) -> Self {
        Self {
            facing,
            ambient,
            clamp: None,
            shadow: None,
            textured: false,
        }
    }

    /// Clamped to `[floor, 1]` with a shadow test whose shadowed value is
    /// that same floor.
    pub fn shadowed(facing: Facing, shadow: ShadowConfig) -> Self {
        Self {
            facing,
            ambient: 0.0,
            clamp: Some(IntensityClamp {
                min: shadow.floor,
                max: 1.0,
            }),
            shadow: Some(shadow),
            textured: false,
        }
    }

    pub fn with_texture(mut self, textured: bool) -> Self {
        self.textured = textured;
        self
    }

    pub fn with_clamp(mut self, min: f32, max: f32) -> Self {
        self.clamp = Some(IntensityClamp { min, max });
        self
    }
}

/// Diffuse texture plus its sampler, bound at set 4.
#[derive(Debug, Clone)]
pub struct DiffuseBinding {
    pub texture: Texture,
    pub sampler: Sampler,
}

/// Uniform sets 3, 4 and 5 as seen by the fragment stage.
#[derive(Debug, Clone)]
pub struct FragmentBindings {
    pub light: LightUniform,
    pub diffuse: Option<DiffuseBinding>,
    pub shadow_map: Option<DepthTexture>,
}

impl FragmentBindings {
    pub fn new(light: LightUniform) -> Self {
        Self {
            light,
            diffuse: None,
            shadow_map: None,
        }
    }
}

/// Scalar light intensity before shadowing.
///
/// `light_dir` is re-normalized here; a zero vector is a contract violation
/// and yields NaN.
pub fn light_intensity(normal: &Vector3<f32>, light_dir: &Vector3<f32>, config: &ShadingConfig) -> f32 {
    let to_light = -light_dir.normalize();
    let n_dot_l = to_light.dot(&normal.normalize());

    let lambert = match config.facing {
        Facing::OneSided => n_dot_l,
        Facing::DoubleSided => n_dot_l.abs(),
    };
    let intensity = lambert + config.ambient;

    match config.clamp {
        Some(IntensityClamp { min, max }) => intensity.clamp(min, max),
        None => intensity,
    }
}

/// A fragment is in shadow when its light-space depth is beyond the stored
/// occluder depth plus bias. Exactly at `occluder + bias` it is lit.
#[inline]
pub fn is_shadowed(fragment_depth: f32, occluder_depth: f32, bias: f32) -> bool {
    fragment_depth > occluder_depth + bias
}

/// Fragment position in shadow-map space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowCoord {
    /// Texel coordinate, origin at the top-left row the shadow pass writes first.
    pub uv: Vector2<f32>,
    /// Depth in [0, 1], same mapping as the rasterizer's depth buffer.
    pub depth: f32,
}

/// Projects a world position through the light-space matrix and remaps
/// x/y from [-1, 1] to [0, 1]. `None` when the point falls outside the
/// shadow map or past its far plane.
pub fn project_to_shadow_map(world_pos: &Point3<f32>, light_space: &Matrix4<f32>) -> Option<ShadowCoord> {
    let clip = light_space * world_pos.to_homogeneous();
    if clip.w.abs() < 1e-6 {
        return None;
    }
    let ndc = clip.xyz() / clip.w;

    let uv = Vector2::new(ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5);
    let depth = ndc.z * 0.5 + 0.5;

    let inside = (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y) && depth <= 1.0;
    inside.then_some(ShadowCoord { uv, depth })
}

/// Fraction of shadow-map taps that see the light: 1 lit, 0 shadowed.
pub fn shadow_visibility(coord: &ShadowCoord, map: &DepthTexture, config: &ShadowConfig) -> f32 {
    let radius = config.pcf_radius.min(MAX_PCF_RADIUS);
    if radius == 0 {
        return if is_shadowed(coord.depth, map.fetch(coord.uv), config.bias) {
            0.0
        } else {
            1.0
        };
    }

    let r = radius as i32;
    let side = 2 * radius + 1;
    let mut lit = 0u32;
    for dy in -r..=r {
        for dx in -r..=r {
            if !is_shadowed(coord.depth, map.fetch_offset(coord.uv, dx, dy), config.bias) {
                lit += 1;
            }
        }
    }
    lit as f32 / (side * side) as f32
}

/// Runs the fragment stage for one interpolated fragment. Alpha is always 1.
pub fn fragment_stage(
    varying: &ForwardVarying,
    bindings: &FragmentBindings,
    config: &ShadingConfig,
) -> Vector4<f32> {
    let mut intensity = light_intensity(&varying.normal, &bindings.light.dir, config);

    if let (Some(shadow), Some(map), Some(light_space)) =
        (&config.shadow, &bindings.shadow_map, &bindings.light.mat)
        && let Some(coord) = project_to_shadow_map(&varying.world_pos, light_space)
    {
        let visibility = shadow_visibility(&coord, map, shadow);
        intensity = shadow.floor + (intensity - shadow.floor) * visibility;
    }

    let base = match (&bindings.diffuse, config.textured) {
        (Some(diffuse), true) => diffuse.texture.sample(&diffuse.sampler, varying.uv),
        _ => Vector3::new(1.0, 1.0, 1.0),
    };

    let rgb = base * intensity;
    Vector4::new(rgb.x, rgb.y, rgb.z, 1.0)
}
