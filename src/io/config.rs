use crate::pipeline::fragment_stage::{
    Facing, IntensityClamp, ShadingConfig, ShadowConfig, DEFAULT_SHADOW_BIAS, DEFAULT_SHADOW_FLOOR,
    MAX_PCF_RADIUS,
};
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML in '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub light: LightConfig,
    #[serde(default)]
    pub shading: ShadingSection,
    #[serde(default = "default_objects")]
    pub objects: Vec<ObjectConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            camera: CameraConfig::default(),
            light: LightConfig::default(),
            shading: ShadingSection::default(),
            objects: default_objects(),
        }
    }
}

fn default_objects() -> Vec<ObjectConfig> {
    vec![
        ObjectConfig {
            mesh: MeshKind::Plane,
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0],
            scale: [10.0, 1.0, 10.0],
            texture: None,
            checker: true,
        },
        ObjectConfig {
            mesh: MeshKind::Cube,
            position: [0.0, 0.5, 0.0],
            rotation: [0.0, 30.0, 0.0],
            scale: default_scale(),
            texture: None,
            checker: false,
        },
    ]
}

#[derive(Debug, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_samples")]
    pub samples: usize,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_background")]
    pub background: [f32; 3],
    #[serde(default = "default_exposure")]
    pub exposure: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            samples: default_samples(),
            output: default_output(),
            background: default_background(),
            exposure: default_exposure(),
        }
    }
}

fn default_width() -> usize {
    800
}
fn default_height() -> usize {
    600
}
fn default_samples() -> usize {
    2
}
fn default_output() -> String {
    "output.png".to_string()
}
fn default_background() -> [f32; 3] {
    [0.05, 0.05, 0.1]
}
fn default_exposure() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
    #[serde(default)]
    pub target: [f32; 3],
    #[serde(default = "default_up")]
    pub up: [f32; 3],
    #[serde(default)]
    pub projection: ProjectionKind,
    /// Vertical field of view in degrees, perspective only.
    #[serde(default = "default_fov")]
    pub fov: f32,
    /// World-space height of the view volume, orthographic only.
    #[serde(default = "default_ortho_height")]
    pub ortho_height: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            target: [0.0, 0.0, 0.0],
            up: default_up(),
            projection: ProjectionKind::default(),
            fov: default_fov(),
            ortho_height: default_ortho_height(),
            near: default_near(),
            far: default_far(),
        }
    }
}

fn default_camera_position() -> [f32; 3] {
    [0.0, 4.0, 6.0]
}
fn default_up() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}
fn default_fov() -> f32 {
    45.0
}
fn default_ortho_height() -> f32 {
    10.0
}
fn default_near() -> f32 {
    0.1
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionKind {
    #[default]
    Perspective,
    Orthographic,
}
fn default_far() -> f32 {
    100.0
}

#[derive(Debug, Deserialize)]
pub struct LightConfig {
    /// Direction the light travels, not the direction towards it.
    #[serde(default = "default_light_direction")]
    pub direction: [f32; 3],
    #[serde(default = "default_light_distance")]
    pub distance: f32,
    #[serde(default = "default_ortho_size")]
    pub ortho_size: f32,
    #[serde(default = "default_light_near")]
    pub near: f32,
    #[serde(default = "default_light_far")]
    pub far: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            direction: default_light_direction(),
            distance: default_light_distance(),
            ortho_size: default_ortho_size(),
            near: default_light_near(),
            far: default_light_far(),
        }
    }
}

fn default_light_direction() -> [f32; 3] {
    [1.0, -1.0, 1.0]
}
fn default_light_distance() -> f32 {
    20.0
}
fn default_ortho_size() -> f32 {
    8.0
}
fn default_light_near() -> f32 {
    0.1
}
fn default_light_far() -> f32 {
    50.0
}

#[derive(Debug, Deserialize)]
pub struct ShadingSection {
    #[serde(default = "default_false")]
    pub double_sided: bool,
    #[serde(default)]
    pub ambient: f32,
    pub clamp_min: Option<f32>,
    pub clamp_max: Option<f32>,
    #[serde(default = "default_true")]
    pub use_shadows: bool,
    #[serde(default = "default_shadow_bias")]
    pub shadow_bias: f32,
    #[serde(default = "default_shadow_floor")]
    pub shadow_floor: f32,
    #[serde(default)]
    pub pcf_radius: u32,
    #[serde(default = "default_shadow_map_size")]
    pub shadow_map_size: usize,
    #[serde(default = "default_false")]
    pub decomposed_transform: bool,
}

impl Default for ShadingSection {
    fn default() -> Self {
        Self {
            double_sided: false,
            ambient: 0.0,
            clamp_min: None,
            clamp_max: None,
            use_shadows: true,
            shadow_bias: default_shadow_bias(),
            shadow_floor: default_shadow_floor(),
            pcf_radius: 0,
            shadow_map_size: default_shadow_map_size(),
            decomposed_transform: false,
        }
    }
}

fn default_shadow_bias() -> f32 {
    DEFAULT_SHADOW_BIAS
}
fn default_shadow_floor() -> f32 {
    DEFAULT_SHADOW_FLOOR
}
fn default_shadow_map_size() -> usize {
    2048
}
fn default_false() -> bool {
    false
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshKind {
    Cube,
    Plane,
}

#[derive(Debug, Deserialize)]
pub struct ObjectConfig {
    pub mesh: MeshKind,

    // --- Transform ---
    #[serde(default)]
    pub position: [f32; 3],
    /// Euler angles in degrees (roll, pitch, yaw about X, Y, Z).
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],

    // --- Material ---
    /// Diffuse texture file, sRGB encoded.
    pub texture: Option<String>,
    /// Procedural checkerboard when no texture file is given.
    #[serde(default)]
    pub checker: bool,
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        debug!("Loaded config from {:?}: {:?}", path, config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let render = &self.render;
        if render.width == 0 || render.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "render size must be non-zero, got {}x{}",
                render.width, render.height
            )));
        }
        if render.samples == 0 {
            return Err(ConfigError::Invalid("render.samples must be at least 1".into()));
        }
        if self.camera.projection == ProjectionKind::Orthographic
            && (self.camera.ortho_height.is_nan() || self.camera.ortho_height <= 0.0)
        {
            return Err(ConfigError::Invalid(format!(
                "camera.ortho_height must be positive, got {}",
                self.camera.ortho_height
            )));
        }
        if self.light.direction.iter().all(|c| *c == 0.0) {
            return Err(ConfigError::Invalid("light.direction must be non-zero".into()));
        }

        let shading = &self.shading;
        if shading.shadow_map_size == 0 {
            return Err(ConfigError::Invalid("shading.shadow_map_size must be non-zero".into()));
        }
        if shading.shadow_bias < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "shading.shadow_bias must not be negative, got {}",
                shading.shadow_bias
            )));
        }
        let pcf_limit = (MAX_PCF_RADIUS as usize).min(shading.shadow_map_size);
        if shading.pcf_radius as usize > pcf_limit {
            return Err(ConfigError::Invalid(format!(
                "shading.pcf_radius must be at most {pcf_limit}, got {}",
                shading.pcf_radius
            )));
        }
        if let Some(IntensityClamp { min, max }) = self.shading_config().clamp
            && (min.is_nan() || max.is_nan() || min > max)
        {
            return Err(ConfigError::Invalid(format!(
                "shading intensity range is empty: min {min}, max {max}"
            )));
        }
        Ok(())
    }

    /// Fragment-stage capabilities selected by `[shading]`. `textured` is
    /// decided per object.
    pub fn shading_config(&self) -> ShadingConfig {
        let s = &self.shading;
        let facing = if s.double_sided {
            Facing::DoubleSided
        } else {
            Facing::OneSided
        };

        let shadow = s.use_shadows.then_some(ShadowConfig {
            bias: s.shadow_bias,
            floor: s.shadow_floor,
            pcf_radius: s.pcf_radius,
        });

        // Shadowed lighting never drops below the shadow floor unless told
        // to. Otherwise a lone bound is completed with an open end.
        let clamp = match (s.clamp_min, s.clamp_max, s.use_shadows) {
            (None, None, false) => None,
            (min, max, true) => Some(IntensityClamp {
                min: min.unwrap_or(s.shadow_floor),
                max: max.unwrap_or(1.0),
            }),
            (min, max, false) => Some(IntensityClamp {
                min: min.unwrap_or(f32::NEG_INFINITY),
                max: max.unwrap_or(f32::INFINITY),
            }),
        };

        ShadingConfig {
            facing,
            ambient: s.ambient,
            clamp,
            shadow,
            textured: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fragment_stage::light_intensity;
    use nalgebra::Vector3;

    #[test]
    fn empty_document_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.render.width, 800);
        assert_eq!(config.light.direction, [1.0, -1.0, 1.0]);
        assert_eq!(config.objects.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn shading_section_maps_to_config() {
        let config: Config = toml::from_str(
            r#"
            [shading]
            double_sided = true
            ambient = 0.1
            clamp_min = 0.05
            use_shadows = false
            "#,
        )
        .unwrap();
        let shading = config.shading_config();
        assert_eq!(shading.facing, Facing::DoubleSided);
        assert_eq!(shading.ambient, 0.1);
        assert_eq!(shading.shadow, None);
        assert_eq!(
            shading.clamp,
            Some(IntensityClamp {
                min: 0.05,
                max: f32::INFINITY
            })
        );
    }

    #[test]
    fn shadowed_lighting_is_clamped_to_the_floor_by_default() {
        let config: Config = toml::from_str("[shading]\nshadow_floor = 0.1\n").unwrap();
        let shading = config.shading_config();
        assert_eq!(shading.clamp, Some(IntensityClamp { min: 0.1, max: 1.0 }));

        // A back face can no longer come out darker than a shadowed one.
        let back = light_intensity(&Vector3::y(), &Vector3::y(), &shading);
        assert_eq!(back, 0.1);
    }

    #[test]
    fn explicit_clamp_overrides_shadow_floor() {
        let config: Config = toml::from_str("[shading]\nclamp_min = 0.0\n").unwrap();
        assert_eq!(
            config.shading_config().clamp,
            Some(IntensityClamp { min: 0.0, max: 1.0 })
        );
    }

    #[test]
    fn pcf_radius_beyond_cap_is_rejected() {
        let mut config = Config::default();
        config.shading.pcf_radius = MAX_PCF_RADIUS;
        assert!(config.validate().is_ok());

        config.shading.pcf_radius = u32::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.shading.pcf_radius = 4;
        config.shading.shadow_map_size = 2;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn shadow_floor_above_one_is_rejected() {
        let config: Config = toml::from_str("[shading]\nshadow_floor = 1.5\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn inverted_clamp_is_rejected() {
        let config: Config = toml::from_str("[shading]\nclamp_min = 1.0\nclamp_max = 0.0\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn orthographic_camera_is_selectable() {
        let config: Config =
            toml::from_str("[camera]\nprojection = \"orthographic\"\northo_height = 6.0\n").unwrap();
        assert_eq!(config.camera.projection, ProjectionKind::Orthographic);
        assert_eq!(config.camera.ortho_height, 6.0);
        assert!(config.validate().is_ok());

        let flat: Config =
            toml::from_str("[camera]\nprojection = \"orthographic\"\northo_height = 0.0\n").unwrap();
        assert!(matches!(flat.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn unknown_mesh_kind_fails_to_parse() {
        let parsed: Result<Config, _> = toml::from_str("[[objects]]\nmesh = \"teapot\"\n");
        assert!(parsed.is_err());
    }
}
