//! Config loading tests

use forward_shading::io::config::{Config, ConfigError, MeshKind};
use forward_shading::pipeline::fragment_stage::{Facing, DEFAULT_SHADOW_BIAS};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn loads_full_scene_file() {
    let file = write_config(
        r#"
        [render]
        width = 64
        height = 48
        samples = 1
        output = "frame.png"

        [light]
        direction = [0.0, -1.0, 0.0]
        ortho_size = 4.0

        [shading]
        ambient = -0.2
        shadow_bias = 0.005
        pcf_radius = 1
        decomposed_transform = true

        [[objects]]
        mesh = "cube"
        position = [0.0, 1.0, 0.0]
        rotation = [0.0, 45.0, 0.0]

        [[objects]]
        mesh = "plane"
        scale = [8.0, 1.0, 8.0]
        checker = true
        "#,
    );

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.render.width, 64);
    assert_eq!(config.render.output, "frame.png");
    assert_eq!(config.light.ortho_size, 4.0);
    assert!(config.shading.decomposed_transform);
    assert_eq!(config.objects.len(), 2);
    assert_eq!(config.objects[0].mesh, MeshKind::Cube);
    assert_eq!(config.objects[0].scale, [1.0, 1.0, 1.0]);
    assert!(config.objects[1].checker);

    let shading = config.shading_config();
    assert_eq!(shading.facing, Facing::OneSided);
    assert_eq!(shading.ambient, -0.2);
    let shadow = shading.shadow.unwrap();
    assert_eq!(shadow.bias, 0.005);
    assert_eq!(shadow.pcf_radius, 1);
}

#[test]
fn empty_file_is_valid() {
    let file = write_config("");
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.shading.shadow_bias, DEFAULT_SHADOW_BIAS);
    assert!(config.shading.use_shadows);
}

#[test]
fn missing_file_reports_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::load(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn malformed_toml_reports_parse_error() {
    let file = write_config("[render\nwidth = 3");
    assert!(matches!(
        Config::load(file.path()),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
fn zero_light_direction_is_rejected() {
    let file = write_config("[light]\ndirection = [0.0, 0.0, 0.0]\n");
    assert!(matches!(
        Config::load(file.path()),
        Err(ConfigError::Invalid(_))
    ));
}
