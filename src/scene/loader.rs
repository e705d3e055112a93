use crate::core::math::transform::TransformFactory;
use crate::core::uniforms::ObjectTransform;
use crate::io::config::{Config, MeshKind, ObjectConfig, ProjectionKind};
use crate::scene::camera::Camera;
use crate::scene::context::RenderContext;
use crate::scene::light::DirectionalLight;
use crate::scene::material::Material;
use crate::scene::mesh::Mesh;
use crate::scene::scene_object::SceneObject;
use crate::scene::texture::{Sampler, Texture};
use log::{error, info};
use nalgebra::{Point3, Vector3};

const CHECKER_SIZE: u32 = 256;
const CHECKER_CELLS: u32 = 16;

pub fn build_camera(config: &Config) -> Camera {
    let c = &config.camera;
    let aspect_ratio = config.render.width as f32 / config.render.height as f32;
    let (position, target, up) = (Point3::from(c.position), Point3::from(c.target), Vector3::from(c.up));
    match c.projection {
        ProjectionKind::Perspective => Camera::new_perspective(
            position,
            target,
            up,
            c.fov.to_radians(),
            aspect_ratio,
            c.near,
            c.far,
        ),
        ProjectionKind::Orthographic => Camera::new_orthographic(
            position,
            target,
            up,
            c.ortho_height,
            aspect_ratio,
            c.near,
            c.far,
        ),
    }
}

pub fn build_light(config: &Config) -> DirectionalLight {
    let l = &config.light;
    DirectionalLight {
        distance: l.distance,
        ortho_size: l.ortho_size,
        near: l.near,
        far: l.far,
        ..DirectionalLight::new(Vector3::from(l.direction))
    }
}

/// Set-0 contents for one object. The decomposed form keeps T, S and R
/// separate; otherwise they are pre-multiplied into one model matrix.
pub fn build_transform(object: &ObjectConfig, decomposed: bool) -> ObjectTransform {
    let rotation = TransformFactory::rotation_euler_degrees(&Vector3::from(object.rotation));
    let transform = ObjectTransform::from_trs(
        &Vector3::from(object.position),
        &rotation,
        &Vector3::from(object.scale),
    );
    if decomposed {
        transform
    } else {
        transform.combine()
    }
}

fn build_material(object: &ObjectConfig) -> Material {
    if let Some(path) = &object.texture {
        match Texture::load(path) {
            Ok(texture) => return Material::textured(texture, Sampler::default()),
            Err(e) => error!("{}; drawing untextured", e),
        }
    }
    if object.checker {
        let texture = Texture::checker(
            CHECKER_SIZE,
            CHECKER_CELLS,
            Vector3::new(0.9, 0.9, 0.9),
            Vector3::new(0.3, 0.3, 0.3),
        );
        return Material::textured(texture, Sampler::default());
    }
    Material::default()
}

fn build_mesh(kind: MeshKind) -> Mesh {
    match kind {
        MeshKind::Cube => Mesh::cube(),
        MeshKind::Plane => Mesh::plane(1.0),
    }
}

/// Builds camera, light and objects from config.
pub fn init_scene_resources(config: &Config) -> RenderContext {
    let decomposed = config.shading.decomposed_transform;
    let scene_objects: Vec<SceneObject> = config
        .objects
        .iter()
        .map(|object| {
            SceneObject::new(
                build_mesh(object.mesh),
                build_transform(object, decomposed),
                build_material(object),
            )
        })
        .collect();

    info!(
        "Scene built: {} object(s), {} transform",
        scene_objects.len(),
        if decomposed { "decomposed" } else { "combined" }
    );

    RenderContext {
        camera: build_camera(config),
        light: build_light(config),
        scene_objects,
    }
}
