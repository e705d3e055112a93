use crate::scene::camera::Camera;
use crate::scene::light::DirectionalLight;
use crate::scene::scene_object::SceneObject;

/// Holds all scene resources required for rendering.
pub struct RenderContext {
    pub camera: Camera,
    pub light: DirectionalLight,
    pub scene_objects: Vec<SceneObject>,
}
