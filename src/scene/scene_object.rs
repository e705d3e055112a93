use crate::core::uniforms::ObjectTransform;
use crate::scene::material::Material;
use crate::scene::mesh::Mesh;

/// One draw: a mesh, its set-0 transform and its material.
pub struct SceneObject {
    pub mesh: Mesh,
    pub transform: ObjectTransform,
    pub material: Material,
}

impl SceneObject {
    pub fn new(mesh: Mesh, transform: ObjectTransform, material: Material) -> Self {
        Self {
            mesh,
            transform,
            material,
        }
    }
}
