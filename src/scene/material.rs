use crate::pipeline::fragment_stage::DiffuseBinding;
use crate::scene::texture::{Sampler, Texture};

/// Surface inputs for the fragment stage. The base color is white; a diffuse
/// texture, when present, replaces it.
#[derive(Debug, Clone, Default)]
pub struct Material {
    pub diffuse_texture: Option<Texture>,
    pub sampler: Sampler,
}

impl Material {
    pub fn textured(texture: Texture, sampler: Sampler) -> Self {
        Self {
            diffuse_texture: Some(texture),
            sampler,
        }
    }

    pub fn is_textured(&self) -> bool {
        self.diffuse_texture.is_some()
    }

    /// Contents for set 4, if this material binds anything there.
    pub fn diffuse_binding(&self) -> Option<DiffuseBinding> {
        self.diffuse_texture.as_ref().map(|texture| DiffuseBinding {
            texture: texture.clone(),
            sampler: self.sampler,
        })
    }
}
