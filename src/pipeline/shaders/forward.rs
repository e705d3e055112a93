use crate::core::binding::{
    BoundResources, LayoutError, PipelineFeatures, PipelineLayout, DIFFUSE_TEXTURE_SET, LIGHT_SET,
    PROJECTION_SET, SHADOW_MAP_SET, TRANSFORM_SET, VIEW_SET,
};
use crate::core::geometry::Vertex;
use crate::core::pipeline::Shader;
use crate::pipeline::fragment_stage::{fragment_stage, FragmentBindings, ShadingConfig};
use crate::pipeline::vertex_stage::{vertex_stage, ForwardVarying, VertexBindings};
use log::warn;
use nalgebra::Vector4;

/// The forward pipeline: vertex stage, fragment stage and the layout the two
/// agree on.
pub struct ForwardShader {
    pub vertex: VertexBindings,
    pub fragment: FragmentBindings,
    config: ShadingConfig,
    layout: PipelineLayout,
}

impl ForwardShader {
    /// Shadow sampling needs both a map and a light-space matrix; without
    /// them the variant falls back to unshadowed lighting.
    pub fn new(vertex: VertexBindings, fragment: FragmentBindings, mut config: ShadingConfig) -> Self {
        if config.shadow.is_some()
            && (fragment.shadow_map.is_none() || fragment.light.mat.is_none())
        {
            warn!("Shadows requested but no shadow map is bound; rendering unshadowed");
            config.shadow = None;
        }

        let features = PipelineFeatures {
            textured: config.textured,
            shadowed: config.shadow.is_some(),
            decomposed_transform: vertex.transform.is_decomposed(),
        };

        Self {
            vertex,
            fragment,
            config,
            layout: PipelineLayout::new(features),
        }
    }

    pub fn config(&self) -> &ShadingConfig {
        &self.config
    }

    pub fn layout(&self) -> &PipelineLayout {
        &self.layout
    }

    /// The slots this shader's bindings actually occupy.
    pub fn bound_resources(&self) -> BoundResources {
        let mut bound = BoundResources::new();
        for binding in 0..self.vertex.transform.blocks().len() as u32 {
            bound.bind_uniform(TRANSFORM_SET, binding);
        }
        bound
            .bind_uniform(VIEW_SET, 0)
            .bind_uniform(PROJECTION_SET, 0)
            .bind_uniform(LIGHT_SET, 0);
        if self.config.textured && self.fragment.diffuse.is_some() {
            bound.bind_sampler(DIFFUSE_TEXTURE_SET, 0);
        }
        if self.config.shadow.is_some() && self.fragment.shadow_map.is_some() {
            bound.bind_sampler(SHADOW_MAP_SET, 0);
        }
        bound
    }

    /// Checks the bindings against the layout before the first draw.
    pub fn validate(&self) -> Result<(), LayoutError> {
        self.layout.validate(&self.bound_resources())
    }
}

impl Shader for ForwardShader {
    type Varying = ForwardVarying;

    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying) {
        let out = vertex_stage(vertex, &self.vertex);
        (out.clip_position, out.varying)
    }

    fn fragment(&self, varying: Self::Varying) -> Vector4<f32> {
        fragment_stage(&varying, &self.fragment, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::binding::{BindingSlot, ResourceKind};
    use crate::core::uniforms::LightUniform;
    use crate::pipeline::fragment_stage::{Facing, ShadowConfig};
    use nalgebra::Vector3;

    fn light() -> LightUniform {
        LightUniform::new(Vector3::new(1.0, -1.0, 1.0))
    }

    #[test]
    fn base_variant_validates() {
        let shader = ForwardShader::new(
            VertexBindings::default(),
            FragmentBindings::new(light()),
            ShadingConfig::lambert(Facing::OneSided, -0.2),
        );
        assert!(shader.validate().is_ok());
        assert_eq!(shader.layout().set_count(), 4);
    }

    #[test]
    fn shadows_without_map_fall_back() {
        let shader = ForwardShader::new(
            VertexBindings::default(),
            FragmentBindings::new(light()),
            ShadingConfig::shadowed(Facing::OneSided, ShadowConfig::default()),
        );
        assert!(shader.config().shadow.is_none());
        assert!(!shader.layout().features().shadowed);
        assert!(shader.validate().is_ok());
    }

    #[test]
    fn textured_without_texture_fails_validation() {
        let shader = ForwardShader::new(
            VertexBindings::default(),
            FragmentBindings::new(light()),
            ShadingConfig::lambert(Facing::OneSided, 0.0).with_texture(true),
        );
        assert_eq!(
            shader.validate(),
            Err(LayoutError::Missing {
                slot: BindingSlot::new(DIFFUSE_TEXTURE_SET, 0),
                resource: ResourceKind::DiffuseTexture,
            })
        );
    }
}
