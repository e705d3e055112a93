use crate::core::geometry::Vertex;
use crate::core::pipeline::{Interpolatable, Shader};
use crate::core::uniforms::ObjectTransform;
use nalgebra::{Matrix4, Vector4};
use std::ops::{Add, Mul};

#[derive(Clone, Copy, Debug)]
pub struct ShadowVarying; // depth-only, nothing to interpolate

impl Add for ShadowVarying {
    type Output = Self;
    fn add(self, _other: Self) -> Self {
        Self
    }
}

impl Mul<f32> for ShadowVarying {
    type Output = Self;
    fn mul(self, _scalar: f32) -> Self {
        Self
    }
}

impl Interpolatable for ShadowVarying {}

/// Renders casters from the light's point of view so the depth buffer
/// becomes the shadow map.
pub struct ShadowCasterShader {
    transform: ObjectTransform,
    light_space: Matrix4<f32>,
}

impl ShadowCasterShader {
    pub fn new(transform: ObjectTransform, light_space: Matrix4<f32>) -> Self {
        Self {
            transform,
            light_space,
        }
    }
}

impl Shader for ShadowCasterShader {
    type Varying = ShadowVarying;

    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying) {
        let world = self.transform.transform_point(&vertex.position);
        (self.light_space * world.to_homogeneous(), ShadowVarying)
    }

    fn fragment(&self, _varying: Self::Varying) -> Vector4<f32> {
        // Color is discarded; the rasterizer writes depth.
        Vector4::zeros()
    }
}
