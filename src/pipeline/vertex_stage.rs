//! Transform composition (vertex stage).
//!
//! `clip = Projection * View * ObjectToWorld * position`. Neither the view
//! nor the projection may be skipped. The normal leaves this stage in world
//! space, the space light directions are authored in.

use crate::core::geometry::Vertex;
use crate::core::pipeline::Interpolatable;
use crate::core::uniforms::{ObjectTransform, ProjectionUniform, ViewUniform};
use nalgebra::{Point3, Vector2, Vector3, Vector4};
use std::ops::{Add, Mul};

/// Uniform sets 0, 1 and 2 as seen by the vertex stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct VertexBindings {
    pub transform: ObjectTransform,
    pub view: ViewUniform,
    pub projection: ProjectionUniform,
}

/// Attributes handed to the fragment stage after interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForwardVarying {
    /// World-space normal. Not unit length after interpolation.
    pub normal: Vector3<f32>,
    pub uv: Vector2<f32>,
    /// World-space position, read by the shadow test.
    pub world_pos: Point3<f32>,
}

// Point3 has no Point3 + Point3, so blend through the coordinates.
impl Add for ForwardVarying {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            normal: self.normal + other.normal,
            uv: self.uv + other.uv,
            world_pos: Point3::from(self.world_pos.coords + other.world_pos.coords),
        }
    }
}

impl Mul<f32> for ForwardVarying {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self {
            normal: self.normal * scalar,
            uv: self.uv * scalar,
            world_pos: Point3::from(self.world_pos.coords * scalar),
        }
    }
}

impl Interpolatable for ForwardVarying {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexOutput {
    pub clip_position: Vector4<f32>,
    pub varying: ForwardVarying,
}

/// Runs the vertex stage for one vertex.
pub fn vertex_stage(vertex: &Vertex, bindings: &VertexBindings) -> VertexOutput {
    let world_pos = bindings.transform.transform_point(&vertex.position);
    let clip_position = bindings.projection.0 * bindings.view.0 * world_pos.to_homogeneous();

    VertexOutput {
        clip_position,
        varying: ForwardVarying {
            normal: bindings.transform.transform_normal(&vertex.normal),
            uv: vertex.texcoord,
            world_pos,
        },
    }
}
