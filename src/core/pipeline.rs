use crate::core::geometry::Vertex;
use nalgebra::{Vector3, Vector4};
use std::ops::{Add, Mul};

/// Values the rasterizer can blend across a primitive.
///
/// Interpolation is a linear combination `a * wa + b * wb + c * wc`, so only
/// `Add` and `Mul<f32>` are needed. `Send + Sync` because fragments are shaded
/// on rayon worker threads.
pub trait Interpolatable:
    Copy + Clone + Add<Output = Self> + Mul<f32, Output = Self> + Send + Sync
{
}

impl Interpolatable for f32 {}
impl Interpolatable for Vector3<f32> {}

/// The two programmable stages of a draw.
///
/// Implementations hold their bound uniforms read-only; `vertex` and
/// `fragment` must be free of side effects so invocations may run in any
/// order and in parallel.
pub trait Shader: Send + Sync {
    /// Per-vertex outputs interpolated for each fragment.
    type Varying: Interpolatable;

    /// Vertex stage: clip-space position plus the varyings for this vertex.
    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying);

    /// Fragment stage: final RGBA color for one covered sample.
    fn fragment(&self, varying: Self::Varying) -> Vector4<f32>;
}
