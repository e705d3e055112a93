//! Uniform records bound at sets 0–3.
//!
//! Host code replaces these wholesale between draws; the stages only read them.

use crate::core::math::transform::{linear_part, TransformFactory};
use bytemuck::{Pod, Zeroable};
use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};

/// Object-to-world transform bound at set 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectTransform {
    /// One model matrix at binding 0.
    Combined(Matrix4<f32>),
    /// Translation, scale and rotation matrices at bindings 0, 1 and 2.
    Decomposed {
        translation: Matrix4<f32>,
        scale: Matrix4<f32>,
        rotation: Matrix4<f32>,
    },
}

impl Default for ObjectTransform {
    fn default() -> Self {
        ObjectTransform::Combined(Matrix4::identity())
    }
}

impl ObjectTransform {
    pub fn from_trs(
        translation: &Vector3<f32>,
        rotation: &UnitQuaternion<f32>,
        scale: &Vector3<f32>,
    ) -> Self {
        ObjectTransform::Decomposed {
            translation: TransformFactory::translation(translation),
            scale: TransformFactory::scaling_nonuniform(scale),
            rotation: TransformFactory::rotation(rotation),
        }
    }

    /// Object-to-world matrix.
    ///
    /// For the decomposed form this is `T * S * R`: the rotation is applied to
    /// the vertex first, then the scale, then the translation.
    pub fn model_matrix(&self) -> Matrix4<f32> {
        match self {
            ObjectTransform::Combined(model) => *model,
            ObjectTransform::Decomposed {
                translation,
                scale,
                rotation,
            } => translation * scale * rotation,
        }
    }

    /// Pre-multiplied equivalent of this transform.
    pub fn combine(&self) -> Self {
        ObjectTransform::Combined(self.model_matrix())
    }

    pub fn is_decomposed(&self) -> bool {
        matches!(self, ObjectTransform::Decomposed { .. })
    }

    /// Object-space position to world space.
    pub fn transform_point(&self, position: &Point3<f32>) -> Point3<f32> {
        match self {
            ObjectTransform::Combined(model) => {
                Point3::from((model * position.to_homogeneous()).xyz())
            }
            ObjectTransform::Decomposed {
                translation,
                scale,
                rotation,
            } => {
                // Staged in the fixed order; must agree with `model_matrix`.
                let rotated = rotation * position.to_homogeneous();
                let scaled = scale * rotated;
                Point3::from((translation * scaled).xyz())
            }
        }
    }

    /// Object-space normal to world space, normalized.
    ///
    /// Combined: the model's upper 3x3 without inverse-transpose, so normals
    /// skew under non-uniform scale. Decomposed: rotation only, so scale never
    /// changes the normal direction even when it should. Translation never
    /// contributes to either.
    pub fn transform_normal(&self, normal: &Vector3<f32>) -> Vector3<f32> {
        let linear = match self {
            ObjectTransform::Combined(model) => linear_part(model),
            ObjectTransform::Decomposed { rotation, .. } => linear_part(rotation),
        };
        (linear * normal).normalize()
    }
}

/// World-to-view matrix bound at set 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewUniform(pub Matrix4<f32>);

/// View-to-clip matrix bound at set 2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionUniform(pub Matrix4<f32>);

impl Default for ViewUniform {
    fn default() -> Self {
        Self(Matrix4::identity())
    }
}

impl Default for ProjectionUniform {
    fn default() -> Self {
        Self(Matrix4::identity())
    }
}

/// Directional light bound at set 3.
///
/// `dir` is the direction the light travels and must be non-zero; the
/// fragment stage normalizes it. `mat` projects world positions into the
/// shadow map's clip space and is only read when shadows are enabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightUniform {
    pub dir: Vector3<f32>,
    pub mat: Option<Matrix4<f32>>,
}

impl LightUniform {
    pub fn new(dir: Vector3<f32>) -> Self {
        Self { dir, mat: None }
    }

    pub fn with_light_space(mut self, mat: Matrix4<f32>) -> Self {
        self.mat = Some(mat);
        self
    }
}

//=================================
// Host upload records (std140)
//=================================

fn columns(m: &Matrix4<f32>) -> [[f32; 4]; 4] {
    // nalgebra is column-major, as is std140 mat4
    (*m).into()
}

/// One mat4 uniform: model, translation, scale, rotation, view or projection.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MatrixBlock {
    pub mat: [[f32; 4]; 4],
}

impl From<&Matrix4<f32>> for MatrixBlock {
    fn from(m: &Matrix4<f32>) -> Self {
        Self { mat: columns(m) }
    }
}

/// Light block: `vec3 dir` padded to 16 bytes, followed by `mat4 mat`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightBlock {
    pub dir: [f32; 3],
    pub _pad: f32,
    pub mat: [[f32; 4]; 4],
}

impl From<&LightUniform> for LightBlock {
    fn from(light: &LightUniform) -> Self {
        Self {
            dir: light.dir.into(),
            _pad: 0.0,
            mat: columns(&light.mat.unwrap_or_else(Matrix4::identity)),
        }
    }
}

impl ObjectTransform {
    /// Blocks in binding order for set 0.
    pub fn blocks(&self) -> Vec<MatrixBlock> {
        match self {
            ObjectTransform::Combined(model) => vec![MatrixBlock::from(model)],
            ObjectTransform::Decomposed {
                translation,
                scale,
                rotation,
            } => vec![
                MatrixBlock::from(translation),
                MatrixBlock::from(scale),
                MatrixBlock::from(rotation),
            ],
        }
    }
}
