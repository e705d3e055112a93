use nalgebra::{Matrix3, Matrix4, Point2, Point3, UnitQuaternion, Vector3, Vector4};

//=================================
// Transform Matrix Factory
//=================================

/// Factory for the matrices bound at sets 0 (object), 1 (view) and 2 (projection).
/// Right-handed, column vectors: a matrix applies to a point as `M * p`.
pub struct TransformFactory;

#[rustfmt::skip]
impl TransformFactory {
    /// Rotation matrix of a unit quaternion.
    pub fn rotation(rotation: &UnitQuaternion<f32>) -> Matrix4<f32> {
        let (i, j, k, r) = (rotation.i, rotation.j, rotation.k, rotation.w);
        Matrix4::new(
            1.0 - 2.0 * (j * j + k * k), 2.0 * (i * j - r * k),       2.0 * (i * k + r * j),       0.0,
            2.0 * (i * j + r * k),       1.0 - 2.0 * (i * i + k * k), 2.0 * (j * k - r * i),       0.0,
            2.0 * (i * k - r * j),       2.0 * (j * k + r * i),       1.0 - 2.0 * (i * i + j * j), 0.0,
            0.0,                         0.0,                         0.0,                         1.0,
        )
    }

    /// Rotation from Euler angles in degrees, applied X then Y then Z.
    pub fn rotation_euler_degrees(angles: &Vector3<f32>) -> UnitQuaternion<f32> {
        UnitQuaternion::from_euler_angles(
            angles.x.to_radians(),
            angles.y.to_radians(),
            angles.z.to_radians(),
        )
    }

    /// Translation matrix.
    pub fn translation(translation: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new(
            1.0, 0.0, 0.0, translation.x,
            0.0, 1.0, 0.0, translation.y,
            0.0, 0.0, 1.0, translation.z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Non-uniform scaling matrix. Zero components are accepted and collapse geometry.
    pub fn scaling_nonuniform(scale: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new(
            scale.x, 0.0,     0.0,     0.0,
            0.0,     scale.y, 0.0,     0.0,
            0.0,     0.0,     scale.z, 0.0,
            0.0,     0.0,     0.0,     1.0,
        )
    }

    /// Combined object-to-world matrix `T * S * R`.
    ///
    /// Rotation sits closest to the vertex, translation is applied last.
    pub fn trs(
        translation: &Vector3<f32>,
        rotation: &UnitQuaternion<f32>,
        scale: &Vector3<f32>,
    ) -> Matrix4<f32> {
        Self::translation(translation) * Self::scaling_nonuniform(scale) * Self::rotation(rotation)
    }

    /// View matrix (Look-At, Right-Handed).
    /// Transforms world space coordinates to camera/view space.
    pub fn view(eye: &Point3<f32>, target: &Point3<f32>, up: &Vector3<f32>) -> Matrix4<f32> {
        // In RHS, camera looks down -Z
        let z_axis = (eye - target).normalize();
        let x_axis = up.cross(&z_axis).normalize();
        let y_axis = z_axis.cross(&x_axis);

        let rotation = Matrix4::new(
            x_axis.x, x_axis.y, x_axis.z, 0.0,
            y_axis.x, y_axis.y, y_axis.z, 0.0,
            z_axis.x, z_axis.y, z_axis.z, 0.0,
            0.0,      0.0,      0.0,      1.0,
        );

        rotation * Self::translation(&-eye.coords)
    }

    /// Perspective projection (Right-Handed), maps the view frustum to NDC [-1, 1].
    pub fn perspective(aspect_ratio: f32, fov_y_rad: f32, near: f32, far: f32) -> Matrix4<f32> {
        let f = 1.0 / (fov_y_rad / 2.0).tan();
        let nf = 1.0 / (near - far);

        Matrix4::new(
            f / aspect_ratio, 0.0, 0.0,               0.0,
            0.0,              f,   0.0,               0.0,
            0.0,              0.0, (far + near) * nf, 2.0 * far * near * nf,
            0.0,              0.0, -1.0,              0.0,
        )
    }

    /// Orthographic projection (Right-Handed). Used for directional light space.
    pub fn orthographic(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Matrix4<f32> {
        let rl = 1.0 / (right - left);
        let tb = 1.0 / (top - bottom);
        let nf = 1.0 / (near - far);

        Matrix4::new(
            2.0 * rl, 0.0,      0.0,      -(right + left) * rl,
            0.0,      2.0 * tb, 0.0,      -(top + bottom) * tb,
            0.0,      0.0,      2.0 * nf, (far + near) * nf,
            0.0,      0.0,      0.0,      1.0,
        )
    }
}

//=================================
// Core Transformation Functions
//=================================

/// Upper-left 3x3 block, the part of an affine matrix that acts on directions.
#[inline]
pub fn linear_part(matrix: &Matrix4<f32>) -> Matrix3<f32> {
    matrix.fixed_view::<3, 3>(0, 0).into_owned()
}

/// Applies `matrix` to a point (w = 1) and drops back to 3D without a divide.
#[inline]
pub fn transform_point(matrix: &Matrix4<f32>, point: &Point3<f32>) -> Point3<f32> {
    Point3::from((matrix * point.to_homogeneous()).xyz())
}

/// Performs perspective division: Clip Space -> NDC.
#[inline]
pub fn apply_perspective_division(clip: &Vector4<f32>) -> Point3<f32> {
    let w = clip.w;
    if w.abs() > 1e-6 {
        Point3::new(clip.x / w, clip.y / w, clip.z / w)
    } else {
        Point3::origin()
    }
}

/// NDC depth [-1, 1] to the depth-buffer range [0, 1].
#[inline]
pub fn ndc_depth_to_buffer(z_ndc: f32) -> f32 {
    z_ndc * 0.5 + 0.5
}

/// Converts NDC coordinates to Screen coordinates (Viewport Transform).
/// Note: Y-axis is flipped (NDC +Y is up, Screen +Y is down).
#[inline]
pub fn ndc_to_screen(ndc_x: f32, ndc_y: f32, width: f32, height: f32) -> Point2<f32> {
    Point2::new(
        (ndc_x + 1.0) * 0.5 * width,
        (1.0 - (ndc_y + 1.0) * 0.5) * height,
    )
}
