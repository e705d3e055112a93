use crate::core::math::transform::TransformFactory;
use crate::core::uniforms::LightUniform;
use nalgebra::{Matrix4, Point3, Vector3};

/// Parallel-ray light. `direction` is the direction the light travels.
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    pub direction: Vector3<f32>,
    /// Point the shadow frustum is centered on.
    pub focus: Point3<f32>,
    /// Distance from `focus` back along the light to the shadow camera.
    pub distance: f32,
    /// Half extent of the orthographic shadow frustum.
    pub ortho_size: f32,
    pub near: f32,
    pub far: f32,
}

impl DirectionalLight {
    pub fn new(direction: Vector3<f32>) -> Self {
        Self {
            direction,
            focus: Point3::origin(),
            distance: 20.0,
            ortho_size: 8.0,
            near: 0.1,
            far: 50.0,
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        let dir = self.direction.normalize();
        let eye = self.focus - dir * self.distance;
        // Avoid a degenerate basis when the light points straight up or down.
        let up = if dir.y.abs() > 0.9 {
            Vector3::z()
        } else {
            Vector3::y()
        };
        TransformFactory::view(&eye, &self.focus, &up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let s = self.ortho_size;
        TransformFactory::orthographic(-s, s, -s, s, self.near, self.far)
    }

    /// World -> light clip space.
    pub fn light_space_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Contents for set 3. The light-space matrix is included only when the
    /// pipeline samples a shadow map.
    pub fn uniform(&self, with_shadow: bool) -> LightUniform {
        let uniform = LightUniform::new(self.direction);
        if with_shadow {
            uniform.with_light_space(self.light_space_matrix())
        } else {
            uniform
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::transform::transform_point;

    #[test]
    fn focus_projects_to_shadow_map_center() {
        let light = DirectionalLight::new(Vector3::new(1.0, -1.0, 1.0));
        let p = transform_point(&light.light_space_matrix(), &light.focus);
        assert!(p.x.abs() < 1e-5 && p.y.abs() < 1e-5);
        assert!(p.z > -1.0 && p.z < 1.0);
    }

    #[test]
    fn points_further_along_the_light_are_deeper() {
        let light = DirectionalLight::new(Vector3::new(0.0, -1.0, 0.0));
        let m = light.light_space_matrix();
        let top = transform_point(&m, &Point3::new(0.0, 1.0, 0.0));
        let bottom = transform_point(&m, &Point3::new(0.0, -1.0, 0.0));
        assert!(top.z < bottom.z);
    }

    #[test]
    fn uniform_carries_matrix_only_with_shadows() {
        let light = DirectionalLight::new(Vector3::new(1.0, -1.0, 1.0));
        assert!(light.uniform(false).mat.is_none());
        assert!(light.uniform(true).mat.is_some());
        assert_eq!(light.uniform(true).dir, light.direction);
    }
}
