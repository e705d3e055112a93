use crate::core::geometry::Vertex;
use nalgebra::{Point3, Vector2, Vector3};

/// A collection of vertices and indices representing a 3D object.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    /// 3 indices per triangle, counter-clockwise when seen from the front.
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Appends one quad facing `normal`. `u x v` must equal `normal`.
    fn push_quad(&mut self, center: Vector3<f32>, normal: Vector3<f32>, u: Vector3<f32>, v: Vector3<f32>) {
        let base = self.vertices.len() as u32;
        let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
        for (su, sv) in corners {
            let p = center + u * su + v * sv;
            let uv = Vector2::new((su + 1.0) * 0.5, (sv + 1.0) * 0.5);
            self.vertices
                .push(Vertex::new(Point3::from(p), normal, uv).with_tangent(u.normalize()));
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Unit cube centered at the origin, 24 vertices so each face has its own normal.
    pub fn cube() -> Self {
        let h = 0.5;
        #[rustfmt::skip]
        let faces = [
            (Vector3::x(),  Vector3::new(0.0, 0.0, -h), Vector3::new(0.0, h, 0.0)),
            (-Vector3::x(), Vector3::new(0.0, 0.0, h),  Vector3::new(0.0, h, 0.0)),
            (Vector3::y(),  Vector3::new(h, 0.0, 0.0),  Vector3::new(0.0, 0.0, -h)),
            (-Vector3::y(), Vector3::new(h, 0.0, 0.0),  Vector3::new(0.0, 0.0, h)),
            (Vector3::z(),  Vector3::new(h, 0.0, 0.0),  Vector3::new(0.0, h, 0.0)),
            (-Vector3::z(), Vector3::new(-h, 0.0, 0.0), Vector3::new(0.0, h, 0.0)),
        ];

        let mut mesh = Self::new(Vec::with_capacity(24), Vec::with_capacity(36));
        for (normal, u, v) in faces {
            mesh.push_quad(normal * h, normal, u, v);
        }
        mesh
    }

    /// Square of side `size` in the XZ plane, facing +Y.
    pub fn plane(size: f32) -> Self {
        let h = size * 0.5;
        let mut mesh = Self::new(Vec::with_capacity(4), Vec::with_capacity(6));
        mesh.push_quad(
            Vector3::zeros(),
            Vector3::y(),
            Vector3::new(h, 0.0, 0.0),
            Vector3::new(0.0, 0.0, -h),
        );
        mesh
    }

}
