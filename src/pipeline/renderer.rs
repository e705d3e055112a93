use crate::core::framebuffer::FrameBuffer;
use crate::core::pipeline::Shader;
use crate::core::rasterizer::{CullMode, Rasterizer};
use crate::scene::mesh::Mesh;
use nalgebra::Vector4;

/// Drives the vertex stage over a mesh and hands each triangle to the rasterizer.
pub struct Renderer {
    pub rasterizer: Rasterizer,
    pub framebuffer: FrameBuffer,
}

impl Renderer {
    /// `sample_count`: 1 for no AA, 2 for 2x2 SSAA, etc.
    pub fn new(width: usize, height: usize, sample_count: usize) -> Self {
        Self {
            rasterizer: Rasterizer::new(),
            framebuffer: FrameBuffer::new(width, height, sample_count),
        }
    }

    pub fn with_cull_mode(mut self, mode: CullMode) -> Self {
        self.rasterizer.set_cull_mode(mode);
        self
    }

    /// Clears color and resets depth to the far plane.
    pub fn clear(&mut self, color: Vector4<f32>) {
        self.framebuffer.clear(color, f32::INFINITY);
    }

    pub fn draw_mesh<S: Shader>(&mut self, mesh: &Mesh, shader: &S) {
        for chunk in mesh.indices.chunks_exact(3) {
            let (Some(v0), Some(v1), Some(v2)) = (
                mesh.vertices.get(chunk[0] as usize),
                mesh.vertices.get(chunk[1] as usize),
                mesh.vertices.get(chunk[2] as usize),
            ) else {
                continue;
            };

            let (pos0, var0) = shader.vertex(v0);
            let (pos1, var1) = shader.vertex(v1);
            let (pos2, var2) = shader.vertex(v2);

            self.rasterizer.rasterize_triangle(
                &self.framebuffer,
                shader,
                &[pos0, pos1, pos2],
                &[var0, var1, var2],
            );
        }
    }
}
