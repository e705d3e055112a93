use crate::core::framebuffer::FrameBuffer;
use crate::core::math::interpolation::{
    barycentric_coordinates, interpolate, is_inside_triangle, perspective_correct_barycentric,
};
use crate::core::math::transform::{apply_perspective_division, ndc_depth_to_buffer, ndc_to_screen};
use crate::core::pipeline::Shader;
use nalgebra::{Point2, Vector4};
use rayon::prelude::*;

/// Turns vertex-stage output into fragment-stage invocations.
///
/// Stands in for the GPU fixed-function stages: homogeneous clipping,
/// perspective divide, viewport mapping, culling, depth test and
/// perspective-correct varying interpolation.
pub struct Rasterizer {
    pub cull_mode: CullMode,
}

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum CullMode {
    Back,
    Front,
    None,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Clip planes as (axis, sign): inside when `sign * p[axis] <= p.w`.
const CLIP_PLANES: [(usize, f32); 6] = [
    (0, 1.0),
    (0, -1.0),
    (1, 1.0),
    (1, -1.0),
    (2, 1.0),
    (2, -1.0),
];

type ClipVertex<V> = (Vector4<f32>, V);

impl Rasterizer {
    pub fn new() -> Self {
        Self {
            cull_mode: CullMode::Back,
        }
    }

    pub fn set_cull_mode(&mut self, mode: CullMode) {
        self.cull_mode = mode;
    }

    /// Clips one triangle against the view volume (Sutherland–Hodgman) and
    /// shades the resulting fan.
    pub fn rasterize_triangle<S: Shader>(
        &self,
        framebuffer: &FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
    ) {
        let mut polygon: Vec<ClipVertex<S::Varying>> = Vec::with_capacity(16);
        let mut scratch: Vec<ClipVertex<S::Varying>> = Vec::with_capacity(16);
        polygon.extend(clip_coords.iter().copied().zip(varyings.iter().copied()));

        for &(axis, sign) in &CLIP_PLANES {
            if polygon.is_empty() {
                return;
            }
            Self::clip_against_plane::<S>(&polygon, &mut scratch, axis, sign);
            std::mem::swap(&mut polygon, &mut scratch);
        }

        if polygon.len() < 3 {
            return;
        }

        let anchor = polygon[0];
        for pair in polygon[1..].windows(2) {
            self.shade_triangle(
                framebuffer,
                shader,
                &[anchor.0, pair[0].0, pair[1].0],
                &[anchor.1, pair[0].1, pair[1].1],
            );
        }
    }

    fn clip_against_plane<S: Shader>(
        input: &[ClipVertex<S::Varying>],
        output: &mut Vec<ClipVertex<S::Varying>>,
        axis: usize,
        sign: f32,
    ) {
        output.clear();
        let Some(&last) = input.last() else {
            return;
        };

        let inside = |p: &Vector4<f32>| sign * p[axis] <= p.w + 1e-6;
        let mut prev = last;
        let mut prev_inside = inside(&prev.0);

        for &curr in input {
            let curr_inside = inside(&curr.0);
            if curr_inside != prev_inside {
                if let Some(hit) = Self::intersect::<S>(prev, curr, axis, sign) {
                    output.push(hit);
                }
            }
            if curr_inside {
                output.push(curr);
            }
            prev = curr;
            prev_inside = curr_inside;
        }
    }

    /// Point where edge `a -> b` crosses `sign * p[axis] = p.w`, with the
    /// varying blended at the same parameter.
    #[inline(always)]
    fn intersect<S: Shader>(
        a: ClipVertex<S::Varying>,
        b: ClipVertex<S::Varying>,
        axis: usize,
        sign: f32,
    ) -> Option<ClipVertex<S::Varying>> {
        let denom = sign * (b.0[axis] - a.0[axis]) - (b.0.w - a.0.w);
        if denom.abs() < 1e-9 {
            return None;
        }
        let t = (a.0.w - sign * a.0[axis]) / denom;
        if !t.is_finite() {
            return None;
        }
        Some((a.0 + (b.0 - a.0) * t, a.1 * (1.0 - t) + b.1 * t))
    }

    /// Shades a triangle already inside the view volume.
    fn shade_triangle<S: Shader>(
        &self,
        framebuffer: &FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
    ) {
        let width = framebuffer.buffer_width as f32;
        let height = framebuffer.buffer_height as f32;

        let mut screen = [Point2::origin(); 3];
        let mut w = [0.0; 3];
        for i in 0..3 {
            if clip_coords[i].w.abs() < 1e-6 {
                return;
            }
            let ndc = apply_perspective_division(&clip_coords[i]);
            screen[i] = ndc_to_screen(ndc.x, ndc.y, width, height);
            w[i] = clip_coords[i].w;
        }

        // Screen Y points down, so counter-clockwise front faces have negative area here.
        let e1 = screen[1] - screen[0];
        let e2 = screen[2] - screen[1];
        let signed_area = e1.x * e2.y - e1.y * e2.x;
        match self.cull_mode {
            CullMode::Back if signed_area >= 0.0 => return,
            CullMode::Front if signed_area <= 0.0 => return,
            _ => {}
        }

        let min_x = screen.iter().map(|p| p.x).fold(f32::INFINITY, f32::min).floor() as i32;
        let min_y = screen.iter().map(|p| p.y).fold(f32::INFINITY, f32::min).floor() as i32;
        let max_x = screen.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max).ceil() as i32;
        let max_y = screen.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max).ceil() as i32;

        if max_x < 0
            || max_y < 0
            || min_x >= framebuffer.buffer_width as i32
            || min_y >= framebuffer.buffer_height as i32
        {
            return;
        }

        let x_range = min_x.max(0) as usize..=max_x.min(framebuffer.buffer_width as i32 - 1) as usize;
        let y_range = min_y.max(0) as usize..=max_y.min(framebuffer.buffer_height as i32 - 1) as usize;

        y_range.into_par_iter().for_each(|y| {
            for x in x_range.clone() {
                let center = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
                let Some(bary) = barycentric_coordinates(center, screen[0], screen[1], screen[2])
                else {
                    continue;
                };
                if !is_inside_triangle(bary) {
                    continue;
                }
                let Some(weights) = perspective_correct_barycentric(bary, w[0], w[1], w[2]) else {
                    continue;
                };

                let ndc_z = interpolate(
                    &[
                        clip_coords[0].z / w[0],
                        clip_coords[1].z / w[1],
                        clip_coords[2].z / w[2],
                    ],
                    bary,
                );
                if framebuffer.depth_test_and_update(x, y, ndc_depth_to_buffer(ndc_z)) {
                    let color = shader.fragment(interpolate(varyings, weights));
                    framebuffer.set_pixel_safe(x, y, color);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Vertex;

    struct FlatShader;

    impl Shader for FlatShader {
        type Varying = f32;

        fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, f32) {
            (vertex.position.to_homogeneous(), 1.0)
        }

        fn fragment(&self, varying: f32) -> Vector4<f32> {
            Vector4::new(varying, varying, varying, 1.0)
        }
    }

    fn covering_triangle() -> [Vector4<f32>; 3] {
        // Counter-clockwise in NDC, covers the whole viewport.
        [
            Vector4::new(-1.0, -1.0, 0.0, 1.0),
            Vector4::new(3.0, -1.0, 0.0, 1.0),
            Vector4::new(-1.0, 3.0, 0.0, 1.0),
        ]
    }

    #[test]
    fn front_facing_triangle_covers_viewport() {
        let fb = FrameBuffer::new(4, 4, 1);
        Rasterizer::new().rasterize_triangle(&fb, &FlatShader, &covering_triangle(), &[1.0; 3]);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(fb.get_pixel(x, y).unwrap().x, 1.0);
                assert_eq!(fb.depth_at(x, y), Some(0.5));
            }
        }
    }

    #[test]
    fn back_facing_triangle_is_culled() {
        let fb = FrameBuffer::new(4, 4, 1);
        let mut tri = covering_triangle();
        tri.swap(1, 2);
        Rasterizer::new().rasterize_triangle(&fb, &FlatShader, &tri, &[1.0; 3]);
        assert_eq!(fb.get_pixel(1, 1).unwrap(), Vector4::zeros());

        let mut raster = Rasterizer::new();
        raster.set_cull_mode(CullMode::None);
        raster.rasterize_triangle(&fb, &FlatShader, &tri, &[1.0; 3]);
        assert_eq!(fb.get_pixel(1, 1).unwrap().w, 1.0);
    }

    #[test]
    fn triangle_behind_far_plane_is_clipped_away() {
        let fb = FrameBuffer::new(2, 2, 1);
        let tri = covering_triangle().map(|v| Vector4::new(v.x, v.y, 2.0, 1.0));
        Rasterizer::new().rasterize_triangle(&fb, &FlatShader, &tri, &[1.0; 3]);
        assert_eq!(fb.depth_at(0, 0), Some(f32::INFINITY));
    }
}
