use crate::core::color::srgb8_to_linear;
use image::GenericImageView;
use log::info;
use nalgebra::{Vector2, Vector3};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to load texture '{path}': {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("texture of {width}x{height} needs {expected} texels, got {actual}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("texture dimensions must be non-zero")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressMode {
    #[default]
    Repeat,
    ClampToEdge,
}

/// Filtering and addressing state attached to a sampled binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sampler {
    pub filter: FilterMode,
    pub address: AddressMode,
}

impl Sampler {
    pub const NEAREST_CLAMP: Sampler = Sampler {
        filter: FilterMode::Nearest,
        address: AddressMode::ClampToEdge,
    };

    #[inline]
    fn wrap(&self, i: i64, size: u32) -> usize {
        let size = size as i64;
        match self.address {
            AddressMode::Repeat => i.rem_euclid(size) as usize,
            AddressMode::ClampToEdge => i.clamp(0, size - 1) as usize,
        }
    }

    /// Fetches with this sampler's filter over a `width x height` grid.
    /// `uv` has its origin at the bottom-left; row 0 is the top of the image.
    fn sample_grid<T, F>(&self, width: u32, height: u32, uv: Vector2<f32>, fetch: F) -> T
    where
        T: std::ops::Add<Output = T> + std::ops::Mul<f32, Output = T>,
        F: Fn(usize, usize) -> T,
    {
        let x = uv.x * width as f32 - 0.5;
        let y = (1.0 - uv.y) * height as f32 - 0.5;

        match self.filter {
            FilterMode::Nearest => fetch(
                self.wrap(x.round() as i64, width),
                self.wrap(y.round() as i64, height),
            ),
            FilterMode::Linear => {
                let (x0, y0) = (x.floor() as i64, y.floor() as i64);
                let (fx, fy) = (x - x.floor(), y - y.floor());
                let (xa, xb) = (self.wrap(x0, width), self.wrap(x0 + 1, width));
                let (ya, yb) = (self.wrap(y0, height), self.wrap(y0 + 1, height));

                let top = fetch(xa, ya) * (1.0 - fx) + fetch(xb, ya) * fx;
                let bottom = fetch(xa, yb) * (1.0 - fx) + fetch(xb, yb) * fx;
                top * (1.0 - fy) + bottom * fy
            }
        }
    }
}

/// Diffuse color texture, stored as linear RGB.
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    texels: Arc<Vec<Vector3<f32>>>,
}

impl Texture {
    /// Loads an sRGB-encoded image file and decodes it to linear color.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let path_ref = path.as_ref();
        let img = image::open(path_ref).map_err(|source| TextureError::Load {
            path: path_ref.display().to_string(),
            source,
        })?;

        let (width, height) = img.dimensions();
        let rgb = img.to_rgb8();
        let texels = rgb.pixels().map(|p| srgb8_to_linear(p.0)).collect();

        info!("Loaded texture: {:?} ({}x{})", path_ref, width, height);
        Self::from_linear(width, height, texels)
    }

    /// Builds a texture from row-major linear texels (row 0 is the top).
    pub fn from_linear(
        width: u32,
        height: u32,
        texels: Vec<Vector3<f32>>,
    ) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::Empty);
        }
        let expected = width as usize * height as usize;
        if texels.len() != expected {
            return Err(TextureError::SizeMismatch {
                width,
                height,
                expected,
                actual: texels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            texels: Arc::new(texels),
        })
    }

    pub fn solid(color: Vector3<f32>) -> Self {
        Self {
            width: 1,
            height: 1,
            texels: Arc::new(vec![color]),
        }
    }

    /// Two-color checkerboard with `cells` squares per side.
    pub fn checker(size: u32, cells: u32, a: Vector3<f32>, b: Vector3<f32>) -> Self {
        let size = size.max(1);
        let cell = (size / cells.max(1)).max(1);
        let texels = (0..size)
            .flat_map(|y| (0..size).map(move |x| if (x / cell + y / cell) % 2 == 0 { a } else { b }))
            .collect();
        Self {
            width: size,
            height: size,
            texels: Arc::new(texels),
        }
    }

    #[inline]
    fn texel(&self, x: usize, y: usize) -> Vector3<f32> {
        self.texels[y * self.width as usize + x]
    }

    pub fn sample(&self, sampler: &Sampler, uv: Vector2<f32>) -> Vector3<f32> {
        sampler.sample_grid(self.width, self.height, uv, |x, y| self.texel(x, y))
    }
}

/// Square depth texture written by the shadow pass, one `f32` per texel in
/// the depth-buffer range [0, 1].
#[derive(Debug, Clone)]
pub struct DepthTexture {
    pub size: usize,
    depths: Arc<Vec<f32>>,
}

impl DepthTexture {
    pub fn new(size: usize, depths: Vec<f32>) -> Result<Self, TextureError> {
        if size == 0 {
            return Err(TextureError::Empty);
        }
        if depths.len() != size * size {
            return Err(TextureError::SizeMismatch {
                width: size as u32,
                height: size as u32,
                expected: size * size,
                actual: depths.len(),
            });
        }
        Ok(Self {
            size,
            depths: Arc::new(depths),
        })
    }

    pub fn filled(size: usize, depth: f32) -> Self {
        let size = size.max(1);
        Self {
            size,
            depths: Arc::new(vec![depth; size * size]),
        }
    }

    /// Stored occluder depth nearest to `uv` (clamped, no filtering).
    ///
    /// Shadow-map `uv` has its origin at the top-left, matching the rows the
    /// shadow pass writes.
    pub fn fetch(&self, uv: Vector2<f32>) -> f32 {
        let max = (self.size - 1) as f32;
        let x = (uv.x * self.size as f32).floor().clamp(0.0, max) as usize;
        let y = (uv.y * self.size as f32).floor().clamp(0.0, max) as usize;
        self.depths[y * self.size + x]
    }

    /// Fetch offset by whole texels from `uv`, used for PCF taps.
    pub fn fetch_offset(&self, uv: Vector2<f32>, dx: i32, dy: i32) -> f32 {
        let texel = 1.0 / self.size as f32;
        self.fetch(uv + Vector2::new(dx as f32 * texel, dy as f32 * texel))
    }
}
