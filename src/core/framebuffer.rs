use nalgebra::Vector4;
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

const LOCK_STRIPES: usize = 1024;

/// Color + depth target shared by rasterizer worker threads.
///
/// Depth is stored as `f32` bits in atomics so the depth test is a CAS loop;
/// color writes are guarded by striped locks.
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub sample_count: usize,
    pub buffer_width: usize,
    pub buffer_height: usize,

    color_buffer: UnsafeCell<Vec<Vector4<f32>>>,
    depth_buffer: Vec<AtomicU32>,
    locks: Vec<Mutex<()>>,
}

// Color access goes through `locks`; depth is atomic.
unsafe impl Sync for FrameBuffer {}

impl FrameBuffer {
    /// `sample_count` is the supersampling factor per axis (1 = no AA).
    pub fn new(width: usize, height: usize, sample_count: usize) -> Self {
        let sample_count = sample_count.max(1);
        let buffer_width = width * sample_count;
        let buffer_height = height * sample_count;
        let size = buffer_width * buffer_height;

        let inf_bits = f32::INFINITY.to_bits();
        Self {
            width,
            height,
            sample_count,
            buffer_width,
            buffer_height,
            color_buffer: UnsafeCell::new(vec![Vector4::zeros(); size]),
            depth_buffer: (0..size).map(|_| AtomicU32::new(inf_bits)).collect(),
            locks: (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    /// Resets every sample. Requires exclusive access, so no draw is in flight.
    pub fn clear(&mut self, color: Vector4<f32>, depth: f32) {
        self.color_buffer.get_mut().fill(color);
        let bits = depth.to_bits();
        for d in &self.depth_buffer {
            d.store(bits, Ordering::Relaxed);
        }
    }

    #[inline(always)]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.buffer_width && y < self.buffer_height
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.buffer_width + x
    }

    /// Less-than depth test. On success the new depth is stored atomically.
    #[inline]
    pub fn depth_test_and_update(&self, x: usize, y: usize, new_depth: f32) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let depth_atomic = &self.depth_buffer[self.index(x, y)];
        let new_bits = new_depth.to_bits();

        let mut current_bits = depth_atomic.load(Ordering::Relaxed);
        loop {
            if new_depth >= f32::from_bits(current_bits) {
                return false;
            }
            match depth_atomic.compare_exchange_weak(
                current_bits,
                new_bits,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(updated) => current_bits = updated,
            }
        }
    }

    /// Writes one sample. Call only after a passing depth test.
    #[inline]
    pub fn set_pixel_safe(&self, x: usize, y: usize, color: Vector4<f32>) {
        if !self.in_bounds(x, y) {
            return;
        }
        let idx = self.index(x, y);
        let _guard = self.locks[idx % self.locks.len()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // SAFETY: the stripe lock for `idx` is held.
        unsafe {
            let buffer = &mut *self.color_buffer.get();
            buffer[idx] = color;
        }
    }

    /// Resolved (box-filtered) color of an output pixel.
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Vector4<f32>> {
        if x >= self.width || y >= self.height {
            return None;
        }
        // SAFETY: read after rendering; no writer is active.
        let buffer = unsafe { &*self.color_buffer.get() };

        let n = self.sample_count;
        let mut sum = Vector4::zeros();
        for dy in 0..n {
            for dx in 0..n {
                sum += buffer[self.index(x * n + dx, y * n + dy)];
            }
        }
        Some(sum / (n * n) as f32)
    }

    /// Raw sample depth.
    pub fn depth_at(&self, x: usize, y: usize) -> Option<f32> {
        self.in_bounds(x, y)
            .then(|| f32::from_bits(self.depth_buffer[self.index(x, y)].load(Ordering::Relaxed)))
    }

    /// Copies the depth samples out, row-major.
    pub fn depth_snapshot(&self) -> Vec<f32> {
        self.depth_buffer
            .iter()
            .map(|d| f32::from_bits(d.load(Ordering::Relaxed)))
            .collect()
    }
}
