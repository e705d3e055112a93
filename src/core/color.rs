use nalgebra::Vector3;

const GAMMA: f32 = 2.2;

/// Decodes an 8-bit sRGB texel into linear [0, 1] (pow 2.2 approximation).
pub fn srgb8_to_linear(rgb: [u8; 3]) -> Vector3<f32> {
    Vector3::new(
        (rgb[0] as f32 / 255.0).powf(GAMMA),
        (rgb[1] as f32 / 255.0).powf(GAMMA),
        (rgb[2] as f32 / 255.0).powf(GAMMA),
    )
}

/// Encodes linear color for display and quantizes to 8 bits.
pub fn linear_to_srgb8(color: Vector3<f32>) -> [u8; 3] {
    let encode = |c: f32| (c.max(0.0).powf(1.0 / GAMMA).clamp(0.0, 1.0) * 255.0).round() as u8;
    [encode(color.x), encode(color.y), encode(color.z)]
}
