use image::{ColorType, ImageResult};
use log::info;
use std::path::Path;

/// Saves a row-major RGBA8 buffer; the format follows the file extension.
pub fn save_rgba_image<P: AsRef<Path>>(
    buffer: &[u8],
    width: usize,
    height: usize,
    path: P,
) -> ImageResult<()> {
    let path = path.as_ref();
    image::save_buffer(path, buffer, width as u32, height as u32, ColorType::Rgba8)?;
    info!("Saved {}x{} image to {:?}", width, height, path);
    Ok(())
}
