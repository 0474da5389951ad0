use crate::{DecodeError, RawImage};
use ndarray::Array2;

/// 解码任意 `image` 支持的栅格格式, 并按其亮度权重转为 8-bit 灰度.
pub(super) fn decode(bytes: &[u8]) -> Result<RawImage, DecodeError> {
    let gray = image::load_from_memory(bytes)?.to_luma8();
    let (w, h) = gray.dimensions();
    let data = Array2::from_shape_fn((h as usize, w as usize), |(r, c)| {
        gray.get_pixel(c as u32, r as u32)[0] as f32
    });
    log::debug!("decoded raster image: {w}x{h}");
    Ok(RawImage::raster(data))
}
