//! 图像的 PNG 编码.
//!
//! 核心库从不直接写文件. 编码得到的字节交给调用方自行持久化或下载.

use super::{AbnormalMask, BinaryMask, LungMask, NormalizedImage};
use image::{DynamicImage, ImageFormat, ImageResult};
use std::io::Cursor;

/// 表明一个可以编码为 PNG 字节流的图像对象.
pub trait PngEncode {
    /// 按原样编码为 PNG.
    fn to_png(&self) -> ImageResult<Vec<u8>>;
}

/// 将图像写入内存中的 PNG.
pub(crate) fn write_png<I: Into<DynamicImage>>(img: I) -> ImageResult<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    img.into().write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

impl PngEncode for NormalizedImage {
    fn to_png(&self) -> ImageResult<Vec<u8>> {
        write_png(self.to_gray_image())
    }
}

macro_rules! impl_mask_png {
    ($($mask: ty),+) => {
        $(
            /// 前景为白色, 背景为黑色.
            impl PngEncode for $mask {
                fn to_png(&self) -> ImageResult<Vec<u8>> {
                    write_png(super::array_to_gray(self.view()))
                }
            }
        )+
    };
}

impl_mask_png!(BinaryMask, LungMask, AbnormalMask);

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_png_round_trip_dimensions() {
        let img = NormalizedImage::from_array(array![[0u8, 10, 20], [30, 40, 255]]);
        let bytes = img.to_png().unwrap();
        let back = image::load_from_memory(&bytes).unwrap().to_luma8();
        assert_eq!(back.dimensions(), (3, 2));
        assert_eq!(NormalizedImage::from_gray_image(&back), img);

        let mask = BinaryMask::from_fn((4, 5), |(r, c)| r == c);
        let back = image::load_from_memory(&mask.to_png().unwrap())
            .unwrap()
            .to_luma8();
        assert_eq!(back.dimensions(), (5, 4));
        assert_eq!(back.get_pixel(2, 2)[0], 255);
        assert_eq!(back.get_pixel(3, 2)[0], 0);
    }
}
