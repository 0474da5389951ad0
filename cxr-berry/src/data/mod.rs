use image::GrayImage;
use ndarray::{Array2, ArrayView2};

pub mod encode;
pub mod gray;
pub mod mask;
pub mod raw;
pub mod window;

pub use encode::PngEncode;
pub use gray::NormalizedImage;
pub use mask::{AbnormalMask, BinaryMask, LungMask};
pub use raw::{DicomAttr, RawImage, SourceKind};
pub use window::IntensityWindow;

/// 将 `(高, 宽)` 数组视图转换为 `image` 灰度图, 以便调用 `imageproc` 算子.
pub(crate) fn array_to_gray(view: ArrayView2<u8>) -> GrayImage {
    let (h, w) = view.dim();
    GrayImage::from_fn(w as u32, h as u32, |x, y| {
        image::Luma([view[(y as usize, x as usize)]])
    })
}

/// `array_to_gray` 的逆操作.
pub(crate) fn gray_to_array(img: &GrayImage) -> Array2<u8> {
    let (w, h) = img.dimensions();
    Array2::from_shape_fn((h as usize, w as usize), |(r, c)| {
        img.get_pixel(c as u32, r as u32)[0]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_gray_conversion_keeps_orientation() {
        // 2 行 3 列
        let a = array![[1u8, 2, 3], [4, 5, 6]];
        let img = array_to_gray(a.view());
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 0)[0], 3);
        assert_eq!(img.get_pixel(0, 1)[0], 4);
        assert_eq!(gray_to_array(&img), a);
    }
}
