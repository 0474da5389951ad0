//! 图像加载.
//!
//! 把上传的字节流解码为校准后的强度图, 再线性拉伸到 \[0, 255\].
//! 纯函数, 不访问文件系统.

use crate::{DecodeError, NormalizedImage, RawImage, SourceKind};

mod dicom;
mod raster;

/// 按 `filename` 扩展名选择解码器, 解码并归一化.
///
/// - `.dcm` / `.dicom` (忽略大小写) 按 DICOM 解码, 只取第一帧;
/// - 其余一律按栅格图像解码并转为 8-bit 灰度.
///
/// 归一化规则见 [`RawImage::normalize`].
pub fn load(bytes: &[u8], filename: &str) -> Result<NormalizedImage, DecodeError> {
    decode(bytes, filename).map(RawImage::normalize)
}

/// 同 `load`, 但返回归一化之前的原始强度图.
pub fn decode(bytes: &[u8], filename: &str) -> Result<RawImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    let raw = match SourceKind::from_filename(filename) {
        SourceKind::Raster => raster::decode(bytes)?,
        SourceKind::Dicom => dicom::decode(bytes)?,
    };
    let (h, w) = raw.shape();
    if h == 0 || w == 0 {
        return Err(DecodeError::Empty);
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PngEncode;

    fn gradient_png() -> Vec<u8> {
        // 亮度范围 [40, 197], 非 [0, 255].
        let img = image::GrayImage::from_fn(64, 32, |x, _| {
            let x = x as u8;
            image::Luma([40 + x * 2 + x / 2])
        });
        NormalizedImage::from_gray_image(&img).to_png().unwrap()
    }

    #[test]
    fn test_load_stretches_to_full_range() {
        let img = load(&gradient_png(), "chest.PNG").unwrap();
        assert_eq!(img.shape(), (32, 64));
        assert_eq!(img.min_max(), Some((0, 255)));
    }

    #[test]
    fn test_load_constant_is_black() {
        let flat = NormalizedImage::from_array(ndarray::Array2::from_elem((10, 12), 77u8));
        let img = load(&flat.to_png().unwrap(), "flat.png").unwrap();
        assert_eq!(img.shape(), (10, 12));
        assert!(img.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_load_rejects_bad_input() {
        assert!(matches!(load(&[], "a.png"), Err(DecodeError::Empty)));
        assert!(matches!(load(&[], "a.dcm"), Err(DecodeError::Empty)));

        let garbage = b"definitely not an image".to_vec();
        assert!(matches!(load(&garbage, "a.png"), Err(DecodeError::Raster(_))));
        assert!(matches!(load(&garbage, "a.jpg"), Err(DecodeError::Raster(_))));
        assert!(matches!(load(&garbage, "a.dcm"), Err(DecodeError::Dicom(_))));
    }

    #[test]
    fn test_load_png_bytes_named_as_dicom() {
        // 扩展名决定解码器.
        assert!(matches!(
            load(&gradient_png(), "scan.dicom"),
            Err(DecodeError::Dicom(_))
        ));
    }
}
