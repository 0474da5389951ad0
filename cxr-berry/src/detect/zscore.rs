use super::ThresholdInfo;
use crate::consts::detect::*;
use crate::{BinaryMask, LungMask, NormalizedImage};
use image::{ImageBuffer, Luma};

type FloatImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// 肺野强度的均值和总体标准差 (已加上修正量). `lung` 不能为空.
pub(super) fn lung_stats(image: &NormalizedImage, lung: &LungMask) -> (f64, f64) {
    let (n, sum, sq) = lung.on_positions().fold((0usize, 0.0, 0.0), |(n, s, q), pos| {
        let v = image[pos] as f64;
        (n + 1, s + v, q + v * v)
    });
    let n = n as f64;
    let mean = sum / n;
    let var = (sq / n - mean * mean).max(0.0);
    (mean, var.sqrt() + STD_EPSILON)
}

/// 整幅图像的高斯模糊. 全程使用 f32, 不回写为 u8.
fn blur(image: &NormalizedImage) -> FloatImage {
    let (rows, cols) = image.shape();
    let float = FloatImage::from_fn(cols as u32, rows as u32, |x, y| {
        Luma([image[(y as usize, x as usize)] as f32])
    });
    imageproc::filter::gaussian_blur_f32(&float, BLUR_SIGMA)
}

/// 标记高斯模糊后标准分数大于 `z_threshold` 的肺野像素.
///
/// 与均值的偏差小于 [`BLUR_TOLERANCE`] 时按 0 计.
pub(super) fn flag(
    image: &NormalizedImage,
    lung: &LungMask,
    z_threshold: f64,
) -> (BinaryMask, ThresholdInfo) {
    let (mean, std) = lung_stats(image, lung);
    let blurred = blur(image);
    let mask = BinaryMask::from_fn(image.shape(), |(r, c)| {
        if !lung.is_on((r, c)) {
            return false;
        }
        let dev = blurred.get_pixel(c as u32, r as u32)[0] as f64 - mean;
        let dev = if dev.abs() < BLUR_TOLERANCE { 0.0 } else { dev };
        dev / std > z_threshold
    });
    let info = ThresholdInfo::ZScore {
        mean,
        std,
        z_threshold,
    };
    (mask, info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_lung_stats() {
        let img = NormalizedImage::from_array(Array2::from_shape_fn((4, 4), |(r, _)| {
            [10u8, 20, 30, 200][r]
        }));
        // 只统计前两行: 10 和 20.
        let lung: LungMask = BinaryMask::from_fn((4, 4), |(r, _)| r < 2).into();
        let (mean, std) = lung_stats(&img, &lung);
        assert!((mean - 15.0).abs() < 1e-12);
        assert!((std - 5.0 - STD_EPSILON).abs() < 1e-9);
    }

    #[test]
    fn test_flag_stays_in_lung() {
        let img = NormalizedImage::from_array(Array2::from_shape_fn((40, 40), |(r, c)| {
            ((r * 13 + c * 7) % 200) as u8
        }));
        let lung: LungMask = BinaryMask::from_fn((40, 40), |(_, c)| c < 20).into();
        let (mask, info) = flag(&img, &lung, -10.0);
        // 阈值极低时整个肺野都被标记.
        assert_eq!(mask, *lung);
        assert!(matches!(info, ThresholdInfo::ZScore { z_threshold, .. } if z_threshold == -10.0));
    }

    #[test]
    fn test_blur_keeps_constant() {
        for v in [0u8, 30, 189, 227, 255] {
            let img = NormalizedImage::from_array(Array2::from_elem((24, 20), v));
            let blurred = blur(&img);
            assert_eq!(blurred.dimensions(), (20, 24));
            assert!(blurred.pixels().all(|p| (p[0] - v as f32).abs() < 1e-3));
        }
    }

    #[test]
    fn test_uniform_lung_flags_nothing() {
        let img = NormalizedImage::from_array(Array2::from_elem((30, 30), 189u8));
        let lung: LungMask = BinaryMask::from_fn((30, 30), |(r, _)| r >= 10).into();
        let (mask, _) = flag(&img, &lung, 0.0);
        assert!(mask.is_empty());
        let (mask, _) = flag(&img, &lung, -0.5);
        assert_eq!(mask, *lung);
    }
}
