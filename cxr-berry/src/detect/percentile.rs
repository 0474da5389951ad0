use super::ThresholdInfo;
use crate::{BinaryMask, LungMask, NormalizedImage};

/// 升序样本的第 `pct` 百分位数, 在相邻秩之间线性插值. `sorted` 不能为空.
pub(super) fn percentile(sorted: &[u8], pct: u8) -> f64 {
    let rank = pct.min(100) as f64 / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let (a, b) = (sorted[lo] as f64, sorted[hi] as f64);
    a + (b - a) * (rank - lo as f64)
}

/// 标记强度不低于肺野强度 `pct` 百分位数的肺野像素.
pub(super) fn flag(
    image: &NormalizedImage,
    lung: &LungMask,
    pct: u8,
) -> (BinaryMask, ThresholdInfo) {
    let mut samples: Vec<u8> = lung.on_positions().map(|pos| image[pos]).collect();
    samples.sort_unstable();
    let threshold = percentile(&samples, pct);
    let mask = BinaryMask::from_fn(image.shape(), |pos| {
        lung.is_on(pos) && image[pos] as f64 >= threshold
    });
    let info = ThresholdInfo::Percentile {
        pct,
        intensity_threshold: threshold,
    };
    (mask, info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_interpolates() {
        let s = [1u8, 2, 3, 4];
        assert_eq!(percentile(&s, 0), 1.0);
        assert_eq!(percentile(&s, 100), 4.0);
        assert!((percentile(&s, 50) - 2.5).abs() < 1e-12);
        assert!((percentile(&s, 90) - 3.7).abs() < 1e-9);
        assert_eq!(percentile(&[9u8], 37), 9.0);
    }
}
