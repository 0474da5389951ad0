//! 肺野内高密度影检测.
//!
//! 两种可互换的阈值策略共享同一套后处理:
//!
//! 1. 3×3 开运算去除孤立噪点;
//! 2. 5×5 闭运算连接相邻碎片;
//! 3. 与肺野掩膜再次求交, 闭运算不会把标记带出肺野;
//! 4. 8-连通标记, 丢弃面积小于 `min_region_px` 的区域.
//!
//! 开/闭运算和求交都是单调操作, 因此降低阈值 (`z_threshold` 或 `pct`) 永远不会减少标记面积.

use crate::consts::detect::*;
use crate::morph;
use crate::region::RegionTable;
use crate::{AbnormalMask, BinaryMask, LungMask, NormalizedImage};

mod params;
mod percentile;
mod zscore;

pub use params::{DetectionParams, ThresholdMethod};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 实际使用的阈值.
#[derive(PartialEq, Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "method", rename_all = "snake_case"))]
pub enum ThresholdInfo {
    /// Z-score 策略.
    ZScore {
        /// 肺野强度均值.
        mean: f64,
        /// 肺野强度总体标准差 (含修正量).
        std: f64,
        /// 标准分数阈值.
        z_threshold: f64,
    },

    /// 百分位策略.
    Percentile {
        /// 百分位.
        pct: u8,
        /// 对应的强度阈值.
        intensity_threshold: f64,
    },
}

impl ThresholdInfo {
    /// 人类可读的阈值说明.
    pub fn explain(&self) -> String {
        match *self {
            Self::ZScore {
                mean,
                std,
                z_threshold,
            } => format!("Z-score > {z_threshold:.2} (mean={mean:.1}, std={std:.1})"),
            Self::Percentile {
                pct,
                intensity_threshold,
            } => format!("Percentile ≥ P{pct} (intensity ≥ {intensity_threshold:.1})"),
        }
    }
}

/// 检测结果.
#[derive(Debug, Clone)]
pub struct Detection {
    mask: AbnormalMask,
    info: Option<ThresholdInfo>,
    regions_kept: usize,
    regions_dropped: usize,
}

impl Detection {
    /// 异常掩膜.
    #[inline]
    pub fn mask(&self) -> &AbnormalMask {
        &self.mask
    }

    /// 取出异常掩膜.
    #[inline]
    pub fn into_mask(self) -> AbnormalMask {
        self.mask
    }

    /// 实际使用的阈值. 肺野样本不足时为 `None`.
    #[inline]
    pub fn info(&self) -> Option<&ThresholdInfo> {
        self.info.as_ref()
    }

    /// 肺野样本不足, 没有进行统计?
    #[inline]
    pub fn is_insufficient(&self) -> bool {
        self.info.is_none()
    }

    /// 保留的区域个数.
    #[inline]
    pub fn regions_kept(&self) -> usize {
        self.regions_kept
    }

    /// 因面积不足被丢弃的区域个数.
    #[inline]
    pub fn regions_dropped(&self) -> usize {
        self.regions_dropped
    }
}

/// 在肺野内标记统计意义上偏亮的像素.
///
/// 肺野像素少于 1000 时不做统计, 返回全空掩膜且 `info` 为 `None`.
///
/// # 注意
///
/// `image` 和 `lung` 形状必须一致, 否则程序 panic.
pub fn detect(image: &NormalizedImage, lung: &LungMask, params: &DetectionParams) -> Detection {
    assert_eq!(image.shape(), lung.shape(), "图像与肺野掩膜形状不符");
    let lung_pixels = lung.count();
    if lung_pixels < MIN_LUNG_SAMPLE {
        log::debug!("only {lung_pixels} lung pixels, skip detection");
        return Detection {
            mask: BinaryMask::zeros(image.shape()).into(),
            info: None,
            regions_kept: 0,
            regions_dropped: 0,
        };
    }

    let (candidates, info) = match params.method() {
        ThresholdMethod::ZScore { z_threshold } => zscore::flag(image, lung, z_threshold),
        ThresholdMethod::Percentile { pct } => percentile::flag(image, lung, pct),
    };
    log::debug!("{}: {} candidate pixels", info.explain(), candidates.count());

    let opened = morph::open(candidates.view(), OPEN_KERNEL, 1);
    let closed = morph::close(opened.view(), CLOSE_KERNEL, 1);
    let mut cleaned = BinaryMask::from_array(closed);
    cleaned.intersect(lung);

    let table = RegionTable::label(&cleaned);
    let min_area = params.min_region_px();
    let regions_kept = table.regions().iter().filter(|r| r.area >= min_area).count();
    let mask = table.retain(|r| r.area >= min_area);
    Detection {
        mask: mask.into(),
        info: Some(info),
        regions_kept,
        regions_dropped: table.len() - regions_kept,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn noisy(shape: (usize, usize)) -> NormalizedImage {
        NormalizedImage::from_array(Array2::from_shape_fn(shape, |(r, c)| {
            (40 + (r * 31 + c * 17) % 29) as u8
        }))
    }

    #[test]
    fn test_small_sample_guard() {
        let img = noisy((100, 100));
        // 30×30 = 900 < 1000
        let lung: LungMask = BinaryMask::from_fn((100, 100), |(r, c)| r < 30 && c < 30).into();
        for method in [
            ThresholdMethod::ZScore { z_threshold: -5.0 },
            ThresholdMethod::Percentile { pct: 0 },
        ] {
            let d = detect(&img, &lung, &DetectionParams::new(method, 1));
            assert!(d.is_insufficient());
            assert!(d.mask().is_empty());
            assert_eq!(d.regions_kept(), 0);
        }
    }

    #[test]
    fn test_region_filter() {
        // 一个 20×20 亮块, 一个 6×6 亮块, 背景有纹理.
        let mut data = noisy((80, 80)).into_array();
        data.slice_mut(ndarray::s![10..30, 10..30]).fill(250);
        data.slice_mut(ndarray::s![50..56, 50..56]).fill(250);
        let img = NormalizedImage::from_array(data);
        let lung: LungMask = BinaryMask::from_fn((80, 80), |_| true).into();

        let params = DetectionParams::new(ThresholdMethod::Percentile { pct: 99 }, 100);
        let d = detect(&img, &lung, &params);
        assert_eq!(d.regions_kept(), 1);
        assert_eq!(d.regions_dropped(), 1);
        assert_eq!(d.mask().count(), 400);
        assert!(d.mask().is_on((20, 20)));
        assert!(!d.mask().is_on((52, 52)));
        match d.info() {
            Some(ThresholdInfo::Percentile {
                pct: 99,
                intensity_threshold,
            }) => assert_eq!(*intensity_threshold, 250.0),
            other => panic!("unexpected info {other:?}"),
        }
    }

    #[test]
    fn test_explain() {
        let z = ThresholdInfo::ZScore {
            mean: 31.94,
            std: 12.345,
            z_threshold: 0.9,
        };
        assert_eq!(z.explain(), "Z-score > 0.90 (mean=31.9, std=12.3)");
        let p = ThresholdInfo::Percentile {
            pct: 90,
            intensity_threshold: 181.26,
        };
        assert_eq!(p.explain(), "Percentile ≥ P90 (intensity ≥ 181.3)");
    }
}
