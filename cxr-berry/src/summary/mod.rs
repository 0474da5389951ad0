//! 指标与叠加图.

use crate::detect::{Detection, ThresholdInfo};
use crate::region::RegionTable;
use crate::{LungMask, NormalizedImage};

mod overlay;

pub use overlay::{OverlayAlpha, OverlayImage, JET};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 没有可用阈值时的说明文字.
pub const NO_THRESHOLD: &str = "n/a";

/// 受累区域的分区统计. 所有数值都是百分比.
///
/// "左" "右" 指图像的左右半幅 (以图像竖直中线划分), 不是患者的左右侧.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ZoneBreakdown {
    /// 左半幅肺野中被标记像素的比例. 左半幅没有肺野时为 0.
    pub left_percent: f64,

    /// 右半幅肺野中被标记像素的比例. 右半幅没有肺野时为 0.
    pub right_percent: f64,

    /// 被标记像素中位于外周带 (所在肺野包围盒远离中线的三分之一) 的比例.
    pub peripheral_share: f64,

    /// 被标记像素中位于下肺野 (所在肺野包围盒的下三分之一) 的比例.
    pub lower_zone_share: f64,
}

/// 单次运行的定量指标. 只计算一次, 核心库不做持久化.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Metrics {
    /// 图像像素总数.
    pub image_pixels: usize,
    /// 肺野像素数.
    pub lung_pixels: usize,
    /// 被标记像素数.
    pub flagged_pixels: usize,
    /// 受累百分比 `flagged / lung * 100`. 肺野为空时为 0.
    pub percent_affected: f64,
    /// 肺野像素占图像像素的比例, 0 ~ 1.
    pub lung_ratio: f64,
    /// 实际使用的阈值. 肺野样本不足时为 `None`.
    pub threshold: Option<ThresholdInfo>,
    /// 人类可读的阈值说明.
    pub explanation: String,
    /// 分区统计.
    pub zones: ZoneBreakdown,
}

#[inline]
fn percent(part: usize, whole: usize) -> f64 {
    match whole {
        0 => 0.0,
        n => part as f64 / n as f64 * 100.0,
    }
}

fn zone_breakdown(lung: &LungMask, detection: &Detection) -> ZoneBreakdown {
    let abnormal = detection.mask();
    let (_, width) = lung.shape();
    let in_left = |c: usize| 2 * c < width;

    let (mut lung_left, mut lung_right) = (0usize, 0usize);
    for (_, c) in lung.on_positions() {
        if in_left(c) {
            lung_left += 1;
        } else {
            lung_right += 1;
        }
    }

    let fields = RegionTable::label(lung);
    let (mut flagged, mut flag_left, mut flag_right) = (0usize, 0usize, 0usize);
    let (mut peripheral, mut lower) = (0usize, 0usize);
    for (r, c) in abnormal.on_positions() {
        flagged += 1;
        if in_left(c) {
            flag_left += 1;
        } else {
            flag_right += 1;
        }
        let Some(field) = fields.label_at((r, c)).and_then(|l| fields.get(l)) else {
            continue;
        };
        let bbox = field.bbox;
        let lateral = if 2.0 * field.centroid.1 < width as f64 {
            3 * (c - bbox.left) < bbox.width()
        } else {
            3 * (bbox.right - c) < bbox.width()
        };
        if lateral {
            peripheral += 1;
        }
        if 3 * (bbox.bottom - r) < bbox.height() {
            lower += 1;
        }
    }

    ZoneBreakdown {
        left_percent: percent(flag_left, lung_left),
        right_percent: percent(flag_right, lung_right),
        peripheral_share: percent(peripheral, flagged),
        lower_zone_share: percent(lower, flagged),
    }
}

/// 计算指标并渲染叠加图.
///
/// # 注意
///
/// `image`, `lung` 和 `detection` 的掩膜形状必须一致, 否则程序 panic.
pub fn summarize(
    image: &NormalizedImage,
    lung: &LungMask,
    detection: &Detection,
    alpha: OverlayAlpha,
) -> (Metrics, OverlayImage) {
    assert_eq!(image.shape(), lung.shape(), "图像与肺野掩膜形状不符");
    assert_eq!(lung.shape(), detection.mask().shape(), "肺野与异常掩膜形状不符");

    let image_pixels = image.size();
    let lung_pixels = lung.count();
    let flagged_pixels = detection.mask().count();
    let threshold = detection.info().copied();
    let metrics = Metrics {
        image_pixels,
        lung_pixels,
        flagged_pixels,
        percent_affected: percent(flagged_pixels, lung_pixels),
        lung_ratio: percent(lung_pixels, image_pixels) / 100.0,
        explanation: threshold.map_or_else(|| NO_THRESHOLD.to_string(), |t| t.explain()),
        threshold,
        zones: zone_breakdown(lung, detection),
    };
    let overlay = OverlayImage::render(image, detection.mask(), alpha);
    (metrics, overlay)
}
