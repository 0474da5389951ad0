//! 检测参数.

use crate::consts::limits::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 阈值策略. 每次检测只分派一次.
#[derive(PartialEq, Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "method", rename_all = "snake_case"))]
pub enum ThresholdMethod {
    /// 高斯模糊后的强度相对肺野均值的标准分数大于 `z_threshold` 的像素被标记.
    ZScore {
        /// 标准分数阈值. 越低越敏感.
        z_threshold: f64,
    },

    /// 强度不低于肺野强度 `pct` 百分位数的像素被标记.
    Percentile {
        /// 百分位, 0 ~ 100. 越低越敏感.
        pct: u8,
    },
}

impl ThresholdMethod {
    /// Z-score 策略. `z_threshold` 必须有限, 否则返回 `None`.
    pub fn zscore(z_threshold: f64) -> Option<ThresholdMethod> {
        z_threshold
            .is_finite()
            .then_some(Self::ZScore { z_threshold })
    }

    /// 百分位策略. `pct` 不能超过 100, 否则返回 `None`.
    pub fn percentile(pct: u8) -> Option<ThresholdMethod> {
        (pct <= 100).then_some(Self::Percentile { pct })
    }

    /// 策略名称, 与界面上的选项一致.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ZScore { .. } => "Z-score",
            Self::Percentile { .. } => "Percentile",
        }
    }
}

impl Default for ThresholdMethod {
    fn default() -> Self {
        Self::ZScore {
            z_threshold: DEFAULT_Z_THRESHOLD,
        }
    }
}

/// 检测参数: 阈值策略和最小区域面积. 创建后不可修改.
#[derive(PartialEq, Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectionParams {
    method: ThresholdMethod,
    min_region_px: usize,
}

impl DetectionParams {
    /// 构建检测参数. 面积小于 `min_region_px` 的 8-连通区域会被丢弃.
    #[inline]
    pub const fn new(method: ThresholdMethod, min_region_px: usize) -> Self {
        Self {
            method,
            min_region_px,
        }
    }

    /// 阈值策略.
    #[inline]
    pub fn method(&self) -> ThresholdMethod {
        self.method
    }

    /// 最小区域面积 (像素).
    #[inline]
    pub fn min_region_px(&self) -> usize {
        self.min_region_px
    }
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self::new(ThresholdMethod::default(), DEFAULT_MIN_REGION_PX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_constructors() {
        assert!(ThresholdMethod::zscore(f64::NAN).is_none());
        assert!(ThresholdMethod::zscore(f64::INFINITY).is_none());
        assert_eq!(
            ThresholdMethod::zscore(-0.5),
            Some(ThresholdMethod::ZScore { z_threshold: -0.5 })
        );
        assert!(ThresholdMethod::percentile(101).is_none());
        assert_eq!(
            ThresholdMethod::percentile(0),
            Some(ThresholdMethod::Percentile { pct: 0 })
        );
        assert_eq!(ThresholdMethod::default().name(), "Z-score");
    }

    #[test]
    fn test_default_params() {
        let p = DetectionParams::default();
        assert_eq!(p.min_region_px(), 200);
        assert_eq!(p.method(), ThresholdMethod::ZScore { z_threshold: 0.9 });
    }
}
