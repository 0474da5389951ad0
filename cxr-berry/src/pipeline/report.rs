//! 调试报告.

use super::{Analysis, PipelineConfig};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 一次运行的调试信息, 对应界面上的调试面板.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DebugReport {
    /// 阈值策略名称.
    pub threshold_method: String,
    /// 阈值说明.
    pub explanation: String,
    /// 图像像素总数.
    pub image_pixels: usize,
    /// 肺野像素数.
    pub lung_pixels: usize,
    /// 被标记像素数.
    pub flagged_pixels: usize,
    /// 肺野像素占图像像素的百分比.
    pub lung_ratio_percent: f64,
    /// 最小区域面积 (像素).
    pub min_region_px: usize,
    /// 肺野掩膜 padding (像素).
    pub mask_padding_px: usize,
    /// 工作分辨率 (边长).
    pub working_resolution: usize,
    /// 反相图像上的 Otsu 阈值.
    pub otsu_level: u8,
    /// 保留的肺野区域个数.
    pub lung_components: usize,
    /// 保留的异常区域个数.
    pub regions_kept: usize,
    /// 因面积不足被丢弃的异常区域个数.
    pub regions_dropped: usize,
    /// 警告.
    pub warnings: Vec<String>,
}

impl DebugReport {
    pub(super) fn new(analysis: &Analysis, config: &PipelineConfig) -> Self {
        let m = &analysis.metrics;
        Self {
            threshold_method: config.detection.method().name().to_string(),
            explanation: m.explanation.clone(),
            image_pixels: m.image_pixels,
            lung_pixels: m.lung_pixels,
            flagged_pixels: m.flagged_pixels,
            lung_ratio_percent: m.lung_ratio * 100.0,
            min_region_px: config.detection.min_region_px(),
            mask_padding_px: config.mask_padding_px,
            working_resolution: config.resolution.side(),
            otsu_level: analysis.otsu_level,
            lung_components: analysis.lung_components,
            regions_kept: analysis.regions_kept,
            regions_dropped: analysis.regions_dropped,
            warnings: analysis.warnings.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl fmt::Display for DebugReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "threshold method   : {}", self.threshold_method)?;
        writeln!(f, "explanation        : {}", self.explanation)?;
        writeln!(f, "image pixels       : {}", self.image_pixels)?;
        writeln!(f, "lung pixels        : {}", self.lung_pixels)?;
        writeln!(f, "flagged pixels     : {}", self.flagged_pixels)?;
        writeln!(f, "lung ratio         : {:.1}%", self.lung_ratio_percent)?;
        writeln!(f, "min region (px)    : {}", self.min_region_px)?;
        writeln!(f, "mask padding (px)  : {}", self.mask_padding_px)?;
        writeln!(f, "working resolution : {}", self.working_resolution)?;
        writeln!(f, "otsu level         : {}", self.otsu_level)?;
        writeln!(f, "lung components    : {}", self.lung_components)?;
        writeln!(
            f,
            "regions kept/drop  : {}/{}",
            self.regions_kept, self.regions_dropped
        )?;
        for w in self.warnings.iter() {
            writeln!(f, "warning            : {w}")?;
        }
        Ok(())
    }
}
