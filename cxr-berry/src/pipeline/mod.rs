//! 一站式流程: 加载 → 预处理 → 肺野分割 → 高密度影检测 → 指标与叠加图.
//!
//! 所有用户参数都通过 [`PipelineConfig`] 显式传入, 流程不读取任何环境状态.
//! 各阶段中的意外 panic 会在边界处被捕获并转换为 [`PipelineError::Internal`],
//! 此时不返回任何部分结果.

use crate::consts::limits::DEFAULT_MASK_PADDING_PX;
use crate::detect::{self, DetectionParams};
use crate::error::PipelineResult;
use crate::preprocess::{self, WorkingResolution};
use crate::segment;
use crate::summary::{self, Metrics, OverlayAlpha, OverlayImage};
use crate::{load, AbnormalMask, LungMask, NormalizedImage, PipelineError, PngEncode, Stage};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

mod report;

pub use report::DebugReport;


#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 流程参数. 默认值与界面的默认控件取值一致.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PipelineConfig {
    /// 工作分辨率.
    pub resolution: WorkingResolution,
    /// 肺野掩膜额外 padding (像素). 0 表示不 padding.
    pub mask_padding_px: usize,
    /// 检测参数.
    pub detection: DetectionParams,
    /// 叠加图不透明度.
    pub overlay_alpha: OverlayAlpha,
}

/// 分辨率 512, padding 5, Z-score 0.9, 最小区域 200 像素, 不透明度 0.45.
impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resolution: WorkingResolution::default(),
            mask_padding_px: DEFAULT_MASK_PADDING_PX,
            detection: DetectionParams::default(),
            overlay_alpha: OverlayAlpha::default(),
        }
    }
}

/// 建议性信号. 不影响结果的完整性.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Warning {
    /// 没有找到任何肺野区域, 掩膜全空.
    SegmentationEmpty,

    /// 肺野覆盖率低于图像面积的 10%.
    UnderSegmentation {
        /// 肺野像素占图像像素的比例.
        lung_ratio: f64,
    },

    /// 肺野像素不足 1000, 没有进行统计.
    InsufficientSample {
        /// 肺野像素数.
        lung_pixels: usize,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::SegmentationEmpty => f.write_str("lung segmentation is empty"),
            Warning::UnderSegmentation { lung_ratio } => write!(
                f,
                "lung mask covers only {:.1}% of the image",
                lung_ratio * 100.0
            ),
            Warning::InsufficientSample { lung_pixels } => write!(
                f,
                "only {lung_pixels} lung pixels, too few for statistics"
            ),
        }
    }
}

/// 单张图像的完整分析结果.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// 预处理后的图像.
    pub image: NormalizedImage,
    /// 肺野掩膜.
    pub lung: LungMask,
    /// 异常掩膜.
    pub abnormal: AbnormalMask,
    /// 定量指标.
    pub metrics: Metrics,
    /// 叠加图.
    pub overlay: OverlayImage,
    /// 建议性信号, 按流程顺序排列.
    pub warnings: Vec<Warning>,
    /// 反相图像上的 Otsu 阈值.
    pub otsu_level: u8,
    /// 保留的肺野区域个数.
    pub lung_components: usize,
    /// 保留的异常区域个数.
    pub regions_kept: usize,
    /// 因面积不足被丢弃的异常区域个数.
    pub regions_dropped: usize,
}

impl Analysis {
    /// 叠加图 PNG 字节流, 供下载或持久化.
    pub fn overlay_png(&self) -> PipelineResult<Vec<u8>> {
        run_stage(Stage::Encode, || self.overlay.to_png())?
            .map_err(|source| PipelineError::Encode { source })
    }

    /// 是否存在某类警告?
    pub fn has_warning<F: Fn(&Warning) -> bool>(&self, pred: F) -> bool {
        self.warnings.iter().any(pred)
    }

    /// 调试报告.
    pub fn debug_report(&self, config: &PipelineConfig) -> DebugReport {
        DebugReport::new(self, config)
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// 执行一个阶段, 记录耗时, 并把 panic 转换为错误.
fn run_stage<T, F: FnOnce() -> T>(stage: Stage, f: F) -> PipelineResult<T> {
    let start = Instant::now();
    let out = panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let message = panic_message(payload);
        log::error!("{stage} stage panicked: {message}");
        PipelineError::Internal { stage, message }
    })?;
    log::debug!("{stage} stage finished in {:?}", start.elapsed());
    Ok(out)
}

/// 分析一份上传的图像.
///
/// `filename` 只用于按扩展名选择解码器.
pub fn analyze(bytes: &[u8], filename: &str, config: &PipelineConfig) -> PipelineResult<Analysis> {
    let loaded = run_stage(Stage::Load, || load::load(bytes, filename))??;
    analyze_image(&loaded, config)
}

/// 分析一张已加载的图像 (跳过解码).
pub fn analyze_image(
    loaded: &NormalizedImage,
    config: &PipelineConfig,
) -> PipelineResult<Analysis> {
    let image = run_stage(Stage::Preprocess, || {
        preprocess::prepare(loaded, config.resolution)
    })?;

    let seg = run_stage(Stage::Segment, || {
        segment::segment(&image, config.mask_padding_px)
    })?;
    let mut warnings = vec![];
    if seg.is_empty() {
        warnings.push(Warning::SegmentationEmpty);
    }
    if seg.is_under_segmented() {
        warnings.push(Warning::UnderSegmentation {
            lung_ratio: seg.coverage(),
        });
    }
    let (otsu_level, lung_components) = (seg.otsu_level(), seg.components());
    let lung = seg.into_mask();

    let detection = run_stage(Stage::Detect, || {
        detect::detect(&image, &lung, &config.detection)
    })?;
    if detection.is_insufficient() {
        warnings.push(Warning::InsufficientSample {
            lung_pixels: lung.count(),
        });
    }

    let (metrics, overlay) = run_stage(Stage::Summarize, || {
        summary::summarize(&image, &lung, &detection, config.overlay_alpha)
    })?;
    for w in warnings.iter() {
        log::warn!("{w}");
    }
    log::debug!(
        "{:.2}% affected ({} of {} lung pixels), {}",
        metrics.percent_affected,
        metrics.flagged_pixels,
        metrics.lung_pixels,
        metrics.explanation
    );

    let (regions_kept, regions_dropped) = (detection.regions_kept(), detection.regions_dropped());
    Ok(Analysis {
        image,
        lung,
        abnormal: detection.into_mask(),
        metrics,
        overlay,
        warnings,
        otsu_level,
        lung_components,
        regions_kept,
        regions_dropped,
    })
}

/// 批量分析. 每份上传 `(字节流, 文件名)` 独立运行一条流程, 结果与输入顺序一致.
///
/// 打开 `rayon` feature 时并行执行, 否则顺序执行.
pub fn analyze_batch(
    uploads: &[(&[u8], &str)],
    config: &PipelineConfig,
) -> Vec<PipelineResult<Analysis>> {
    log::debug!("analyzing a batch of {} uploads", uploads.len());
    batch_imp(uploads, config)
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        fn batch_imp(
            uploads: &[(&[u8], &str)],
            config: &PipelineConfig,
        ) -> Vec<PipelineResult<Analysis>> {
            use rayon::prelude::*;
            uploads
                .par_iter()
                .map(|&(bytes, filename)| analyze(bytes, filename, config))
                .collect()
        }
    } else {
        fn batch_imp(
            uploads: &[(&[u8], &str)],
            config: &PipelineConfig,
        ) -> Vec<PipelineResult<Analysis>> {
            uploads
                .iter()
                .map(|&(bytes, filename)| analyze(bytes, filename, config))
                .collect()
        }
    }
}
