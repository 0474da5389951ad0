//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::Idx2d;

pub use crate::{
    AbnormalMask, BinaryMask, DicomAttr, IntensityWindow, LungMask, NormalizedImage, PngEncode,
    RawImage, SourceKind,
};

pub use crate::error::{DecodeError, PipelineError, PipelineResult, Stage};

pub use crate::load::load;
pub use crate::preprocess::{prepare, WorkingResolution};
pub use crate::segment::{segment, Segmentation};

pub use crate::detect::{detect, Detection, DetectionParams, ThresholdInfo, ThresholdMethod};
pub use crate::summary::{summarize, Metrics, OverlayAlpha, OverlayImage, ZoneBreakdown};

pub use crate::pipeline::{
    analyze, analyze_batch, analyze_image, Analysis, DebugReport, PipelineConfig, Warning,
};

pub use crate::phantom::Phantom;
