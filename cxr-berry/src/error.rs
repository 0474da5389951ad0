//! 运行时错误.
//!
//! 只有真正导致请求失败的情形才是错误. 分割为空、样本不足、欠分割等情形只是建议性信号,
//! 见 [`crate::pipeline::Warning`].

use std::fmt;

/// 上传字节流无法解码为灰度图.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// 字节流为空, 或解码得到的图像没有像素.
    #[error("empty image")]
    Empty,

    /// 栅格图像 (PNG/JPEG 等) 解码失败.
    #[error("cannot decode raster image: {0}")]
    Raster(#[from] image::ImageError),

    /// DICOM 解析或像素数据解码失败.
    #[error("cannot decode DICOM object: {0}")]
    Dicom(String),

    /// DICOM 内容合法, 但不是单通道灰度图.
    #[error("unsupported DICOM object: {0}")]
    UnsupportedDicom(String),
}

/// 流程中的处理阶段. 用于标注错误发生的位置.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Stage {
    /// 解码与归一化.
    Load,
    /// 缩放, CLAHE, 中值滤波.
    Preprocess,
    /// 肺野分割.
    Segment,
    /// 高密度影检测.
    Detect,
    /// 指标与叠加图.
    Summarize,
    /// PNG 编码.
    Encode,
}

impl Stage {
    /// 阶段名称.
    pub const fn name(self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::Preprocess => "preprocess",
            Stage::Segment => "segment",
            Stage::Detect => "detect",
            Stage::Summarize => "summarize",
            Stage::Encode => "encode",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 一站式流程的失败. 失败时不返回任何部分结果.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 加载阶段解码失败.
    #[error("load stage failed: {source}")]
    Decode {
        /// 底层解码错误.
        #[from]
        source: DecodeError,
    },

    /// 叠加图 PNG 编码失败.
    #[error("encode stage failed: {source}")]
    Encode {
        /// 底层编码错误.
        source: image::ImageError,
    },

    /// 某阶段出现了意外失败 (panic).
    #[error("{stage} stage failed unexpectedly: {message}")]
    Internal {
        /// 失败的阶段.
        stage: Stage,
        /// 失败信息.
        message: String,
    },
}

impl PipelineError {
    /// 发生错误的阶段.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Decode { .. } => Stage::Load,
            PipelineError::Encode { .. } => Stage::Encode,
            PipelineError::Internal { stage, .. } => *stage,
        }
    }
}

/// 流程结果.
pub type PipelineResult<T> = Result<T, PipelineError>;
