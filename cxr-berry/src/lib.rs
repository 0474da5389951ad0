#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 对单张胸部 X 光片 (CXR) 进行肺野分割, 在肺野内部以统计方式标记异常高亮区域
//! (高密度影, 如磨玻璃影/实变), 并给出覆盖率指标与可视化叠加图.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 该 crate 只实现启发式图像处理流程, **不提供任何诊断结论**.
//! 2. 只处理单张 2D 图像 (PNG/JPEG 等栅格图或单帧 DICOM), 不处理 DICOM 序列/体数据.
//! 3. 核心流程不访问网络、文件系统或数据库. 结果的持久化由调用方负责.
//! 4. 流程内部不持有任何可变全局状态, 因此可以对不同请求并行调用.
//!
//! # 处理流程
//!
//! 数据严格按以下顺序流动, 任何组件都不依赖其后面的组件:
//!
//! ### 图像加载 ✅
//!
//! 从上传的字节流解码出灰度图, DICOM 额外进行 rescale 校准和 MONOCHROME1 反相,
//! 最后线性拉伸到 \[0, 255\].
//!
//! 实现位于 `cxr-berry/src/load`.
//!
//! ### 预处理 ✅
//!
//! 面积插值缩放到工作分辨率, CLAHE 局部对比度增强 (clip limit 2.0, 8×8 网格),
//! 3×3 中值滤波.
//!
//! 实现位于 `cxr-berry/src/preprocess`.
//!
//! ### 肺野分割 ✅
//!
//! 反相 + Otsu 二值化, 形态学开运算, 8-连通标记后保留面积最大的两个区域 (左右肺野),
//! 闭运算填洞并向胸膜方向略微扩张, 可选额外 padding.
//!
//! 实现位于 `cxr-berry/src/segment.rs`. 形态学算子位于 `cxr-berry/src/morph.rs`,
//! 连通区域表位于 `cxr-berry/src/region.rs`.
//!
//! ### 高密度影检测 ✅
//!
//! 两种可互换的阈值策略: Z-score 与百分位. 之后做开/闭运算去噪,
//! 并丢弃面积不足的 8-连通区域.
//!
//! 实现位于 `cxr-berry/src/detect`.
//!
//! ### 指标与叠加图 ✅
//!
//! 受累百分比, 左右肺受累比例, 外周带与下肺野占比, 以及 jet 色图叠加 (可导出 PNG).
//!
//! 实现位于 `cxr-berry/src/summary`.
//!
//! ### 一站式流程 ✅
//!
//! `pipeline::analyze` 串联上述所有步骤, 收集警告信号, 并在边界处捕获意外失败.
//! 打开 `rayon` feature 时提供并行批处理.
//!
//! ### 合成体模 ✅
//!
//! 生成带真值的合成胸片 (两个暗椭圆 + 可选亮斑), 用于测试与消融实验.
//!
//! 实现位于 `cxr-berry/src/phantom.rs`.

/// 二维索引 `(高, 宽)`, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 图像基础数据结构.
mod data;

pub use data::{
    AbnormalMask, BinaryMask, DicomAttr, IntensityWindow, LungMask, NormalizedImage,
    PngEncode, RawImage, SourceKind,
};

pub mod consts;

pub mod error;

pub use error::{DecodeError, PipelineError, Stage};

pub mod load;

pub mod preprocess;

pub mod morph;

pub mod region;

pub mod segment;

pub mod detect;

pub mod summary;

pub mod pipeline;

pub mod phantom;

pub mod prelude;
