//! 消融实验依赖的通用组件.

use cxr_berry::detect::{DetectionParams, ThresholdMethod};
use cxr_berry::pipeline::PipelineConfig;

pub mod loader;

const SEP: &str = "--------------------------------------------------------";

/// 简单分隔线.
#[inline]
pub fn sep() {
    println!("{SEP}");
}

/// 获得可并行核心数.
pub fn cpus() -> usize {
    std::thread::available_parallelism().map_or_else(|_| num_cpus::get(), usize::from)
}

/// 以 `method` 为阈值策略, 其余参数取默认值的流程配置.
#[inline]
pub fn config_with(method: ThresholdMethod) -> PipelineConfig {
    let min_region_px = DetectionParams::default().min_region_px();
    PipelineConfig {
        detection: DetectionParams::new(method, min_region_px),
        ..Default::default()
    }
}
