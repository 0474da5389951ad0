//! 程序运行函数.

use crate::profile::Profile;
use crate::result::SweepResult;
use cxr_berry::detect::ThresholdMethod;
use cxr_berry::phantom::Phantom;
use cxr_berry::pipeline::{self, PipelineConfig};
use std::thread;
use utils::loader;

/// Z-score 阈值扫描点.
const Z_SWEEP: [f64; 4] = [0.5, 0.9, 1.5, 2.5];

/// 百分位阈值扫描点.
const PCT_SWEEP: [u8; 4] = [80, 90, 95, 99];

type Upload = (String, Vec<u8>);

/// 没有可用的胸片目录时使用的合成体模.
fn phantom_uploads() -> Vec<Upload> {
    let phantoms = [
        Phantom::new(512),
        Phantom::new(512).with_texture(),
        Phantom::new(512).with_spot((300, 150), 20, 170),
        Phantom::new(640)
            .with_spot((280, 190), 16, 160)
            .with_spot((400, 450), 24, 190)
            .with_texture(),
    ];
    phantoms
        .iter()
        .enumerate()
        .filter_map(|(i, p)| match p.to_png() {
            Ok(bytes) => Some((format!("phantom-{i}.png"), bytes)),
            Err(e) => {
                log::error!("phantom {i} encoding failed: {e}");
                None
            }
        })
        .collect()
}

/// 读取 `$CXR_DIR` (或 `$HOME/dataset/cxr`) 下的全部图像. 目录不可用时退回到合成体模.
fn uploads() -> Vec<Upload> {
    let Some(dir) = loader::image_dir_from_env_or_home().filter(|d| d.is_dir()) else {
        println!("No radiograph directory found, using synthetic phantoms.");
        return phantom_uploads();
    };
    let loaded = match loader::ImageLoader::new(&dir) {
        Ok(it) => it,
        Err(e) => {
            log::error!("listing {} failed: {e}", dir.display());
            return phantom_uploads();
        }
    };

    let mut uploads = vec![];
    for (name, bytes) in loaded {
        match bytes {
            Ok(bytes) => uploads.push((name, bytes)),
            Err(e) => log::warn!("skipping {name}: {e}"),
        }
    }
    if uploads.is_empty() {
        println!("{} holds no readable images, using synthetic phantoms.", dir.display());
        return phantom_uploads();
    }
    println!("Loaded {} images from {}", uploads.len(), dir.display());
    uploads
}

/// 在全部图像上运行一种设置.
fn sweep(uploads: &[Upload], config: &PipelineConfig) -> Profile {
    let mut profile = Profile::new();
    for (name, bytes) in uploads.iter() {
        profile.start();
        let result = pipeline::analyze(bytes, name, config);
        profile.elapsed();
        match result {
            Ok(a) => profile.count_analysis(&a),
            Err(e) => {
                log::warn!("{name}: {e}");
                profile.count_failure();
            }
        }
    }
    profile.finish()
}

fn setting_name(method: &ThresholdMethod) -> String {
    match method {
        ThresholdMethod::ZScore { z_threshold } => format!("Z-score > {z_threshold:.1}"),
        ThresholdMethod::Percentile { pct } => format!("Percentile ≥ P{pct}"),
    }
}

/// 实际运行. 每个阈值设置占用一个线程.
pub fn run() -> SweepResult {
    let uploads = uploads();
    let methods: Vec<ThresholdMethod> = Z_SWEEP
        .into_iter()
        .filter_map(ThresholdMethod::zscore)
        .chain(PCT_SWEEP.into_iter().filter_map(ThresholdMethod::percentile))
        .collect();

    println!(
        "Running sensitivity sweep: {} settings on {} cores...",
        methods.len(),
        utils::cpus()
    );
    let uploads = uploads.as_slice();
    thread::scope(|s| {
        let handles: Vec<_> = methods
            .iter()
            .map(|&m| {
                let config = utils::config_with(m);
                s.spawn(move || sweep(uploads, &config))
            })
            .collect();

        SweepResult::from_iter(
            methods.iter().map(setting_name).zip(
                handles
                    .into_iter()
                    .map(|th| th.join().expect("Thread joining error")),
            ),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phantom_sweep() {
        let uploads = phantom_uploads();
        assert_eq!(uploads.len(), 4);
        let loose = sweep(&uploads, &utils::config_with(ThresholdMethod::Percentile { pct: 80 }));
        let strict = sweep(&uploads, &utils::config_with(ThresholdMethod::Percentile { pct: 99 }));
        assert_eq!(loose.get_analyzed(), 4);
        assert_eq!(loose.get_failed(), 0);
        assert!(loose.get_avg_percent() >= strict.get_avg_percent());
    }

    #[test]
    fn test_setting_name() {
        assert_eq!(
            setting_name(&ThresholdMethod::ZScore { z_threshold: 0.9 }),
            "Z-score > 0.9"
        );
        assert_eq!(
            setting_name(&ThresholdMethod::Percentile { pct: 95 }),
            "Percentile ≥ P95"
        );
    }
}
