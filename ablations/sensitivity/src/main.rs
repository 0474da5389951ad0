//! 检测灵敏度消融实验: 在同一批胸片上扫描不同的阈值设置.

mod profile;
mod result;
mod runner;

use log::LevelFilter;
use simple_logger::SimpleLogger;

fn main() {
    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .env()
        .init()
        .expect("Logger initialization error");
    runner::run().analyze();
}
