//! 流程运行统计.

use cxr_berry::pipeline::{Analysis, Warning};
use std::time::{Duration, Instant};

/// 累计计时器. 支持 "中途中断" 与 "结束中断, 继续开始计时".
#[derive(Clone, Debug)]
struct AccTimer {
    consumed: Duration,
    since: Instant,
}

impl AccTimer {
    /// 初始化计时器. 初始化时视为已经开始计时.
    #[inline]
    fn new() -> Self {
        Self {
            consumed: Duration::from_secs(0),
            since: Instant::now(),
        }
    }

    #[inline]
    fn start(&mut self) {
        self.since = Instant::now();
    }

    /// 结束计时, 并将这一区间的时间累加. 返回本轮计时时长.
    ///
    /// # 注意
    ///
    /// 上一次调用必须是 `self.start()`, 否则计算时间值无意义.
    #[inline]
    fn elapsed(&mut self) -> Duration {
        let d = self.since.elapsed();
        self.consumed += d;
        d
    }

    #[inline]
    fn get_total_us(&self) -> u64 {
        self.consumed.as_micros() as u64
    }
}

/// 单个阈值设置在整批图像上的统计.
#[derive(Clone, Debug)]
pub struct Profile {
    /// 成功分析的图像个数.
    analyzed: u64,

    /// 加载或分析失败的图像个数.
    failed: u64,

    /// 带有任意警告的图像个数.
    warned: u64,

    /// 肺野样本不足, 没有进行检测的图像个数.
    insufficient: u64,

    /// 受累百分比之和, 用于求平均.
    percent_sum: f64,

    /// 受累百分比最大值.
    percent_max: f64,

    /// 分析图像花费的总时间.
    analyze_time: AccTimer,

    /// 整个任务花费的总时间.
    real_time: AccTimer,

    /// 最耗时的一次分析.
    most: Option<Duration>,
}

impl Profile {
    /// 初始化.
    #[inline]
    pub fn new() -> Self {
        Self {
            analyzed: 0,
            failed: 0,
            warned: 0,
            insufficient: 0,
            percent_sum: 0.0,
            percent_max: 0.0,
            analyze_time: AccTimer::new(),
            real_time: AccTimer::new(),
            most: None,
        }
    }

    /// 开始一次分析计时.
    #[inline]
    pub fn start(&mut self) {
        self.analyze_time.start();
    }

    /// 结束一次分析计时.
    #[inline]
    pub fn elapsed(&mut self) {
        let d = self.analyze_time.elapsed();
        self.most = Some(self.most.map_or(d, |m| m.max(d)));
    }

    /// 记录一次成功的分析.
    pub fn count_analysis(&mut self, a: &Analysis) {
        self.analyzed += 1;
        if !a.warnings.is_empty() {
            self.warned += 1;
        }
        if a.has_warning(|w| matches!(w, Warning::InsufficientSample { .. })) {
            self.insufficient += 1;
        }
        let p = a.metrics.percent_affected;
        self.percent_sum += p;
        self.percent_max = self.percent_max.max(p);
    }

    /// 记录一次失败.
    #[inline]
    pub fn count_failure(&mut self) {
        self.failed += 1;
    }

    /// 结束全部计时.
    #[inline]
    pub fn finish(mut self) -> Self {
        self.real_time.elapsed();
        self
    }

    #[inline]
    pub fn get_analyzed(&self) -> u64 {
        self.analyzed
    }

    #[inline]
    pub fn get_failed(&self) -> u64 {
        self.failed
    }

    #[inline]
    pub fn get_warned(&self) -> u64 {
        self.warned
    }

    #[inline]
    pub fn get_insufficient(&self) -> u64 {
        self.insufficient
    }

    /// 平均受累百分比. 没有成功分析的图像时返回 `None`.
    pub fn get_avg_percent(&self) -> Option<f64> {
        match self.analyzed {
            0 => None,
            n => Some(self.percent_sum / n as f64),
        }
    }

    #[inline]
    pub fn get_max_percent(&self) -> f64 {
        self.percent_max
    }

    /// 以微秒为单位获得分析图像的总花费时间.
    #[inline]
    pub fn get_analyze_time_us(&self) -> u64 {
        self.analyze_time.get_total_us()
    }

    /// 以微秒为单位获得平均每张图像的分析时间.
    pub fn get_avg_analyze_time_us(&self) -> Option<f64> {
        match self.analyzed + self.failed {
            0 => None,
            n => Some(self.get_analyze_time_us() as f64 / n as f64),
        }
    }

    /// 以微秒为单位获得整个任务的总时间.
    #[inline]
    pub fn get_real_time_us(&self) -> u64 {
        self.real_time.get_total_us()
    }

    /// 最耗时的一次分析. 不存在任务时返回 `None`.
    #[inline]
    pub fn get_most_time_consuming(&self) -> Option<Duration> {
        self.most
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}
