/// 线性灰度窗口, 将 \[下限, 上限\] 的强度线性映射到 \[0, 255\].
///
/// 该窗口是只读的. 若要修改窗口参数, 你应该创建新的实例.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntensityWindow {
    lower: f32,
    upper: f32,
}

impl IntensityWindow {
    /// 构建强度窗口.
    ///
    /// `lower` 和 `upper` 必须有限且 `lower <= upper`, 否则返回 `None`.
    /// `lower == upper` 的窗口是平坦的, 所有强度都映射为 0.
    pub fn new(lower: f32, upper: f32) -> Option<IntensityWindow> {
        if lower.is_finite() && upper.is_finite() && lower <= upper {
            Some(Self { lower, upper })
        } else {
            None
        }
    }

    /// 以样本中有限值的最小值和最大值构建窗口 (min-max 归一化).
    ///
    /// 非有限值 (inf, NaN) 被忽略. 若不存在有限值则返回 `None`.
    pub fn from_samples<I: IntoIterator<Item = f32>>(samples: I) -> Option<IntensityWindow> {
        use itertools::{Itertools, MinMaxResult};
        let finite = samples.into_iter().filter(|v| v.is_finite());
        // f32 不是 `Ord`, 借助 `total_cmp` 比较.
        match finite.minmax_by(|a, b| a.total_cmp(b)) {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(v) => Self::new(v, v),
            MinMaxResult::MinMax(lo, hi) => Self::new(lo, hi),
        }
    }

    /// 窗下限.
    #[inline]
    pub fn lower_bound(&self) -> f32 {
        self.lower
    }

    /// 窗上限.
    #[inline]
    pub fn upper_bound(&self) -> f32 {
        self.upper
    }

    /// 窗宽.
    #[inline]
    pub fn width(&self) -> f32 {
        self.upper - self.lower
    }

    /// 窗口是否平坦 (宽度为 0)?
    #[inline]
    pub fn is_flat(&self) -> bool {
        self.width() <= 0.0
    }

    /// 求 `v` 在当前窗口下对应的灰度值 (0 <= value <= 255), 四舍五入.
    ///
    /// 平坦窗口总是返回 `Some(0)`. 如果 `v` 无意义 (如 inf, NaN), 则返回 `None`.
    pub fn eval(&self, v: f32) -> Option<u8> {
        if !v.is_finite() {
            return None;
        }
        if self.is_flat() || v <= self.lower {
            Some(u8::MIN)
        } else if v >= self.upper {
            Some(u8::MAX)
        } else {
            // 255, not 256.
            let scaled = (v - self.lower) as f64 / self.width() as f64 * 255.0;
            Some(scaled.round() as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::IntensityWindow;

    fn is_valid_init(lower: f32, upper: f32) -> bool {
        IntensityWindow::new(lower, upper).is_some()
    }

    #[test]
    fn test_intensity_window_invalid_input() {
        assert!(!is_valid_init(1.0, 0.0));
        assert!(!is_valid_init(f32::NAN, 0.0));
        assert!(!is_valid_init(0.0, f32::INFINITY));
        assert!(is_valid_init(3.0, 3.0));
    }

    #[test]
    fn test_intensity_window_generic() {
        // [60, 100]
        let w = IntensityWindow::new(60.0, 100.0).unwrap();
        assert_eq!(w.eval(f32::NAN), None);
        assert_eq!(w.eval(f32::NEG_INFINITY), None);
        assert_eq!(w.eval(f32::MIN), Some(0));
        assert_eq!(w.eval(f32::MAX), Some(255));

        assert_eq!(w.eval(50.0), Some(0));
        assert_eq!(w.eval(60.0), Some(0));

        // boundary 1
        assert_eq!(w.eval(60.1), Some(1));
        // -- boundary 1

        // 63.75 -> 64
        assert_eq!(w.eval(70.0), Some(64));
        // 127.5 -> 128
        assert_eq!(w.eval(80.0), Some(128));
        // 191.25 -> 191
        assert_eq!(w.eval(90.0), Some(191));

        // boundary 2
        assert_eq!(w.eval(99.999), Some(255));
        assert_eq!(w.eval(99.9), Some(254));
        // -- boundary 2

        assert_eq!(w.eval(100.0), Some(u8::MAX));
    }

    #[test]
    fn test_intensity_window_from_samples() {
        let w = IntensityWindow::from_samples([3.0, f32::NAN, -2.0, 8.0, f32::INFINITY]).unwrap();
        assert_eq!(w.lower_bound(), -2.0);
        assert_eq!(w.upper_bound(), 8.0);

        let flat = IntensityWindow::from_samples([7.0, 7.0]).unwrap();
        assert!(flat.is_flat());
        assert_eq!(flat.eval(7.0), Some(0));

        assert!(IntensityWindow::from_samples([f32::NAN]).is_none());
        assert!(IntensityWindow::from_samples(std::iter::empty()).is_none());
    }
}
