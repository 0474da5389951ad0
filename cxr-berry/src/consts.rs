//! 通用常量.

/// 单通道颜色.
pub mod gray {
    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 单通道灰色.
    pub const GRAY: u8 = 0b_1000_0000;

    /// 单通道白色.
    pub const WHITE: u8 = 0b_1111_1111;

    /// 二值掩膜中的前景值.
    pub const MASK_ON: u8 = WHITE;

    /// 二值掩膜中的背景值.
    pub const MASK_OFF: u8 = BLACK;

    /// 掩膜像素是否为前景? 任何非零值都视为前景.
    #[inline]
    pub const fn is_on(p: u8) -> bool {
        p != MASK_OFF
    }

    /// 掩膜像素是否为背景?
    #[inline]
    pub const fn is_off(p: u8) -> bool {
        p == MASK_OFF
    }
}

/// 预处理参数.
pub mod preprocess {
    /// CLAHE 的 clip limit.
    pub const CLAHE_CLIP_LIMIT: f64 = 2.0;

    /// CLAHE 在每个方向上的分块个数.
    pub const CLAHE_TILE_GRID: usize = 8;

    /// 中值滤波半径. 1 即 3×3 窗口.
    pub const MEDIAN_RADIUS: u32 = 1;
}

/// 肺野分割参数.
pub mod segment {
    /// 二值化后开运算的结构元边长.
    pub const OPEN_KERNEL: usize = 5;

    /// 二值化后开运算的迭代次数.
    pub const OPEN_ITERATIONS: usize = 2;

    /// 保留的最大连通区域个数 (左右肺野).
    pub const KEEP_COMPONENTS: usize = 2;

    /// 填洞闭运算的结构元边长.
    pub const CLOSE_KERNEL: usize = 9;

    /// 向胸膜方向扩张的结构元边长.
    pub const BORDER_KERNEL: usize = 5;

    /// 肺野面积低于图像面积的该比例时, 视为欠分割.
    pub const UNDER_SEGMENTATION_RATIO: f64 = 0.10;
}

/// 高密度影检测参数.
pub mod detect {
    /// 进行统计所需的最少肺野像素数.
    pub const MIN_LUNG_SAMPLE: usize = 1000;

    /// Z-score 策略打分前高斯模糊的 sigma.
    pub const BLUR_SIGMA: f32 = 1.0;

    /// 模糊值与均值之差的浮点误差容限.
    pub const BLUR_TOLERANCE: f64 = 1e-3;

    /// 标准差修正量, 避免除零.
    pub const STD_EPSILON: f64 = 1e-6;

    /// 标记图去斑点开运算的结构元边长.
    pub const OPEN_KERNEL: usize = 3;

    /// 标记图填缝闭运算的结构元边长.
    pub const CLOSE_KERNEL: usize = 5;
}

/// 推荐给宿主界面的参数范围与默认值.
///
/// 流程本身不强制这些范围 (除非另有说明), 它们只是经验上合理的调节区间.
pub mod limits {
    use std::ops::RangeInclusive;

    /// Z-score 阈值的推荐范围. 越低越敏感.
    pub const Z_THRESHOLD: RangeInclusive<f64> = 0.3..=2.5;

    /// 默认 Z-score 阈值.
    pub const DEFAULT_Z_THRESHOLD: f64 = 0.9;

    /// 百分位阈值的推荐范围. 越低越敏感.
    pub const PERCENTILE: RangeInclusive<u8> = 80..=99;

    /// 默认百分位阈值.
    pub const DEFAULT_PERCENTILE: u8 = 90;

    /// 最小区域面积 (像素) 的推荐范围.
    pub const MIN_REGION_PX: RangeInclusive<usize> = 50..=2000;

    /// 默认最小区域面积 (像素).
    pub const DEFAULT_MIN_REGION_PX: usize = 200;

    /// 肺野掩膜 padding (像素) 的推荐范围.
    pub const MASK_PADDING_PX: RangeInclusive<usize> = 0..=15;

    /// 默认肺野掩膜 padding (像素).
    pub const DEFAULT_MASK_PADDING_PX: usize = 5;

    /// 叠加图不透明度的推荐范围.
    pub const OVERLAY_ALPHA: RangeInclusive<f32> = 0.1..=0.9;

    /// 默认叠加图不透明度.
    pub const DEFAULT_OVERLAY_ALPHA: f32 = 0.45;
}
