//! 预处理: 缩放到工作分辨率, CLAHE 增强, 中值去噪.

use crate::consts::preprocess::*;
use crate::data::{array_to_gray, gray_to_array};
use crate::NormalizedImage;

pub mod clahe;
pub mod resize;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 工作分辨率. 预处理后的图像为 `side × side` 的正方形.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "usize", into = "usize"))]
pub enum WorkingResolution {
    /// 384 × 384.
    R384,
    /// 448 × 448.
    R448,
    /// 512 × 512.
    #[default]
    R512,
    /// 640 × 640.
    R640,
}

impl WorkingResolution {
    /// 所有可选分辨率, 由小到大.
    pub const ALL: [WorkingResolution; 4] = [Self::R384, Self::R448, Self::R512, Self::R640];

    /// 以边长构建. 不是 384, 448, 512, 640 之一时返回 `None`.
    pub fn from_side(side: usize) -> Option<WorkingResolution> {
        Self::ALL.into_iter().find(|r| r.side() == side)
    }

    /// 边长.
    #[inline]
    pub const fn side(self) -> usize {
        match self {
            Self::R384 => 384,
            Self::R448 => 448,
            Self::R512 => 512,
            Self::R640 => 640,
        }
    }
}

impl From<WorkingResolution> for usize {
    #[inline]
    fn from(r: WorkingResolution) -> Self {
        r.side()
    }
}

impl TryFrom<usize> for WorkingResolution {
    type Error = String;

    fn try_from(side: usize) -> Result<Self, Self::Error> {
        Self::from_side(side).ok_or_else(|| {
            format!("unsupported working resolution `{side}`, expected 384, 448, 512 or 640")
        })
    }
}

/// 预处理. 依次执行:
///
/// 1. 面积插值缩放到 `side × side`;
/// 2. CLAHE (clip limit 2.0, 8×8 网格);
/// 3. 3×3 中值滤波 (边缘复制).
///
/// 确定性: 相同输入总是得到相同输出.
pub fn prepare(image: &NormalizedImage, resolution: WorkingResolution) -> NormalizedImage {
    let side = resolution.side();
    let resized = resize::area(image.view(), (side, side));
    let enhanced = clahe::apply(resized.view(), CLAHE_CLIP_LIMIT, CLAHE_TILE_GRID);
    let denoised = imageproc::filter::median_filter(
        &array_to_gray(enhanced.view()),
        MEDIAN_RADIUS,
        MEDIAN_RADIUS,
    );
    NormalizedImage::from_array(gray_to_array(&denoised))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_working_resolution() {
        assert_eq!(WorkingResolution::default().side(), 512);
        assert_eq!(WorkingResolution::from_side(448), Some(WorkingResolution::R448));
        assert_eq!(WorkingResolution::from_side(500), None);
        assert!(WorkingResolution::try_from(0usize).is_err());
        assert_eq!(usize::from(WorkingResolution::R640), 640);
    }

    #[test]
    fn test_prepare_shape_and_determinism() {
        let src = Array2::from_shape_fn((300, 257), |(r, c)| ((r * 3 + c * 7) % 256) as u8);
        let img = NormalizedImage::from_array(src);
        for r in WorkingResolution::ALL {
            let out = prepare(&img, r);
            assert_eq!(out.shape(), (r.side(), r.side()));
        }
        let a = prepare(&img, WorkingResolution::R384);
        let b = prepare(&img, WorkingResolution::R384);
        assert_eq!(a, b);
    }

    #[test]
    fn test_prepare_uniform_black() {
        // 分块面积 4096, 截断阈值 32: round((32 + 15 + 1) * 255 / 4096) = 3.
        let img = NormalizedImage::from_array(Array2::zeros((100, 80)));
        let out = prepare(&img, WorkingResolution::R512);
        assert!(out.iter().all(|&p| p == 3));
    }
}
