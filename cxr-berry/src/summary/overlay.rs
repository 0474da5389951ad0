//! 热力图叠加.

use crate::data::encode::write_png;
use crate::{BinaryMask, Idx2d, IntensityWindow, NormalizedImage, PngEncode};
use image::{ImageResult, Rgb, RgbImage};
use once_cell::sync::Lazy;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// jet 色图各通道的分段线性控制点 `(位置, 强度)`.
const JET_RED: &[(f64, f64)] = &[(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)];
const JET_GREEN: &[(f64, f64)] = &[
    (0.0, 0.0),
    (0.125, 0.0),
    (0.375, 1.0),
    (0.64, 1.0),
    (0.91, 0.0),
    (1.0, 0.0),
];
const JET_BLUE: &[(f64, f64)] = &[(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)];

fn interp(points: &[(f64, f64)], x: f64) -> f64 {
    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        if x <= x1 {
            return y0 + (y1 - y0) * (x - x0) / (x1 - x0);
        }
    }
    points.last().map_or(0.0, |p| p.1)
}

/// 256 级 jet 色图 (蓝 → 青 → 黄 → 红).
pub static JET: Lazy<[Rgb<u8>; 256]> = Lazy::new(|| {
    let mut lut = [Rgb([0u8; 3]); 256];
    for (i, px) in lut.iter_mut().enumerate() {
        let x = i as f64 / 255.0;
        let ch = |points| (interp(points, x) * 255.0).round().clamp(0.0, 255.0) as u8;
        *px = Rgb([ch(JET_RED), ch(JET_GREEN), ch(JET_BLUE)]);
    }
    lut
});

/// 叠加图不透明度, 取值于开区间 (0, 1).
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "f32", into = "f32"))]
pub struct OverlayAlpha(f32);

impl OverlayAlpha {
    /// 构建不透明度. `alpha` 不在 (0, 1) 内时返回 `None`.
    pub fn new(alpha: f32) -> Option<OverlayAlpha> {
        (alpha > 0.0 && alpha < 1.0).then_some(Self(alpha))
    }

    /// 数值.
    #[inline]
    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for OverlayAlpha {
    fn default() -> Self {
        Self(crate::consts::limits::DEFAULT_OVERLAY_ALPHA)
    }
}

impl From<OverlayAlpha> for f32 {
    #[inline]
    fn from(a: OverlayAlpha) -> Self {
        a.0
    }
}

impl TryFrom<f32> for OverlayAlpha {
    type Error = String;

    fn try_from(alpha: f32) -> Result<Self, Self::Error> {
        Self::new(alpha).ok_or_else(|| format!("overlay alpha `{alpha}` is not in (0, 1)"))
    }
}

/// 三通道 8-bit 叠加图, 与预处理后的图像同尺寸.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayImage(RgbImage);

impl OverlayImage {
    /// 在灰度图上叠加异常区域热力图.
    ///
    /// 掩膜先以 min-max 归一化为热力通道, 经 jet 色图上色后按
    /// `out = saturate(round(gray + alpha * colour))` 混合.
    pub fn render(image: &NormalizedImage, abnormal: &BinaryMask, alpha: OverlayAlpha) -> Self {
        let (h, w) = image.shape();
        let window = IntensityWindow::from_samples(abnormal.view().iter().map(|&p| p as f32));
        let heat = |pos: Idx2d| window.and_then(|win| win.eval(abnormal[pos] as f32)).unwrap_or(0);
        let a = alpha.get() as f64;
        let out = RgbImage::from_fn(w as u32, h as u32, |x, y| {
            let pos = (y as usize, x as usize);
            let gray = image[pos] as f64;
            let colour = JET[heat(pos) as usize];
            Rgb(colour.0.map(|c| (gray + a * c as f64).round().clamp(0.0, 255.0) as u8))
        });
        Self(out)
    }

    /// 宽度.
    #[inline]
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    /// 高度.
    #[inline]
    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// 底层图像.
    #[inline]
    pub fn as_rgb(&self) -> &RgbImage {
        &self.0
    }

    /// 取出底层图像.
    #[inline]
    pub fn into_rgb(self) -> RgbImage {
        self.0
    }
}

/// RGB PNG.
impl PngEncode for OverlayImage {
    fn to_png(&self) -> ImageResult<Vec<u8>> {
        write_png(self.0.clone())
    }
}
