//! 合成胸片体模.
//!
//! 明亮背景上的两个暗椭圆模拟左右肺野, 可在肺野内放置若干亮斑模拟高密度影.
//! 生成过程完全确定, 并同时给出肺野和亮斑的真值掩膜.

use crate::{BinaryMask, Idx2d, LungMask, NormalizedImage, PngEncode};
use image::ImageResult;

/// 参考边长. 椭圆参数以此为基准按比例缩放.
const REFERENCE_SIDE: f64 = 512.0;

/// 肺野椭圆 (参考边长下): 中心 `(行, 列)` 和半轴 `(行方向, 列方向)`.
const FIELDS: [((f64, f64), (f64, f64)); 2] = [
    ((256.0, 150.0), (170.0, 75.0)),
    ((256.0, 362.0), (170.0, 75.0)),
];

/// 背景 (纵隔、软组织) 灰度.
pub const BACKGROUND_VALUE: u8 = 200;

/// 肺野灰度.
pub const LUNG_VALUE: u8 = 30;

/// 圆形亮斑.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Spot {
    /// 圆心 `(行, 列)`.
    pub center: Idx2d,
    /// 半径 (像素).
    pub radius: usize,
    /// 灰度.
    pub value: u8,
}

impl Spot {
    #[inline]
    fn contains(&self, pos: Idx2d) -> bool {
        let dr = pos.0 as f64 - self.center.0 as f64;
        let dc = pos.1 as f64 - self.center.1 as f64;
        let r = self.radius as f64;
        dr * dr + dc * dc <= r * r
    }
}

/// 合成胸片构建器.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phantom {
    side: usize,
    spots: Vec<Spot>,
    texture: bool,
}

impl Phantom {
    /// `side × side` 的体模, 不含亮斑和纹理.
    pub fn new(side: usize) -> Self {
        Self {
            side,
            spots: vec![],
            texture: false,
        }
    }

    /// 添加一个圆形亮斑.
    pub fn with_spot(mut self, center: Idx2d, radius: usize, value: u8) -> Self {
        self.spots.push(Spot {
            center,
            radius,
            value,
        });
        self
    }

    /// 在背景和肺野上叠加确定性的纹理 (0 ~ 28), 亮斑保持平坦.
    pub fn with_texture(mut self) -> Self {
        self.texture = true;
        self
    }

    /// 边长.
    #[inline]
    pub fn side(&self) -> usize {
        self.side
    }

    /// 左肺野 (图像左侧) 椭圆中心.
    pub fn left_center(&self) -> Idx2d {
        self.field_center(0)
    }

    /// 右肺野 (图像右侧) 椭圆中心.
    pub fn right_center(&self) -> Idx2d {
        self.field_center(1)
    }

    fn scale(&self) -> f64 {
        self.side as f64 / REFERENCE_SIDE
    }

    fn field_center(&self, i: usize) -> Idx2d {
        let ((r, c), _) = FIELDS[i];
        let s = self.scale();
        ((r * s).round() as usize, (c * s).round() as usize)
    }

    fn in_lung(&self, pos: Idx2d) -> bool {
        let s = self.scale();
        let (r, c) = (pos.0 as f64, pos.1 as f64);
        FIELDS.iter().any(|&((cr, cc), (ar, ac))| {
            let dr = (r - cr * s) / (ar * s);
            let dc = (c - cc * s) / (ac * s);
            dr * dr + dc * dc <= 1.0
        })
    }

    /// 生成图像.
    pub fn render(&self) -> NormalizedImage {
        let data = ndarray::Array2::from_shape_fn((self.side, self.side), |pos| {
            if let Some(spot) = self.spots.iter().rev().find(|s| s.contains(pos)) {
                return spot.value;
            }
            let base = if self.in_lung(pos) {
                LUNG_VALUE
            } else {
                BACKGROUND_VALUE
            };
            if self.texture {
                let (r, c) = pos;
                base.saturating_add(((r * 31 + c * 17) % 29) as u8)
            } else {
                base
            }
        });
        NormalizedImage::from_array(data)
    }

    /// 肺野真值 (两个椭圆的并集).
    pub fn lung_truth(&self) -> LungMask {
        BinaryMask::from_fn((self.side, self.side), |pos| self.in_lung(pos)).into()
    }

    /// 亮斑真值.
    pub fn spot_truth(&self) -> BinaryMask {
        BinaryMask::from_fn((self.side, self.side), |pos| {
            self.spots.iter().any(|s| s.contains(pos))
        })
    }

    /// 编码为 PNG, 相当于一张待上传的图片.
    pub fn to_png(&self) -> ImageResult<Vec<u8>> {
        self.render().to_png()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_scales() {
        let p = Phantom::new(512);
        assert_eq!(p.left_center(), (256, 150));
        assert_eq!(p.right_center(), (256, 362));
        let q = Phantom::new(256);
        assert_eq!(q.left_center(), (128, 75));

        let img = p.render();
        assert_eq!(img[(256, 150)], LUNG_VALUE);
        assert_eq!(img[(256, 256)], BACKGROUND_VALUE);
        assert_eq!(img[(0, 0)], BACKGROUND_VALUE);

        // 两个面积约为 pi * 170 * 75 的椭圆.
        let area = p.lung_truth().count() as f64;
        let expected = 2.0 * std::f64::consts::PI * 170.0 * 75.0;
        assert!((area / expected - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_spot_and_texture() {
        let p = Phantom::new(128).with_spot((64, 37), 5, 180).with_texture();
        let img = p.render();
        assert_eq!(img[(64, 37)], 180);
        assert_eq!(img[(64, 42)], 180);
        assert_ne!(img[(64, 43)], 180);
        let spot = p.spot_truth();
        assert!(spot.is_subset_of(&p.lung_truth()));
        assert!((75..=85).contains(&spot.count()));
        assert!(img.iter().any(|&v| v > BACKGROUND_VALUE));
    }
}
