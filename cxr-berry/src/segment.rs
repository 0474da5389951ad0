//! 肺野分割.
//!
//! 胸片中肺野含气, 比纵隔、骨骼和软组织更暗. 反相后肺野成为高亮区域,
//! Otsu 二值化即可粗略分离, 再以形态学操作和连通区域筛选清理.

use crate::consts::gray::*;
use crate::consts::segment::*;
use crate::data::array_to_gray;
use crate::morph;
use crate::region::RegionTable;
use crate::{BinaryMask, LungMask, NormalizedImage};

/// 肺野分割结果.
#[derive(Debug, Clone)]
pub struct Segmentation {
    mask: LungMask,
    components: usize,
    otsu_level: u8,
    coverage: f64,
}

impl Segmentation {
    fn empty(image: &NormalizedImage, otsu_level: u8) -> Self {
        Self {
            mask: BinaryMask::zeros(image.shape()).into(),
            components: 0,
            otsu_level,
            coverage: 0.0,
        }
    }

    /// 肺野掩膜.
    #[inline]
    pub fn mask(&self) -> &LungMask {
        &self.mask
    }

    /// 取出肺野掩膜.
    #[inline]
    pub fn into_mask(self) -> LungMask {
        self.mask
    }

    /// 保留的连通区域个数 (0, 1 或 2), 在闭运算和扩张之前统计.
    #[inline]
    pub fn components(&self) -> usize {
        self.components
    }

    /// 反相图像上的 Otsu 阈值.
    #[inline]
    pub fn otsu_level(&self) -> u8 {
        self.otsu_level
    }

    /// 掩膜像素占图像像素的比例.
    #[inline]
    pub fn coverage(&self) -> f64 {
        self.coverage
    }

    /// 分割为空? 此时掩膜全为背景.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components == 0
    }

    /// 掩膜覆盖率是否低于图像面积的 10%?
    #[inline]
    pub fn is_under_segmented(&self) -> bool {
        self.coverage < UNDER_SEGMENTATION_RATIO
    }
}

/// 分割肺野. 依次执行:
///
/// 1. 反相;
/// 2. Otsu 二值化, 前景为 `value > level`. 前景为空或覆盖整幅图像时阈值没有意义, 直接返回空分割;
/// 3. 5×5 开运算 2 次;
/// 4. 8-连通标记, 保留面积最大的两个区域 (面积相同时标签小者优先);
/// 5. 9×9 闭运算 1 次, 再以 5×5 膨胀 1 次;
/// 6. 若 `pad_px > 0`, 再以 `pad_px × pad_px` 膨胀 1 次.
pub fn segment(image: &NormalizedImage, pad_px: usize) -> Segmentation {
    let inverted = image.view().mapv(|p| WHITE - p);
    let level = imageproc::contrast::otsu_level(&array_to_gray(inverted.view()));
    let binary =
        BinaryMask::from_array(inverted.mapv(|p| if p > level { MASK_ON } else { MASK_OFF }));
    let (fg, total) = (binary.count(), binary.size());
    if fg == 0 || fg == total {
        log::debug!("degenerate Otsu level {level}: {fg} of {total} pixels in foreground");
        return Segmentation::empty(image, level);
    }

    let opened = BinaryMask::from_array(morph::open(binary.view(), OPEN_KERNEL, OPEN_ITERATIONS));
    let table = RegionTable::label(&opened);
    if table.is_empty() {
        log::debug!("no component survived opening at Otsu level {level}");
        return Segmentation::empty(image, level);
    }
    let kept = table.largest(KEEP_COMPONENTS);
    log::debug!(
        "Otsu level {level}, {} components, keeping {:?}",
        table.len(),
        kept.iter()
            .filter_map(|&l| table.get(l))
            .map(|r| r.area)
            .collect::<Vec<_>>()
    );
    let lungs = table.mask_of(&kept);

    let closed = morph::close(lungs.view(), CLOSE_KERNEL, 1);
    let mut grown = morph::dilate(closed.view(), BORDER_KERNEL, 1);
    if pad_px > 0 {
        grown = morph::dilate(grown.view(), pad_px, 1);
    }
    let mask = BinaryMask::from_array(grown);
    let coverage = mask.coverage();
    Segmentation {
        mask: mask.into(),
        components: kept.len(),
        otsu_level: level,
        coverage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_uniform_image_is_empty() {
        for v in [0u8, 3, 128, 255] {
            let img = NormalizedImage::from_array(Array2::from_elem((64, 64), v));
            let seg = segment(&img, 5);
            assert!(seg.is_empty());
            assert!(seg.mask().is_empty());
            assert_eq!(seg.coverage(), 0.0);
            assert!(seg.is_under_segmented());
        }
    }

    #[test]
    fn test_keeps_two_largest_dark_blobs() {
        // 三个暗块: 20×20, 16×16, 12×12. 都能挺过开运算, 最小的一块被丢弃.
        let img = NormalizedImage::from_array(Array2::from_shape_fn((64, 96), |(r, c)| {
            let dark = (10..30).contains(&r) && (5..25).contains(&c)
                || (10..26).contains(&r) && (40..56).contains(&c)
                || (40..52).contains(&r) && (70..82).contains(&c);
            if dark {
                20
            } else {
                220
            }
        }));
        let seg = segment(&img, 0);
        assert_eq!(seg.components(), 2);
        assert!(!seg.is_empty());
        let m = seg.mask();
        assert!(m.is_on((20, 15)));
        assert!(m.is_on((18, 48)));
        assert!(!m.is_on((46, 76)));
        // 5×5 扩张使边界向外 2 像素.
        assert!(m.is_on((8, 15)));
        assert!(!m.is_on((7, 15)));

        let padded = segment(&img, 7);
        assert!(m.is_subset_of(padded.mask()));
        assert!(padded.coverage() > seg.coverage());
    }
}
