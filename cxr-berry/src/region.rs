//! 8-连通区域标记与区域表.
//!
//! 区域以 arena 形式存放: 标签 `l` (从 1 开始) 的区域记录位于下标 `l - 1`.
//! 标签按行优先扫描时区域首次出现的顺序分配, 因此是确定的.

use crate::data::array_to_gray;
use crate::{BinaryMask, Idx2d};
use imageproc::region_labelling::{connected_components, Connectivity};
use ndarray::Array2;
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 背景标签.
pub const BACKGROUND: u32 = 0;

/// 闭区间包围盒.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundingBox {
    /// 最小行.
    pub top: usize,
    /// 最小列.
    pub left: usize,
    /// 最大行.
    pub bottom: usize,
    /// 最大列.
    pub right: usize,
}

impl BoundingBox {
    fn at(pos: Idx2d) -> Self {
        let (r, c) = pos;
        Self {
            top: r,
            left: c,
            bottom: r,
            right: c,
        }
    }

    fn include(&mut self, pos: Idx2d) {
        let (r, c) = pos;
        self.top = self.top.min(r);
        self.left = self.left.min(c);
        self.bottom = self.bottom.max(r);
        self.right = self.right.max(c);
    }

    /// 高度 (行数).
    #[inline]
    pub fn height(&self) -> usize {
        self.bottom - self.top + 1
    }

    /// 宽度 (列数).
    #[inline]
    pub fn width(&self) -> usize {
        self.right - self.left + 1
    }

    /// 是否包含 `pos`?
    #[inline]
    pub fn contains(&self, pos: Idx2d) -> bool {
        let (r, c) = pos;
        (self.top..=self.bottom).contains(&r) && (self.left..=self.right).contains(&c)
    }
}

/// 单个连通区域的记录.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Region {
    /// 标签, 从 1 开始.
    pub label: u32,
    /// 面积 (像素数).
    pub area: usize,
    /// 包围盒.
    pub bbox: BoundingBox,
    /// 质心 `(行, 列)`.
    pub centroid: (f64, f64),
}

/// 区域表: 标签图加上按标签索引的区域记录.
#[derive(Debug, Clone)]
pub struct RegionTable {
    labels: Array2<u32>,
    regions: Vec<Region>,
}

impl RegionTable {
    /// 对 `mask` 的前景做 8-连通标记.
    pub fn label(mask: &BinaryMask) -> Self {
        let (h, w) = mask.shape();
        let raw = connected_components(
            &array_to_gray(mask.view()),
            Connectivity::Eight,
            image::Luma([0u8]),
        );

        // 重新编号为按首次出现顺序的连续标签.
        let mut remap: HashMap<u32, u32> = HashMap::new();
        let mut regions: Vec<Region> = Vec::new();
        let mut sums: Vec<(f64, f64)> = Vec::new();
        let mut labels = Array2::from_elem((h, w), BACKGROUND);
        for r in 0..h {
            for c in 0..w {
                let old = raw.get_pixel(c as u32, r as u32)[0];
                if old == BACKGROUND {
                    continue;
                }
                let next = regions.len() as u32 + 1;
                let label = *remap.entry(old).or_insert(next);
                if label == next {
                    regions.push(Region {
                        label,
                        area: 0,
                        bbox: BoundingBox::at((r, c)),
                        centroid: (0.0, 0.0),
                    });
                    sums.push((0.0, 0.0));
                }
                let idx = (label - 1) as usize;
                let region = &mut regions[idx];
                region.area += 1;
                region.bbox.include((r, c));
                sums[idx].0 += r as f64;
                sums[idx].1 += c as f64;
                labels[(r, c)] = label;
            }
        }
        for (region, (sr, sc)) in regions.iter_mut().zip(sums) {
            let n = region.area as f64;
            region.centroid = (sr / n, sc / n);
        }
        Self { labels, regions }
    }

    /// 区域个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// 是否不存在任何区域?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// 全部区域记录, 按标签升序.
    #[inline]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// 标签为 `label` 的区域. 背景或不存在的标签返回 `None`.
    #[inline]
    pub fn get(&self, label: u32) -> Option<&Region> {
        label
            .checked_sub(1)
            .and_then(|i| self.regions.get(i as usize))
    }

    /// 给定位置所属区域的标签. 背景或越界返回 `None`.
    #[inline]
    pub fn label_at(&self, pos: Idx2d) -> Option<u32> {
        self.labels.get(pos).copied().filter(|&l| l != BACKGROUND)
    }

    /// 面积最大的 `n` 个区域的标签, 面积降序. 面积相同时标签小者优先.
    pub fn largest(&self, n: usize) -> Vec<u32> {
        let mut order: Vec<&Region> = self.regions.iter().collect();
        order.sort_by(|a, b| b.area.cmp(&a.area).then(a.label.cmp(&b.label)));
        order.into_iter().take(n).map(|r| r.label).collect()
    }

    /// 只保留 `keep` 为真的区域, 生成新掩膜.
    pub fn retain<F: FnMut(&Region) -> bool>(&self, mut keep: F) -> BinaryMask {
        let kept: Vec<bool> = self.regions.iter().map(&mut keep).collect();
        BinaryMask::from_fn(self.labels.dim(), |pos| match self.labels[pos] {
            BACKGROUND => false,
            l => kept[(l - 1) as usize],
        })
    }

    /// 只保留 `labels` 中列出的区域, 生成新掩膜.
    pub fn mask_of(&self, labels: &[u32]) -> BinaryMask {
        self.retain(|r| labels.contains(&r.label))
    }
}
