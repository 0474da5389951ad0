//! 8-bit 单通道灰度图像.

use crate::Idx2d;
use image::GrayImage;
use ndarray::iter::{IndexedIter, Iter};
use ndarray::{Array2, ArrayView2, Ix2};
use std::ops::Index;

/// 归一化后的单通道灰度图像. 创建后只读.
///
/// 加载后, 非常量图像的灰度恰好覆盖 \[0, 255\]; 常量图像全为 0.
/// 预处理后为 `target × target` 的正方形.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedImage {
    data: Array2<u8>,
}

impl NormalizedImage {
    /// 以 `(高, 宽)` 数组构建图像.
    #[inline]
    pub fn from_array(data: Array2<u8>) -> Self {
        Self { data }
    }

    /// 从 `image` 灰度图构建图像.
    pub fn from_gray_image(img: &GrayImage) -> Self {
        Self::from_array(super::gray_to_array(img))
    }

    /// 转换为 `image` 灰度图.
    pub fn to_gray_image(&self) -> GrayImage {
        super::array_to_gray(self.view())
    }

    /// 获得底层数据的只读视图.
    #[inline]
    pub fn view(&self) -> ArrayView2<u8> {
        self.data.view()
    }

    /// 取出底层数据.
    #[inline]
    pub fn into_array(self) -> Array2<u8> {
        self.data
    }

    /// 图像形状 `(高, 宽)`.
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 图像高度.
    #[inline]
    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// 图像宽度.
    #[inline]
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    /// 像素总数.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 获取给定位置 (高, 宽) 的像素值. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx2d) -> Option<u8> {
        self.data.get(pos).copied()
    }

    /// 逐像素迭代.
    #[inline]
    pub fn iter(&self) -> Iter<'_, u8, Ix2> {
        self.data.iter()
    }

    /// 带坐标的逐像素迭代.
    #[inline]
    pub fn indexed_iter(&self) -> IndexedIter<'_, u8, Ix2> {
        self.data.indexed_iter()
    }

    /// 最小和最大灰度. 空图像返回 `None`.
    pub fn min_max(&self) -> Option<(u8, u8)> {
        use itertools::{Itertools, MinMaxResult};
        match self.data.iter().copied().minmax() {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(v) => Some((v, v)),
            MinMaxResult::MinMax(lo, hi) => Some((lo, hi)),
        }
    }
}

impl Index<Idx2d> for NormalizedImage {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}
