//! 二值掩膜.

use crate::consts::gray::*;
use crate::Idx2d;
use ndarray::{Array2, ArrayView2, Zip};
use std::ops::{Deref, Index};

/// 二值 (0/255) 掩膜.
///
/// 构建时所有非零像素统一为 [`MASK_ON`], 因此任何时候只存在两种像素值.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinaryMask {
    data: Array2<u8>,
}

impl BinaryMask {
    /// 形状为 `shape` 的全背景掩膜.
    pub fn zeros(shape: Idx2d) -> Self {
        Self {
            data: Array2::from_elem(shape, MASK_OFF),
        }
    }

    /// 以任意数组构建掩膜, 非零像素视为前景.
    pub fn from_array(mut data: Array2<u8>) -> Self {
        data.mapv_inplace(|p| if is_on(p) { MASK_ON } else { MASK_OFF });
        Self { data }
    }

    /// 以谓词构建掩膜, `pred` 为真的位置是前景.
    pub fn from_fn<F: FnMut(Idx2d) -> bool>(shape: Idx2d, mut pred: F) -> Self {
        Self {
            data: Array2::from_shape_fn(shape, |pos| if pred(pos) { MASK_ON } else { MASK_OFF }),
        }
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

    /// 掩膜形状 `(高, 宽)`.
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 像素总数.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 给定位置是否为前景. 越界视为背景.
    #[inline]
    pub fn is_on(&self, pos: Idx2d) -> bool {
        self.data.get(pos).is_some_and(|&p| is_on(p))
    }

    /// 前景像素个数.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&p| is_on(p)).count()
    }

    /// 是否全为背景?
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&p| is_off(p))
    }

    /// 前景像素占全部像素的比例. 空掩膜 (0 像素) 返回 0.
    pub fn coverage(&self) -> f64 {
        match self.size() {
            0 => 0.0,
            n => self.count() as f64 / n as f64,
        }
    }

    /// `self` 的前景是否完全落在 `other` 的前景内?
    ///
    /// 形状不同时返回 `false`.
    pub fn is_subset_of(&self, other: &BinaryMask) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(&a, &b)| is_off(a) || is_on(b))
    }

    /// 就地求交集.
    ///
    /// # 注意
    ///
    /// 两者形状必须一致, 否则程序 panic.
    pub fn intersect(&mut self, other: &BinaryMask) {
        assert_eq!(self.shape(), other.shape(), "掩膜形状不符");
        Zip::from(&mut self.data)
            .and(&other.data)
            .for_each(|a, &b| {
                if is_off(b) {
                    *a = MASK_OFF;
                }
            });
    }

    /// 所有前景像素的位置, 行优先.
    pub fn on_positions(&self) -> impl Iterator<Item = Idx2d> + '_ {
        self.data
            .indexed_iter()
            .filter_map(|(pos, &p)| is_on(p).then_some(pos))
    }
}

impl Index<Idx2d> for BinaryMask {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

macro_rules! impl_mask_newtype {
    ($($mask: ident),+) => {
        $(
            impl $mask {
                /// 取出内部的二值掩膜.
                #[inline]
                pub fn into_inner(self) -> BinaryMask {
                    self.0
                }
            }

            impl From<BinaryMask> for $mask {
                #[inline]
                fn from(mask: BinaryMask) -> Self {
                    Self(mask)
                }
            }

            impl Deref for $mask {
                type Target = BinaryMask;

                #[inline]
                fn deref(&self) -> &Self::Target {
                    &self.0
                }
            }
        )+
    };
}

/// 肺野掩膜, 与归一化图像同形状.
///
/// 闭运算/扩张之前至多两个连通区域 (面积最大的两个).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LungMask(BinaryMask);

/// 异常 (高密度影) 掩膜. 是肺野掩膜的子集, 每个 8-连通区域的面积都不小于最小区域面积.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AbnormalMask(BinaryMask);

impl_mask_newtype!(LungMask, AbnormalMask);

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_binarized_on_construction() {
        let m = BinaryMask::from_array(array![[0u8, 1, 7], [255, 0, 0]]);
        assert_eq!(m.view(), array![[0u8, 255, 255], [255, 0, 0]]);
        assert_eq!(m.count(), 3);
        assert!((m.coverage() - 0.5).abs() < 1e-12);
        assert!(!m.is_empty());
        assert!(BinaryMask::zeros((3, 4)).is_empty());
        assert_eq!(BinaryMask::zeros((0, 0)).coverage(), 0.0);
    }

    #[test]
    fn test_subset_and_intersect() {
        let outer = BinaryMask::from_fn((4, 4), |(r, _)| r < 3);
        let mut inner = BinaryMask::from_fn((4, 4), |(r, c)| r == 1 || c == 0);
        assert!(!inner.is_subset_of(&outer));
        inner.intersect(&outer);
        assert!(inner.is_subset_of(&outer));
        assert_eq!(inner.count(), 4 + 2);
        assert!(!inner.is_subset_of(&BinaryMask::zeros((4, 5))));
        assert_eq!(
            inner.on_positions().take(2).collect::<Vec<_>>(),
            vec![(0, 0), (1, 0)]
        );
    }
}
