//! 矩形结构元的灰度/二值形态学操作.
//!
//! 与 OpenCV 的 `erode` / `dilate` / `morphologyEx` (`MORPH_RECT`, 默认锚点) 行为一致:
//!
//! - `k × k` 结构元的锚点位于 `(k/2, k/2)`, 因此偶数边长时窗口相对中心偏左上;
//! - 图像外的像素不参与计算 (既不腐蚀也不膨胀);
//! - 矩形结构元可分解为水平、垂直两次一维操作.
//!
//! `k == 0` 或 `k == 1` 时操作为恒等变换.

use ndarray::{Array2, ArrayView2, Axis};

/// 基础形态学操作.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MorphOp {
    /// 腐蚀, 取窗口最小值.
    Erode,
    /// 膨胀, 取窗口最大值.
    Dilate,
}

impl MorphOp {
    #[inline]
    fn fold(self, a: u8, b: u8) -> u8 {
        match self {
            MorphOp::Erode => a.min(b),
            MorphOp::Dilate => a.max(b),
        }
    }

    #[inline]
    fn identity(self) -> u8 {
        match self {
            MorphOp::Erode => u8::MAX,
            MorphOp::Dilate => u8::MIN,
        }
    }
}

/// 沿 `axis` 做一次一维窗口操作.
fn pass_1d(src: ArrayView2<u8>, k: usize, axis: Axis, op: MorphOp) -> Array2<u8> {
    let before = k / 2;
    let after = k - 1 - before;
    let len = src.len_of(axis);
    let mut dst = Array2::zeros(src.dim());
    for (s, mut d) in src.lanes(axis).into_iter().zip(dst.lanes_mut(axis)) {
        for i in 0..len {
            let lo = i.saturating_sub(before);
            let hi = (i + after).min(len - 1);
            d[i] = (lo..=hi).fold(op.identity(), |acc, j| op.fold(acc, s[j]));
        }
    }
    dst
}

/// 以 `k × k` 矩形结构元执行 `iterations` 次 `op`.
pub fn apply(src: ArrayView2<u8>, op: MorphOp, k: usize, iterations: usize) -> Array2<u8> {
    let mut cur = src.to_owned();
    if k <= 1 || src.is_empty() {
        return cur;
    }
    for _ in 0..iterations {
        let horizontal = pass_1d(cur.view(), k, Axis(1), op);
        cur = pass_1d(horizontal.view(), k, Axis(0), op);
    }
    cur
}

/// 腐蚀.
#[inline]
pub fn erode(src: ArrayView2<u8>, k: usize, iterations: usize) -> Array2<u8> {
    apply(src, MorphOp::Erode, k, iterations)
}

/// 膨胀.
#[inline]
pub fn dilate(src: ArrayView2<u8>, k: usize, iterations: usize) -> Array2<u8> {
    apply(src, MorphOp::Dilate, k, iterations)
}

/// 开运算: 先腐蚀 `iterations` 次, 再膨胀 `iterations` 次. 去除小于结构元的亮斑.
pub fn open(src: ArrayView2<u8>, k: usize, iterations: usize) -> Array2<u8> {
    let eroded = erode(src, k, iterations);
    dilate(eroded.view(), k, iterations)
}

/// 闭运算: 先膨胀 `iterations` 次, 再腐蚀 `iterations` 次. 填补小于结构元的暗洞.
pub fn close(src: ArrayView2<u8>, k: usize, iterations: usize) -> Array2<u8> {
    let dilated = dilate(src, k, iterations);
    erode(dilated.view(), k, iterations)
}
