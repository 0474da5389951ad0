//! 限制对比度自适应直方图均衡 (CLAHE).
//!
//! 行为与 OpenCV `createCLAHE(clip, (grid, grid))` 保持一致:
//!
//! 1. 图像被划分为 `grid × grid` 个分块. 若尺寸不能整除, 则按 reflect-101 规则补边后再统计直方图.
//! 2. 每个分块的直方图在 `max(floor(clip * 分块面积 / 256), 1)` 处截断,
//!    截掉的部分平均分给所有 bin, 余数以固定步长从 0 号 bin 开始逐个分配.
//! 3. 以累计直方图构建每个分块的均衡化查找表.
//! 4. 每个像素按其相对分块中心的位置, 对相邻四个分块的查找表做双线性插值.

use ndarray::{Array2, ArrayView2};

const BINS: usize = 256;

/// reflect-101 补边时的源索引, 例如 `n = 4` 时 `4 -> 2`, `5 -> 1`.
#[inline]
fn reflect101(i: usize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * (n - 1);
    let i = i % period;
    if i < n {
        i
    } else {
        period - i
    }
}

/// 截断直方图并重新分配多余计数.
fn clip_histogram(hist: &mut [u32; BINS], limit: u32) {
    let mut clipped = 0u32;
    for h in hist.iter_mut() {
        if *h > limit {
            clipped += *h - limit;
            *h = limit;
        }
    }
    let batch = clipped / BINS as u32;
    let mut residual = clipped as usize - batch as usize * BINS;
    hist.iter_mut().for_each(|h| *h += batch);
    if residual != 0 {
        let step = (BINS / residual).max(1);
        let mut i = 0;
        while i < BINS && residual > 0 {
            hist[i] += 1;
            i += step;
            residual -= 1;
        }
    }
}

/// 以累计直方图构建均衡化查找表.
fn equalize_lut(hist: &[u32; BINS], area: usize) -> [u8; BINS] {
    let scale = 255.0 / area as f64;
    let mut lut = [0u8; BINS];
    let mut sum = 0u64;
    for (l, &h) in lut.iter_mut().zip(hist.iter()) {
        sum += h as u64;
        *l = (sum as f64 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// 双线性插值所需的一维信息: 两侧分块索引和靠后分块的权重.
#[derive(Debug, Copy, Clone)]
struct Blend {
    lo: usize,
    hi: usize,
    weight: f64,
}

fn blend_axis(len: usize, tile: usize, tiles: usize) -> Vec<Blend> {
    let inv = 1.0 / tile as f64;
    (0..len)
        .map(|x| {
            let f = x as f64 * inv - 0.5;
            let lo = f.floor();
            let weight = f - lo;
            let lo = lo as isize;
            Blend {
                lo: lo.max(0) as usize,
                hi: ((lo + 1) as usize).min(tiles - 1),
                weight,
            }
        })
        .collect()
}

/// 对 `src` 执行 CLAHE.
///
/// `clip` 为 OpenCV 意义下的 clip limit (非正数表示不截断), `grid` 为每个方向上的分块数.
///
/// # 注意
///
/// `src` 不能为空, `grid` 不能为 0, 否则程序 panic.
pub fn apply(src: ArrayView2<u8>, clip: f64, grid: usize) -> Array2<u8> {
    let (h, w) = src.dim();
    assert!(h > 0 && w > 0 && grid > 0, "CLAHE 输入不能为空");

    let (tile_h, tile_w) = (h.div_ceil(grid), w.div_ceil(grid));
    let area = tile_h * tile_w;
    let limit = if clip > 0.0 {
        ((clip * area as f64 / BINS as f64) as u32).max(1)
    } else {
        u32::MAX
    };

    // luts[(ty, tx)]
    let mut luts = Vec::with_capacity(grid * grid);
    for ty in 0..grid {
        for tx in 0..grid {
            let mut hist = [0u32; BINS];
            for y in ty * tile_h..(ty + 1) * tile_h {
                let sy = reflect101(y, h);
                for x in tx * tile_w..(tx + 1) * tile_w {
                    hist[src[(sy, reflect101(x, w))] as usize] += 1;
                }
            }
            clip_histogram(&mut hist, limit);
            luts.push(equalize_lut(&hist, area));
        }
    }

    let rows = blend_axis(h, tile_h, grid);
    let cols = blend_axis(w, tile_w, grid);
    Array2::from_shape_fn((h, w), |(y, x)| {
        let (by, bx) = (rows[y], cols[x]);
        let v = src[(y, x)] as usize;
        let lut = |ty: usize, tx: usize| luts[ty * grid + tx][v] as f64;
        let top = lut(by.lo, bx.lo) * (1.0 - bx.weight) + lut(by.lo, bx.hi) * bx.weight;
        let bottom = lut(by.hi, bx.lo) * (1.0 - bx.weight) + lut(by.hi, bx.hi) * bx.weight;
        let res = top * (1.0 - by.weight) + bottom * by.weight;
        res.round().clamp(0.0, 255.0) as u8
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect101() {
        let idx: Vec<_> = (0..8).map(|i| reflect101(i, 4)).collect();
        assert_eq!(idx, vec![0, 1, 2, 3, 2, 1, 0, 1]);
        assert_eq!(reflect101(5, 1), 0);
    }

    #[test]
    fn test_clip_histogram_keeps_mass() {
        let mut hist = [0u32; BINS];
        hist[10] = 1000;
        hist[20] = 5;
        clip_histogram(&mut hist, 8);
        assert_eq!(hist.iter().sum::<u32>(), 1005);
        // 992 = 3 * 256 + 224
        assert_eq!(hist[0], 3 + 1);
        assert_eq!(hist[10], 8 + 3 + 1);
        assert_eq!(hist[255], 3);
    }

    #[test]
    fn test_constant_input() {
        // 分块面积 64, 截断阈值 1. 0 号 bin 剩 1, 再分得 1 个余数: round(2 * 255 / 64) = 8.
        let src = Array2::from_elem((64, 64), 0u8);
        let out = apply(src.view(), 2.0, 8);
        assert_eq!(out.dim(), (64, 64));
        assert!(out.iter().all(|&p| p == 8));

        let src = Array2::from_elem((64, 64), 128u8);
        let out = apply(src.view(), 2.0, 8);
        let first = out[(0, 0)];
        assert!(out.iter().all(|&p| p == first));
    }

    #[test]
    fn test_non_divisible_shape() {
        let src = Array2::from_shape_fn((37, 50), |(r, c)| ((r * 5 + c * 3) % 256) as u8);
        let out = apply(src.view(), 2.0, 8);
        assert_eq!(out.dim(), (37, 50));
    }

    #[test]
    fn test_monotone_within_flat_tiles() {
        // 左暗右亮的阶梯图: 增强后仍保持左右顺序.
        let src = Array2::from_shape_fn((64, 64), |(_, c)| if c < 32 { 60 } else { 180 });
        let out = apply(src.view(), 2.0, 8);
        assert!(out[(10, 5)] < out[(10, 60)]);
    }
}
