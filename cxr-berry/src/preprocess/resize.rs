//! 面积插值缩放.

use crate::Idx2d;
use ndarray::{Array2, ArrayView2};

/// 一维面积插值权重表. 第 `d` 项是输出位置 `d` 覆盖的 `(源索引, 权重)` 列表,
/// 权重为重叠长度占输出像素跨度的比例, 总和为 1.
fn area_taps(src: usize, dst: usize) -> Vec<Vec<(usize, f64)>> {
    let scale = src as f64 / dst as f64;
    (0..dst)
        .map(|d| {
            let lo = d as f64 * scale;
            let hi = lo + scale;
            let first = lo.floor() as usize;
            let last = (hi.ceil() as usize).min(src);
            (first..last)
                .filter_map(|s| {
                    let overlap = hi.min(s as f64 + 1.0) - lo.max(s as f64);
                    (overlap > 1e-9).then_some((s, overlap / scale))
                })
                .collect()
        })
        .collect()
}

/// 以面积插值将 `src` 缩放到 `(高, 宽)`.
///
/// 每个输出像素是它所覆盖的源像素按重叠面积加权的均值, 四舍五入.
/// 缩小时等价于 OpenCV `INTER_AREA`; 放大时同样按重叠面积取值.
///
/// # 注意
///
/// `src` 和目标尺寸都不能为空, 否则程序 panic.
pub fn area(src: ArrayView2<u8>, shape: Idx2d) -> Array2<u8> {
    let (sh, sw) = src.dim();
    let (dh, dw) = shape;
    assert!(sh > 0 && sw > 0 && dh > 0 && dw > 0, "缩放尺寸不能为空");

    let row_taps = area_taps(sh, dh);
    let col_taps = area_taps(sw, dw);

    // 先水平, 后垂直.
    let horizontal = Array2::from_shape_fn((sh, dw), |(r, c)| {
        col_taps[c]
            .iter()
            .map(|&(s, w)| src[(r, s)] as f64 * w)
            .sum::<f64>()
    });
    Array2::from_shape_fn((dh, dw), |(r, c)| {
        let v: f64 = row_taps[r]
            .iter()
            .map(|&(s, w)| horizontal[(s, c)] * w)
            .sum();
        v.round().clamp(0.0, 255.0) as u8
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_area_taps_sum_to_one() {
        for (src, dst) in [(10, 3), (7, 7), (3, 10), (1000, 512)] {
            for taps in area_taps(src, dst) {
                let sum: f64 = taps.iter().map(|t| t.1).sum();
                assert!((sum - 1.0).abs() < 1e-9, "{src} -> {dst}: {sum}");
            }
        }
    }

    #[test]
    fn test_downscale_averages_blocks() {
        let src = array![
            [0u8, 2, 10, 10],
            [4, 6, 10, 10],
            [100, 100, 0, 255],
            [100, 100, 255, 0]
        ];
        let out = area(src.view(), (2, 2));
        // (127.5 -> 128)
        assert_eq!(out, array![[3u8, 10], [100, 128]]);
    }

    #[test]
    fn test_identity_and_non_integer_scale() {
        let src = Array2::from_shape_fn((5, 7), |(r, c)| (r * 7 + c) as u8);
        assert_eq!(area(src.view(), (5, 7)), src);

        // 3 -> 2: 输出 0 覆盖 [0, 1.5), 权重 2/3 与 1/3.
        let src = array![[0u8, 90, 180]];
        assert_eq!(area(src.view(), (1, 2)), array![[30u8, 150]]);

        let up = area(array![[7u8]].view(), (3, 3));
        assert!(up.iter().all(|&p| p == 7));
    }
}
