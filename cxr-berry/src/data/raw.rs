//! 解码后、归一化前的原始强度图像.

use super::{IntensityWindow, NormalizedImage};
use crate::Idx2d;
use ndarray::Array2;
use std::path::Path;

/// 上传文件的来源类型.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SourceKind {
    /// PNG/JPEG 等栅格图像.
    Raster,
    /// DICOM 对象.
    Dicom,
}

impl SourceKind {
    /// 按文件扩展名 (忽略大小写) 判断来源. `.dcm` 和 `.dicom` 为 DICOM, 其它均视为栅格图像.
    pub fn from_filename(filename: &str) -> SourceKind {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("dcm") | Some("dicom") => SourceKind::Dicom,
            _ => SourceKind::Raster,
        }
    }
}

/// DICOM 校准属性.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DicomAttr {
    /// Rescale Slope, 缺省为 1.
    pub slope: f64,
    /// Rescale Intercept, 缺省为 0.
    pub intercept: f64,
    /// Photometric Interpretation 是否为 `MONOCHROME1` (高值为黑).
    pub monochrome1: bool,
}

impl Default for DicomAttr {
    fn default() -> Self {
        Self {
            slope: 1.0,
            intercept: 0.0,
            monochrome1: false,
        }
    }
}

/// 任意尺寸、任意动态范围的原始强度图像.
///
/// 由加载器持有, 在归一化时被消耗.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    data: Array2<f32>,
    dicom: Option<DicomAttr>,
}

impl RawImage {
    /// 来自栅格图像的强度数据.
    #[inline]
    pub fn raster(data: Array2<f32>) -> Self {
        Self { data, dicom: None }
    }

    /// 来自 DICOM 的像素数据 (未经 modality LUT).
    #[inline]
    pub fn dicom(data: Array2<f32>, attr: DicomAttr) -> Self {
        Self {
            data,
            dicom: Some(attr),
        }
    }

    /// 来源类型.
    #[inline]
    pub fn kind(&self) -> SourceKind {
        match self.dicom {
            None => SourceKind::Raster,
            Some(_) => SourceKind::Dicom,
        }
    }

    /// DICOM 校准属性. 栅格图像返回 `None`.
    #[inline]
    pub fn dicom_attr(&self) -> Option<&DicomAttr> {
        self.dicom.as_ref()
    }

    /// 图像形状 `(高, 宽)`.
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 校准后的强度.
    ///
    /// 栅格图像按原样返回. DICOM 先做 `raw * slope + intercept`,
    /// 若为 `MONOCHROME1` 再以 `max - value` 反相 (`max` 只统计有限值).
    pub fn calibrate(self) -> Array2<f32> {
        let Some(attr) = self.dicom else {
            return self.data;
        };
        let mut data = self.data;
        let (slope, intercept) = (attr.slope, attr.intercept);
        data.mapv_inplace(|v| (v as f64 * slope + intercept) as f32);
        if attr.monochrome1 {
            if let Some(window) = IntensityWindow::from_samples(data.iter().copied()) {
                let max = window.upper_bound();
                data.mapv_inplace(|v| max - v);
            }
        }
        data
    }

    /// 校准后线性拉伸到 \[0, 255\] (四舍五入).
    ///
    /// 常量图像映射为全 0; 非有限值映射为 0.
    pub fn normalize(self) -> NormalizedImage {
        let data = self.calibrate();
        let gray = match IntensityWindow::from_samples(data.iter().copied()) {
            Some(window) => data.mapv(|v| window.eval(v).unwrap_or(u8::MIN)),
            None => Array2::zeros(data.dim()),
        };
        NormalizedImage::from_array(gray)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_source_kind_by_extension() {
        assert_eq!(SourceKind::from_filename("a.DCM"), SourceKind::Dicom);
        assert_eq!(SourceKind::from_filename("x/y/b.dicom"), SourceKind::Dicom);
        assert_eq!(SourceKind::from_filename("c.png"), SourceKind::Raster);
        assert_eq!(SourceKind::from_filename("dcm"), SourceKind::Raster);
        assert_eq!(SourceKind::from_filename(""), SourceKind::Raster);
    }

    #[test]
    fn test_calibrate_rescale_and_invert() {
        let attr = DicomAttr {
            slope: 2.0,
            intercept: -10.0,
            monochrome1: false,
        };
        let raw = RawImage::dicom(array![[0.0f32, 5.0], [10.0, 20.0]], attr);
        assert_eq!(raw.kind(), SourceKind::Dicom);
        assert_eq!(raw.calibrate(), array![[-10.0f32, 0.0], [10.0, 30.0]]);

        let attr = DicomAttr {
            monochrome1: true,
            ..attr
        };
        let raw = RawImage::dicom(array![[0.0f32, 5.0], [10.0, 20.0]], attr);
        assert_eq!(raw.calibrate(), array![[40.0f32, 30.0], [20.0, 0.0]]);
    }

    #[test]
    fn test_normalize_span() {
        let raw = RawImage::raster(array![[10.0f32, 20.0], [f32::NAN, 30.0]]);
        let img = raw.normalize();
        assert_eq!(img.view(), array![[0u8, 128], [0, 255]]);

        let flat = RawImage::raster(Array2::from_elem((3, 3), 42.0f32)).normalize();
        assert!(flat.iter().all(|&p| p == 0));

        // MONOCHROME1: 原最暗处归一化后最亮.
        let attr = DicomAttr {
            monochrome1: true,
            ..Default::default()
        };
        let img = RawImage::dicom(array![[0.0f32, 100.0]], attr).normalize();
        assert_eq!(img.view(), array![[255u8, 0]]);
    }
}
