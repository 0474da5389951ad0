use crate::{DecodeError, DicomAttr, RawImage};
use dicom_core::Tag;
use dicom_dictionary_std::tags;
use dicom_object::DefaultDicomObject;
use dicom_pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder};
use ndarray::Array2;

/// DICOM Part 10 文件的前导区长度.
const PREAMBLE_LEN: usize = 128;

/// 紧随前导区的魔数.
const MAGIC: &[u8; 4] = b"DICM";

/// 解码单帧灰度 DICOM.
///
/// 像素值不经过 modality LUT, 而是以 [`DicomAttr`] 记录 rescale 参数,
/// 在归一化时再统一校准.
pub(super) fn decode(bytes: &[u8]) -> Result<RawImage, DecodeError> {
    let obj = dicom_object::from_reader(skip_preamble(bytes)).map_err(dicom_err)?;
    let attr = read_attr(&obj);

    let pixels = obj.decode_pixel_data().map_err(dicom_err)?;
    let samples = pixels.samples_per_pixel();
    if samples != 1 {
        return Err(DecodeError::UnsupportedDicom(format!(
            "expected 1 sample per pixel, found {samples}"
        )));
    }
    let (rows, cols) = (pixels.rows() as usize, pixels.columns() as usize);
    if rows == 0 || cols == 0 {
        return Err(DecodeError::Empty);
    }
    let frames = pixels.number_of_frames();
    if frames > 1 {
        log::warn!("DICOM object has {frames} frames, only the first one is used");
    }

    let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);
    let mut values: Vec<f32> = pixels.to_vec_with_options(&options).map_err(dicom_err)?;
    let frame_len = rows * cols;
    if values.len() < frame_len {
        return Err(DecodeError::UnsupportedDicom(format!(
            "pixel data holds {} samples, expected at least {frame_len}",
            values.len()
        )));
    }
    values.truncate(frame_len);
    let data = Array2::from_shape_vec((rows, cols), values).map_err(dicom_err)?;
    log::debug!(
        "decoded DICOM image: {cols}x{rows}, slope {}, intercept {}, monochrome1 {}",
        attr.slope,
        attr.intercept,
        attr.monochrome1
    );
    Ok(RawImage::dicom(data, attr))
}

/// `from_reader` 要求数据从魔数开始. 存在 128 字节前导区时跳过它.
fn skip_preamble(bytes: &[u8]) -> &[u8] {
    match bytes.get(PREAMBLE_LEN..PREAMBLE_LEN + MAGIC.len()) {
        Some(magic) if magic == MAGIC => &bytes[PREAMBLE_LEN..],
        _ => bytes,
    }
}

fn read_attr(obj: &DefaultDicomObject) -> DicomAttr {
    let default = DicomAttr::default();
    let monochrome1 = get_string(obj, tags::PHOTOMETRIC_INTERPRETATION)
        .is_some_and(|p| p.trim().eq_ignore_ascii_case("MONOCHROME1"));
    DicomAttr {
        slope: get_f64(obj, tags::RESCALE_SLOPE).unwrap_or(default.slope),
        intercept: get_f64(obj, tags::RESCALE_INTERCEPT).unwrap_or(default.intercept),
        monochrome1,
    }
}

fn get_string(obj: &DefaultDicomObject, tag: Tag) -> Option<String> {
    obj.element(tag).ok()?.to_str().ok().map(|s| s.to_string())
}

fn get_f64(obj: &DefaultDicomObject, tag: Tag) -> Option<f64> {
    obj.element(tag).ok()?.to_float64().ok()
}

#[inline]
fn dicom_err<E: std::fmt::Display>(e: E) -> DecodeError {
    DecodeError::Dicom(e.to_string())
}
