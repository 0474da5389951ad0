//! 胸片目录加载器.

use std::env;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// 可识别的图像扩展名 (小写).
const EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff", "dcm", "dicom"];

/// 获取胸片目录.
///
/// 1. 若环境变量 `$CXR_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/cxr`. 无法确定 home 目录时返回 `None`.
pub fn image_dir_from_env_or_home() -> Option<PathBuf> {
    match env::var("CXR_DIR") {
        Ok(d) if !d.is_empty() => Some(PathBuf::from(d)),
        _ => dirs::home_dir().map(|h| h.join("dataset").join("cxr")),
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

/// 列出 `dir` 下 (不递归) 的全部图像文件, 按文件名排序.
pub fn image_files<P: AsRef<Path>>(dir: P) -> io::Result<Vec<PathBuf>> {
    let mut files = vec![];
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_image(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// 逐个读取图像文件, 产出 `(文件名, 字节流)`.
pub struct ImageLoader {
    files: std::vec::IntoIter<PathBuf>,
}

impl ImageLoader {
    /// 加载 `dir` 下的全部图像.
    pub fn new<P: AsRef<Path>>(dir: P) -> io::Result<Self> {
        Ok(Self {
            files: image_files(dir)?.into_iter(),
        })
    }
}

impl Iterator for ImageLoader {
    type Item = (String, io::Result<Vec<u8>>);

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.files.next()?;
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Some((name, fs::read(&path)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.files.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_image() {
        assert!(is_image(Path::new("a/b/c.PNG")));
        assert!(is_image(Path::new("scan.dcm")));
        assert!(is_image(Path::new("scan.Dicom")));
        assert!(!is_image(Path::new("notes.txt")));
        assert!(!is_image(Path::new("README")));
    }
}
