// 该文件是 Yishang （衣裳） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, frame::ImageFrame};

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误 {0}: {1}")]
  IoError(PathBuf, std::io::Error),
  #[error("图像加载错误 {0}: {1}")]
  ImageLoadError(PathBuf, image::ImageError),
}

fn check_scheme(url: &Url, expected: &str) -> Result<(), ImageFileInputError> {
  if url.scheme() != expected {
    error!(
      "URI scheme mismatch: expected '{}', found '{}'",
      expected,
      url.scheme()
    );
    return Err(ImageFileInputError::SchemeMismatch);
  }
  Ok(())
}

pub fn is_image_file(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
    .unwrap_or(false)
}

/// 单个图像文件: `image:///path/to/photo.jpg`
pub struct ImageFileInput {
  path: PathBuf,
}

impl FromUrlWithScheme for ImageFileInput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ImageFileInput {
  type Error = ImageFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    check_scheme(url, Self::SCHEME)?;
    Ok(ImageFileInput {
      path: PathBuf::from(url.path()),
    })
  }
}

impl IntoIterator for ImageFileInput {
  type Item = Result<ImageFrame, ImageFileInputError>;
  type IntoIter = ImageFileIter;

  fn into_iter(self) -> Self::IntoIter {
    ImageFileIter::new(vec![self.path])
  }
}

/// 目录下的全部图像文件（按文件名排序）: `folder:///path/to/photos`
pub struct ImageFolderInput {
  paths: Vec<PathBuf>,
}

impl FromUrlWithScheme for ImageFolderInput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for ImageFolderInput {
  type Error = ImageFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    check_scheme(url, Self::SCHEME)?;
    Self::from_directory(url.path())
  }
}

impl ImageFolderInput {
  pub fn from_directory(directory: impl AsRef<Path>) -> Result<Self, ImageFileInputError> {
    let directory = directory.as_ref();
    let entries = std::fs::read_dir(directory)
      .map_err(|e| ImageFileInputError::IoError(directory.to_path_buf(), e))?;

    let mut paths = Vec::new();
    for entry in entries {
      let path = entry
        .map_err(|e| ImageFileInputError::IoError(directory.to_path_buf(), e))?
        .path();
      if path.is_file() && is_image_file(&path) {
        paths.push(path);
      }
    }
    paths.sort();

    debug!("目录 {} 中共有 {} 张图片", directory.display(), paths.len());
    Ok(ImageFolderInput { paths })
  }
}

impl IntoIterator for ImageFolderInput {
  type Item = Result<ImageFrame, ImageFileInputError>;
  type IntoIter = ImageFileIter;

  fn into_iter(self) -> Self::IntoIter {
    ImageFileIter::new(self.paths)
  }
}

/// 逐个加载图像，单个文件失败不影响后续文件
pub struct ImageFileIter {
  paths: VecDeque<PathBuf>,
}

impl ImageFileIter {
  fn new(paths: Vec<PathBuf>) -> Self {
    Self {
      paths: paths.into(),
    }
  }
}

fn load_image(path: PathBuf) -> Result<ImageFrame, ImageFileInputError> {
  let reader = ImageReader::open(&path).map_err(|e| ImageFileInputError::IoError(path.clone(), e))?;
  let image = reader
    .decode()
    .map_err(|e| ImageFileInputError::ImageLoadError(path.clone(), e))?;
  Ok(ImageFrame::new(path, image.to_rgb8()))
}

impl Iterator for ImageFileIter {
  type Item = Result<ImageFrame, ImageFileInputError>;

  fn next(&mut self) -> Option<Self::Item> {
    self.paths.pop_front().map(load_image)
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    (self.paths.len(), Some(self.paths.len()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("yishang-input-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
  }

  #[test]
  fn folder_lists_images_in_order() {
    let dir = scratch_dir("folder");
    image::RgbImage::new(8, 6).save(dir.join("b.png")).unwrap();
    image::RgbImage::new(4, 4).save(dir.join("a.jpg")).unwrap();
    std::fs::write(dir.join("a.json"), "{}").unwrap();

    let url = Url::from_directory_path(&dir).unwrap();
    let url = Url::parse(&url.as_str().replacen("file:", "folder:", 1)).unwrap();
    let input = ImageFolderInput::from_url(&url).unwrap();

    let frames: Vec<ImageFrame> = input.into_iter().map(Result::unwrap).collect();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].stem(), "a");
    assert_eq!((frames[1].width(), frames[1].height()), (8, 6));

    std::fs::remove_dir_all(&dir).unwrap();
  }

  #[test]
  fn broken_file_does_not_stop_iteration() {
    let dir = scratch_dir("broken");
    std::fs::write(dir.join("a.png"), b"not a png").unwrap();
    image::RgbImage::new(2, 2).save(dir.join("b.png")).unwrap();

    let results: Vec<_> = ImageFolderInput::from_directory(&dir)
      .unwrap()
      .into_iter()
      .collect();
    assert!(matches!(
      results[0],
      Err(ImageFileInputError::ImageLoadError(..))
    ));
    assert!(results[1].is_ok());

    std::fs::remove_dir_all(&dir).unwrap();
  }

  #[test]
  fn image_scheme_is_checked() {
    let url = Url::parse("folder:///tmp").unwrap();
    assert!(matches!(
      ImageFileInput::from_url(&url),
      Err(ImageFileInputError::SchemeMismatch)
    ));
  }
}
