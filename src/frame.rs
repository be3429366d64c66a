// 该文件是 Yishang （衣裳） 项目的一部分。
// src/frame.rs - 图像帧定义
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

use std::path::{Path, PathBuf};

use image::RgbImage;

/// 一张待处理的图片及其来源路径
#[derive(Debug, Clone)]
pub struct ImageFrame {
  path: PathBuf,
  image: RgbImage,
}

impl ImageFrame {
  pub fn new(path: impl Into<PathBuf>, image: RgbImage) -> Self {
    Self {
      path: path.into(),
      image,
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn image(&self) -> &RgbImage {
    &self.image
  }

  /// 不含扩展名的文件名，用于命名裁剪结果与检测记录
  pub fn stem(&self) -> String {
    self
      .path
      .file_stem()
      .map(|s| s.to_string_lossy().into_owned())
      .unwrap_or_else(|| "frame".to_string())
  }

  pub fn width(&self) -> u32 {
    self.image.width()
  }

  pub fn height(&self) -> u32 {
    self.image.height()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn stem_drops_directory_and_extension() {
    let frame = ImageFrame::new("/data/photos/look-01.jpg", RgbImage::new(4, 2));
    assert_eq!(frame.stem(), "look-01");
    assert_eq!((frame.width(), frame.height()), (4, 2));
  }
}
