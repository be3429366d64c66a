// 该文件是 Yishang （衣裳） 项目的一部分。
// src/stitch.rs - 多图纵向拼接
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

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::{ImageReader, Rgb, RgbImage, imageops};
use thiserror::Error;
use tracing::{debug, info};

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

#[derive(Error, Debug)]
pub enum StitchError {
  #[error("没有输入图片")]
  NoImages,
  #[error("I/O 错误 {0}: {1}")]
  IoError(PathBuf, std::io::Error),
  #[error("图像错误 {0}: {1}")]
  ImageError(PathBuf, image::ImageError),
}

/// 把每张图缩放到最大宽度（高度不变）后自上而下拼接
pub fn stitch_images(images: &[RgbImage]) -> Result<RgbImage, StitchError> {
  let max_width = images
    .iter()
    .map(RgbImage::width)
    .max()
    .ok_or(StitchError::NoImages)?;
  let total_height: u32 = images.iter().map(RgbImage::height).sum();
  debug!("拼接 {} 张图片, 输出 {}x{}", images.len(), max_width, total_height);

  let mut canvas = RgbImage::new(max_width, total_height);
  let mut y = 0i64;
  for image in images {
    if image.width() == max_width {
      imageops::replace(&mut canvas, image, 0, y);
    } else {
      let resized = imageops::resize(
        image,
        max_width,
        image.height(),
        imageops::FilterType::CatmullRom,
      );
      imageops::replace(&mut canvas, &resized, 0, y);
    }
    y += image.height() as i64;
  }

  Ok(canvas)
}

/// 非黑色像素中出现最多的颜色，次数相同时取先出现的
pub fn majority_color(image: &RgbImage) -> Option<Rgb<u8>> {
  let mut counts: HashMap<Rgb<u8>, (usize, usize)> = HashMap::new();
  for (order, pixel) in image.pixels().filter(|p| **p != BLACK).enumerate() {
    counts.entry(*pixel).or_insert((0, order)).0 += 1;
  }

  counts
    .into_iter()
    .max_by(|(_, (ca, oa)), (_, (cb, ob))| ca.cmp(cb).then(ob.cmp(oa)))
    .map(|(color, _)| color)
}

/// 用多数颜色填充纯黑像素，全黑图像保持不变
pub fn replace_black_with_majority_color(image: &mut RgbImage) {
  let Some(color) = majority_color(image) else {
    debug!("图像全黑, 跳过填充");
    return;
  };
  for pixel in image.pixels_mut().filter(|p| **p == BLACK) {
    *pixel = color;
  }
}

fn load_image(path: &Path) -> Result<RgbImage, StitchError> {
  let reader =
    ImageReader::open(path).map_err(|e| StitchError::IoError(path.to_path_buf(), e))?;
  let image = reader
    .decode()
    .map_err(|e| StitchError::ImageError(path.to_path_buf(), e))?;
  Ok(image.to_rgb8())
}

/// 读取、拼接并保存
pub fn stitch_files(
  inputs: &[PathBuf],
  output: &Path,
  fill_black: bool,
) -> Result<(), StitchError> {
  let images = inputs
    .iter()
    .map(|path| load_image(path))
    .collect::<Result<Vec<_>, _>>()?;

  let mut stitched = stitch_images(&images)?;
  if fill_black {
    replace_black_with_majority_color(&mut stitched);
  }

  if let Some(parent) = output.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent).map_err(|e| StitchError::IoError(parent.to_path_buf(), e))?;
  }
  stitched
    .save(output)
    .map_err(|e| StitchError::ImageError(output.to_path_buf(), e))?;

  info!("拼接结果已保存: {}", output.display());
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn stacks_and_widens() {
    let a = RgbImage::from_pixel(10, 4, Rgb([200, 0, 0]));
    let b = RgbImage::from_pixel(5, 6, Rgb([0, 200, 0]));
    let stitched = stitch_images(&[a, b]).unwrap();
    assert_eq!(stitched.dimensions(), (10, 10));
    assert_eq!(stitched.get_pixel(9, 0), &Rgb([200, 0, 0]));
    let Rgb([r, g, b]) = *stitched.get_pixel(9, 9);
    assert!(r <= 1 && b <= 1 && g.abs_diff(200) <= 1);
  }

  #[test]
  fn empty_input_is_an_error() {
    assert!(matches!(stitch_images(&[]), Err(StitchError::NoImages)));
  }

  #[test]
  fn black_pixels_take_majority_color() {
    let mut image = RgbImage::from_pixel(3, 1, Rgb([9, 9, 9]));
    image.put_pixel(0, 0, BLACK);
    image.put_pixel(1, 0, Rgb([1, 2, 3]));
    // 9,9,9 与 1,2,3 各一次，取先出现的 1,2,3
    replace_black_with_majority_color(&mut image);
    assert_eq!(image.get_pixel(0, 0), &Rgb([1, 2, 3]));

    let mut black = RgbImage::new(2, 2);
    replace_black_with_majority_color(&mut black);
    assert!(black.pixels().all(|p| *p == BLACK));
  }
}
