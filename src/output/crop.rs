// 该文件是 Yishang （衣裳） 项目的一部分。
// src/output/crop.rs - 区域裁剪
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

use image::{RgbImage, imageops};

use crate::geometry::BoundingBox;

/// 图像内的整数像素矩形
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
  pub x: u32,
  pub y: u32,
  pub width: u32,
  pub height: u32,
}

impl PixelRect {
  /// 坐标截断取整后限制在图像范围内，面积为 0 时返回 None
  pub fn from_bbox(bbox: &BoundingBox, image_width: u32, image_height: u32) -> Option<Self> {
    let clamp = |v: f32, max: u32| -> u32 {
      if v.is_nan() {
        0
      } else {
        (v.trunc().max(0.0) as u32).min(max)
      }
    };

    let x_min = clamp(bbox.xmin, image_width);
    let y_min = clamp(bbox.ymin, image_height);
    let x_max = clamp(bbox.xmax, image_width);
    let y_max = clamp(bbox.ymax, image_height);

    if x_max <= x_min || y_max <= y_min {
      return None;
    }

    Some(Self {
      x: x_min,
      y: y_min,
      width: x_max - x_min,
      height: y_max - y_min,
    })
  }
}

pub fn crop(image: &RgbImage, rect: &PixelRect) -> RgbImage {
  imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image()
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::Rgb;

  #[test]
  fn truncates_and_clamps() {
    let rect = PixelRect::from_bbox(&BoundingBox::new(-5.0, 10.7, 120.9, 49.2), 100, 80).unwrap();
    assert_eq!(
      rect,
      PixelRect {
        x: 0,
        y: 10,
        width: 100,
        height: 39,
      }
    );
  }

  #[test]
  fn outside_or_empty_is_none() {
    assert_eq!(PixelRect::from_bbox(&BoundingBox::new(0.0, 50.0, 10.0, 50.0), 100, 100), None);
    assert_eq!(PixelRect::from_bbox(&BoundingBox::new(0.0, 120.0, 10.0, 150.0), 100, 100), None);
  }

  #[test]
  fn crop_copies_pixels() {
    let image = RgbImage::from_fn(10, 10, |x, y| Rgb([x as u8, y as u8, 0]));
    let rect = PixelRect {
      x: 2,
      y: 3,
      width: 4,
      height: 5,
    };
    let cropped = crop(&image, &rect);
    assert_eq!(cropped.dimensions(), (4, 5));
    assert_eq!(cropped.get_pixel(0, 0), &Rgb([2, 3, 0]));
    assert_eq!(cropped.get_pixel(3, 4), &Rgb([5, 7, 0]));
  }
}
