// 该文件是 Yishang （衣裳） 项目的一部分。
// src/output/draw.rs - 区域框可视化
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

use image::{Rgb, RgbImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};

use crate::{
  geometry::BoundingBox,
  output::crop::PixelRect,
  pipeline::Analysis,
  region::Region,
};

const HUMAN_COLOR: [u8; 3] = [255, 255, 255];
const REGION_COLORS: [[u8; 3]; 4] = [
  [255, 196, 0], // head
  [0, 128, 255], // body
  [0, 200, 80],  // pants
  [220, 40, 40], // boots
];
const BORDER_THICKNESS: u32 = 2;

pub struct Draw {
  human_color: [u8; 3],
  region_colors: [[u8; 3]; 4],
  thickness: u32,
}

impl Default for Draw {
  fn default() -> Self {
    Self {
      human_color: HUMAN_COLOR,
      region_colors: REGION_COLORS,
      thickness: BORDER_THICKNESS,
    }
  }
}

impl Draw {
  fn draw_bbox(&self, image: &mut RgbImage, bbox: &BoundingBox, color: [u8; 3]) {
    let Some(rect) = PixelRect::from_bbox(bbox, image.width(), image.height()) else {
      return;
    };

    // 向内加粗
    for t in 0..self.thickness {
      if rect.width <= 2 * t || rect.height <= 2 * t {
        break;
      }
      let inner = Rect::at((rect.x + t) as i32, (rect.y + t) as i32)
        .of_size(rect.width - 2 * t, rect.height - 2 * t);
      draw_hollow_rect_mut(image, inner, Rgb(color));
    }
  }

  /// 在原图副本上绘制人体框和各区域框
  pub fn draw_analysis(&self, image: &RgbImage, analysis: &Analysis) -> RgbImage {
    let mut canvas = image.clone();
    self.draw_bbox(&mut canvas, &analysis.human, self.human_color);
    for region in Region::ALL {
      if let Some(bbox) = analysis.boxes.get(region) {
        self.draw_bbox(&mut canvas, &bbox, self.region_colors[region.index()]);
      }
    }
    canvas
  }
}
