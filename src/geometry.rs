// 该文件是 Yishang （衣裳） 项目的一部分。
// src/geometry.rs - 边界框几何
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

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::region::Region;

/// 轴对齐矩形，像素坐标 [x_min, y_min, x_max, y_max]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
  pub xmin: f32,
  pub ymin: f32,
  pub xmax: f32,
  pub ymax: f32,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
  #[error("区域 {region} 的边界框退化: {bbox:?}")]
  Degenerate { region: Region, bbox: BoundingBox },
}

impl BoundingBox {
  pub fn new(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
    Self {
      xmin,
      ymin,
      xmax,
      ymax,
    }
  }

  pub fn width(&self) -> f32 {
    self.xmax - self.xmin
  }

  pub fn height(&self) -> f32 {
    self.ymax - self.ymin
  }

  pub fn area(&self) -> f32 {
    self.width() * self.height()
  }

  /// 宽或高不为正
  pub fn is_degenerate(&self) -> bool {
    !(self.width() > 0.0 && self.height() > 0.0)
  }

  /// 四个坐标均有限，且满足 xmin ≤ xmax、ymin ≤ ymax
  pub fn is_well_formed(&self) -> bool {
    [self.xmin, self.ymin, self.xmax, self.ymax]
      .iter()
      .all(|v| v.is_finite())
      && self.xmin <= self.xmax
      && self.ymin <= self.ymax
  }

  /// 水平方向拉伸到 `other` 的宽度，垂直范围不变
  pub fn with_horizontal_extent_of(&self, other: &BoundingBox) -> Self {
    Self {
      xmin: other.xmin,
      xmax: other.xmax,
      ..*self
    }
  }

  pub fn intersection_area(&self, other: &BoundingBox) -> f32 {
    let w = (self.xmax.min(other.xmax) - self.xmin.max(other.xmin)).max(0.0);
    let h = (self.ymax.min(other.ymax) - self.ymin.max(other.ymin)).max(0.0);
    w * h
  }

  /// 交并比，并集面积为 0 时返回 0
  pub fn iou(&self, other: &BoundingBox) -> f32 {
    let intersection = self.intersection_area(other);
    let union = self.area() + other.area() - intersection;
    if union == 0.0 {
      0.0
    } else {
      intersection / union
    }
  }
}
