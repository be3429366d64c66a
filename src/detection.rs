// 该文件是 Yishang （衣裳） 项目的一部分。
// src/detection.rs - 检测结果定义
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

use crate::geometry::BoundingBox;

/// 检测器输出的原始边界框，字段可能缺失
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBox {
  pub xmin: Option<f32>,
  pub ymin: Option<f32>,
  pub xmax: Option<f32>,
  pub ymax: Option<f32>,
}

impl RawBox {
  /// 四个坐标齐全时计算面积（不检查坐标是否合法）
  pub fn area(&self) -> Option<f32> {
    match (self.xmin, self.ymin, self.xmax, self.ymax) {
      (Some(xmin), Some(ymin), Some(xmax), Some(ymax)) => Some((xmax - xmin) * (ymax - ymin)),
      _ => None,
    }
  }
}

impl From<BoundingBox> for RawBox {
  fn from(bbox: BoundingBox) -> Self {
    Self {
      xmin: Some(bbox.xmin),
      ymin: Some(bbox.ymin),
      xmax: Some(bbox.xmax),
      ymax: Some(bbox.ymax),
    }
  }
}

/// 检测器输出的单条记录: `{"label": .., "score": .., "box": {..}}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
  #[serde(default)]
  pub label: Option<String>,
  #[serde(default)]
  pub score: Option<f32>,
  #[serde(default, rename = "box")]
  pub bbox: Option<RawBox>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MalformedDetection {
  #[error("缺少标签")]
  MissingLabel,
  #[error("缺少边界框")]
  MissingBox,
  #[error("边界框坐标不完整: {0:?}")]
  IncompleteBox(RawBox),
  #[error("边界框坐标非法: {0:?}")]
  InvalidBox(BoundingBox),
}

/// 校验后的检测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
  pub label: String,
  pub score: f32,
  #[serde(rename = "box")]
  pub bbox: BoundingBox,
}

impl Detection {
  pub fn new(label: impl Into<String>, score: f32, bbox: BoundingBox) -> Self {
    Self {
      label: label.into(),
      score,
      bbox,
    }
  }
}

impl RawDetection {
  /// 排序用面积，坐标不完整时视为 0
  pub fn sort_area(&self) -> f32 {
    self
      .bbox
      .as_ref()
      .and_then(RawBox::area)
      .filter(|area| !area.is_nan())
      .unwrap_or(0.0)
  }

  pub fn validate(&self) -> Result<Detection, MalformedDetection> {
    let label = self.label.clone().ok_or(MalformedDetection::MissingLabel)?;
    let raw = self.bbox.ok_or(MalformedDetection::MissingBox)?;
    let bbox = match (raw.xmin, raw.ymin, raw.xmax, raw.ymax) {
      (Some(xmin), Some(ymin), Some(xmax), Some(ymax)) => BoundingBox::new(xmin, ymin, xmax, ymax),
      _ => return Err(MalformedDetection::IncompleteBox(raw)),
    };
    if !bbox.is_well_formed() {
      return Err(MalformedDetection::InvalidBox(bbox));
    }

    Ok(Detection {
      label,
      score: self.score.unwrap_or(0.0),
      bbox,
    })
  }
}

impl From<Detection> for RawDetection {
  fn from(detection: Detection) -> Self {
    Self {
      label: Some(detection.label),
      score: Some(detection.score),
      bbox: Some(detection.bbox.into()),
    }
  }
}
