// 该文件是 Yishang （衣裳） 项目的一部分。
// src/human.rs - 人体参考框
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

use clap::ValueEnum;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
  detection::{Detection, RawDetection},
  geometry::BoundingBox,
};

pub const PERSON_LABEL: &str = "person";
pub const DEFAULT_HUMAN_THRESHOLD: f32 = 0.9;

/// 检测到多个人时的处理方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum HumanPolicy {
  /// 取检测器输出的第一个
  #[default]
  First,
  /// 取面积最大的
  Largest,
  /// 视为错误
  Reject,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HumanError {
  #[error("未检测到人体")]
  NoHuman,
  #[error("检测到 {0} 个人体")]
  TooManyHumans(usize),
  #[error("人体边界框退化: {0:?}")]
  Degenerate(BoundingBox),
}

#[derive(Debug, Clone)]
pub struct HumanFilter {
  pub threshold: f32,
  pub policy: HumanPolicy,
}

impl Default for HumanFilter {
  fn default() -> Self {
    Self {
      threshold: DEFAULT_HUMAN_THRESHOLD,
      policy: HumanPolicy::default(),
    }
  }
}

impl HumanFilter {
  pub fn new(threshold: f32, policy: HumanPolicy) -> Self {
    Self { threshold, policy }
  }

  /// 从人体检测结果中选出唯一的参考框
  pub fn select(&self, detections: &[RawDetection]) -> Result<BoundingBox, HumanError> {
    let humans: Vec<Detection> = detections
      .iter()
      .filter_map(|raw| raw.validate().ok())
      .filter(|d| d.label == PERSON_LABEL && d.score >= self.threshold)
      .collect();

    debug!("符合条件的人体数量: {}", humans.len());

    if humans.len() > 1 {
      warn!("检测到多个人体: {}, 处理方式: {:?}", humans.len(), self.policy);
    }

    let chosen = match self.policy {
      HumanPolicy::Reject if humans.len() > 1 => {
        return Err(HumanError::TooManyHumans(humans.len()));
      }
      HumanPolicy::First | HumanPolicy::Reject => humans.first(),
      HumanPolicy::Largest => humans
        .iter()
        .reduce(|best, d| if d.bbox.area() > best.bbox.area() { d } else { best }),
    }
    .ok_or(HumanError::NoHuman)?;

    if chosen.bbox.is_degenerate() {
      return Err(HumanError::Degenerate(chosen.bbox));
    }

    Ok(chosen.bbox)
  }
}
