// 该文件是 Yishang （衣裳） 项目的一部分。
// src/pipeline.rs - 服装区域提取流程
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

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
  geometry::BoundingBox,
  human::{HumanError, HumanFilter},
  model::DetectResult,
  reconcile::{ReconcileError, ReconciledBoxes, reconcile},
  region::LabelTable,
  select::{SelectionResult, select},
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
  #[error("人体检测错误")]
  HumanError(#[from] HumanError),
  #[error("区域校正错误")]
  ReconcileError(#[from] ReconcileError),
}

/// 单张图片的分析结果
#[derive(Debug, Clone)]
pub struct Analysis {
  pub human: BoundingBox,
  pub selection: SelectionResult,
  pub boxes: ReconciledBoxes,
}

#[derive(Debug, Clone, Default)]
pub struct ClothingPipeline {
  table: LabelTable,
  humans: HumanFilter,
}

impl ClothingPipeline {
  pub fn new(table: LabelTable, humans: HumanFilter) -> Self {
    Self { table, humans }
  }

  pub fn table(&self) -> &LabelTable {
    &self.table
  }

  /// 人体框 → 区域挑选 → 区域校正
  pub fn analyse(&self, detections: &DetectResult) -> Result<Analysis, PipelineError> {
    let human = self.humans.select(&detections.humans)?;
    debug!("人体参考框: {:?}", human);

    let selection = select(&self.table, &detections.clothes);
    for issue in &selection.issues {
      match issue.region {
        Some(region) => warn!(
          "第 {} 条服装检测畸形, 区域 {} 留空: {}",
          issue.index, region, issue.error
        ),
        None => warn!("第 {} 条服装检测畸形, 已跳过: {}", issue.index, issue.error),
      }
    }
    if let Some((pants, overlap)) = &selection.discarded_pants {
      info!(
        "pants '{}' 与 body 交并比 {:.3}, 视为连体服装的误检并丢弃",
        pants.label, overlap
      );
    }
    for (region, detection) in selection.iter() {
      match detection {
        Some(d) => debug!("区域 {}: {} ({:.2}) {:?}", region, d.label, d.score, d.bbox),
        None => debug!("区域 {}: 无", region),
      }
    }

    let boxes = reconcile(&self.table, &human, &selection)?;
    info!(
      "区域校正完成 ({})",
      if boxes.is_full_body() {
        "连体服装"
      } else {
        "分体服装"
      }
    );

    Ok(Analysis {
      human,
      selection,
      boxes,
    })
  }
}
