// 该文件是 Yishang （衣裳） 项目的一部分。
// src/reconcile.rs - 区域边界框校正
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

use crate::{
  geometry::{BoundingBox, GeometryError},
  region::{LabelTable, Region},
  select::SelectionResult,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
  #[error("缺少 body 区域检测结果")]
  MissingBodyRegion,
  #[error("非连体服装缺少 pants 区域检测结果")]
  MissingPantsRegion,
}

/// 校正后的区域边界框
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciledBoxes {
  boxes: [Option<BoundingBox>; 4],
  labels: [Option<String>; 4],
  full_body: bool,
}

impl ReconciledBoxes {
  pub fn get(&self, region: Region) -> Option<BoundingBox> {
    self.boxes[region.index()]
  }

  /// 检测器给出的标签，几何推导出的区域可能没有
  pub fn label(&self, region: Region) -> Option<&str> {
    self.labels[region.index()].as_deref()
  }

  /// body 是否为连体服装
  pub fn is_full_body(&self) -> bool {
    self.full_body
  }

  /// 同 `get`，但宽或高不为正的边界框返回错误
  pub fn checked(&self, region: Region) -> Result<Option<BoundingBox>, GeometryError> {
    match self.get(region) {
      Some(bbox) if bbox.is_degenerate() => Err(GeometryError::Degenerate { region, bbox }),
      other => Ok(other),
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = (Region, Option<BoundingBox>)> + '_ {
    Region::ALL.into_iter().map(|region| (region, self.get(region)))
  }
}

/// 以人体框为基准，推导出上下相接、与人体同宽的各区域边界框
///
/// head 始终从人体顶部延伸到 body 顶部；boots 从连体服装底部（或 pants
/// 底部）延伸到人体底部。pants 保留检测到的原始范围。
pub fn reconcile(
  table: &LabelTable,
  human: &BoundingBox,
  selection: &SelectionResult,
) -> Result<ReconciledBoxes, ReconcileError> {
  let body = selection.body().ok_or(ReconcileError::MissingBodyRegion)?;
  let full_body = table.is_full_body(&body.label);

  let body_box = body.bbox.with_horizontal_extent_of(human);

  let legs_top = if full_body {
    body_box.ymax
  } else {
    selection
      .pants()
      .ok_or(ReconcileError::MissingPantsRegion)?
      .bbox
      .ymax
  };

  let head_box = BoundingBox::new(human.xmin, human.ymin, human.xmax, body_box.ymin);
  let boots_box = BoundingBox::new(human.xmin, legs_top, human.xmax, human.ymax);

  let mut boxes = [None; 4];
  boxes[Region::Head.index()] = Some(head_box);
  boxes[Region::Body.index()] = Some(body_box);
  boxes[Region::Pants.index()] = selection.pants().map(|pants| pants.bbox);
  boxes[Region::Boots.index()] = Some(boots_box);

  let labels = Region::ALL.map(|region| selection.get(region).map(|d| d.label.clone()));

  Ok(ReconciledBoxes {
    boxes,
    labels,
    full_body,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::detection::Detection;

  fn det(label: &str, bbox: [f32; 4]) -> Detection {
    Detection::new(label, 0.9, BoundingBox::new(bbox[0], bbox[1], bbox[2], bbox[3]))
  }

  fn human() -> BoundingBox {
    BoundingBox::new(0.0, 0.0, 100.0, 200.0)
  }

  #[test]
  fn dress_spans_body_and_legs() {
    let table = LabelTable::fashionpedia();
    let selection =
      SelectionResult::default().with(Region::Body, det("dress", [10.0, 50.0, 90.0, 150.0]));
    let boxes = reconcile(&table, &human(), &selection).unwrap();

    assert!(boxes.is_full_body());
    assert_eq!(boxes.get(Region::Head), Some(BoundingBox::new(0.0, 0.0, 100.0, 50.0)));
    assert_eq!(boxes.get(Region::Body), Some(BoundingBox::new(0.0, 50.0, 100.0, 150.0)));
    assert_eq!(boxes.get(Region::Boots), Some(BoundingBox::new(0.0, 150.0, 100.0, 200.0)));
    assert_eq!(boxes.get(Region::Pants), None);
    assert_eq!(boxes.label(Region::Body), Some("dress"));
    assert_eq!(boxes.label(Region::Head), None);
  }

  #[test]
  fn separate_garments_anchor_boots_on_pants() {
    let table = LabelTable::fashionpedia();
    let selection = SelectionResult::default()
      .with(Region::Head, det("hat", [30.0, 0.0, 70.0, 20.0]))
      .with(Region::Body, det("jacket", [5.0, 40.0, 95.0, 110.0]))
      .with(Region::Pants, det("pants", [20.0, 100.0, 80.0, 180.0]))
      .with(Region::Boots, det("shoe", [20.0, 185.0, 80.0, 199.0]));
    let boxes = reconcile(&table, &human(), &selection).unwrap();

    assert!(!boxes.is_full_body());
    assert_eq!(boxes.get(Region::Head), Some(BoundingBox::new(0.0, 0.0, 100.0, 40.0)));
    assert_eq!(boxes.get(Region::Body), Some(BoundingBox::new(0.0, 40.0, 100.0, 110.0)));
    // pants 不拉伸
    assert_eq!(boxes.get(Region::Pants), Some(BoundingBox::new(20.0, 100.0, 80.0, 180.0)));
    // boots 以几何推导为准
    assert_eq!(boxes.get(Region::Boots), Some(BoundingBox::new(0.0, 180.0, 100.0, 200.0)));
    assert_eq!(boxes.label(Region::Head), Some("hat"));
  }

  #[test]
  fn missing_body_is_fatal() {
    let table = LabelTable::fashionpedia();
    let selection = SelectionResult::default()
      .with(Region::Head, det("hat", [30.0, 0.0, 70.0, 20.0]))
      .with(Region::Pants, det("pants", [20.0, 100.0, 80.0, 180.0]));
    assert_eq!(
      reconcile(&table, &human(), &selection),
      Err(ReconcileError::MissingBodyRegion)
    );
  }

  #[test]
  fn missing_pants_is_fatal_for_separate_garments() {
    let table = LabelTable::fashionpedia();
    let selection = SelectionResult::default()
      .with(Region::Body, det("sweater", [5.0, 40.0, 95.0, 110.0]))
      .with(Region::Boots, det("shoe", [20.0, 185.0, 80.0, 199.0]));
    assert_eq!(
      reconcile(&table, &human(), &selection),
      Err(ReconcileError::MissingPantsRegion)
    );
  }

  #[test]
  fn body_filling_human_yields_degenerate_boots() {
    let table = LabelTable::fashionpedia();
    let selection =
      SelectionResult::default().with(Region::Body, det("jumpsuit", [10.0, 0.0, 90.0, 200.0]));
    let boxes = reconcile(&table, &human(), &selection).unwrap();

    assert!(matches!(
      boxes.checked(Region::Boots),
      Err(GeometryError::Degenerate {
        region: Region::Boots,
        ..
      })
    ));
    assert!(matches!(boxes.checked(Region::Head), Err(_)));
    assert!(boxes.checked(Region::Body).unwrap().is_some());
    assert_eq!(boxes.checked(Region::Pants), Ok(None));
  }
}
