// 该文件是 Yishang （衣裳） 项目的一部分。
// src/select.rs - 按区域挑选检测结果
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

use crate::{
  detection::{Detection, MalformedDetection, RawDetection},
  region::{LabelTable, Region},
};

/// pants 与 body 的交并比超过该值时丢弃 pants
pub const PANTS_BODY_IOU_THRESHOLD: f32 = 0.5;

/// 被跳过的畸形检测记录
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionIssue {
  /// 在输入列表中的位置
  pub index: usize,
  /// 受影响的区域，标签缺失时为 None
  pub region: Option<Region>,
  pub error: MalformedDetection,
}

/// 每个区域至多一个检测结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionResult {
  picks: [Option<Detection>; 4],
  /// 被丢弃的 pants 及其与 body 的交并比
  pub discarded_pants: Option<(Detection, f32)>,
  pub issues: Vec<SelectionIssue>,
}

impl SelectionResult {
  pub fn with(mut self, region: Region, detection: Detection) -> Self {
    self.picks[region.index()] = Some(detection);
    self
  }

  pub fn get(&self, region: Region) -> Option<&Detection> {
    self.picks[region.index()].as_ref()
  }

  pub fn head(&self) -> Option<&Detection> {
    self.get(Region::Head)
  }

  pub fn body(&self) -> Option<&Detection> {
    self.get(Region::Body)
  }

  pub fn pants(&self) -> Option<&Detection> {
    self.get(Region::Pants)
  }

  pub fn boots(&self) -> Option<&Detection> {
    self.get(Region::Boots)
  }

  pub fn iter(&self) -> impl Iterator<Item = (Region, Option<&Detection>)> {
    Region::ALL.into_iter().map(|region| (region, self.get(region)))
  }
}

/// 从服装检测结果中为每个区域挑选面积最大的一个
///
/// 畸形记录不会中断处理: 若某区域面积最大的记录畸形，该区域留空，
/// 并在 `issues` 中记录。body 与 pants 高度重合时（连衣裙被同时识别为
/// 上衣和裤子），丢弃 pants。
pub fn select(table: &LabelTable, detections: &[RawDetection]) -> SelectionResult {
  let mut result = SelectionResult::default();

  let mut order: Vec<usize> = (0..detections.len()).collect();
  order.sort_by(|&a, &b| {
    detections[b]
      .sort_area()
      .total_cmp(&detections[a].sort_area())
  });

  for (index, raw) in detections.iter().enumerate() {
    if raw.label.is_none() {
      result.issues.push(SelectionIssue {
        index,
        region: None,
        error: MalformedDetection::MissingLabel,
      });
    }
  }

  for region in Region::ALL {
    let winner = order.iter().copied().find(|&i| {
      detections[i]
        .label
        .as_deref()
        .and_then(|label| table.region_of(label))
        == Some(region)
    });

    let Some(index) = winner else {
      continue;
    };

    match detections[index].validate() {
      Ok(detection) => result.picks[region.index()] = Some(detection),
      Err(error) => result.issues.push(SelectionIssue {
        index,
        region: Some(region),
        error,
      }),
    }
  }

  let overlap = match (result.body(), result.pants()) {
    (Some(body), Some(pants)) => Some(body.bbox.iou(&pants.bbox)),
    _ => None,
  };
  if let Some(overlap) = overlap
    && overlap > PANTS_BODY_IOU_THRESHOLD
    && let Some(pants) = result.picks[Region::Pants.index()].take()
  {
    result.discarded_pants = Some((pants, overlap));
  }

  result
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::geometry::BoundingBox;

  fn raw(label: &str, score: f32, bbox: [f32; 4]) -> RawDetection {
    Detection::new(label, score, BoundingBox::new(bbox[0], bbox[1], bbox[2], bbox[3])).into()
  }

  fn small_table() -> LabelTable {
    LabelTable::from_json_str(
      r#"{
        "regions": {"head": ["cap"], "body": ["top", "gown"], "pants": ["jeans"], "boots": ["sock"]},
        "full_body": ["gown"]
      }"#,
    )
    .unwrap()
  }

  #[test]
  fn largest_area_wins_over_confidence() {
    let detections = vec![
      raw("top", 0.99, [10.0, 10.0, 20.0, 20.0]),
      raw("top", 0.40, [0.0, 0.0, 50.0, 50.0]),
    ];
    let result = select(&small_table(), &detections);
    assert_eq!(result.body().unwrap().score, 0.40);
  }

  #[test]
  fn regions_without_detections_stay_unset() {
    let detections = vec![raw("top", 0.9, [0.0, 0.0, 10.0, 10.0])];
    let result = select(&small_table(), &detections);
    assert!(result.body().is_some());
    assert!(result.head().is_none());
    assert!(result.pants().is_none());
    assert!(result.boots().is_none());
    assert!(result.issues.is_empty());
  }

  #[test]
  fn unknown_labels_are_ignored() {
    let detections = vec![raw("umbrella", 0.9, [0.0, 0.0, 100.0, 100.0])];
    let result = select(&small_table(), &detections);
    assert!(result.iter().all(|(_, d)| d.is_none()));
  }

  #[test]
  fn overlapping_pants_are_discarded() {
    let detections = vec![
      raw("jeans", 0.9, [10.0, 60.0, 90.0, 140.0]),
      raw("gown", 0.95, [10.0, 50.0, 92.0, 148.0]),
    ];
    let result = select(&small_table(), &detections);
    assert_eq!(result.body().unwrap().label, "gown");
    assert!(result.pants().is_none());
    let (pants, overlap) = result.discarded_pants.as_ref().unwrap();
    assert_eq!(pants.label, "jeans");
    assert!(*overlap > PANTS_BODY_IOU_THRESHOLD);
  }

  #[test]
  fn separate_pants_are_kept() {
    let detections = vec![
      raw("top", 0.9, [10.0, 40.0, 90.0, 100.0]),
      raw("jeans", 0.9, [15.0, 100.0, 85.0, 180.0]),
    ];
    let result = select(&small_table(), &detections);
    assert!(result.pants().is_some());
    assert!(result.discarded_pants.is_none());
  }

  #[test]
  fn pants_at_exact_threshold_are_kept() {
    let detections = vec![
      raw("top", 0.9, [0.0, 0.0, 100.0, 100.0]),
      raw("jeans", 0.9, [0.0, 0.0, 100.0, 50.0]),
    ];
    let result = select(&small_table(), &detections);
    let body = result.body().unwrap().bbox;
    let pants = result.pants().unwrap().bbox;
    assert_eq!(body.iou(&pants), PANTS_BODY_IOU_THRESHOLD);
    assert!(result.discarded_pants.is_none());
  }

  #[test]
  fn malformed_winner_leaves_region_unset() {
    let mut bad = raw("top", 0.9, [0.0, 0.0, 0.0, 0.0]);
    // 两个轴都反转: 面积最大但不合法
    bad.bbox = Some(BoundingBox::new(200.0, 200.0, 0.0, 0.0).into());
    let detections = vec![
      raw("top", 0.9, [10.0, 10.0, 20.0, 20.0]),
      bad,
      raw("jeans", 0.8, [10.0, 100.0, 50.0, 150.0]),
    ];
    let result = select(&small_table(), &detections);
    assert!(result.body().is_none());
    assert!(result.pants().is_some());
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].index, 1);
    assert_eq!(result.issues[0].region, Some(Region::Body));
  }

  #[test]
  fn missing_label_is_reported_and_skipped() {
    let detections = vec![
      RawDetection {
        label: None,
        score: Some(0.9),
        bbox: Some(BoundingBox::new(0.0, 0.0, 500.0, 500.0).into()),
      },
      raw("sock", 0.7, [0.0, 180.0, 50.0, 200.0]),
    ];
    let result = select(&small_table(), &detections);
    assert_eq!(result.boots().unwrap().label, "sock");
    assert_eq!(
      result.issues,
      vec![SelectionIssue {
        index: 0,
        region: None,
        error: MalformedDetection::MissingLabel,
      }]
    );
  }
}
