// 该文件是 Yishang （衣裳） 项目的一部分。
// src/region.rs - 身体区域与服装标签表
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

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// 内置的 Fashionpedia 标签表
const FASHIONPEDIA_LABELS: &str = include_str!("../labels/fashionpedia.json");

/// 服装区域，自上而下排列
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
  Head,
  Body,
  Pants,
  Boots,
}

impl Region {
  /// 固定的处理顺序
  pub const ALL: [Region; 4] = [Region::Head, Region::Body, Region::Pants, Region::Boots];

  pub fn as_str(&self) -> &'static str {
    match self {
      Region::Head => "head",
      Region::Body => "body",
      Region::Pants => "pants",
      Region::Boots => "boots",
    }
  }

  /// 在 `ALL` 中的序号
  pub fn index(&self) -> usize {
    match self {
      Region::Head => 0,
      Region::Body => 1,
      Region::Pants => 2,
      Region::Boots => 3,
    }
  }

  /// 裁剪结果所在的子目录名
  pub fn folder_name(&self) -> &'static str {
    match self {
      Region::Head => "HEAD",
      Region::Body => "BODY",
      Region::Pants => "PANTS",
      Region::Boots => "BOOTS",
    }
  }
}

impl std::fmt::Display for Region {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Error, Debug)]
pub enum LabelTableError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("标签表解析错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("标签 '{label}' 同时属于 {first} 和 {second}")]
  DuplicateLabel {
    label: String,
    first: Region,
    second: Region,
  },
  #[error("连体服装标签 '{0}' 不属于 body 区域")]
  FullBodyNotInBody(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LabelTableFile {
  #[serde(default)]
  regions: BTreeMap<Region, Vec<String>>,
  #[serde(default)]
  full_body: Vec<String>,
}

/// 服装标签到区域的静态映射
///
/// 每个标签只能属于一个区域；连体服装（如连衣裙）必须是 body 标签。
#[derive(Debug, Clone)]
pub struct LabelTable {
  lookup: HashMap<String, Region>,
  full_body: HashSet<String>,
}

impl LabelTable {
  pub fn new<L, F>(regions: L, full_body: F) -> Result<Self, LabelTableError>
  where
    L: IntoIterator<Item = (Region, Vec<String>)>,
    F: IntoIterator<Item = String>,
  {
    let mut lookup = HashMap::new();

    for (region, labels) in regions {
      for label in labels {
        if let Some(&first) = lookup.get(&label) {
          if first == region {
            continue;
          }
          return Err(LabelTableError::DuplicateLabel {
            label,
            first,
            second: region,
          });
        }
        lookup.insert(label, region);
      }
    }

    let full_body: HashSet<String> = full_body.into_iter().collect();
    if let Some(label) = full_body
      .iter()
      .find(|label| lookup.get(*label) != Some(&Region::Body))
    {
      return Err(LabelTableError::FullBodyNotInBody(label.clone()));
    }

    debug!(
      "标签表: {} 个标签, {} 个连体服装标签",
      lookup.len(),
      full_body.len()
    );

    Ok(Self {
      lookup,
      full_body,
    })
  }

  pub fn from_json_str(json: &str) -> Result<Self, LabelTableError> {
    let file: LabelTableFile = serde_json::from_str(json)?;
    Self::new(file.regions, file.full_body)
  }

  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LabelTableError> {
    let json = std::fs::read_to_string(path)?;
    Self::from_json_str(&json)
  }

  /// Fashionpedia 服装标签; `coat` 不属于任何区域
  pub fn fashionpedia() -> Self {
    Self::from_json_str(FASHIONPEDIA_LABELS).expect("无法加载内置的标签表")
  }

  pub fn region_of(&self, label: &str) -> Option<Region> {
    self.lookup.get(label).copied()
  }

  pub fn is_full_body(&self, label: &str) -> bool {
    self.full_body.contains(label)
  }

  pub fn len(&self) -> usize {
    self.lookup.len()
  }

  pub fn is_empty(&self) -> bool {
    self.lookup.is_empty()
  }
}

impl Default for LabelTable {
  fn default() -> Self {
    Self::fashionpedia()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fashionpedia_table_is_consistent() {
    let table = LabelTable::fashionpedia();
    assert_eq!(table.len(), 17);
    assert_eq!(table.region_of("pants"), Some(Region::Pants));
    assert_eq!(table.region_of("shoe"), Some(Region::Boots));
    assert_eq!(table.region_of("hat"), Some(Region::Head));
    assert_eq!(table.region_of("coat"), None);
    assert_eq!(table.region_of("umbrella"), None);
    for label in ["dress", "jumpsuit", "cape"] {
      assert!(table.is_full_body(label));
    }
    assert!(!table.is_full_body("shirt, blouse"));
  }

  #[test]
  fn duplicate_label_is_rejected() {
    let err = LabelTable::from_json_str(
      r#"{"regions": {"body": ["top"], "pants": ["top"]}, "full_body": []}"#,
    )
    .unwrap_err();
    assert!(matches!(
      err,
      LabelTableError::DuplicateLabel {
        first: Region::Body,
        second: Region::Pants,
        ..
      }
    ));
  }

  #[test]
  fn full_body_label_must_be_body() {
    let err = LabelTable::from_json_str(
      r#"{"regions": {"body": ["top"], "pants": ["overall"]}, "full_body": ["overall"]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, LabelTableError::FullBodyNotInBody(label) if label == "overall"));
  }

  #[test]
  fn regions_may_be_omitted() {
    let table = LabelTable::from_json_str(r#"{"regions": {"body": ["top"]}}"#).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.region_of("top"), Some(Region::Body));
    assert!(!table.is_full_body("top"));
  }

  #[test]
  fn region_order_and_names() {
    for (i, region) in Region::ALL.iter().enumerate() {
      assert_eq!(region.index(), i);
    }
    assert_eq!(Region::Pants.to_string(), "pants");
    assert_eq!(Region::Boots.folder_name(), "BOOTS");
  }
}
