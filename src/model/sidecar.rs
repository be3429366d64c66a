// 该文件是 Yishang （衣裳） 项目的一部分。
// src/model/sidecar.rs - 读取预先记录的检测结果
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

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::ImageFrame,
  model::{DetectResult, Model},
};

#[derive(Error, Debug)]
pub enum SidecarModelError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("无法读取检测记录 {0}: {1}")]
  IoError(PathBuf, std::io::Error),
  #[error("检测记录格式错误 {0}: {1}")]
  JsonError(PathBuf, serde_json::Error),
}

/// 外部检测器把结果写成与图片同名的 JSON 文件，本模型直接读取
///
/// `sidecar:///dir` 从 `dir` 中读取，`sidecar:` 从图片所在目录读取。
pub struct SidecarModel {
  directory: Option<PathBuf>,
}

impl FromUrlWithScheme for SidecarModel {
  const SCHEME: &'static str = "sidecar";
}

impl FromUrl for SidecarModel {
  type Error = SidecarModelError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(SidecarModelError::SchemeMismatch(format!(
        "期望 '{}', 实际 '{}'",
        Self::SCHEME,
        url.scheme()
      )));
    }

    let directory = match url.path() {
      "" => None,
      path => Some(PathBuf::from(path)),
    };

    Ok(SidecarModel { directory })
  }
}

impl SidecarModel {
  pub fn new(directory: Option<PathBuf>) -> Self {
    Self { directory }
  }

  pub fn record_path(&self, image_path: &Path) -> PathBuf {
    let stem = image_path.file_stem().unwrap_or_default();
    let directory = match &self.directory {
      Some(directory) => directory.as_path(),
      None => image_path.parent().unwrap_or(Path::new("")),
    };
    directory.join(format!("{}.json", stem.to_string_lossy()))
  }
}

impl Model for SidecarModel {
  type Input = ImageFrame;
  type Output = DetectResult;
  type Error = SidecarModelError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    let path = self.record_path(input.path());
    debug!("读取检测记录: {}", path.display());

    let json =
      std::fs::read_to_string(&path).map_err(|e| SidecarModelError::IoError(path.clone(), e))?;
    let result: DetectResult =
      serde_json::from_str(&json).map_err(|e| SidecarModelError::JsonError(path.clone(), e))?;

    if result.is_empty() {
      warn!("检测记录为空: {}", path.display());
    } else {
      debug!(
        "人体检测 {} 个, 服装检测 {} 个",
        result.humans.len(),
        result.clothes.len()
      );
    }

    Ok(result)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn record_path_in_configured_directory() {
    let model = SidecarModel::from_url(&Url::parse("sidecar:///var/detections").unwrap()).unwrap();
    assert_eq!(
      model.record_path(Path::new("/photos/look.jpg")),
      PathBuf::from("/var/detections/look.json")
    );
  }

  #[test]
  fn record_path_beside_image() {
    let model = SidecarModel::new(None);
    assert_eq!(
      model.record_path(Path::new("/photos/look.v2.png")),
      PathBuf::from("/photos/look.v2.json")
    );
  }

  #[test]
  fn crop_metadata_is_not_a_detection_record() {
    let dir = std::env::temp_dir().join(format!("yishang-sidecar-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
      dir.join("look.json"),
      r#"{"source": "/photos/look.png", "processedAt": "2026-01-01T00:00:00Z", "crops": []}"#,
    )
    .unwrap();

    let frame = ImageFrame::new(dir.join("look.png"), image::RgbImage::new(1, 1));
    let result = SidecarModel::new(None).infer(&frame);
    assert!(matches!(result, Err(SidecarModelError::JsonError(..))));

    std::fs::remove_dir_all(&dir).unwrap();
  }

  #[test]
  fn scheme_is_checked() {
    assert!(matches!(
      SidecarModel::from_url(&Url::parse("yolo26:///model.rknn").unwrap()),
      Err(SidecarModelError::SchemeMismatch(_))
    ));
  }
}
