// 该文件是 Yishang （衣裳） 项目的一部分。
// src/output/crop_directory.rs - 按区域保存裁剪结果
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

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::ImageFrame,
  output::{
    Render,
    crop::{PixelRect, crop},
  },
  pipeline::Analysis,
  region::Region,
};

pub const FULL_FOLDER: &str = "FULL";
pub const PREVIEW_FOLDER: &str = "PREVIEW";
pub const META_FOLDER: &str = "META";

#[derive(Error, Debug)]
pub enum CropOutputError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("元数据序列化错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

/// 单个区域裁剪结果的元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRecord {
  pub is_liked: bool,
  pub region: Region,
  pub clothing_type: String,
  pub label: Option<String>,
  pub length: u32,
  pub width: u32,
  pub file_name: String,
  pub folder: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRegion {
  pub region: Region,
  pub reason: String,
}

/// 单张图片的全部输出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
  pub source: String,
  pub processed_at: String,
  pub full_image: Option<String>,
  pub crops: Vec<CropRecord>,
  pub skipped: Vec<SkippedRegion>,
}

/// `folder:///out?preview&full`
///
/// 裁剪结果写入 `out/<REGION>/<stem>_<i>.jpg`，元数据写入 `out/META/<stem>.json`，
/// 不会覆盖同目录下的检测记录。
pub struct CropDirectoryOutput {
  directory: PathBuf,
  preview: bool,
  full: bool,
}

impl FromUrlWithScheme for CropDirectoryOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for CropDirectoryOutput {
  type Error = CropOutputError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(CropOutputError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    let preview = uri.query_pairs().any(|(k, _)| k == "preview");
    let full = uri.query_pairs().any(|(k, _)| k == "full");

    Ok(CropDirectoryOutput {
      directory: PathBuf::from(uri.path()),
      preview,
      full,
    })
  }
}

impl CropDirectoryOutput {
  pub fn new(directory: impl Into<PathBuf>) -> Self {
    Self {
      directory: directory.into(),
      preview: false,
      full: false,
    }
  }

  pub fn with_preview(mut self, preview: bool) -> Self {
    self.preview = preview;
    self
  }

  pub fn with_full(mut self, full: bool) -> Self {
    self.full = full;
    self
  }

  pub fn directory(&self) -> &Path {
    &self.directory
  }

  pub fn record_path(&self, stem: &str) -> PathBuf {
    self.directory.join(META_FOLDER).join(format!("{}.json", stem))
  }

  fn folder(&self, name: &str) -> Result<PathBuf, CropOutputError> {
    let folder = self.directory.join(name);
    std::fs::create_dir_all(&folder)?;
    Ok(folder)
  }

  fn save_full(&self, frame: &ImageFrame) -> Result<String, CropOutputError> {
    let file_name = frame
      .path()
      .file_name()
      .map(|s| s.to_string_lossy().into_owned())
      .unwrap_or_else(|| format!("{}.png", frame.stem()));
    let path = self.folder(FULL_FOLDER)?.join(&file_name);
    std::fs::copy(frame.path(), &path)?;
    Ok(file_name)
  }

  #[cfg(feature = "preview")]
  fn save_preview(&self, frame: &ImageFrame, analysis: &Analysis) -> Result<(), CropOutputError> {
    let canvas = super::draw::Draw::default().draw_analysis(frame.image(), analysis);
    let path = self
      .folder(PREVIEW_FOLDER)?
      .join(format!("{}.png", frame.stem()));
    canvas.save(&path)?;
    Ok(())
  }

  #[cfg(not(feature = "preview"))]
  fn save_preview(&self, _frame: &ImageFrame, _analysis: &Analysis) -> Result<(), CropOutputError> {
    warn!("未启用 preview 特性, 跳过预览图");
    Ok(())
  }

  fn crop_regions(
    &self,
    frame: &ImageFrame,
    analysis: &Analysis,
  ) -> Result<(Vec<CropRecord>, Vec<SkippedRegion>), CropOutputError> {
    let stem = frame.stem();
    let mut crops = Vec::new();
    let mut skipped = Vec::new();

    for region in Region::ALL {
      let bbox = match analysis.boxes.checked(region) {
        Ok(Some(bbox)) => bbox,
        Ok(None) => continue,
        Err(e) => {
          warn!("{}: {}, 跳过裁剪", stem, e);
          skipped.push(SkippedRegion {
            region,
            reason: e.to_string(),
          });
          continue;
        }
      };

      let Some(rect) = PixelRect::from_bbox(&bbox, frame.width(), frame.height()) else {
        warn!("{}: 区域 {} 在图像范围之外, 跳过裁剪", stem, region);
        skipped.push(SkippedRegion {
          region,
          reason: format!("区域 {} 在图像范围之外: {:?}", region, bbox),
        });
        continue;
      };

      let file_name = format!("{}_{}.jpg", stem, region.index());
      let folder = region.folder_name();
      crop(frame.image(), &rect).save(self.folder(folder)?.join(&file_name))?;

      crops.push(CropRecord {
        is_liked: false,
        region,
        clothing_type: folder.to_string(),
        label: analysis.boxes.label(region).map(str::to_string),
        length: rect.height,
        width: rect.width,
        file_name,
        folder: folder.to_string(),
      });
    }

    Ok((crops, skipped))
  }
}

impl Render<ImageFrame, Analysis> for CropDirectoryOutput {
  type Error = CropOutputError;

  fn render_result(&self, frame: &ImageFrame, analysis: &Analysis) -> Result<(), Self::Error> {
    std::fs::create_dir_all(&self.directory)?;

    let full_image = if self.full {
      Some(self.save_full(frame)?)
    } else {
      None
    };

    let (crops, skipped) = self.crop_regions(frame, analysis)?;

    if self.preview {
      self.save_preview(frame, analysis)?;
    }

    let record = ImageRecord {
      source: frame.path().display().to_string(),
      processed_at: Utc::now().to_rfc3339(),
      full_image,
      crops,
      skipped,
    };
    self.folder(META_FOLDER)?;
    let path = self.record_path(&frame.stem());
    std::fs::write(&path, serde_json::to_string_pretty(&record)?)?;

    info!(
      "保存 {} 个区域到 {} (跳过 {})",
      record.crops.len(),
      self.directory.display(),
      record.skipped.len()
    );

    Ok(())
  }
}
