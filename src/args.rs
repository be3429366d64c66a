// 该文件是 Yishang （衣裳） 项目的一部分。
// src/args.rs - 项目参数配置
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

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use url::Url;

use yishang::human::{DEFAULT_HUMAN_THRESHOLD, HumanPolicy};

/// Yishang 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// 提取服装区域并裁剪保存
  Process(ProcessArgs),
  /// 纵向拼接多张图片
  Stitch(StitchArgs),
}

#[derive(clap::Args, Debug)]
pub struct ProcessArgs {
  /// 检测结果来源
  /// - sidecar:///path/to/detections : 目录中与图片同名的 JSON
  /// - sidecar:                      : 图片所在目录中的同名 JSON
  #[arg(long, value_name = "MODEL")]
  pub model: Url,

  /// 输入来源
  /// - image:///path/to/photo.jpg
  /// - folder:///path/to/photos
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,

  /// 输出目录，可附加 ?preview 与 ?full
  /// - folder:///path/to/output?preview&full
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,

  /// 标签表 JSON 文件，缺省使用内置 Fashionpedia 标签表
  #[arg(long, value_name = "FILE")]
  pub labels: Option<PathBuf>,

  /// 人体检测置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value_t = DEFAULT_HUMAN_THRESHOLD, value_name = "THRESHOLD")]
  pub human_threshold: f32,

  /// 检测到多个人体时的处理方式
  #[arg(long, value_enum, default_value_t = HumanPolicy::First)]
  pub human_policy: HumanPolicy,

  /// 最大处理图片数
  #[arg(long, value_name = "COUNT")]
  pub frame_number: Option<usize>,

  /// 只处理第一张图片，出错即退出
  #[arg(long)]
  pub oneshot: bool,
}

#[derive(clap::Args, Debug)]
pub struct StitchArgs {
  /// 输入图片，自上而下排列
  #[arg(required = true, value_name = "IMAGE")]
  pub inputs: Vec<PathBuf>,

  /// 输出图片路径
  #[arg(long, short, value_name = "OUTPUT")]
  pub output: PathBuf,

  /// 不用多数颜色填充纯黑像素
  #[arg(long)]
  pub keep_black: bool,
}
