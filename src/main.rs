// 该文件是 Yishang （衣裳） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use yishang::{
  FromUrl,
  human::HumanFilter,
  input::InputWrapper,
  model::SidecarModel,
  output::CropDirectoryOutput,
  pipeline::ClothingPipeline,
  region::LabelTable,
  stitch::stitch_files,
  task::{BatchTask, OneShotTask, Task},
};

use args::{Args, Command, ProcessArgs, StitchArgs};

fn process(args: ProcessArgs) -> Result<()> {
  info!("检测结果来源: {}", args.model);
  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);

  let table = match &args.labels {
    Some(path) => {
      info!("标签表: {}", path.display());
      LabelTable::from_path(path)?
    }
    None => LabelTable::fashionpedia(),
  };
  info!("共 {} 个服装标签", table.len());
  let humans = HumanFilter::new(args.human_threshold, args.human_policy);
  let pipeline = ClothingPipeline::new(table, humans);

  let input = InputWrapper::from_url(&args.input)?;
  let model = SidecarModel::from_url(&args.model)?;
  let output = CropDirectoryOutput::from_url(&args.output)?;

  if args.oneshot {
    let analysis = OneShotTask::new(pipeline).run_task(input.into_iter(), model, output)?;
    info!("人体参考框: {:?}", analysis.human);
    return Ok(());
  }

  let report = BatchTask::new(pipeline)
    .with_frame_number(args.frame_number)
    .with_interrupt(true)
    .run_task(input.into_iter(), model, output)?;

  for (source, reason) in &report.failed {
    warn!("失败: {} - {}", source, reason);
  }
  info!(
    "处理完成: 成功 {} 张, 失败 {} 张{}",
    report.processed,
    report.failed.len(),
    if report.interrupted { " (已中断)" } else { "" }
  );

  Ok(())
}

fn stitch(args: StitchArgs) -> Result<()> {
  info!("拼接 {} 张图片到 {}", args.inputs.len(), args.output.display());
  stitch_files(&args.inputs, &args.output, !args.keep_black)?;
  Ok(())
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  match args.command {
    Command::Process(args) => process(args),
    Command::Stitch(args) => stitch(args),
  }
}
