// 该文件是 Yishang （衣裳） 项目的一部分。
// src/task.rs - 任务执行
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

use std::sync::mpsc::{Receiver, channel};
use std::time::Instant;

use tracing::{error, info, warn};

use crate::{
  frame::ImageFrame,
  model::{DetectResult, Model},
  output::Render,
  pipeline::{Analysis, ClothingPipeline},
};

pub trait Task<I, M, O>: Sized {
  type Output;
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<Self::Output, Self::Error>;
}

fn process_frame<M, O>(
  pipeline: &ClothingPipeline,
  model: &M,
  output: &O,
  frame: &ImageFrame,
) -> anyhow::Result<Analysis>
where
  M: Model<Input = ImageFrame, Output = DetectResult>,
  M::Error: std::error::Error + Sync + Send + 'static,
  O: Render<ImageFrame, Analysis>,
  O::Error: std::error::Error + Sync + Send + 'static,
{
  let now = Instant::now();
  let detections = model.infer(frame)?;
  let analysis = pipeline.analyse(&detections)?;
  output.render_result(frame, &analysis)?;
  info!("{} 处理完成，耗时: {:.2?}", frame.path().display(), now.elapsed());
  Ok(analysis)
}

/// 只处理第一张图片，任何错误都直接返回
pub struct OneShotTask {
  pipeline: ClothingPipeline,
}

impl OneShotTask {
  pub fn new(pipeline: ClothingPipeline) -> Self {
    Self { pipeline }
  }
}

impl<I, IE, M, ME, O, RE> Task<I, M, O> for OneShotTask
where
  IE: std::error::Error + Sync + Send + 'static,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = Result<ImageFrame, IE>>,
  M: Model<Input = ImageFrame, Output = DetectResult, Error = ME>,
  O: Render<ImageFrame, Analysis, Error = RE>,
{
  type Output = Analysis;
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, model: M, output: O) -> Result<Self::Output, Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入图片"))??;
    process_frame(&self.pipeline, &model, &output, &frame)
  }
}

/// 批处理结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
  pub processed: usize,
  /// (图片, 错误信息)
  pub failed: Vec<(String, String)>,
  pub interrupted: bool,
}

/// 处理全部图片，单张失败只记录并继续
#[derive(Debug, Default)]
pub struct BatchTask {
  pipeline: ClothingPipeline,
  frame_number: Option<usize>,
  interruptible: bool,
}

impl BatchTask {
  pub fn new(pipeline: ClothingPipeline) -> Self {
    Self {
      pipeline,
      frame_number: None,
      interruptible: false,
    }
  }

  pub fn with_frame_number(mut self, frame_number: Option<usize>) -> Self {
    self.frame_number = frame_number;
    self
  }

  /// 安装 Ctrl-C 处理，收到信号后处理完当前图片即退出
  pub fn with_interrupt(mut self, interruptible: bool) -> Self {
    self.interruptible = interruptible;
    self
  }

  fn interrupt_receiver(&self) -> Option<Receiver<()>> {
    if !self.interruptible {
      return None;
    }
    let (tx, rx) = channel();
    match ctrlc::set_handler(move || {
      info!("收到中断信号，准备退出...");
      let _ = tx.send(());
    }) {
      Ok(()) => Some(rx),
      Err(e) => {
        warn!("无法设置 Ctrl-C 处理: {}", e);
        None
      }
    }
  }
}

impl<I, IE, M, ME, O, RE> Task<I, M, O> for BatchTask
where
  IE: std::error::Error + Sync + Send + 'static,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = Result<ImageFrame, IE>>,
  M: Model<Input = ImageFrame, Output = DetectResult, Error = ME>,
  O: Render<ImageFrame, Analysis, Error = RE>,
{
  type Output = BatchReport;
  type Error = anyhow::Error;

  fn run_task(self, input: I, model: M, output: O) -> Result<Self::Output, Self::Error> {
    info!("开始批处理任务...");
    let rx = self.interrupt_receiver();
    let mut report = BatchReport::default();

    for (index, item) in input.enumerate() {
      if self.frame_number.map(|n| index >= n).unwrap_or(false) {
        info!("达到指定图片数 {}, 退出任务循环", index);
        break;
      }

      info!("处理第 {} 张图片", index + 1);
      match item {
        Ok(frame) => match process_frame(&self.pipeline, &model, &output, &frame) {
          Ok(_) => report.processed += 1,
          Err(e) => {
            error!("{} 处理失败: {:#}", frame.path().display(), e);
            report
              .failed
              .push((frame.path().display().to_string(), format!("{:#}", e)));
          }
        },
        Err(e) => {
          error!("图片加载失败: {}", e);
          report.failed.push((format!("#{}", index + 1), e.to_string()));
        }
      }

      if rx.as_ref().map(|rx| rx.try_recv().is_ok()).unwrap_or(false) {
        warn!("中断信号接收，退出任务循环");
        report.interrupted = true;
        break;
      }
    }

    info!(
      "任务完成: 成功 {} 张, 失败 {} 张",
      report.processed,
      report.failed.len()
    );
    Ok(report)
  }
}
