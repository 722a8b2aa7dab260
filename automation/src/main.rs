mod action;
mod error;
mod executor;
mod input;
mod runner;
mod screen;
mod session;
mod sink;
mod step;

use std::env;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use locator::{CancelToken, ImageLocator};

use crate::executor::StepExecutor;
use crate::input::{EnigoDriver, InputDriver, SimulatedInput};
use crate::runner::{RunController, RunOptions, RunStatus};
use crate::screen::PrimaryScreen;
use crate::session::Session;
use crate::sink::{ConsoleSink, LogSink};
use crate::step::StepRecord;

/// CLI 入口：读取步骤文件并依序执行。
///
/// 用法：automation [--simulate] <步骤文件.json> [截图目录]
#[tokio::main]
async fn main() -> Result<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();
    let simulate = args.first().map(String::as_str) == Some("--simulate");
    if simulate {
        args.remove(0);
    }

    let (steps_path, screenshot_dir) = match args.len() {
        1 => (args[0].clone(), "screenshots".to_string()),
        2 => (args[0].clone(), args[1].clone()),
        _ => {
            anyhow::bail!("参数数量不正确。用法：[--simulate] <步骤文件.json> [截图目录]")
        }
    };

    let raw = std::fs::read_to_string(&steps_path)
        .with_context(|| format!("读取步骤文件 {steps_path} 失败"))?;
    let records: Vec<StepRecord> =
        serde_json::from_str(&raw).with_context(|| format!("解析步骤文件 {steps_path} 失败"))?;

    let mut session = Session::new()?;
    for record in records {
        session.steps.add(record);
    }
    println!(
        "已载入 {} 个步骤，截图目录 [{}]",
        session.steps.len(),
        screenshot_dir
    );

    let sink: Arc<dyn LogSink> = Arc::new(ConsoleSink);
    let driver: Box<dyn InputDriver> = if simulate {
        println!("模拟模式：不注入真实输入");
        Box::new(SimulatedInput::new(Arc::clone(&sink)))
    } else {
        Box::new(EnigoDriver::new())
    };

    let mut executor = StepExecutor::new(
        driver,
        Box::new(PrimaryScreen::new()),
        ImageLocator::default(),
        std::mem::take(&mut session.templates),
        screenshot_dir.as_str(),
        Arc::clone(&sink),
    );

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                println!("收到 Ctrl-C，运行将在当前步骤结束后停止");
                cancel.cancel();
            }
        });
    }

    let controller = RunController::new(RunOptions::default(), Arc::clone(&sink));
    let start = Instant::now();
    let result = controller
        .run(&mut executor, &session.steps, Some(&cancel))
        .await;

    println!("总耗时: {:?}", start.elapsed());
    for outcome in &result.outcomes {
        match &outcome.error {
            None => println!(
                "  [{:02}] {}（{}）— 成功",
                outcome.index, outcome.kind, outcome.step_id
            ),
            Some(err) => println!(
                "  [{:02}] {}（{}）— 失败: {err}",
                outcome.index, outcome.kind, outcome.step_id
            ),
        }
    }

    match result.status {
        RunStatus::Completed => {
            println!("运行完成");
            Ok(())
        }
        RunStatus::Aborted => match result.failed_step_index {
            Some(index) => anyhow::bail!("运行在步骤 {index} 处中止"),
            None => anyhow::bail!("运行被取消"),
        },
    }
}
