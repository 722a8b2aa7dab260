use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use locator::{Anchor, CancelToken, ImageLocator, LocateOptions, MatchOutcome, ScreenCapture};

use crate::action::StepAction;
use crate::error::StepError;
use crate::input::{InputDriver, MouseButton};
use crate::session::TemplateStore;
use crate::sink::{LogLevel, LogSink};
use crate::step::StepRecord;

/// 步骤执行器：把一条步骤记录变成具体的输入注入/截屏调用。
///
/// 外部能力（输入、截屏、日志、模板解析）全部以接口形式注入；
/// 执行器自身除配置外不保存跨调用状态。
pub struct StepExecutor {
    input: Box<dyn InputDriver>,
    capture: Box<dyn ScreenCapture>,
    locator: ImageLocator,
    templates: TemplateStore,
    screenshot_dir: PathBuf,
    sink: Arc<dyn LogSink>,
}

impl StepExecutor {
    pub fn new(
        input: Box<dyn InputDriver>,
        capture: Box<dyn ScreenCapture>,
        locator: ImageLocator,
        templates: TemplateStore,
        screenshot_dir: impl Into<PathBuf>,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            input,
            capture,
            locator,
            templates,
            screenshot_dir: screenshot_dir.into(),
            sink,
        }
    }

    /// 执行单条步骤：先解析校验，后产生副作用。
    ///
    /// 所有失败都以 [`StepError`] 返回；运行控制器据此统一中止，
    /// 不在这里做任何跨步骤重试。
    pub async fn execute(
        &mut self,
        record: &StepRecord,
        cancel: Option<&CancelToken>,
    ) -> Result<(), StepError> {
        match StepAction::parse(record)? {
            StepAction::MoveMouse { x, y } => {
                self.sink
                    .log(LogLevel::Info, &format!("移动鼠标到 ({x}, {y})"));
                self.input
                    .move_cursor(x, y)
                    .map_err(StepError::InputInjection)
            }
            StepAction::Click { x, y, button } => {
                self.sink.log(
                    LogLevel::Info,
                    &format!("在 ({x}, {y}) 按下 {} 键", button.name()),
                );
                self.input
                    .click(x, y, button)
                    .map_err(StepError::InputInjection)
            }
            StepAction::TypeText { text } => {
                let preview: String = text.chars().take(20).collect();
                let ellipsis = if text.chars().count() > 20 { "…" } else { "" };
                self.sink
                    .log(LogLevel::Info, &format!("输入文本: {preview}{ellipsis}"));
                self.input
                    .type_text(&text)
                    .map_err(StepError::InputInjection)
            }
            StepAction::Delay { seconds } => {
                self.sink.log(LogLevel::Info, &format!("等待 {seconds} 秒"));
                tokio::time::sleep(Duration::from_secs_f64(seconds)).await;
                Ok(())
            }
            StepAction::Screenshot { name } => self.take_screenshot(name.as_deref()),
            StepAction::PressHotkey { modifiers, keys } => {
                let chord: Vec<&str> =
                    modifiers.iter().chain(&keys).map(String::as_str).collect();
                self.sink
                    .log(LogLevel::Info, &format!("按下组合键: {}", chord.join(" + ")));
                self.input
                    .press_keys(&modifiers, &keys)
                    .map_err(StepError::InputInjection)
            }
            StepAction::FindAndClickImage {
                template,
                position,
                button,
                options,
            } => {
                self.find_and_click(&template, position, button, &options, cancel)
                    .await
            }
        }
    }

    fn take_screenshot(&mut self, name: Option<&str>) -> Result<(), StepError> {
        let frame = self.capture.capture_frame().map_err(StepError::Capture)?;
        std::fs::create_dir_all(&self.screenshot_dir)
            .map_err(|err| StepError::Capture(err.into()))?;

        let stem = name.unwrap_or("screenshot");
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = self.screenshot_dir.join(format!("{stem}_{stamp}.png"));
        frame
            .save(&path)
            .map_err(|err| StepError::Capture(err.into()))?;

        self.sink.log(
            LogLevel::Success,
            &format!("截图已保存到 {}", path.display()),
        );
        Ok(())
    }

    async fn find_and_click(
        &mut self,
        template: &str,
        position: Anchor,
        button: MouseButton,
        options: &LocateOptions,
        cancel: Option<&CancelToken>,
    ) -> Result<(), StepError> {
        let path = self.templates.resolve(template);
        self.sink
            .log(LogLevel::Info, &format!("查找模板: {}", path.display()));

        let outcome = self
            .locator
            .locate(self.capture.as_mut(), &path, options, cancel)
            .await?;
        match outcome {
            MatchOutcome::Found(hit) => {
                let point = hit.anchors.point(position);
                self.sink.log(
                    LogLevel::Info,
                    &format!(
                        "命中模板（置信度 {:.3}），在 {} 点 ({}, {}) 按下 {} 键",
                        hit.confidence,
                        position.name(),
                        point.x,
                        point.y,
                        button.name()
                    ),
                );
                self.input
                    .click(point.x, point.y, button)
                    .map_err(StepError::InputInjection)
            }
            MatchOutcome::NotFound { attempts } => {
                self.sink.log(
                    LogLevel::Warning,
                    &format!("模板未出现在屏幕上（已尝试 {attempts} 次）"),
                );
                Err(StepError::TemplateNotFound {
                    template: template.to_string(),
                    attempts,
                })
            }
        }
    }
}
