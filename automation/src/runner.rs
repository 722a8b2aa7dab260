use std::sync::Arc;
use std::time::Duration;

use locator::CancelToken;
use tokio::time::sleep;

use crate::executor::StepExecutor;
use crate::sink::{LogLevel, LogSink};
use crate::step::{StepId, StepList};

/// 运行参数。
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// 每个步骤成功后的固定缓冲间隔，给界面留出响应时间。
    pub settle: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(100),
        }
    }
}

/// 一次运行的终态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    Aborted,
}

/// 单个步骤的执行结果。
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub index: usize,
    pub step_id: StepId,
    pub kind: String,
    /// None 表示成功。
    pub error: Option<String>,
}

/// 一次运行的完整结果，返回之后不再变化。
#[derive(Debug, Clone)]
pub struct RunResult {
    pub status: RunStatus,
    /// 首个失败步骤的下标（0 起）；被取消或全部成功时为 None。
    pub failed_step_index: Option<usize>,
    pub outcomes: Vec<StepOutcome>,
}

/// 顺序运行控制器。
///
/// 逐个执行步骤：成功则等待缓冲间隔继续，失败立即中止并记录失败下标，
/// 剩余步骤不再执行，也不回滚已发出的输入。步骤间不做重试——重试只属于
/// 定位器在单个找图步骤内部的职责。
pub struct RunController {
    options: RunOptions,
    sink: Arc<dyn LogSink>,
}

impl RunController {
    pub fn new(options: RunOptions, sink: Arc<dyn LogSink>) -> Self {
        Self { options, sink }
    }

    /// 依序执行 `steps` 的全部步骤。空列表直接视为完成。
    ///
    /// 每个步骤开始前检查取消信号；取消不记失败下标。
    pub async fn run(
        &self,
        executor: &mut StepExecutor,
        steps: &StepList,
        cancel: Option<&CancelToken>,
    ) -> RunResult {
        let mut outcomes = Vec::with_capacity(steps.len());
        self.sink
            .log(LogLevel::Info, &format!("开始运行，共 {} 个步骤", steps.len()));

        for (index, step) in steps.iter().enumerate() {
            if cancel.map(CancelToken::is_cancelled).unwrap_or(false) {
                self.sink
                    .log(LogLevel::Warning, "收到取消信号，运行中止");
                return RunResult {
                    status: RunStatus::Aborted,
                    failed_step_index: None,
                    outcomes,
                };
            }

            self.sink.log(
                LogLevel::Info,
                &format!("[step {:02}] {}", index, step.record.kind),
            );
            match executor.execute(&step.record, cancel).await {
                Ok(()) => {
                    outcomes.push(StepOutcome {
                        index,
                        step_id: step.id,
                        kind: step.record.kind.clone(),
                        error: None,
                    });
                    sleep(self.options.settle).await;
                }
                Err(err) => {
                    self.sink.log(
                        LogLevel::Error,
                        &format!(
                            "步骤 {index}（{}）失败: {err}；参数: {}",
                            step.record.kind,
                            serde_json::Value::Object(step.record.params.clone())
                        ),
                    );
                    outcomes.push(StepOutcome {
                        index,
                        step_id: step.id,
                        kind: step.record.kind.clone(),
                        error: Some(err.to_string()),
                    });
                    return RunResult {
                        status: RunStatus::Aborted,
                        failed_step_index: Some(index),
                        outcomes,
                    };
                }
            }
        }

        self.sink.log(LogLevel::Success, "全部步骤执行完成");
        RunResult {
            status: RunStatus::Completed,
            failed_step_index: None,
            outcomes,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use image::RgbaImage;
    use locator::{CancelToken, ImageLocator, ScreenCapture};
    use tempfile::TempDir;

    use super::{RunController, RunOptions, RunStatus};
    use crate::executor::StepExecutor;
    use crate::input::SimulatedInput;
    use crate::session::TemplateStore;
    use crate::sink::{LogSink, MemorySink};
    use crate::step::{StepList, StepRecord};

    struct NullCapture;

    impl ScreenCapture for NullCapture {
        fn capture_frame(&mut self) -> anyhow::Result<RgbaImage> {
            anyhow::bail!("测试中不截屏")
        }
    }

    struct Fixture {
        executor: StepExecutor,
        controller: RunController,
        sink: Arc<MemorySink>,
        #[allow(dead_code)]
        screenshot_dir: TempDir,
    }

    fn fixture() -> Fixture {
        let sink = Arc::new(MemorySink::new());
        let screenshot_dir = TempDir::new().unwrap();
        let executor = StepExecutor::new(
            Box::new(SimulatedInput::new(sink.clone() as Arc<dyn LogSink>)),
            Box::new(NullCapture),
            ImageLocator::default(),
            TemplateStore::new(),
            screenshot_dir.path(),
            sink.clone() as Arc<dyn LogSink>,
        );
        let controller = RunController::new(
            RunOptions {
                settle: Duration::ZERO,
            },
            sink.clone() as Arc<dyn LogSink>,
        );
        Fixture {
            executor,
            controller,
            sink,
            screenshot_dir,
        }
    }

    fn sim_count(sink: &MemorySink) -> usize {
        sink.entries()
            .iter()
            .filter(|(_, message)| message.starts_with("[SIM]"))
            .count()
    }

    fn click(x: i32, y: i32) -> StepRecord {
        StepRecord::new("click").with_param("x", x).with_param("y", y)
    }

    #[tokio::test]
    async fn aborts_at_first_failure_and_skips_the_rest() {
        let mut f = fixture();
        let mut steps = StepList::new();
        steps.add(click(1, 2));
        steps.add(StepRecord::new("click").with_param("x", 3)); // 缺 y
        steps.add(click(5, 6));

        let result = f.controller.run(&mut f.executor, &steps, None).await;

        assert_eq!(result.status, RunStatus::Aborted);
        assert_eq!(result.failed_step_index, Some(1));
        assert_eq!(result.outcomes.len(), 2);
        assert!(result.outcomes[0].error.is_none());
        assert!(result.outcomes[1].error.is_some());
        // 第三步从未执行：只有第一步注入了输入。
        assert_eq!(sim_count(&f.sink), 1);
    }

    #[tokio::test]
    async fn empty_list_completes_with_zero_steps() {
        let mut f = fixture();
        let steps = StepList::new();

        let result = f.controller.run(&mut f.executor, &steps, None).await;

        assert_eq!(result.status, RunStatus::Completed);
        assert_eq!(result.failed_step_index, None);
        assert!(result.outcomes.is_empty());
    }

    #[tokio::test]
    async fn completes_all_steps_in_order() {
        let mut f = fixture();
        let mut steps = StepList::new();
        steps.add(click(1, 1));
        steps.add(StepRecord::new("delay").with_param("seconds", 0.0));
        steps.add(click(2, 2));

        let result = f.controller.run(&mut f.executor, &steps, None).await;

        assert_eq!(result.status, RunStatus::Completed);
        assert_eq!(result.outcomes.len(), 3);
        assert!(result.outcomes.iter().all(|o| o.error.is_none()));
        let indexes: Vec<_> = result.outcomes.iter().map(|o| o.index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn cancellation_stops_before_the_next_step() {
        let mut f = fixture();
        let mut steps = StepList::new();
        steps.add(click(1, 1));

        let cancel = CancelToken::new();
        cancel.cancel();
        let result = f.controller.run(&mut f.executor, &steps, Some(&cancel)).await;

        assert_eq!(result.status, RunStatus::Aborted);
        assert_eq!(result.failed_step_index, None);
        assert!(result.outcomes.is_empty());
        assert_eq!(sim_count(&f.sink), 0);
    }
}
