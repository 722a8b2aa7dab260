use locator::LocateError;
use thiserror::Error;

/// 步骤执行失败的全部情况。
///
/// 运行控制器不区分具体种类，一律视为当前步骤失败并中止剩余运行；
/// 种类信息用于日志与诊断。
#[derive(Debug, Error)]
pub enum StepError {
    /// 步骤类型未知。只可能来自外部反序列化的数据，内部构造的步骤
    /// 在编译期即是封闭枚举。
    #[error("未知步骤类型: {0}")]
    UnknownStepType(String),

    /// 缺少必填参数，或参数值非法。在产生任何副作用之前返回。
    #[error("步骤 [{step}] 参数无效: {reason}")]
    InvalidParams { step: &'static str, reason: String },

    /// 输入注入失败。
    #[error("输入注入失败: {0}")]
    InputInjection(anyhow::Error),

    /// 截屏或截图落盘失败。
    #[error("截屏失败: {0}")]
    Capture(anyhow::Error),

    /// 定位器错误：模板非法，或最后一次尝试截屏失败。
    #[error(transparent)]
    Locate(#[from] LocateError),

    /// 耗尽全部尝试后仍未在屏幕上找到模板。
    #[error("未找到模板 [{template}]（已尝试 {attempts} 次）")]
    TemplateNotFound { template: String, attempts: u32 },
}
