use std::time::Duration;

use locator::{Anchor, LocateOptions, RetryPolicy};
use serde_json::{Map, Value};

use crate::error::StepError;
use crate::input::{self, MouseButton};
use crate::step::StepRecord;

/// 解析并校验后的步骤动作。
///
/// 封闭枚举，执行阶段穷尽分发；`UnknownStepType` 只会出现在外部数据上。
/// 所有参数问题都在 [`StepAction::parse`] 阶段报出，之后的执行不再缺参。
#[derive(Debug, Clone, PartialEq)]
pub enum StepAction {
    MoveMouse {
        x: i32,
        y: i32,
    },
    Click {
        x: i32,
        y: i32,
        button: MouseButton,
    },
    TypeText {
        text: String,
    },
    Delay {
        seconds: f64,
    },
    Screenshot {
        name: Option<String>,
    },
    PressHotkey {
        modifiers: Vec<String>,
        keys: Vec<String>,
    },
    FindAndClickImage {
        template: String,
        position: Anchor,
        button: MouseButton,
        options: LocateOptions,
    },
}

impl StepAction {
    /// 把外部步骤记录解析为动作。
    ///
    /// 类型名大小写不敏感，下划线视同空格（`Move Mouse` / `move_mouse`）。
    /// 缺少必填参数或取值非法在这里失败，保证执行前零副作用。
    pub fn parse(record: &StepRecord) -> Result<StepAction, StepError> {
        let kind = normalize_kind(&record.kind);
        let p = &record.params;
        match kind.as_str() {
            "move mouse" => Ok(StepAction::MoveMouse {
                x: require_int(p, "move mouse", "x")?,
                y: require_int(p, "move mouse", "y")?,
            }),
            "click" => Ok(StepAction::Click {
                x: require_int(p, "click", "x")?,
                y: require_int(p, "click", "y")?,
                button: optional_button(p, "click")?,
            }),
            "type text" => Ok(StepAction::TypeText {
                text: require_string(p, "type text", "text")?,
            }),
            "delay" => {
                let seconds = require_number(p, "delay", "seconds")?;
                if seconds < 0.0 || !seconds.is_finite() {
                    return Err(invalid("delay", format!("seconds 不能为负: {seconds}")));
                }
                Ok(StepAction::Delay { seconds })
            }
            "screenshot" => Ok(StepAction::Screenshot {
                name: optional_string(p, "screenshot", "name")?,
            }),
            "press hotkey" => {
                let modifiers = optional_string_list(p, "press hotkey", "modifiers")?;
                let keys = optional_string_list(p, "press hotkey", "keys")?;
                if modifiers.is_empty() && keys.is_empty() {
                    return Err(invalid(
                        "press hotkey",
                        "modifiers 与 keys 不能同时为空".to_string(),
                    ));
                }
                for name in modifiers.iter().chain(keys.iter()) {
                    if input::parse_key(name).is_none() {
                        return Err(invalid("press hotkey", format!("未知按键: {name}")));
                    }
                }
                Ok(StepAction::PressHotkey { modifiers, keys })
            }
            "find and click image" => parse_find_and_click(p),
            _ => Err(StepError::UnknownStepType(record.kind.clone())),
        }
    }

    /// 动作的规范名称，用于日志。
    #[allow(dead_code)]
    pub fn kind_name(&self) -> &'static str {
        match self {
            StepAction::MoveMouse { .. } => "Move Mouse",
            StepAction::Click { .. } => "Click",
            StepAction::TypeText { .. } => "Type Text",
            StepAction::Delay { .. } => "Delay",
            StepAction::Screenshot { .. } => "Screenshot",
            StepAction::PressHotkey { .. } => "Press Hotkey",
            StepAction::FindAndClickImage { .. } => "Find and Click Image",
        }
    }
}

fn parse_find_and_click(p: &Map<String, Value>) -> Result<StepAction, StepError> {
    const KIND: &str = "find and click image";

    let template = require_string(p, KIND, "template")?;
    let position = match p.get("position") {
        None | Some(Value::Null) => Anchor::Center,
        Some(value) => value
            .as_str()
            .and_then(Anchor::from_name)
            .ok_or_else(|| invalid(KIND, format!("position 不是合法锚点: {value}")))?,
    };
    let button = optional_button(p, KIND)?;

    // 旧数据里该参数名为 confidence_threshold，两种写法都接受。
    let confidence = match p.get("confidence").or_else(|| p.get("confidence_threshold")) {
        None | Some(Value::Null) => 0.72,
        Some(value) => {
            let value = value
                .as_f64()
                .ok_or_else(|| invalid(KIND, format!("confidence 不是数字: {value}")))?;
            if value <= 0.0 || value > 1.0 {
                return Err(invalid(KIND, format!("confidence 需在 (0, 1] 内: {value}")));
            }
            value
        }
    };

    let max_attempts = match p.get("max_attempts") {
        None | Some(Value::Null) => 10,
        Some(value) => as_int(value)
            .and_then(|v| u32::try_from(v).ok())
            .filter(|v| *v >= 1)
            .ok_or_else(|| invalid(KIND, format!("max_attempts 需为 >=1 的整数: {value}")))?,
    };

    let retry_interval = match p.get("retry_interval") {
        None | Some(Value::Null) => Duration::from_millis(500),
        Some(value) => {
            let seconds = value
                .as_f64()
                .filter(|v| *v >= 0.0 && v.is_finite())
                .ok_or_else(|| {
                    invalid(KIND, format!("retry_interval 需为非负秒数: {value}"))
                })?;
            Duration::from_secs_f64(seconds)
        }
    };

    Ok(StepAction::FindAndClickImage {
        template,
        position,
        button,
        options: LocateOptions {
            confidence,
            retry: RetryPolicy::new(max_attempts, retry_interval),
        },
    })
}

fn normalize_kind(kind: &str) -> String {
    kind.trim().to_ascii_lowercase().replace('_', " ")
}

fn invalid(step: &'static str, reason: String) -> StepError {
    StepError::InvalidParams { step, reason }
}

fn missing(step: &'static str, key: &str) -> StepError {
    invalid(step, format!("缺少必填参数 {key}"))
}

fn require_int(p: &Map<String, Value>, step: &'static str, key: &str) -> Result<i32, StepError> {
    let value = p.get(key).ok_or_else(|| missing(step, key))?;
    as_int(value).ok_or_else(|| invalid(step, format!("{key} 不是整数: {value}")))
}

/// 接受整数与小数部分为零的浮点数（前端数字框会产生 `12.0`）。
fn as_int(value: &Value) -> Option<i32> {
    if let Some(int) = value.as_i64() {
        return i32::try_from(int).ok();
    }
    let float = value.as_f64()?;
    if float.fract() == 0.0 && float >= i32::MIN as f64 && float <= i32::MAX as f64 {
        Some(float as i32)
    } else {
        None
    }
}

fn require_number(p: &Map<String, Value>, step: &'static str, key: &str) -> Result<f64, StepError> {
    let value = p.get(key).ok_or_else(|| missing(step, key))?;
    value
        .as_f64()
        .ok_or_else(|| invalid(step, format!("{key} 不是数字: {value}")))
}

fn require_string(
    p: &Map<String, Value>,
    step: &'static str,
    key: &str,
) -> Result<String, StepError> {
    let value = p.get(key).ok_or_else(|| missing(step, key))?;
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(step, format!("{key} 不是字符串: {value}")))
}

fn optional_string(
    p: &Map<String, Value>,
    step: &'static str,
    key: &str,
) -> Result<Option<String>, StepError> {
    match p.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| invalid(step, format!("{key} 不是字符串: {value}"))),
    }
}

fn optional_string_list(
    p: &Map<String, Value>,
    step: &'static str,
    key: &str,
) -> Result<Vec<String>, StepError> {
    match p.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid(step, format!("{key} 中存在非字符串项: {item}")))
            })
            .collect(),
        Some(other) => Err(invalid(step, format!("{key} 不是字符串数组: {other}"))),
    }
}

fn optional_button(p: &Map<String, Value>, step: &'static str) -> Result<MouseButton, StepError> {
    match p.get("button") {
        None | Some(Value::Null) => Ok(MouseButton::Left),
        Some(value) => value
            .as_str()
            .and_then(MouseButton::from_name)
            .ok_or_else(|| invalid(step, format!("button 需为 left/middle/right: {value}"))),
    }
}
