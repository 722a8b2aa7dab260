use std::sync::Arc;
use std::{thread, time::Duration};

use anyhow::{anyhow, Result};
use enigo::{Enigo, Key, KeyboardControllable, MouseControllable};

use crate::sink::{LogLevel, LogSink};

/// 鼠标按键。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "left" => Some(MouseButton::Left),
            "middle" => Some(MouseButton::Middle),
            "right" => Some(MouseButton::Right),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Middle => "middle",
            MouseButton::Right => "right",
        }
    }

    fn to_enigo(self) -> enigo::MouseButton {
        match self {
            MouseButton::Left => enigo::MouseButton::Left,
            MouseButton::Middle => enigo::MouseButton::Middle,
            MouseButton::Right => enigo::MouseButton::Right,
        }
    }
}

/// 输入注入能力：光标移动、点击、文本输入与组合键。
///
/// 注入是“发射后不管”的：调用返回只代表事件已交给操作系统，
/// 是否到达目标应用由系统决定。
pub trait InputDriver {
    fn move_cursor(&mut self, x: i32, y: i32) -> Result<()>;

    /// 先移动到 (x, y)，再按下指定按键。
    fn click(&mut self, x: i32, y: i32, button: MouseButton) -> Result<()>;

    fn type_text(&mut self, text: &str) -> Result<()>;

    /// 依声明顺序按住修饰键，逐个敲击普通键，最后逆序松开修饰键。
    fn press_keys(&mut self, modifiers: &[String], keys: &[String]) -> Result<()>;
}

/// 将按键名称解析为 enigo 按键。
///
/// 支持常用修饰键、编辑/导航键、F1–F12 与任意单字符；
/// 未识别的名称返回 None，由参数校验阶段拒绝。
pub fn parse_key(name: &str) -> Option<Key> {
    let lower = name.trim().to_ascii_lowercase();
    let key = match lower.as_str() {
        "ctrl" | "control" => Key::Control,
        "alt" | "option" => Key::Alt,
        "shift" => Key::Shift,
        "win" | "cmd" | "meta" | "super" => Key::Meta,
        "enter" | "return" => Key::Return,
        "tab" => Key::Tab,
        "esc" | "escape" => Key::Escape,
        "space" => Key::Space,
        "backspace" => Key::Backspace,
        "delete" | "del" => Key::Delete,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,
        "up" => Key::UpArrow,
        "down" => Key::DownArrow,
        "left" => Key::LeftArrow,
        "right" => Key::RightArrow,
        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Layout(c),
                _ => return None,
            }
        }
    };
    Some(key)
}

fn parse_chord(names: &[String]) -> Result<Vec<Key>> {
    names
        .iter()
        .map(|name| parse_key(name).ok_or_else(|| anyhow!("未知按键: {name}")))
        .collect()
}

/// 基于 `enigo` 的真实输入注入。
pub struct EnigoDriver {
    enigo: Enigo,
}

impl EnigoDriver {
    pub fn new() -> Self {
        Self {
            enigo: Enigo::new(),
        }
    }
}

impl Default for EnigoDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl InputDriver for EnigoDriver {
    fn move_cursor(&mut self, x: i32, y: i32) -> Result<()> {
        self.enigo.mouse_move_to(x, y);
        Ok(())
    }

    fn click(&mut self, x: i32, y: i32, button: MouseButton) -> Result<()> {
        self.enigo.mouse_move_to(x, y);
        // 移动后短暂停顿，降低误触概率。
        thread::sleep(Duration::from_millis(60));
        self.enigo.mouse_click(button.to_enigo());
        Ok(())
    }

    fn type_text(&mut self, text: &str) -> Result<()> {
        self.enigo.key_sequence(text);
        Ok(())
    }

    fn press_keys(&mut self, modifiers: &[String], keys: &[String]) -> Result<()> {
        let held = parse_chord(modifiers)?;
        let tapped = parse_chord(keys)?;
        for key in &held {
            self.enigo.key_down(*key);
        }
        for key in &tapped {
            self.enigo.key_click(*key);
        }
        for key in held.iter().rev() {
            self.enigo.key_up(*key);
        }
        Ok(())
    }
}

/// 模拟模式：不注入任何真实输入，仅把动作写入日志。
pub struct SimulatedInput {
    sink: Arc<dyn LogSink>,
}

impl SimulatedInput {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }
}

impl InputDriver for SimulatedInput {
    fn move_cursor(&mut self, x: i32, y: i32) -> Result<()> {
        self.sink
            .log(LogLevel::Info, &format!("[SIM] 移动鼠标到 ({x}, {y})"));
        Ok(())
    }

    fn click(&mut self, x: i32, y: i32, button: MouseButton) -> Result<()> {
        self.sink.log(
            LogLevel::Info,
            &format!("[SIM] 在 ({x}, {y}) 按下 {} 键", button.name()),
        );
        Ok(())
    }

    fn type_text(&mut self, text: &str) -> Result<()> {
        self.sink
            .log(LogLevel::Info, &format!("[SIM] 输入: {text}"));
        Ok(())
    }

    fn press_keys(&mut self, modifiers: &[String], keys: &[String]) -> Result<()> {
        // 与真实驱动一致地校验按键名称，保证两种模式行为等价。
        parse_chord(modifiers)?;
        parse_chord(keys)?;
        let chord: Vec<&str> = modifiers.iter().chain(keys).map(String::as_str).collect();
        self.sink.log(
            LogLevel::Info,
            &format!("[SIM] 组合键: {}", chord.join(" + ")),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_key, MouseButton};
    use enigo::Key;

    #[test]
    fn parses_known_key_names() {
        assert_eq!(parse_key("ctrl"), Some(Key::Control));
        assert_eq!(parse_key("Shift"), Some(Key::Shift));
        assert_eq!(parse_key("cmd"), Some(Key::Meta));
        assert_eq!(parse_key("enter"), Some(Key::Return));
        assert_eq!(parse_key("f5"), Some(Key::F5));
        assert_eq!(parse_key("a"), Some(Key::Layout('a')));
    }

    #[test]
    fn rejects_unknown_key_names() {
        assert_eq!(parse_key("insert"), None);
        assert_eq!(parse_key("hyper"), None);
        assert_eq!(parse_key(""), None);
    }

    #[test]
    fn mouse_button_names_round_trip() {
        for button in [MouseButton::Left, MouseButton::Middle, MouseButton::Right] {
            assert_eq!(MouseButton::from_name(button.name()), Some(button));
        }
        assert_eq!(MouseButton::from_name("back"), None);
    }
}
