use anyhow::{anyhow, Context, Result};
use locator::ScreenCapture;
use xcap::image::RgbaImage;
use xcap::Monitor;

/// 主显示器整屏截图，作为真实的 [`ScreenCapture`] 能力。
///
/// 每次调用都重新枚举显示器，优先取主屏，找不到主屏时退回第一块。
pub struct PrimaryScreen;

impl PrimaryScreen {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PrimaryScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenCapture for PrimaryScreen {
    fn capture_frame(&mut self) -> Result<RgbaImage> {
        let monitors = Monitor::all().context("枚举显示器失败")?;
        let monitor = monitors
            .iter()
            .find(|m| m.is_primary().unwrap_or(false))
            .or_else(|| monitors.first())
            .ok_or_else(|| anyhow!("未找到任何显示器"))?;
        let image = monitor.capture_image().context("截取屏幕失败")?;
        Ok(image)
    }
}
