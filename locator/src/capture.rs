use image::RgbaImage;

/// Capability that produces one full-screen frame per call.
///
/// Implementations are synchronous, blocking calls into the OS; the locator
/// never has two captures in flight at once.
pub trait ScreenCapture {
    /// Capture the full virtual screen as an RGBA buffer.
    fn capture_frame(&mut self) -> anyhow::Result<RgbaImage>;
}
