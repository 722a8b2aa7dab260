use thiserror::Error;

/// Failures surfaced by [`crate::ImageLocator::locate`].
///
/// A template that is simply absent from the screen is not an error; that
/// case is reported as [`crate::MatchOutcome::NotFound`].
#[derive(Debug, Error)]
pub enum LocateError {
    /// The template could not be decoded, or does not fit inside a captured
    /// frame.
    #[error("invalid template {path}: {reason}")]
    InvalidTemplate { path: String, reason: String },

    /// Screen capture failed on the final attempt. Earlier capture failures
    /// are retried and never surface here.
    #[error("screen capture failed: {0}")]
    Capture(anyhow::Error),
}
