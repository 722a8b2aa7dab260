//! Screen template location for the automation workspace.
//!
//! A locate call captures one full-screen frame through the [`ScreenCapture`]
//! seam, scores every configured [`MatchMethod`] against a template image,
//! keeps the single best normalized score, and applies a confidence
//! threshold with a fixed-interval [`RetryPolicy`]. Hits carry the matched
//! bounding box together with its nine named [`Anchor`] points.
//!
//! Exhausting all attempts is not an error: it is reported as
//! [`MatchOutcome::NotFound`], and the caller decides what that means.

mod cancel;
mod capture;
mod config;
mod engine;
mod error;
mod geometry;
mod matcher;
mod result;

pub use cancel::CancelToken;
pub use capture::ScreenCapture;
pub use config::{LocateOptions, RetryPolicy};
pub use engine::ImageLocator;
pub use error::LocateError;
pub use geometry::{Anchor, AnchorSet, BoundingBox, Point};
pub use matcher::MatchMethod;
pub use result::{MatchHit, MatchOutcome};

/// Crate-wide result type.
pub type LocateResult<T> = Result<T, LocateError>;
