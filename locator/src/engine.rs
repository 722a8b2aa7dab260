use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::{imageops, GrayImage, RgbaImage};

use crate::cancel::CancelToken;
use crate::capture::ScreenCapture;
use crate::config::LocateOptions;
use crate::error::LocateError;
use crate::geometry::BoundingBox;
use crate::matcher::{self, MatchMethod};
use crate::result::{MatchHit, MatchOutcome};
use crate::LocateResult;

/// Finds a template image on the live screen.
///
/// Every attempt captures one frame through the [`ScreenCapture`] capability,
/// scores every configured [`MatchMethod`] in order, and keeps the single
/// best normalized score. The locator holds no per-call state; one instance
/// serves any number of locate calls.
pub struct ImageLocator {
    methods: Vec<MatchMethod>,
    debug_dir: Option<PathBuf>,
}

impl Default for ImageLocator {
    fn default() -> Self {
        Self::new(MatchMethod::default_set())
    }
}

impl ImageLocator {
    /// Build a locator over an ordered strategy list. An empty list falls
    /// back to the default set.
    pub fn new(methods: Vec<MatchMethod>) -> Self {
        let methods = if methods.is_empty() {
            MatchMethod::default_set()
        } else {
            methods
        };
        Self {
            methods,
            debug_dir: None,
        }
    }

    /// Save an annotated copy of the frame into `dir` on every hit.
    pub fn with_debug_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_dir = Some(dir.into());
        self
    }

    /// Locate `template_path` on screen.
    ///
    /// Per attempt: capture one frame, score every strategy, keep the best,
    /// and accept it when it reaches `options.confidence`. Misses sleep for
    /// the retry interval and try again; capture failures on a non-final
    /// attempt count as a failed attempt and are retried, while the final
    /// attempt's failure propagates as [`LocateError::Capture`]. A template
    /// that cannot be decoded, or that is larger than the captured frame,
    /// fails as [`LocateError::InvalidTemplate`] without retrying.
    ///
    /// Exhausting every attempt returns [`MatchOutcome::NotFound`]; a set
    /// `cancel` token does the same with the attempts performed so far.
    pub async fn locate(
        &self,
        capture: &mut dyn ScreenCapture,
        template_path: &Path,
        options: &LocateOptions,
        cancel: Option<&CancelToken>,
    ) -> LocateResult<MatchOutcome> {
        let template = load_template(template_path)?;
        let (tpl_w, tpl_h) = template.dimensions();

        let max_attempts = options.retry.max_attempts;
        let mut attempts = 0u32;
        for attempt in 1..=max_attempts {
            if cancel.map(CancelToken::is_cancelled).unwrap_or(false) {
                return Ok(MatchOutcome::NotFound { attempts });
            }

            let frame = match capture.capture_frame() {
                Ok(frame) => frame,
                Err(_) if attempt < max_attempts => {
                    attempts += 1;
                    options.retry.back_off().await;
                    continue;
                }
                Err(err) => return Err(LocateError::Capture(err)),
            };
            attempts += 1;

            if tpl_w > frame.width() || tpl_h > frame.height() {
                return Err(LocateError::InvalidTemplate {
                    path: template_path.display().to_string(),
                    reason: format!(
                        "template {}x{} is larger than the {}x{} frame",
                        tpl_w,
                        tpl_h,
                        frame.width(),
                        frame.height()
                    ),
                });
            }

            let frame_gray = imageops::grayscale(&frame);
            if let Some(best) = matcher::best_of(&frame_gray, &template, &self.methods) {
                if best.score >= options.confidence {
                    let bounds = BoundingBox::new(best.x as i32, best.y as i32, tpl_w, tpl_h);
                    if let Some(dir) = &self.debug_dir {
                        // Debug aid only; a failed save must not fail the hit.
                        let _ = save_match_debug(dir, &frame, &bounds);
                    }
                    return Ok(MatchOutcome::Found(MatchHit {
                        confidence: best.score,
                        bounds,
                        anchors: bounds.anchors(),
                        method: best.method,
                    }));
                }
            }

            if attempt < max_attempts {
                options.retry.back_off().await;
            }
        }

        Ok(MatchOutcome::NotFound { attempts })
    }
}

fn load_template(path: &Path) -> LocateResult<GrayImage> {
    let image = image::open(path).map_err(|err| LocateError::InvalidTemplate {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    Ok(image.to_luma8())
}

fn save_match_debug(dir: &Path, frame: &RgbaImage, bounds: &BoundingBox) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut annotated = frame.clone();
    imageproc::drawing::draw_hollow_rect_mut(
        &mut annotated,
        imageproc::rect::Rect::at(bounds.x, bounds.y).of_size(bounds.width, bounds.height),
        image::Rgba([0, 255, 0, 255]),
    );
    let stamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    annotated.save(dir.join(format!("match_debug_{stamp}.png")))?;
    Ok(())
}
