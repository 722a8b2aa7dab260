use image::GrayImage;
use imageproc::template_matching::{self, MatchTemplateMethod};

/// One template-matching strategy.
///
/// Native scores are normalized onto a common higher-is-better [0, 1] scale
/// so strategies with a lower-is-better convention compare fairly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMethod {
    /// Normalized cross-correlation; the native score is already
    /// higher-is-better.
    NormalizedCrossCorrelation,
    /// Normalized sum of squared differences; lower native score is better,
    /// reported as `1 - value` (clamped to [0, 1]).
    NormalizedSquaredDifference,
}

impl MatchMethod {
    /// The default strategy list, evaluated in order on every attempt.
    pub fn default_set() -> Vec<MatchMethod> {
        vec![
            MatchMethod::NormalizedCrossCorrelation,
            MatchMethod::NormalizedSquaredDifference,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            MatchMethod::NormalizedCrossCorrelation => "ccorr_normed",
            MatchMethod::NormalizedSquaredDifference => "sqdiff_normed",
        }
    }

    fn native(self) -> MatchTemplateMethod {
        match self {
            MatchMethod::NormalizedCrossCorrelation => {
                MatchTemplateMethod::CrossCorrelationNormalized
            }
            MatchMethod::NormalizedSquaredDifference => {
                MatchTemplateMethod::SumOfSquaredErrorsNormalized
            }
        }
    }
}

/// Best location and normalized score produced by one method.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MethodScore {
    pub method: MatchMethod,
    pub score: f64,
    pub x: u32,
    pub y: u32,
}

/// Run one method over the full frame and normalize its best score.
///
/// The template must fit inside the frame; the engine checks that before
/// calling in here.
pub(crate) fn score_method(
    frame: &GrayImage,
    template: &GrayImage,
    method: MatchMethod,
) -> MethodScore {
    let scores = template_matching::match_template(frame, template, method.native());
    let extremes = template_matching::find_extremes(&scores);
    let (score, (x, y)) = match method {
        MatchMethod::NormalizedCrossCorrelation => {
            (extremes.max_value as f64, extremes.max_value_location)
        }
        MatchMethod::NormalizedSquaredDifference => {
            (1.0 - extremes.min_value as f64, extremes.min_value_location)
        }
    };
    MethodScore {
        method,
        score: score.clamp(0.0, 1.0),
        x,
        y,
    }
}

/// Keep the best of a score sequence; ties keep the earlier entry.
pub(crate) fn pick_best(scores: impl IntoIterator<Item = MethodScore>) -> Option<MethodScore> {
    let mut best: Option<MethodScore> = None;
    for candidate in scores {
        if best.as_ref().map(|b| candidate.score > b.score).unwrap_or(true) {
            best = Some(candidate);
        }
    }
    best
}

/// Score every method against the frame and return the overall winner.
pub(crate) fn best_of(
    frame: &GrayImage,
    template: &GrayImage,
    methods: &[MatchMethod],
) -> Option<MethodScore> {
    pick_best(
        methods
            .iter()
            .map(|method| score_method(frame, template, *method)),
    )
}
