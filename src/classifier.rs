//! Heart-rate variance classifier
//!
//! Maps a window of heart-rate samples to a coarse emotion state using two
//! fixed thresholds on the population variance:
//!
//! | variance        | state    | confidence |
//! |-----------------|----------|------------|
//! | < 4             | Calm     | 0.7        |
//! | 4 ..< 16        | Focused  | 0.6        |
//! | >= 16           | Stressed | 0.8        |
//!
//! Windows with fewer than five heart-rate samples are `Unknown` (0.3).
//! Inputs are not validated: NaN or negative readings flow through the
//! arithmetic unchanged and the resulting label is unspecified.

use serde::{Deserialize, Serialize};

use crate::schema::{EmotionState, Inference, SignalPoint};

/// Minimum number of heart-rate samples for a labeled result.
///
/// Rationale: none recorded; the value is a fixed product constant.
pub const MIN_HR_SAMPLES: usize = 5;

/// Variance (bpm²) below which a window is `Calm`.
///
/// Rationale: none recorded; the value is a fixed product constant.
pub const CALM_VARIANCE_CEILING: f64 = 4.0;

/// Variance (bpm²) below which a non-calm window is `Focused`.
///
/// Rationale: none recorded; the value is a fixed product constant.
pub const FOCUSED_VARIANCE_CEILING: f64 = 16.0;

pub const UNKNOWN_CONFIDENCE: f64 = 0.3;
pub const CALM_CONFIDENCE: f64 = 0.7;
pub const FOCUSED_CONFIDENCE: f64 = 0.6;
pub const STRESSED_CONFIDENCE: f64 = 0.8;

/// Result for windows without enough heart-rate data
pub const UNKNOWN: Inference = Inference::new(EmotionState::Unknown, UNKNOWN_CONFIDENCE);

/// Summary statistics over the usable heart-rate samples of a window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    /// Number of points with a heart-rate reading
    pub samples: usize,
    /// Arithmetic mean (bpm)
    pub mean_bpm: f64,
    /// Population variance (bpm², divisor = samples)
    pub variance: f64,
}

/// Infer an emotion state from a window of signal points.
///
/// Points without `hr` are ignored; order is irrelevant to the result.
pub fn infer(window: &[SignalPoint]) -> Inference {
    match window_stats(window) {
        Some(stats) if stats.samples >= MIN_HR_SAMPLES => classify_variance(stats.variance),
        _ => UNKNOWN,
    }
}

/// Compute count, mean and population variance of the heart-rate samples.
///
/// Returns `None` when no point carries a heart rate.
pub fn window_stats(window: &[SignalPoint]) -> Option<WindowStats> {
    let hrs: Vec<f64> = window.iter().filter_map(|p| p.hr).collect();
    if hrs.is_empty() {
        return None;
    }

    let n = hrs.len() as f64;
    let mean = hrs.iter().sum::<f64>() / n;
    let variance = hrs.iter().map(|h| (h - mean).powi(2)).sum::<f64>() / n;

    Some(WindowStats {
        samples: hrs.len(),
        mean_bpm: mean,
        variance,
    })
}

/// Map a variance to its fixed-threshold bucket
pub fn classify_variance(variance: f64) -> Inference {
    if variance < CALM_VARIANCE_CEILING {
        Inference::new(EmotionState::Calm, CALM_CONFIDENCE)
    } else if variance < FOCUSED_VARIANCE_CEILING {
        Inference::new(EmotionState::Focused, FOCUSED_CONFIDENCE)
    } else {
        Inference::new(EmotionState::Stressed, STRESSED_CONFIDENCE)
    }
}
