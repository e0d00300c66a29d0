//! Legacy inference window types
//!
//! A window is a plain list of `SignalPoint`s, the shape the first SDK
//! release accepted before batches existed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One sample of a legacy inference window
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SignalPoint {
    /// Seconds since the start of the window
    pub t: f64,
    /// Heart rate (bpm)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hr: Option<f64>,
    /// Inter-beat interval (ms)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ibi: Option<f64>,
}

impl SignalPoint {
    /// Point carrying only a heart-rate reading
    pub fn heart_rate(t: f64, hr: f64) -> Self {
        SignalPoint {
            t,
            hr: Some(hr),
            ibi: None,
        }
    }
}

/// Coarse affective state label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmotionState {
    Calm,
    Focused,
    Stressed,
    Unknown,
}

impl EmotionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionState::Calm => "Calm",
            EmotionState::Focused => "Focused",
            EmotionState::Stressed => "Stressed",
            EmotionState::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for EmotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single inference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Inference {
    pub state: EmotionState,
    /// Fixed per-state confidence (0-1)
    pub confidence: f64,
}

impl Inference {
    pub const fn new(state: EmotionState, confidence: f64) -> Self {
        Inference { state, confidence }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_point_omits_missing_fields() {
        let point = SignalPoint::heart_rate(3.0, 72.0);
        let json = serde_json::to_string(&point).unwrap();

        assert_eq!(json, r#"{"t":3.0,"hr":72.0}"#);
    }

    #[test]
    fn test_signal_point_accepts_bare_timestamp() {
        let point: SignalPoint = serde_json::from_str(r#"{"t": 4}"#).unwrap();

        assert_eq!(point.t, 4.0);
        assert!(point.hr.is_none());
        assert!(point.ibi.is_none());
    }

    #[test]
    fn test_inference_wire_format() {
        let inference = Inference::new(EmotionState::Focused, 0.6);
        let json = serde_json::to_string(&inference).unwrap();

        assert_eq!(json, r#"{"state":"Focused","confidence":0.6}"#);

        let parsed: Inference =
            serde_json::from_str(r#"{"state":"Unknown","confidence":0.3}"#).unwrap();
        assert_eq!(parsed.state, EmotionState::Unknown);
    }
}
