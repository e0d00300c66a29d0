//! Text rendering of the single-signal demo card

use serde::Serialize;
use std::fmt;

use crate::classifier::{infer, window_stats};
use crate::schema::{EmotionState, SignalPoint};

/// A titled value with its inferred state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalCard {
    pub title: String,
    /// Display value, e.g. "71.0 bpm"
    pub value: String,
    pub state: EmotionState,
}

impl SignalCard {
    /// Card showing the mean heart rate of a window and its state
    pub fn from_window(title: impl Into<String>, window: &[SignalPoint]) -> Self {
        let value = match window_stats(window) {
            Some(stats) => format!("{:.1} bpm", stats.mean_bpm),
            None => "-- bpm".to_string(),
        };

        SignalCard {
            title: title.into(),
            value,
            state: infer(window).state,
        }
    }
}

impl fmt::Display for SignalCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", self.value)?;
        write!(f, "State: {}", self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_card() {
        let window: Vec<SignalPoint> = (0..30)
            .map(|i| SignalPoint::heart_rate(i as f64, 70.0 + (i % 3) as f64))
            .collect();

        let card = SignalCard::from_window("Heart Rate", &window);

        assert_eq!(card.value, "71.0 bpm");
        assert_eq!(card.state, EmotionState::Calm);
        assert_eq!(card.to_string(), "Heart Rate\n71.0 bpm\nState: Calm");
    }

    #[test]
    fn test_empty_window_card() {
        let card = SignalCard::from_window("Heart Rate", &[]);

        assert_eq!(card.value, "-- bpm");
        assert_eq!(card.state, EmotionState::Unknown);
    }
}
