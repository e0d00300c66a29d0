//! Ingestion batch schema (spec version 0.1.0)
//!
//! A batch bundles session metadata, one or more named signal streams and
//! optional annotated events. Stream and unit names are closed sets; anything
//! else is rejected at parse time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current ingestion schema version
pub const SPEC_VERSION: &str = "0.1.0";

fn default_spec_version() -> String {
    SPEC_VERSION.to_string()
}

/// Named physiological channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    HeartRate,
    IbiMs,
    HrvRmssd,
    /// The only stream carrying vector samples
    Accelerometer,
    RespRate,
    SkinTempC,
}

impl StreamKind {
    pub const ALL: [StreamKind; 6] = [
        StreamKind::HeartRate,
        StreamKind::IbiMs,
        StreamKind::HrvRmssd,
        StreamKind::Accelerometer,
        StreamKind::RespRate,
        StreamKind::SkinTempC,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::HeartRate => "heart_rate",
            StreamKind::IbiMs => "ibi_ms",
            StreamKind::HrvRmssd => "hrv_rmssd",
            StreamKind::Accelerometer => "accelerometer",
            StreamKind::RespRate => "resp_rate",
            StreamKind::SkinTempC => "skin_temp_c",
        }
    }
}

/// Measurement unit tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "bpm")]
    Bpm,
    #[serde(rename = "ms")]
    Ms,
    #[serde(rename = "m/s^2")]
    MetersPerSecondSquared,
    #[serde(rename = "breaths/min")]
    BreathsPerMin,
    #[serde(rename = "°C")]
    Celsius,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Bpm => "bpm",
            Unit::Ms => "ms",
            Unit::MetersPerSecondSquared => "m/s^2",
            Unit::BreathsPerMin => "breaths/min",
            Unit::Celsius => "°C",
        }
    }
}

/// Sample value: a scalar for most streams, a vector for accelerometer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleValue {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl SampleValue {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            SampleValue::Scalar(v) => Some(*v),
            SampleValue::Vector(_) => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            SampleValue::Scalar(_) => None,
            SampleValue::Vector(v) => Some(v),
        }
    }
}

impl From<f64> for SampleValue {
    fn from(v: f64) -> Self {
        SampleValue::Scalar(v)
    }
}

impl From<Vec<f64>> for SampleValue {
    fn from(v: Vec<f64>) -> Self {
        SampleValue::Vector(v)
    }
}

/// One timestamped stream sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalPointV1 {
    /// Seconds since session start
    pub t: f64,
    pub v: SampleValue,
}

impl SignalPointV1 {
    pub fn new(t: f64, v: impl Into<SampleValue>) -> Self {
        SignalPointV1 { t, v: v.into() }
    }
}

/// A named channel of homogeneous samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalStream {
    pub stream: StreamKind,
    pub unit: Unit,
    pub sampling_hz: f64,
    pub points: Vec<SignalPointV1>,
}

/// Recording device descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware_version: Option<String>,
}

/// Session metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    /// Anonymized subject identifier (`anon_...`)
    pub subject_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_id: Option<String>,
    /// IANA timezone name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

/// Labeled annotation interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub label: String,
    /// Seconds since session start
    pub t: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Top-level ingestion payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionBatch {
    #[serde(default = "default_spec_version")]
    pub spec_version: String,
    pub session: Session,
    pub signals: Vec<SignalStream>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<Event>>,
}

impl IngestionBatch {
    /// First stream of the given kind, in insertion order
    pub fn stream(&self, kind: StreamKind) -> Option<&SignalStream> {
        self.signals.iter().find(|s| s.stream == kind)
    }

    /// Total number of points across all streams
    pub fn total_points(&self) -> usize {
        self.signals.iter().map(|s| s.points.len()).sum()
    }

    /// Check version and numeric bounds.
    ///
    /// Subject id patterns and timestamp formats are not checked here;
    /// timestamps are already typed once the batch deserializes.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.spec_version != SPEC_VERSION {
            return Err(ValidationError::InvalidSpecVersion {
                expected: SPEC_VERSION.to_string(),
                actual: self.spec_version.clone(),
            });
        }

        for signal in &self.signals {
            if signal.sampling_hz < 0.0 {
                return Err(ValidationError::NegativeSamplingRate {
                    stream: signal.stream.as_str().to_string(),
                    value: signal.sampling_hz,
                });
            }

            if let Some((index, point)) = signal.points.iter().enumerate().find(|(_, p)| p.t < 0.0) {
                return Err(ValidationError::NegativeTimestamp {
                    location: format!("{}[{}]", signal.stream.as_str(), index),
                    value: point.t,
                });
            }
        }

        for event in self.events.iter().flatten() {
            if event.t < 0.0 {
                return Err(ValidationError::NegativeTimestamp {
                    location: format!("event '{}'", event.label),
                    value: event.t,
                });
            }
            if let Some(duration) = event.duration_s.filter(|d| *d < 0.0) {
                return Err(ValidationError::NegativeDuration {
                    label: event.label.clone(),
                    value: duration,
                });
            }
        }

        Ok(())
    }
}

/// Validation errors for ingestion batches
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid spec version: expected {expected}, got {actual}")]
    InvalidSpecVersion { expected: String, actual: String },

    #[error("Negative timestamp {value} at {location}")]
    NegativeTimestamp { location: String, value: f64 },

    #[error("Negative sampling rate {value} Hz on stream {stream}")]
    NegativeSamplingRate { stream: String, value: f64 },

    #[error("Negative duration {value}s on event '{label}'")]
    NegativeDuration { label: String, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch_json() -> &'static str {
        r#"{
            "spec_version": "0.1.0",
            "session": {
                "session_id": "s-1",
                "subject_id": "anon_42",
                "device": { "make": "Polar", "model": "H10" },
                "start_at": "2024-01-15T08:30:00Z",
                "end_at": "2024-01-15T08:35:00Z"
            },
            "signals": [
                {
                    "stream": "accelerometer",
                    "unit": "m/s^2",
                    "sampling_hz": 25,
                    "points": [{ "t": 0, "v": [0.1, 0.2, 9.8] }]
                },
                {
                    "stream": "heart_rate",
                    "unit": "bpm",
                    "sampling_hz": 1,
                    "points": [{ "t": 0, "v": 71 }, { "t": 1, "v": 72.5 }]
                },
                {
                    "stream": "skin_temp_c",
                    "unit": "°C",
                    "sampling_hz": 0.1,
                    "points": []
                }
            ],
            "events": [{ "label": "rest", "t": 0, "duration_s": 60 }]
        }"#
    }

    #[test]
    fn test_deserialize_batch() {
        let batch: IngestionBatch = serde_json::from_str(batch_json()).unwrap();

        assert_eq!(batch.spec_version, SPEC_VERSION);
        assert_eq!(batch.signals.len(), 3);
        assert_eq!(batch.signals[0].stream, StreamKind::Accelerometer);
        assert_eq!(batch.signals[0].unit, Unit::MetersPerSecondSquared);
        assert_eq!(
            batch.signals[0].points[0].v,
            SampleValue::Vector(vec![0.1, 0.2, 9.8])
        );
        assert_eq!(batch.signals[1].points[0].v, SampleValue::Scalar(71.0));
        assert_eq!(batch.signals[2].unit, Unit::Celsius);
        assert_eq!(batch.total_points(), 3);
        assert!(batch.validate().is_ok());
    }

    #[test]
    fn test_stream_lookup_returns_first_match() {
        let batch: IngestionBatch = serde_json::from_str(batch_json()).unwrap();

        let hr = batch.stream(StreamKind::HeartRate).unwrap();
        assert_eq!(hr.points.len(), 2);
        assert!(batch.stream(StreamKind::RespRate).is_none());
    }

    #[test]
    fn test_spec_version_defaults_when_missing() {
        let json = r#"{
            "session": {
                "session_id": "s-2",
                "subject_id": "anon_1",
                "start_at": "2024-01-15T08:30:00Z",
                "end_at": "2024-01-15T08:30:00Z"
            },
            "signals": []
        }"#;

        let batch: IngestionBatch = serde_json::from_str(json).unwrap();
        assert_eq!(batch.spec_version, "0.1.0");
        assert!(batch.events.is_none());
    }

    #[test]
    fn test_unknown_stream_is_rejected() {
        let json = batch_json().replace("skin_temp_c", "blood_glucose");
        assert!(serde_json::from_str::<IngestionBatch>(&json).is_err());
    }

    #[test]
    fn test_wire_names_match_as_str() {
        for kind in StreamKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }

        let json = serde_json::to_string(&Unit::BreathsPerMin).unwrap();
        assert_eq!(json, "\"breaths/min\"");
    }

    #[test]
    fn test_validate_rejects_wrong_version() {
        let mut batch: IngestionBatch = serde_json::from_str(batch_json()).unwrap();
        batch.spec_version = "0.2.0".to_string();

        match batch.validate() {
            Err(ValidationError::InvalidSpecVersion { actual, .. }) => assert_eq!(actual, "0.2.0"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_negative_values() {
        let mut batch: IngestionBatch = serde_json::from_str(batch_json()).unwrap();
        batch.signals[1].points[1].t = -1.0;
        assert!(matches!(
            batch.validate(),
            Err(ValidationError::NegativeTimestamp { .. })
        ));

        let mut batch: IngestionBatch = serde_json::from_str(batch_json()).unwrap();
        batch.signals[0].sampling_hz = -25.0;
        assert!(matches!(
            batch.validate(),
            Err(ValidationError::NegativeSamplingRate { .. })
        ));

        let mut batch: IngestionBatch = serde_json::from_str(batch_json()).unwrap();
        batch.events.as_mut().unwrap()[0].duration_s = Some(-5.0);
        assert!(matches!(
            batch.validate(),
            Err(ValidationError::NegativeDuration { .. })
        ));
    }
}
