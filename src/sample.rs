//! Canonical sample batch for demos and tests

use chrono::Utc;
use uuid::Uuid;

use crate::schema::{
    Device, Event, IngestionBatch, Session, SignalPointV1, SignalStream, StreamKind, Unit,
    SPEC_VERSION,
};

/// Session id used when no override is given
pub const DEFAULT_SESSION_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

/// Number of points generated per sample stream
pub const SAMPLE_POINTS: usize = 30;

/// Build the canonical example batch.
///
/// All fields are fixed except `session_id` (overridable) and the session
/// timestamps, which are both set to the current UTC time.
pub fn create_sample_batch(session_id: Option<&str>) -> IngestionBatch {
    let now = Utc::now();

    let heart_rate = (0..SAMPLE_POINTS)
        .map(|i| SignalPointV1::new(i as f64, 70.0 + (i % 3) as f64))
        .collect();

    let ibi = (0..SAMPLE_POINTS)
        .map(|i| SignalPointV1::new(i as f64, 860.0 + ((i % 5) * 10) as f64))
        .collect();

    let mut task_properties = serde_json::Map::new();
    task_properties.insert("task".to_string(), "N-back".into());
    task_properties.insert("level".to_string(), 2_i64.into());

    IngestionBatch {
        spec_version: SPEC_VERSION.to_string(),
        session: Session {
            session_id: session_id.unwrap_or(DEFAULT_SESSION_ID).to_string(),
            subject_id: "anon_1234".to_string(),
            consent_id: Some("consent_v1".to_string()),
            timezone: Some("America/Vancouver".to_string()),
            device: Some(Device {
                make: Some("Apple".to_string()),
                model: Some("Watch Series 9".to_string()),
                firmware_version: Some("10.1".to_string()),
            }),
            start_at: now,
            end_at: now,
        },
        signals: vec![
            SignalStream {
                stream: StreamKind::HeartRate,
                unit: Unit::Bpm,
                sampling_hz: 1.0,
                points: heart_rate,
            },
            SignalStream {
                stream: StreamKind::IbiMs,
                unit: Unit::Ms,
                sampling_hz: 1.0,
                points: ibi,
            },
        ],
        events: Some(vec![
            Event {
                label: "baseline".to_string(),
                t: 0.0,
                duration_s: Some(30.0),
                properties: None,
            },
            Event {
                label: "cognitive_task".to_string(),
                t: 30.0,
                duration_s: Some(60.0),
                properties: Some(task_properties),
            },
        ]),
    }
}

/// Fresh random (v4) session id
pub fn random_session_id() -> String {
    Uuid::new_v4().to_string()
}
