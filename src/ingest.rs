//! Ingestion checks
//!
//! Plausibility checks applied to incoming data. Out-of-range values never
//! reject a batch; they are reported as warnings next to the point count.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::adapter::parse_batch;
use crate::error::SdkError;
use crate::schema::{IngestionBatch, SignalPointV1, StreamKind, SPEC_VERSION};

/// Plausible heart rate (bpm)
pub const HEART_RATE_RANGE: RangeInclusive<f64> = 30.0..=220.0;
/// Plausible inter-beat interval (ms)
pub const IBI_RANGE: RangeInclusive<f64> = 300.0..=3000.0;
/// Plausible RMSSD (ms)
pub const HRV_RMSSD_RANGE: RangeInclusive<f64> = 0.0..=200.0;
/// Accelerometer samples are `[x, y, z]`
pub const ACCELEROMETER_COMPONENTS: usize = 3;

/// Required prefix for anonymized subject ids
pub const SUBJECT_PREFIX: &str = "anon_";

/// Location of the published batch schema
pub const SCHEMA_URL: &str = "/schemas/ingest-batch.schema.json";

/// Outcome of an ingestion check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionResponse {
    pub status: String,
    pub session_id: String,
    pub received_points: usize,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Description of the accepted ingestion schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub spec_version: String,
    pub schema_url: String,
    pub supported_streams: Vec<String>,
    pub validation_rules: BTreeMap<String, String>,
}

/// Count the points of a batch and collect range warnings.
pub fn ingest_batch(batch: &IngestionBatch) -> IngestionResponse {
    let mut warnings = Vec::new();
    let mut total_points = 0;

    for signal in &batch.signals {
        total_points += signal.points.len();

        for point in &signal.points {
            if let Some(warning) = check_value(signal.stream, point) {
                warnings.push(warning);
            }
        }
    }

    tracing::debug!(
        session_id = %batch.session.session_id,
        total_points,
        warnings = warnings.len(),
        "ingested batch"
    );

    IngestionResponse {
        status: "ok".to_string(),
        session_id: batch.session.session_id.clone(),
        received_points: total_points,
        warnings,
    }
}

/// Parse and validate a batch, then run the ingestion checks.
///
/// Unlike `ingest_batch`, a batch breaking the schema bounds is rejected
/// with `SdkError::Validation` instead of being counted.
pub fn ingest_batch_json(json: &str) -> Result<IngestionResponse, SdkError> {
    let batch = parse_batch(json)?;
    batch.validate()?;
    Ok(ingest_batch(&batch))
}

fn check_value(stream: StreamKind, point: &SignalPointV1) -> Option<String> {
    match stream {
        StreamKind::HeartRate => point
            .v
            .as_scalar()
            .filter(|v| !HEART_RATE_RANGE.contains(v))
            .map(|v| format!("Heart rate {} bpm outside normal range (30-220)", v)),
        StreamKind::IbiMs => point
            .v
            .as_scalar()
            .filter(|v| !IBI_RANGE.contains(v))
            .map(|v| format!("IBI {} ms outside normal range (300-3000)", v)),
        StreamKind::HrvRmssd => point
            .v
            .as_scalar()
            .filter(|v| !HRV_RMSSD_RANGE.contains(v))
            .map(|v| format!("HRV RMSSD {} ms outside normal range (0-200)", v)),
        StreamKind::Accelerometer => point
            .v
            .as_vector()
            .filter(|v| v.len() != ACCELEROMETER_COMPONENTS)
            .map(|v| {
                format!(
                    "Accelerometer vector must have 3 components, got {}",
                    v.len()
                )
            }),
        StreamKind::RespRate | StreamKind::SkinTempC => None,
    }
}

/// Ingest newline-delimited JSON records.
///
/// Every non-blank line counts as one point. The first record carrying a
/// `session_id` names the session; undecodable lines and records with the
/// wrong spec version or subject prefix produce line-numbered warnings.
pub fn ingest_jsonl(data: &str) -> Result<IngestionResponse, SdkError> {
    let mut warnings = Vec::new();
    let mut total_points = 0;
    let mut session_id: Option<String> = None;

    for (line_num, line) in data.trim().lines().enumerate() {
        let line_num = line_num + 1;
        if line.trim().is_empty() {
            continue;
        }

        let record: serde_json::Value = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(e) => {
                warnings.push(format!("Line {}: Invalid JSON - {}", line_num, e));
                continue;
            }
        };
        total_points += 1;

        if session_id.is_none() {
            session_id = record
                .get("session_id")
                .and_then(|v| v.as_str())
                .map(str::to_string);
        }

        if record.get("spec_version").and_then(|v| v.as_str()) != Some(SPEC_VERSION) {
            warnings.push(format!("Line {}: Invalid spec_version", line_num));
        }

        let subject = record
            .get("subject_id")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        if !subject.starts_with(SUBJECT_PREFIX) {
            warnings.push(format!(
                "Line {}: Subject ID must start with '{}'",
                line_num, SUBJECT_PREFIX
            ));
        }
    }

    let session_id = session_id.ok_or_else(|| SdkError::MissingField("session_id".to_string()))?;

    tracing::debug!(%session_id, total_points, warnings = warnings.len(), "ingested jsonl");

    Ok(IngestionResponse {
        status: "ok".to_string(),
        session_id,
        received_points: total_points,
        warnings,
    })
}

/// Describe the accepted ingestion schema
pub fn schema_info() -> SchemaInfo {
    let rules = [
        ("heart_rate_range", "30-220 bpm"),
        ("ibi_range", "300-3000 ms"),
        ("hrv_rmssd_range", "0-200 ms"),
        ("subject_id_pattern", "anon_[a-zA-Z0-9]+"),
        ("accelerometer_format", "3-component vector [x, y, z]"),
    ];

    SchemaInfo {
        spec_version: SPEC_VERSION.to_string(),
        schema_url: SCHEMA_URL.to_string(),
        supported_streams: StreamKind::ALL
            .iter()
            .map(|k| k.as_str().to_string())
            .collect(),
        validation_rules: rules
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::create_sample_batch;
    use crate::schema::{SignalStream, Unit};

    #[test]
    fn test_sample_batch_has_no_warnings() {
        let response = ingest_batch(&create_sample_batch(Some("s-9")));

        assert_eq!(response.status, "ok");
        assert_eq!(response.session_id, "s-9");
        assert_eq!(response.received_points, 60);
        assert!(response.warnings.is_empty());
    }

    #[test]
    fn test_range_warnings() {
        let mut batch = create_sample_batch(None);
        batch.signals[0].points.push(SignalPointV1::new(30.0, 250.0));
        batch.signals[0].points.push(SignalPointV1::new(31.0, 220.0));
        batch.signals[1].points.push(SignalPointV1::new(30.0, 120.0));
        batch.signals.push(SignalStream {
            stream: StreamKind::HrvRmssd,
            unit: Unit::Ms,
            sampling_hz: 0.0,
            points: vec![SignalPointV1::new(0.0, -1.0), SignalPointV1::new(1.0, 0.0)],
        });
        batch.signals.push(SignalStream {
            stream: StreamKind::Accelerometer,
            unit: Unit::MetersPerSecondSquared,
            sampling_hz: 50.0,
            points: vec![
                SignalPointV1::new(0.0, vec![0.0, 0.0, 9.8]),
                SignalPointV1::new(0.02, vec![0.0, 9.8]),
            ],
        });

        let response = ingest_batch(&batch);

        assert_eq!(response.received_points, 67);
        assert_eq!(
            response.warnings,
            vec![
                "Heart rate 250 bpm outside normal range (30-220)".to_string(),
                "IBI 120 ms outside normal range (300-3000)".to_string(),
                "HRV RMSSD -1 ms outside normal range (0-200)".to_string(),
                "Accelerometer vector must have 3 components, got 2".to_string(),
            ]
        );
    }

    #[test]
    fn test_ingest_json_rejects_invalid_batch() {
        let mut batch = create_sample_batch(Some("s-3"));
        let json = serde_json::to_string(&batch).unwrap();
        assert_eq!(ingest_batch_json(&json).unwrap().received_points, 60);

        batch.spec_version = "9.9.9".to_string();
        let json = serde_json::to_string(&batch).unwrap();
        assert!(matches!(
            ingest_batch_json(&json),
            Err(SdkError::Validation(_))
        ));
        assert!(matches!(ingest_batch_json("[]"), Err(SdkError::JsonError(_))));
    }

    #[test]
    fn test_jsonl_ingestion() {
        let data = concat!(
            r#"{"spec_version":"0.1.0","session_id":"s-1","subject_id":"anon_7","t":0}"#,
            "\n",
            r#"{"spec_version":"0.0.9","session_id":"s-2","subject_id":"user_7","t":1}"#,
            "\n\n",
            "{oops\n",
        );

        let response = ingest_jsonl(data).unwrap();

        assert_eq!(response.session_id, "s-1");
        assert_eq!(response.received_points, 2);
        assert_eq!(response.warnings.len(), 3);
        assert_eq!(response.warnings[0], "Line 2: Invalid spec_version");
        assert_eq!(response.warnings[1], "Line 2: Subject ID must start with 'anon_'");
        assert!(response.warnings[2].starts_with("Line 4: Invalid JSON"));
    }

    #[test]
    fn test_jsonl_without_session_fails() {
        let result = ingest_jsonl(r#"{"spec_version":"0.1.0","subject_id":"anon_1"}"#);

        assert!(matches!(result, Err(SdkError::MissingField(ref f)) if f == "session_id"));
        assert!(ingest_jsonl("").is_err());
    }

    #[test]
    fn test_schema_info() {
        let info = schema_info();

        assert_eq!(info.spec_version, "0.1.0");
        assert_eq!(info.supported_streams.len(), 6);
        assert_eq!(info.supported_streams[0], "heart_rate");
        assert_eq!(info.validation_rules["ibi_range"], "300-3000 ms");
    }
}
