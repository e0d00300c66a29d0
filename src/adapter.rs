//! Batch adapter
//!
//! Turns an `IngestionBatch` into a legacy inference window and hands it to
//! the classifier. Also hosts the JSON entry points for windows and batches.

use crate::classifier::{self, UNKNOWN};
use crate::error::SdkError;
use crate::schema::{IngestionBatch, Inference, SignalPoint, StreamKind};

/// Infer an emotion state from the first heart-rate stream of a batch.
///
/// Batches without a `heart_rate` stream are `Unknown` without consulting
/// the classifier. Other streams, events and session metadata are ignored.
pub fn infer_from_batch(batch: &IngestionBatch) -> Inference {
    match heart_rate_window(batch) {
        Some(window) => classifier::infer(&window),
        None => {
            tracing::debug!(
                session_id = %batch.session.session_id,
                "no heart_rate stream in batch"
            );
            UNKNOWN
        }
    }
}

/// Extract the legacy window from the first `heart_rate` stream.
///
/// Vector-valued points are skipped. Returns `None` when the batch has no
/// heart-rate stream at all.
pub fn heart_rate_window(batch: &IngestionBatch) -> Option<Vec<SignalPoint>> {
    let stream = batch.stream(StreamKind::HeartRate)?;

    let window: Vec<SignalPoint> = stream
        .points
        .iter()
        .filter_map(|p| p.v.as_scalar().map(|hr| SignalPoint::heart_rate(p.t, hr)))
        .collect();

    let skipped = stream.points.len() - window.len();
    if skipped > 0 {
        tracing::debug!(skipped, "ignored vector samples on heart_rate stream");
    }

    Some(window)
}

/// Parse a JSON array of `SignalPoint`s
pub fn parse_window(json: &str) -> Result<Vec<SignalPoint>, SdkError> {
    let window: Vec<SignalPoint> = serde_json::from_str(json)?;
    Ok(window)
}

/// Parse a single JSON `IngestionBatch`
pub fn parse_batch(json: &str) -> Result<IngestionBatch, SdkError> {
    let batch: IngestionBatch = serde_json::from_str(json)?;
    Ok(batch)
}

/// Parse NDJSON (newline-delimited JSON), one `IngestionBatch` per line
pub fn parse_batch_ndjson(ndjson: &str) -> Result<Vec<IngestionBatch>, SdkError> {
    let mut batches = Vec::new();
    for (line_num, line) in ndjson.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<IngestionBatch>(trimmed) {
            Ok(batch) => batches.push(batch),
            Err(e) => {
                return Err(SdkError::ParseError(format!(
                    "Failed to parse line {}: {}",
                    line_num + 1,
                    e
                )));
            }
        }
    }
    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::create_sample_batch;
    use crate::schema::{EmotionState, SignalPointV1, SignalStream, Unit};

    fn hr_stream(points: Vec<SignalPointV1>) -> SignalStream {
        SignalStream {
            stream: StreamKind::HeartRate,
            unit: Unit::Bpm,
            sampling_hz: 1.0,
            points,
        }
    }

    #[test]
    fn test_sample_batch_is_calm() {
        let batch = create_sample_batch(None);
        let result = infer_from_batch(&batch);

        assert_eq!(result.state, EmotionState::Calm);
        assert_eq!(result.confidence, 0.7);
    }

    #[test]
    fn test_missing_heart_rate_stream_is_unknown() {
        let mut batch = create_sample_batch(None);
        batch.signals.retain(|s| s.stream != StreamKind::HeartRate);

        assert!(heart_rate_window(&batch).is_none());
        assert_eq!(infer_from_batch(&batch), UNKNOWN);
    }

    #[test]
    fn test_only_first_heart_rate_stream_is_used() {
        let mut batch = create_sample_batch(None);
        let noisy: Vec<SignalPointV1> = (0..10)
            .map(|i| SignalPointV1::new(i as f64, if i % 2 == 0 { 50.0 } else { 150.0 }))
            .collect();
        batch.signals.push(hr_stream(noisy));

        assert_eq!(infer_from_batch(&batch).state, EmotionState::Calm);

        batch.signals.rotate_right(1);
        assert_eq!(infer_from_batch(&batch).state, EmotionState::Stressed);
    }

    #[test]
    fn test_vector_points_are_skipped() {
        let mut batch = create_sample_batch(None);
        let points = vec![
            SignalPointV1::new(0.0, 70.0),
            SignalPointV1::new(1.0, vec![70.0, 71.0]),
            SignalPointV1::new(2.0, 70.0),
            SignalPointV1::new(3.0, vec![1.0]),
            SignalPointV1::new(4.0, 70.0),
            SignalPointV1::new(5.0, 70.0),
        ];
        batch.signals = vec![hr_stream(points)];

        let window = heart_rate_window(&batch).unwrap();
        assert_eq!(window.len(), 4);
        assert_eq!(window[1], SignalPoint::heart_rate(2.0, 70.0));
        // four usable samples is below the minimum
        assert_eq!(infer_from_batch(&batch), UNKNOWN);
    }

    #[test]
    fn test_parse_window() {
        let window = parse_window(r#"[{"t":0,"hr":70},{"t":1,"ibi":850}]"#).unwrap();

        assert_eq!(window.len(), 2);
        assert_eq!(window[0].hr, Some(70.0));
        assert_eq!(window[1].ibi, Some(850.0));
        assert!(parse_window("{").is_err());
    }

    #[test]
    fn test_parse_batch_ndjson_reports_line() {
        let line = serde_json::to_string(&create_sample_batch(Some("a"))).unwrap();
        let ndjson = format!("{}\n\n{}\nnot json\n", line, line);

        match parse_batch_ndjson(&ndjson) {
            Err(SdkError::ParseError(msg)) => assert!(msg.contains("line 4")),
            other => panic!("unexpected result: {:?}", other.map(|b| b.len())),
        }

        let ok = parse_batch_ndjson(&format!("{}\n{}\n", line, line)).unwrap();
        assert_eq!(ok.len(), 2);
        assert_eq!(ok[0].session.session_id, "a");
    }
}
