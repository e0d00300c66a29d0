//! Synheart Emotion - heart-rate window schemas and a toy emotion classifier
//!
//! The SDK maps a window of heart-rate samples to a coarse affective state
//! (Calm / Focused / Stressed / Unknown) with a fixed-threshold variance rule.
//! Windows come either as a plain list of `SignalPoint`s or from the
//! heart-rate stream of a versioned `IngestionBatch`.
//!
//! ```
//! use synheart_emotion::{create_sample_batch, infer_from_batch, EmotionState};
//!
//! let batch = create_sample_batch(None);
//! assert_eq!(infer_from_batch(&batch).state, EmotionState::Calm);
//! ```
//!
//! This is a demonstration mapping, not a trained model: thresholds are fixed
//! and no history is kept between calls.

pub mod adapter;
pub mod card;
pub mod classifier;
pub mod error;
pub mod ingest;
pub mod sample;
pub mod schema;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use adapter::{heart_rate_window, infer_from_batch, parse_batch, parse_window};
pub use card::SignalCard;
pub use classifier::{infer, window_stats, WindowStats};
pub use error::SdkError;
pub use ingest::{
    ingest_batch, ingest_batch_json, ingest_jsonl, schema_info, IngestionResponse, SchemaInfo,
};
pub use sample::{create_sample_batch, DEFAULT_SESSION_ID};

// Schema exports
pub use schema::{
    EmotionState, Inference, IngestionBatch, SampleValue, SignalPoint, SignalPointV1,
    SignalStream, StreamKind, Unit, SPEC_VERSION,
};

/// SDK version
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI and FFI
pub const PRODUCER_NAME: &str = "synheart-emotion";
