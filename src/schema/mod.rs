//! Signal and ingestion schemas
//!
//! Two shapes are supported: the legacy inference window (a list of
//! `SignalPoint`) and the versioned `IngestionBatch`.

mod batch;
mod window;

pub use batch::*;
pub use window::*;
