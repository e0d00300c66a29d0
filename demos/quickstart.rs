//! Quickstart: window inference, sample batch inference and the signal card

use synheart_emotion::{
    create_sample_batch, infer, infer_from_batch, ingest_batch, SignalCard, SignalPoint,
};

fn main() {
    println!("=== Window Inference ===");
    let window: Vec<SignalPoint> = (0..30)
        .map(|i| SignalPoint::heart_rate(i as f64, 70.0 + (i % 3) as f64))
        .collect();
    println!("Signal window: {:?} ...", &window[..5]);
    let result = infer(&window);
    println!("Window result: {} (confidence: {})", result.state, result.confidence);

    println!("\n=== Ingestion Batch ===");
    let batch = create_sample_batch(None);
    println!("Created batch with {} signal streams", batch.signals.len());
    println!("Session ID: {}", batch.session.session_id);
    println!("Subject ID: {}", batch.session.subject_id);

    let batch_result = infer_from_batch(&batch);
    println!(
        "Batch inference: {} (confidence: {})",
        batch_result.state, batch_result.confidence
    );

    let response = ingest_batch(&batch);
    println!(
        "Ingestion: {} points, {} warnings",
        response.received_points,
        response.warnings.len()
    );

    println!("\n{}", SignalCard::from_window("Heart Rate", &window));
}
