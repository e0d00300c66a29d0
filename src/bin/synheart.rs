//! Synheart CLI - Command-line interface for the Synheart emotion SDK
//!
//! Commands:
//! - infer: Infer a state from a window of signal points
//! - infer-batch: Infer a state from ingestion batches
//! - sample: Print the sample ingestion batch
//! - ingest: Run ingestion checks on a batch or JSONL records
//! - validate: Validate ingestion batches against the schema
//! - schema: Print schema information
//! - demo: Walk through the quickstart
//! - doctor: Diagnose SDK and environment

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use synheart_emotion::adapter::{parse_batch, parse_batch_ndjson, parse_window};
use synheart_emotion::sample::random_session_id;
use synheart_emotion::schema::{IngestionBatch, ValidationError};
use synheart_emotion::{
    create_sample_batch, infer, infer_from_batch, ingest_batch_json, ingest_jsonl, schema_info,
    Inference, SdkError, SignalCard, SignalPoint, PRODUCER_NAME, SDK_VERSION, SPEC_VERSION,
};

/// Synheart - heart-rate windows to coarse emotion states
#[derive(Parser)]
#[command(name = "synheart")]
#[command(author = "Synheart AI Inc")]
#[command(version = SDK_VERSION)]
#[command(about = "Infer coarse emotion states from heart-rate data", long_about = None)]
struct Cli {
    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Infer a state from a JSON array of signal points
    Infer {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Infer a state from ingestion batches
    InferBatch {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: BatchFormat,
    },

    /// Print the sample ingestion batch
    Sample {
        /// Session id override
        #[arg(long, conflicts_with = "random_session_id")]
        session_id: Option<String>,

        /// Use a freshly generated session id
        #[arg(long)]
        random_session_id: bool,

        /// Pretty-print the batch
        #[arg(long)]
        pretty: bool,
    },

    /// Run ingestion checks and print the ingestion response
    Ingest {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: IngestFormat,
    },

    /// Validate ingestion batches against the schema
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: BatchFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Walk through the quickstart with sample data
    Demo,

    /// Diagnose SDK and environment
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum BatchFormat {
    /// A single batch object
    Json,
    /// Newline-delimited JSON (one batch per line)
    Ndjson,
}

#[derive(Clone, ValueEnum)]
enum IngestFormat {
    /// A single batch object
    Json,
    /// Newline-delimited JSON records
    Jsonl,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), SynheartCliError> {
    match cli.command {
        Commands::Infer { input } => cmd_infer(&input),

        Commands::InferBatch {
            input,
            input_format,
        } => cmd_infer_batch(&input, input_format),

        Commands::Sample {
            session_id,
            random_session_id: random,
            pretty,
        } => cmd_sample(session_id, random, pretty),

        Commands::Ingest {
            input,
            input_format,
        } => cmd_ingest(&input, input_format),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Schema { json } => cmd_schema(json),

        Commands::Demo => cmd_demo(),

        Commands::Doctor { json } => cmd_doctor(json),
    }
}

fn cmd_infer(input: &Path) -> Result<(), SynheartCliError> {
    let window = parse_window(&read_input(input)?)?;
    tracing::debug!(points = window.len(), "parsed window");

    println!("{}", serde_json::to_string(&infer(&window))?);
    Ok(())
}

fn cmd_infer_batch(input: &Path, input_format: BatchFormat) -> Result<(), SynheartCliError> {
    let batches = read_batches(input, &input_format)?;

    for batch in &batches {
        let result = infer_from_batch(batch);
        println!("{}", serde_json::to_string(&BatchInference::new(batch, result))?);
    }

    Ok(())
}

fn cmd_sample(
    session_id: Option<String>,
    random: bool,
    pretty: bool,
) -> Result<(), SynheartCliError> {
    let session_id = if random {
        Some(random_session_id())
    } else {
        session_id
    };
    let batch = create_sample_batch(session_id.as_deref());

    if pretty {
        println!("{}", serde_json::to_string_pretty(&batch)?);
    } else {
        println!("{}", serde_json::to_string(&batch)?);
    }

    Ok(())
}

fn cmd_ingest(input: &Path, input_format: IngestFormat) -> Result<(), SynheartCliError> {
    let data = read_input(input)?;

    let response = match input_format {
        IngestFormat::Json => ingest_batch_json(&data)?,
        IngestFormat::Jsonl => ingest_jsonl(&data)?,
    };

    for warning in &response.warnings {
        tracing::warn!("{}", warning);
    }

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn cmd_validate(
    input: &Path,
    input_format: BatchFormat,
    json: bool,
) -> Result<(), SynheartCliError> {
    let batches = read_batches(input, &input_format)?;

    let errors: Vec<ValidationErrorDetail> = batches
        .iter()
        .enumerate()
        .filter_map(|(index, batch)| {
            batch.validate().err().map(|e| ValidationErrorDetail {
                index,
                session_id: batch.session.session_id.clone(),
                error: e.to_string(),
            })
        })
        .collect();

    let report = ValidationReport {
        total_batches: batches.len(),
        valid_batches: batches.len() - errors.len(),
        invalid_batches: errors.len(),
        errors,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total batches:   {}", report.total_batches);
        println!("Valid batches:   {}", report.valid_batches);
        println!("Invalid batches: {}", report.invalid_batches);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - Session {} (index {}): {}",
                    err.session_id, err.index, err.error
                );
            }
        }
    }

    if report.invalid_batches > 0 {
        Err(SynheartCliError::ValidationFailed(report.invalid_batches))
    } else {
        Ok(())
    }
}

fn cmd_schema(json: bool) -> Result<(), SynheartCliError> {
    let info = schema_info();

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Ingestion Schema: {}", info.spec_version);
    println!("Schema URL: {}", info.schema_url);
    println!();
    println!("A batch contains:");
    println!("- spec_version: \"{}\"", SPEC_VERSION);
    println!("- session: {{ session_id, subject_id, consent_id?, timezone?, device?, start_at, end_at }}");
    println!("- signals: Array of {{ stream, unit, sampling_hz, points: [{{ t, v }}] }}");
    println!("- events?: Array of {{ label, t, duration_s?, properties? }}");
    println!();
    println!("Supported streams: {}", info.supported_streams.join(", "));
    println!("Units: bpm, ms, m/s^2, breaths/min, °C");
    println!();
    println!("Validation rules:");
    for (rule, value) in &info.validation_rules {
        println!("  {}: {}", rule, value);
    }

    Ok(())
}

fn cmd_demo() -> Result<(), SynheartCliError> {
    println!("=== Window Inference ===");
    let window: Vec<SignalPoint> = (0..30)
        .map(|i| SignalPoint::heart_rate(i as f64, 70.0 + (i % 3) as f64))
        .collect();
    let result = infer(&window);
    println!(
        "Window result: {} (confidence: {})",
        result.state, result.confidence
    );

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

    for signal in &batch.signals {
        println!(
            "  {}: {} points at {} Hz",
            signal.stream.as_str(),
            signal.points.len(),
            signal.sampling_hz
        );
    }

    if let Some(events) = &batch.events {
        println!("Events: {}", events.len());
        for event in events {
            let duration = event
                .duration_s
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("  {} at t={}s (duration: {}s)", event.label, event.t, duration);
        }
    }

    println!("\n=== Signal Card ===");
    println!("{}", SignalCard::from_window("Heart Rate", &window));

    Ok(())
}

fn cmd_doctor(json: bool) -> Result<(), SynheartCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "sdk_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("SDK version {}", SDK_VERSION),
    });

    checks.push(DoctorCheck {
        name: "spec_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Ingestion spec: {}", SPEC_VERSION),
    });

    // The sample batch must survive a JSON round trip and classify as Calm
    let sample_check = match serde_json::to_string(&create_sample_batch(None))
        .map_err(SdkError::from)
        .and_then(|json| parse_batch(&json))
    {
        Ok(batch) => {
            let result = infer_from_batch(&batch);
            DoctorCheck {
                name: "sample_inference".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "Sample batch inferred as {} ({})",
                    result.state, result.confidence
                ),
            }
        }
        Err(e) => DoctorCheck {
            name: "sample_inference".to_string(),
            status: CheckStatus::Error,
            message: format!("Sample batch round trip failed: {}", e),
        },
    };
    checks.push(sample_check);

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (use --input -)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: SDK_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Synheart Doctor Report");
        println!("======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(SynheartCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_input(input: &Path) -> Result<String, SynheartCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn read_batches(
    input: &Path,
    format: &BatchFormat,
) -> Result<Vec<IngestionBatch>, SynheartCliError> {
    let data = read_input(input)?;

    let batches = match format {
        BatchFormat::Json => vec![parse_batch(&data)?],
        BatchFormat::Ndjson => parse_batch_ndjson(&data)?,
    };

    if batches.is_empty() {
        return Err(SynheartCliError::NoBatches);
    }

    Ok(batches)
}

// Error types

#[derive(Debug)]
enum SynheartCliError {
    Io(io::Error),
    Sdk(SdkError),
    Json(serde_json::Error),
    Validation(ValidationError),
    NoBatches,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for SynheartCliError {
    fn from(e: io::Error) -> Self {
        SynheartCliError::Io(e)
    }
}

impl From<SdkError> for SynheartCliError {
    fn from(e: SdkError) -> Self {
        match e {
            SdkError::Validation(v) => SynheartCliError::Validation(v),
            other => SynheartCliError::Sdk(other),
        }
    }
}

impl From<serde_json::Error> for SynheartCliError {
    fn from(e: serde_json::Error) -> Self {
        SynheartCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<SynheartCliError> for CliError {
    fn from(e: SynheartCliError) -> Self {
        match e {
            SynheartCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            SynheartCliError::Sdk(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(format!(
                    "Ensure input matches the ingestion spec {}",
                    SPEC_VERSION
                )),
            },
            SynheartCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            SynheartCliError::Validation(e) => CliError {
                code: "VALIDATION_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'synheart validate' for details".to_string()),
            },
            SynheartCliError::NoBatches => CliError {
                code: "NO_BATCHES".to_string(),
                message: "No batches found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            SynheartCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} batches failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            SynheartCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct BatchInference {
    session_id: String,
    #[serde(flatten)]
    inference: Inference,
}

impl BatchInference {
    fn new(batch: &IngestionBatch, inference: Inference) -> Self {
        BatchInference {
            session_id: batch.session.session_id.clone(),
            inference,
        }
    }
}

#[derive(serde::Serialize)]
struct ValidationReport {
    total_batches: usize,
    valid_batches: usize,
    invalid_batches: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    session_id: String,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Error,
}
