//! Rhythm CLI - Command-line interface for Synheart Rhythm
//!
//! Commands:
//! - analyze: Run the complete analysis over a sample file
//! - hrv: Print only the time-domain HRV metrics
//! - validate: Check sample records against the physiological band

use clap::{Parser, Subcommand, ValueEnum};
use chrono::{DateTime, Utc};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

use synheart_rhythm::types::{MAX_VALID_RR_MS, MIN_VALID_RR_MS};
use synheart_rhythm::{
    AnalysisEngine, AnalysisError, AnalysisOptions, InMemorySource, RrSample, TimeRange,
    PRODUCER_NAME, RHYTHM_VERSION,
};

/// Rhythm - Analytics engine for R-R interval heart signals
#[derive(Parser)]
#[command(name = "rhythm")]
#[command(author = "Synheart AI Inc")]
#[command(version = RHYTHM_VERSION)]
#[command(about = "Derive HRV analytics from R-R interval samples", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the complete analysis over a sample file
    Analyze {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Analysis range start (RFC 3339); defaults to the earliest sample
        #[arg(long)]
        from: Option<DateTime<Utc>>,

        /// Analysis range end (RFC 3339); defaults to the latest sample
        #[arg(long)]
        to: Option<DateTime<Utc>>,

        /// Aggregation window width in minutes
        #[arg(long, default_value = "5")]
        aggregation_minutes: u32,

        /// Trend window width in minutes
        #[arg(long, default_value = "15")]
        trend_window_minutes: u32,

        /// Histogram bin count (0 = adaptive)
        #[arg(long, default_value = "25")]
        bins: usize,

        /// Differential histogram bin count (0 = adaptive)
        #[arg(long, default_value = "20")]
        diff_bins: usize,

        /// Omit the raw value echo from the output
        #[arg(long)]
        no_raw: bool,

        /// Cap on the number of analyzed samples
        #[arg(long, default_value = "10000")]
        max_points: usize,

        /// Pretty-print the output (default when stdout is a TTY)
        #[arg(long)]
        pretty: bool,
    },

    /// Print only the time-domain HRV metrics
    Hrv {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,
    },

    /// Check sample records against the physiological band
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// JSON array of sample records
    Json,
    /// Newline-delimited JSON (one record per line)
    Ndjson,
}

/// One input record; user identity is assigned per run
#[derive(serde::Deserialize)]
struct SampleRecord {
    value_ms: u32,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    device_id: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let rendered = serde_json::to_string(&CliError::from(e))
                .unwrap_or_else(|_| "Unknown error".to_string());
            eprintln!("{rendered}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), RhythmCliError> {
    match cli.command {
        Commands::Analyze {
            input,
            input_format,
            from,
            to,
            aggregation_minutes,
            trend_window_minutes,
            bins,
            diff_bins,
            no_raw,
            max_points,
            pretty,
        } => {
            let records = read_records(&input, &input_format)?;
            let (samples, user_id) = into_samples(records)?;
            let range = resolve_range(&samples, from, to)?;

            let options = AnalysisOptions {
                aggregation_interval_minutes: aggregation_minutes,
                trend_window_minutes,
                histogram_bins: bins,
                diff_histogram_bins: diff_bins,
                include_raw_data: !no_raw,
                max_data_points: max_points,
                ..Default::default()
            };

            let source = InMemorySource::new(samples);
            let engine = AnalysisEngine::new(&source);
            let result = engine.analyze_complete(user_id, &range, Some(options))?;

            let rendered = if pretty || atty::is(atty::Stream::Stdout) {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string(&result)?
            };
            println!("{rendered}");
            Ok(())
        }

        Commands::Hrv {
            input,
            input_format,
        } => {
            let records = read_records(&input, &input_format)?;
            let (samples, user_id) = into_samples(records)?;
            let range = resolve_range(&samples, None, None)?;

            let source = InMemorySource::new(samples);
            let engine = AnalysisEngine::new(&source);
            let metrics = engine.hrv(user_id, &range)?;

            println!("{}", serde_json::to_string_pretty(&metrics)?);
            Ok(())
        }

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, &input_format, json),
    }
}

fn cmd_validate(
    input: &PathBuf,
    input_format: &InputFormat,
    json: bool,
) -> Result<(), RhythmCliError> {
    let records = read_records(input, input_format)?;

    let out_of_band: Vec<BandViolation> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| !(MIN_VALID_RR_MS..=MAX_VALID_RR_MS).contains(&r.value_ms))
        .map(|(index, r)| BandViolation {
            index,
            value_ms: r.value_ms,
            timestamp: r.timestamp.to_rfc3339(),
        })
        .collect();

    let report = ValidationReport {
        producer: PRODUCER_NAME.to_string(),
        version: RHYTHM_VERSION.to_string(),
        total_records: records.len(),
        valid_records: records.len() - out_of_band.len(),
        invalid_records: out_of_band.len(),
        violations: out_of_band,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Valid records:   {}", report.valid_records);
        println!("Invalid records: {}", report.invalid_records);

        if !report.violations.is_empty() {
            println!();
            println!("Out-of-band values ({MIN_VALID_RR_MS}-{MAX_VALID_RR_MS} ms allowed):");
            for v in &report.violations {
                println!("  - record {} at {}: {} ms", v.index, v.timestamp, v.value_ms);
            }
        }
    }

    if report.invalid_records > 0 {
        Err(RhythmCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

// Helper functions

fn read_records(
    input: &PathBuf,
    format: &InputFormat,
) -> Result<Vec<SampleRecord>, RhythmCliError> {
    let data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let records = match format {
        InputFormat::Json => serde_json::from_str(&data)?,
        InputFormat::Ndjson => {
            let mut records = Vec::new();
            for line in data.lines() {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                records.push(serde_json::from_str(trimmed)?);
            }
            records
        }
    };

    Ok(records)
}

fn into_samples(records: Vec<SampleRecord>) -> Result<(Vec<RrSample>, Uuid), RhythmCliError> {
    if records.is_empty() {
        return Err(RhythmCliError::NoSamples);
    }

    let user_id = Uuid::new_v4();
    let samples = records
        .into_iter()
        .map(|r| RrSample {
            value_ms: r.value_ms,
            timestamp: r.timestamp,
            user_id,
            device_id: r.device_id.unwrap_or_else(|| "unknown".to_string()),
        })
        .collect();

    Ok((samples, user_id))
}

/// Range from flags, falling back to the span of the input samples
fn resolve_range(
    samples: &[RrSample],
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> Result<TimeRange, RhythmCliError> {
    let earliest = samples.iter().map(|s| s.timestamp).min();
    let latest = samples.iter().map(|s| s.timestamp).max();

    match (from.or(earliest), to.or(latest)) {
        (Some(from), Some(to)) => Ok(TimeRange::new(from, to)),
        _ => Err(RhythmCliError::NoSamples),
    }
}

// Error types

#[derive(Debug)]
enum RhythmCliError {
    Io(io::Error),
    Json(serde_json::Error),
    Analysis(AnalysisError),
    NoSamples,
    ValidationFailed(usize),
}

impl From<io::Error> for RhythmCliError {
    fn from(e: io::Error) -> Self {
        RhythmCliError::Io(e)
    }
}

impl From<serde_json::Error> for RhythmCliError {
    fn from(e: serde_json::Error) -> Self {
        RhythmCliError::Json(e)
    }
}

impl From<AnalysisError> for RhythmCliError {
    fn from(e: AnalysisError) -> Self {
        RhythmCliError::Analysis(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<RhythmCliError> for CliError {
    fn from(e: RhythmCliError) -> Self {
        match e {
            RhythmCliError::Io(e) => CliError {
                code: "io_error".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            RhythmCliError::Json(e) => CliError {
                code: "json_error".to_string(),
                message: e.to_string(),
                hint: Some("Records need value_ms and an RFC 3339 timestamp".to_string()),
            },
            RhythmCliError::Analysis(e) => CliError {
                code: e.code().to_string(),
                message: e.to_string(),
                hint: None,
            },
            RhythmCliError::NoSamples => CliError {
                code: "no_samples".to_string(),
                message: "No sample records found in input".to_string(),
                hint: Some("Ensure the input file is not empty".to_string()),
            },
            RhythmCliError::ValidationFailed(count) => CliError {
                code: "validation_failed".to_string(),
                message: format!("{count} records outside the physiological band"),
                hint: Some("Filter out-of-band values before analysis".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    producer: String,
    version: String,
    total_records: usize,
    valid_records: usize,
    invalid_records: usize,
    violations: Vec<BandViolation>,
}

#[derive(serde::Serialize)]
struct BandViolation {
    index: usize,
    value_ms: u32,
    timestamp: String,
}
