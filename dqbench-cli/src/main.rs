// DQBench CLI - Command-line interface
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # DQBench CLI
//!
//! Command-line interface for data-quality benchmarking of sensor streams.
//!
//! ## Usage
//!
//! ```bash
//! # Score a prepared stream and reconcile against an engine's output
//! dqbench score sensor_7_processed.csv --reference engine_scores.csv
//!
//! # Degrade a clean stream with the default fault profile
//! dqbench prepare sensor_7_original.csv -o sensor_7_processed.csv
//!
//! # Latency/throughput from engine interval logs
//! dqbench bench run_10k.csv run_50k.csv
//! ```

mod config;
mod stats;

use clap::{Parser, Subcommand};
use config::BenchConfig;
use dqbench::{
    compare_scores, read_reference_file, score_file, summarize_runs, write_scores, QualityConfig,
};
use dqbench_testdata::{degrade_file, write_records_csv, StreamConfig};
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// DQBench: data-quality scoring and benchmarking for sensor streams
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (JSON); defaults are used when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score a stream per window and optionally reconcile against a reference
    Score {
        /// Input CSV stream
        input: PathBuf,
        /// Write the score series here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override the configured window size
        #[arg(short, long)]
        window_size: Option<usize>,
        /// Override the configured volatility (ms)
        #[arg(short, long)]
        volatility: Option<i64>,
        /// Reference score table to reconcile against
        #[arg(short, long)]
        reference: Option<PathBuf>,
        /// Reconciliation tolerance
        #[arg(short, long, default_value_t = dqbench::DEFAULT_TOLERANCE)]
        tolerance: f64,
    },

    /// Generate a clean synthetic stream
    Generate {
        /// Output CSV file
        output: PathBuf,
        /// Number of rows
        #[arg(short, long, default_value = "100000")]
        rows: usize,
        /// Sensor identifier
        #[arg(short, long, default_value = "sensor_1")]
        sensor_id: String,
        /// Interval between rows (ms)
        #[arg(short, long, default_value = "1000")]
        interval_ms: i64,
        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Degrade a clean stream with the configured fault profile
    Prepare {
        /// Input CSV stream
        input: PathBuf,
        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,
        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Split a multi-sensor CSV into per-sensor files
    Split {
        /// Input CSV file
        input: PathBuf,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Extract the first N days of a sensor file
    Extract {
        /// Input CSV file
        input: PathBuf,
        /// Number of days to keep
        #[arg(short, long, default_value = "7")]
        days: u32,
        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Check that value_id and timestamp are strictly increasing
    Check {
        /// Input CSV file
        input: PathBuf,
    },

    /// Normalize datetime timestamps to epoch milliseconds
    Normalize {
        /// Input CSV file
        input: PathBuf,
        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Latency and throughput from engine interval logs
    Bench {
        /// Interval-log CSV files
        files: Vec<PathBuf>,
    },

    /// Column statistics over a dataset file
    Stats {
        /// Input CSV file
        input: PathBuf,
        /// Column to analyze
        #[arg(long, default_value = "value")]
        column: String,
        /// Number of top values to show
        #[arg(long, default_value = "20")]
        top: usize,
    },
}

fn main() {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run(args) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = BenchConfig::load_or_default(args.config.as_deref())?;

    match args.command {
        Command::Score {
            input,
            output,
            window_size,
            volatility,
            reference,
            tolerance,
        } => {
            let quality = QualityConfig::new(
                window_size.unwrap_or(config.quality.window_size),
                volatility.unwrap_or(config.quality.volatility),
            )?;
            info!(
                "scoring {} (window_size={}, volatility={}ms)",
                input.display(),
                quality.window_size,
                quality.volatility
            );

            let scores = score_file(&input, &quality)?;
            info!("scored {} windows", scores.len());

            match output {
                Some(path) => {
                    let file = std::fs::File::create(&path)?;
                    write_scores(file, &scores)?;
                    info!("score series written to {}", path.display());
                }
                None => write_scores(std::io::stdout().lock(), &scores)?,
            }

            if let Some(reference_path) = reference {
                let reference = read_reference_file(&reference_path)?;
                let report = compare_scores(&scores, &reference, tolerance)?;
                if report.passed() {
                    println!(
                        "reconciliation passed: {} windows within tolerance {}",
                        report.windows_compared, report.tolerance
                    );
                } else {
                    println!(
                        "found {} mismatched windows (tolerance {}):",
                        report.mismatches.len(),
                        report.tolerance
                    );
                    println!("Window,Value_Start,Value_End,Accuracy,Completeness,Timeliness");
                    for row in &report.mismatches {
                        println!(
                            "{},{:.6},{:.6},{:.6},{:.6},{:.6}",
                            row.window,
                            row.value_start,
                            row.value_end,
                            row.accuracy,
                            row.completeness,
                            row.timeliness
                        );
                    }
                    std::process::exit(2);
                }
            }
        }

        Command::Generate {
            output,
            rows,
            sensor_id,
            interval_ms,
            seed,
        } => {
            let mut stream = StreamConfig::new(sensor_id)
                .with_num_rows(rows)
                .with_interval_ms(interval_ms);
            if let Some(seed) = seed {
                stream = stream.with_seed(seed);
            }
            let records = stream.generate();
            let file = std::fs::File::create(&output)?;
            write_records_csv(file, &records)?;
            info!("generated {} rows into {}", records.len(), output.display());
        }

        Command::Prepare {
            input,
            output,
            seed,
        } => {
            info!(
                "degrading {} (deviation={}, outliers={}x{}, missing={}, validity={}ms, outdated={})",
                input.display(),
                config.faults.deviation,
                config.faults.outlier_percentage,
                config.faults.outlier_factor,
                config.faults.missing_percentage,
                config.faults.validity_period,
                config.faults.outdated_percentage
            );
            let total = degrade_file(&input, &output, &config.faults, config.chunk_size, seed)?;
            info!("processed {total} rows into {}", output.display());
        }

        Command::Split { input, output_dir } => {
            let paths = dqbench_prep::split_by_sensor(&input, &output_dir)?;
            info!("wrote {} sensor files to {}", paths.len(), output_dir.display());
        }

        Command::Extract {
            input,
            days,
            output,
        } => {
            let kept = dqbench_prep::extract_first_days(&input, days, &output)?;
            info!("extracted {kept} rows into {}", output.display());
        }

        Command::Check { input } => {
            let report = dqbench_prep::check_consistency(&input)?;
            if report.is_consistent() {
                println!("{} rows checked, ordering consistent", report.total_rows);
            } else {
                println!(
                    "{} rows checked: {} value_id violations, {} timestamp violations",
                    report.total_rows, report.value_id_violations, report.timestamp_violations
                );
                println!("Row,Column,Value,Previous");
                for v in &report.violations {
                    println!("{},{},{},{}", v.row, v.column, v.value, v.previous);
                }
                std::process::exit(2);
            }
        }

        Command::Normalize { input, output } => {
            let total = dqbench_prep::normalize_timestamps(&input, &output)?;
            info!("normalized {total} rows into {}", output.display());
        }

        Command::Bench { files } => {
            let summaries = summarize_runs(&files);
            if summaries.is_empty() {
                return Err("no interval logs could be measured".into());
            }
            println!("File,Records,Average Latency (ms),Throughput (windows/sec)");
            for summary in &summaries {
                println!(
                    "{},{},{:.4},{:.4}",
                    summary.label,
                    summary.total_records,
                    summary.avg_latency_ms,
                    summary.throughput_per_sec
                );
            }
        }

        Command::Stats { input, column, top } => {
            let stats = stats::column_stats(&input, &column, top)?;
            println!("column: {}", stats.column);
            println!("total rows: {}", stats.total_rows);
            println!("unique values: {}", stats.unique_values);
            if let (Some(min), Some(max)) = (stats.min, stats.max) {
                println!("min: {min}");
                println!("max: {max}");
            }
            println!("top values:");
            for (value, count) in &stats.top_values {
                let label = if value.is_empty() { "<empty>" } else { value };
                println!("  {label}: {count}");
            }
        }
    }

    Ok(())
}
