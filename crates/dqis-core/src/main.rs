//! CLI entry point for the data quality analyser.

use anyhow::{Result, anyhow};
use clap::Parser;
use dqis_core::{
    Analysis, JsonReport, Pipeline, QualityError, ReportGenerator, ReportView, TablePreview,
    Upload,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Width of the longest bar in the text chart.
const CHART_WIDTH: usize = 40;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "AI-Based Data Quality Intelligence System",
    long_about = "Evaluate the quality of a CSV or Excel dataset: missing values, duplicate rows,\n\
                  isolation-forest anomalies and a composite quality score.\n\n\
                  EXAMPLES:\n  \
                  # Human-readable summary\n  \
                  dqis -i data.csv\n\n  \
                  # Machine-readable output\n  \
                  dqis -i data.xlsx --json\n\n  \
                  # Save data_quality_report.txt into results/\n  \
                  dqis -i data.csv --emit-report -o results/"
)]
struct Args {
    /// Path to the CSV or spreadsheet file to analyse
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for reports
    #[arg(short, long, default_value = "./outputs")]
    output: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all logs; only the final JSON report (or error) is printed.
    #[arg(long)]
    json: bool,

    /// Write data_quality_report.txt and a JSON report to the output directory
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    if !args.input.exists() {
        return Err(anyhow!("Input file not found: {}", args.input.display()));
    }

    let pipeline = build_pipeline(&args)?;
    let upload = Upload::from_path(&args.input)?;

    match pipeline.run(&upload) {
        Ok(analysis) => handle_output(&analysis, &args),
        Err(e) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&e)?);
            } else {
                error!("Analysis failed: {}", e);
            }
            Err(anyhow!(error_exit_message(&e)))
        }
    }
}

fn build_pipeline(args: &Args) -> Result<Pipeline> {
    let mut builder = Pipeline::builder();

    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    Ok(builder.build()?)
}

fn error_exit_message(e: &QualityError) -> String {
    format!("[{}] {}", e.error_code(), e.user_message())
}

fn handle_output(analysis: &Analysis, args: &Args) -> Result<()> {
    let input_name = args.input.display().to_string();
    let json_report = JsonReport::build(&input_name, analysis);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&json_report)?);
        return Ok(());
    }

    if args.emit_report {
        let generator = ReportGenerator::new(&args.output);
        let text_path = generator.write_text_report(&analysis.report)?;
        let json_path = generator.write_json_report(&json_report, &extract_file_stem(&args.input))?;
        info!("Report written to: {}", text_path.display());
        info!("JSON report written to: {}", json_path.display());
    }

    let view = ReportGenerator::build_view(analysis);
    print_human_readable_summary(&input_name, analysis, &view);

    Ok(())
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn print_preview(preview: &TablePreview) {
    const CELL: usize = 14;

    let line = |cells: &[String]| {
        cells
            .iter()
            .map(|c| format!("{:<width$}", truncate_str(c, CELL), width = CELL))
            .collect::<Vec<_>>()
            .join(" ")
    };

    println!("{}", line(&preview.columns));
    println!("{}", "-".repeat((CELL + 1) * preview.columns.len().max(1)));
    for row in &preview.rows {
        println!("{}", line(row));
    }
    println!(
        "({} rows x {} columns)",
        preview.total_rows, preview.total_columns
    );
}

/// Print a human-readable summary of one run.
///
/// This is the default output when `--json` is not given.
fn print_human_readable_summary(input: &str, analysis: &Analysis, view: &ReportView) {
    println!();
    println!("{}", "=".repeat(80));
    println!("AI-Based Data Quality Intelligence System");
    println!("{}", "=".repeat(80));
    println!();

    println!("Dataset Preview: {}", input);
    print_preview(&analysis.preview);
    println!();

    println!("Data Quality Report:");
    println!("  Missing Values: {}", view.missing_values);
    println!("  Duplicate Rows: {}", view.duplicate_rows);
    println!("  Anomalies Detected: {}", view.anomalies);
    println!();

    println!("Quality Score Analysis:");
    println!("  {}", view.verdict);
    println!();

    println!("{}:", view.chart.title);
    for bar in &view.chart.bars {
        let width = (bar.height_percent / 100.0 * CHART_WIDTH as f64).round() as usize;
        println!("  {:<8} {:<w$} {}", bar.label, "#".repeat(width), bar.count, w = CHART_WIDTH);
    }
    println!();

    if !analysis.cleaning.actions.is_empty() {
        println!("Actions Taken:");
        for action in &analysis.cleaning.actions {
            println!("  - {}", action);
        }
        println!();
    }

    println!("Numeric columns analysed: {}", view.numeric_columns.join(", "));
    println!("Duration: {}ms", analysis.duration_ms);
    println!();
    println!("Use --json for machine-readable output");
    println!("Use --emit-report to save {}", view.download.file_name);
    println!("{}", "=".repeat(80));
}
