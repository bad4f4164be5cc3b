use analytics::{ComparativeAnalyzer, MetricsCalculator, QuarterlyAnalysis, ReportPlan};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use configuration::{Config, OutputFormat};
use core_types::{DateWindow, MetricField, Table};
use std::path::{Path, PathBuf};

mod report;

use report::WindowReport;

/// The main entry point for the quarterly sales report.
fn main() -> Result<()> {
    // A missing .env file is fine; it only carries optional overrides.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = configuration::load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    let _log_guard = configuration::init_tracing(&config.logging)?;

    match cli.command {
        Commands::Report(args) => handle_report(args, &config),
        Commands::Window(args) => handle_window(args, &config),
        Commands::Compare(args) => handle_compare(args, &config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Quarterly retail-performance metrics from a transaction export.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the full quarterly report (current quarter, QoQ, YoY, rankings, seasonality).
    Report(ReportArgs),
    /// Compute the metrics bundle and breakdowns for an ad-hoc date window.
    Window(WindowArgs),
    /// Compare one metric between two ad-hoc date windows.
    Compare(CompareArgs),
}

/// Options shared by every command.
#[derive(Args)]
struct OutputArgs {
    /// Transaction CSV to read instead of `data.path` from the config.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Output format; defaults to `report.format` from the config.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Write the rendered report here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct ReportArgs {
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct WindowArgs {
    /// First day of the window (format: YYYY-MM-DD), inclusive.
    #[arg(long)]
    from: NaiveDate,

    /// Last day of the window (format: YYYY-MM-DD), inclusive.
    #[arg(long)]
    to: NaiveDate,

    /// Day custom week 1 starts on; defaults to `report.custom_epoch`.
    #[arg(long)]
    epoch: Option<NaiveDate>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct CompareArgs {
    #[arg(long)]
    current_from: NaiveDate,

    #[arg(long)]
    current_to: NaiveDate,

    #[arg(long)]
    baseline_from: NaiveDate,

    #[arg(long)]
    baseline_to: NaiveDate,

    /// Metric to compare (sales, transaction_count, aov, total_quantity).
    #[arg(long)]
    field: Option<MetricField>,

    #[command(flatten)]
    output: OutputArgs,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_report(args: ReportArgs, config: &Config) -> Result<()> {
    let table = load_table(args.output.data.as_deref(), config)?;
    let plan = ReportPlan {
        windows: config.report.windows.resolve()?,
        custom_epoch: config.report.custom_epoch,
        compare_field: config.report.compare_field,
        top_n: config.report.top_n,
    };
    tracing::info!(current = %plan.windows.current, "Building quarterly report.");

    let summary = QuarterlyAnalysis::new(plan)
        .run(&table)
        .context("Quarterly analysis failed")?;

    let rendered = match resolve_format(&args.output, config) {
        OutputFormat::Text => report::render_summary(&summary),
        OutputFormat::Json => serde_json::to_string_pretty(&summary)?,
    };
    emit(&rendered, args.output.output.as_deref())
}

fn handle_window(args: WindowArgs, config: &Config) -> Result<()> {
    let window = DateWindow::new(args.from, args.to)?;
    let table = load_table(args.output.data.as_deref(), config)?;
    let epoch = args.epoch.unwrap_or(config.report.custom_epoch);

    let window_report = WindowReport::build(&table, window, epoch, &MetricsCalculator::new())
        .context("Window analysis failed")?;

    let rendered = match resolve_format(&args.output, config) {
        OutputFormat::Text => report::render_window(&window_report),
        OutputFormat::Json => serde_json::to_string_pretty(&window_report)?,
    };
    emit(&rendered, args.output.output.as_deref())
}

fn handle_compare(args: CompareArgs, config: &Config) -> Result<()> {
    let current_window = DateWindow::new(args.current_from, args.current_to)?;
    let baseline_window = DateWindow::new(args.baseline_from, args.baseline_to)?;
    let table = load_table(args.output.data.as_deref(), config)?;

    let calculator = MetricsCalculator::new();
    let current = calculator.compute(&analytics::select(&table, &current_window))?;
    let baseline = calculator.compute(&analytics::select(&table, &baseline_window))?;

    let field = args.field.unwrap_or(config.report.compare_field);
    let result = ComparativeAnalyzer::new(field)
        .compare(&current, &baseline)
        .with_context(|| format!("Cannot compare '{}' between these windows", field))?;

    let rendered = match resolve_format(&args.output, config) {
        OutputFormat::Text => report::render_comparison(&current_window, &baseline_window, &result),
        OutputFormat::Json => serde_json::to_string_pretty(&result)?,
    };
    emit(&rendered, args.output.output.as_deref())
}

fn load_table(override_path: Option<&Path>, config: &Config) -> Result<Table> {
    let path = override_path.unwrap_or(&config.data.path);
    ingest::load_transactions_file(path)
        .with_context(|| format!("Failed to load transactions from {}", path.display()))
}

fn resolve_format(args: &OutputArgs, config: &Config) -> OutputFormat {
    args.format.unwrap_or(config.report.format)
}

fn emit(rendered: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            tracing::info!(path = %path.display(), "Report written.");
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
