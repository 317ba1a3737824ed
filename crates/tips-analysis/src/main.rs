//! CLI entry point for the tipping analysis.

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use tips_analysis::{
    AggregationResult, AnalysisConfig, AnalysisConfigBuilder, AnalysisError, ChartRenderer,
    TableReportBuilder, export_scripts, load_dataset, render_text_report, run_pipeline,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Descriptive statistics, reports and charts for the restaurant tipping dataset",
    long_about = "Descriptive statistics, reports and charts for the restaurant tipping dataset.\n\n\
                  Runs `report` when no subcommand is given.\n\n\
                  EXAMPLES:\n  \
                  # Text report on stdout plus the PDF report\n  \
                  tips-analysis\n\n  \
                  # Results as JSON, no PDF\n  \
                  tips-analysis report --json --no-pdf\n\n  \
                  # All charts in PNG, PDF and SVG\n  \
                  tips-analysis charts --out-dir charts\n\n  \
                  # Export source files to PDF\n  \
                  tips-analysis export-scripts src/main.rs --out-dir reports"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the 14 analysis steps, print the text report and write the PDF report
    Report(ReportArgs),
    /// Render the 10 charts in PNG, PDF and SVG
    Charts(ChartsArgs),
    /// Copy source files verbatim into PDF documents
    ExportScripts(ExportArgs),
    /// `report` followed by `charts`
    All(AllArgs),
}

#[derive(Args, Debug, Default)]
struct ReportArgs {
    /// Path to the tips CSV file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Path of the PDF report
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of rows in the top tip percentage table
    #[arg(long)]
    top_n: Option<usize>,

    /// Skip the PDF report
    #[arg(long)]
    no_pdf: bool,

    /// Print the results as JSON instead of the text report
    ///
    /// Disables all logs so stdout only carries the JSON document.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ChartsArgs {
    /// Path to the tips CSV file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output root; charts go to its png, pdf and svg subdirectories
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Files to export
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Directory receiving the `<stem>_script.pdf` files
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct AllArgs {
    #[command(flatten)]
    report: ReportArgs,

    /// Output root for the charts
    #[arg(long)]
    charts_dir: Option<PathBuf>,
}

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr so the report on stdout stays clean. When `json_output`
/// is true, logging is disabled entirely.
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
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Report(ReportArgs::default()));

    let json_output = match &command {
        Command::Report(args) => args.json,
        Command::All(args) => args.report.json,
        _ => false,
    };
    init_logging(&cli.log_level, cli.quiet, json_output);

    let outcome = match command {
        Command::Report(args) => run_report(&args),
        Command::Charts(args) => run_charts(&args),
        Command::ExportScripts(args) => run_export(&args),
        Command::All(args) => run_report(&args.report).and_then(|_| {
            run_charts(&ChartsArgs {
                input: args.report.input.clone(),
                out_dir: args.charts_dir.clone(),
            })
        }),
    };

    if let Err(err) = outcome {
        if json_output {
            println!("{}", serde_json::to_string_pretty(&json!({ "error": err }))?);
        }
        bail!(err);
    }
    Ok(())
}

fn base_config(input: Option<&PathBuf>) -> AnalysisConfigBuilder {
    let builder = AnalysisConfig::builder();
    match input {
        Some(path) => builder.data_path(path),
        None => builder,
    }
}

fn run_report(args: &ReportArgs) -> std::result::Result<(), AnalysisError> {
    let mut builder = base_config(args.input.as_ref());
    if let Some(path) = &args.output {
        builder = builder.report_path(path);
    }
    if let Some(n) = args.top_n {
        builder = builder.top_n(n);
    }
    let config = builder.build()?;

    let table = load_dataset(&config.data_path)?;
    let results = run_pipeline(&table, &config)?;

    if args.json {
        print_json(&results)?;
    } else {
        // user-facing output, independent of the log level
        println!("{}", render_text_report(&results, config.separator_width)?);
    }

    if args.no_pdf {
        info!("Skipping PDF report");
    } else {
        TableReportBuilder::new(&config.report_path, config.table_font_size).write(&results)?;
    }
    Ok(())
}

fn print_json(results: &[AggregationResult]) -> std::result::Result<(), AnalysisError> {
    let document = json!({ "results": results });
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

fn run_charts(args: &ChartsArgs) -> std::result::Result<(), AnalysisError> {
    let mut builder = base_config(args.input.as_ref());
    if let Some(dir) = &args.out_dir {
        builder = builder.charts_dir(dir);
    }
    let config = builder.build()?;

    let table = load_dataset(&config.data_path)?;
    let rendered = ChartRenderer::new(&config).render_all(&table)?;
    info!("Wrote {} chart files", rendered.iter().map(|c| c.files.len()).sum::<usize>());
    Ok(())
}

fn run_export(args: &ExportArgs) -> std::result::Result<(), AnalysisError> {
    let mut builder = AnalysisConfig::builder();
    if let Some(dir) = &args.out_dir {
        builder = builder.scripts_dir(dir);
    }
    let config = builder.build()?;

    let written = export_scripts(&args.files, &config.scripts_dir)?;
    info!("Exported {} script(s)", written.len());
    Ok(())
}
