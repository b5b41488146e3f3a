use analytics::{ReturnsAnalyzer, StatsReport};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use configuration::settings::Config;
use configuration::{load_config, ConfigOverrides};
use core_types::{Frequency, LabeledFrame, Param};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod input;

/// The main entry point for the returnlens command-line tool.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_deref())?;

    let mut config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Stats(args) => handle_stats(args, &mut config),
        Commands::Curve(args) => handle_curve(args, &config),
        Commands::Dsr(args) => handle_dsr(args, &mut config),
    }
}

/// Installs the global subscriber. Logs go to stderr, or to `log_file` when given.
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path.file_name().context("--log-file must name a file")?;
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber).context("Failed to set global default subscriber")?;
            Ok(Some(guard))
        }
        None => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber).context("Failed to set global default subscriber")?;
            Ok(None)
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Performance and risk metrics for return series.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to ./config.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the performance summary of every column.
    Stats(StatsArgs),
    /// Print the cumulative-return or drawdown curve.
    Curve(CurveArgs),
    /// Print the deflated Sharpe ratio of every column, treating columns as trials.
    Dsr(DsrArgs),
}

#[derive(Parser)]
struct InputArgs {
    /// JSON file with the returns: {"index": [...] | null, "columns": {"name": [...]}}.
    #[arg(long)]
    returns: PathBuf,

    /// Sampling frequency of the rows (e.g. "1d", "4h"). Inferred from the index when omitted.
    #[arg(long)]
    freq: Option<Frequency>,

    /// Treat the columns as prices and convert them to simple returns.
    #[arg(long)]
    prices: bool,
}

#[derive(Parser)]
struct StatsArgs {
    #[command(flatten)]
    input: InputArgs,

    /// JSON file with one benchmark column, or one per return column.
    #[arg(long)]
    benchmark: Option<PathBuf>,

    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    overrides: ConfigOverrides,
}

#[derive(Clone, Copy, ValueEnum)]
enum CurveKind {
    Cumulative,
    Drawdown,
}

#[derive(Parser)]
struct CurveArgs {
    #[command(flatten)]
    input: InputArgs,

    #[arg(long, value_enum, default_value_t = CurveKind::Cumulative)]
    kind: CurveKind,

    /// Starting value of the cumulative curve; 0 gives plain cumulative returns.
    #[arg(long, default_value_t = 0.0)]
    start_value: f64,
}

#[derive(Parser)]
struct DsrArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Variance of the Sharpe ratio across trials; estimated from the columns when omitted.
    #[arg(long)]
    var_sharpe: Option<f64>,

    #[command(flatten)]
    overrides: ConfigOverrides,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_stats(args: StatsArgs, config: &mut Config) -> Result<()> {
    config.returns.apply(&args.overrides);
    config.returns.validate()?;

    let frame = input::load_returns(&args.input.returns, args.input.freq, args.input.prices)?;
    let benchmark = args.benchmark.as_deref().map(input::load_benchmark).transpose()?;

    let analyzer = ReturnsAnalyzer::new(&frame, config.returns.clone());
    let report = analyzer
        .stats(benchmark.as_ref().map(|b| b.view()))
        .context("Failed to calculate performance stats")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", stats_table(&report));
    }
    Ok(())
}

fn handle_curve(args: CurveArgs, config: &Config) -> Result<()> {
    let frame = input::load_returns(&args.input.returns, args.input.freq, args.input.prices)?;
    let analyzer = ReturnsAnalyzer::new(&frame, config.returns.clone());

    let curve = match args.kind {
        CurveKind::Cumulative => analyzer.cumulative(Some(&Param::Scalar(args.start_value)))?,
        CurveKind::Drawdown => analyzer.drawdown()?,
    };
    println!("{}", curve_table(&curve));
    Ok(())
}

fn handle_dsr(args: DsrArgs, config: &mut Config) -> Result<()> {
    config.returns.apply(&args.overrides);
    config.returns.validate()?;

    let frame = input::load_returns(&args.input.returns, args.input.freq, args.input.prices)?;
    let analyzer = ReturnsAnalyzer::new(&frame, config.returns.clone());
    let dsr = analyzer
        .deflated_sharpe_ratio(None, args.var_sharpe)
        .context("Failed to calculate the deflated Sharpe ratio")?;
    let sharpe = analyzer.sharpe_ratio(None)?;

    let mut table = new_table();
    table.set_header(vec!["Column", "Sharpe Ratio", "Deflated Sharpe Ratio"]);
    for ((name, dsr), sharpe) in dsr.iter().zip(sharpe.values.iter()) {
        table.add_row(vec![name.to_string(), format!("{:.4}", sharpe), format!("{:.4}", dsr)]);
    }
    println!("{}", table);
    Ok(())
}

// ==============================================================================
// Output
// ==============================================================================

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// One row per metric, one column per series.
fn stats_table(report: &StatsReport) -> Table {
    let columns = report.columns();
    let mut table = new_table();
    let mut header = vec!["Metric".to_string()];
    header.extend(columns.iter().map(|s| s.column.clone()));
    table.set_header(header);

    let rendered: Vec<Vec<(&str, String)>> = columns.iter().map(|s| s.rows()).collect();
    if let Some(first) = rendered.first() {
        for (i, (label, _)) in first.iter().enumerate() {
            let mut row = vec![label.to_string()];
            row.extend(rendered.iter().map(|r| r[i].1.clone()));
            table.add_row(row);
        }
    }
    table
}

fn curve_table(curve: &LabeledFrame) -> Table {
    let mut table = new_table();
    let mut header = vec!["Index".to_string()];
    header.extend(curve.columns.iter().cloned());
    table.set_header(header);

    for (i, row) in curve.values.outer_iter().enumerate() {
        let mut cells = vec![curve.index.label(i).unwrap_or_default()];
        cells.extend(row.iter().map(|v| format!("{:.6}", v)));
        table.add_row(cells);
    }
    table
}
