use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use recat_cli::config::{AppConfig, DEFAULT_CONFIG_FILE};
use recat_cli::report::{self, ReportFormat};
use recat_cli::{app, logging};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Periodic recategorization of simplified-regime taxpayers.
///
/// Reads the bracket, fee component and taxpayer tables of a period from the
/// configured source, resolves each taxpayer's bracket and prices the monthly
/// fee.
#[derive(Debug, Parser)]
#[command(name = "recat", version, about, long_about = None)]
struct Cli {
    /// Configuration file. Defaults to `recat.toml` when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the period CSV tables; overrides `source.location`.
    #[arg(long, global = true)]
    source_dir: Option<String>,

    /// Log level or filter directive; overrides `logging.level`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Recategorize every taxpayer of a period and print the report.
    Run {
        #[arg(long)]
        period: String,

        #[arg(long, value_enum, default_value_t = ReportFormat::Table)]
        format: ReportFormat,

        /// Write the report here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Check a period's tables; exits non-zero when issues are found.
    Validate {
        #[arg(long)]
        period: String,
    },
    /// List the periods available in the source.
    Periods,
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_or_default(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    if let Some(dir) = &cli.source_dir {
        config.source.location = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    Ok(config)
}

fn write_report(
    report: &recat_core::calculations::BatchReport,
    format: ReportFormat,
    mut out: impl Write,
) -> anyhow::Result<()> {
    match format {
        ReportFormat::Table => {
            let table = report::render_table(report).context("failed to render report")?;
            out.write_all(table.as_bytes()).context("failed to write report")?
        }
        ReportFormat::Csv => report::write_csv(report, &mut out).context("failed to write CSV")?,
    }
    out.flush().context("failed to write report")
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    logging::init_logging(&config.logging)?;

    debug!(
        backend = %config.source.backend,
        location = %config.source.location,
        "opening period source"
    );
    let registry = app::build_registry();
    let repo = registry
        .create(&config.source)
        .await
        .with_context(|| format!("failed to open source '{}'", config.source.location))?;

    match cli.command {
        Command::Run {
            period,
            format,
            output,
        } => {
            let report = app::run_period(&*repo, &period)
                .await
                .with_context(|| format!("failed to recategorize period {period}"))?;
            match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("cannot create {}", path.display()))?;
                    write_report(&report, format, io::BufWriter::new(file))?;
                    info!(path = %path.display(), "report written");
                }
                None => write_report(&report, format, io::stdout().lock())?,
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate { period } => {
            let issues = app::validate_period(&*repo, &period)
                .await
                .with_context(|| format!("failed to validate period {period}"))?;
            if issues.is_empty() {
                println!("Period {period}: no configuration issues");
                return Ok(ExitCode::SUCCESS);
            }
            println!("Period {period}: {} configuration issue(s)", issues.len());
            for issue in &issues {
                println!("  {issue}");
            }
            Ok(ExitCode::FAILURE)
        }
        Command::Periods => {
            let periods = repo.list_periods().await.context("failed to list periods")?;
            for period in periods {
                println!("{period}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
