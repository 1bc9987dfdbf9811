use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cbr_report::config::Settings;
use cbr_report::display::{format_run_summary, format_window};
use cbr_report::handler::{handler, EnvContext};
use cbr_report::models::ReportWindow;
use cbr_report::services::ReportPipeline;

#[derive(Parser)]
#[command(
    name = "cbr-report",
    version,
    about = "Daily backup operation-log reports, one spreadsheet per vault",
    long_about = "Fetches yesterday's backup operation logs, renders one \
                  spreadsheet per configured vault and emails it to that \
                  vault's distribution list."
)]
struct Cli {
    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and send the reports
    Run(RunArgs),

    /// Show the time window a run would report on
    Window {
        /// Reported day (YYYY-MM-DD); defaults to yesterday
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Render reports without emailing them
    #[arg(long)]
    dry_run: bool,

    /// Reported day (YYYY-MM-DD); defaults to yesterday
    #[arg(short, long)]
    date: Option<NaiveDate>,

    #[command(flatten)]
    settings: Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_logging(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn report_window(date: Option<NaiveDate>) -> ReportWindow {
    match date {
        Some(day) => ReportWindow::for_day(day),
        None => ReportWindow::yesterday(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Window { date } => {
            println!("{}", format_window(&report_window(date)));
            Ok(())
        }
    }
}

fn run(args: RunArgs) -> Result<()> {
    let window = report_window(args.date);
    let pipeline = ReportPipeline::from_settings(&args.settings, args.dry_run)
        .context("Failed to set up report pipeline")?;

    let event = json!({ "trigger_type": "CLI", "dry_run": args.dry_run });
    let mut outcome = None;

    let summary = handler(&pipeline, &event, &EnvContext, &window, |err, result| {
        outcome = Some(match err {
            Some(e) => Err(e),
            None => Ok(result.unwrap_or_default()),
        });
    });

    if let Some(summary) = summary {
        println!("{}", format_run_summary(&summary));
    }

    match outcome {
        Some(Ok(message)) => {
            println!("{}", message);
            Ok(())
        }
        Some(Err(e)) => Err(e).context("Report run failed"),
        None => anyhow::bail!("Handler finished without reporting an outcome"),
    }
}
