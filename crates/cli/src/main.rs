use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use memo_core::chart::ChartPeriod;
use memo_core::domain::report::MemoReport;
use memo_core::memo::{MemoRequest, MemoService};
use memo_core::render::render;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod chart;

#[derive(Debug, Parser)]
#[command(name = "memo", about = "Generate and render company research memos")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the full pipeline for one company.
    Generate {
        /// Company name or ticker.
        #[arg(long)]
        company: String,

        /// Exchange hint; "NSE" prefers .NS listings.
        #[arg(long)]
        exchange: Option<String>,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Render a saved report (the `data` object of the API response).
    Render {
        #[arg(long)]
        input: PathBuf,

        #[arg(long, value_enum, default_value_t = Format::Html)]
        format: Format,

        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print a synthetic price series for one period of a saved report.
    Chart {
        #[arg(long)]
        input: PathBuf,

        /// 1Y, 3Y or 5Y.
        #[arg(long, default_value = "1Y")]
        period: ChartPeriod,

        /// Seed the noise for a reproducible series.
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Html,
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = memo_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    match args.command {
        Command::Generate {
            company,
            exchange,
            format,
            output,
        } => {
            let service = MemoService::from_settings(&settings)?;
            let report = match service.generate(MemoRequest::new(company, exchange)).await {
                Ok(report) => report,
                Err(err) => {
                    let err = anyhow::Error::new(err);
                    sentry_anyhow::capture_anyhow(&err);
                    tracing::error!(error = %err, "memo generation failed");
                    return Err(err);
                }
            };
            tracing::info!(symbol = %report.company.symbol, ?format, "writing memo");
            emit(&format_report(&report, format)?, output.as_deref())?;
        }
        Command::Render {
            input,
            format,
            output,
        } => {
            let report = read_report(&input)?;
            emit(&format_report(&report, format)?, output.as_deref())?;
        }
        Command::Chart {
            input,
            period,
            seed,
            json,
        } => {
            let report = read_report(&input)?;
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let today = chrono::Local::now().date_naive();
            let out = chart::chart_output(&report, period, today, &mut rng, json)?;
            emit(&out, None)?;
        }
    }

    Ok(())
}

fn format_report(report: &MemoReport, format: Format) -> anyhow::Result<String> {
    Ok(match format {
        Format::Html => render(report).to_html(),
        Format::Text => render(report).to_plain_text(),
        Format::Json => serde_json::to_string_pretty(report).context("failed to serialize report")?,
    })
}

fn read_report(path: &Path) -> anyhow::Result<MemoReport> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_report(&text).with_context(|| format!("{} is not a memo report", path.display()))
}

/// Accepts either a bare report or a full `{success, data}` API response.
fn parse_report(text: &str) -> anyhow::Result<MemoReport> {
    let value = serde_json::from_str::<serde_json::Value>(text)?;
    let value = match value.get("data") {
        Some(data) if value.get("success").is_some() => data.clone(),
        _ => value,
    };
    Ok(serde_json::from_value(value)?)
}

fn emit(content: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote output");
        }
        None => println!("{content}"),
    }
    Ok(())
}

fn init_sentry(settings: &memo_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
