use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod analyze;
mod batch;

#[derive(Debug, Parser)]
#[command(name = "sourcing_worker")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score one product from its stored payload and print the report.
    Analyze {
        #[arg(long)]
        identifier: String,

        /// Landed buy cost per unit, in dollars.
        #[arg(long)]
        buy_cost: f64,

        /// Marketplace and fulfillment fees per unit, in dollars.
        #[arg(long, default_value_t = 0.0)]
        fees: f64,

        /// Override the sale price read from live offers.
        #[arg(long)]
        sale_price: Option<f64>,

        /// JSON array of earlier sightings of this product.
        #[arg(long)]
        sightings: Option<PathBuf>,
    },

    /// Classify a batch of sightings and print counts and a shortlist.
    Classify {
        #[arg(long)]
        batch: PathBuf,

        /// Shortlist size; defaults to the scoring config.
        #[arg(long)]
        top_n: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = sourcing_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    let run_id = uuid::Uuid::new_v4();
    let now = chrono::Utc::now();

    let result = run(&settings, args.command, now).await;
    match result {
        Ok(output) => {
            tracing::info!(%run_id, "run finished");
            println!("{output}");
            Ok(())
        }
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(%run_id, error = %format!("{err:#}"), "run failed");
            Err(err)
        }
    }
}

async fn run(
    settings: &sourcing_core::config::Settings,
    command: Command,
    now: chrono::DateTime<chrono::Utc>,
) -> anyhow::Result<String> {
    let cfg = settings.load_scoring_config()?;

    match command {
        Command::Analyze {
            identifier,
            buy_cost,
            fees,
            sale_price,
            sightings,
        } => {
            let opts = analyze::AnalyzeOptions {
                identifier,
                buy_cost,
                fees,
                sale_price,
                sightings,
            };
            let report = analyze::run(settings, &cfg, &opts, now).await?;
            Ok(serde_json::to_string_pretty(&report)?)
        }
        Command::Classify {
            batch: batch_path,
            top_n,
        } => {
            let out = batch::run(&cfg, &batch_path, top_n).await?;
            tracing::info!(summary = %out.summary, "batch classified");
            Ok(serde_json::to_string_pretty(&out)?)
        }
    }
}

fn init_sentry(settings: &sourcing_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_analyze_flags() {
        let args = Args::try_parse_from([
            "sourcing_worker",
            "analyze",
            "--identifier",
            "B0TEST",
            "--buy-cost",
            "12.5",
            "--sale-price",
            "30",
        ])
        .unwrap();
        match args.command {
            Command::Analyze {
                identifier,
                buy_cost,
                fees,
                sale_price,
                sightings,
            } => {
                assert_eq!(identifier, "B0TEST");
                assert_eq!(buy_cost, 12.5);
                assert_eq!(fees, 0.0);
                assert_eq!(sale_price, Some(30.0));
                assert!(sightings.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn classify_requires_batch() {
        assert!(Args::try_parse_from(["sourcing_worker", "classify"]).is_err());
    }
}
