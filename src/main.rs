mod render;
mod sources;

use analytics::{AnalyticsEngine, aggregate, bollinger_bands, clean, drawdown};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use configuration::{Config, init_logging, load_config};
use core_types::{Granularity, TimeSeries};
use sources::Source;
use std::path::{Path, PathBuf};

/// The main entry point for the Tidemark analytics tool.
#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(2);
        }
    };

    // The guard flushes the log file on drop, so it lives until main returns.
    let _log_guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(cli.command, &config).await {
        // The stderr layer prints this; the file layer keeps a copy when enabled.
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Return, rolling-statistics and drawdown analytics for a daily index price series.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (default: ./config.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute every derived series and print a summary.
    Report(PriceArgs),
    /// Print period-over-period returns.
    Returns {
        #[command(flatten)]
        prices: PriceArgs,

        /// Period length: "month" or "year".
        #[arg(long, default_value = "month")]
        granularity: Granularity,
    },
    /// Print the running maximum and drawdown from it.
    Drawdown(PriceArgs),
    /// Print Bollinger bands around the trailing moving average.
    Bands(PriceArgs),
    /// Align the buy-and-hold and strategy equity curves on shared dates.
    Compare(CompareArgs),
}

#[derive(Args)]
struct PriceArgs {
    /// Read prices from an `observation_date,close` CSV file instead of PostgreSQL.
    #[arg(long)]
    csv: Option<PathBuf>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct CompareArgs {
    /// Read the buy-and-hold curve from an `observation_date,equity` CSV file.
    #[arg(long)]
    benchmark_csv: Option<PathBuf>,

    /// Read the strategy curve from an `observation_date,equity` CSV file.
    #[arg(long)]
    strategy_csv: Option<PathBuf>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct OutputArgs {
    /// Emit JSON for a charting tool instead of a table.
    #[arg(long)]
    json: bool,

    /// Number of most recent rows to print in tables (0 prints all).
    #[arg(long, default_value_t = 20)]
    tail: usize,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn run(command: Commands, config: &Config) -> anyhow::Result<()> {
    let settings = &config.analysis;

    match command {
        Commands::Report(args) => {
            let source = Source::from_flag(args.csv.as_deref());
            let raw = sources::load_prices(source, &config.database).await?;
            let report = AnalyticsEngine::new(settings.clone())
                .analyze(&raw)
                .context("Failed to clean the price series")?;

            if args.output.json {
                print_json(&render::report_json(&report))?;
            } else {
                println!("{}", render::report_table(&report));
            }
        }
        Commands::Returns { prices, granularity } => {
            let close = load_close(prices.csv.as_deref(), config).await?;
            let returns = aggregate(&close, granularity)
                .with_context(|| format!("Failed to compute {} returns", granularity.label()))?;

            if prices.output.json {
                print_json(&render::returns_json(&returns))?;
            } else {
                println!("{}", render::returns_table(granularity, &returns));
            }
        }
        Commands::Drawdown(args) => {
            let close = load_close(args.csv.as_deref(), config).await?;
            let dd = drawdown(&close).context("Failed to compute drawdown")?;

            if args.output.json {
                print_json(&render::drawdown_json(&dd))?;
            } else {
                println!("{}", render::drawdown_table(&close, &dd, args.output.tail));
            }
        }
        Commands::Bands(args) => {
            let close = load_close(args.csv.as_deref(), config).await?;
            let bands = bollinger_bands(&close, settings.bollinger.window, settings.bollinger.k)
                .context("Failed to compute Bollinger bands")?;

            if args.output.json {
                print_json(&render::bands_json(&bands))?;
            } else {
                println!("{}", render::bands_table(&close, &bands, args.output.tail));
            }
        }
        Commands::Compare(args) => {
            let (benchmark, strategy) = sources::load_equity_curves(
                Source::from_flag(args.benchmark_csv.as_deref()),
                Source::from_flag(args.strategy_csv.as_deref()),
                &config.database,
            )
            .await?;
            let pair = AnalyticsEngine::new(settings.clone()).compare(&benchmark, &strategy);

            if args.output.json {
                print_json(&render::compare_json(&pair))?;
            } else {
                println!("{}", render::compare_table(&pair, args.output.tail));
            }
        }
    }

    Ok(())
}

/// Loads prices and applies the missing-data policy.
async fn load_close(csv: Option<&Path>, config: &Config) -> anyhow::Result<TimeSeries> {
    let raw = sources::load_prices(Source::from_flag(csv), &config.database).await?;
    Ok(clean(&raw)?)
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_returns_granularity_parses() {
        let cli = Cli::try_parse_from([
            "tidemark",
            "returns",
            "--granularity",
            "year",
            "--csv",
            "prices.csv",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Commands::Returns { prices, granularity } => {
                assert_eq!(granularity, Granularity::Year);
                assert!(prices.output.json);
                assert_eq!(prices.csv, Some(PathBuf::from("prices.csv")));
            }
            _ => panic!("expected the returns command"),
        }
    }

    #[test]
    fn test_unknown_granularity_is_rejected() {
        assert!(Cli::try_parse_from(["tidemark", "returns", "--granularity", "week"]).is_err());
    }
}
