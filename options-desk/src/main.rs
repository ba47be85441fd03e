//! Options desk CLI
//!
//! Runs the analytics library over CSV inputs.
//!
//! # Usage
//!
//! ```bash
//! # Backtest the SMA crossover on a date,close file
//! options-desk backtest --prices data/aapl.csv
//!
//! # Greeks and position risk for one option
//! options-desk greeks --spot 180 --strike 185 --days 30 --iv 0.28 --premium 3.4 --type call
//!
//! # Rank trade ideas by risk/reward
//! options-desk rank --trades data/ideas.csv --json
//!
//! # Call/put flow for a strike band, with a volume history to score
//! options-desk flow --chain data/chain.csv --min-strike 170 --max-strike 190 --volumes 1200,1350,980
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use options_desk::analytics::{detect_volume_anomalies, volatility_features, FlowSummary};
use options_desk::backtest::{BacktestEngine, BacktestResult};
use options_desk::config::DeskConfig;
use options_desk::data::{
    load_chain_csv, load_prices_csv, load_trades_csv, OptionSnapshot, OptionType,
};
use options_desk::metrics::{MetricsCalculator, PerformanceMetrics};
use options_desk::pricing::black_scholes_greeks;
use options_desk::risk::PositionRisk;
use options_desk::signals::SmaCrossover;
use options_desk::validation::DataIntegrityValidator;
use options_desk::{rank_trades, TradeIdea};

const SEPARATOR: &str = "============================================================";

#[derive(Parser)]
#[command(name = "options-desk")]
#[command(about = "Options risk analytics, crossover backtests and trade ranking")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML configuration file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the SMA crossover backtest over a price file
    Backtest {
        /// CSV with date,close columns
        #[arg(short, long)]
        prices: PathBuf,
    },

    /// Greeks and position risk for a single long option
    Greeks {
        #[arg(long)]
        spot: f64,

        #[arg(long)]
        strike: f64,

        /// Calendar days to expiry
        #[arg(long)]
        days: f64,

        /// Implied volatility as a decimal (0.25 = 25%)
        #[arg(long)]
        iv: f64,

        /// Premium paid per share
        #[arg(long)]
        premium: f64,

        /// call or put
        #[arg(long = "type", default_value = "call")]
        option_type: String,

        /// Risk-free rate; overrides the config value
        #[arg(long)]
        rate: Option<f64>,

        /// Identifier used for the trade idea
        #[arg(long, default_value = "option")]
        id: String,
    },

    /// Rank trade ideas by risk/reward
    Rank {
        /// CSV with id,expected_gain,max_loss,premium,strike,implied_volatility
        #[arg(short, long)]
        trades: PathBuf,
    },

    /// Call/put flow within a strike band
    Flow {
        /// CSV with strike,option_type,last_price,implied_volatility,volume
        #[arg(long)]
        chain: PathBuf,

        #[arg(long)]
        min_strike: f64,

        #[arg(long)]
        max_strike: f64,

        /// Comma-separated daily total volumes, oldest first
        #[arg(long)]
        volumes: Option<String>,
    },

    /// Rolling realized volatility of a price file
    Volatility {
        /// CSV with date,close columns
        #[arg(short, long)]
        prices: PathBuf,

        /// Window in bars; overrides the config value
        #[arg(short, long)]
        window: Option<usize>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("options_desk=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DeskConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DeskConfig::default(),
    };

    match cli.command {
        Commands::Backtest { prices } => run_backtest(&config, &prices, cli.json),
        Commands::Greeks {
            spot,
            strike,
            days,
            iv,
            premium,
            option_type,
            rate,
            id,
        } => {
            let option_type = OptionType::from_str(&option_type)
                .with_context(|| format!("Unknown option type {:?}", option_type))?;
            let rate = rate.unwrap_or(config.pricing.risk_free_rate);
            let snapshot = OptionSnapshot::from_days_to_expiry(
                spot,
                strike,
                days,
                rate,
                iv,
                option_type,
                premium,
            )
            .context("Invalid option inputs")?;
            run_greeks(&id, &snapshot, cli.json)
        }
        Commands::Rank { trades } => run_rank(&trades, cli.json),
        Commands::Flow {
            chain,
            min_strike,
            max_strike,
            volumes,
        } => run_flow(&config, &chain, min_strike, max_strike, volumes.as_deref(), cli.json),
        Commands::Volatility { prices, window } => {
            let window = window.unwrap_or(config.volatility.window);
            run_volatility(&prices, window, cli.json)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct BacktestReport<'a> {
    result: &'a BacktestResult,
    metrics: &'a PerformanceMetrics,
}

fn run_backtest(config: &DeskConfig, path: &Path, json: bool) -> Result<()> {
    let prices = load_prices_csv(path)
        .with_context(|| format!("Failed to load prices from {}", path.display()))?;
    info!(bars = prices.len(), path = %path.display(), "loaded prices");

    let report = DataIntegrityValidator::new(config.signals.long_window).validate(&prices);
    for check in report.failed_checks() {
        warn!(
            check = %check.name,
            details = ?check.details,
            "{}",
            check.message
        );
    }

    let crossover = SmaCrossover::new(config.signals).context("Invalid signal config")?;
    let signals = crossover.generate(&prices);

    let engine = BacktestEngine::new(config.backtest).context("Invalid backtest config")?;
    let result = engine.run(&prices, &signals).context("Backtest failed")?;
    let metrics = MetricsCalculator::calculate(&result);
    info!(final_equity = result.final_equity, "backtest complete");

    if json {
        return print_json(&BacktestReport {
            result: &result,
            metrics: &metrics,
        });
    }

    println!("{}", SEPARATOR);
    println!("SMA {}/{} crossover", config.signals.short_window, config.signals.long_window);
    println!("{}", SEPARATOR);
    println!("{}", report.summary());
    println!("{}", result.summary());
    println!("\n{}", metrics.summary());
    Ok(())
}

#[derive(Serialize)]
struct GreeksReport<'a> {
    snapshot: &'a OptionSnapshot,
    delta: f64,
    theta: f64,
    theta_per_day: f64,
    vega: f64,
    vega_per_point: f64,
    risk: PositionRisk,
    idea: TradeIdea,
}

fn run_greeks(id: &str, snapshot: &OptionSnapshot, json: bool) -> Result<()> {
    let greeks = black_scholes_greeks(snapshot).context("Failed to compute Greeks")?;
    let risk = PositionRisk::from_snapshot(snapshot).context("Failed to compute position risk")?;
    let idea = TradeIdea::from_snapshot(id, snapshot).context("Failed to build trade idea")?;

    if json {
        return print_json(&GreeksReport {
            snapshot,
            delta: greeks.delta,
            theta: greeks.theta,
            theta_per_day: greeks.theta_per_day(),
            vega: greeks.vega,
            vega_per_point: greeks.vega_per_point(),
            risk,
            idea,
        });
    }

    println!("{}", SEPARATOR);
    println!(
        "{} {} {} @ spot {} ({:.4} years, IV {:.1}%)",
        id,
        snapshot.option_type.as_str(),
        snapshot.strike,
        snapshot.spot,
        snapshot.time_to_expiry,
        snapshot.implied_vol * 100.0
    );
    println!("{}", SEPARATOR);
    println!("Delta:              {:.4}", greeks.delta);
    println!(
        "Theta:              {:.4}/year ({:.4}/day)",
        greeks.theta,
        greeks.theta_per_day()
    );
    println!(
        "Vega:               {:.4} (per vol point {:.4})",
        greeks.vega,
        greeks.vega_per_point()
    );
    println!("Expected move:      {:.2}", risk.expected_move);
    println!(
        "Breakeven:          {:.2} ({:+.2}% from spot)",
        risk.breakeven,
        risk.breakeven_distance_pct(snapshot.spot)
    );
    println!("Max loss:           {:.2}", risk.max_loss);
    println!("Intrinsic P&L:      {:.2}", risk.intrinsic_pnl);
    match idea.risk_reward() {
        Ok(rr) => println!("Risk/reward:        {:.2}", rr),
        Err(e) => println!("Risk/reward:        n/a ({})", e),
    }
    Ok(())
}

fn run_rank(path: &Path, json: bool) -> Result<()> {
    let ideas = load_trades_csv(path)
        .with_context(|| format!("Failed to load trade ideas from {}", path.display()))?;
    info!(count = ideas.len(), "loaded trade ideas");

    let ranked = rank_trades(&ideas).context("Failed to rank trades")?;

    if json {
        return print_json(&ranked);
    }

    println!(
        "{:>4}  {:<12} {:>10} {:>10} {:>10}",
        "rank", "id", "gain", "max loss", "r/r"
    );
    for (i, trade) in ranked.iter().enumerate() {
        println!(
            "{:>4}  {:<12} {:>10.2} {:>10.2} {:>10.2}",
            i + 1,
            trade.idea.id,
            trade.idea.expected_gain,
            trade.idea.max_loss,
            trade.risk_reward
        );
    }
    Ok(())
}

fn parse_volumes(raw: &str) -> Result<Vec<f64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .with_context(|| format!("Invalid volume {:?}", s))
        })
        .collect()
}

fn run_flow(
    config: &DeskConfig,
    path: &Path,
    min_strike: f64,
    max_strike: f64,
    volumes: Option<&str>,
    json: bool,
) -> Result<()> {
    let rows = load_chain_csv(path)
        .with_context(|| format!("Failed to load option chain from {}", path.display()))?;
    info!(rows = rows.len(), "loaded option chain");

    let summary = FlowSummary::from_chain(&rows, min_strike, max_strike);
    let readings = match volumes {
        Some(raw) => detect_volume_anomalies(
            &parse_volumes(raw)?,
            config.flow.anomaly_window,
            config.flow.z_threshold,
        ),
        None => Vec::new(),
    };

    if json {
        return print_json(&serde_json::json!({
            "summary": summary,
            "volume_readings": readings,
        }));
    }

    let fmt_iv = |iv: Option<f64>| match iv {
        Some(iv) => format!("{:.1}%", iv * 100.0),
        None => "n/a".to_string(),
    };

    println!("{}", SEPARATOR);
    println!("Option flow, strikes {} to {}", min_strike, max_strike);
    println!("{}", SEPARATOR);
    println!("Call volume:     {}", summary.call_volume);
    println!("Put volume:      {}", summary.put_volume);
    println!("Call/put ratio:  {:.2}", summary.call_put_ratio);
    println!("Mean call IV:    {}", fmt_iv(summary.call_iv));
    println!("Mean put IV:     {}", fmt_iv(summary.put_iv));
    match summary.iv_skew {
        Some(skew) => println!("IV skew (C - P): {:+.2}%", skew * 100.0),
        None => println!("IV skew (C - P): n/a"),
    }

    if let Some(last) = readings.last() {
        let flagged = readings.iter().filter(|r| r.is_anomaly).count();
        println!(
            "\nVolume history: {} observations, {} flagged",
            readings.len(),
            flagged
        );
        match last.z_score {
            Some(z) => println!(
                "Latest volume {} z={:.2}{}",
                last.volume,
                z,
                if last.is_anomaly { " ANOMALY" } else { "" }
            ),
            None => println!("Latest volume {} (not enough history)", last.volume),
        }
    }
    Ok(())
}

fn run_volatility(path: &Path, window: usize, json: bool) -> Result<()> {
    let prices = load_prices_csv(path)
        .with_context(|| format!("Failed to load prices from {}", path.display()))?;
    let features = volatility_features(&prices, window);
    info!(bars = prices.len(), rows = features.len(), window, "computed volatility");

    if json {
        return print_json(&features);
    }

    println!("{:<12} {:>10} {:>10}", "date", "close", "vol");
    for row in &features {
        println!(
            "{:<12} {:>10.2} {:>9.2}%",
            row.date,
            row.close,
            row.volatility * 100.0
        );
    }
    Ok(())
}
