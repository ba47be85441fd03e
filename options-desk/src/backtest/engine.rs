//! Signal backtest engine.
//!
//! Runs one pass over aligned price and signal series:
//! 1. Position for bar i is the signal from bar i-1 (flat on the first bar)
//! 2. Period return is the percent change in close from bar i-1 to bar i
//! 3. Strategy return is position * period return
//! 4. Equity compounds from the initial capital
//!
//! Trading on the previous bar's signal keeps the simulation free of
//! look-ahead.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{PriceSeries, Signal, SignalSeries};
use crate::error::{ensure_positive, AnalyticsResult};
use crate::validation::check_alignment;

/// Configuration for backtest execution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Starting capital.
    pub initial_capital: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
        }
    }
}

/// Equity after one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
    /// Position held during this bar.
    pub position: Signal,
    pub period_return: f64,
    pub strategy_return: f64,
}

/// Cumulative portfolio value, aligned with the input prices.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortfolioSeries {
    points: Vec<EquityPoint>,
}

impl PortfolioSeries {
    pub fn points(&self) -> &[EquityPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.equity).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_equity(&self) -> Option<f64> {
        self.points.last().map(|p| p.equity)
    }
}

/// Result of a completed backtest.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestResult {
    /// Configuration used.
    pub config: BacktestConfig,

    /// First and last bar dates; `None` for an empty run.
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    /// Equity per bar.
    pub portfolio: PortfolioSeries,

    /// Final equity (initial capital for an empty run).
    pub final_equity: f64,

    /// Total return percentage.
    pub total_return_pct: f64,

    /// Number of bars.
    pub trading_days: usize,

    /// Bars spent long, short and flat.
    pub long_days: usize,
    pub short_days: usize,
    pub flat_days: usize,
}

impl BacktestResult {
    /// Fraction of bars with a position on.
    pub fn exposure(&self) -> f64 {
        if self.trading_days == 0 {
            return 0.0;
        }
        (self.long_days + self.short_days) as f64 / self.trading_days as f64
    }

    /// Per-bar strategy returns.
    pub fn strategy_returns(&self) -> Vec<f64> {
        self.portfolio
            .points()
            .iter()
            .map(|p| p.strategy_return)
            .collect()
    }

    /// Generate summary string.
    pub fn summary(&self) -> String {
        let range = match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => format!("{} to {}", start, end),
            _ => "no data".to_string(),
        };
        format!(
            "Backtest Results ({})\n\
             ----------------------------------------\n\
             Initial Capital: ${:.2}\n\
             Final Equity: ${:.2}\n\
             Total Return: {:.2}%\n\
             \n\
             Bars: {} (Long: {}, Short: {}, Flat: {})\n\
             Exposure: {:.1}%",
            range,
            self.config.initial_capital,
            self.final_equity,
            self.total_return_pct,
            self.trading_days,
            self.long_days,
            self.short_days,
            self.flat_days,
            self.exposure() * 100.0,
        )
    }
}

/// The backtesting engine.
#[derive(Debug, Clone, Default)]
pub struct BacktestEngine {
    config: BacktestConfig,
}

impl BacktestEngine {
    pub fn new(config: BacktestConfig) -> AnalyticsResult<Self> {
        ensure_positive("initial_capital", config.initial_capital)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Run the backtest. Misaligned series fail with an alignment error;
    /// empty series give an empty portfolio.
    pub fn run(
        &self,
        prices: &PriceSeries,
        signals: &SignalSeries,
    ) -> AnalyticsResult<BacktestResult> {
        check_alignment(prices, signals)?;

        let mut points = Vec::with_capacity(prices.len());
        let mut equity = self.config.initial_capital;
        let (mut long_days, mut short_days, mut flat_days) = (0, 0, 0);

        let bars = prices.points();
        let lagged = signals.points();
        for (i, bar) in bars.iter().enumerate() {
            let (position, period_return) = if i == 0 {
                (Signal::Flat, 0.0)
            } else {
                (lagged[i - 1].signal, bar.close / bars[i - 1].close - 1.0)
            };

            match position {
                Signal::Long => long_days += 1,
                Signal::Short => short_days += 1,
                Signal::Flat => flat_days += 1,
            }

            let strategy_return = position.exposure() * period_return;
            equity *= 1.0 + strategy_return;

            points.push(EquityPoint {
                date: bar.date,
                equity,
                position,
                period_return,
                strategy_return,
            });
        }

        let final_equity = points
            .last()
            .map(|p| p.equity)
            .unwrap_or(self.config.initial_capital);
        let total_return_pct = (final_equity / self.config.initial_capital - 1.0) * 100.0;

        debug!(
            bars = points.len(),
            final_equity,
            total_return_pct,
            "backtest complete"
        );

        Ok(BacktestResult {
            config: self.config,
            start_date: prices.first_date(),
            end_date: prices.last_date(),
            trading_days: points.len(),
            portfolio: PortfolioSeries { points },
            final_equity,
            total_return_pct,
            long_days,
            short_days,
            flat_days,
        })
    }
}

/// Portfolio value for `signals` traded on `prices` from `initial_capital`.
pub fn simple_backtest(
    signals: &SignalSeries,
    prices: &PriceSeries,
    initial_capital: f64,
) -> AnalyticsResult<PortfolioSeries> {
    let engine = BacktestEngine::new(BacktestConfig { initial_capital })?;
    Ok(engine.run(prices, signals)?.portfolio)
}
