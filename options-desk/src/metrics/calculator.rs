//! Performance metrics calculator.
//!
//! Calculates return, drawdown and risk-adjusted statistics from a backtest
//! portfolio series. Bars are treated as trading days (252 per year).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::backtest::{BacktestResult, EquityPoint};
use crate::data::TRADING_DAYS_PER_YEAR;

/// Performance metrics for one backtest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    // Return metrics
    pub total_return_pct: f64,
    pub cagr: f64,

    // Risk metrics
    pub max_drawdown: f64,
    pub max_drawdown_pct: f64,
    pub avg_drawdown: f64,
    pub drawdown_duration_days: i64,
    pub drawdown_periods: usize,

    // Risk-adjusted returns
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub calmar_ratio: f64,

    // Bar statistics
    pub trading_days: usize,
    pub exposure: f64,
    pub positive_days: usize,
    pub negative_days: usize,
    pub best_day_pct: f64,
    pub worst_day_pct: f64,
}

impl PerformanceMetrics {
    /// Generate a summary report.
    pub fn summary(&self) -> String {
        format!(
            "Performance Summary\n\
             ====================\n\
             \n\
             Total Return: {:.2}%\n\
             CAGR: {:.2}%\n\
             \n\
             Max Drawdown: {:.2}% (${:.2}, {} days)\n\
             Sharpe Ratio: {:.2}\n\
             Sortino Ratio: {:.2}\n\
             Calmar Ratio: {:.2}\n\
             \n\
             Bars: {} (Up: {}, Down: {})\n\
             Exposure: {:.1}%\n\
             Best Day: {:.2}%\n\
             Worst Day: {:.2}%",
            self.total_return_pct,
            self.cagr,
            self.max_drawdown_pct,
            self.max_drawdown,
            self.drawdown_duration_days,
            self.sharpe_ratio,
            self.sortino_ratio,
            self.calmar_ratio,
            self.trading_days,
            self.positive_days,
            self.negative_days,
            self.exposure * 100.0,
            self.best_day_pct,
            self.worst_day_pct,
        )
    }
}

/// Drawdown analysis details.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrawdownAnalysis {
    pub max_drawdown: f64,
    pub max_drawdown_pct: f64,
    pub max_drawdown_date: Option<NaiveDate>,
    pub peak_date: Option<NaiveDate>,
    pub recovery_date: Option<NaiveDate>,
    pub duration_days: i64,
    pub avg_drawdown_pct: f64,
    pub drawdown_periods: usize,
}

/// Metrics calculator.
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Calculate all metrics from a backtest result.
    pub fn calculate(result: &BacktestResult) -> PerformanceMetrics {
        let curve = result.portfolio.points();
        let returns = Self::bar_returns(curve);

        let cagr = Self::calculate_cagr(
            result.config.initial_capital,
            result.final_equity,
            returns.len(),
        );
        let drawdown = Self::analyze_drawdown(curve);
        let calmar_ratio = if drawdown.max_drawdown_pct > 0.0 {
            cagr / drawdown.max_drawdown_pct
        } else {
            0.0
        };

        let best_day_pct = returns.iter().cloned().fold(0.0_f64, f64::max) * 100.0;
        let worst_day_pct = returns.iter().cloned().fold(0.0_f64, f64::min) * 100.0;

        PerformanceMetrics {
            total_return_pct: result.total_return_pct,
            cagr,
            max_drawdown: drawdown.max_drawdown,
            max_drawdown_pct: drawdown.max_drawdown_pct,
            avg_drawdown: drawdown.avg_drawdown_pct,
            drawdown_duration_days: drawdown.duration_days,
            drawdown_periods: drawdown.drawdown_periods,
            sharpe_ratio: Self::calculate_sharpe(&returns),
            sortino_ratio: Self::calculate_sortino(&returns),
            calmar_ratio,
            trading_days: result.trading_days,
            exposure: result.exposure(),
            positive_days: returns.iter().filter(|&&r| r > 0.0).count(),
            negative_days: returns.iter().filter(|&&r| r < 0.0).count(),
            best_day_pct,
            worst_day_pct,
        }
    }

    /// Bar-over-bar equity returns.
    fn bar_returns(curve: &[EquityPoint]) -> Vec<f64> {
        curve
            .windows(2)
            .map(|w| (w[1].equity - w[0].equity) / w[0].equity)
            .collect()
    }

    /// Calculate CAGR (Compound Annual Growth Rate) over `periods` bars.
    fn calculate_cagr(initial: f64, final_val: f64, periods: usize) -> f64 {
        if initial <= 0.0 || final_val <= 0.0 || periods == 0 {
            return 0.0;
        }

        let years = periods as f64 / TRADING_DAYS_PER_YEAR;
        ((final_val / initial).powf(1.0 / years) - 1.0) * 100.0
    }

    /// Analyze drawdown from equity curve.
    fn analyze_drawdown(equity_curve: &[EquityPoint]) -> DrawdownAnalysis {
        let Some(first) = equity_curve.first() else {
            return DrawdownAnalysis::default();
        };

        let mut peak = first.equity;
        let mut peak_date = first.date;
        let mut max_drawdown = 0.0;
        let mut max_drawdown_pct = 0.0;
        let mut max_drawdown_date = None;
        let mut max_peak_date = None;
        let mut recovery_date = None;
        let mut drawdown_start: Option<NaiveDate> = None;
        let mut max_duration = 0i64;
        let mut drawdowns = Vec::new();
        let mut periods = 0;

        for point in equity_curve {
            if point.equity >= peak {
                if let Some(start) = drawdown_start.take() {
                    // Drawdown ended
                    periods += 1;
                    max_duration = max_duration.max((point.date - start).num_days());
                    if max_peak_date == Some(peak_date) && recovery_date.is_none() {
                        recovery_date = Some(point.date);
                    }
                }
                peak = point.equity;
                peak_date = point.date;
                continue;
            }

            let drawdown = peak - point.equity;
            let drawdown_pct = drawdown / peak * 100.0;
            let start = *drawdown_start.get_or_insert(peak_date);
            max_duration = max_duration.max((point.date - start).num_days());

            if drawdown > max_drawdown {
                max_drawdown = drawdown;
                max_drawdown_pct = drawdown_pct;
                max_drawdown_date = Some(point.date);
                if max_peak_date != Some(peak_date) {
                    max_peak_date = Some(peak_date);
                    recovery_date = None;
                }
            }

            drawdowns.push(drawdown_pct);
        }

        if drawdown_start.is_some() {
            // Still under water at the end of the curve
            periods += 1;
        }

        let avg_drawdown_pct = if !drawdowns.is_empty() {
            drawdowns.iter().sum::<f64>() / drawdowns.len() as f64
        } else {
            0.0
        };

        DrawdownAnalysis {
            max_drawdown,
            max_drawdown_pct,
            max_drawdown_date,
            peak_date: max_peak_date,
            recovery_date,
            duration_days: max_duration,
            avg_drawdown_pct,
            drawdown_periods: periods,
        }
    }

    /// Annualized Sharpe ratio, risk-free rate of zero.
    fn calculate_sharpe(returns: &[f64]) -> f64 {
        if returns.is_empty() {
            return 0.0;
        }

        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let variance =
            returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;
        let std_dev = variance.sqrt();

        if std_dev == 0.0 {
            return 0.0;
        }

        (mean * TRADING_DAYS_PER_YEAR.sqrt()) / std_dev
    }

    /// Calculate Sortino ratio (downside deviation).
    fn calculate_sortino(returns: &[f64]) -> f64 {
        if returns.is_empty() {
            return 0.0;
        }

        let mean = returns.iter().sum::<f64>() / returns.len() as f64;

        // Downside deviation (only negative returns)
        let downside_variance = returns
            .iter()
            .filter(|&&r| r < 0.0)
            .map(|r| r.powi(2))
            .sum::<f64>()
            / returns.len() as f64;
        let downside_dev = downside_variance.sqrt();

        if downside_dev == 0.0 {
            return 0.0;
        }

        (mean * TRADING_DAYS_PER_YEAR.sqrt()) / downside_dev
    }
}
