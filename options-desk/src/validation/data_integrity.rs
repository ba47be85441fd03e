//! Data integrity checks for price series.
//!
//! Validates:
//! - Enough history for the crossover warm-up
//! - Date continuity (no calendar gaps wider than a long weekend plus a holiday)
//! - Price jumps (single-bar moves beyond a threshold, usually bad splits)

use crate::data::PriceSeries;

/// Result of a single validation check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub details: Option<String>,
}

impl CheckResult {
    pub fn pass(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: message.to_string(),
            details: None,
        }
    }

    pub fn fail(name: &str, message: &str, details: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: message.to_string(),
            details,
        }
    }
}

/// Integrity report for one price series.
#[derive(Debug)]
pub struct DataIntegrityReport {
    pub bars: usize,
    pub checks: Vec<CheckResult>,
}

impl DataIntegrityReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failed_checks(&self) -> Vec<&CheckResult> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }

    pub fn summary(&self) -> String {
        let passed = self.checks.iter().filter(|c| c.passed).count();
        format!(
            "{} bars: {}/{} checks passed",
            self.bars,
            passed,
            self.checks.len()
        )
    }
}

/// Validator for price series integrity.
#[derive(Debug, Clone)]
pub struct DataIntegrityValidator {
    /// Bars needed before every signal input is defined.
    pub min_bars: usize,
    /// Widest allowed gap between consecutive dates, in calendar days.
    pub max_gap_days: i64,
    /// Largest allowed single-bar absolute return.
    pub max_abs_return: f64,
}

impl Default for DataIntegrityValidator {
    fn default() -> Self {
        Self {
            min_bars: 50,
            max_gap_days: 5,
            max_abs_return: 0.5,
        }
    }
}

impl DataIntegrityValidator {
    pub fn new(min_bars: usize) -> Self {
        Self {
            min_bars,
            ..Self::default()
        }
    }

    pub fn validate(&self, prices: &PriceSeries) -> DataIntegrityReport {
        DataIntegrityReport {
            bars: prices.len(),
            checks: vec![
                self.check_history(prices),
                self.check_date_continuity(prices),
                self.check_price_jumps(prices),
            ],
        }
    }

    fn check_history(&self, prices: &PriceSeries) -> CheckResult {
        if prices.len() >= self.min_bars {
            CheckResult::pass("history", &format!("{} bars available", prices.len()))
        } else {
            CheckResult::fail(
                "history",
                "Not enough bars for warm-up; every signal will be flat",
                Some(format!("{} bars, need {}", prices.len(), self.min_bars)),
            )
        }
    }

    fn check_date_continuity(&self, prices: &PriceSeries) -> CheckResult {
        let gaps: Vec<String> = prices
            .points()
            .windows(2)
            .filter(|w| (w[1].date - w[0].date).num_days() > self.max_gap_days)
            .map(|w| format!("{} -> {}", w[0].date, w[1].date))
            .collect();

        if gaps.is_empty() {
            CheckResult::pass("date_continuity", "No gaps found")
        } else {
            CheckResult::fail(
                "date_continuity",
                &format!("{} gaps wider than {} days", gaps.len(), self.max_gap_days),
                Some(gaps.into_iter().take(10).collect::<Vec<_>>().join(", ")),
            )
        }
    }

    fn check_price_jumps(&self, prices: &PriceSeries) -> CheckResult {
        let jumps: Vec<String> = prices
            .points()
            .windows(2)
            .filter(|w| (w[1].close / w[0].close - 1.0).abs() > self.max_abs_return)
            .map(|w| format!("{}: {:.2} -> {:.2}", w[1].date, w[0].close, w[1].close))
            .collect();

        if jumps.is_empty() {
            CheckResult::pass("price_jumps", "No outsized moves")
        } else {
            CheckResult::fail(
                "price_jumps",
                &format!("{} bars move more than {:.0}%", jumps.len(), self.max_abs_return * 100.0),
                Some(jumps.into_iter().take(10).collect::<Vec<_>>().join(", ")),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PricePoint;
    use chrono::NaiveDate;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, m, d).unwrap()
    }

    #[test]
    fn test_clean_series_passes() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 0.5).collect();
        let prices = PriceSeries::from_closes(date(1, 1), &closes).unwrap();
        let report = DataIntegrityValidator::default().validate(&prices);
        assert!(report.all_passed(), "{}", report.summary());
    }

    #[test]
    fn test_short_history_fails() {
        let prices = PriceSeries::from_closes(date(1, 1), &[100.0; 10]).unwrap();
        let report = DataIntegrityValidator::default().validate(&prices);
        let failed = report.failed_checks();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].name, "history");
    }

    #[test]
    fn test_gap_and_jump_detected() {
        let prices = PriceSeries::new(vec![
            PricePoint { date: date(1, 2), close: 100.0 },
            PricePoint { date: date(1, 3), close: 101.0 },
            PricePoint { date: date(2, 1), close: 250.0 },
        ])
        .unwrap();
        let report = DataIntegrityValidator::new(2).validate(&prices);
        let names: Vec<_> = report.failed_checks().iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, vec!["date_continuity", "price_jumps"]);
        assert_eq!(report.summary(), "3 bars: 1/3 checks passed");
    }
}
