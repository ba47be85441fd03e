//! Black-Scholes pricing and Greeks for European options.
//!
//! All time inputs are in years and volatilities are annualized decimals.
//! Every entry point validates its inputs first: a zero time to expiry or a
//! zero volatility would divide by zero inside d1, so those fail with
//! [`AnalyticsError::Domain`] instead of leaking NaN or infinity.

use std::f64::consts::{PI, SQRT_2};

use statrs::function::erf::erfc;
use tracing::debug;

use crate::data::{GreeksResult, OptionSnapshot, OptionType};
use crate::error::{ensure_finite, ensure_positive, AnalyticsError, AnalyticsResult};

/// Black-Scholes calculator for a fixed risk-free rate.
#[derive(Debug, Clone, Copy)]
pub struct BlackScholes {
    /// Risk-free interest rate
    pub rate: f64,
}

impl Default for BlackScholes {
    fn default() -> Self {
        Self { rate: 0.05 }
    }
}

impl BlackScholes {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }

    fn check_inputs(&self, spot: f64, strike: f64, time: f64, vol: f64) -> AnalyticsResult<()> {
        ensure_positive("spot", spot)?;
        ensure_positive("strike", strike)?;
        ensure_positive("time_to_expiry", time)?;
        ensure_positive("volatility", vol)?;
        ensure_finite("rate", self.rate)?;
        Ok(())
    }

    /// d1 and d2, after validating inputs.
    ///
    /// Inputs that pass the sign checks can still underflow `vol * sqrt(time)`
    /// to zero; those fail instead of producing 0/0.
    fn d_terms(
        &self,
        spot: f64,
        strike: f64,
        time: f64,
        vol: f64,
    ) -> AnalyticsResult<(f64, f64)> {
        self.check_inputs(spot, strike, time, vol)?;
        let vol_sqrt_t = vol * time.sqrt();
        if vol_sqrt_t == 0.0 {
            return Err(AnalyticsError::Domain(format!(
                "volatility {} over time {} is too small to price",
                vol, time
            )));
        }

        let d1 = ((spot / strike).ln() + (self.rate + 0.5 * vol * vol) * time) / vol_sqrt_t;
        let d2 = d1 - vol_sqrt_t;
        if !d1.is_finite() || !d2.is_finite() {
            return Err(AnalyticsError::Domain(format!(
                "d1/d2 not finite for spot {}, strike {}, time {}, volatility {}",
                spot, strike, time, vol
            )));
        }
        Ok((d1, d2))
    }

    /// Standard normal CDF.
    pub(crate) fn norm_cdf(x: f64) -> f64 {
        0.5 * erfc(-x / SQRT_2)
    }

    /// Standard normal PDF.
    pub(crate) fn norm_pdf(x: f64) -> f64 {
        (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
    }

    /// Calculate call option price.
    pub fn call_price(&self, spot: f64, strike: f64, time: f64, vol: f64) -> AnalyticsResult<f64> {
        let (d1, d2) = self.d_terms(spot, strike, time, vol)?;

        Ok(spot * Self::norm_cdf(d1) - strike * (-self.rate * time).exp() * Self::norm_cdf(d2))
    }

    /// Calculate put option price.
    pub fn put_price(&self, spot: f64, strike: f64, time: f64, vol: f64) -> AnalyticsResult<f64> {
        let (d1, d2) = self.d_terms(spot, strike, time, vol)?;

        Ok(strike * (-self.rate * time).exp() * Self::norm_cdf(-d2) - spot * Self::norm_cdf(-d1))
    }

    /// Calculate option price based on type.
    pub fn price(
        &self,
        spot: f64,
        strike: f64,
        time: f64,
        vol: f64,
        opt_type: OptionType,
    ) -> AnalyticsResult<f64> {
        match opt_type {
            OptionType::Call => self.call_price(spot, strike, time, vol),
            OptionType::Put => self.put_price(spot, strike, time, vol),
        }
    }

    /// Calculate delta.
    pub fn delta(
        &self,
        spot: f64,
        strike: f64,
        time: f64,
        vol: f64,
        opt_type: OptionType,
    ) -> AnalyticsResult<f64> {
        let (d1, _) = self.d_terms(spot, strike, time, vol)?;
        let nd1 = Self::norm_cdf(d1);

        Ok(match opt_type {
            OptionType::Call => nd1,
            OptionType::Put => nd1 - 1.0,
        })
    }

    /// Calculate gamma (same for calls and puts).
    pub fn gamma(&self, spot: f64, strike: f64, time: f64, vol: f64) -> AnalyticsResult<f64> {
        let (d1, _) = self.d_terms(spot, strike, time, vol)?;

        ensure_finite("gamma", Self::norm_pdf(d1) / (spot * vol * time.sqrt()))
    }

    /// Calculate vega (same for calls and puts), per 1.00 change in volatility.
    pub fn vega(&self, spot: f64, strike: f64, time: f64, vol: f64) -> AnalyticsResult<f64> {
        let (d1, _) = self.d_terms(spot, strike, time, vol)?;

        Ok(spot * Self::norm_pdf(d1) * time.sqrt())
    }

    /// Calculate theta (annualized).
    pub fn theta(
        &self,
        spot: f64,
        strike: f64,
        time: f64,
        vol: f64,
        opt_type: OptionType,
    ) -> AnalyticsResult<f64> {
        let (d1, d2) = self.d_terms(spot, strike, time, vol)?;
        let discount_r = (-self.rate * time).exp();

        let decay = -spot * Self::norm_pdf(d1) * vol / (2.0 * time.sqrt());
        let carry = self.rate * strike * discount_r;

        Ok(match opt_type {
            OptionType::Call => decay - carry * Self::norm_cdf(d2),
            OptionType::Put => decay + carry * Self::norm_cdf(-d2),
        })
    }

    /// Calculate rho, per 1.00 change in the rate.
    pub fn rho(
        &self,
        spot: f64,
        strike: f64,
        time: f64,
        vol: f64,
        opt_type: OptionType,
    ) -> AnalyticsResult<f64> {
        let (_, d2) = self.d_terms(spot, strike, time, vol)?;
        let discount = (-self.rate * time).exp();

        Ok(match opt_type {
            OptionType::Call => strike * time * discount * Self::norm_cdf(d2),
            OptionType::Put => -strike * time * discount * Self::norm_cdf(-d2),
        })
    }

    /// Delta, theta and vega in one pass.
    pub fn greeks(
        &self,
        spot: f64,
        strike: f64,
        time: f64,
        vol: f64,
        opt_type: OptionType,
    ) -> AnalyticsResult<GreeksResult> {
        Ok(GreeksResult {
            delta: self.delta(spot, strike, time, vol, opt_type)?,
            theta: self.theta(spot, strike, time, vol, opt_type)?,
            vega: self.vega(spot, strike, time, vol)?,
        })
    }

    /// Calculate implied volatility from option price using Newton-Raphson.
    ///
    /// The seed is clamped to [0.01, 5.0] and each step to [0.001, 10.0].
    /// `None` when the inputs are invalid or the search does not converge.
    pub fn implied_vol(
        &self,
        spot: f64,
        strike: f64,
        time: f64,
        price: f64,
        opt_type: OptionType,
    ) -> Option<f64> {
        if !(time > 0.0 && price > 0.0 && spot > 0.0 && strike > 0.0) || !price.is_finite() {
            return None;
        }

        // Brenner-Subrahmanyam seed
        let mut vol = (price / spot) * (2.0 * PI / time).sqrt();
        vol = vol.clamp(0.01, 5.0);

        let max_iter = 100;
        let tolerance = 1e-6;

        for _ in 0..max_iter {
            let diff = self.price(spot, strike, time, vol, opt_type).ok()? - price;

            if diff.abs() < tolerance {
                return Some(vol);
            }

            let vega = self.vega(spot, strike, time, vol).ok()?;
            if vega.abs() < 1e-10 {
                break;
            }

            vol -= diff / vega;
            vol = vol.clamp(0.001, 10.0);
        }

        None
    }
}

/// Greeks for a snapshot, using the snapshot's own rate.
pub fn black_scholes_greeks(snapshot: &OptionSnapshot) -> AnalyticsResult<GreeksResult> {
    if snapshot.time_to_expiry <= 0.0 {
        return Err(AnalyticsError::Domain(
            "Greeks need time_to_expiry > 0; the option has expired".to_string(),
        ));
    }

    let greeks = BlackScholes::new(snapshot.rate).greeks(
        snapshot.spot,
        snapshot.strike,
        snapshot.time_to_expiry,
        snapshot.implied_vol,
        snapshot.option_type,
    )?;
    debug!(
        delta = greeks.delta,
        theta = greeks.theta,
        vega = greeks.vega,
        "computed greeks"
    );
    Ok(greeks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_black_scholes_call_price() {
        let bs = BlackScholes::new(0.05);
        // S=100, K=100, T=1, vol=0.20 is the textbook 10.4506
        let price = bs.call_price(100.0, 100.0, 1.0, 0.20).unwrap();
        assert_relative_eq!(price, 10.4506, epsilon = 1e-3);
    }

    #[test]
    fn test_black_scholes_put_price() {
        let bs = BlackScholes::new(0.05);
        let price = bs.put_price(100.0, 100.0, 1.0, 0.20).unwrap();
        assert_relative_eq!(price, 5.5735, epsilon = 1e-3);
    }

    #[test]
    fn test_put_call_parity() {
        let bs = BlackScholes::new(0.05);
        let (spot, strike, time, vol) = (100.0, 95.0, 0.75, 0.30);

        let call = bs.call_price(spot, strike, time, vol).unwrap();
        let put = bs.put_price(spot, strike, time, vol).unwrap();

        // C - P = S - K*e^(-rT)
        let parity_rhs = spot - strike * (-bs.rate * time).exp();
        assert_relative_eq!(call - put, parity_rhs, epsilon = 1e-9);
    }

    #[test]
    fn test_norm_cdf_values() {
        assert_relative_eq!(BlackScholes::norm_cdf(0.0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(BlackScholes::norm_cdf(1.96), 0.975_002, epsilon = 1e-5);
        assert_relative_eq!(
            BlackScholes::norm_cdf(-1.0) + BlackScholes::norm_cdf(1.0),
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_delta_bounds_and_relation() {
        let bs = BlackScholes::default();
        let (spot, strike, time, vol) = (100.0, 100.0, 0.5, 0.25);

        let call_delta = bs.delta(spot, strike, time, vol, OptionType::Call).unwrap();
        let put_delta = bs.delta(spot, strike, time, vol, OptionType::Put).unwrap();

        assert!(call_delta > 0.0 && call_delta < 1.0);
        assert!(put_delta > -1.0 && put_delta < 0.0);
        assert_relative_eq!(call_delta - put_delta, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_call_put_delta_relation_across_inputs() {
        for &(spot, strike, time, rate, vol) in &[
            (50.0, 80.0, 0.1, 0.01, 0.6),
            (120.0, 100.0, 2.0, 0.07, 0.15),
            (100.0, 100.0, 1.0 / 365.0, 0.0, 0.9),
        ] {
            let bs = BlackScholes::new(rate);
            let call = bs.delta(spot, strike, time, vol, OptionType::Call).unwrap();
            let put = bs.delta(spot, strike, time, vol, OptionType::Put).unwrap();
            assert_relative_eq!(call - put, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_theta_matches_reference() {
        let bs = BlackScholes::new(0.05);
        // Reference values for S=K=100, T=1, r=5%, vol=20%
        let call = bs.theta(100.0, 100.0, 1.0, 0.20, OptionType::Call).unwrap();
        let put = bs.theta(100.0, 100.0, 1.0, 0.20, OptionType::Put).unwrap();
        assert_relative_eq!(call, -6.414, epsilon = 1e-3);
        assert_relative_eq!(put, -1.658, epsilon = 1e-3);
    }

    #[test]
    fn test_gamma_positive() {
        let bs = BlackScholes::default();
        let gamma = bs.gamma(100.0, 100.0, 0.5, 0.25).unwrap();
        assert!(gamma > 0.0);
    }

    #[test]
    fn test_vega_non_negative() {
        let bs = BlackScholes::default();
        for &(spot, strike) in &[(100.0, 100.0), (10.0, 500.0), (500.0, 10.0)] {
            let vega = bs.vega(spot, strike, 0.5, 0.25).unwrap();
            assert!(vega >= 0.0);
        }
        assert_relative_eq!(bs.vega(100.0, 100.0, 1.0, 0.20).unwrap(), 37.524, epsilon = 1e-3);
    }

    #[test]
    fn test_rho_signs() {
        let bs = BlackScholes::new(0.05);
        assert!(bs.rho(100.0, 100.0, 1.0, 0.2, OptionType::Call).unwrap() > 0.0);
        assert!(bs.rho(100.0, 100.0, 1.0, 0.2, OptionType::Put).unwrap() < 0.0);
    }

    #[test]
    fn test_zero_time_or_vol_is_domain_error() {
        let bs = BlackScholes::default();
        assert!(matches!(
            bs.delta(100.0, 100.0, 0.0, 0.25, OptionType::Call),
            Err(AnalyticsError::Domain(_))
        ));
        assert!(matches!(
            bs.vega(100.0, 100.0, 0.5, 0.0),
            Err(AnalyticsError::Domain(_))
        ));
        assert!(bs.theta(100.0, f64::NAN, 0.5, 0.2, OptionType::Put).is_err());
    }

    #[test]
    fn test_underflowing_vol_time_is_domain_error() {
        let snap =
            OptionSnapshot::new(100.0, 100.0, 1e-300, 0.0, 1e-200, OptionType::Call, 1.0).unwrap();
        assert!(matches!(
            black_scholes_greeks(&snap),
            Err(AnalyticsError::Domain(_))
        ));

        let bs = BlackScholes::new(0.0);
        assert!(bs.call_price(100.0, 100.0, 1e-300, 1e-200).is_err());
        assert!(bs.gamma(100.0, 100.0, 1e-300, 1e-200).is_err());
    }

    #[test]
    fn test_implied_vol() {
        let bs = BlackScholes::new(0.05);
        let vol = 0.25;
        let price = bs.call_price(100.0, 100.0, 0.5, vol).unwrap();

        let iv = bs
            .implied_vol(100.0, 100.0, 0.5, price, OptionType::Call)
            .unwrap();
        assert_relative_eq!(iv, vol, epsilon = 0.001);
    }

    #[test]
    fn test_implied_vol_rejects_bad_inputs() {
        let bs = BlackScholes::default();
        assert_eq!(bs.implied_vol(100.0, 100.0, 0.0, 5.0, OptionType::Call), None);
        assert_eq!(bs.implied_vol(100.0, 100.0, 0.5, 0.0, OptionType::Put), None);
    }

    #[test]
    fn test_snapshot_greeks() {
        let snap =
            OptionSnapshot::new(100.0, 100.0, 1.0, 0.05, 0.20, OptionType::Call, 10.45).unwrap();
        let greeks = black_scholes_greeks(&snap).unwrap();
        assert_relative_eq!(greeks.delta, 0.6368, epsilon = 1e-3);
        assert!(greeks.vega > 0.0);
        assert!(greeks.theta < 0.0);
    }

    #[test]
    fn test_expired_snapshot_rejected() {
        let snap =
            OptionSnapshot::new(100.0, 100.0, 0.0, 0.05, 0.20, OptionType::Put, 1.0).unwrap();
        assert!(matches!(
            black_scholes_greeks(&snap),
            Err(AnalyticsError::Domain(_))
        ));
    }
}
