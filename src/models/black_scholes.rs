use crate::errors::{EngineError, EngineResult};
use crate::models::normal::{cdf, pdf};

/// The five market inputs of one Black-Scholes evaluation.
///
/// Build through [`MarketParameters::new`] to get validation; the fields stay
/// public so the surface sampler can sweep spot and maturity cheaply.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct MarketParameters {
    pub spot: f64,
    pub strike: f64,
    pub risk_free_rate: f64,
    /// Years to expiry.
    pub time_to_maturity: f64,
    /// Annualized volatility (0.2 = 20%).
    pub volatility: f64,
}

impl MarketParameters {
    /// Validated constructor. Rejects S, K, T, sigma <= 0 and any non-finite
    /// field. The rate may be zero or negative.
    pub fn new(
        spot: f64,
        strike: f64,
        risk_free_rate: f64,
        time_to_maturity: f64,
        volatility: f64,
    ) -> EngineResult<Self> {
        let params = Self {
            spot,
            strike,
            risk_free_rate,
            time_to_maturity,
            volatility,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> EngineResult<()> {
        require_positive("spot", self.spot)?;
        require_positive("strike", self.strike)?;
        if !self.risk_free_rate.is_finite() {
            return Err(EngineError::InvalidParameter {
                field: "risk_free_rate",
                value: self.risk_free_rate,
                reason: "must be finite",
            });
        }
        require_positive("time_to_maturity", self.time_to_maturity)?;
        require_positive("volatility", self.volatility)?;
        Ok(())
    }
}

fn require_positive(field: &'static str, value: f64) -> EngineResult<()> {
    if !value.is_finite() {
        return Err(EngineError::InvalidParameter {
            field,
            value,
            reason: "must be finite",
        });
    }
    if value <= 0.0 {
        return Err(EngineError::InvalidParameter {
            field,
            value,
            reason: "must be positive",
        });
    }
    Ok(())
}

/// Price and first-order Greeks of a European option.
/// Theta and rho are call-side only.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PricingResult {
    pub d1: f64,
    pub d2: f64,
    pub call_price: f64,
    pub put_price: f64,
    pub delta_call: f64,
    pub delta_put: f64,
    pub gamma: f64,
    /// Per 1% move in volatility.
    pub vega: f64,
    /// Per calendar day.
    pub theta_call: f64,
    /// Per 1% move in the rate.
    pub rho_call: f64,
}

/// Closed-form Black-Scholes evaluation.
///
/// d1 = (ln(S/K) + (r + sigma^2/2)*T) / (sigma * sqrt(T))
/// d2 = d1 - sigma * sqrt(T)
///
/// Pure function. Does not validate: sigma or T <= 0 propagates NaN/inf,
/// which is why callers go through `MarketParameters::new`.
#[inline]
pub fn evaluate(params: &MarketParameters) -> PricingResult {
    let s = params.spot;
    let k = params.strike;
    let r = params.risk_free_rate;
    let t = params.time_to_maturity;
    let sigma = params.volatility;

    let sqrt_t = t.sqrt();
    let sigma_sqrt_t = sigma * sqrt_t;
    let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / sigma_sqrt_t;
    let d2 = d1 - sigma_sqrt_t;

    let discount = (-r * t).exp();
    let nd1 = cdf(d1);
    let nd2 = cdf(d2);
    let pdf_d1 = pdf(d1);

    PricingResult {
        d1,
        d2,
        call_price: s * nd1 - k * discount * nd2,
        put_price: k * discount * cdf(-d2) - s * cdf(-d1),
        delta_call: nd1,
        delta_put: nd1 - 1.0,
        gamma: pdf_d1 / (s * sigma_sqrt_t),
        vega: s * pdf_d1 * sqrt_t / 100.0,
        theta_call: (-s * pdf_d1 * sigma / (2.0 * sqrt_t) - r * k * discount * nd2) / 365.0,
        rho_call: k * t * discount * nd2 / 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atm() -> MarketParameters {
        MarketParameters::new(100.0, 100.0, 0.05, 1.0, 0.2).unwrap()
    }

    #[test]
    fn test_atm_reference_values() {
        let r = evaluate(&atm());
        assert!((r.d1 - 0.35).abs() < 1e-9, "d1={}", r.d1);
        assert!((r.d2 - 0.15).abs() < 1e-9, "d2={}", r.d2);
        assert!((r.call_price - 10.4506).abs() < 1e-3, "call={}", r.call_price);
        assert!((r.put_price - 5.5735).abs() < 1e-3, "put={}", r.put_price);
        assert!((r.delta_call - 0.6368).abs() < 1e-4, "delta={}", r.delta_call);
        assert!((r.gamma - 0.018762).abs() < 1e-5, "gamma={}", r.gamma);
        assert!((r.vega - 0.37524).abs() < 1e-4, "vega={}", r.vega);
    }

    #[test]
    fn test_atm_theta_and_rho() {
        let r = evaluate(&atm());
        // theta ~ -6.414/yr, rho ~ 53.23 per unit rate
        assert!((r.theta_call - (-6.414 / 365.0)).abs() < 1e-4, "theta={}", r.theta_call);
        assert!((r.rho_call - 0.5323).abs() < 1e-3, "rho={}", r.rho_call);
    }

    #[test]
    fn test_put_call_parity() {
        for &s in &[50.0, 80.0, 100.0, 120.0, 250.0] {
            for &k in &[60.0, 100.0, 140.0] {
                for &r in &[-0.01, 0.0, 0.03, 0.1] {
                    for &t in &[0.05, 0.5, 1.0, 3.0] {
                        for &sigma in &[0.05, 0.2, 0.6] {
                            let p = MarketParameters::new(s, k, r, t, sigma).unwrap();
                            let res = evaluate(&p);
                            let lhs = res.call_price - res.put_price;
                            let rhs = s - k * (-r * t).exp();
                            let tol = 1e-4 * s.max(k);
                            assert!(
                                (lhs - rhs).abs() < tol,
                                "parity broken at {p:?}: {lhs} vs {rhs}"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_delta_spread_and_gamma_sign() {
        for &s in &[40.0, 90.0, 100.0, 110.0, 300.0] {
            for &t in &[0.01, 0.25, 2.0] {
                let p = MarketParameters::new(s, 100.0, 0.05, t, 0.3).unwrap();
                let res = evaluate(&p);
                assert!((res.delta_call - res.delta_put - 1.0).abs() < 1e-12);
                assert!(res.gamma >= 0.0, "gamma={} at S={s} T={t}", res.gamma);
            }
        }
    }

    #[test]
    fn test_deep_otm_call() {
        let p = MarketParameters::new(50.0, 100.0, 0.05, 1.0, 0.2).unwrap();
        let res = evaluate(&p);
        assert!(res.call_price < 0.05, "deep OTM call={}", res.call_price);
        let intrinsic = 100.0 * (-0.05_f64).exp() - 50.0;
        assert!((res.put_price - intrinsic).abs() < 0.05, "put={} intrinsic={intrinsic}", res.put_price);
    }

    #[test]
    fn test_near_expiry_gamma_is_not_clamped() {
        let near = MarketParameters::new(100.0, 100.0, 0.05, 0.01, 0.2).unwrap();
        let far = atm();
        let g_near = evaluate(&near).gamma;
        let g_far = evaluate(&far).gamma;
        assert!(g_near > 8.0 * g_far, "near-expiry gamma {g_near} vs 1y gamma {g_far}");
        assert!(g_near.is_finite());
    }

    #[test]
    fn test_unchecked_zero_vol_propagates_non_finite() {
        let p = MarketParameters {
            spot: 100.0,
            strike: 100.0,
            risk_free_rate: 0.05,
            time_to_maturity: 1.0,
            volatility: 0.0,
        };
        let res = evaluate(&p);
        assert!(!res.gamma.is_finite());
    }

    #[test]
    fn test_validation_rejects_each_field() {
        let cases = [
            (MarketParameters::new(0.0, 100.0, 0.05, 1.0, 0.2), "spot"),
            (MarketParameters::new(100.0, -5.0, 0.05, 1.0, 0.2), "strike"),
            (MarketParameters::new(100.0, 100.0, f64::NAN, 1.0, 0.2), "risk_free_rate"),
            (MarketParameters::new(100.0, 100.0, 0.05, 0.0, 0.2), "time_to_maturity"),
            (MarketParameters::new(100.0, 100.0, 0.05, 1.0, -0.1), "volatility"),
            (MarketParameters::new(f64::INFINITY, 100.0, 0.05, 1.0, 0.2), "spot"),
            (MarketParameters::new(100.0, 100.0, 0.05, 1.0, f64::NAN), "volatility"),
        ];
        for (res, expected) in cases {
            let err = res.expect_err("should be rejected");
            assert_eq!(err.field(), Some(expected), "wrong field for {err}");
        }
    }

    #[test]
    fn test_negative_rate_is_valid() {
        let p = MarketParameters::new(100.0, 100.0, -0.02, 1.0, 0.2).unwrap();
        let res = evaluate(&p);
        assert!(res.call_price.is_finite() && res.put_price.is_finite());
        assert!(res.theta_call.is_finite() && res.rho_call > 0.0);
    }
}
