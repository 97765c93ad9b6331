use crate::models::black_scholes::{evaluate, MarketParameters, PricingResult};

/// Points per axis.
pub const GRID_POINTS: usize = 31;

/// Spot axis spans [SPOT_LOW * S, SPOT_HIGH * S].
const SPOT_LOW: f64 = 0.5;
const SPOT_HIGH: f64 = 1.5;

/// Time axis starts here to stay clear of the T = 0 singularity.
pub const MIN_MATURITY: f64 = 0.01;
/// Time axis ends at max(HORIZON_MULT * T, MIN_HORIZON).
const HORIZON_MULT: f64 = 1.5;
const MIN_HORIZON: f64 = 1.0;

/// Which field of a `PricingResult` the surface plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sensitivity {
    CallPrice,
    PutPrice,
    DeltaCall,
    DeltaPut,
    #[default]
    Gamma,
    Vega,
    ThetaCall,
    RhoCall,
}

impl Sensitivity {
    #[inline]
    pub fn extract(self, r: &PricingResult) -> f64 {
        match self {
            Self::CallPrice => r.call_price,
            Self::PutPrice => r.put_price,
            Self::DeltaCall => r.delta_call,
            Self::DeltaPut => r.delta_put,
            Self::Gamma => r.gamma,
            Self::Vega => r.vega,
            Self::ThetaCall => r.theta_call,
            Self::RhoCall => r.rho_call,
        }
    }
}

impl std::fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CallPrice => write!(f, "call_price"),
            Self::PutPrice => write!(f, "put_price"),
            Self::DeltaCall => write!(f, "delta_call"),
            Self::DeltaPut => write!(f, "delta_put"),
            Self::Gamma => write!(f, "gamma"),
            Self::Vega => write!(f, "vega"),
            Self::ThetaCall => write!(f, "theta_call"),
            Self::RhoCall => write!(f, "rho_call"),
        }
    }
}

/// Sensitivity sampled over spot (x) and time to maturity (y).
/// `z[i][j]` is the value at `(x[j], y[i])`, the row-major layout a
/// 3D surface plot expects.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SurfaceGrid {
    pub sensitivity: Sensitivity,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<Vec<f64>>,
}

/// Sample `sensitivity` on a GRID_POINTS x GRID_POINTS grid around `params`.
///
/// Strike, rate and volatility are held fixed; every cell is an independent
/// `evaluate`. The axes move with the inputs, so the grid is always rebuilt
/// from scratch.
pub fn sample_surface(params: &MarketParameters, sensitivity: Sensitivity) -> SurfaceGrid {
    let x = linspace(params.spot * SPOT_LOW, params.spot * SPOT_HIGH, GRID_POINTS);
    let horizon = (params.time_to_maturity * HORIZON_MULT).max(MIN_HORIZON);
    let y = linspace(MIN_MATURITY, horizon, GRID_POINTS);

    let z = y
        .iter()
        .map(|&t| {
            x.iter()
                .map(|&s| {
                    let cell = MarketParameters {
                        spot: s,
                        time_to_maturity: t,
                        ..*params
                    };
                    sensitivity.extract(&evaluate(&cell))
                })
                .collect()
        })
        .collect();

    SurfaceGrid { sensitivity, x, y, z }
}

/// `n` evenly spaced points from `start` to `end` inclusive.
fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n < 2 {
        return vec![start; n];
    }
    let step = (end - start) / (n - 1) as f64;
    (0..n)
        .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atm() -> MarketParameters {
        MarketParameters::new(100.0, 100.0, 0.05, 1.0, 0.2).unwrap()
    }

    #[test]
    fn test_grid_shape() {
        let grid = sample_surface(&atm(), Sensitivity::Gamma);
        assert_eq!(grid.x.len(), GRID_POINTS);
        assert_eq!(grid.y.len(), GRID_POINTS);
        assert_eq!(grid.z.len(), GRID_POINTS);
        for row in &grid.z {
            assert_eq!(row.len(), GRID_POINTS);
        }
    }

    #[test]
    fn test_axes_bounds() {
        let grid = sample_surface(&atm(), Sensitivity::Gamma);
        assert!((grid.x[0] - 50.0).abs() < 1e-12);
        assert!((grid.x[GRID_POINTS - 1] - 150.0).abs() < 1e-12);
        assert!((grid.x[15] - 100.0).abs() < 1e-9, "centre spot={}", grid.x[15]);
        assert!((grid.y[0] - MIN_MATURITY).abs() < 1e-12);
        assert!((grid.y[GRID_POINTS - 1] - 1.5).abs() < 1e-12);
        assert!(grid.x.windows(2).all(|w| w[1] > w[0]));
        assert!(grid.y.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_short_maturity_keeps_one_year_horizon() {
        let p = MarketParameters::new(100.0, 100.0, 0.05, 0.05, 0.2).unwrap();
        let grid = sample_surface(&p, Sensitivity::Gamma);
        assert!((grid.y[GRID_POINTS - 1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_long_maturity_extends_horizon() {
        let p = MarketParameters::new(100.0, 100.0, 0.05, 4.0, 0.2).unwrap();
        let grid = sample_surface(&p, Sensitivity::Gamma);
        assert!((grid.y[GRID_POINTS - 1] - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_cells_match_independent_evaluation() {
        let p = MarketParameters::new(80.0, 95.0, 0.03, 0.7, 0.35).unwrap();
        let grid = sample_surface(&p, Sensitivity::Gamma);
        for (i, &t) in grid.y.iter().enumerate() {
            for (j, &s) in grid.x.iter().enumerate() {
                let cell = MarketParameters::new(s, 95.0, 0.03, t, 0.35).unwrap();
                let expected = evaluate(&cell).gamma;
                assert_eq!(grid.z[i][j], expected, "mismatch at [{i}][{j}]");
            }
        }
    }

    #[test]
    fn test_gamma_surface_finite_and_non_negative() {
        let grid = sample_surface(&atm(), Sensitivity::Gamma);
        for row in &grid.z {
            for &v in row {
                assert!(v.is_finite() && v >= 0.0, "bad gamma cell {v}");
            }
        }
    }

    #[test]
    fn test_other_sensitivity() {
        let grid = sample_surface(&atm(), Sensitivity::DeltaCall);
        assert_eq!(grid.sensitivity, Sensitivity::DeltaCall);
        // call delta rises with spot along every row
        for row in &grid.z {
            assert!(row.windows(2).all(|w| w[1] >= w[0]));
            assert!(row.iter().all(|&d| (0.0..=1.0).contains(&d)));
        }
    }

    #[test]
    fn test_sensitivity_serde_names() {
        let s: Sensitivity = serde_json::from_str("\"theta_call\"").unwrap();
        assert_eq!(s, Sensitivity::ThetaCall);
        assert_eq!(serde_json::to_string(&Sensitivity::Gamma).unwrap(), "\"gamma\"");
        assert_eq!(Sensitivity::default(), Sensitivity::Gamma);
    }
}
