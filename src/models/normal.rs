use std::f64::consts::{PI, SQRT_2};

/// Standard normal density.
#[inline]
pub fn pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Standard normal CDF via the Abramowitz-Stegun 7.1.26 erf approximation.
///
/// N(x) = 0.5 * (1 + erf(x / sqrt(2)))
///
/// erf is evaluated on |x| and reflected by the sign of x, so
/// N(x) + N(-x) == 1 holds to rounding. Absolute error < 1.5e-7.
#[inline]
pub fn cdf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let z = x.abs() / SQRT_2;

    let t = 1.0 / (1.0 + P * z);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-z * z).exp();

    0.5 * (1.0 + sign * y)
}
