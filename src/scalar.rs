//! Real-valued numerical derivative and integral over sampled curves.

use crate::error::{ensure_at_least, ensure_same_len, Result};

/// The derivative of the samples `f` with respect to the strictly increasing times `t`.
///
/// Uses centered differences at interior points and one-sided differences at the two ends.
/// Requires at least two samples.
pub fn scalar_derivative(f: &[f64], t: &[f64]) -> Result<Vec<f64>> {
    ensure_same_len(f.len(), t.len())?;
    ensure_at_least(2, f.len())?;

    let n = f.len();
    let mut dfdt = Vec::with_capacity(n);
    dfdt.push((f[1] - f[0]) / (t[1] - t[0]));
    for i in 1..n - 1 {
        dfdt.push((f[i + 1] - f[i - 1]) / (t[i + 1] - t[i - 1]));
    }
    dfdt.push((f[n - 1] - f[n - 2]) / (t[n - 1] - t[n - 2]));
    Ok(dfdt)
}

/// The cumulative trapezoidal integral of `fdot` over the times `t`, starting from 0 at `t[0]`.
pub fn scalar_integral(fdot: &[f64], t: &[f64]) -> Result<Vec<f64>> {
    ensure_same_len(fdot.len(), t.len())?;

    let mut f = Vec::with_capacity(fdot.len());
    let mut total = 0.;
    for (i, value) in fdot.iter().enumerate() {
        if i > 0 {
            total += (t[i] - t[i - 1]) * (value + fdot[i - 1]) / 2.;
        }
        f.push(total);
    }
    Ok(f)
}
