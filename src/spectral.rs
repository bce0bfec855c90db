//! Pseudo-spectral-acceleration Sa(T, zeta) of a damped SDOF oscillator,
//! computed via an FFT-domain transfer function (spec.md §4.4).
//!
//! Ported bin-for-bin from `original_source/src/get_sat.py::get_sat`. FFT
//! backend is `rustfft` + `num-complex`, the pure-Rust FFT crate pairing
//! already present in the retrieval pack (see DESIGN.md).

use crate::error::{PlannerError, PlannerResult};
use num_complex::Complex64;
use rustfft::FftPlanner;

/// Smallest power of two >= `n`.
fn next_pow2(n: usize) -> usize {
    let mut m = 1usize;
    while m < n {
        m <<= 1;
    }
    m
}

/// Builds the SDOF transfer function H over `m` frequency bins for a given
/// natural frequency (`1/period`) and damping ratio, following spec.md §4.4
/// steps 2-4.
fn sdof_transfer(m: usize, dt: f64, natural_freq: f64, damping: f64) -> Vec<Complex64> {
    let mut h = vec![Complex64::new(1.0, 0.0); m];

    let odd = m % 2 != 0;
    let sym_idx = if odd { (m + 1) / 2 } else { m / 2 + 1 };
    let d_freq = 1.0 / (dt * (m as f64 - 1.0));
    let omega2 = natural_freq * natural_freq;

    for k in 1..sym_idx {
        let fk = d_freq * k as f64;
        let denom = Complex64::new(omega2 - fk * fk, 2.0 * damping * fk * natural_freq);
        h[k] = Complex64::new(omega2, 0.0) / denom;
    }

    // Mirror the negative-frequency half as the conjugate of the positive
    // half. For even M the Nyquist bin (index m/2) was already set by the
    // loop above and is left untouched (it has no mirror partner).
    let (src_upper, tgt_lower) = if odd { (sym_idx, m - sym_idx + 1) } else { (sym_idx - 1, m - sym_idx + 2) };
    let src: Vec<usize> = (1..src_upper).collect();
    let tgt: Vec<usize> = (tgt_lower..m).collect();
    debug_assert_eq!(src.len(), tgt.len());
    for (&t, &s) in tgt.iter().zip(src.iter().rev()) {
        h[t] = h[s].conj();
    }

    h
}

/// Sa(T, zeta) for a batch of periods sharing one acceleration/time series.
/// `periods` may contain a bare `0.0` to request PGA.
pub fn sa_batch(acc: &[f64], time: &[f64], periods: &[f64], damping: f64) -> PlannerResult<Vec<f64>> {
    if acc.len() != time.len() {
        return Err(PlannerError::MismatchedSeriesLength { acc_len: acc.len(), time_len: time.len() });
    }
    if time.len() < 3 {
        return Err(PlannerError::MismatchedSeriesLength { acc_len: acc.len(), time_len: time.len() });
    }

    let mut dt = time[2] - time[1];
    let has_pga = periods.iter().any(|&p| p == 0.0);
    if dt == 0.0 && has_pga {
        dt = 1e-20;
    }
    if dt == 0.0 && periods.iter().any(|&p| p != 0.0) {
        let bad_period = periods.iter().copied().find(|&p| p != 0.0).unwrap();
        return Err(PlannerError::InvalidSignal { period: bad_period });
    }

    let n = acc.len();
    let m = next_pow2(n);

    let mut buffer: Vec<Complex64> = acc.iter().map(|&a| Complex64::new(a, 0.0)).collect();
    buffer.resize(m, Complex64::new(0.0, 0.0));

    let mut planner = FftPlanner::new();
    let forward = planner.plan_fft_forward(m);
    forward.process(&mut buffer);
    let fas = buffer;

    let inverse = planner.plan_fft_inverse(m);

    let mut out = Vec::with_capacity(periods.len());
    for &period in periods {
        let period_adj = if period == 0.0 { 1e-20 } else { period };
        let natural_freq = 1.0 / period_adj;

        let h = sdof_transfer(m, dt, natural_freq, damping);

        let mut product: Vec<Complex64> = h.iter().zip(fas.iter()).map(|(hk, fk)| hk * fk).collect();
        inverse.process(&mut product);

        let norm = m as f64;
        let sa = product
            .iter()
            .map(|c| (c.re / norm).abs())
            .fold(0.0_f64, f64::max);

        out.push(sa);
    }

    Ok(out)
}

/// Scalar convenience wrapper for a single period.
pub fn sa(acc: &[f64], time: &[f64], period: f64, damping: f64) -> PlannerResult<f64> {
    Ok(sa_batch(acc, time, &[period], damping)?[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sinusoid(freq_hz: f64, amplitude: f64, duration_s: f64, dt: f64) -> (Vec<f64>, Vec<f64>) {
        let n = (duration_s / dt) as usize;
        let mut acc = Vec::with_capacity(n);
        let mut time = Vec::with_capacity(n);
        for i in 0..n {
            let t = i as f64 * dt;
            time.push(t);
            acc.push(amplitude * (2.0 * PI * freq_hz * t).sin());
        }
        (acc, time)
    }

    #[test]
    fn pga_converges_to_peak_absolute_acceleration() {
        let (acc, time) = sinusoid(1.0, 0.8, 10.0, 0.01);
        let pga = sa(&acc, &time, 0.0, 0.02).unwrap();
        let expected = acc.iter().cloned().map(f64::abs).fold(0.0, f64::max);
        assert!((pga - expected).abs() / expected < 0.05);
    }

    #[test]
    fn resonance_amplifies_near_natural_period() {
        // Sinusoid at 1 Hz, T0 = 1s, small damping => amplification ~ 1/(2*zeta).
        let (acc, time) = sinusoid(1.0, 1.0, 10.0, 0.01);
        let zeta = 0.02;
        let resonant = sa(&acc, &time, 1.0, zeta).unwrap();
        let expected = 1.0 / (2.0 * zeta);
        assert!((resonant - expected).abs() / expected < 0.2);
    }

    #[test]
    fn zero_dt_with_nonzero_period_fails() {
        let acc = vec![0.0, 1.0, 0.0, -1.0];
        let time = vec![0.0, 0.0, 0.0, 0.0];
        assert!(matches!(
            sa_batch(&acc, &time, &[0.5], 0.02),
            Err(PlannerError::InvalidSignal { .. })
        ));
    }

    #[test]
    fn zero_dt_with_pga_only_succeeds() {
        let acc = vec![0.1, -0.3, 0.2, 0.5, -0.1];
        let time = vec![0.0, 0.0, 0.0, 0.0, 0.0];
        let pga = sa(&acc, &time, 0.0, 0.02).unwrap();
        assert!(pga >= 0.0);
    }

    #[test]
    fn batched_periods_match_scalar_calls() {
        let (acc, time) = sinusoid(2.0, 0.4, 6.0, 0.005);
        let batch = sa_batch(&acc, &time, &[0.2, 0.5, 1.0], 0.05).unwrap();
        for (i, &t) in [0.2, 0.5, 1.0].iter().enumerate() {
            let single = sa(&acc, &time, t, 0.05).unwrap();
            assert!((batch[i] - single).abs() < 1e-9);
        }
    }

    #[test]
    fn mismatched_lengths_fail() {
        let acc = vec![0.0, 1.0, 0.0];
        let time = vec![0.0, 1.0];
        assert!(sa_batch(&acc, &time, &[0.5], 0.02).is_err());
    }
}
