//! Maps a component's damage-state lognormal parameters and local shaking
//! intensity to an integer risk level 0-9 (spec.md §4.5).
//!
//! Ported from `original_source/src/risks.py::Risk.derive_fragility`. The
//! normal CDF uses `statrs` (see DESIGN.md for the crate grounding); the
//! lognormal-exceedance table is a monotone 1-D interpolant, so a hand
//! rolled binary-search lerp is used rather than pulling in a general
//! interpolation crate.

use statrs::distribution::{ContinuousCDF, Normal};

pub const RISK_0: f64 = 0.04;
pub const RISK_INTERVAL: f64 = 0.16;
pub const PGA_RANGE_MIN: f64 = 0.01;
pub const PGA_RANGE_MAX: f64 = 10.0;
pub const PGA_RANGE_LEN: usize = 200;

/// The 200 linearly spaced points in `[0.01, 10.0]` used to tabulate the
/// lognormal exceedance probability.
pub fn pga_range() -> Vec<f64> {
    let step = (PGA_RANGE_MAX - PGA_RANGE_MIN) / (PGA_RANGE_LEN as f64 - 1.0);
    (0..PGA_RANGE_LEN).map(|i| PGA_RANGE_MIN + step * i as f64).collect()
}

/// A component's most severe damage-state lognormal parameters.
#[derive(Copy, Clone, Debug)]
pub struct DamageState {
    pub mean: f64,
    pub dispersion: f64,
}

/// Parsed `(period, damping)` pair recovered from an `imName` string
/// (spec.md §4.5 step 1). `"pga"` (case-insensitive) maps to `T=0, zeta=0.02`;
/// anything else has its first two decimal numbers extracted as `T` and a
/// damping percentage.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntensityMeasure {
    pub period: f64,
    pub damping: f64,
}

impl IntensityMeasure {
    pub fn parse(im_name: &str) -> Self {
        if im_name.eq_ignore_ascii_case("pga") {
            return IntensityMeasure { period: 0.0, damping: 0.02 };
        }

        let numbers = scan_decimal_numbers(im_name);
        let period = numbers.first().copied().unwrap_or(0.0);
        let damping_pct = numbers.get(1).copied().unwrap_or(2.0);
        IntensityMeasure { period, damping: damping_pct / 100.0 }
    }
}

/// Extracts decimal numbers (`\d+(\.\d+)?`) from a string left to right,
/// without pulling in a regex engine for what is always a two-number scan.
fn scan_decimal_numbers(s: &str) -> Vec<f64> {
    let mut numbers = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            if i < chars.len() && chars[i] == '.' && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()) {
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
            }
            let token: String = chars[start..i].iter().collect();
            if let Ok(v) = token.parse::<f64>() {
                numbers.push(v);
            }
        } else {
            i += 1;
        }
    }
    numbers
}

/// Lognormal exceedance probability `p(x) = Phi(ln(x/mean)/dispersion)` at
/// each point of `pga_range`, tabulated for linear interpolation.
fn exceedance_table(mean: f64, dispersion: f64, range: &[f64]) -> Vec<f64> {
    let normal = Normal::new(0.0, 1.0).expect("standard normal is always constructible");
    range.iter().map(|&x| normal.cdf((x / mean).ln() / dispersion)).collect()
}

/// Evaluates the monotone piecewise-linear interpolant built from
/// `(range, table)` at `x`, clamping to the first/last segment outside the
/// tabulated domain (matches scipy's `interp1d` default within-range
/// behaviour; callers are responsible for the spec's explicit
/// above/below-range short circuits).
fn linear_interp(range: &[f64], table: &[f64], x: f64) -> f64 {
    match range.binary_search_by(|v| v.partial_cmp(&x).unwrap()) {
        Ok(idx) => table[idx],
        Err(0) => table[0],
        Err(idx) if idx >= range.len() => table[range.len() - 1],
        Err(idx) => {
            let x0 = range[idx - 1];
            let x1 = range[idx];
            let y0 = table[idx - 1];
            let y1 = table[idx];
            y0 + (y1 - y0) * (x - x0) / (x1 - x0)
        }
    }
}

/// Derives the integer risk level 0-9 for one component given its most
/// severe damage state and the shaking intensity `ia` at its location.
pub fn risk_level(damage: DamageState, ia: f64) -> u8 {
    if damage.mean == 0.0 {
        return 0;
    }

    let range = pga_range();
    let table = exceedance_table(damage.mean, damage.dispersion, &range);

    if ia > PGA_RANGE_MAX {
        return 9;
    }
    if ia == 0.0 || ia < PGA_RANGE_MIN {
        return 0;
    }

    let p = linear_interp(&range, &table, ia);
    if p - RISK_0 <= 0.0 {
        return 0;
    }

    let level = ((p - RISK_0) / RISK_INTERVAL).ceil() as i64 + 3;
    level.clamp(0, 9) as u8
}

/// Halo risk for a stamped component core of risk `r` (spec.md §4.5/§4.6).
pub fn halo_risk(core_risk: u8) -> u8 {
    core_risk.saturating_sub(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pga_parses_to_fixed_period_and_damping() {
        let im = IntensityMeasure::parse("PGA");
        assert_eq!(im.period, 0.0);
        assert!((im.damping - 0.02).abs() < 1e-12);
    }

    #[test]
    fn sa_imname_extracts_period_and_damping() {
        let im = IntensityMeasure::parse("Sa(T=0.7, \u{3b6}=2%)");
        assert!((im.period - 0.7).abs() < 1e-12);
        assert!((im.damping - 0.02).abs() < 1e-12);
    }

    #[test]
    fn zero_mean_is_always_zero_risk() {
        assert_eq!(risk_level(DamageState { mean: 0.0, dispersion: 0.4 }, 0.5), 0);
    }

    #[test]
    fn above_range_is_max_risk() {
        assert_eq!(risk_level(DamageState { mean: 0.3, dispersion: 0.4 }, 20.0), 9);
    }

    #[test]
    fn below_range_or_zero_intensity_is_zero_risk() {
        assert_eq!(risk_level(DamageState { mean: 0.3, dispersion: 0.4 }, 0.0), 0);
        assert_eq!(risk_level(DamageState { mean: 0.3, dispersion: 0.4 }, 0.001), 0);
    }

    #[test]
    fn scenario_r1_risk_level_six() {
        // spec.md scenario R1: mean=0.3, dispersion=0.4, Ia=PGA=0.3 -> p ~= 0.5 -> level 6.
        let level = risk_level(DamageState { mean: 0.3, dispersion: 0.4 }, 0.3);
        assert_eq!(level, 6);
        assert_eq!(halo_risk(level), 3);
    }

    #[test]
    fn halo_risk_never_negative() {
        assert_eq!(halo_risk(0), 0);
        assert_eq!(halo_risk(2), 0);
        assert_eq!(halo_risk(9), 6);
    }
}
