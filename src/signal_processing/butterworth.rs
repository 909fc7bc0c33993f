use std::f64::consts::PI;

use num_complex::Complex64;
use serde::Serialize;

use crate::constants::{COEFFICIENT_COUNT, FILTER_ORDER, MIN_DESIGN_CUTOFF_HZ, SAMPLE_RATE};

/// Highest designable cutoff as a fraction of the Nyquist frequency.
/// The bilinear prewarp diverges at Nyquist itself.
const MAX_NYQUIST_FRACTION: f64 = 0.99;

/// Largest accepted deviation of the designed DC gain from 1.
const DC_GAIN_TOLERANCE: f64 = 5e-3;

/// Butterworth low-pass coefficients for the fixed-order direct-form recurrence
///
/// Designed with the bilinear transform: the analog Butterworth prototype
/// poles are placed at `exp(j * pi * (2k + N + 1) / (2N))` scaled by the
/// prewarped cutoff, then mapped to the z-plane. All zeros land on `z = -1`,
/// so the feedforward vector is the binomial expansion of `(1 + z^-1)^N`
/// scaled by the gain that gives exactly unity response at DC.
///
/// `a[0]` is always 1; the recurrence never multiplies by it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ButterworthCoefficients {
    cutoff_hz: u32,
    b: [f64; COEFFICIENT_COUNT],
    a: [f64; COEFFICIENT_COUNT],
}

impl ButterworthCoefficients {
    /// Design a low-pass filter at the nominal input sample rate
    pub fn lowpass(cutoff_hz: u32) -> Self {
        Self::design(cutoff_hz, SAMPLE_RATE)
    }

    /// Design a low-pass filter for an explicit sample rate
    ///
    /// A cutoff of 0 Hz gives silence. Other cutoffs are clamped into
    /// `[MIN_DESIGN_CUTOFF_HZ, 0.99 * Nyquist]` (scaled to `sample_rate`).
    /// A design whose DC gain still misses unity falls back to pass-through.
    pub fn design(cutoff_hz: u32, sample_rate: f64) -> Self {
        if cutoff_hz == 0 {
            return Self::with_feedforward(cutoff_hz, [0.0; COEFFICIENT_COUNT]);
        }

        // Below the floor the expanded order-8 feedback polynomial loses
        // enough precision in f64 to push poles onto the unit circle.
        let min_cutoff = MIN_DESIGN_CUTOFF_HZ as f64 * sample_rate / SAMPLE_RATE;
        let cutoff = (cutoff_hz as f64).clamp(
            min_cutoff,
            sample_rate / 2.0 * MAX_NYQUIST_FRACTION,
        );
        let coeffs = Self::bilinear(cutoff_hz, cutoff, sample_rate);

        let dc_gain = coeffs.dc_gain();
        let finite = coeffs.b.iter().chain(coeffs.a.iter()).all(|c| c.is_finite());
        if !finite || !dc_gain.is_finite() || (dc_gain - 1.0).abs() > DC_GAIN_TOLERANCE {
            log::warn!(
                "Low-pass design at {} Hz is ill-conditioned (DC gain {}), passing audio through",
                cutoff_hz,
                dc_gain
            );
            let mut identity = [0.0; COEFFICIENT_COUNT];
            identity[0] = 1.0;
            return Self::with_feedforward(cutoff_hz, identity);
        }

        coeffs
    }

    /// Coefficients with no feedback, only `b`
    fn with_feedforward(cutoff_hz: u32, b: [f64; COEFFICIENT_COUNT]) -> Self {
        let mut a = [0.0; COEFFICIENT_COUNT];
        a[0] = 1.0;
        Self { cutoff_hz, b, a }
    }

    fn bilinear(cutoff_hz: u32, cutoff: f64, sample_rate: f64) -> Self {
        let n = FILTER_ORDER;
        let fs2 = Complex64::new(2.0 * sample_rate, 0.0);
        let warped = fs2.re * (PI * cutoff / sample_rate).tan();

        let mut poles = [Complex64::new(0.0, 0.0); FILTER_ORDER];
        let mut analog_product = Complex64::new(1.0, 0.0);
        for (k, pole) in poles.iter_mut().enumerate() {
            let theta = PI * (2 * k + n + 1) as f64 / (2 * n) as f64;
            let s = Complex64::from_polar(warped, theta);
            analog_product *= fs2 - s;
            *pole = (fs2 + s) / (fs2 - s);
        }

        // Conjugate pole pairs make the product real.
        let gain = warped.powi(n as i32) / analog_product.re;

        let mut b = [0.0; COEFFICIENT_COUNT];
        let mut binomial = 1.0;
        for (i, coeff) in b.iter_mut().enumerate() {
            *coeff = gain * binomial;
            binomial = binomial * (n - i) as f64 / (i + 1) as f64;
        }

        Self {
            cutoff_hz,
            b,
            a: expand_poles(&poles),
        }
    }

    /// Response at 0 Hz, `sum(b) / sum(a)`
    pub fn dc_gain(&self) -> f64 {
        let b_sum: f64 = self.b.iter().sum();
        if b_sum == 0.0 {
            return 0.0;
        }
        b_sum / self.a.iter().sum::<f64>()
    }

    /// Cutoff the coefficients were requested for (before any clamping)
    pub fn cutoff_hz(&self) -> u32 {
        self.cutoff_hz
    }

    /// Feedforward coefficients `b[0..=N]`
    pub fn feedforward(&self) -> &[f64; COEFFICIENT_COUNT] {
        &self.b
    }

    /// Feedback coefficients `a[0..=N]`, with `a[0] == 1`
    pub fn feedback(&self) -> &[f64; COEFFICIENT_COUNT] {
        &self.a
    }

    /// Magnitude response at `freq_hz` for the nominal sample rate
    pub fn magnitude_at(&self, freq_hz: f64) -> f64 {
        let omega = 2.0 * PI * freq_hz / SAMPLE_RATE;
        if self.b.iter().all(|&b| b == 0.0) {
            return 0.0;
        }
        let mut num = Complex64::new(0.0, 0.0);
        let mut den = Complex64::new(0.0, 0.0);
        for i in 0..COEFFICIENT_COUNT {
            let z_inv = Complex64::from_polar(1.0, -omega * i as f64);
            num += z_inv * self.b[i];
            den += z_inv * self.a[i];
        }
        (num / den).norm()
    }

    /// Magnitude response at `freq_hz` in dB
    pub fn magnitude_db_at(&self, freq_hz: f64) -> f64 {
        20.0 * self.magnitude_at(freq_hz).log10()
    }
}

/// Expand `prod(1 - p_k z^-1)` into real polynomial coefficients.
fn expand_poles(poles: &[Complex64; FILTER_ORDER]) -> [f64; COEFFICIENT_COUNT] {
    let mut poly = [Complex64::new(0.0, 0.0); COEFFICIENT_COUNT];
    poly[0] = Complex64::new(1.0, 0.0);
    for (k, &pole) in poles.iter().enumerate() {
        for i in (1..=k + 1).rev() {
            let prev = poly[i - 1];
            poly[i] -= pole * prev;
        }
    }
    poly.map(|c| c.re)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{CUTOFF_STEP_HZ, MAX_CUTOFF_HZ};
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::FRAC_1_SQRT_2;

    #[test]
    fn test_design_is_deterministic() {
        let first = ButterworthCoefficients::lowpass(4000);
        let second = ButterworthCoefficients::lowpass(4000);
        for i in 0..COEFFICIENT_COUNT {
            assert_eq!(first.feedforward()[i].to_bits(), second.feedforward()[i].to_bits());
            assert_eq!(first.feedback()[i].to_bits(), second.feedback()[i].to_bits());
        }
    }

    #[test]
    fn test_feedback_is_normalized() {
        for cutoff in [100, 1000, 4000, 10_000] {
            let coeffs = ButterworthCoefficients::lowpass(cutoff);
            assert_eq!(coeffs.feedback()[0], 1.0);
        }
    }

    #[test]
    fn test_unity_dc_gain() {
        for cutoff in [500, 2000, 4000, 8000] {
            let coeffs = ButterworthCoefficients::lowpass(cutoff);
            let b_sum: f64 = coeffs.feedforward().iter().sum();
            let a_sum: f64 = coeffs.feedback().iter().sum();
            assert_relative_eq!(b_sum / a_sum, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_feedforward_is_scaled_binomial() {
        let coeffs = ButterworthCoefficients::lowpass(3000);
        let b = coeffs.feedforward();
        let binomials = [1.0, 8.0, 28.0, 56.0, 70.0, 56.0, 28.0, 8.0, 1.0];
        for i in 0..COEFFICIENT_COUNT {
            assert_relative_eq!(b[i], b[0] * binomials[i], max_relative = 1e-12);
        }
    }

    #[test]
    fn test_half_power_at_cutoff() {
        let coeffs = ButterworthCoefficients::lowpass(4000);
        assert_relative_eq!(coeffs.magnitude_at(4000.0), FRAC_1_SQRT_2, epsilon = 1e-6);
    }

    #[test]
    fn test_stopband_attenuation() {
        let coeffs = ButterworthCoefficients::lowpass(4000);
        let attenuation_db = coeffs.magnitude_db_at(8000.0);
        assert!(
            attenuation_db < -40.0,
            "One octave above cutoff too loud: {} dB",
            attenuation_db
        );
    }

    #[test]
    fn test_zero_cutoff_is_silent() {
        let coeffs = ButterworthCoefficients::lowpass(0);
        for &b in coeffs.feedforward() {
            assert_abs_diff_eq!(b, 0.0);
        }
    }

    #[test]
    fn test_zero_cutoff_has_zero_response() {
        let coeffs = ButterworthCoefficients::lowpass(0);
        assert_eq!(coeffs.dc_gain(), 0.0);
        assert_eq!(coeffs.magnitude_at(0.0), 0.0);
        assert_eq!(coeffs.magnitude_db_at(1000.0), f64::NEG_INFINITY);
    }

    #[test]
    fn test_low_cutoffs_clamped_to_minimum() {
        let floor = ButterworthCoefficients::lowpass(MIN_DESIGN_CUTOFF_HZ);
        for cutoff in [1, 100, 200] {
            let coeffs = ButterworthCoefficients::lowpass(cutoff);
            assert_eq!(coeffs.cutoff_hz(), cutoff);
            assert_eq!(coeffs.feedforward(), floor.feedforward());
            assert_eq!(coeffs.feedback(), floor.feedback());
        }
    }

    #[test]
    fn test_every_slider_step_has_unity_dc_gain() {
        for cutoff in (CUTOFF_STEP_HZ..=MAX_CUTOFF_HZ).step_by(CUTOFF_STEP_HZ as usize) {
            let coeffs = ButterworthCoefficients::lowpass(cutoff);
            assert!(
                coeffs.feedforward().iter().chain(coeffs.feedback()).all(|c| c.is_finite()),
                "non-finite coefficients at {} Hz",
                cutoff
            );
            assert_ne!(coeffs.feedback()[1], 0.0, "pass-through fallback at {} Hz", cutoff);
            assert!(
                (coeffs.dc_gain() - 1.0).abs() <= DC_GAIN_TOLERANCE,
                "DC gain {} at {} Hz",
                coeffs.dc_gain(),
                cutoff
            );
        }
    }

    #[test]
    fn test_cutoff_above_nyquist_is_clamped() {
        let coeffs = ButterworthCoefficients::lowpass(48_000);
        assert_eq!(coeffs.cutoff_hz(), 48_000);
        assert!(coeffs.feedforward().iter().all(|c| c.is_finite()));
        assert!(coeffs.feedback().iter().all(|c| c.is_finite()));
    }
}
