use std::f64::consts::PI;

use rustfft::num_complex::Complex64;

use crate::config::FilterSpec;
use crate::error::MonitorError;

/// Applies a zero-phase Butterworth low-pass filter to a sample window.
///
/// The window is filtered forward and then backward, so feature timing
/// (in particular peak positions) is preserved. When `spec.padding` is
/// set, both ends are extended by mirroring `pad_len` samples before
/// filtering and the extensions are trimmed from the output, which keeps
/// edge transients out of the visible window. The output always has the
/// same length as the input.
pub fn low_pass_filter(signal: &[f64], spec: &FilterSpec) -> Result<Vec<f64>, MonitorError> {
    spec.validate()?;
    let (b, a) = butter_lowpass(spec.order, spec.normalized_cutoff());

    if spec.padding {
        let pad_len = 3 * b.len().max(a.len());
        if signal.len() < pad_len {
            return Err(MonitorError::InsufficientData {
                required: pad_len,
                actual: signal.len(),
            });
        }
        let mut padded = Vec::with_capacity(signal.len() + 2 * pad_len);
        // Mirror the leading samples, edge included: s[pad-1] .. s[0].
        padded.extend(signal[..pad_len].iter().rev());
        padded.extend_from_slice(signal);
        // Mirror the trailing samples: s[n-1] .. s[n-pad].
        padded.extend(signal[signal.len() - pad_len..].iter().rev());
        let filtered = filtfilt(&b, &a, &padded);
        Ok(filtered[pad_len..pad_len + signal.len()].to_vec())
    } else {
        let min_len = b.len().max(a.len());
        if signal.len() < min_len {
            return Err(MonitorError::InsufficientData {
                required: min_len,
                actual: signal.len(),
            });
        }
        Ok(filtfilt(&b, &a, signal))
    }
}

/// Designs a digital Butterworth low-pass filter in transfer-function
/// form. `normalized_cutoff` is the cutoff divided by Nyquist, in (0, 1).
///
/// Analog prototype poles are placed on the unit circle in the left half
/// plane, scaled to the prewarped cutoff, then mapped to the z-plane with
/// the bilinear transform. Returns `(b, a)`, both of length `order + 1`
/// with `a[0] == 1`.
pub fn butter_lowpass(order: usize, normalized_cutoff: f64) -> (Vec<f64>, Vec<f64>) {
    // Prewarp so the digital response hits the requested cutoff (fs = 2).
    let warped = 4.0 * (PI * normalized_cutoff / 2.0).tan();
    let fs2 = 4.0; // 2 * fs

    let n = order as i32;
    let mut analog_poles = Vec::with_capacity(order);
    for k in 0..order {
        let theta = PI * (-n + 1 + 2 * k as i32) as f64 / (2.0 * n as f64);
        analog_poles.push(-Complex64::from_polar(1.0, theta) * warped);
    }
    let gain = warped.powi(n);

    // Bilinear transform: poles map to (fs2 + p) / (fs2 - p), the N
    // analog zeros at infinity land at z = -1.
    let mut digital_poles = Vec::with_capacity(order);
    let mut gain_z = Complex64::new(gain, 0.0);
    for p in &analog_poles {
        let denom = Complex64::new(fs2, 0.0) - p;
        digital_poles.push((Complex64::new(fs2, 0.0) + p) / denom);
        gain_z /= denom;
    }
    let digital_zeros = vec![Complex64::new(-1.0, 0.0); order];

    let b: Vec<f64> = poly(&digital_zeros)
        .iter()
        .map(|c| (*c * gain_z).re)
        .collect();
    let a: Vec<f64> = poly(&digital_poles).iter().map(|c| c.re).collect();
    (b, a)
}

/// Expands a set of roots into monic polynomial coefficients,
/// highest power first.
fn poly(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for root in roots {
        let mut next = vec![Complex64::new(0.0, 0.0); coeffs.len() + 1];
        for (i, c) in coeffs.iter().enumerate() {
            next[i] += *c;
            next[i + 1] -= *c * *root;
        }
        coeffs = next;
    }
    coeffs
}

/// Single-pass IIR filter, direct form II transposed. `state` is the
/// initial delay-line contents, length `max(len(b), len(a)) - 1`.
fn lfilter(b: &[f64], a: &[f64], signal: &[f64], mut state: Vec<f64>) -> Vec<f64> {
    let n = b.len().max(a.len());
    let mut bn = b.to_vec();
    let mut an = a.to_vec();
    bn.resize(n, 0.0);
    an.resize(n, 0.0);
    state.resize(n.saturating_sub(1), 0.0);

    let mut out = Vec::with_capacity(signal.len());
    for &x in signal {
        let y = bn[0] * x + state.first().copied().unwrap_or(0.0);
        for i in 0..state.len() {
            let next = state.get(i + 1).copied().unwrap_or(0.0);
            state[i] = bn[i + 1] * x + next - an[i + 1] * y;
        }
        out.push(y);
    }
    out
}

/// Steady-state delay-line contents for a unit-step input (`a[0]` must
/// be 1). Seeding a pass with `zi * x[0]` removes the startup transient:
/// a constant input then passes through a unity-DC filter unchanged.
fn lfilter_zi(b: &[f64], a: &[f64]) -> Vec<f64> {
    let n = b.len().max(a.len());
    let mut bn = b.to_vec();
    let mut an = a.to_vec();
    bn.resize(n, 0.0);
    an.resize(n, 0.0);
    if n < 2 {
        return Vec::new();
    }

    // zi solves (I - A^T) zi = b[1:] - a[1:] * b[0] for the companion
    // matrix A of `a`; the first component falls out of the column sums
    // and the rest follow by forward substitution.
    let a_sum: f64 = an.iter().sum();
    let rhs_sum: f64 = (1..n).map(|k| bn[k] - an[k] * bn[0]).sum();
    let mut zi = vec![0.0; n - 1];
    zi[0] = rhs_sum / a_sum;
    let mut a_acc = 1.0;
    let mut c_acc = 0.0;
    for k in 1..n - 1 {
        a_acc += an[k];
        c_acc += bn[k] - an[k] * bn[0];
        zi[k] = a_acc * zi[0] - c_acc;
    }
    zi
}

/// Forward-backward filtering: zero phase, squared magnitude response.
/// Each pass starts from the steady state for its own first sample, so
/// edges see no zero-state startup transient.
fn filtfilt(b: &[f64], a: &[f64], signal: &[f64]) -> Vec<f64> {
    if signal.is_empty() {
        return Vec::new();
    }
    let zi = lfilter_zi(b, a);
    let seed = |x0: f64| zi.iter().map(|z| z * x0).collect::<Vec<f64>>();

    let forward = lfilter(b, a, signal, seed(signal[0]));
    let reversed: Vec<f64> = forward.into_iter().rev().collect();
    let backward = lfilter(b, a, &reversed, seed(reversed[0]));
    backward.into_iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(cutoff_hz: f64, padding: bool) -> FilterSpec {
        FilterSpec {
            cutoff_hz,
            sampling_rate_hz: 250.0,
            order: 4,
            padding,
        }
    }

    #[test]
    fn first_order_coefficients_match_the_analytic_design() {
        // butter(1, 0.5) has the closed form b = [0.5, 0.5], a = [1, 0].
        let (b, a) = butter_lowpass(1, 0.5);
        assert!((b[0] - 0.5).abs() < 1e-12);
        assert!((b[1] - 0.5).abs() < 1e-12);
        assert!((a[0] - 1.0).abs() < 1e-12);
        assert!(a[1].abs() < 1e-12);
    }

    #[test]
    fn dc_gain_is_unity() {
        // A low-pass must pass DC: sum(b) == sum(a).
        for order in 1..=6 {
            let (b, a) = butter_lowpass(order, 0.32);
            let num: f64 = b.iter().sum();
            let den: f64 = a.iter().sum();
            assert!(
                (num / den - 1.0).abs() < 1e-9,
                "order {order}: dc gain {}",
                num / den
            );
        }
    }

    #[test]
    fn output_length_matches_input_length() {
        let signal: Vec<f64> = (0..500).map(|i| (i as f64 * 0.05).sin()).collect();
        let filtered = low_pass_filter(&signal, &spec(40.0, true)).unwrap();
        assert_eq!(filtered.len(), signal.len());
        let unpadded = low_pass_filter(&signal, &spec(40.0, false)).unwrap();
        assert_eq!(unpadded.len(), signal.len());
    }

    #[test]
    fn constant_signal_passes_through() {
        let signal = vec![3.7; 400];
        let filtered = low_pass_filter(&signal, &spec(40.0, true)).unwrap();
        for v in &filtered {
            assert!((v - 3.7).abs() < 1e-9);
        }
    }

    #[test]
    fn narrow_cutoff_keeps_a_constant_window_flat_to_the_edges() {
        // The 5 Hz PPG filter has the longest settling time; without
        // steady-state seeding its edge samples drift far off the DC
        // level. Every output sample must sit on the input level.
        let signal = vec![3.7; 400];
        let filtered = low_pass_filter(&signal, &spec(5.0, true)).unwrap();
        for v in &filtered {
            assert!((v - 3.7).abs() < 1e-9, "edge drifted to {v}");
        }
        let unpadded = low_pass_filter(&signal, &spec(5.0, false)).unwrap();
        for v in &unpadded {
            assert!((v - 3.7).abs() < 1e-9, "edge drifted to {v}");
        }
    }

    #[test]
    fn window_of_exactly_pad_len_is_accepted() {
        // Order 4 gives 5 coefficients each side, so pad_len is 15.
        let signal = vec![2.0; 15];
        let filtered = low_pass_filter(&signal, &spec(40.0, true)).unwrap();
        assert_eq!(filtered.len(), 15);
        let err = low_pass_filter(&signal[..14], &spec(40.0, true)).unwrap_err();
        assert!(matches!(
            err,
            MonitorError::InsufficientData {
                required: 15,
                actual: 14
            }
        ));
    }

    #[test]
    fn zero_phase_preserves_pulse_timing() {
        // A single smooth pulse: its argmax must not move (+/- 1 sample).
        let mut signal = vec![0.0; 301];
        for k in 0..21usize {
            let t = (k as f64 - 10.0) / 4.0;
            signal[140 + k] = (-0.5 * t * t).exp();
        }
        let filtered = low_pass_filter(&signal, &spec(40.0, true)).unwrap();
        let argmax_in = argmax(&signal);
        let argmax_out = argmax(&filtered);
        assert!(
            (argmax_in as i64 - argmax_out as i64).abs() <= 1,
            "peak moved from {argmax_in} to {argmax_out}"
        );
    }

    #[test]
    fn high_frequency_content_is_attenuated() {
        // 5 Hz cutoff at 250 Hz sampling: a 50 Hz tone should collapse.
        let fs = 250.0;
        let signal: Vec<f64> = (0..1000)
            .map(|i| (2.0 * PI * 50.0 * i as f64 / fs).sin())
            .collect();
        let filtered = low_pass_filter(&signal, &spec(5.0, true)).unwrap();
        let peak_in = signal.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        let peak_out = filtered[100..900]
            .iter()
            .fold(0.0f64, |m, v| m.max(v.abs()));
        assert!(peak_out < 0.05 * peak_in, "50 Hz leaked: {peak_out}");
    }

    #[test]
    fn short_window_reports_insufficient_data() {
        let signal = vec![1.0; 10];
        let err = low_pass_filter(&signal, &spec(40.0, true)).unwrap_err();
        assert!(matches!(err, MonitorError::InsufficientData { .. }));
    }

    fn argmax(values: &[f64]) -> usize {
        let mut best = 0;
        for (i, v) in values.iter().enumerate() {
            if *v > values[best] {
                best = i;
            }
        }
        best
    }
}
