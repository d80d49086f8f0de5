use crate::config::HeartRateParams;

/// Estimates the heart rate of a waveform window in beats per minute.
///
/// Peaks (ECG R-peaks or PPG pulses) are local maxima at or above
/// `max(window) * peak_height_factor`, at least `min_peak_distance_s`
/// apart; the rate is 60 over the mean inter-peak interval. Fewer than
/// two peaks yields 0.0, the defined "rate undetermined" sentinel — a
/// flat window therefore reads as 0, not as an error.
pub fn estimate_heart_rate(signal: &[f64], params: &HeartRateParams) -> f64 {
    let peaks = find_peaks(
        signal,
        params.peak_height_factor,
        params.min_peak_distance_samples(),
    );
    if peaks.len() < 2 {
        return 0.0;
    }
    let mut interval_sum = 0.0;
    for pair in peaks.windows(2) {
        interval_sum += (pair[1] - pair[0]) as f64 / params.sampling_rate_hz;
    }
    let mean_interval = interval_sum / (peaks.len() - 1) as f64;
    60.0 / mean_interval
}

/// Indices of local maxima at or above `max(signal) * height_factor`,
/// with a minimum spacing of `min_distance` samples between accepted
/// peaks. When two candidates are closer than that, the higher one wins.
pub fn find_peaks(signal: &[f64], height_factor: f64, min_distance: usize) -> Vec<usize> {
    if signal.len() < 3 {
        return Vec::new();
    }
    let max = signal.iter().copied().fold(f64::MIN, f64::max);
    let threshold = max * height_factor;

    // Strict local maxima; plateaus contribute their midpoint.
    let mut candidates = Vec::new();
    let mut i = 1;
    while i < signal.len() - 1 {
        if signal[i] > signal[i - 1] {
            let start = i;
            while i < signal.len() - 1 && signal[i + 1] == signal[i] {
                i += 1;
            }
            if i < signal.len() - 1 && signal[i + 1] < signal[i] {
                let peak = (start + i) / 2;
                if signal[peak] >= threshold {
                    candidates.push(peak);
                }
            }
        }
        i += 1;
    }

    if min_distance <= 1 || candidates.len() < 2 {
        return candidates;
    }

    // Highest-first suppression: every kept peak removes lower candidates
    // closer than min_distance on either side.
    let mut keep = vec![true; candidates.len()];
    let mut by_height: Vec<usize> = (0..candidates.len()).collect();
    by_height.sort_by(|&i, &j| {
        signal[candidates[i]]
            .partial_cmp(&signal[candidates[j]])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for &i in by_height.iter().rev() {
        if !keep[i] {
            continue;
        }
        let mut j = i;
        while j > 0 {
            j -= 1;
            if candidates[i] - candidates[j] < min_distance {
                keep[j] = false;
            } else {
                break;
            }
        }
        let mut j = i + 1;
        while j < candidates.len() && candidates[j] - candidates[i] < min_distance {
            keep[j] = false;
            j += 1;
        }
    }
    candidates
        .into_iter()
        .zip(keep)
        .filter_map(|(peak, kept)| kept.then_some(peak))
        .collect()
}
