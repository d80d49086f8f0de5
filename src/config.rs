use serde::{Deserialize, Serialize};

use crate::error::MonitorError;

/// Low-pass filter configuration for one channel purpose.
///
/// ECG traces keep content up to ~40 Hz; the PPG pulse wave lives well
/// below 5 Hz, so each channel carries its own cutoff.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FilterSpec {
    pub cutoff_hz: f64,
    pub sampling_rate_hz: f64,
    pub order: usize,
    pub padding: bool,
}

impl FilterSpec {
    pub fn new(
        cutoff_hz: f64,
        sampling_rate_hz: f64,
        order: usize,
        padding: bool,
    ) -> Result<Self, MonitorError> {
        let spec = Self {
            cutoff_hz,
            sampling_rate_hz,
            order,
            padding,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.sampling_rate_hz <= 0.0 {
            return Err(MonitorError::InvalidConfig(format!(
                "sampling rate must be positive, got {}",
                self.sampling_rate_hz
            )));
        }
        if self.order == 0 {
            return Err(MonitorError::InvalidConfig(
                "filter order must be at least 1".to_string(),
            ));
        }
        let normalized = self.normalized_cutoff();
        if !(normalized > 0.0 && normalized < 1.0) {
            return Err(MonitorError::InvalidConfig(format!(
                "cutoff {} Hz is outside (0, Nyquist={}) for sampling rate {} Hz",
                self.cutoff_hz,
                0.5 * self.sampling_rate_hz,
                self.sampling_rate_hz
            )));
        }
        Ok(())
    }

    /// Cutoff divided by the Nyquist frequency; must lie strictly in (0, 1).
    pub fn normalized_cutoff(&self) -> f64 {
        self.cutoff_hz / (0.5 * self.sampling_rate_hz)
    }
}

/// Peak-detection parameters for the heart-rate estimator.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct HeartRateParams {
    pub sampling_rate_hz: f64,
    /// Peak threshold as a fraction of the window maximum, in (0, 1].
    pub peak_height_factor: f64,
    /// Minimum spacing between accepted peaks, in seconds.
    pub min_peak_distance_s: f64,
}

impl Default for HeartRateParams {
    fn default() -> Self {
        Self {
            sampling_rate_hz: 250.0,
            peak_height_factor: 0.5,
            min_peak_distance_s: 0.4,
        }
    }
}

impl HeartRateParams {
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.sampling_rate_hz <= 0.0 {
            return Err(MonitorError::InvalidConfig(format!(
                "sampling rate must be positive, got {}",
                self.sampling_rate_hz
            )));
        }
        if !(self.peak_height_factor > 0.0 && self.peak_height_factor <= 1.0) {
            return Err(MonitorError::InvalidConfig(format!(
                "peak height factor must be in (0, 1], got {}",
                self.peak_height_factor
            )));
        }
        if self.min_peak_distance_s <= 0.0 {
            return Err(MonitorError::InvalidConfig(format!(
                "minimum peak distance must be positive, got {}",
                self.min_peak_distance_s
            )));
        }
        Ok(())
    }

    /// Minimum spacing in samples.
    pub fn min_peak_distance_samples(&self) -> usize {
        (self.min_peak_distance_s * self.sampling_rate_hz).round() as usize
    }
}

/// Inclusive normal range for one vital sign.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct VitalRange {
    pub low: f64,
    pub high: f64,
}

impl VitalRange {
    pub fn new(low: f64, high: f64) -> Result<Self, MonitorError> {
        if low > high {
            return Err(MonitorError::InvalidConfig(format!(
                "vital range lower bound {low} exceeds upper bound {high}"
            )));
        }
        Ok(Self { low, high })
    }
}

/// The vital-sign scalars tracked by the monitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VitalKind {
    HeartRate,
    SpO2,
    RespiratoryRate,
    BodyTemperature,
}

/// Normal ranges for all four vital signs.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct VitalRanges {
    pub heart_rate: VitalRange,
    pub spo2: VitalRange,
    pub respiratory_rate: VitalRange,
    pub body_temperature: VitalRange,
}

impl Default for VitalRanges {
    fn default() -> Self {
        // 60-100 bpm is the clinically conventional adult resting range.
        Self {
            heart_rate: VitalRange { low: 60.0, high: 100.0 },
            spo2: VitalRange { low: 95.0, high: 100.0 },
            respiratory_rate: VitalRange { low: 12.0, high: 20.0 },
            body_temperature: VitalRange { low: 36.5, high: 37.5 },
        }
    }
}

impl VitalRanges {
    pub fn get(&self, kind: VitalKind) -> VitalRange {
        match kind {
            VitalKind::HeartRate => self.heart_rate,
            VitalKind::SpO2 => self.spo2,
            VitalKind::RespiratoryRate => self.respiratory_rate,
            VitalKind::BodyTemperature => self.body_temperature,
        }
    }

    pub fn validate(&self) -> Result<(), MonitorError> {
        for range in [
            self.heart_rate,
            self.spo2,
            self.respiratory_rate,
            self.body_temperature,
        ] {
            VitalRange::new(range.low, range.high)?;
        }
        Ok(())
    }
}

/// Full monitor configuration, immutable once the monitor is built.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub sampling_rate_hz: f64,
    /// Analysis window length in samples.
    pub window_size: usize,
    /// Samples the replay cursor advances per display tick.
    pub cursor_step: usize,
    pub ecg_filter: FilterSpec,
    pub ppg_filter: FilterSpec,
    pub heart_rate: HeartRateParams,
    pub ranges: VitalRanges,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        let sampling_rate_hz = 250.0;
        Self {
            sampling_rate_hz,
            window_size: 1000,
            cursor_step: 10,
            ecg_filter: FilterSpec {
                cutoff_hz: 40.0,
                sampling_rate_hz,
                order: 4,
                padding: true,
            },
            ppg_filter: FilterSpec {
                cutoff_hz: 5.0,
                sampling_rate_hz,
                order: 4,
                padding: true,
            },
            heart_rate: HeartRateParams::default(),
            ranges: VitalRanges::default(),
        }
    }
}

impl MonitorConfig {
    /// Loads and validates a configuration from a JSON file.
    pub fn from_json_file(path: &std::path::Path) -> Result<Self, MonitorError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| MonitorError::InvalidInput(format!("{}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| MonitorError::InvalidConfig(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.sampling_rate_hz <= 0.0 {
            return Err(MonitorError::InvalidConfig(format!(
                "sampling rate must be positive, got {}",
                self.sampling_rate_hz
            )));
        }
        if self.window_size == 0 {
            return Err(MonitorError::InvalidConfig(
                "window size must be at least 1 sample".to_string(),
            ));
        }
        if self.cursor_step == 0 {
            return Err(MonitorError::InvalidConfig(
                "cursor step must be at least 1 sample".to_string(),
            ));
        }
        self.ecg_filter.validate()?;
        self.ppg_filter.validate()?;
        self.heart_rate.validate()?;
        self.ranges.validate()?;
        Ok(())
    }
}
