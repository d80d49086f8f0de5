use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

use crate::alarm::{self, AlarmLevel};
use crate::buffer::{ChannelBuffer, Window};
use crate::config::{MonitorConfig, VitalKind};
use crate::error::MonitorError;
use crate::filter::low_pass_filter;
use crate::heart_rate::estimate_heart_rate;
use crate::replay::WindowCursor;
use crate::source::SampleSource;

/// Waveform channels carried by the monitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaveformChannel {
    Ecg,
    Ppg,
}

#[derive(Clone, Copy, Debug, Default)]
struct ExternalVitals {
    spo2: f64,
    respiratory_rate: f64,
}

/// The streaming analysis core.
///
/// Owns one bounded channel buffer per waveform, the temperature replay
/// series with its window cursor, and the immutable configuration.
/// Producer threads attached via [`attach_source`](Self::attach_source)
/// continuously push samples; the display tick reads through
/// [`waveform_window`](Self::waveform_window), [`heart_rate`](Self::heart_rate),
/// [`vital_scalar`](Self::vital_scalar) and [`classify`](Self::classify).
/// Each buffer sits behind a mutex held only for a single push or a
/// single snapshot copy, so a snapshot never observes a half-applied
/// eviction.
pub struct VitalMonitor {
    config: MonitorConfig,
    ecg: Arc<Mutex<ChannelBuffer>>,
    ppg: Arc<Mutex<ChannelBuffer>>,
    temperature: Vec<f64>,
    temp_cursor: Mutex<WindowCursor>,
    external: Mutex<ExternalVitals>,
    stop: Arc<AtomicBool>,
    producers: Mutex<Vec<JoinHandle<()>>>,
}

// A poisoned lock only means a producer panicked mid-push; the buffer
// itself is still structurally sound, so reads continue.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl VitalMonitor {
    /// Builds the monitor. All fatal validation happens here, before any
    /// producer thread exists: invalid configuration or an empty
    /// temperature series prevents startup.
    pub fn new(config: MonitorConfig, temperature: Vec<f64>) -> Result<Self, MonitorError> {
        config.validate()?;
        let temp_cursor =
            WindowCursor::new(temperature.len(), config.window_size, config.cursor_step)?;
        let ecg = ChannelBuffer::new(config.window_size, config.sampling_rate_hz)?;
        let ppg = ChannelBuffer::new(config.window_size, config.sampling_rate_hz)?;
        Ok(Self {
            config,
            ecg: Arc::new(Mutex::new(ecg)),
            ppg: Arc::new(Mutex::new(ppg)),
            temperature,
            temp_cursor: Mutex::new(temp_cursor),
            external: Mutex::new(ExternalVitals::default()),
            stop: Arc::new(AtomicBool::new(false)),
            producers: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Spawns a producer thread feeding `source` into the channel's
    /// buffer at the sampling-rate cadence. A source with nothing to
    /// offer (`Ok(None)`) is retried after a short backoff; a sample is
    /// never fabricated. Source errors are logged and retried as well,
    /// leaving the buffer untouched. The thread carries the channel's
    /// name so a producer panic is attributable.
    pub fn attach_source<S>(
        &self,
        channel: WaveformChannel,
        mut source: S,
    ) -> Result<(), MonitorError>
    where
        S: SampleSource + 'static,
    {
        let buffer = Arc::clone(match channel {
            WaveformChannel::Ecg => &self.ecg,
            WaveformChannel::Ppg => &self.ppg,
        });
        let stop = Arc::clone(&self.stop);
        let interval = Duration::from_secs_f64(1.0 / self.config.sampling_rate_hz);
        let backoff = Duration::from_millis(5);
        let name = format!("{channel:?}-producer").to_lowercase();
        info!("starting {name} at {} Hz", self.config.sampling_rate_hz);
        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    match source.next_sample() {
                        Ok(Some(sample)) => {
                            lock(&buffer).push(sample);
                            thread::sleep(interval);
                        }
                        Ok(None) => {
                            debug!("{channel:?} source not ready, backing off");
                            thread::sleep(backoff);
                        }
                        Err(e) => {
                            warn!("{channel:?} source error: {e}");
                            thread::sleep(backoff);
                        }
                    }
                }
            })
            .map_err(|e| MonitorError::Thread(e.to_string()))?;
        lock(&self.producers).push(handle);
        Ok(())
    }

    /// Signals all producers to stop and joins them.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
        for handle in lock(&self.producers).drain(..) {
            if handle.join().is_err() {
                warn!("producer thread panicked");
            }
        }
        info!("monitor stopped");
    }

    /// Current filtered window for plotting: a consistent snapshot of the
    /// channel buffer run through that channel's low-pass filter. Until
    /// the buffer holds enough samples for the filter this returns
    /// `InsufficientData`; the caller keeps its previous trace for that
    /// tick. No state is mutated on the error path.
    pub fn waveform_window(&self, channel: WaveformChannel) -> Result<Window, MonitorError> {
        let (snapshot, spec) = match channel {
            WaveformChannel::Ecg => (lock(&self.ecg).snapshot(), self.config.ecg_filter),
            WaveformChannel::Ppg => (lock(&self.ppg).snapshot(), self.config.ppg_filter),
        };
        let filtered = low_pass_filter(&snapshot.samples, &spec)?;
        Ok(Window {
            timestamps: snapshot.timestamps,
            samples: filtered,
        })
    }

    /// Heart rate in bpm estimated from the current raw ECG window.
    /// Returns 0.0 while the rate is undetermined (fewer than two peaks).
    pub fn heart_rate(&self) -> f64 {
        let snapshot = lock(&self.ecg).snapshot();
        estimate_heart_rate(&snapshot.samples, &self.config.heart_rate)
    }

    /// Latest scalar for one vital sign. SpO2 and respiratory rate are
    /// externally supplied (see [`set_external_vitals`](Self::set_external_vitals));
    /// body temperature reads the replay series at the window cursor,
    /// which advances one step per read.
    pub fn vital_scalar(&self, kind: VitalKind) -> f64 {
        match kind {
            VitalKind::HeartRate => self.heart_rate(),
            VitalKind::SpO2 => lock(&self.external).spo2,
            VitalKind::RespiratoryRate => lock(&self.external).respiratory_rate,
            VitalKind::BodyTemperature => {
                let (start, _) = lock(&self.temp_cursor).next_range();
                self.temperature[start]
            }
        }
    }

    /// Records externally supplied SpO2 (%) and respiratory rate
    /// (breaths/min) scalars; the analysis core does not derive these.
    pub fn set_external_vitals(&self, spo2: f64, respiratory_rate: f64) {
        let mut external = lock(&self.external);
        external.spo2 = spo2;
        external.respiratory_rate = respiratory_rate;
    }

    /// Bands a vital-sign value against its configured normal range.
    pub fn classify(&self, kind: VitalKind, value: f64) -> AlarmLevel {
        alarm::classify(value, &self.config.ranges.get(kind))
    }
}

impl Drop for VitalMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
