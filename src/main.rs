use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rand::Rng;

use vitals_monitor::{
    csv, AlarmLevel, MonitorConfig, ReplaySource, VitalKind, VitalMonitor, WaveformChannel,
};

const WAVEFORM_TICK: Duration = Duration::from_millis(50);
const VITALS_TICK: Duration = Duration::from_secs(1);

fn band_marker(level: AlarmLevel) -> &'static str {
    match level {
        AlarmLevel::BelowRange => "LOW",
        AlarmLevel::Normal => "ok",
        AlarmLevel::AboveRange => "HIGH",
    }
}

/// Console demo: replays recorded ECG/PPG/TEMP series through the
/// analysis core and prints one vitals line per second. Pass the data
/// directory as the first argument (default: ./data).
fn main() -> Result<()> {
    env_logger::init();

    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));

    let ecg = csv::load_series(&data_dir.join("ECG.csv")).context("loading ECG series")?;
    let ppg = csv::load_series(&data_dir.join("PPG.csv")).context("loading PPG series")?;
    let temp = csv::load_series(&data_dir.join("TEMP.csv")).context("loading TEMP series")?;

    let config_path = data_dir.join("monitor.json");
    let config = if config_path.exists() {
        MonitorConfig::from_json_file(&config_path).context("loading monitor.json")?
    } else {
        MonitorConfig::default()
    };
    let monitor = VitalMonitor::new(config, temp).context("building monitor")?;
    monitor.attach_source(WaveformChannel::Ecg, ReplaySource::new(ecg)?)?;
    monitor.attach_source(WaveformChannel::Ppg, ReplaySource::new(ppg)?)?;
    info!("monitor running; vitals every {VITALS_TICK:?}");

    let mut rng = rand::thread_rng();
    let mut last_vitals: Option<Instant> = None;
    loop {
        // Waveform tick. Early on the buffers are shorter than the
        // filter needs; the previous trace is simply kept.
        for channel in [WaveformChannel::Ecg, WaveformChannel::Ppg] {
            match monitor.waveform_window(channel) {
                Ok(window) => debug!(
                    "{channel:?}: {} samples spanning {:.2} s",
                    window.len(),
                    window.duration_seconds()
                ),
                Err(e) => warn!("{channel:?} window skipped: {e}"),
            }
        }

        if last_vitals.map_or(true, |t| t.elapsed() >= VITALS_TICK) {
            last_vitals = Some(Instant::now());

            // SpO2 and respiratory rate arrive from outside the core; the
            // demo simulates them the way the original dashboard did.
            let spo2 = rng.gen_range(92..100) as f64;
            let respiratory_rate = rng.gen_range(12..20) as f64;
            monitor.set_external_vitals(spo2, respiratory_rate);

            let heart_rate = monitor.heart_rate();
            let body_temp = monitor.vital_scalar(VitalKind::BodyTemperature);
            println!(
                "HR {:6.1} bpm [{}]  SpO2 {:3.0} % [{}]  RR {:2.0} /min [{}]  T {:4.1} C [{}]",
                heart_rate,
                band_marker(monitor.classify(VitalKind::HeartRate, heart_rate)),
                spo2,
                band_marker(monitor.classify(VitalKind::SpO2, spo2)),
                respiratory_rate,
                band_marker(monitor.classify(VitalKind::RespiratoryRate, respiratory_rate)),
                body_temp,
                band_marker(monitor.classify(VitalKind::BodyTemperature, body_temp)),
            );
        }

        thread::sleep(WAVEFORM_TICK);
    }
}
