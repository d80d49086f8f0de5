use std::io::{BufRead, BufReader, ErrorKind};
use std::time::Duration;

use log::debug;
use serialport::SerialPort;

use crate::error::MonitorError;

/// Trait representing something that can yield one raw sample at a time.
///
/// `Ok(None)` means "no sample available yet" (the live source has no
/// complete reading); the producer should retry after a short delay. A
/// sample is never fabricated to paper over an empty read.
pub trait SampleSource: Send {
    fn next_sample(&mut self) -> Result<Option<f64>, MonitorError>;
}

/// Infinite periodic replay of a finite recorded series.
pub struct ReplaySource {
    samples: Vec<f64>,
    index: usize,
}

impl ReplaySource {
    pub fn new(samples: Vec<f64>) -> Result<Self, MonitorError> {
        if samples.is_empty() {
            return Err(MonitorError::InvalidInput(
                "replay source is empty".to_string(),
            ));
        }
        Ok(Self { samples, index: 0 })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl SampleSource for ReplaySource {
    fn next_sample(&mut self) -> Result<Option<f64>, MonitorError> {
        let sample = self.samples[self.index];
        self.index = (self.index + 1) % self.samples.len();
        Ok(Some(sample))
    }
}

/// Live device source: one ASCII float per line over a serial port.
pub struct SerialSource {
    reader: BufReader<Box<dyn SerialPort>>,
    line: String,
}

impl SerialSource {
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self, MonitorError> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(Duration::from_millis(20))
            .open()
            .map_err(|e| MonitorError::Serial(format!("failed to open {port_name}: {e}")))?;
        Ok(Self {
            reader: BufReader::new(port),
            line: String::new(),
        })
    }
}

impl SampleSource for SerialSource {
    fn next_sample(&mut self) -> Result<Option<f64>, MonitorError> {
        match self.reader.read_line(&mut self.line) {
            Ok(0) => Ok(None),
            Ok(_) => {
                let text = self.line.trim();
                if text.is_empty() {
                    self.line.clear();
                    return Ok(None);
                }
                let parsed = text
                    .parse::<f64>()
                    .map_err(|_| MonitorError::Parse(format!("not a number: {text:?}")));
                self.line.clear();
                parsed.map(Some)
            }
            // A timed-out read means the device has nothing yet; any
            // partial line stays accumulated for the next call.
            Err(e) if e.kind() == ErrorKind::TimedOut || e.kind() == ErrorKind::WouldBlock => {
                debug!("serial read timed out, no complete sample yet");
                Ok(None)
            }
            Err(e) => Err(MonitorError::Serial(e.to_string())),
        }
    }
}
