use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::MonitorError;

/// Loads a single-column numeric series: one float per line, no header.
/// This matches the recorded ECG/PPG/TEMP capture format.
pub fn load_series(path: &Path) -> Result<Vec<f64>, MonitorError> {
    let file = File::open(path)
        .map_err(|e| MonitorError::InvalidInput(format!("{}: {e}", path.display())))?;
    let reader = BufReader::new(file);
    let mut samples = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| MonitorError::InvalidInput(e.to_string()))?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let value: f64 = text.parse().map_err(|_| {
            MonitorError::Parse(format!(
                "{} line {}: not a number: {text:?}",
                path.display(),
                line_no + 1
            ))
        })?;
        samples.push(value);
    }
    if samples.is_empty() {
        return Err(MonitorError::InvalidInput(format!(
            "{} contains no samples",
            path.display()
        )));
    }
    Ok(samples)
}
