use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("window too short: need at least {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("serial source error: {0}")]
    Serial(String),
    #[error("failed to parse sample: {0}")]
    Parse(String),
    #[error("failed to spawn producer thread: {0}")]
    Thread(String),
}
