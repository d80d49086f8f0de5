pub mod alarm;
pub mod buffer;
pub mod config;
pub mod csv;
pub mod error;
pub mod filter;
pub mod heart_rate;
pub mod monitor;
pub mod replay;
pub mod source;

pub use alarm::{classify, AlarmLevel};
pub use buffer::{ChannelBuffer, Window};
pub use config::{
    FilterSpec, HeartRateParams, MonitorConfig, VitalKind, VitalRange, VitalRanges,
};
pub use error::MonitorError;
pub use filter::low_pass_filter;
pub use heart_rate::estimate_heart_rate;
pub use monitor::{VitalMonitor, WaveformChannel};
pub use replay::WindowCursor;
pub use source::{ReplaySource, SampleSource, SerialSource};
