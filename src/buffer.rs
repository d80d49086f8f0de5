use std::collections::VecDeque;

use crate::error::MonitorError;

/// Snapshot of one channel's current analysis window.
///
/// Timestamps are a logical clock derived from the sample index and the
/// sampling rate, not wall time.
#[derive(Clone, Debug, Default)]
pub struct Window {
    pub timestamps: Vec<f64>,
    pub samples: Vec<f64>,
}

impl Window {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        match (self.timestamps.first(), self.timestamps.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }
}

/// Bounded FIFO of recent samples for one channel.
///
/// Once at capacity every push evicts the single oldest sample first, so
/// the buffer always holds the most recent `window_size` samples in push
/// order. The first timestamp is 0; each subsequent timestamp advances by
/// 1/sampling_rate regardless of wall-clock drift.
pub struct ChannelBuffer {
    samples: VecDeque<f64>,
    timestamps: VecDeque<f64>,
    capacity: usize,
    next_timestamp: f64,
    dt: f64,
}

impl ChannelBuffer {
    pub fn new(window_size: usize, sampling_rate_hz: f64) -> Result<Self, MonitorError> {
        if sampling_rate_hz <= 0.0 {
            return Err(MonitorError::InvalidConfig(format!(
                "sampling rate must be positive, got {sampling_rate_hz}"
            )));
        }
        if window_size == 0 {
            return Err(MonitorError::InvalidConfig(
                "window size must be at least 1 sample".to_string(),
            ));
        }
        Ok(Self {
            samples: VecDeque::with_capacity(window_size),
            timestamps: VecDeque::with_capacity(window_size),
            capacity: window_size,
            next_timestamp: 0.0,
            dt: 1.0 / sampling_rate_hz,
        })
    }

    pub fn push(&mut self, sample: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
            self.timestamps.pop_front();
        }
        self.samples.push_back(sample);
        self.timestamps.push_back(self.next_timestamp);
        self.next_timestamp += self.dt;
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Order-preserving copy of the current window.
    pub fn snapshot(&self) -> Window {
        Window {
            timestamps: self.timestamps.iter().copied().collect(),
            samples: self.samples.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_returns_last_w_samples_in_push_order() {
        let mut buffer = ChannelBuffer::new(5, 250.0).unwrap();
        assert_eq!(buffer.capacity(), 5);
        for i in 0..12 {
            buffer.push(i as f64);
        }
        assert_eq!(buffer.len(), buffer.capacity());
        let window = buffer.snapshot();
        assert_eq!(window.samples, vec![7.0, 8.0, 9.0, 10.0, 11.0]);
        assert_eq!(window.len(), 5);
    }

    #[test]
    fn timestamps_follow_the_logical_clock() {
        let mut buffer = ChannelBuffer::new(3, 250.0).unwrap();
        for i in 0..5 {
            buffer.push(i as f64);
        }
        let window = buffer.snapshot();
        let dt = 1.0 / 250.0;
        // Timestamps keep counting across evictions.
        for (ts, expected_idx) in window.timestamps.iter().zip(2..) {
            assert!((ts - expected_idx as f64 * dt).abs() < 1e-12);
        }
        assert_eq!(window.timestamps.len(), window.samples.len());
    }

    #[test]
    fn partial_fill_returns_everything_pushed() {
        let mut buffer = ChannelBuffer::new(10, 250.0).unwrap();
        buffer.push(1.5);
        buffer.push(2.5);
        let window = buffer.snapshot();
        assert_eq!(window.samples, vec![1.5, 2.5]);
        assert!((window.timestamps[0] - 0.0).abs() < 1e-12);
    }

    #[test]
    fn zero_window_size_is_rejected() {
        assert!(ChannelBuffer::new(0, 250.0).is_err());
    }
}
