use serde::{Deserialize, Serialize};

use crate::config::VitalRange;

/// Severity band for a vital-sign scalar. The rendering layer maps each
/// band to a display color; this core only decides the band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmLevel {
    BelowRange,
    Normal,
    AboveRange,
}

/// Bands a vital-sign value against its configured normal range.
/// Boundary values are Normal: the range is inclusive on both ends.
pub fn classify(value: f64, range: &VitalRange) -> AlarmLevel {
    if value < range.low {
        AlarmLevel::BelowRange
    } else if value > range.high {
        AlarmLevel::AboveRange
    } else {
        AlarmLevel::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VitalRanges;

    #[test]
    fn boundaries_are_inclusive_for_every_configured_range() {
        let ranges = VitalRanges::default();
        for range in [
            ranges.heart_rate,
            ranges.spo2,
            ranges.respiratory_rate,
            ranges.body_temperature,
        ] {
            assert_eq!(classify(range.low, &range), AlarmLevel::Normal);
            assert_eq!(classify(range.high, &range), AlarmLevel::Normal);
        }
    }

    #[test]
    fn bands_split_below_normal_above() {
        let range = VitalRange { low: 60.0, high: 100.0 };
        assert_eq!(classify(59.9, &range), AlarmLevel::BelowRange);
        assert_eq!(classify(80.0, &range), AlarmLevel::Normal);
        assert_eq!(classify(100.1, &range), AlarmLevel::AboveRange);
    }
}
