use crate::error::MonitorError;

/// Windowing cursor over a finite recorded series.
///
/// Produces `[cursor, cursor + window_size)` ranges; when a range would
/// run past the end of the source it is clamped to end exactly at the
/// source length and the start shifts back by the same amount, so the
/// window never shrinks below `window_size` unless the whole source is
/// shorter. After each range the cursor advances by a fixed step modulo
/// the source length, giving an infinite periodic replay.
#[derive(Clone, Debug)]
pub struct WindowCursor {
    source_len: usize,
    window_size: usize,
    step: usize,
    cursor: usize,
}

impl WindowCursor {
    pub fn new(source_len: usize, window_size: usize, step: usize) -> Result<Self, MonitorError> {
        if source_len == 0 {
            return Err(MonitorError::InvalidInput(
                "replay source is empty".to_string(),
            ));
        }
        if window_size == 0 || step == 0 {
            return Err(MonitorError::InvalidConfig(
                "window size and cursor step must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            source_len,
            window_size,
            step,
            cursor: 0,
        })
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    /// The window range at the current cursor, without advancing.
    pub fn current_range(&self) -> (usize, usize) {
        let end = (self.cursor + self.window_size).min(self.source_len);
        let start = end.saturating_sub(self.window_size);
        (start, end)
    }

    /// Returns the current window range, then advances the cursor.
    pub fn next_range(&mut self) -> (usize, usize) {
        let range = self.current_range();
        self.cursor = (self.cursor + self.step) % self.source_len;
        range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_source_clamps_to_full_series() {
        let mut cursor = WindowCursor::new(42, 1000, 10).unwrap();
        let (start, end) = cursor.next_range();
        assert_eq!((start, end), (0, 42));
    }

    #[test]
    fn end_clamps_and_start_shifts_back() {
        let mut cursor = WindowCursor::new(2500, 1000, 10).unwrap();
        // Walk the cursor near the end of the source.
        for _ in 0..200 {
            cursor.next_range();
        }
        assert_eq!(cursor.position(), 2000);
        let (start, end) = cursor.next_range();
        assert_eq!(end, 2500);
        assert_eq!(start, 1500);
        assert_eq!(end - start, 1000);
    }

    #[test]
    fn cursor_wraps_after_covering_the_source() {
        // 250 ticks x step 10 = 2500 = source length, so the cursor is
        // back at 0 after the 250th tick.
        let mut cursor = WindowCursor::new(2500, 1000, 10).unwrap();
        for _ in 0..250 {
            cursor.next_range();
        }
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn start_never_goes_negative() {
        let mut cursor = WindowCursor::new(800, 1000, 10).unwrap();
        for _ in 0..100 {
            let (start, end) = cursor.next_range();
            assert_eq!(start, 0);
            assert_eq!(end, 800);
        }
    }

    #[test]
    fn empty_source_is_rejected() {
        assert!(matches!(
            WindowCursor::new(0, 1000, 10),
            Err(MonitorError::InvalidInput(_))
        ));
    }
}
