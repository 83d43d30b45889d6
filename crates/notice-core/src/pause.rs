//! Pause interval derived from the potentiometer.

/// Delay between the end of one play-through and the start of the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PauseInterval(u32);

impl PauseInterval {
    pub const fn secs(self) -> u32 {
        self.0
    }

    pub const fn as_millis(self) -> u64 {
        self.0 as u64 * 1_000
    }
}

/// Output bounds of the pause interval and the input range of the analog sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseRange {
    min_secs: u32,
    max_secs: u32,
    /// Largest raw value the sampler can report (4095 on a 12-bit ADC).
    analog_max: u16,
}

impl PauseRange {
    /// Bounds given in either order are stored as `min <= max`.
    pub const fn new(min_secs: u32, max_secs: u32, analog_max: u16) -> Self {
        let (min_secs, max_secs) = if min_secs <= max_secs {
            (min_secs, max_secs)
        } else {
            (max_secs, min_secs)
        };
        Self {
            min_secs,
            max_secs,
            analog_max,
        }
    }

    pub const fn min_secs(&self) -> u32 {
        self.min_secs
    }

    pub const fn max_secs(&self) -> u32 {
        self.max_secs
    }

    pub const fn analog_max(&self) -> u16 {
        self.analog_max
    }

    pub const fn contains(&self, secs: u32) -> bool {
        self.min_secs <= secs && secs <= self.max_secs
    }

    /// Clamp an arbitrary (possibly stale or corrupted) stored value into range.
    pub fn clamp(&self, secs: i32) -> PauseInterval {
        let min = self.min_secs as i64;
        let max = self.max_secs as i64;
        PauseInterval((secs as i64).clamp(min, max) as u32)
    }

    /// Linear map of a raw sample onto `min_secs..=max_secs`, truncating.
    ///
    /// Samples above `analog_max` are treated as `analog_max`, so the result
    /// never leaves the range no matter how noisy the input is.
    pub fn from_analog(&self, raw: u16) -> PauseInterval {
        if self.analog_max == 0 {
            return PauseInterval(self.min_secs);
        }
        let raw = raw.min(self.analog_max) as u64;
        let span = self.max_secs.saturating_sub(self.min_secs) as u64;
        let offset = raw * span / self.analog_max as u64;
        PauseInterval(self.min_secs + offset as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RANGE: PauseRange = PauseRange::new(2, 30, 4095);

    #[test]
    fn analog_extremes_hit_bounds() {
        assert_eq!(RANGE.from_analog(0).secs(), 2);
        assert_eq!(RANGE.from_analog(4095).secs(), 30);
    }

    #[test]
    fn analog_midpoint_truncates() {
        assert_eq!(RANGE.from_analog(2047).secs(), 15);
        assert_eq!(RANGE.from_analog(146).secs(), 2);
        assert_eq!(RANGE.from_analog(147).secs(), 3);
    }

    #[test]
    fn inverted_bounds_are_reordered() {
        let range = PauseRange::new(30, 2, 4095);
        assert_eq!(range, RANGE);
        assert_eq!(range.clamp(-5).secs(), 2);
        assert_eq!(range.clamp(99).secs(), 30);
        assert_eq!(range.from_analog(4095).secs(), 30);
    }

    #[test]
    fn full_input_sweep_is_bounded_and_monotonic() {
        let mut previous = RANGE.from_analog(0);
        for raw in 0..=u16::MAX {
            let interval = RANGE.from_analog(raw);
            assert!(RANGE.contains(interval.secs()), "raw {raw} -> {interval:?}");
            assert!(interval >= previous, "not monotonic at raw {raw}");
            previous = interval;
        }
    }

    #[test]
    fn stored_values_are_clamped() {
        assert_eq!(RANGE.clamp(-5).secs(), 2);
        assert_eq!(RANGE.clamp(15).secs(), 15);
        assert_eq!(RANGE.clamp(i32::MAX).secs(), 30);
    }

    #[test]
    fn interval_millis() {
        assert_eq!(RANGE.clamp(15).as_millis(), 15_000);
    }
}
