//! Playback engine capability consumed by the controller.

/// Loudest volume step accepted by the engine.
pub const MAX_VOLUME: u8 = 21;

/// Output volume in `0..=MAX_VOLUME` steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Volume(u8);

impl Volume {
    pub const MAX: Volume = Volume(MAX_VOLUME);

    /// Returns `None` when `level` is above [`MAX_VOLUME`].
    pub const fn new(level: u8) -> Option<Self> {
        if level <= MAX_VOLUME {
            Some(Self(level))
        } else {
            None
        }
    }

    pub const fn level(self) -> u8 {
        self.0
    }

    /// Q15 gain for this step. Quadratic so the low steps stay usable.
    pub const fn gain_q15(self) -> i32 {
        let level = self.0 as i32;
        let max = MAX_VOLUME as i32;
        level * level * 32_768 / (max * max)
    }

    /// Scale one sample, saturating at the i16 limits.
    pub const fn apply(self, sample: i16) -> i16 {
        let scaled = (sample as i32 * self.gain_q15()) >> 15;
        if scaled > i16::MAX as i32 {
            i16::MAX
        } else if scaled < i16::MIN as i32 {
            i16::MIN
        } else {
            scaled as i16
        }
    }
}

/// I2S pins driving the amplifier (MAX98357A on the reference board).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputRouting {
    pub bclk: i32,
    pub lrc: i32,
    pub din: i32,
}

/// Decodes and streams the audio asset.
///
/// `service` must be called on every loop iteration to keep decoding moving.
/// Failures stay inside the engine; the controller only observes `is_running`.
pub trait PlaybackEngine {
    fn set_output_routing(&mut self, routing: &OutputRouting);
    fn set_volume(&mut self, volume: Volume);
    /// Start a play-through of `asset_path` from the beginning.
    fn play_asset(&mut self, asset_path: &str);
    fn pause_resume(&mut self);
    fn is_running(&self) -> bool;
    fn service(&mut self);
}

impl<T: PlaybackEngine + ?Sized> PlaybackEngine for &mut T {
    fn set_output_routing(&mut self, routing: &OutputRouting) {
        T::set_output_routing(self, routing)
    }

    fn set_volume(&mut self, volume: Volume) {
        T::set_volume(self, volume)
    }

    fn play_asset(&mut self, asset_path: &str) {
        T::play_asset(self, asset_path)
    }

    fn pause_resume(&mut self) {
        T::pause_resume(self)
    }

    fn is_running(&self) -> bool {
        T::is_running(self)
    }

    fn service(&mut self) {
        T::service(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_bounds() {
        assert_eq!(Volume::new(0).map(Volume::level), Some(0));
        assert_eq!(Volume::new(21), Some(Volume::MAX));
        assert!(Volume::new(22).is_none());
    }

    #[test]
    fn max_volume_is_unity_gain() {
        assert_eq!(Volume::MAX.gain_q15(), 32_768);
        for sample in [i16::MIN, -1234, 0, 1, 9999, i16::MAX] {
            assert_eq!(Volume::MAX.apply(sample), sample);
        }
    }

    #[test]
    fn zero_volume_is_silent() {
        let mute = Volume::new(0).unwrap();
        assert_eq!(mute.apply(i16::MAX), 0);
        assert_eq!(mute.apply(i16::MIN), 0);
    }

    #[test]
    fn gain_grows_with_level() {
        let mut previous = -1;
        for level in 0..=MAX_VOLUME {
            let gain = Volume::new(level).unwrap().gain_q15();
            assert!(gain > previous);
            previous = gain;
        }
    }
}
