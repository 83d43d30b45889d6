//! Player configuration types and builder

use crate::engine::{OutputRouting, Volume, MAX_VOLUME};
use crate::input::ButtonConfig;
use crate::pause::{PauseInterval, PauseRange};
use crate::settings::{SettingsError, SettingsKeys};

/// Errors that can occur when building configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Volume step above [`MAX_VOLUME`]
    InvalidVolume(u8),
    /// `min_secs` must be at least 1 and not above `max_secs`
    InvalidPauseRange { min_secs: u32, max_secs: u32 },
    /// Default pause lies outside the pause range
    DefaultPauseOutOfRange(u32),
    /// Analog input range must be non-empty
    InvalidAnalogRange,
    /// Long press must outlast the debounce window
    InvalidLongPress { long_press_ms: u32, debounce_ms: u32 },
    /// Namespace or key rejected by the settings backend rules
    InvalidSettingsKey,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::InvalidVolume(level) => {
                write!(f, "Invalid volume {level} (max {MAX_VOLUME})")
            }
            ConfigError::InvalidPauseRange { min_secs, max_secs } => {
                write!(f, "Invalid pause range {min_secs}..={max_secs}")
            }
            ConfigError::DefaultPauseOutOfRange(secs) => {
                write!(f, "Default pause {secs}s outside pause range")
            }
            ConfigError::InvalidAnalogRange => write!(f, "Analog range must be non-empty"),
            ConfigError::InvalidLongPress {
                long_press_ms,
                debounce_ms,
            } => write!(
                f,
                "Long press {long_press_ms}ms must exceed debounce {debounce_ms}ms"
            ),
            ConfigError::InvalidSettingsKey => write!(f, "Invalid settings namespace or key"),
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<SettingsError> for ConfigError {
    fn from(_: SettingsError) -> Self {
        ConfigError::InvalidSettingsKey
    }
}

/// Player configuration
///
/// Use [`PlayerConfig::builder`] to create one.
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Asset played on every play-through, relative to the storage mount point
    pub asset_path: &'static str,
    pub volume: Volume,
    pub routing: OutputRouting,
    pub pause_range: PauseRange,
    /// Pause used when nothing has been persisted yet
    pub default_pause: PauseInterval,
    pub button: ButtonConfig,
    pub keys: SettingsKeys,
    /// Cooperative delay between loop iterations
    pub loop_tick_ms: u32,
}

impl PlayerConfig {
    pub fn builder() -> PlayerConfigBuilder {
        PlayerConfigBuilder::new()
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        let pause_range = PauseRange::new(2, 30, 4095);
        Self {
            asset_path: "/NAB_Notice.wav",
            volume: Volume::MAX,
            routing: OutputRouting {
                bclk: 27,
                lrc: 14,
                din: 26,
            },
            pause_range,
            default_pause: pause_range.clamp(15),
            button: ButtonConfig::default(),
            keys: SettingsKeys::default(),
            loop_tick_ms: 2,
        }
    }
}

/// Builder for constructing [`PlayerConfig`]
///
/// # Example
///
/// ```
/// use notice_core::PlayerConfig;
///
/// let config = PlayerConfig::builder()
///     .asset_path("/chime.wav")
///     .volume(12)
///     .pause_range(5, 60)
///     .default_pause_secs(20)
///     .build()
///     .expect("valid configuration");
/// assert_eq!(config.default_pause.secs(), 20);
/// ```
pub struct PlayerConfigBuilder {
    asset_path: &'static str,
    volume: u8,
    routing: OutputRouting,
    min_pause_secs: u32,
    max_pause_secs: u32,
    analog_max: u16,
    default_pause_secs: u32,
    button: ButtonConfig,
    keys: SettingsKeys,
    loop_tick_ms: u32,
}

impl Default for PlayerConfigBuilder {
    fn default() -> Self {
        let defaults = PlayerConfig::default();
        Self {
            asset_path: defaults.asset_path,
            volume: defaults.volume.level(),
            routing: defaults.routing,
            min_pause_secs: defaults.pause_range.min_secs(),
            max_pause_secs: defaults.pause_range.max_secs(),
            analog_max: defaults.pause_range.analog_max(),
            default_pause_secs: defaults.default_pause.secs(),
            button: defaults.button,
            keys: defaults.keys,
            loop_tick_ms: defaults.loop_tick_ms,
        }
    }
}

impl PlayerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asset_path(mut self, path: &'static str) -> Self {
        self.asset_path = path;
        self
    }

    /// Volume step, `0..=21`
    pub fn volume(mut self, level: u8) -> Self {
        self.volume = level;
        self
    }

    pub fn routing(mut self, routing: OutputRouting) -> Self {
        self.routing = routing;
        self
    }

    /// Pause bounds in seconds, inclusive
    pub fn pause_range(mut self, min_secs: u32, max_secs: u32) -> Self {
        self.min_pause_secs = min_secs;
        self.max_pause_secs = max_secs;
        self
    }

    /// Largest raw value reported by the analog sampler
    pub fn analog_max(mut self, max: u16) -> Self {
        self.analog_max = max;
        self
    }

    pub fn default_pause_secs(mut self, secs: u32) -> Self {
        self.default_pause_secs = secs;
        self
    }

    pub fn button(mut self, button: ButtonConfig) -> Self {
        self.button = button;
        self
    }

    pub fn keys(mut self, keys: SettingsKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn loop_tick_ms(mut self, ms: u32) -> Self {
        self.loop_tick_ms = ms;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first invalid field.
    pub fn build(self) -> Result<PlayerConfig, ConfigError> {
        let volume = Volume::new(self.volume).ok_or(ConfigError::InvalidVolume(self.volume))?;
        if self.min_pause_secs == 0 || self.min_pause_secs > self.max_pause_secs {
            return Err(ConfigError::InvalidPauseRange {
                min_secs: self.min_pause_secs,
                max_secs: self.max_pause_secs,
            });
        }
        if self.analog_max == 0 {
            return Err(ConfigError::InvalidAnalogRange);
        }
        let pause_range = PauseRange::new(self.min_pause_secs, self.max_pause_secs, self.analog_max);
        if !pause_range.contains(self.default_pause_secs) {
            return Err(ConfigError::DefaultPauseOutOfRange(self.default_pause_secs));
        }
        if self.button.long_press_ms <= self.button.debounce_ms {
            return Err(ConfigError::InvalidLongPress {
                long_press_ms: self.button.long_press_ms,
                debounce_ms: self.button.debounce_ms,
            });
        }
        self.keys.validate()?;

        Ok(PlayerConfig {
            asset_path: self.asset_path,
            volume,
            routing: self.routing,
            pause_range,
            default_pause: pause_range.clamp(self.default_pause_secs as i32),
            button: self.button,
            keys: self.keys,
            loop_tick_ms: self.loop_tick_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_device() {
        let config = PlayerConfig::builder().build().unwrap();
        assert_eq!(config.asset_path, "/NAB_Notice.wav");
        assert_eq!(config.volume, Volume::MAX);
        assert_eq!(config.pause_range, PauseRange::new(2, 30, 4095));
        assert_eq!(config.default_pause.secs(), 15);
        assert_eq!(config.button.long_press_ms, 4_000);
        assert_eq!(config.button.pin, 4);
        assert!(config.button.active_low);
        assert_eq!(
            config.routing,
            OutputRouting {
                bclk: 27,
                lrc: 14,
                din: 26
            }
        );
    }

    #[test]
    fn rejects_loud_volume() {
        let result = PlayerConfig::builder().volume(22).build();
        assert!(matches!(result, Err(ConfigError::InvalidVolume(22))));
    }

    #[test]
    fn rejects_inverted_pause_range() {
        let result = PlayerConfig::builder().pause_range(30, 2).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidPauseRange {
                min_secs: 30,
                max_secs: 2
            })
        ));
    }

    #[test]
    fn rejects_default_outside_range() {
        let result = PlayerConfig::builder()
            .pause_range(2, 10)
            .default_pause_secs(15)
            .build();
        assert!(matches!(result, Err(ConfigError::DefaultPauseOutOfRange(15))));
    }

    #[test]
    fn rejects_empty_analog_range() {
        let result = PlayerConfig::builder().analog_max(0).build();
        assert!(matches!(result, Err(ConfigError::InvalidAnalogRange)));
    }

    #[test]
    fn rejects_long_press_inside_debounce() {
        let button = ButtonConfig {
            long_press_ms: 40,
            ..ButtonConfig::default()
        };
        let result = PlayerConfig::builder().button(button).build();
        assert!(matches!(result, Err(ConfigError::InvalidLongPress { .. })));
    }

    #[test]
    fn rejects_long_settings_key() {
        let keys = SettingsKeys {
            paused: "much_too_long_for_nvs",
            ..SettingsKeys::default()
        };
        let result = PlayerConfig::builder().keys(keys).build();
        assert!(matches!(result, Err(ConfigError::InvalidSettingsKey)));
    }
}
