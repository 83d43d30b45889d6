//! Persistent key-value settings surviving power cycles and deep sleep.

use alloc::string::String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// The backing store rejected the operation.
    Backend(String),
    /// Key is empty or longer than the backend allows.
    InvalidKey,
}

impl core::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SettingsError::Backend(msg) => write!(f, "Settings backend error: {}", msg),
            SettingsError::InvalidKey => write!(f, "Invalid settings key"),
        }
    }
}

impl core::error::Error for SettingsError {}

/// Longest key NVS accepts (15 characters plus terminator).
pub const MAX_KEY_LEN: usize = 15;

pub fn validate_key(key: &str) -> Result<(), SettingsError> {
    if key.is_empty() || key.len() > MAX_KEY_LEN {
        Err(SettingsError::InvalidKey)
    } else {
        Ok(())
    }
}

/// Key-value store used for the pause interval and paused flag.
///
/// Reads fall back to `default` when the key is absent or unreadable; no
/// schema versioning is involved.
pub trait SettingsStore {
    fn get_int(&mut self, key: &str, default: i32) -> i32;
    fn get_bool(&mut self, key: &str, default: bool) -> bool;
    fn put_int(&mut self, key: &str, value: i32) -> Result<(), SettingsError>;
    fn put_bool(&mut self, key: &str, value: bool) -> Result<(), SettingsError>;
}

impl<T: SettingsStore + ?Sized> SettingsStore for &mut T {
    fn get_int(&mut self, key: &str, default: i32) -> i32 {
        T::get_int(self, key, default)
    }

    fn get_bool(&mut self, key: &str, default: bool) -> bool {
        T::get_bool(self, key, default)
    }

    fn put_int(&mut self, key: &str, value: i32) -> Result<(), SettingsError> {
        T::put_int(self, key, value)
    }

    fn put_bool(&mut self, key: &str, value: bool) -> Result<(), SettingsError> {
        T::put_bool(self, key, value)
    }
}

/// Namespace and key names under which the controller persists its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsKeys {
    pub namespace: &'static str,
    pub pause_secs: &'static str,
    pub paused: &'static str,
}

impl Default for SettingsKeys {
    fn default() -> Self {
        Self {
            namespace: "AUDIO_CONFIG",
            pause_secs: "pause_time",
            paused: "isPaused",
        }
    }
}

impl SettingsKeys {
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_key(self.namespace)?;
        validate_key(self.pause_secs)?;
        validate_key(self.paused)
    }
}
