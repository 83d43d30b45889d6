//! Playback controller for the single-button notice looper.
//! Works on ESP32 and on the host (tests, scenario harness).

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![cfg_attr(
    not(test),
    deny(
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::unreachable,
        clippy::unwrap_used
    )
)]

extern crate alloc;

pub mod clock;
pub mod config;
pub mod controller;
pub mod engine;
pub mod input;
pub mod pause;
pub mod power;
pub mod settings;
pub mod storage;

#[cfg(feature = "std")]
pub mod mock;
#[cfg(feature = "std")]
pub mod wav_source;

pub use clock::Clock;
pub use config::{ConfigError, PlayerConfig, PlayerConfigBuilder};
pub use controller::{run, startup, ControllerContext, LoopStep, PlaybackState, StartupError};
pub use engine::{OutputRouting, PlaybackEngine, Volume, MAX_VOLUME};
pub use input::{ButtonConfig, ButtonEvent, ButtonTracker, DebouncedButton, InputSampler};
pub use pause::{PauseInterval, PauseRange};
pub use power::{PowerControl, WakeLevel, WakeSource};
pub use settings::{SettingsError, SettingsKeys, SettingsStore};
pub use storage::{join_path, resolve_mount_path, AssetStorage, StorageError};

#[cfg(feature = "std")]
pub use mock::{
    EngineCall, ManualClock, MemorySettingsStore, MockStorage, RecordingEngine, RecordingPower,
    ScriptedInput,
};
#[cfg(feature = "std")]
pub use wav_source::{PcmFormat, WavError, WavSource};
