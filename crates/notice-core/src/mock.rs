//! In-memory collaborators for host tests and the scenario harness
//!
//! Each double records what the controller asked of it so tests can assert
//! on the observable side effects: persisted bytes and engine commands.

use alloc::collections::{BTreeMap, VecDeque};
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::clock::Clock;
use crate::engine::{OutputRouting, PlaybackEngine, Volume};
use crate::input::{ButtonEvent, InputSampler};
use crate::power::{PowerControl, WakeSource};
use crate::settings::{validate_key, SettingsError, SettingsStore};
use crate::storage::{AssetStorage, StorageError};

/// Settings store backed by maps, surviving "restarts" as long as the value lives.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    ints: BTreeMap<String, i32>,
    bools: BTreeMap<String, bool>,
    int_writes: usize,
    bool_writes: usize,
    fail_writes: bool,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn int(&self, key: &str) -> Option<i32> {
        self.ints.get(key).copied()
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.bools.get(key).copied()
    }

    pub fn int_writes(&self) -> usize {
        self.int_writes
    }

    pub fn bool_writes(&self) -> usize {
        self.bool_writes
    }

    /// Make every subsequent write fail with a backend error.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    fn check_write(&self, key: &str) -> Result<(), SettingsError> {
        validate_key(key)?;
        if self.fail_writes {
            return Err(SettingsError::Backend("write rejected".to_string()));
        }
        Ok(())
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get_int(&mut self, key: &str, default: i32) -> i32 {
        self.int(key).unwrap_or(default)
    }

    fn get_bool(&mut self, key: &str, default: bool) -> bool {
        self.bool(key).unwrap_or(default)
    }

    fn put_int(&mut self, key: &str, value: i32) -> Result<(), SettingsError> {
        self.check_write(key)?;
        self.ints.insert(key.to_string(), value);
        self.int_writes += 1;
        Ok(())
    }

    fn put_bool(&mut self, key: &str, value: bool) -> Result<(), SettingsError> {
        self.check_write(key)?;
        self.bools.insert(key.to_string(), value);
        self.bool_writes += 1;
        Ok(())
    }
}

/// Input sampler fed from a queue of events and a settable analog level.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    events: VecDeque<ButtonEvent>,
    analog: u16,
}

impl ScriptedInput {
    pub fn new(analog: u16) -> Self {
        Self {
            events: VecDeque::new(),
            analog,
        }
    }

    pub fn push_event(&mut self, event: ButtonEvent) {
        self.events.push_back(event);
    }

    pub fn set_analog(&mut self, raw: u16) {
        self.analog = raw;
    }

    pub fn analog(&self) -> u16 {
        self.analog
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }
}

impl InputSampler for ScriptedInput {
    fn poll_event(&mut self) -> Option<ButtonEvent> {
        self.events.pop_front()
    }

    fn read_analog(&mut self) -> u16 {
        self.analog
    }
}

/// Commands received by [`RecordingEngine`], in order. `service` is only counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    SetOutputRouting(OutputRouting),
    SetVolume(Volume),
    PlayAsset(String),
    PauseResume,
}

/// Playback engine that records commands and plays "instantly".
///
/// A clip stays running until [`RecordingEngine::finish_playthrough`];
/// `pause_resume` toggles it only while a clip is loaded.
#[derive(Debug, Clone, Default)]
pub struct RecordingEngine {
    calls: Vec<EngineCall>,
    loaded: bool,
    running: bool,
    service_calls: usize,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[EngineCall] {
        &self.calls
    }

    pub fn last_call(&self) -> Option<&EngineCall> {
        self.calls.last()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn play_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, EngineCall::PlayAsset(_)))
            .count()
    }

    pub fn service_calls(&self) -> usize {
        self.service_calls
    }

    /// Force a clip to be loaded and running (or not).
    pub fn set_running(&mut self, running: bool) {
        self.loaded = running;
        self.running = running;
    }

    /// The current play-through reached the end of the asset.
    pub fn finish_playthrough(&mut self) {
        self.set_running(false);
    }
}

impl PlaybackEngine for RecordingEngine {
    fn set_output_routing(&mut self, routing: &OutputRouting) {
        self.calls.push(EngineCall::SetOutputRouting(*routing));
    }

    fn set_volume(&mut self, volume: Volume) {
        self.calls.push(EngineCall::SetVolume(volume));
    }

    fn play_asset(&mut self, asset_path: &str) {
        self.calls.push(EngineCall::PlayAsset(asset_path.to_string()));
        self.loaded = true;
        self.running = true;
    }

    fn pause_resume(&mut self) {
        self.calls.push(EngineCall::PauseResume);
        if self.loaded {
            self.running = !self.running;
        }
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn service(&mut self) {
        self.service_calls += 1;
    }
}

/// Clock that only moves when told to (or when the loop delays on it).
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ns: u64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, ms: u64) {
        self.now_ns += ms * 1_000_000;
    }
}

impl DelayNs for ManualClock {
    fn delay_ns(&mut self, ns: u32) {
        self.now_ns += ns as u64;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance(ms as u64);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ns / 1_000_000
    }
}

/// Asset storage whose mount result is fixed up front.
#[derive(Debug, Clone)]
pub struct MockStorage {
    mount_point: String,
    failure: Option<i32>,
    mount_attempts: usize,
}

impl MockStorage {
    pub fn new(mount_point: &str) -> Self {
        Self {
            mount_point: mount_point.to_string(),
            failure: None,
            mount_attempts: 0,
        }
    }

    /// Storage whose mount always fails with `code`.
    pub fn failing(mount_point: &str, code: i32) -> Self {
        Self {
            failure: Some(code),
            ..Self::new(mount_point)
        }
    }

    pub fn mount_attempts(&self) -> usize {
        self.mount_attempts
    }
}

impl AssetStorage for MockStorage {
    fn mount(&mut self) -> Result<(), StorageError> {
        self.mount_attempts += 1;
        match self.failure {
            Some(code) => Err(StorageError::MountFailed(code)),
            None => Ok(()),
        }
    }

    fn mount_point(&self) -> &str {
        &self.mount_point
    }
}

/// Power control that records sleep requests and returns.
#[derive(Debug, Clone, Default)]
pub struct RecordingPower {
    sleeps: Vec<WakeSource>,
}

impl RecordingPower {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> &[WakeSource] {
        &self.sleeps
    }
}

impl PowerControl for RecordingPower {
    fn enter_deep_sleep(&mut self, wake: WakeSource) {
        self.sleeps.push(wake);
    }
}
