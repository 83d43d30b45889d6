//! Playback controller: button events and the potentiometer in, playback
//! commands and persisted settings out.
//!
//! One [`ControllerContext::iterate`] call is one control-loop iteration:
//!
//! 1. service the engine so decoding keeps moving
//! 2. sample the potentiometer, derive the pause interval, persist it
//! 3. poll at most one button event and dispatch it
//! 4. while playing and the engine is idle, restart the asset once the
//!    pause interval has elapsed
//!
//! Events are dispatched before playback is evaluated, so a pause requested
//! in the same iteration a play-through finishes wins over the restart.

use crate::clock::Clock;
use crate::config::PlayerConfig;
use crate::engine::PlaybackEngine;
use crate::input::{ButtonEvent, InputSampler};
use crate::pause::PauseInterval;
use crate::power::{PowerControl, WakeLevel, WakeSource};
use crate::settings::SettingsStore;
use crate::storage::{AssetStorage, StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
}

impl PlaybackState {
    pub const fn from_paused(paused: bool) -> Self {
        if paused {
            PlaybackState::Paused
        } else {
            PlaybackState::Playing
        }
    }

    pub const fn is_paused(self) -> bool {
        matches!(self, PlaybackState::Paused)
    }
}

/// Outcome of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStep {
    Continue,
    /// Long press released; the loop must stop and the device sleep.
    Sleep(WakeSource),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupError {
    /// Asset storage could not be mounted; audio was not initialized.
    Mount(StorageError),
}

impl core::fmt::Display for StartupError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StartupError::Mount(err) => write!(f, "Startup aborted: {}", err),
        }
    }
}

impl core::error::Error for StartupError {}

impl From<StorageError> for StartupError {
    fn from(err: StorageError) -> Self {
        StartupError::Mount(err)
    }
}

/// Everything the control loop touches, passed explicitly to each iteration.
pub struct ControllerContext<S, I, E, C> {
    state: PlaybackState,
    pause: PauseInterval,
    settings: S,
    input: I,
    engine: E,
    clock: C,
    config: PlayerConfig,
    /// When the engine was first seen idle while playing.
    idle_since_ms: Option<u64>,
}

/// Mount storage, restore persisted state and configure the engine.
///
/// Fail-stop: if the mount fails nothing else is touched, in particular the
/// engine is neither routed nor given a volume.
pub fn startup<A, S, I, E, C>(
    storage: &mut A,
    mut settings: S,
    input: I,
    mut engine: E,
    clock: C,
    config: PlayerConfig,
) -> Result<ControllerContext<S, I, E, C>, StartupError>
where
    A: AssetStorage,
    S: SettingsStore,
    I: InputSampler,
    E: PlaybackEngine,
    C: Clock,
{
    if let Err(err) = storage.mount() {
        log::error!("An error has occurred while mounting storage: {}", err);
        return Err(err.into());
    }
    log::info!("Storage mounted at {}", storage.mount_point());

    let keys = config.keys;
    let stored_pause = settings.get_int(keys.pause_secs, config.default_pause.secs() as i32);
    let pause = config.pause_range.clamp(stored_pause);
    if pause.secs() as i64 != stored_pause as i64 {
        log::warn!(
            "Stored pause {}s outside range, using {}s",
            stored_pause,
            pause.secs()
        );
    }
    let state = PlaybackState::from_paused(settings.get_bool(keys.paused, false));
    log::info!("Restored state={:?} pause={}s", state, pause.secs());

    engine.set_output_routing(&config.routing);
    engine.set_volume(config.volume);

    Ok(ControllerContext {
        state,
        pause,
        settings,
        input,
        engine,
        clock,
        config,
        idle_since_ms: None,
    })
}

/// Run iterations until a long press asks for sleep, then enter deep sleep.
///
/// On hardware `enter_deep_sleep` never returns; with a test double this
/// returns the wake source that was armed.
pub fn run<S, I, E, C, P>(ctx: &mut ControllerContext<S, I, E, C>, power: &mut P) -> WakeSource
where
    S: SettingsStore,
    I: InputSampler,
    E: PlaybackEngine,
    C: Clock,
    P: PowerControl,
{
    loop {
        if let LoopStep::Sleep(wake) = ctx.iterate() {
            log::info!("Going to deep sleep...");
            power.enter_deep_sleep(wake);
            return wake;
        }
        if ctx.config.loop_tick_ms > 0 {
            ctx.clock.delay_ms(ctx.config.loop_tick_ms);
        }
    }
}

impl<S, I, E, C> ControllerContext<S, I, E, C>
where
    S: SettingsStore,
    I: InputSampler,
    E: PlaybackEngine,
    C: Clock,
{
    pub fn iterate(&mut self) -> LoopStep {
        self.engine.service();

        self.update_pause_interval();

        if let Some(event) = self.input.poll_event() {
            if let Some(wake) = self.dispatch(event) {
                return LoopStep::Sleep(wake);
            }
        }

        if !self.state.is_paused() {
            self.evaluate_playback();
        }

        LoopStep::Continue
    }

    fn update_pause_interval(&mut self) {
        let raw = self.input.read_analog();
        self.pause = self.config.pause_range.from_analog(raw);
        log::debug!("Pause time: {} seconds (raw {})", self.pause.secs(), raw);

        // Persisted unconditionally, not only on change.
        if let Err(err) = self
            .settings
            .put_int(self.config.keys.pause_secs, self.pause.secs() as i32)
        {
            log::warn!("Failed to persist pause time: {}", err);
        }
    }

    fn dispatch(&mut self, event: ButtonEvent) -> Option<WakeSource> {
        match event {
            ButtonEvent::Click => {
                self.toggle();
                None
            }
            ButtonEvent::LongPressStart => {
                log::info!("Long press detected, release to sleep");
                None
            }
            ButtonEvent::LongPressStop => Some(self.wake_source()),
        }
    }

    fn toggle(&mut self) {
        self.idle_since_ms = None;
        match self.state {
            PlaybackState::Playing => {
                self.set_state(PlaybackState::Paused);
                log::info!("Audio paused!");
                self.engine.pause_resume();
            }
            PlaybackState::Paused => {
                self.set_state(PlaybackState::Playing);
                log::info!("Audio resumed!");
                self.engine.pause_resume();
                // Resume always restarts the asset from the beginning.
                self.engine.play_asset(self.config.asset_path);
            }
        }
    }

    fn set_state(&mut self, state: PlaybackState) {
        self.state = state;
        if let Err(err) = self
            .settings
            .put_bool(self.config.keys.paused, state.is_paused())
        {
            log::warn!("Failed to persist paused flag: {}", err);
        }
    }

    fn evaluate_playback(&mut self) {
        if self.engine.is_running() {
            self.idle_since_ms = None;
            return;
        }

        let now = self.clock.now_ms();
        let idle_since = *self.idle_since_ms.get_or_insert(now);
        if now.saturating_sub(idle_since) >= self.pause.as_millis() {
            log::info!("Starting play-through of {}", self.config.asset_path);
            self.idle_since_ms = None;
            self.engine.play_asset(self.config.asset_path);
        }
    }

    fn wake_source(&self) -> WakeSource {
        let button = &self.config.button;
        WakeSource {
            pin: button.pin,
            level: if button.active_low {
                WakeLevel::Low
            } else {
                WakeLevel::High
            },
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn pause_interval(&self) -> PauseInterval {
        self.pause
    }

    /// True while playing and counting down to the next play-through.
    pub fn is_waiting(&self) -> bool {
        self.idle_since_ms.is_some()
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Tear the context down, handing the collaborators back.
    pub fn into_parts(self) -> (S, I, E, C) {
        (self.settings, self.input, self.engine, self.clock)
    }
}
