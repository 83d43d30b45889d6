//! Host-side scenario test harness for scripted controller flows.

use notice_core::{
    run, startup, ButtonEvent, ControllerContext, LoopStep, ManualClock, MemorySettingsStore,
    MockStorage, PlayerConfig, PowerControl, RecordingEngine, RecordingPower, ScriptedInput,
    StartupError, WakeSource,
};

pub type HarnessContext =
    ControllerContext<MemorySettingsStore, ScriptedInput, RecordingEngine, ManualClock>;

/// Mount point the harness pretends the asset storage lives at.
pub const MOUNT_POINT: &str = "/spiffs";

/// Couples a controller with in-memory collaborators for scenario tests.
pub struct ScenarioHarness {
    ctx: HarnessContext,
    power: RecordingPower,
    iterations: usize,
}

impl ScenarioHarness {
    /// Boot against caller-provided persisted settings and potentiometer level.
    pub fn boot(
        config: PlayerConfig,
        settings: MemorySettingsStore,
        analog: u16,
    ) -> Result<Self, StartupError> {
        let mut storage = MockStorage::new(MOUNT_POINT);
        let ctx = startup(
            &mut storage,
            settings,
            ScriptedInput::new(analog),
            RecordingEngine::new(),
            ManualClock::new(),
            config,
        )?;
        Ok(Self {
            ctx,
            power: RecordingPower::new(),
            iterations: 0,
        })
    }

    /// Fresh device: default config, nothing persisted, potentiometer centered.
    pub fn first_boot() -> Self {
        Self::boot(PlayerConfig::default(), MemorySettingsStore::new(), 2047)
            .expect("first boot should mount")
    }

    /// Power-cycle: keep only what was persisted, everything else starts over.
    pub fn restart(self) -> Result<Self, StartupError> {
        let config = self.ctx.config().clone();
        let (settings, input, _engine, _clock) = self.ctx.into_parts();
        Self::boot(config, settings, input.analog())
    }

    /// One loop iteration. Once asleep the loop never runs again.
    pub fn step(&mut self) -> LoopStep {
        if let Some(wake) = self.sleep_wake_source() {
            return LoopStep::Sleep(wake);
        }
        self.iterations += 1;
        let step = self.ctx.iterate();
        if let LoopStep::Sleep(wake) = step {
            self.power.enter_deep_sleep(wake);
        }
        step
    }

    /// Queue an event without running an iteration.
    pub fn queue_event(&mut self, event: ButtonEvent) {
        self.ctx.input_mut().push_event(event);
    }

    /// Queue a click and run the iteration that consumes it.
    pub fn click(&mut self) -> LoopStep {
        self.ctx.input_mut().push_event(ButtonEvent::Click);
        self.step()
    }

    /// Hold past the threshold, then release.
    pub fn long_press(&mut self) -> LoopStep {
        self.ctx.input_mut().push_event(ButtonEvent::LongPressStart);
        self.step();
        self.ctx.input_mut().push_event(ButtonEvent::LongPressStop);
        self.step()
    }

    pub fn set_pot(&mut self, raw: u16) {
        self.ctx.input_mut().set_analog(raw);
    }

    pub fn finish_playthrough(&mut self) {
        self.ctx.engine_mut().finish_playthrough();
    }

    pub fn advance(&mut self, ms: u64) {
        self.ctx.clock_mut().advance(ms);
    }

    /// Step every `tick_ms` for `duration_ms`, stopping early on sleep.
    pub fn run_for(&mut self, duration_ms: u64, tick_ms: u64) -> usize {
        let mut steps = 0;
        let mut elapsed = 0;
        while elapsed < duration_ms {
            steps += 1;
            if let LoopStep::Sleep(_) = self.step() {
                break;
            }
            self.advance(tick_ms);
            elapsed += tick_ms;
        }
        steps
    }

    /// Drive the real `run` loop until it requests sleep.
    ///
    /// Queue a `LongPressStop` first or this never returns.
    pub fn run_until_sleep(&mut self) -> WakeSource {
        run(&mut self.ctx, &mut self.power)
    }

    fn sleep_wake_source(&self) -> Option<WakeSource> {
        self.power.sleeps().first().copied()
    }

    pub fn ctx(&self) -> &HarnessContext {
        &self.ctx
    }

    pub fn engine(&self) -> &RecordingEngine {
        self.ctx.engine()
    }

    pub fn engine_mut(&mut self) -> &mut RecordingEngine {
        self.ctx.engine_mut()
    }

    pub fn settings(&self) -> &MemorySettingsStore {
        self.ctx.settings()
    }

    pub fn power(&self) -> &RecordingPower {
        &self.power
    }

    pub fn is_asleep(&self) -> bool {
        !self.power.sleeps().is_empty()
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }
}
