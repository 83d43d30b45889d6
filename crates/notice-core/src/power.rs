//! Low-power sleep entry.

/// Level on the wake pin that brings the device out of deep sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeLevel {
    Low,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeSource {
    pub pin: i32,
    pub level: WakeLevel,
}

pub trait PowerControl {
    /// Arm `wake` and enter deep sleep.
    ///
    /// Does not return on hardware: execution restarts from reset after wake.
    fn enter_deep_sleep(&mut self, wake: WakeSource);
}
