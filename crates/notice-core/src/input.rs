//! Button input abstraction.

use embedded_hal::digital::InputPin;

/// Discrete events produced by the input sampler. Consumed once, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    /// Press released before the long-press threshold.
    Click,
    /// Press has been held for the long-press threshold; still down.
    LongPressStart,
    /// Long press released.
    LongPressStop,
}

/// Physical button wiring and timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonConfig {
    /// GPIO number; also used as the deep-sleep wake source.
    pub pin: i32,
    /// Pressed reads LOW (pull-up to VCC, switch to GND).
    pub active_low: bool,
    pub long_press_ms: u32,
    pub debounce_ms: u32,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            pin: 4,
            active_low: true,
            long_press_ms: 4_000,
            debounce_ms: 50,
        }
    }
}

/// Source of button events and the raw potentiometer reading.
pub trait InputSampler {
    /// Next pending event, at most one per call.
    fn poll_event(&mut self) -> Option<ButtonEvent>;
    /// Raw analog sample in the sampler's fixed range (0..=4095 on ESP32).
    fn read_analog(&mut self) -> u16;
}

impl<T: InputSampler + ?Sized> InputSampler for &mut T {
    fn poll_event(&mut self) -> Option<ButtonEvent> {
        T::poll_event(self)
    }

    fn read_analog(&mut self) -> u16 {
        T::read_analog(self)
    }
}

/// Turns timestamped pressed/released samples into [`ButtonEvent`]s.
#[derive(Debug, Clone)]
pub struct ButtonTracker {
    long_press_ms: u64,
    debounce_ms: u64,
    raw_pressed: bool,
    raw_since_ms: u64,
    stable_pressed: bool,
    press_started_ms: u64,
    long_press_fired: bool,
    suppressed: bool,
}

impl ButtonTracker {
    pub fn new(config: &ButtonConfig) -> Self {
        Self {
            long_press_ms: config.long_press_ms as u64,
            debounce_ms: config.debounce_ms as u64,
            raw_pressed: false,
            raw_since_ms: 0,
            stable_pressed: false,
            press_started_ms: 0,
            long_press_fired: false,
            suppressed: false,
        }
    }

    /// Adopt the current level without emitting anything.
    ///
    /// A press that is already down (the one that woke the device) is
    /// swallowed until it is released.
    pub fn settle(&mut self, pressed: bool, now_ms: u64) {
        self.raw_pressed = pressed;
        self.raw_since_ms = now_ms;
        self.stable_pressed = pressed;
        self.press_started_ms = now_ms;
        self.long_press_fired = false;
        self.suppressed = pressed;
    }

    pub fn is_pressed(&self) -> bool {
        self.stable_pressed
    }

    pub fn update(&mut self, pressed: bool, now_ms: u64) -> Option<ButtonEvent> {
        if pressed != self.raw_pressed {
            self.raw_pressed = pressed;
            self.raw_since_ms = now_ms;
        }

        let settled = now_ms.saturating_sub(self.raw_since_ms) >= self.debounce_ms;
        if self.raw_pressed != self.stable_pressed && settled {
            self.stable_pressed = self.raw_pressed;
            if self.stable_pressed {
                self.press_started_ms = self.raw_since_ms;
                self.long_press_fired = false;
            } else {
                let event = if self.suppressed {
                    None
                } else if self.long_press_fired {
                    Some(ButtonEvent::LongPressStop)
                } else {
                    Some(ButtonEvent::Click)
                };
                self.long_press_fired = false;
                self.suppressed = false;
                return event;
            }
        }

        if self.stable_pressed
            && !self.suppressed
            && !self.long_press_fired
            && now_ms.saturating_sub(self.press_started_ms) >= self.long_press_ms
        {
            self.long_press_fired = true;
            return Some(ButtonEvent::LongPressStart);
        }

        None
    }
}

/// A GPIO button with polarity applied, feeding a [`ButtonTracker`].
pub struct DebouncedButton<P> {
    pin: P,
    active_low: bool,
    tracker: ButtonTracker,
}

impl<P: InputPin> DebouncedButton<P> {
    pub fn new(pin: P, config: &ButtonConfig) -> Self {
        Self {
            pin,
            active_low: config.active_low,
            tracker: ButtonTracker::new(config),
        }
    }

    /// Read the level once and [`ButtonTracker::settle`] on it.
    pub fn settle(&mut self, now_ms: u64) {
        let pressed = self.read_pressed().unwrap_or(false);
        self.tracker.settle(pressed, now_ms);
    }

    pub fn poll(&mut self, now_ms: u64) -> Option<ButtonEvent> {
        match self.read_pressed() {
            Some(pressed) => self.tracker.update(pressed, now_ms),
            None => None,
        }
    }

    fn read_pressed(&mut self) -> Option<bool> {
        let level = if self.active_low {
            self.pin.is_low()
        } else {
            self.pin.is_high()
        };
        match level {
            Ok(pressed) => Some(pressed),
            Err(err) => {
                log::warn!("Button read failed: {:?}", err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    fn config() -> ButtonConfig {
        ButtonConfig::default()
    }

    /// Feed a level every 10ms from `from` to `to` (inclusive), collecting events.
    fn hold(
        tracker: &mut ButtonTracker,
        pressed: bool,
        from: u64,
        to: u64,
    ) -> Vec<(u64, ButtonEvent)> {
        let mut events = Vec::new();
        let mut now = from;
        while now <= to {
            if let Some(event) = tracker.update(pressed, now) {
                events.push((now, event));
            }
            now += 10;
        }
        events
    }

    #[test]
    fn short_press_is_click_on_release() {
        let mut tracker = ButtonTracker::new(&config());
        assert!(hold(&mut tracker, true, 0, 300).is_empty());
        assert!(tracker.is_pressed());
        let events = hold(&mut tracker, false, 310, 500);
        assert_eq!(events, vec![(360, ButtonEvent::Click)]);
    }

    #[test]
    fn long_press_emits_start_then_stop() {
        let mut tracker = ButtonTracker::new(&config());
        let held = hold(&mut tracker, true, 0, 5_000);
        assert_eq!(held, vec![(4_000, ButtonEvent::LongPressStart)]);
        let released = hold(&mut tracker, false, 5_010, 5_200);
        assert_eq!(released, vec![(5_060, ButtonEvent::LongPressStop)]);
    }

    #[test]
    fn bounces_shorter_than_debounce_are_ignored() {
        let mut tracker = ButtonTracker::new(&config());
        for now in (0..200).step_by(10) {
            let pressed = (now / 10) % 2 == 0;
            assert_eq!(tracker.update(pressed, now), None);
        }
        assert!(!tracker.is_pressed());
    }

    #[test]
    fn settled_press_is_swallowed_until_release() {
        let mut tracker = ButtonTracker::new(&config());
        tracker.settle(true, 0);
        assert!(hold(&mut tracker, true, 0, 6_000).is_empty());
        assert!(hold(&mut tracker, false, 6_010, 6_200).is_empty());

        assert!(hold(&mut tracker, true, 7_000, 7_200).is_empty());
        let events = hold(&mut tracker, false, 7_210, 7_400);
        assert_eq!(events, vec![(7_260, ButtonEvent::Click)]);
    }

    struct FakePin {
        low: bool,
    }

    impl ErrorType for FakePin {
        type Error = Infallible;
    }

    impl InputPin for FakePin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.low)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(self.low)
        }
    }

    #[test]
    fn active_low_pin_reports_press_when_low() {
        let mut button = DebouncedButton::new(FakePin { low: false }, &config());
        button.settle(0);
        assert_eq!(button.poll(10), None);

        button.pin.low = true;
        assert_eq!(button.poll(20), None);
        assert_eq!(button.poll(80), None);
        button.pin.low = false;
        assert_eq!(button.poll(100), None);
        assert_eq!(button.poll(150), Some(ButtonEvent::Click));
    }
}
