use embedded_hal::delay::DelayNs;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::sys;

use notice_core::Clock;

/// Milliseconds since boot from the high resolution timer.
pub fn uptime_ms() -> u64 {
    let micros = unsafe { sys::esp_timer_get_time() };
    (micros.max(0) as u64) / 1_000
}

/// Loop clock: FreeRTOS delays so the idle task and watchdog keep running.
#[derive(Debug, Default, Clone, Copy)]
pub struct EspClock;

impl DelayNs for EspClock {
    fn delay_ns(&mut self, ns: u32) {
        FreeRtos.delay_ns(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        FreeRtos::delay_ms(ms);
    }
}

impl Clock for EspClock {
    fn now_ms(&self) -> u64 {
        uptime_ms()
    }
}
