use esp_idf_svc::sys;
use notice_core::{PowerControl, WakeLevel, WakeSource};

/// Deep sleep with an ext0 wake on the button pin.
pub struct DeepSleep;

impl PowerControl for DeepSleep {
    fn enter_deep_sleep(&mut self, wake: WakeSource) {
        let level = match wake.level {
            WakeLevel::Low => 0,
            WakeLevel::High => 1,
        };

        unsafe {
            // The digital pull-up is not held in deep sleep.
            if wake.level == WakeLevel::Low {
                sys::rtc_gpio_pullup_en(wake.pin);
                sys::rtc_gpio_pulldown_dis(wake.pin);
            } else {
                sys::rtc_gpio_pulldown_en(wake.pin);
                sys::rtc_gpio_pullup_dis(wake.pin);
            }

            let res = sys::esp_sleep_enable_ext0_wakeup(wake.pin, level);
            if res != sys::ESP_OK {
                log::error!("ext0 wake on GPIO{} rejected: {}", wake.pin, res);
            }
            sys::esp_deep_sleep_start();
        }
    }
}
