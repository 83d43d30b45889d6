use embedded_hal::digital::InputPin;
use esp_idf_svc::sys;
use notice_core::{ButtonConfig, ButtonEvent, DebouncedButton, InputSampler};

use crate::clock::uptime_ms;

const ADC_WIDTH_BIT_12: u32 = 3;
const ADC_ATTEN_DB_11: u32 = 3;

/// Pause potentiometer wiper on GPIO15.
pub const POT_ADC2_CHANNEL: sys::adc_channel_t = sys::adc_channel_t_ADC_CHANNEL_3;

/// The single button plus the pause potentiometer.
pub struct PotButtonSampler<P: InputPin> {
    button: DebouncedButton<P>,
    pot_channel: sys::adc_channel_t,
    last_analog: u16,
}

impl<P: InputPin> PotButtonSampler<P> {
    pub fn new(pin: P, config: &ButtonConfig, pot_channel: sys::adc_channel_t) -> Self {
        let res = unsafe { sys::adc2_config_channel_atten(pot_channel, ADC_ATTEN_DB_11) };
        if res != sys::ESP_OK {
            log::warn!("ADC2 channel {} config failed: {}", pot_channel, res);
        }

        let mut button = DebouncedButton::new(pin, config);
        button.settle(uptime_ms());
        Self {
            button,
            pot_channel,
            last_analog: 0,
        }
    }
}

impl<P: InputPin> InputSampler for PotButtonSampler<P> {
    fn poll_event(&mut self) -> Option<ButtonEvent> {
        self.button.poll(uptime_ms())
    }

    fn read_analog(&mut self) -> u16 {
        let mut raw: i32 = 0;
        let res = unsafe { sys::adc2_get_raw(self.pot_channel, ADC_WIDTH_BIT_12, &mut raw) };
        if res == sys::ESP_OK {
            self.last_analog = raw.clamp(0, u16::MAX as i32) as u16;
        } else {
            // ADC2 is shared with the radio; keep the previous reading.
            log::debug!("ADC2 read failed: {}", res);
        }
        self.last_analog
    }
}
