mod clock;
mod i2s_engine;
mod input;
mod nvs_settings;
mod power;
mod runtime_diagnostics;
mod spiffs;

use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::{AnyIOPin, PinDriver, Pull};
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::sys::EspError;

use notice_core::{run, startup, AssetStorage, PlayerConfig, StartupError};

use clock::EspClock;
use i2s_engine::I2sWavEngine;
use input::{PotButtonSampler, POT_ADC2_CHANNEL};
use nvs_settings::NvsSettings;
use power::DeepSleep;
use runtime_diagnostics::{log_heap, log_wakeup_cause};
use spiffs::SpiffsStorage;

const HALT_POLL_MS: u32 = 1_000;

#[derive(Debug)]
enum BootError {
    Esp(EspError),
    Startup(StartupError),
}

impl core::fmt::Display for BootError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BootError::Esp(err) => write!(f, "peripheral setup failed: {}", err),
            BootError::Startup(err) => write!(f, "{}", err),
        }
    }
}

impl From<EspError> for BootError {
    fn from(err: EspError) -> Self {
        BootError::Esp(err)
    }
}

impl From<StartupError> for BootError {
    fn from(err: StartupError) -> Self {
        BootError::Startup(err)
    }
}

fn main() {
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    log::info!("Notice player starting");
    log_wakeup_cause();
    log_heap("boot");

    if let Err(err) = boot(PlayerConfig::default()) {
        log::error!("Startup halted: {}", err);
    }

    // Nothing left to do until the next reset.
    loop {
        FreeRtos::delay_ms(HALT_POLL_MS);
    }
}

fn boot(config: PlayerConfig) -> Result<(), BootError> {
    let mut storage = SpiffsStorage::new();

    let nvs_partition = EspDefaultNvsPartition::take()?;
    let settings = NvsSettings::new(nvs_partition, config.keys.namespace)?;

    // SAFETY: the button pin is only driven through this driver.
    let button_pin = unsafe { AnyIOPin::new(config.button.pin) };
    let mut button = PinDriver::input(button_pin)?;
    button.set_pull(if config.button.active_low {
        Pull::Up
    } else {
        Pull::Down
    })?;
    let input = PotButtonSampler::new(button, &config.button, POT_ADC2_CHANNEL);

    let engine = I2sWavEngine::new(storage.mount_point());

    let mut ctx = startup(&mut storage, settings, input, engine, EspClock, config)?;
    log_heap("controller ready");

    run(&mut ctx, &mut DeepSleep);
    Ok(())
}
