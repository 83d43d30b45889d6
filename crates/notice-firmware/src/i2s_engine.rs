//! WAV playback from the asset partition to an external I2S DAC.
//!
//! Decoding is driven from the control loop: each `service` call pushes at
//! most one chunk into the DMA queue, so the loop never waits longer than
//! the queue takes to accept it.

use std::fs::File;
use std::io::BufReader;

use esp_idf_svc::hal::delay::TickType;
use esp_idf_svc::hal::gpio::AnyIOPin;
use esp_idf_svc::hal::i2s::config::{
    Config, DataBitWidth, SlotMode, StdClkConfig, StdConfig, StdGpioConfig, StdSlotConfig,
};
use esp_idf_svc::hal::i2s::{I2sDriver, I2sTx, I2S0};
use esp_idf_svc::sys::EspError;
use notice_core::{
    resolve_mount_path, OutputRouting, PcmFormat, PlaybackEngine, Volume, WavSource,
};

const CHUNK_FRAMES: usize = 1024;
const WRITE_TIMEOUT_MS: u64 = 100;

type Source = WavSource<BufReader<File>>;

pub struct I2sWavEngine {
    mount_point: String,
    routing: Option<OutputRouting>,
    volume: Volume,
    driver: Option<I2sDriver<'static, I2sTx>>,
    driver_format: Option<PcmFormat>,
    tx_enabled: bool,
    source: Option<Source>,
    paused: bool,
    pending: Vec<u8>,
    pending_offset: usize,
}

impl I2sWavEngine {
    pub fn new(mount_point: &str) -> Self {
        Self {
            mount_point: mount_point.to_string(),
            routing: None,
            volume: Volume::MAX,
            driver: None,
            driver_format: None,
            tx_enabled: false,
            source: None,
            paused: false,
            pending: Vec::new(),
            pending_offset: 0,
        }
    }

    fn open_source(&self, asset_path: &str) -> Option<Source> {
        let path = resolve_mount_path(asset_path, &self.mount_point);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) => {
                log::warn!("Cannot open {}: {}", path, err);
                return None;
            }
        };
        match WavSource::new(BufReader::new(file)) {
            Ok(source) => Some(source),
            Err(err) => {
                log::warn!("Cannot play {}: {}", path, err);
                None
            }
        }
    }

    /// Reuse the driver when the clip format matches, otherwise rebuild it.
    fn prepare_driver(&mut self, format: PcmFormat) -> Result<(), EspError> {
        if self.driver.is_none() || self.driver_format != Some(format) {
            // Release the peripheral before claiming it again.
            self.driver = None;
            self.tx_enabled = false;
            let Some(routing) = self.routing else {
                log::warn!("No output routing configured");
                return Ok(());
            };
            self.driver = Some(open_driver(&routing, format)?);
            self.driver_format = Some(format);
            log::info!(
                "I2S up: bclk={} lrc={} din={} {} Hz {} ch",
                routing.bclk,
                routing.lrc,
                routing.din,
                format.sample_rate,
                format.channels
            );
        }
        self.set_tx(true);
        Ok(())
    }

    fn set_tx(&mut self, enabled: bool) {
        if self.tx_enabled == enabled {
            return;
        }
        let Some(driver) = self.driver.as_mut() else {
            return;
        };
        let res = if enabled {
            driver.tx_enable()
        } else {
            driver.tx_disable()
        };
        match res {
            Ok(()) => self.tx_enabled = enabled,
            Err(err) => log::warn!("I2S tx toggle failed: {}", err),
        }
    }

    fn stop(&mut self) {
        self.source = None;
        self.paused = false;
        self.pending.clear();
        self.pending_offset = 0;
        self.set_tx(false);
    }

    fn refill(&mut self) -> bool {
        let Some(source) = self.source.as_mut() else {
            return false;
        };
        self.pending.clear();
        self.pending_offset = 0;
        match source.fill(&mut self.pending, CHUNK_FRAMES, self.volume) {
            Ok(0) => {
                log::info!("Play-through finished");
                false
            }
            Ok(_) => true,
            Err(err) => {
                log::warn!("Decode failed: {}", err);
                false
            }
        }
    }
}

fn open_driver(
    routing: &OutputRouting,
    format: PcmFormat,
) -> Result<I2sDriver<'static, I2sTx>, EspError> {
    let slot_mode = if format.channels == 1 {
        SlotMode::Mono
    } else {
        SlotMode::Stereo
    };
    let config = StdConfig::new(
        Config::default().auto_clear(true),
        StdClkConfig::from_sample_rate_hz(format.sample_rate),
        StdSlotConfig::philips_slot_default(DataBitWidth::Bits16, slot_mode),
        StdGpioConfig::default(),
    );

    // Pins come from the routing; nothing else in the firmware claims them.
    let (i2s, bclk, dout, ws) = unsafe {
        (
            I2S0::new(),
            AnyIOPin::new(routing.bclk),
            AnyIOPin::new(routing.din),
            AnyIOPin::new(routing.lrc),
        )
    };
    I2sDriver::new_std_tx(i2s, &config, bclk, dout, Option::<AnyIOPin>::None, ws)
}

impl PlaybackEngine for I2sWavEngine {
    fn set_output_routing(&mut self, routing: &OutputRouting) {
        self.stop();
        self.driver = None;
        self.driver_format = None;
        self.routing = Some(*routing);
    }

    fn set_volume(&mut self, volume: Volume) {
        self.volume = volume;
    }

    fn play_asset(&mut self, asset_path: &str) {
        self.stop();
        let Some(source) = self.open_source(asset_path) else {
            return;
        };
        let format = source.format();
        self.pending.reserve(CHUNK_FRAMES * format.bytes_per_frame());
        if let Err(err) = self.prepare_driver(format) {
            log::error!("I2S driver setup failed: {}", err);
            return;
        }
        if self.driver.is_none() {
            return;
        }
        log::info!(
            "Playing {} ({} frames)",
            asset_path,
            source.duration_frames()
        );
        self.source = Some(source);
    }

    fn pause_resume(&mut self) {
        if self.source.is_none() {
            log::debug!("pause_resume with nothing loaded");
            return;
        }
        self.paused = !self.paused;
        self.set_tx(!self.paused);
    }

    fn is_running(&self) -> bool {
        self.source.is_some() && !self.paused
    }

    fn service(&mut self) {
        if !self.is_running() {
            return;
        }
        if self.pending_offset >= self.pending.len() && !self.refill() {
            self.stop();
            return;
        }
        let Some(driver) = self.driver.as_mut() else {
            self.stop();
            return;
        };
        let timeout = TickType::new_millis(WRITE_TIMEOUT_MS).ticks();
        match driver.write(&self.pending[self.pending_offset..], timeout) {
            Ok(written) => self.pending_offset += written,
            Err(err) => {
                log::warn!("I2S write failed: {}", err);
                self.stop();
            }
        }
    }
}
