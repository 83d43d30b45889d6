use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
use esp_idf_svc::sys::EspError;
use notice_core::{SettingsError, SettingsStore};

/// Settings namespace in the default NVS partition.
///
/// Booleans are stored as `u8` (0 or 1).
pub struct NvsSettings {
    nvs: EspNvs<NvsDefault>,
}

impl NvsSettings {
    pub fn new(partition: EspDefaultNvsPartition, namespace: &str) -> Result<Self, EspError> {
        let nvs = EspNvs::new(partition, namespace, true)?;
        Ok(Self { nvs })
    }
}

fn backend(err: EspError) -> SettingsError {
    SettingsError::Backend(err.to_string())
}

impl SettingsStore for NvsSettings {
    fn get_int(&mut self, key: &str, default: i32) -> i32 {
        match self.nvs.get_i32(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(err) => {
                log::warn!("NVS read of {} failed: {}", key, err);
                default
            }
        }
    }

    fn get_bool(&mut self, key: &str, default: bool) -> bool {
        match self.nvs.get_u8(key) {
            Ok(Some(value)) => value != 0,
            Ok(None) => default,
            Err(err) => {
                log::warn!("NVS read of {} failed: {}", key, err);
                default
            }
        }
    }

    fn put_int(&mut self, key: &str, value: i32) -> Result<(), SettingsError> {
        notice_core::settings::validate_key(key)?;
        self.nvs.set_i32(key, value).map_err(backend)
    }

    fn put_bool(&mut self, key: &str, value: bool) -> Result<(), SettingsError> {
        notice_core::settings::validate_key(key)?;
        self.nvs.set_u8(key, u8::from(value)).map_err(backend)
    }
}
