use std::ffi::CString;
use std::ptr;

use esp_idf_svc::sys;
use notice_core::{AssetStorage, StorageError};

pub const SPIFFS_MOUNT_POINT: &str = "/spiffs";
const SPIFFS_MAX_FILES: usize = 4;

/// Read-only asset partition registered with the VFS.
pub struct SpiffsStorage {
    base_path: String,
    mounted: bool,
}

impl SpiffsStorage {
    pub fn new() -> Self {
        Self {
            base_path: SPIFFS_MOUNT_POINT.to_string(),
            mounted: false,
        }
    }
}

impl Default for SpiffsStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetStorage for SpiffsStorage {
    fn mount(&mut self) -> Result<(), StorageError> {
        if self.mounted {
            return Ok(());
        }
        let c_base = CString::new(self.base_path.clone()).map_err(|_| StorageError::InvalidPath)?;
        let conf = sys::esp_vfs_spiffs_conf_t {
            base_path: c_base.as_ptr(),
            partition_label: ptr::null(),
            max_files: SPIFFS_MAX_FILES,
            format_if_mount_failed: false,
        };

        let res = unsafe { sys::esp_vfs_spiffs_register(&conf) };
        if res != sys::ESP_OK {
            return Err(StorageError::MountFailed(res));
        }

        let mut total = 0usize;
        let mut used = 0usize;
        if unsafe { sys::esp_spiffs_info(ptr::null(), &mut total, &mut used) } == sys::ESP_OK {
            log::info!(
                "SPIFFS mounted at {}: {} of {} bytes used",
                self.base_path,
                used,
                total
            );
        }
        self.mounted = true;
        Ok(())
    }

    fn mount_point(&self) -> &str {
        &self.base_path
    }
}
