//! Asset storage (flash filesystem) capability.

use alloc::format;
use alloc::string::{String, ToString};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Mount/register call failed with the given driver error code.
    MountFailed(i32),
    /// Mount point or asset path cannot be passed to the driver.
    InvalidPath,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StorageError::MountFailed(code) => write!(f, "Storage mount failed: {}", code),
            StorageError::InvalidPath => write!(f, "Invalid storage path"),
        }
    }
}

impl core::error::Error for StorageError {}

/// Flash filesystem holding the audio asset. Mount failure halts startup.
pub trait AssetStorage {
    fn mount(&mut self) -> Result<(), StorageError>;
    /// VFS prefix under which assets are reachable once mounted.
    fn mount_point(&self) -> &str;
}

pub fn join_path(base: &str, name: &str) -> String {
    if base.ends_with('/') {
        format!("{}{}", base, name.trim_start_matches('/'))
    } else {
        format!("{}/{}", base, name.trim_start_matches('/'))
    }
}

/// Map an asset name such as `/NAB_Notice.wav` onto the VFS mount prefix.
pub fn resolve_mount_path(path: &str, mount_prefix: &str) -> String {
    let prefix = mount_prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return path.to_string();
    }
    if path == prefix || path.starts_with(&format!("{}/", prefix)) {
        path.to_string()
    } else {
        join_path(prefix, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_asset_under_mount_point() {
        assert_eq!(
            resolve_mount_path("/NAB_Notice.wav", "/spiffs"),
            "/spiffs/NAB_Notice.wav"
        );
        assert_eq!(
            resolve_mount_path("NAB_Notice.wav", "/spiffs/"),
            "/spiffs/NAB_Notice.wav"
        );
    }

    #[test]
    fn already_resolved_paths_are_kept() {
        assert_eq!(
            resolve_mount_path("/spiffs/NAB_Notice.wav", "/spiffs"),
            "/spiffs/NAB_Notice.wav"
        );
        assert_eq!(
            resolve_mount_path("/spiffsdata/a.wav", "/spiffs"),
            "/spiffs/spiffsdata/a.wav"
        );
    }

    #[test]
    fn join_handles_trailing_slash() {
        assert_eq!(join_path("/", "a.wav"), "/a.wav");
        assert_eq!(join_path("/spiffs", "/a.wav"), "/spiffs/a.wav");
    }
}
