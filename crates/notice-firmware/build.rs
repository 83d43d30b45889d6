use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let sdkconfig_defaults = PathBuf::from(&manifest_dir).join("sdkconfig.defaults");

    println!("cargo:rerun-if-changed=sdkconfig.defaults");
    println!("cargo:rerun-if-changed=partitions.csv");

    if env::var("ESP_IDF_SDKCONFIG_DEFAULTS").is_err() {
        eprintln!("WARNING: ESP_IDF_SDKCONFIG_DEFAULTS not set! Stack size and SPIFFS partition may be wrong.");
        eprintln!("Build from crates/notice-firmware so .cargo/config.toml is picked up.");
    }

    // esp-idf-sys caches the generated sdkconfig; drop it when the defaults are newer.
    let target_dir = PathBuf::from(&manifest_dir).join("target");
    for build_dir in esp_idf_sys_build_dirs(&target_dir) {
        let sdkconfig = build_dir.join("out/esp-idf/sdkconfig");
        if is_newer(&sdkconfig_defaults, &sdkconfig) {
            eprintln!("sdkconfig.defaults changed! Forcing regeneration...");
            let _ = fs::remove_file(&sdkconfig);
            let _ = fs::remove_dir_all(build_dir.join("out/esp-idf/sdkconfig.d"));
        }
    }

    embuild::espidf::sysenv::output();
}

fn esp_idf_sys_build_dirs(target_dir: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    let Ok(profiles) = fs::read_dir(target_dir) else {
        return dirs;
    };
    for profile in profiles.flatten() {
        let Ok(builds) = fs::read_dir(profile.path().join("build")) else {
            continue;
        };
        dirs.extend(
            builds
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.to_string_lossy().contains("esp-idf-sys")),
        );
    }
    dirs
}

fn is_newer(source: &Path, generated: &Path) -> bool {
    let modified = |path: &Path| fs::metadata(path).and_then(|m| m.modified()).ok();
    match (modified(source), modified(generated)) {
        (Some(source_time), Some(generated_time)) => source_time > generated_time,
        _ => false,
    }
}
