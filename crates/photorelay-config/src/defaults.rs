//! Baseline values used when neither the config file nor the command line sets a field.

/// Listen address for the HTTP surface.
pub const BIND_HOST: &str = "0.0.0.0";
/// Listen port for the HTTP surface.
pub const PORT: u16 = 5000;
/// Directory photos are stored in.
pub const SAVE_DIR: &str = "./esp32_photos";
/// Remote server receiving forwarded photos.
pub const REMOTE_ENDPOINT: &str = "http://127.0.0.1:6000/upload";
/// Seconds between forward cycles.
pub const UPLOAD_INTERVAL_SECS: u64 = 60;
/// Per-transfer timeout in seconds.
pub const UPLOAD_TIMEOUT_SECS: u64 = 30;
/// Durable record of forwarded filenames.
pub const SENT_RECORD_PATH: &str = "./sent_files.json";
/// Largest accepted upload body (16 MiB).
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;
