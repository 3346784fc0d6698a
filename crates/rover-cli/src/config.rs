//! Configuration – reads/writes `~/.rover/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Persisted daemon configuration stored in `~/.rover/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// TCP port the cockpit server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared secret required by clients (stored as plain text – file
    /// permissions on `~/.rover/config.toml` are restricted to the owner).
    /// Empty means authentication is disabled.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub auth_token: String,

    /// Milliseconds between camera captures.
    #[serde(default = "default_capture_period_ms")]
    pub capture_period_ms: u64,

    /// Seconds a video stream waits for a fresh frame before closing.
    #[serde(default = "default_video_idle_timeout_secs")]
    pub video_idle_timeout_secs: u64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field(
                "auth_token",
                if self.auth_token.is_empty() { &"<not set>" } else { &"<redacted>" },
            )
            .field("capture_period_ms", &self.capture_period_ms)
            .field("video_idle_timeout_secs", &self.video_idle_timeout_secs)
            .finish()
    }
}

fn default_port() -> u16 {
    8080
}
fn default_capture_period_ms() -> u64 {
    200
}
fn default_video_idle_timeout_secs() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            auth_token: String::new(),
            capture_period_ms: default_capture_period_ms(),
            video_idle_timeout_secs: default_video_idle_timeout_secs(),
        }
    }
}

impl Config {
    pub fn capture_period(&self) -> Duration {
        Duration::from_millis(self.capture_period_ms)
    }

    pub fn video_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.video_idle_timeout_secs)
    }
}

/// Return the path to `~/.rover/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".rover").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &PathBuf) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: Config = toml::from_str(&raw)
        .map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `ROVER_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `ROVER_PORT` | `port` |
/// | `ROVER_AUTH_TOKEN` | `auth_token` |
/// | `ROVER_CAPTURE_PERIOD_MS` | `capture_period_ms` |
/// | `ROVER_VIDEO_IDLE_TIMEOUT_SECS` | `video_idle_timeout_secs` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("ROVER_AUTH_TOKEN") {
        cfg.auth_token = v;
    }
    if let Ok(v) = std::env::var("ROVER_PORT")
        && let Ok(port) = v.parse::<u16>() {
            cfg.port = port;
        }
    if let Ok(v) = std::env::var("ROVER_CAPTURE_PERIOD_MS")
        && let Ok(ms) = v.parse::<u64>() {
            cfg.capture_period_ms = ms;
        }
    if let Ok(v) = std::env::var("ROVER_VIDEO_IDLE_TIMEOUT_SECS")
        && let Ok(secs) = v.parse::<u64>() {
            cfg.video_idle_timeout_secs = secs;
        }
}

/// Save the config to disk, creating `~/.rover/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &PathBuf) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        // Restrict the config directory to the owner only (rwx------) on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    // Write the file with owner-only read/write (rw-------) on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}
