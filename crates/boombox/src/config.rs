use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub mpd: MpdConfig,
    #[serde(default)]
    pub timers: TimersConfig,
    #[serde(default)]
    pub volume: VolumeConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    #[serde(default)]
    pub daemon: DaemonConfig,
    /// `[[station]]` tables — the fixed radio menu.
    #[serde(default = "default_stations", rename = "station")]
    pub stations: Vec<Station>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MpdConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_mpd_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub connect_retries: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimersConfig {
    /// Seconds without input before the display goes to sleep.
    #[serde(default = "default_inactivity")]
    pub inactivity_secs: u64,
    /// Seconds without input before playback is auto-paused.
    #[serde(default = "default_long_idle")]
    pub long_idle_secs: u64,
    #[serde(default)]
    pub long_idle_enabled: bool,
}

/// Up/Down behaviour in the volume screen. The source history carries
/// both policies, so it is a setting rather than a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VolumePolicy {
    /// Up jumps to `max`, Down jumps to 0.
    #[default]
    Coarse,
    /// Up/Down move by `step`.
    Incremental,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeConfig {
    #[serde(default)]
    pub policy: VolumePolicy,
    #[serde(default = "default_volume_step")]
    pub step: u8,
    #[serde(default = "default_volume_max")]
    pub max: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Read logical controls from the terminal keyboard.
    #[serde(default = "default_true")]
    pub keyboard: bool,
    /// Serial device relaying IR codes (`IR: <CODE>` lines).
    #[serde(default)]
    pub ir_device: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Command reporting Wi-Fi link status; exit code 2 means up.
    #[serde(default = "default_wlan_command")]
    pub wlan_command: Vec<String>,
    #[serde(default = "default_halt_command")]
    pub halt_command: Vec<String>,
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_pid_file")]
    pub pid_file: PathBuf,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    #[serde(default = "default_restart_delay")]
    pub restart_delay_secs: u64,
    /// Iterations dying faster than this make the supervisor give up.
    #[serde(default = "default_min_uptime")]
    pub min_uptime_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub url: String,
}

impl Default for MpdConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_secs: default_mpd_timeout(),
            connect_retries: default_retries(),
            retry_delay_secs: default_retry_delay(),
        }
    }
}

impl Default for TimersConfig {
    fn default() -> Self {
        Self {
            inactivity_secs: default_inactivity(),
            long_idle_secs: default_long_idle(),
            long_idle_enabled: false,
        }
    }
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            policy: VolumePolicy::default(),
            step: default_volume_step(),
            max: default_volume_max(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            keyboard: true,
            ir_device: None,
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            wlan_command: default_wlan_command(),
            halt_command: default_halt_command(),
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            pid_file: default_pid_file(),
            log_file: default_log_file(),
            restart_delay_secs: default_restart_delay(),
            min_uptime_secs: default_min_uptime(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    6600
}
fn default_mpd_timeout() -> u64 {
    30
}
fn default_retries() -> u32 {
    30
}
fn default_retry_delay() -> u64 {
    3
}
fn default_inactivity() -> u64 {
    10
}
fn default_long_idle() -> u64 {
    1200
}
fn default_volume_step() -> u8 {
    5
}
fn default_volume_max() -> u8 {
    100
}
fn default_true() -> bool {
    true
}
fn default_probe_timeout() -> u64 {
    2
}

fn default_wlan_command() -> Vec<String> {
    vec![
        "/usr/sbin/ifplugstatus".to_string(),
        "-q".to_string(),
        "wlan0".to_string(),
    ]
}

fn default_halt_command() -> Vec<String> {
    vec!["/sbin/halt".to_string()]
}

fn default_pid_file() -> PathBuf {
    data_dir().join("boombox.pid")
}

fn default_log_file() -> PathBuf {
    data_dir().join("boombox.log")
}

fn default_restart_delay() -> u64 {
    5
}
fn default_min_uptime() -> u64 {
    60
}

fn default_stations() -> Vec<Station> {
    vec![
        Station {
            name: "France Inter".to_string(),
            url: "http://audio.scdn.arkena.com/11008/franceinter-midfi128.mp3".to_string(),
        },
        Station {
            name: "Radio Rennes".to_string(),
            url: "http://sv2.vestaradio.com:5750/;stream.mp3".to_string(),
        },
    ]
}

pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("boombox")
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("boombox")
}

impl Config {
    pub fn default_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// Loads the config, writing one with defaults on first run.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            let config = Self {
                stations: default_stations(),
                ..Self::default()
            };
            config.save(path)?;
            return Ok(config);
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn connect_options(&self) -> boombox_mpd::ConnectOptions {
        boombox_mpd::ConnectOptions {
            host: self.mpd.host.clone(),
            port: self.mpd.port,
            timeout: Duration::from_secs(self.mpd.timeout_secs),
            retries: self.mpd.connect_retries,
            retry_delay: Duration::from_secs(self.mpd.retry_delay_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config {
            stations: default_stations(),
            ..Config::default()
        };
        assert_eq!(config.mpd.port, 6600);
        assert_eq!(config.timers.inactivity_secs, 10);
        assert!(!config.timers.long_idle_enabled);
        assert_eq!(config.volume.policy, VolumePolicy::Coarse);
        assert_eq!(config.stations.len(), 2);
        assert_eq!(config.stations[0].name, "France Inter");
    }

    #[test]
    fn station_table_parses() {
        let config: Config = toml::from_str(
            r#"
            [mpd]
            host = "lecteur.local"

            [volume]
            policy = "incremental"
            step = 2

            [[station]]
            name = "FIP"
            url = "http://icecast.radiofrance.fr/fip-midfi.mp3"
            "#,
        )
        .unwrap();
        assert_eq!(config.mpd.host, "lecteur.local");
        assert_eq!(config.volume.policy, VolumePolicy::Incremental);
        assert_eq!(config.volume.step, 2);
        assert_eq!(config.stations.len(), 1);
        assert_eq!(config.stations[0].name, "FIP");
    }
}
