//! Connectivity diagnostics and the power-off hook.

use std::time::Duration;

use tokio::process::Command;
use tracing::{info, warn};

use crate::config::DiagnosticsConfig;

pub struct Diag {
    wlan_command: Vec<String>,
    halt_command: Vec<String>,
    http: reqwest::Client,
    /// Probed with a HEAD request; normally the first radio station.
    probe_url: Option<String>,
}

impl Diag {
    pub fn new(cfg: &DiagnosticsConfig, probe_url: Option<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.probe_timeout_secs))
            .build()?;
        Ok(Self {
            wlan_command: cfg.wlan_command.clone(),
            halt_command: cfg.halt_command.clone(),
            http,
            probe_url,
        })
    }

    /// Runs the link-status command. Exit code 2 means the interface
    /// is up (ifplugstatus convention).
    pub async fn wifi_up(&self) -> bool {
        let Some((program, args)) = self.wlan_command.split_first() else {
            return false;
        };
        match Command::new(program).args(args).status().await {
            Ok(status) => status.code() == Some(2),
            Err(err) => {
                warn!(%err, %program, "wifi check failed to run");
                false
            }
        }
    }

    pub async fn internet_up(&self) -> bool {
        let Some(url) = &self.probe_url else {
            return false;
        };
        match self.http.head(url).send().await {
            Ok(_) => true,
            Err(err) => {
                info!(%err, "internet probe failed");
                false
            }
        }
    }

    /// Polls until both checks pass, up to `attempts`. Used at startup
    /// before auto-playing a stream.
    pub async fn wait_for_network(&self, attempts: u32, delay: Duration) -> bool {
        for attempt in 1..=attempts {
            if self.wifi_up().await && self.internet_up().await {
                return true;
            }
            info!("network not ready ({attempt}/{attempts})");
            tokio::time::sleep(delay).await;
        }
        false
    }

    pub async fn halt(&self) -> anyhow::Result<()> {
        let Some((program, args)) = self.halt_command.split_first() else {
            anyhow::bail!("halt command not configured");
        };
        let status = Command::new(program).args(args).status().await?;
        if !status.success() {
            anyhow::bail!("halt command exited with {status}");
        }
        Ok(())
    }
}
