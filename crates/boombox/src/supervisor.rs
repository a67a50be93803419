//! Background-mode supervision: pid file plus a restart loop with a
//! minimal-uptime guard against restart storms. Detaching from the
//! terminal is left to the service manager.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::config::DaemonConfig;

pub struct Supervisor {
    pid_file: PathBuf,
    restart_delay: Duration,
    min_uptime: Duration,
}

impl Supervisor {
    pub fn new(cfg: &DaemonConfig) -> Self {
        Self {
            pid_file: cfg.pid_file.clone(),
            restart_delay: Duration::from_secs(cfg.restart_delay_secs),
            min_uptime: Duration::from_secs(cfg.min_uptime_secs),
        }
    }

    fn write_pid_file(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.pid_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.pid_file, std::process::id().to_string())?;
        Ok(())
    }

    /// Runs `iteration` until it returns cleanly, restarting it after
    /// a delay on failure. An iteration that dies before `min_uptime`
    /// is treated as a persistent fault and ends the supervisor.
    pub async fn run<F, Fut>(&self, mut iteration: F) -> anyhow::Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        self.write_pid_file()?;
        let result = loop {
            let started = Instant::now();
            match iteration().await {
                Ok(()) => break Ok(()),
                Err(err) => {
                    if started.elapsed() < self.min_uptime {
                        error!(%err, "died within the minimal-uptime window, giving up");
                        break Err(err);
                    }
                    warn!(%err, "run failed, restarting in {:?}", self.restart_delay);
                    tokio::time::sleep(self.restart_delay).await;
                    info!("restarting");
                }
            }
        };
        let _ = std::fs::remove_file(&self.pid_file);
        result
    }
}
