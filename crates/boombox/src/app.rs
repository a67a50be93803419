//! The event loop: one `tokio::select!` multiplexing player
//! notifications, input events and the two idle timers.
//!
//! The select only decides what woke us; all session work happens
//! after it, on a plain `&mut` borrow. Before blocking again the loop
//! re-subscribes to player notifications, which keeps the protocol
//! invariant that commands are never sent while an idle request is
//! outstanding.

use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use boombox_mpd::MpdError;

use crate::config::TimersConfig;
use crate::controller::{Controller, Outcome};
use crate::input::InputEvent;

enum Wake {
    Notify(Result<Vec<String>, MpdError>),
    Input(Option<InputEvent>),
    InactivityTimer,
    LongIdleTimer,
}

pub async fn run<S>(
    controller: &mut Controller<S>,
    input: &mut mpsc::Receiver<InputEvent>,
    timers: &TimersConfig,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    controller.startup().await?;

    let inactivity = Duration::from_secs(timers.inactivity_secs);
    let long_idle = Duration::from_secs(timers.long_idle_secs);
    let mut sleep_at = Some(Instant::now() + inactivity);
    let mut pause_at = timers
        .long_idle_enabled
        .then(|| Instant::now() + long_idle);

    loop {
        controller.enter_idle().await?;

        // disarmed timers park on a deadline that never fires
        let parked = Instant::now() + Duration::from_secs(86400);
        let wake = tokio::select! {
            changed = controller.wait_notification() => Wake::Notify(changed),
            event = input.recv() => Wake::Input(event),
            _ = sleep_until(sleep_at.unwrap_or(parked)), if sleep_at.is_some() => {
                Wake::InactivityTimer
            }
            _ = sleep_until(pause_at.unwrap_or(parked)), if pause_at.is_some() => {
                Wake::LongIdleTimer
            }
        };

        match wake {
            Wake::Notify(Ok(subsystems)) => {
                debug!(?subsystems, "player notification");
                if let Err(err) = controller.on_notification().await {
                    report(controller, err)?;
                }
            }
            Wake::Notify(Err(err)) => return Err(err.into()),

            Wake::Input(None) => {
                info!("input sources closed, exiting");
                return Ok(());
            }
            Wake::Input(Some(InputEvent::Quit)) => {
                info!("quit requested");
                return Ok(());
            }
            Wake::Input(Some(InputEvent::Control(control))) => {
                match controller.handle(control).await {
                    Ok(Outcome::Quit) => return Ok(()),
                    Ok(Outcome::Handled) => {
                        controller.wake_display()?;
                        sleep_at = Some(Instant::now() + inactivity);
                        if timers.long_idle_enabled {
                            pause_at = Some(Instant::now() + long_idle);
                        }
                    }
                    Ok(Outcome::Ignored) => {}
                    Err(err) => report(controller, err)?,
                }
            }

            Wake::InactivityTimer => {
                debug!("inactivity, display to sleep");
                controller.sleep_display()?;
                sleep_at = None;
            }
            Wake::LongIdleTimer => {
                info!("long idle, parking playback");
                if let Err(err) = controller.auto_pause().await {
                    report(controller, err)?;
                }
                pause_at = Some(Instant::now() + long_idle);
            }
        }
    }
}

/// Protocol-level errors are shown on the display and the loop keeps
/// going; transport errors end the run iteration.
fn report<S>(controller: &mut Controller<S>, err: anyhow::Error) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match err.downcast_ref::<MpdError>() {
        Some(MpdError::Server { .. }) | Some(MpdError::Malformed(_)) => {
            warn!(%err, "player command failed");
            controller.show_error(&format!("E: {err}"))?;
            Ok(())
        }
        _ => Err(err),
    }
}
