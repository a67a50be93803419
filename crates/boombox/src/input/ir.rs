//! IR remote input relayed by the front-panel microcontroller as text
//! lines (`IR: <CODE>`) over its serial link.

use std::path::Path;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{Control, InputEvent};

/// Decodes one relay line. Unknown codes and chatter that is not an
/// `IR:` line yield `None`.
pub fn parse_line(line: &str) -> Option<Control> {
    let code = line.trim().strip_prefix("IR: ")?;
    match code {
        "POWER" => Some(Control::PlayPause),
        "UP" => Some(Control::Up),
        "DOWN" => Some(Control::Down),
        "LEFT" => Some(Control::Left),
        "RIGHT" => Some(Control::Right),
        "SETUP" => Some(Control::Menu),
        "ENTER" => Some(Control::Ok),
        _ => None,
    }
}

pub async fn run<R>(reader: R, tx: mpsc::Sender<InputEvent>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_line(&line) {
                Some(control) => {
                    if tx.send(InputEvent::Control(control)).await.is_err() {
                        return;
                    }
                }
                None => debug!(line = %line, "unrecognized relay line"),
            },
            Ok(None) => {
                warn!("relay stream closed");
                return;
            }
            Err(err) => {
                warn!(%err, "relay read failed");
            }
        }
    }
}

/// Opens the relay device and feeds its lines into the input channel.
/// A missing device is logged, not fatal: the other sources keep
/// working.
pub fn spawn(device: &Path, tx: mpsc::Sender<InputEvent>) {
    let device = device.to_path_buf();
    tokio::spawn(async move {
        match tokio::fs::File::open(&device).await {
            Ok(file) => run(file, tx).await,
            Err(err) => warn!(device = %device.display(), %err, "cannot open relay device"),
        }
    });
}
