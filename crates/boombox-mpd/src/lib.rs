//! Minimal MPD client for the boombox appliance.
//!
//! Speaks the MPD text protocol over any `AsyncRead + AsyncWrite`
//! stream and enforces the command/idle envelope: commands are only
//! issued in command mode (`noidle` first when necessary), and the
//! caller re-enters idle mode before blocking on notifications.

pub mod error;
pub mod response;
pub mod session;
pub mod types;

pub use error::MpdError;
pub use session::{ConnectOptions, MpdSession};
pub use types::{Entity, PlayState, ResumeMarker, Status, Track};
