//! MPD session: connection, command round-trips and the idle envelope.
//!
//! The session tracks whether it is idle-subscribed. Every command
//! path goes through `ensure_command_mode`, which cancels an active
//! subscription first, so no command is ever issued while a `idle`
//! request is outstanding. The event loop re-enters idle with
//! `enter_idle` before blocking again.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::error::{MpdError, Result};
use crate::response::{parse_ack, parse_pair, quote};
use crate::types::{parse_entities, Entity, ResumeMarker, Status, Track};

/// Sticker key under which resume positions are stored.
const RESUME_STICKER: &str = "played";

#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
    /// Connection attempts before giving up (the MPD service may
    /// still be starting when the appliance boots).
    pub retries: u32,
    pub retry_delay: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6600,
            timeout: Duration::from_secs(30),
            retries: 30,
            retry_delay: Duration::from_secs(3),
        }
    }
}

#[derive(Debug)]
pub struct MpdSession<S> {
    io: BufReader<S>,
    /// Persistent line buffer. Reads go through `read_line` so a
    /// cancelled `wait_notification` keeps partially received bytes
    /// and the next read continues the same line.
    line: String,
    idle: bool,
    pub protocol_version: String,
}

impl MpdSession<TcpStream> {
    /// Connects with a bounded retry loop and a fixed inter-attempt
    /// delay. Exhausting the retries is fatal for the run iteration.
    pub async fn connect(opts: &ConnectOptions) -> Result<Self> {
        let addr = format!("{}:{}", opts.host, opts.port);
        let mut last = String::new();
        for attempt in 1..=opts.retries {
            let dial = tokio::time::timeout(opts.timeout, TcpStream::connect(&addr)).await;
            match dial {
                Ok(Ok(stream)) => {
                    stream.set_nodelay(true)?;
                    return Self::open(stream).await;
                }
                Ok(Err(e)) => last = e.to_string(),
                Err(_) => last = "connect timed out".to_string(),
            }
            warn!("mpd connect {}/{} failed: {}", attempt, opts.retries, last);
            tokio::time::sleep(opts.retry_delay).await;
        }
        Err(MpdError::ConnectFailed {
            attempts: opts.retries,
            last,
        })
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> MpdSession<S> {
    /// Wraps an established stream and reads the `OK MPD x.y.z`
    /// greeting. Used directly by tests with an in-memory duplex.
    pub async fn open(stream: S) -> Result<Self> {
        let mut session = Self {
            io: BufReader::new(stream),
            line: String::new(),
            idle: false,
            protocol_version: String::new(),
        };
        let greeting = session.read_line().await?;
        match greeting.strip_prefix("OK MPD ") {
            Some(version) => session.protocol_version = version.to_string(),
            None => return Err(MpdError::BadGreeting(greeting)),
        }
        Ok(session)
    }

    pub fn is_idle(&self) -> bool {
        self.idle
    }

    // ── wire primitives ───────────────────────────────────────────────────

    async fn read_line(&mut self) -> Result<String> {
        let n = self.io.read_line(&mut self.line).await?;
        if n == 0 || !self.line.ends_with('\n') {
            return Err(MpdError::ConnectionClosed);
        }
        let line = self.line.trim_end().to_string();
        self.line.clear();
        Ok(line)
    }

    async fn send_line(&mut self, cmd: &str) -> Result<()> {
        self.io.write_all(cmd.as_bytes()).await?;
        self.io.write_all(b"\n").await?;
        self.io.flush().await?;
        Ok(())
    }

    /// Reads pairs until the terminating `OK`, surfacing `ACK` lines
    /// as `MpdError::Server`.
    async fn read_response(&mut self) -> Result<Vec<(String, String)>> {
        let mut pairs = Vec::new();
        loop {
            let line = self.read_line().await?;
            if line == "OK" {
                return Ok(pairs);
            }
            if line.starts_with("ACK ") {
                return Err(parse_ack(&line)?);
            }
            match parse_pair(&line) {
                Some((key, value)) => pairs.push((key.to_string(), value.to_string())),
                None => return Err(MpdError::Malformed(line)),
            }
        }
    }

    async fn command(&mut self, cmd: &str) -> Result<Vec<(String, String)>> {
        self.ensure_command_mode().await?;
        debug!("mpd: {}", cmd);
        self.send_line(cmd).await?;
        self.read_response().await
    }

    // ── idle envelope ─────────────────────────────────────────────────────

    /// (Re-)subscribes to change notifications. Must be called before
    /// blocking in the event loop; a no-op when already subscribed.
    pub async fn enter_idle(&mut self) -> Result<()> {
        if !self.idle {
            self.send_line("idle").await?;
            self.idle = true;
        }
        Ok(())
    }

    /// Leaves idle mode if subscribed. While `idle` is set exactly one
    /// response is outstanding on the wire (the server ignores a
    /// `noidle` that races with a self-terminated idle), so draining
    /// to the next `OK` restores command mode even when a previous
    /// `wait_notification` was cancelled mid-response.
    pub async fn ensure_command_mode(&mut self) -> Result<()> {
        if !self.idle {
            return Ok(());
        }
        self.send_line("noidle").await?;
        let pairs = self.read_response().await?;
        for (key, value) in &pairs {
            if key == "changed" {
                debug!("mpd: discarding pre-command notification: {}", value);
            }
        }
        self.idle = false;
        Ok(())
    }

    /// Waits for the idle response and returns the changed
    /// subsystems. Cancellation-safe: dropping the future leaves the
    /// session idle-subscribed and `ensure_command_mode` finishes the
    /// drain.
    pub async fn wait_notification(&mut self) -> Result<Vec<String>> {
        debug_assert!(self.idle, "wait_notification outside idle mode");
        let mut changed = Vec::new();
        loop {
            let line = self.read_line().await?;
            if line == "OK" {
                self.idle = false;
                return Ok(changed);
            }
            if line.starts_with("ACK ") {
                self.idle = false;
                return Err(parse_ack(&line)?);
            }
            if let Some(("changed", subsystem)) = parse_pair(&line) {
                changed.push(subsystem.to_string());
            }
        }
    }

    // ── queries ───────────────────────────────────────────────────────────

    pub async fn status(&mut self) -> Result<Status> {
        let pairs = self.command("status").await?;
        Ok(Status::from_pairs(&pairs))
    }

    pub async fn current_song(&mut self) -> Result<Option<Track>> {
        let pairs = self.command("currentsong").await?;
        let entities = parse_entities(&pairs);
        Ok(entities.into_iter().find_map(|e| match e {
            Entity::Song(track) => Some(track),
            Entity::Directory(_) => None,
        }))
    }

    /// Lists either the top-level directories (`path = None`) or the
    /// tracks directly inside `path`.
    pub async fn browse(&mut self, path: Option<&str>) -> Result<Vec<Entity>> {
        let cmd = match path {
            Some(p) => format!("lsinfo {}", quote(p)),
            None => "lsinfo \"/\"".to_string(),
        };
        let pairs = self.command(&cmd).await?;
        let entities = parse_entities(&pairs);
        Ok(entities
            .into_iter()
            .filter(|e| match (path, e) {
                (None, Entity::Directory(_)) => true,
                (Some(_), Entity::Song(_)) => true,
                _ => false,
            })
            .collect())
    }

    /// Every track URI in the library, for cross-referencing resume
    /// markers against tracks that still exist.
    pub async fn list_all_uris(&mut self) -> Result<Vec<String>> {
        let pairs = self.command("listall").await?;
        Ok(pairs
            .into_iter()
            .filter(|(key, _)| key == "file")
            .map(|(_, value)| value)
            .collect())
    }

    // ── playback / queue ──────────────────────────────────────────────────

    pub async fn play(&mut self) -> Result<()> {
        self.command("play").await.map(drop)
    }

    pub async fn pause(&mut self, paused: bool) -> Result<()> {
        self.command(if paused { "pause 1" } else { "pause 0" })
            .await
            .map(drop)
    }

    pub async fn stop(&mut self) -> Result<()> {
        self.command("stop").await.map(drop)
    }

    pub async fn clear(&mut self) -> Result<()> {
        self.command("clear").await.map(drop)
    }

    pub async fn add(&mut self, uri: &str) -> Result<()> {
        self.command(&format!("add {}", quote(uri))).await.map(drop)
    }

    /// Absolute seek within the current track.
    pub async fn seek_to(&mut self, seconds: f64) -> Result<()> {
        self.command(&format!("seekcur {:.1}", seconds.max(0.0)))
            .await
            .map(drop)
    }

    pub async fn set_volume(&mut self, volume: u8) -> Result<()> {
        self.command(&format!("setvol {}", volume.min(100)))
            .await
            .map(drop)
    }

    /// Relative volume change, clamped to [0, 100]. Returns the new
    /// volume, or `None` when the server has no mixer.
    pub async fn change_volume(&mut self, delta: i16) -> Result<Option<u8>> {
        let status = self.status().await?;
        let Some(current) = status.volume else {
            return Ok(None);
        };
        let target = (current as i16 + delta).clamp(0, 100) as u8;
        if target != current {
            self.set_volume(target).await?;
        }
        Ok(Some(target))
    }

    // ── resume markers (stickers) ─────────────────────────────────────────

    pub async fn set_resume_marker(&mut self, uri: &str, seconds: u64) -> Result<()> {
        self.command(&format!(
            "sticker set song {} {} {}",
            quote(uri),
            RESUME_STICKER,
            quote(&seconds.to_string())
        ))
        .await
        .map(drop)
    }

    pub async fn resume_markers(&mut self) -> Result<Vec<ResumeMarker>> {
        let pairs = self
            .command(&format!("sticker find song \"\" {}", RESUME_STICKER))
            .await?;
        let mut markers = Vec::new();
        let mut current_uri: Option<String> = None;
        for (key, value) in pairs {
            match key.as_str() {
                "file" => current_uri = Some(value),
                "sticker" => {
                    let Some(uri) = current_uri.take() else {
                        continue;
                    };
                    let Some(raw) = value.strip_prefix(&format!("{RESUME_STICKER}=")) else {
                        continue;
                    };
                    match raw.parse() {
                        Ok(seconds) => markers.push(ResumeMarker { uri, seconds }),
                        Err(_) => warn!("ignoring unparsable resume marker for {}", uri),
                    }
                }
                _ => {}
            }
        }
        Ok(markers)
    }
}
