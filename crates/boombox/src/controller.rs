//! The UI state machine: every screen the appliance shows and every
//! control it answers to.
//!
//! One controller owns the player session and the display renderer.
//! `handle` dispatches on the `(state, control)` pair; combinations
//! without a meaning return `Outcome::Ignored` and change nothing.

use std::collections::HashSet;

use anyhow::Result;
use tokio::io::{AsyncRead, AsyncWrite};

use boombox_mpd::{Entity, MpdError, MpdSession, PlayState, Status};

use crate::config::{Config, Station, VolumeConfig, VolumePolicy};
use crate::cursor::ListCursor;
use crate::diag::Diag;
use crate::input::Control;
use crate::screen::{textfit, Frame, Renderer, COLS, ROWS};

const MENU: [&str; 6] = [
    "Resume...",
    "List...",
    "Volume...",
    "Radio...",
    "Settings...",
    "Off",
];
const ADD_OR_REPLACE: [&str; 2] = ["Replace", "Append"];
const SETTINGS: [&str; 2] = ["Wifi test", "Internet test"];

/// Up/Down seek distance in the playing screen.
const SEEK_STEP: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiState {
    Playing,
    Menu,
    Resume,
    List,
    AddOrReplace,
    Volume,
    Settings,
    Radio,
}

impl UiState {
    fn is_list(self) -> bool {
        !matches!(self, UiState::Playing | UiState::Volume)
    }
}

/// What a handled control means for the caller's timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Handled,
    /// No meaning in the current state; nothing changed, no redraw.
    Ignored,
    Quit,
}

#[derive(Debug, Clone)]
struct BrowseEntry {
    label: String,
    uri: String,
    /// Elapsed seconds to seek to after starting, for resume entries.
    resume_at: Option<u64>,
}

fn last_segment(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}

/// Relative seek target, clamped into the track.
fn clamp_seek(elapsed: f64, delta: f64, duration: Option<f64>) -> f64 {
    (elapsed + delta).clamp(0.0, duration.unwrap_or(f64::MAX))
}

pub struct Controller<S> {
    session: MpdSession<S>,
    renderer: Renderer,
    diag: Diag,
    volume_cfg: VolumeConfig,
    stations: Vec<Station>,

    state: UiState,
    cursor: ListCursor,
    entries: Vec<BrowseEntry>,
    /// Directory currently listed (`None` at the library root).
    list_path: Option<String>,
    /// Root directory the user descended into, to restore the
    /// selection when popping back.
    list_dir: Option<String>,
    /// Track selected in a listing, awaiting Replace/Append.
    pending: Option<BrowseEntry>,
    volume: Option<u8>,

    // playing screen cache, so panning redraws without a round-trip
    title: String,
    subtitle: String,
    marker: char,
    title_scroll: usize,

    /// Set when the next player notification is self-caused and must
    /// not trigger a refresh.
    ignore_next_notification: bool,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Controller<S> {
    pub fn new(session: MpdSession<S>, renderer: Renderer, diag: Diag, config: &Config) -> Self {
        Self {
            session,
            renderer,
            diag,
            volume_cfg: config.volume.clone(),
            stations: config.stations.clone(),
            state: UiState::Playing,
            cursor: ListCursor::default(),
            entries: Vec::new(),
            list_path: None,
            list_dir: None,
            pending: None,
            volume: None,
            title: String::new(),
            subtitle: String::new(),
            marker: PlayState::Stop.marker(),
            title_scroll: 0,
            ignore_next_notification: false,
        }
    }

    pub fn state(&self) -> UiState {
        self.state
    }

    // ── session plumbing for the event loop ───────────────────────────────

    pub async fn enter_idle(&mut self) -> Result<(), MpdError> {
        self.session.enter_idle().await
    }

    pub async fn wait_notification(&mut self) -> Result<Vec<String>, MpdError> {
        self.session.wait_notification().await
    }

    pub fn show_error(&mut self, message: &str) -> Result<()> {
        self.renderer.error_banner(message)
    }

    pub fn sleep_display(&mut self) -> Result<()> {
        self.renderer.sleep()
    }

    pub fn wake_display(&mut self) -> Result<()> {
        self.renderer.wake()
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    /// First screen after connecting. A queued track resumes playing;
    /// a queued stream first waits for the network to come up.
    pub async fn startup(&mut self) -> Result<()> {
        if let Some(track) = self.session.current_song().await? {
            if track.is_stream() {
                self.renderer.lines("Network...", "")?;
                self.diag
                    .wait_for_network(10, std::time::Duration::from_secs(1))
                    .await;
            }
            self.session.play().await?;
            self.ignore_next_notification = true;
        }
        self.refresh_playing().await
    }

    /// A player-side change arrived while idle. Only the playing
    /// screen tracks the player; list screens keep their content.
    pub async fn on_notification(&mut self) -> Result<()> {
        if self.ignore_next_notification {
            self.ignore_next_notification = false;
            return Ok(());
        }
        if self.state == UiState::Playing {
            self.refresh_playing().await?;
        }
        Ok(())
    }

    /// Long-idle expiry: park playback where it is.
    pub async fn auto_pause(&mut self) -> Result<()> {
        let status = self.session.status().await?;
        if status.state != PlayState::Play {
            return Ok(());
        }
        self.record_marker(&status).await?;
        self.session.pause(true).await?;
        self.ignore_next_notification = true;
        if self.state == UiState::Playing {
            self.refresh_playing().await?;
        }
        Ok(())
    }

    // ── dispatch ──────────────────────────────────────────────────────────

    pub async fn handle(&mut self, control: Control) -> Result<Outcome> {
        if matches!(control, Control::Stop | Control::Exit) {
            return self.stop_playback().await;
        }
        // play/pause works from every screen, like the physical button
        if control == Control::PlayPause {
            return self.toggle_pause().await;
        }
        match (self.state, control) {
            (UiState::Playing, Control::Up) => self.seek_relative(SEEK_STEP).await,
            (UiState::Playing, Control::Down) => self.seek_relative(-SEEK_STEP).await,
            (UiState::Playing, Control::Left) => self.pan_title(false),
            (UiState::Playing, Control::Right) => self.pan_title(true),
            (UiState::Playing, Control::Menu) => self.open_menu().map(|()| Outcome::Handled),

            (UiState::Menu, Control::Ok) => self.menu_select().await,
            (UiState::Menu, Control::Menu) => {
                self.refresh_playing().await?;
                Ok(Outcome::Handled)
            }

            (UiState::List, Control::Ok) => self.list_select().await,
            (UiState::List, Control::Menu) => self.list_pop().await,

            (UiState::Resume, Control::Ok) => self.resume_selected().await,
            (UiState::AddOrReplace, Control::Ok) => self.add_or_replace().await,
            (UiState::Radio, Control::Ok) => self.play_station().await,
            (UiState::Settings, Control::Ok) => self.run_diagnostic().await,

            (UiState::Volume, control) => self.adjust_volume(control).await,

            (state, Control::Menu) if state.is_list() => {
                self.open_menu().map(|()| Outcome::Handled)
            }
            (state, control) if state.is_list() => self.navigate(control),

            _ => Ok(Outcome::Ignored),
        }
    }

    // ── playing screen ────────────────────────────────────────────────────

    async fn refresh_playing(&mut self) -> Result<()> {
        let status = self.session.status().await?;
        match self.session.current_song().await? {
            Some(track) => {
                self.title = track.display_name().to_string();
                self.subtitle = track.artist_or_dir().to_string();
            }
            None => {
                self.title = "(no track)".to_string();
                self.subtitle.clear();
            }
        }
        self.marker = status.state.marker();
        self.title_scroll = 0;
        self.state = UiState::Playing;
        self.renderer.draw(self.playing_frame())
    }

    fn playing_frame(&self) -> Frame {
        let mut frame = Frame::default();
        let visible: String = self.title.chars().skip(self.title_scroll).collect();
        frame.write(0, 0, &visible);
        frame.write(0, 1, &textfit::clip(&self.subtitle, COLS - 1));
        frame.write(COLS - 1, 1, &self.marker.to_string());
        frame
    }

    fn pan_title(&mut self, right: bool) -> Result<Outcome> {
        let len = self.title.chars().count();
        self.title_scroll = if right {
            textfit::scroll_right(self.title_scroll, len)
        } else {
            textfit::scroll_left(self.title_scroll, len)
        };
        self.renderer.draw(self.playing_frame())?;
        Ok(Outcome::Handled)
    }

    async fn toggle_pause(&mut self) -> Result<Outcome> {
        let status = self.session.status().await?;
        match status.state {
            PlayState::Play => {
                self.record_marker(&status).await?;
                self.session.pause(true).await?;
            }
            PlayState::Pause => self.session.pause(false).await?,
            PlayState::Stop => self.session.play().await?,
        }
        self.ignore_next_notification = true;
        // list screens keep their content; only the status screen
        // tracks the new play state
        if self.state == UiState::Playing {
            self.refresh_playing().await?;
        }
        Ok(Outcome::Handled)
    }

    async fn seek_relative(&mut self, delta: f64) -> Result<Outcome> {
        let status = self.session.status().await?;
        let Some(elapsed) = status.elapsed else {
            return Ok(Outcome::Ignored);
        };
        if status.state == PlayState::Stop {
            return Ok(Outcome::Ignored);
        }
        let target = clamp_seek(elapsed, delta, status.duration);
        self.session.seek_to(target).await?;
        if let Some(track) = self.session.current_song().await? {
            if !track.is_stream() {
                self.session
                    .set_resume_marker(&track.uri, target as u64)
                    .await?;
            }
        }
        self.ignore_next_notification = true;
        Ok(Outcome::Handled)
    }

    /// Stop works from every screen and leaves the screen as it is,
    /// apart from the banner.
    async fn stop_playback(&mut self) -> Result<Outcome> {
        let status = self.session.status().await?;
        if status.state == PlayState::Play {
            self.record_marker(&status).await?;
        }
        self.session.stop().await?;
        self.ignore_next_notification = true;
        self.renderer.error_banner("STOPPED")?;
        Ok(Outcome::Handled)
    }

    /// Stores the resume position for the current track. Streams have
    /// no meaningful position and are skipped.
    async fn record_marker(&mut self, status: &Status) -> Result<()> {
        let Some(elapsed) = status.elapsed else {
            return Ok(());
        };
        let Some(track) = self.session.current_song().await? else {
            return Ok(());
        };
        if track.is_stream() {
            return Ok(());
        }
        self.session
            .set_resume_marker(&track.uri, elapsed as u64)
            .await?;
        Ok(())
    }

    // ── list screens ──────────────────────────────────────────────────────

    fn navigate(&mut self, control: Control) -> Result<Outcome> {
        if self.entries.is_empty() {
            return Ok(Outcome::Ignored);
        }
        let len = self.entries.len();
        match control {
            Control::Up => self.cursor.up(len),
            Control::Down => self.cursor.down(len),
            Control::Left | Control::Right => {
                let label_len = self.entries[self.cursor.index()].label.chars().count();
                if control == Control::Right {
                    self.cursor.pan_right(label_len);
                } else {
                    self.cursor.pan_left(label_len);
                }
            }
            _ => return Ok(Outcome::Ignored),
        }
        self.render_list()?;
        Ok(Outcome::Handled)
    }

    fn render_list(&mut self) -> Result<()> {
        self.renderer.draw(self.list_frame())
    }

    /// Two-row window over the entries: the window advances by pairs,
    /// so moving inside a pair only moves the `>` marker.
    fn list_frame(&self) -> Frame {
        if self.entries.is_empty() {
            return Frame::from_lines("  (empty)", "");
        }
        let mut frame = Frame::default();
        let base = self.cursor.index() - self.cursor.index() % 2;
        for row in 0..ROWS {
            let Some(entry) = self.entries.get(base + row) else {
                break;
            };
            let selected = base + row == self.cursor.index();
            frame.write(0, row, if selected { "> " } else { "  " });
            let skip = if selected { self.cursor.scroll() } else { 0 };
            let label: String = entry.label.chars().skip(skip).collect();
            frame.write(2, row, &label);
        }
        frame
    }

    fn set_entries(&mut self, state: UiState, entries: Vec<BrowseEntry>) -> Result<()> {
        self.state = state;
        self.entries = entries;
        self.cursor.reset();
        self.render_list()
    }

    fn fixed_entries(labels: &[&str]) -> Vec<BrowseEntry> {
        labels
            .iter()
            .map(|label| BrowseEntry {
                label: label.to_string(),
                uri: String::new(),
                resume_at: None,
            })
            .collect()
    }

    fn open_menu(&mut self) -> Result<()> {
        self.set_entries(UiState::Menu, Self::fixed_entries(&MENU))
    }

    async fn menu_select(&mut self) -> Result<Outcome> {
        match self.cursor.index() {
            0 => self.open_resume().await?,
            1 => {
                self.list_dir = None;
                self.open_list_root(None).await?;
            }
            2 => self.open_volume().await?,
            3 => {
                let entries = self
                    .stations
                    .iter()
                    .map(|s| BrowseEntry {
                        label: s.name.clone(),
                        uri: s.url.clone(),
                        resume_at: None,
                    })
                    .collect();
                self.set_entries(UiState::Radio, entries)?;
            }
            4 => self.set_entries(UiState::Settings, Self::fixed_entries(&SETTINGS))?,
            _ => return self.shutdown().await,
        }
        Ok(Outcome::Handled)
    }

    /// Resume entries are the stored markers that still point at a
    /// library track; orphaned markers are skipped.
    async fn open_resume(&mut self) -> Result<()> {
        let markers = self.session.resume_markers().await?;
        let known: HashSet<String> = self.session.list_all_uris().await?.into_iter().collect();
        let entries = markers
            .into_iter()
            .filter(|m| known.contains(&m.uri))
            .map(|m| BrowseEntry {
                label: last_segment(&m.uri).to_string(),
                uri: m.uri,
                resume_at: Some(m.seconds),
            })
            .collect();
        self.set_entries(UiState::Resume, entries)
    }

    async fn open_list_root(&mut self, restore: Option<&str>) -> Result<()> {
        let entries = self
            .session
            .browse(None)
            .await?
            .into_iter()
            .filter_map(|e| match e {
                Entity::Directory(path) => Some(BrowseEntry {
                    label: last_segment(&path).to_string(),
                    uri: path,
                    resume_at: None,
                }),
                Entity::Song(_) => None,
            })
            .collect();
        self.list_path = None;
        self.set_entries(UiState::List, entries)?;
        if let Some(dir) = restore {
            if let Some(pos) = self.entries.iter().position(|e| e.uri == dir) {
                self.cursor.restore(pos, self.entries.len());
                self.render_list()?;
            }
        }
        Ok(())
    }

    async fn open_list_dir(&mut self, path: String) -> Result<()> {
        let entries = self
            .session
            .browse(Some(&path))
            .await?
            .into_iter()
            .filter_map(|e| match e {
                Entity::Song(track) => Some(BrowseEntry {
                    label: track.display_name().to_string(),
                    uri: track.uri,
                    resume_at: None,
                }),
                Entity::Directory(_) => None,
            })
            .collect();
        self.list_path = Some(path);
        self.set_entries(UiState::List, entries)
    }

    async fn list_select(&mut self) -> Result<Outcome> {
        let Some(entry) = self.entries.get(self.cursor.index()).cloned() else {
            return Ok(Outcome::Ignored);
        };
        if self.list_path.is_none() {
            self.list_dir = Some(entry.uri.clone());
            self.open_list_dir(entry.uri).await?;
        } else {
            self.pending = Some(entry);
            self.set_entries(UiState::AddOrReplace, Self::fixed_entries(&ADD_OR_REPLACE))?;
        }
        Ok(Outcome::Handled)
    }

    /// MENU inside a directory pops to the root listing, putting the
    /// cursor back on the directory we came from when it still exists.
    async fn list_pop(&mut self) -> Result<Outcome> {
        match self.list_path.take() {
            Some(_) => {
                let dir = self.list_dir.take();
                self.open_list_root(dir.as_deref()).await?;
            }
            None => self.open_menu()?,
        }
        Ok(Outcome::Handled)
    }

    /// Park whatever is playing before the queue is discarded.
    async fn save_current_position(&mut self) -> Result<()> {
        let status = self.session.status().await?;
        if status.state == PlayState::Play {
            self.record_marker(&status).await?;
        }
        Ok(())
    }

    async fn add_or_replace(&mut self) -> Result<Outcome> {
        let Some(entry) = self.pending.take() else {
            return Ok(Outcome::Ignored);
        };
        let replace = self.cursor.index() == 0;
        if replace {
            self.save_current_position().await?;
            self.session.clear().await?;
        }
        self.session.add(&entry.uri).await?;
        self.session.play().await?;
        self.ignore_next_notification = true;
        self.refresh_playing().await?;
        Ok(Outcome::Handled)
    }

    /// Rebuilds the queue around the selected track and continues it
    /// from its stored position.
    async fn resume_selected(&mut self) -> Result<Outcome> {
        let Some(entry) = self.entries.get(self.cursor.index()).cloned() else {
            return Ok(Outcome::Ignored);
        };
        self.save_current_position().await?;
        self.session.clear().await?;
        self.session.add(&entry.uri).await?;
        self.session.play().await?;
        if let Some(seconds) = entry.resume_at {
            self.session.seek_to(seconds as f64).await?;
        }
        self.ignore_next_notification = true;
        self.refresh_playing().await?;
        Ok(Outcome::Handled)
    }

    async fn play_station(&mut self) -> Result<Outcome> {
        let Some(entry) = self.entries.get(self.cursor.index()).cloned() else {
            return Ok(Outcome::Ignored);
        };
        self.session.clear().await?;
        self.session.add(&entry.uri).await?;
        self.session.play().await?;
        self.ignore_next_notification = true;
        self.refresh_playing().await?;
        Ok(Outcome::Handled)
    }

    async fn run_diagnostic(&mut self) -> Result<Outcome> {
        let (name, up) = match self.cursor.index() {
            0 => {
                self.renderer.lines("WIFI...", "")?;
                ("WIFI", self.diag.wifi_up().await)
            }
            _ => {
                self.renderer.lines("INTERNET...", "")?;
                ("INTERNET", self.diag.internet_up().await)
            }
        };
        self.renderer
            .lines(&format!("{}... {}", name, if up { "OK" } else { "KO" }), "")?;
        Ok(Outcome::Handled)
    }

    // ── volume ────────────────────────────────────────────────────────────

    async fn open_volume(&mut self) -> Result<()> {
        self.volume = self.session.status().await?.volume;
        self.state = UiState::Volume;
        self.render_volume()
    }

    fn render_volume(&mut self) -> Result<()> {
        let bottom = match self.volume {
            Some(v) => format!("{v:>3} %"),
            None => "(no mixer)".to_string(),
        };
        self.renderer.lines("Volume", &bottom)
    }

    async fn adjust_volume(&mut self, control: Control) -> Result<Outcome> {
        let max = self.volume_cfg.max.min(100);
        let step = self.volume_cfg.step as i16;
        self.volume = match (self.volume_cfg.policy, control) {
            (_, Control::Left) => self.session.change_volume(-1).await?,
            (_, Control::Right) => self.session.change_volume(1).await?,
            (VolumePolicy::Coarse, Control::Up) => {
                self.session.set_volume(max).await?;
                Some(max)
            }
            (VolumePolicy::Coarse, Control::Down) => {
                self.session.set_volume(0).await?;
                Some(0)
            }
            (VolumePolicy::Incremental, Control::Up) => self.session.change_volume(step).await?,
            (VolumePolicy::Incremental, Control::Down) => self.session.change_volume(-step).await?,
            (_, Control::Ok) | (_, Control::Menu) => {
                self.open_menu()?;
                return Ok(Outcome::Handled);
            }
            _ => return Ok(Outcome::Ignored),
        };
        self.render_volume()?;
        Ok(Outcome::Handled)
    }

    // ── shutdown ──────────────────────────────────────────────────────────

    async fn shutdown(&mut self) -> Result<Outcome> {
        let status = self.session.status().await?;
        if status.state == PlayState::Play {
            self.record_marker(&status).await?;
            self.session.pause(true).await?;
        }
        self.renderer.lines("Bye...", "")?;
        self.diag.halt().await?;
        Ok(Outcome::Quit)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};

    use crate::config::DiagnosticsConfig;
    use crate::screen::mock::{MockScreen, Op};

    use super::*;

    async fn harness() -> (
        Controller<DuplexStream>,
        Arc<Mutex<Vec<Op>>>,
        DuplexStream,
    ) {
        let (client, mut server) = tokio::io::duplex(4096);
        server.write_all(b"OK MPD 0.23.5\n").await.unwrap();
        let session = MpdSession::open(client).await.unwrap();
        let mock = MockScreen::default();
        let ops = mock.ops();
        let renderer = Renderer::new(Box::new(mock));
        let diag = Diag::new(&DiagnosticsConfig::default(), None).unwrap();
        let config = Config::default();
        (
            Controller::new(session, renderer, diag, &config),
            ops,
            server,
        )
    }

    fn selected_label(c: &Controller<DuplexStream>) -> &str {
        &c.entries[c.cursor.index()].label
    }

    /// Scripted player: asserts each command in order and replies
    /// with the canned response lines, recording what it received.
    async fn scripted_harness(
        script: Vec<(&'static str, &'static [&'static str])>,
    ) -> (Controller<DuplexStream>, Arc<Mutex<Vec<String>>>) {
        let (client, server) = tokio::io::duplex(4096);
        let received = Arc::new(Mutex::new(Vec::new()));
        let log = received.clone();
        tokio::spawn(async move {
            let mut io = BufReader::new(server);
            io.write_all(b"OK MPD 0.23.5\n").await.unwrap();
            for (expected, response) in script {
                let mut line = String::new();
                io.read_line(&mut line).await.unwrap();
                let line = line.trim_end().to_string();
                log.lock().unwrap().push(line.clone());
                assert_eq!(line, expected);
                for out in response {
                    io.write_all(out.as_bytes()).await.unwrap();
                    io.write_all(b"\n").await.unwrap();
                }
                io.flush().await.unwrap();
            }
        });
        let session = MpdSession::open(client).await.unwrap();
        let renderer = Renderer::new(Box::new(MockScreen::default()));
        let diag = Diag::new(&DiagnosticsConfig::default(), None).unwrap();
        let config = Config::default();
        (Controller::new(session, renderer, diag, &config), received)
    }

    #[tokio::test]
    async fn menu_navigation_is_circular() {
        let (mut c, _ops, _server) = harness().await;
        c.open_menu().unwrap();
        assert_eq!(selected_label(&c), "Resume...");

        for _ in 0..3 {
            assert_eq!(c.handle(Control::Down).await.unwrap(), Outcome::Handled);
        }
        assert_eq!(c.cursor.index(), 3);
        assert_eq!(selected_label(&c), "Radio...");

        for _ in 0..3 {
            c.handle(Control::Down).await.unwrap();
        }
        assert_eq!(selected_label(&c), "Resume...");
        assert_eq!(c.handle(Control::Up).await.unwrap(), Outcome::Handled);
        assert_eq!(selected_label(&c), "Off");
    }

    #[tokio::test]
    async fn unhandled_control_changes_nothing() {
        let (mut c, ops, _server) = harness().await;
        assert_eq!(c.state(), UiState::Playing);
        ops.lock().unwrap().clear();

        // OK has no meaning in the status screen
        assert_eq!(c.handle(Control::Ok).await.unwrap(), Outcome::Ignored);
        assert_eq!(c.state(), UiState::Playing);
        assert!(ops.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_list_ignores_navigation() {
        let (mut c, _ops, _server) = harness().await;
        c.set_entries(UiState::Radio, Vec::new()).unwrap();

        assert_eq!(c.handle(Control::Down).await.unwrap(), Outcome::Ignored);
        assert_eq!(c.handle(Control::Up).await.unwrap(), Outcome::Ignored);
        assert_eq!(c.cursor, ListCursor::default());
    }

    #[tokio::test]
    async fn list_window_advances_by_pairs() {
        let (mut c, _ops, _server) = harness().await;
        c.open_menu().unwrap();
        let frame = c.list_frame();
        assert_eq!(frame.row(0).trim_end(), "> Resume...");
        assert_eq!(frame.row(1).trim_end(), "  List...");

        c.handle(Control::Down).await.unwrap();
        let frame = c.list_frame();
        assert_eq!(frame.row(0).trim_end(), "  Resume...");
        assert_eq!(frame.row(1).trim_end(), "> List...");

        c.handle(Control::Down).await.unwrap();
        let frame = c.list_frame();
        assert_eq!(frame.row(0).trim_end(), "> Volume...");
        assert_eq!(frame.row(1).trim_end(), "  Radio...");
    }

    #[tokio::test]
    async fn pausing_records_a_resume_marker() {
        let script = vec![
            (
                "status",
                &["state: play", "elapsed: 95.4", "duration: 200", "OK"][..],
            ),
            ("currentsong", &["file: podcasts/ep1.mp3", "OK"][..]),
            (
                "sticker set song \"podcasts/ep1.mp3\" played \"95\"",
                &["OK"][..],
            ),
            ("pause 1", &["OK"][..]),
            ("status", &["state: pause", "OK"][..]),
            ("currentsong", &["file: podcasts/ep1.mp3", "OK"][..]),
        ];
        let (mut c, received) = scripted_harness(script).await;

        assert_eq!(c.handle(Control::PlayPause).await.unwrap(), Outcome::Handled);
        assert!(c.ignore_next_notification);

        let log = received.lock().unwrap();
        assert!(log.contains(&"sticker set song \"podcasts/ep1.mp3\" played \"95\"".to_string()));
        assert!(log.contains(&"pause 1".to_string()));
    }

    #[tokio::test]
    async fn playpause_toggles_from_any_state() {
        let script = vec![
            ("status", &["state: stop", "OK"][..]),
            ("play", &["OK"][..]),
        ];
        let (mut c, received) = scripted_harness(script).await;
        c.open_menu().unwrap();
        let index = c.cursor.index();

        assert_eq!(c.handle(Control::PlayPause).await.unwrap(), Outcome::Handled);
        // playback starts but the menu stays on screen
        assert_eq!(c.state(), UiState::Menu);
        assert_eq!(c.cursor.index(), index);
        assert!(received.lock().unwrap().contains(&"play".to_string()));
    }

    #[tokio::test]
    async fn append_starts_playback_too() {
        let script = vec![
            ("add \"podcasts/ep1.mp3\"", &["OK"][..]),
            ("play", &["OK"][..]),
            ("status", &["state: play", "OK"][..]),
            ("currentsong", &["file: podcasts/ep1.mp3", "OK"][..]),
        ];
        let (mut c, received) = scripted_harness(script).await;
        c.pending = Some(BrowseEntry {
            label: "ep1.mp3".to_string(),
            uri: "podcasts/ep1.mp3".to_string(),
            resume_at: None,
        });
        c.set_entries(
            UiState::AddOrReplace,
            Controller::<DuplexStream>::fixed_entries(&ADD_OR_REPLACE),
        )
        .unwrap();
        c.handle(Control::Down).await.unwrap();
        assert_eq!(selected_label(&c), "Append");

        assert_eq!(c.handle(Control::Ok).await.unwrap(), Outcome::Handled);
        assert_eq!(c.state(), UiState::Playing);
        assert!(received.lock().unwrap().contains(&"play".to_string()));
    }

    #[tokio::test]
    async fn startup_with_empty_queue_shows_status_screen() {
        let script = vec![
            ("currentsong", &["OK"][..]),
            ("status", &["state: stop", "OK"][..]),
            ("currentsong", &["OK"][..]),
        ];
        let (mut c, _received) = scripted_harness(script).await;
        c.startup().await.unwrap();

        assert_eq!(c.state(), UiState::Playing);
        assert_eq!(c.title, "(no track)");
        assert_eq!(c.marker, PlayState::Stop.marker());
    }

    #[test]
    fn seek_clamps_into_track() {
        assert_eq!(clamp_seek(170.0, 60.0, Some(200.0)), 200.0);
        assert_eq!(clamp_seek(30.0, -60.0, Some(200.0)), 0.0);
        assert_eq!(clamp_seek(100.0, 60.0, Some(200.0)), 160.0);
        assert_eq!(clamp_seek(100.0, 60.0, None), 160.0);
    }

    #[tokio::test]
    async fn playing_title_pans_and_wraps() {
        let (mut c, _ops, _server) = harness().await;
        c.title = "a label well beyond sixteen cells".to_string();
        let len = c.title.chars().count();

        c.handle(Control::Right).await.unwrap();
        assert_eq!(c.title_scroll, 10);
        c.handle(Control::Right).await.unwrap();
        assert_eq!(c.title_scroll, 20);
        c.handle(Control::Left).await.unwrap();
        assert_eq!(c.title_scroll, 10);
        assert!(len - textfit::MIN_VISIBLE >= 20);
    }
}
