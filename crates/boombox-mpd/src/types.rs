//! Typed views over MPD responses.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    Play,
    Pause,
    #[default]
    Stop,
}

impl PlayState {
    fn from_str(s: &str) -> Self {
        match s {
            "play" => PlayState::Play,
            "pause" => PlayState::Pause,
            _ => PlayState::Stop,
        }
    }

    /// One-cell status marker shown in the display corner.
    pub fn marker(self) -> char {
        match self {
            PlayState::Play => 'P',
            PlayState::Pause => '=',
            PlayState::Stop => 'X',
        }
    }
}

/// Subset of the `status` response the appliance cares about.
#[derive(Debug, Clone, Default)]
pub struct Status {
    pub state: PlayState,
    /// `None` when the server reports no mixer (volume: -1).
    pub volume: Option<u8>,
    pub elapsed: Option<f64>,
    pub duration: Option<f64>,
}

impl Status {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut status = Status::default();
        for (key, value) in pairs {
            match key.as_str() {
                "state" => status.state = PlayState::from_str(value),
                "volume" => {
                    status.volume = value.parse::<i16>().ok().and_then(|v| {
                        if (0..=100).contains(&v) {
                            Some(v as u8)
                        } else {
                            None
                        }
                    });
                }
                "elapsed" => status.elapsed = value.parse().ok(),
                "duration" => status.duration = value.parse().ok(),
                _ => {}
            }
        }
        status
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub uri: String,
    pub title: Option<String>,
    pub artist: Option<String>,
}

impl Track {
    /// Title tag, or the last path segment of the URI.
    pub fn display_name(&self) -> &str {
        if let Some(title) = &self.title {
            return title;
        }
        self.uri.rsplit('/').next().unwrap_or(&self.uri)
    }

    /// Artist tag, or the parent directory name of the URI.
    pub fn artist_or_dir(&self) -> &str {
        if let Some(artist) = &self.artist {
            return artist;
        }
        let mut parts = self.uri.rsplit('/');
        parts.next();
        parts.next().unwrap_or("")
    }

    pub fn is_stream(&self) -> bool {
        self.uri.starts_with("http://") || self.uri.starts_with("https://")
    }
}

/// One entry of an `lsinfo` listing.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Directory(String),
    Song(Track),
}

/// Groups a flat pair stream into entities. A `directory:` or `file:`
/// key starts a new entity; tag pairs attach to the current song.
pub fn parse_entities(pairs: &[(String, String)]) -> Vec<Entity> {
    let mut entities = Vec::new();
    for (key, value) in pairs {
        match key.as_str() {
            "directory" => entities.push(Entity::Directory(value.clone())),
            "file" => entities.push(Entity::Song(Track {
                uri: value.clone(),
                ..Track::default()
            })),
            "Title" => {
                if let Some(Entity::Song(track)) = entities.last_mut() {
                    track.title = Some(value.clone());
                }
            }
            "Artist" => {
                if let Some(Entity::Song(track)) = entities.last_mut() {
                    track.artist = Some(value.clone());
                }
            }
            _ => {}
        }
    }
    entities
}

/// A persisted (track URI, elapsed seconds) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeMarker {
    pub uri: String,
    pub seconds: u64,
}
