use serde::{Deserialize, Serialize};
use std::fmt;

/// The album reported by the player for the current track.
///
/// `Absent` is a sentinel distinct from every named album, including the
/// empty string, so a move from "no album" to a real album counts as a change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AlbumId {
    #[default]
    Absent,
    Named(String),
}

impl From<Option<String>> for AlbumId {
    fn from(value: Option<String>) -> Self {
        value.map(AlbumId::Named).unwrap_or_default()
    }
}

impl fmt::Display for AlbumId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlbumId::Absent => write!(f, "{UNKNOWN_ALBUM}"),
            AlbumId::Named(name) if name.is_empty() => write!(f, "{UNKNOWN_ALBUM}"),
            AlbumId::Named(name) => write!(f, "{name}"),
        }
    }
}

pub const UNKNOWN_TRACK: &str = "Unknown Track";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}

/// Now-playing metadata. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackInfo {
    pub name: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

impl TrackInfo {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.artist.is_none() && self.album.is_none()
    }

    /// Render a display template. `{name}`, `{artist}` and `{album}` are
    /// substituted; missing or empty values fall back to "Unknown ...".
    pub fn render(&self, template: &str) -> String {
        fn or_default<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
            match value.as_deref() {
                Some(v) if !v.is_empty() => v,
                _ => fallback,
            }
        }

        template
            .replace("{name}", or_default(&self.name, UNKNOWN_TRACK))
            .replace("{artist}", or_default(&self.artist, UNKNOWN_ARTIST))
            .replace("{album}", or_default(&self.album, UNKNOWN_ALBUM))
    }
}

/// Everything a hotkey or CLI invocation can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    TogglePlayPause,
    NextTrack,
    PreviousTrack,
    ShowTrack,
    NextAlbum,
    PreviousAlbum,
    VolumeUp,
    VolumeDown,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::TogglePlayPause,
        Action::NextTrack,
        Action::PreviousTrack,
        Action::ShowTrack,
        Action::NextAlbum,
        Action::PreviousAlbum,
        Action::VolumeUp,
        Action::VolumeDown,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::TogglePlayPause => "toggle-play-pause",
            Action::NextTrack => "next-track",
            Action::PreviousTrack => "previous-track",
            Action::ShowTrack => "show-track",
            Action::NextAlbum => "next-album",
            Action::PreviousAlbum => "previous-album",
            Action::VolumeUp => "volume-up",
            Action::VolumeDown => "volume-down",
        }
    }

    /// The CLI subcommand that triggers this action.
    pub fn command(self) -> &'static str {
        match self {
            Action::TogglePlayPause => "play-pause",
            Action::NextTrack => "next",
            Action::PreviousTrack => "prev",
            Action::ShowTrack => "show",
            Action::NextAlbum => "next-album",
            Action::PreviousAlbum => "prev-album",
            Action::VolumeUp => "volume-up",
            Action::VolumeDown => "volume-down",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Action::ALL
            .into_iter()
            .find(|action| action.name() == lower)
            .ok_or_else(|| format!("Unknown action: {s}"))
    }
}
