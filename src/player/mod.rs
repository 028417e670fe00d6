use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

use crate::config::PlayerConfig;
use crate::models::{AlbumId, Direction, TrackInfo};

mod accessibility;
pub mod osascript;
mod scripting;

#[cfg(test)]
pub mod fake;

pub use accessibility::AccessibilityBackend;
pub use scripting::ScriptingBackend;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    #[error("could not read {0}")]
    Unreadable(&'static str),
    #[error("automation call failed: {0}")]
    Transport(String),
}

/// `Ok(Some(_))` succeeded with a value, `Ok(None)` succeeded with nothing to
/// report (e.g. stopped player), `Err(_)` the call itself failed.
pub type PlayerResult<T> = Result<T, PlayerError>;

/// Capability interface over the music player. Backends differ only in how
/// they reach the player; navigation and formatting live above this trait.
pub trait PlayerController {
    fn is_running(&self) -> bool;

    fn play_pause(&self) -> PlayerResult<()>;
    fn skip_next(&self) -> PlayerResult<()>;
    fn skip_previous(&self) -> PlayerResult<()>;

    fn current_track_name(&self) -> PlayerResult<Option<String>>;
    fn current_artist(&self) -> PlayerResult<Option<String>>;
    fn current_album(&self) -> PlayerResult<Option<String>>;

    fn volume(&self) -> PlayerResult<Option<u8>>;
    /// `level` is already clamped to 0..=100.
    fn set_volume(&self, level: u8) -> PlayerResult<()>;

    fn skip(&self, direction: Direction) -> PlayerResult<()> {
        match direction {
            Direction::Forward => self.skip_next(),
            Direction::Backward => self.skip_previous(),
        }
    }

    fn album(&self) -> PlayerResult<AlbumId> {
        self.current_album().map(AlbumId::from)
    }

    fn track_info(&self) -> PlayerResult<TrackInfo> {
        Ok(TrackInfo {
            name: self.current_track_name()?,
            artist: self.current_artist()?,
            album: self.current_album()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// AppleScript dictionary of the player.
    #[default]
    Scripting,
    /// System Events UI scripting against the player's accessibility tree.
    Accessibility,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Scripting => write!(f, "scripting"),
            Backend::Accessibility => write!(f, "accessibility"),
        }
    }
}

pub fn build(config: &PlayerConfig) -> Rc<dyn PlayerController> {
    match config.backend {
        Backend::Scripting => Rc::new(ScriptingBackend::new(&config.app)),
        Backend::Accessibility => Rc::new(AccessibilityBackend::new(&config.app)),
    }
}

pub fn clamp_volume(level: i64) -> u8 {
    level.clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::fake::FakePlayer;

    #[test]
    fn test_clamp_volume() {
        assert_eq!(clamp_volume(-10), 0);
        assert_eq!(clamp_volume(150), 100);
        assert_eq!(clamp_volume(57), 57);
    }

    #[test]
    fn test_current_album_is_stable_without_skips() {
        let player = FakePlayer::with_albums(&["A", "A", "B"]);
        let first = player.album().unwrap();
        assert_eq!(player.album().unwrap(), first);
        assert_eq!(player.album().unwrap(), AlbumId::Named("A".to_string()));
    }

    #[test]
    fn test_skip_dispatches_on_direction() {
        let player = FakePlayer::with_albums(&["A", "B", "C"]);
        player.skip(Direction::Forward).unwrap();
        player.skip(Direction::Forward).unwrap();
        player.skip(Direction::Backward).unwrap();
        assert_eq!(player.next_calls(), 2);
        assert_eq!(player.previous_calls(), 1);
        assert_eq!(player.position(), 1);
    }
}
