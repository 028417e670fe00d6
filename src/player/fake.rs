use std::cell::{Cell, RefCell};

use super::{PlayerController, PlayerError, PlayerResult};

/// In-memory player walking a fixed track list. Skipping past either end
/// stays on the boundary track, like the real player at library edges.
pub struct FakePlayer {
    albums: Vec<Option<String>>,
    position: Cell<usize>,
    running: Cell<bool>,
    stopped: Cell<bool>,
    volume: Cell<Option<u8>>,
    volume_writes: RefCell<Vec<u8>>,
    failing: Cell<bool>,
    next_calls: Cell<usize>,
    previous_calls: Cell<usize>,
    play_pause_calls: Cell<usize>,
}

impl FakePlayer {
    pub fn with_albums(albums: &[&str]) -> Self {
        Self::with_optional_albums(albums.iter().map(|a| Some(a.to_string())).collect())
    }

    pub fn with_optional_albums(albums: Vec<Option<String>>) -> Self {
        assert!(!albums.is_empty(), "fake player needs at least one track");
        Self {
            albums,
            position: Cell::new(0),
            running: Cell::new(true),
            stopped: Cell::new(false),
            volume: Cell::new(Some(50)),
            volume_writes: RefCell::new(Vec::new()),
            failing: Cell::new(false),
            next_calls: Cell::new(0),
            previous_calls: Cell::new(0),
            play_pause_calls: Cell::new(0),
        }
    }

    pub fn starting_at(self, position: usize) -> Self {
        self.position.set(position);
        self
    }

    pub fn set_running(&self, running: bool) {
        self.running.set(running);
    }

    /// A stopped player has no current track, so every metadata read is empty.
    pub fn set_stopped(&self, stopped: bool) {
        self.stopped.set(stopped);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn set_stored_volume(&self, volume: Option<u8>) {
        self.volume.set(volume);
    }

    pub fn position(&self) -> usize {
        self.position.get()
    }

    pub fn next_calls(&self) -> usize {
        self.next_calls.get()
    }

    pub fn previous_calls(&self) -> usize {
        self.previous_calls.get()
    }

    pub fn skip_calls(&self) -> usize {
        self.next_calls() + self.previous_calls()
    }

    pub fn play_pause_calls(&self) -> usize {
        self.play_pause_calls.get()
    }

    pub fn volume_writes(&self) -> Vec<u8> {
        self.volume_writes.borrow().clone()
    }

    fn check(&self) -> PlayerResult<()> {
        if self.failing.get() {
            Err(PlayerError::Transport("scripting bridge error".to_string()))
        } else {
            Ok(())
        }
    }

    fn current(&self) -> Option<String> {
        self.albums[self.position.get()].clone()
    }
}

impl PlayerController for FakePlayer {
    fn is_running(&self) -> bool {
        self.running.get()
    }

    fn play_pause(&self) -> PlayerResult<()> {
        self.check()?;
        self.play_pause_calls.set(self.play_pause_calls.get() + 1);
        Ok(())
    }

    fn skip_next(&self) -> PlayerResult<()> {
        self.check()?;
        self.next_calls.set(self.next_calls.get() + 1);
        let last = self.albums.len() - 1;
        self.position.set((self.position.get() + 1).min(last));
        Ok(())
    }

    fn skip_previous(&self) -> PlayerResult<()> {
        self.check()?;
        self.previous_calls.set(self.previous_calls.get() + 1);
        self.position.set(self.position.get().saturating_sub(1));
        Ok(())
    }

    fn current_track_name(&self) -> PlayerResult<Option<String>> {
        self.check()?;
        if self.stopped.get() {
            return Ok(None);
        }
        Ok(Some(format!("Track {}", self.position.get() + 1)))
    }

    fn current_artist(&self) -> PlayerResult<Option<String>> {
        self.check()?;
        if self.stopped.get() {
            return Ok(None);
        }
        Ok(Some("Band".to_string()))
    }

    fn current_album(&self) -> PlayerResult<Option<String>> {
        self.check()?;
        if self.stopped.get() {
            return Ok(None);
        }
        Ok(self.current())
    }

    fn volume(&self) -> PlayerResult<Option<u8>> {
        self.check()?;
        Ok(self.volume.get())
    }

    fn set_volume(&self, level: u8) -> PlayerResult<()> {
        self.check()?;
        self.volume_writes.borrow_mut().push(level);
        self.volume.set(Some(level));
        Ok(())
    }
}
