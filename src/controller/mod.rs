use std::rc::Rc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{Action, Direction};
use crate::navigator::{AlbumNavigator, NavError, ScanHandle};
use crate::notify::{self, Notifier};
use crate::player::{self, PlayerController, PlayerError, clamp_volume};
use crate::scheduler::{LocalScheduler, Scheduler};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("{0} is not running")]
    PlayerUnavailable(String),
    #[error("Could not read {0}")]
    Unreadable(&'static str),
    #[error("Album navigation already in progress")]
    Busy,
    #[error("Player command failed: {0}")]
    Player(PlayerError),
}

impl From<PlayerError> for CommandError {
    fn from(e: PlayerError) -> Self {
        match e {
            PlayerError::Unreadable(what) => CommandError::Unreadable(what),
            other => CommandError::Player(other),
        }
    }
}

impl From<NavError> for CommandError {
    fn from(e: NavError) -> Self {
        match e {
            NavError::Busy => CommandError::Busy,
            NavError::Player(e) => e.into(),
        }
    }
}

/// Result of a dispatched action. Album navigation finishes later.
pub enum Reply {
    Done(String),
    Pending(ScanHandle),
}

/// User-facing player commands.
///
/// Every command checks that the player is running first. Failures are
/// shown through the notifier exactly once and returned to the caller.
pub struct Controller {
    player: Rc<dyn PlayerController>,
    notifier: Rc<dyn Notifier>,
    navigator: AlbumNavigator,
    app: String,
    format: String,
    alert_duration: Duration,
    volume_step: u8,
}

impl Controller {
    pub fn new(
        config: &Config,
        player: Rc<dyn PlayerController>,
        notifier: Rc<dyn Notifier>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        let navigator =
            AlbumNavigator::new(Rc::clone(&player), scheduler, config.navigation.clone());
        Self {
            player,
            notifier,
            navigator,
            app: config.player.app.clone(),
            format: config.display.format.clone(),
            alert_duration: config.alert_duration(),
            volume_step: config.volume.step,
        }
    }

    /// Real backends on the current `LocalSet`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config,
            player::build(&config.player),
            notify::build(config.alerts.notifier),
            Rc::new(LocalScheduler),
        )
    }

    fn notify(&self, message: &str) {
        self.notifier.show(message, self.alert_duration);
    }

    fn guarded<T>(
        &self,
        command: impl FnOnce(&Self) -> Result<T, CommandError>,
    ) -> Result<T, CommandError> {
        let result = if self.player.is_running() {
            command(self)
        } else {
            Err(CommandError::PlayerUnavailable(self.app.clone()))
        };

        if let Err(e) = &result {
            if let CommandError::Player(PlayerError::Transport(_)) = e {
                warn!("{e}");
            }
            self.notify(&e.to_string());
        }
        result
    }

    pub fn toggle_play_pause(&self) -> Result<String, CommandError> {
        self.guarded(|c| {
            c.player.play_pause()?;
            Ok("Toggled play/pause".to_string())
        })
    }

    pub fn next_track(&self) -> Result<String, CommandError> {
        self.guarded(|c| {
            c.player.skip_next()?;
            Ok("Next track".to_string())
        })
    }

    pub fn previous_track(&self) -> Result<String, CommandError> {
        self.guarded(|c| {
            c.player.skip_previous()?;
            Ok("Previous track".to_string())
        })
    }

    pub fn show_track(&self) -> Result<String, CommandError> {
        self.guarded(|c| {
            let info = c.player.track_info()?;
            if info.is_empty() {
                return Err(CommandError::Unreadable("current track"));
            }
            let text = info.render(&c.format);
            c.notify(&text);
            Ok(text)
        })
    }

    pub fn volume(&self) -> Result<u8, CommandError> {
        self.guarded(|c| {
            let level = c.read_volume()?;
            c.notify(&format!("Volume: {level}%"));
            Ok(level)
        })
    }

    /// Set the volume, clamping to 0..=100.
    pub fn set_volume(&self, level: i64) -> Result<u8, CommandError> {
        self.guarded(|c| c.apply_volume(level))
    }

    pub fn volume_up(&self) -> Result<u8, CommandError> {
        self.guarded(|c| {
            let current = c.read_volume()?;
            c.apply_volume(i64::from(current) + i64::from(c.volume_step))
        })
    }

    pub fn volume_down(&self) -> Result<u8, CommandError> {
        self.guarded(|c| {
            let current = c.read_volume()?;
            c.apply_volume(i64::from(current) - i64::from(c.volume_step))
        })
    }

    fn read_volume(&self) -> Result<u8, CommandError> {
        self.player
            .volume()?
            .ok_or(CommandError::Unreadable("volume"))
    }

    fn apply_volume(&self, level: i64) -> Result<u8, CommandError> {
        let level = clamp_volume(level);
        self.player.set_volume(level)?;
        self.notify(&format!("Volume: {level}%"));
        Ok(level)
    }

    pub fn next_album(&self) -> Result<ScanHandle, CommandError> {
        self.navigate(Direction::Forward)
    }

    pub fn previous_album(&self) -> Result<ScanHandle, CommandError> {
        self.navigate(Direction::Backward)
    }

    fn navigate(&self, direction: Direction) -> Result<ScanHandle, CommandError> {
        self.guarded(|c| {
            let notifier = Rc::clone(&c.notifier);
            let duration = c.alert_duration;
            let handle = c.navigator.start(direction, move |outcome| {
                notifier.show(&outcome.to_string(), duration);
            })?;
            Ok(handle)
        })
    }

    pub fn is_navigating(&self) -> bool {
        self.navigator.is_busy()
    }

    pub fn cancel_navigation(&self) -> bool {
        self.navigator.cancel()
    }

    pub fn player_running(&self) -> bool {
        self.player.is_running()
    }

    pub fn dispatch(&self, action: Action) -> Result<Reply, CommandError> {
        debug!("Dispatching {action}");
        let reply = match action {
            Action::TogglePlayPause => Reply::Done(self.toggle_play_pause()?),
            Action::NextTrack => Reply::Done(self.next_track()?),
            Action::PreviousTrack => Reply::Done(self.previous_track()?),
            Action::ShowTrack => Reply::Done(self.show_track()?),
            Action::NextAlbum => Reply::Pending(self.next_album()?),
            Action::PreviousAlbum => Reply::Pending(self.previous_album()?),
            Action::VolumeUp => Reply::Done(format!("Volume: {}%", self.volume_up()?)),
            Action::VolumeDown => Reply::Done(format!("Volume: {}%", self.volume_down()?)),
        };
        Ok(reply)
    }
}
