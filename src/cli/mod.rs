use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::Action;

mod commands;
pub use commands::*;

#[derive(Parser)]
#[command(name = "albumhop")]
#[command(about = "Hotkey-driven track and album navigation for the macOS Music app")]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true, env = "ALBUMHOP_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Toggle play/pause
    PlayPause,

    /// Skip to the next track
    Next,

    /// Go to the previous track
    #[command(name = "prev")]
    Previous,

    /// Show the current track
    Show,

    /// Skip forward to the first track of the next album
    NextAlbum,

    /// Skip back to the first track of the previous album
    #[command(name = "prev-album")]
    PreviousAlbum,

    /// Set or show volume
    Volume {
        /// Volume level, clamped to 0-100
        #[arg(allow_hyphen_values = true)]
        level: Option<i64>,
    },

    /// Raise volume by the configured step
    VolumeUp,

    /// Lower volume by the configured step
    VolumeDown,

    /// Cancel a running album navigation
    Cancel,

    /// Print an skhd config for the configured hotkeys
    Hotkeys,

    /// Print the effective configuration
    Config,

    /// Daemon management
    Daemon {
        #[command(subcommand)]
        command: DaemonCommands,
    },
}

impl Commands {
    pub fn action(&self) -> Option<Action> {
        match self {
            Commands::PlayPause => Some(Action::TogglePlayPause),
            Commands::Next => Some(Action::NextTrack),
            Commands::Previous => Some(Action::PreviousTrack),
            Commands::Show => Some(Action::ShowTrack),
            Commands::NextAlbum => Some(Action::NextAlbum),
            Commands::PreviousAlbum => Some(Action::PreviousAlbum),
            Commands::VolumeUp => Some(Action::VolumeUp),
            Commands::VolumeDown => Some(Action::VolumeDown),
            _ => None,
        }
    }
}

#[derive(Subcommand)]
pub enum DaemonCommands {
    /// Start the daemon
    Start,
    /// Stop the daemon
    Stop,
    /// Show daemon status
    Status,
    /// Run daemon in foreground (internal use)
    Run,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_action_commands_match_hotkey_targets() {
        for action in Action::ALL {
            let cli = Cli::try_parse_from(["albumhop", action.command()]).unwrap();
            assert_eq!(cli.command.action(), Some(action));
        }
    }

    #[test]
    fn test_negative_volume_parses() {
        let cli = Cli::try_parse_from(["albumhop", "volume", "-10"]).unwrap();
        assert!(matches!(cli.command, Commands::Volume { level: Some(-10) }));
    }
}
