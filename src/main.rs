mod cli;
mod config;
mod controller;
mod daemon;
mod hotkeys;
mod ipc;
mod models;
mod navigator;
mod notify;
mod player;
mod scheduler;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{App, Cli, Commands, DaemonCommands};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app = App::new(cli.config)?;

    match cli.command {
        Commands::Volume { level } => {
            app.volume(level)?;
        }
        Commands::Cancel => {
            app.cancel()?;
        }
        Commands::Hotkeys => {
            app.hotkeys()?;
        }
        Commands::Config => {
            app.show_config()?;
        }
        Commands::Daemon { command } => match command {
            DaemonCommands::Start => {
                app.daemon_start()?;
            }
            DaemonCommands::Stop => {
                app.daemon_stop()?;
            }
            DaemonCommands::Status => {
                app.daemon_status()?;
            }
            DaemonCommands::Run => {
                app.daemon_run()?;
            }
        },
        command => {
            if let Some(action) = command.action() {
                app.action(action)?;
            }
        }
    }

    Ok(())
}
