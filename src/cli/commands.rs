use anyhow::{Result, bail};
use std::path::PathBuf;
use tokio::task::LocalSet;

use crate::config::Config;
use crate::controller::{Controller, Reply};
use crate::daemon::Daemon;
use crate::hotkeys::SkhdRegistrar;
use crate::ipc::{DaemonClient, DaemonResponse};
use crate::models::Action;

pub struct App {
    pub config: Config,
    config_path: Option<PathBuf>,
}

impl App {
    pub fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config = Config::load(config_path.as_deref())?;
        Ok(Self {
            config,
            config_path,
        })
    }

    fn client(&self) -> DaemonClient {
        DaemonClient::new(self.config.socket_path())
    }

    /// Run through the daemon when one is up so album scans are serialized
    /// across invocations; otherwise run in a one-shot local event loop.
    pub fn action(&self, action: Action) -> Result<()> {
        let client = self.client();
        let message = if client.is_daemon_running() {
            match client.action(action)? {
                DaemonResponse::Ok(message) => message,
                DaemonResponse::Error(e) => bail!("{e}"),
                DaemonResponse::Status(_) => bail!("Unexpected response"),
            }
        } else {
            run_local(&self.config, action)?
        };

        println!("{message}");
        Ok(())
    }

    pub fn volume(&self, level: Option<i64>) -> Result<()> {
        let controller = Controller::from_config(&self.config);
        let volume = match level {
            Some(level) => controller.set_volume(level)?,
            None => controller.volume()?,
        };
        println!("Volume: {volume}%");
        Ok(())
    }

    pub fn cancel(&self) -> Result<()> {
        let client = self.client();
        if !client.is_daemon_running() {
            println!("Daemon is not running.");
            return Ok(());
        }

        match client.cancel()? {
            DaemonResponse::Ok(message) => println!("{message}"),
            DaemonResponse::Error(e) => bail!("{e}"),
            DaemonResponse::Status(_) => bail!("Unexpected response"),
        }
        Ok(())
    }

    pub fn hotkeys(&self) -> Result<()> {
        let bindings = self.config.bindings()?;
        let mut registrar = SkhdRegistrar::new(program_name());
        bindings.register_all(&mut registrar)?;
        print!("{}", registrar.render());
        Ok(())
    }

    pub fn show_config(&self) -> Result<()> {
        print!("{}", self.config.to_toml()?);
        Ok(())
    }

    pub fn daemon_start(&self) -> Result<()> {
        if Daemon::is_running(&self.config) {
            println!("Daemon is already running.");
            return Ok(());
        }

        self.config.ensure_dirs()?;
        Daemon::start_detached(&self.config, self.config_path.as_deref())?;
        println!("Daemon started.");

        Ok(())
    }

    pub fn daemon_stop(&self) -> Result<()> {
        if !Daemon::is_running(&self.config) {
            println!("Daemon is not running.");
            return Ok(());
        }

        Daemon::stop(&self.config)?;
        println!("Daemon stopped.");

        Ok(())
    }

    pub fn daemon_status(&self) -> Result<()> {
        let client = self.client();
        if !client.is_daemon_running() {
            println!("Daemon is not running.");
            return Ok(());
        }

        let status = client.get_status()?;
        println!("Daemon is running.");
        println!(
            "{}: {}",
            self.config.player.app,
            if status.player_running {
                "running"
            } else {
                "not running"
            }
        );
        if status.navigating {
            println!("Album navigation in progress.");
        }

        Ok(())
    }

    pub fn daemon_run(&self) -> Result<()> {
        let daemon = Daemon::new(self.config.clone())?;
        daemon.run()
    }
}

fn program_name() -> String {
    std::env::current_exe()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "albumhop".to_string())
}

fn run_local(config: &Config, action: Action) -> Result<String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = LocalSet::new();
    local.block_on(&runtime, dispatch_and_wait(config, action))
}

async fn dispatch_and_wait(config: &Config, action: Action) -> Result<String> {
    let controller = Controller::from_config(config);
    match controller.dispatch(action)? {
        Reply::Done(message) => Ok(message),
        Reply::Pending(handle) => {
            let outcome = handle.finished().await;
            if outcome.is_success() {
                Ok(outcome.to_string())
            } else {
                bail!("{outcome}")
            }
        }
    }
}
