use anyhow::{Context, Result};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::LocalSet;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::controller::{Controller, Reply};
use crate::ipc::{self, DaemonCommand, DaemonResponse, DaemonStatus};
use crate::navigator::{ScanHandle, ScanOutcome};

/// A command from a client connection plus the channel its answer goes to.
struct Request {
    command: DaemonCommand,
    reply: mpsc::Sender<DaemonResponse>,
}

enum Handled {
    Reply(DaemonResponse),
    Wait(ScanHandle),
    Shutdown,
}

pub struct Daemon {
    config: Config,
}

impl Daemon {
    pub fn new(config: Config) -> Result<Self> {
        config.ensure_dirs()?;
        Ok(Self { config })
    }

    pub fn run(&self) -> Result<()> {
        use interprocess::local_socket::prelude::*;
        use interprocess::local_socket::{GenericFilePath, ListenerOptions};

        let socket_path = self.config.socket_path();

        // Remove stale socket
        if socket_path.exists() {
            fs::remove_file(&socket_path)?;
        }

        let pid_path = self.config.pid_path();
        fs::write(&pid_path, std::process::id().to_string())?;

        let name = socket_path.as_os_str().to_fs_name::<GenericFilePath>()?;
        let listener = ListenerOptions::new()
            .name(name)
            .create_sync()
            .with_context(|| "Failed to create socket listener")?;

        info!("Daemon started, listening on {}", socket_path.display());

        let (tx, rx) = unbounded_channel();

        // Connections are served off the event loop; each waits for its
        // answer on its own thread so a running scan never blocks accept.
        thread::spawn(move || {
            for conn in listener.incoming() {
                match conn {
                    Ok(conn) => {
                        let tx = tx.clone();
                        thread::spawn(move || {
                            if let Err(e) = handle_connection(conn, &tx) {
                                error!("Connection error: {e}");
                            }
                        });
                    }
                    Err(e) => error!("Accept error: {e}"),
                }
            }
        });

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .with_context(|| "Failed to build event loop")?;
        let local = LocalSet::new();
        let controller = Controller::from_config(&self.config);
        local.block_on(&runtime, event_loop(controller, rx));

        let _ = fs::remove_file(&socket_path);
        let _ = fs::remove_file(&pid_path);

        info!("Daemon stopped");
        Ok(())
    }

    pub fn start_detached(config: &Config, config_path: Option<&Path>) -> Result<()> {
        use std::process::Command;

        let socket_path = config.socket_path();
        if socket_path.exists() {
            let client = ipc::DaemonClient::new(&socket_path);
            if client.is_daemon_running() {
                anyhow::bail!("Daemon is already running");
            }
            fs::remove_file(&socket_path)?;
        }

        let exe = std::env::current_exe()?;
        let mut command = Command::new(&exe);
        if let Some(path) = config_path {
            command.arg("--config").arg(path);
        }
        command.arg("daemon").arg("run");

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;

            command
                .stdin(std::process::Stdio::null())
                .stdout(std::process::Stdio::null())
                .stderr(std::process::Stdio::null())
                .process_group(0)
                .spawn()
                .with_context(|| "Failed to start daemon")?;
        }

        for _ in 0..50 {
            if socket_path.exists() {
                return Ok(());
            }
            thread::sleep(std::time::Duration::from_millis(100));
        }

        anyhow::bail!("Daemon failed to start")
    }

    pub fn stop(config: &Config) -> Result<()> {
        let client = ipc::DaemonClient::new(config.socket_path());
        if client.is_daemon_running() {
            client.shutdown()?;
            for _ in 0..50 {
                if !config.socket_path().exists() {
                    return Ok(());
                }
                thread::sleep(std::time::Duration::from_millis(100));
            }
        }
        Ok(())
    }

    pub fn is_running(config: &Config) -> bool {
        let client = ipc::DaemonClient::new(config.socket_path());
        client.is_daemon_running()
    }
}

/// Owns the controller. Everything that touches the player runs here, on a
/// single thread, including every scheduled poll.
async fn event_loop(controller: Controller, mut rx: UnboundedReceiver<Request>) {
    while let Some(Request { command, reply }) = rx.recv().await {
        match handle_command(&controller, command) {
            Handled::Reply(response) => {
                let _ = reply.send(response);
            }
            Handled::Wait(handle) => {
                tokio::task::spawn_local(async move {
                    let outcome = handle.finished().await;
                    let _ = reply.send(outcome_response(&outcome));
                });
            }
            Handled::Shutdown => {
                controller.cancel_navigation();
                let _ = reply.send(DaemonResponse::Ok("Daemon stopped".to_string()));
                break;
            }
        }
    }
}

fn handle_command(controller: &Controller, command: DaemonCommand) -> Handled {
    debug!("Daemon command: {command:?}");
    match command {
        DaemonCommand::Action { action } => match controller.dispatch(action) {
            Ok(Reply::Done(message)) => Handled::Reply(DaemonResponse::Ok(message)),
            Ok(Reply::Pending(handle)) => Handled::Wait(handle),
            Err(e) => Handled::Reply(DaemonResponse::Error(e.to_string())),
        },
        DaemonCommand::Cancel => {
            if controller.cancel_navigation() {
                Handled::Reply(DaemonResponse::Ok("Cancelling album navigation".to_string()))
            } else {
                Handled::Reply(DaemonResponse::Ok("Nothing to cancel".to_string()))
            }
        }
        DaemonCommand::GetStatus => Handled::Reply(DaemonResponse::Status(DaemonStatus {
            player_running: controller.player_running(),
            navigating: controller.is_navigating(),
        })),
        DaemonCommand::Shutdown => Handled::Shutdown,
    }
}

fn outcome_response(outcome: &ScanOutcome) -> DaemonResponse {
    if outcome.is_success() {
        DaemonResponse::Ok(outcome.to_string())
    } else {
        DaemonResponse::Error(outcome.to_string())
    }
}

fn handle_connection(
    conn: interprocess::local_socket::Stream,
    tx: &UnboundedSender<Request>,
) -> Result<()> {
    let mut reader = BufReader::new(&conn);
    let mut writer = &conn;

    let mut line = String::new();
    reader.read_line(&mut line)?;

    let command: DaemonCommand = ipc::decode(&line)?;
    let (reply_tx, reply_rx) = mpsc::channel();

    let response = if tx
        .send(Request {
            command,
            reply: reply_tx,
        })
        .is_ok()
    {
        reply_rx
            .recv()
            .unwrap_or_else(|_| DaemonResponse::Error("Daemon is shutting down".to_string()))
    } else {
        DaemonResponse::Error("Daemon is shutting down".to_string())
    };

    writeln!(writer, "{}", ipc::encode(&response)?)?;
    writer.flush()?;

    Ok(())
}
