use anyhow::{Context, Result};
use interprocess::TryClone;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::models::Action;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DaemonCommand {
    Action { action: Action },
    Cancel,
    GetStatus,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonStatus {
    pub player_running: bool,
    pub navigating: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DaemonResponse {
    Ok(String),
    Status(DaemonStatus),
    Error(String),
}

pub fn encode<T: Serialize>(message: &T) -> Result<String> {
    serde_json::to_string(message).with_context(|| "Failed to encode message")
}

pub fn decode<'a, T: Deserialize<'a>>(line: &'a str) -> Result<T> {
    serde_json::from_str(line.trim()).with_context(|| "Failed to decode message")
}

pub struct DaemonClient {
    socket_path: std::path::PathBuf,
}

impl DaemonClient {
    pub fn new(socket_path: impl AsRef<Path>) -> Self {
        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
        }
    }

    pub fn is_daemon_running(&self) -> bool {
        self.socket_path.exists() && self.send_command(DaemonCommand::GetStatus).is_ok()
    }

    pub fn send_command(&self, command: DaemonCommand) -> Result<DaemonResponse> {
        use interprocess::local_socket::GenericFilePath;
        use interprocess::local_socket::prelude::*;

        let path = self.socket_path.as_os_str();
        let name = path
            .to_fs_name::<GenericFilePath>()
            .with_context(|| "Invalid socket path")?;

        let conn = interprocess::local_socket::Stream::connect(name).with_context(|| {
            format!(
                "Failed to connect to daemon at {}",
                self.socket_path.display()
            )
        })?;

        let mut writer = conn;
        let mut reader = BufReader::new(writer.try_clone()?);

        writeln!(writer, "{}", encode(&command)?)?;
        writer.flush()?;

        // Album actions answer only once the scan has finished.
        let mut response_line = String::new();
        reader.read_line(&mut response_line)?;

        decode(&response_line).with_context(|| "Failed to parse daemon response")
    }

    pub fn action(&self, action: Action) -> Result<DaemonResponse> {
        self.send_command(DaemonCommand::Action { action })
    }

    pub fn cancel(&self) -> Result<DaemonResponse> {
        self.send_command(DaemonCommand::Cancel)
    }

    pub fn get_status(&self) -> Result<DaemonStatus> {
        match self.send_command(DaemonCommand::GetStatus)? {
            DaemonResponse::Status(status) => Ok(status),
            DaemonResponse::Error(e) => anyhow::bail!("{e}"),
            _ => anyhow::bail!("Unexpected response"),
        }
    }

    pub fn shutdown(&self) -> Result<DaemonResponse> {
        self.send_command(DaemonCommand::Shutdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_wire_format() {
        let line = encode(&DaemonCommand::Action {
            action: Action::PreviousAlbum,
        })
        .unwrap();
        assert_eq!(line, r#"{"Action":{"action":"previous-album"}}"#);

        let back: DaemonCommand = decode(&format!("{line}\n")).unwrap();
        assert_eq!(
            back,
            DaemonCommand::Action {
                action: Action::PreviousAlbum
            }
        );
    }

    #[test]
    fn test_response_decoding() {
        let status: DaemonResponse =
            decode(r#"{"Status":{"player_running":true,"navigating":false}}"#).unwrap();
        assert_eq!(
            status,
            DaemonResponse::Status(DaemonStatus {
                player_running: true,
                navigating: false,
            })
        );
        assert!(decode::<DaemonResponse>("not json").is_err());
    }

    #[test]
    fn test_client_without_daemon() {
        let dir = tempfile::tempdir().unwrap();
        let client = DaemonClient::new(dir.path().join("albumhop.sock"));
        assert!(!client.is_daemon_running());
    }
}
