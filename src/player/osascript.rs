use std::process::Command;
use tracing::{debug, warn};

use super::{PlayerError, PlayerResult};

/// Run an AppleScript snippet and return its trimmed stdout.
pub fn run(script: &str) -> PlayerResult<String> {
    debug!("osascript: {script}");

    let output = Command::new("osascript")
        .args(["-e", script])
        .output()
        .map_err(|e| PlayerError::Transport(format!("Failed to run osascript: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!("osascript failed: {stderr}");
        return Err(PlayerError::Transport(stderr));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// `missing value` and empty output mean the player had nothing to report.
pub fn optional(output: String) -> Option<String> {
    if output.is_empty() || output == "missing value" {
        None
    } else {
        Some(output)
    }
}

pub fn run_optional(script: &str) -> PlayerResult<Option<String>> {
    run(script).map(optional)
}

pub fn run_bool(script: &str) -> PlayerResult<bool> {
    Ok(run(script)? == "true")
}

pub fn run_volume(script: &str) -> PlayerResult<Option<u8>> {
    match run_optional(script)? {
        Some(raw) => raw
            .parse::<f64>()
            .map(|v| Some(v.round().clamp(0.0, 100.0) as u8))
            .map_err(|_| PlayerError::Unreadable("volume")),
        None => Ok(None),
    }
}

/// Quote a value as an AppleScript string literal.
pub fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}
