use super::osascript::{self, quote};
use super::{PlayerController, PlayerResult};

/// Talks to the player through its AppleScript dictionary.
pub struct ScriptingBackend {
    app: String,
}

impl ScriptingBackend {
    pub fn new(app: &str) -> Self {
        Self {
            app: app.to_string(),
        }
    }

    fn tell(&self, body: &str) -> String {
        tell(&self.app, body)
    }
}

fn tell(app: &str, body: &str) -> String {
    format!("tell application {} to {body}", quote(app))
}

pub fn is_running_script(app: &str) -> String {
    format!("application {} is running", quote(app))
}

/// Reads a property of the current track, yielding nothing when stopped.
pub fn current_track_script(app: &str, property: &str) -> String {
    tell(
        app,
        &format!("if player state is not stopped then get {property} of current track"),
    )
}

impl PlayerController for ScriptingBackend {
    fn is_running(&self) -> bool {
        osascript::run_bool(&is_running_script(&self.app)).unwrap_or(false)
    }

    fn play_pause(&self) -> PlayerResult<()> {
        osascript::run(&self.tell("playpause")).map(drop)
    }

    fn skip_next(&self) -> PlayerResult<()> {
        osascript::run(&self.tell("next track")).map(drop)
    }

    fn skip_previous(&self) -> PlayerResult<()> {
        osascript::run(&self.tell("previous track")).map(drop)
    }

    fn current_track_name(&self) -> PlayerResult<Option<String>> {
        osascript::run_optional(&current_track_script(&self.app, "name"))
    }

    fn current_artist(&self) -> PlayerResult<Option<String>> {
        osascript::run_optional(&current_track_script(&self.app, "artist"))
    }

    fn current_album(&self) -> PlayerResult<Option<String>> {
        osascript::run_optional(&current_track_script(&self.app, "album"))
    }

    fn volume(&self) -> PlayerResult<Option<u8>> {
        osascript::run_volume(&self.tell("get sound volume"))
    }

    fn set_volume(&self, level: u8) -> PlayerResult<()> {
        osascript::run(&self.tell(&format!("set sound volume to {level}"))).map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripts() {
        assert_eq!(is_running_script("Music"), "application \"Music\" is running");
        assert_eq!(
            current_track_script("Music", "album"),
            "tell application \"Music\" to if player state is not stopped then get album of current track"
        );
        assert_eq!(
            ScriptingBackend::new("Music").tell("next track"),
            "tell application \"Music\" to next track"
        );
    }
}
