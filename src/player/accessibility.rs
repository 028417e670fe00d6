use super::osascript::{self, quote};
use super::scripting::ScriptingBackend;
use super::{PlayerController, PlayerResult};

/// Drives the player through System Events: transport commands click the
/// Controls menu and volume goes through the window's volume slider.
/// Track metadata is not exposed in the accessibility tree, so reads go
/// through the scripting dictionary.
pub struct AccessibilityBackend {
    app: String,
    metadata: ScriptingBackend,
}

impl AccessibilityBackend {
    pub fn new(app: &str) -> Self {
        Self {
            app: app.to_string(),
            metadata: ScriptingBackend::new(app),
        }
    }
}

fn in_process(app: &str, body: &str) -> String {
    format!(
        "tell application \"System Events\"\ntell process {}\n{body}\nend tell\nend tell",
        quote(app)
    )
}

pub fn menu_item_script(app: &str, menu: &str, item: &str) -> String {
    in_process(
        app,
        &format!(
            "click menu item {} of menu {} of menu bar 1",
            quote(item),
            quote(menu)
        ),
    )
}

/// Play and Pause share one Controls menu slot whose title flips with state.
pub fn play_pause_script(app: &str) -> String {
    in_process(
        app,
        "click (first menu item of menu \"Controls\" of menu bar 1 whose name is \"Play\" or name is \"Pause\")",
    )
}

fn volume_slider() -> &'static str {
    "(first UI element of (entire contents of window 1) whose role is \"AXSlider\" and description contains \"volume\")"
}

pub fn get_volume_script(app: &str) -> String {
    in_process(app, &format!("get value of {}", volume_slider()))
}

pub fn set_volume_script(app: &str, level: u8) -> String {
    in_process(app, &format!("set value of {} to {level}", volume_slider()))
}

impl PlayerController for AccessibilityBackend {
    fn is_running(&self) -> bool {
        self.metadata.is_running()
    }

    fn play_pause(&self) -> PlayerResult<()> {
        osascript::run(&play_pause_script(&self.app)).map(drop)
    }

    fn skip_next(&self) -> PlayerResult<()> {
        osascript::run(&menu_item_script(&self.app, "Controls", "Next")).map(drop)
    }

    fn skip_previous(&self) -> PlayerResult<()> {
        osascript::run(&menu_item_script(&self.app, "Controls", "Previous")).map(drop)
    }

    fn current_track_name(&self) -> PlayerResult<Option<String>> {
        self.metadata.current_track_name()
    }

    fn current_artist(&self) -> PlayerResult<Option<String>> {
        self.metadata.current_artist()
    }

    fn current_album(&self) -> PlayerResult<Option<String>> {
        self.metadata.current_album()
    }

    fn volume(&self) -> PlayerResult<Option<u8>> {
        osascript::run_volume(&get_volume_script(&self.app))
    }

    fn set_volume(&self, level: u8) -> PlayerResult<()> {
        osascript::run(&set_volume_script(&self.app, level)).map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_item_script() {
        let script = menu_item_script("Music", "Controls", "Next");
        assert!(script.starts_with("tell application \"System Events\"\ntell process \"Music\"\n"));
        assert!(script.contains("click menu item \"Next\" of menu \"Controls\" of menu bar 1"));
        assert!(script.ends_with("end tell"));
    }

    #[test]
    fn test_volume_scripts_target_slider() {
        assert!(get_volume_script("Music").contains("AXSlider"));
        assert!(set_volume_script("Music", 42).contains("to 42"));
    }
}
