use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::player::osascript;

/// Receives human-readable status messages.
pub trait Notifier {
    fn show(&self, message: &str, duration: Duration);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    /// macOS Notification Center banner.
    #[default]
    Notification,
    /// Log line only (headless use, tests).
    Log,
}

pub fn build(kind: NotifierKind) -> Rc<dyn Notifier> {
    match kind {
        NotifierKind::Notification => Rc::new(BannerNotifier::new("albumhop")),
        NotifierKind::Log => Rc::new(LogNotifier),
    }
}

pub struct BannerNotifier {
    title: String,
}

impl BannerNotifier {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
        }
    }
}

pub fn banner_script(title: &str, message: &str) -> String {
    format!(
        "display notification {} with title {}",
        osascript::quote(message),
        osascript::quote(title)
    )
}

impl Notifier for BannerNotifier {
    fn show(&self, message: &str, duration: Duration) {
        // Notification Center decides how long banners stay up.
        debug!("Notify ({duration:?}): {message}");
        if let Err(e) = osascript::run(&banner_script(&self.title, message)) {
            warn!("Notification failed: {e}");
        }
    }
}

pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&self, message: &str, _duration: Duration) {
        info!("{message}");
    }
}
