use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use thiserror::Error;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::config::NavigationConfig;
use crate::models::{AlbumId, Direction};
use crate::player::{PlayerController, PlayerError};
use crate::scheduler::Scheduler;

mod session;
pub use session::{ScanSession, Transition};

/// Terminal result of one album navigation request.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// Forward: now on the first track seen in a new album.
    /// Backward: landed on the first track of the album before the start.
    Reached {
        direction: Direction,
        album: AlbumId,
        attempts: u32,
    },
    BoundaryNotFound {
        direction: Direction,
        attempts: u32,
    },
    /// Backward only. Playback is left where the last backward skip landed.
    StillInTarget {
        album: AlbumId,
        attempts: u32,
    },
    Cancelled {
        attempts: u32,
    },
    Failed(PlayerError),
}

impl ScanOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ScanOutcome::Reached { .. })
    }
}

impl fmt::Display for ScanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanOutcome::Reached {
                direction: Direction::Forward,
                album,
                ..
            } => write!(f, "Next album: {album}"),
            ScanOutcome::Reached {
                direction: Direction::Backward,
                album,
                ..
            } => write!(f, "Previous album: {album}"),
            ScanOutcome::BoundaryNotFound {
                direction,
                attempts,
            } => {
                let which = match direction {
                    Direction::Forward => "next",
                    Direction::Backward => "previous",
                };
                write!(f, "No {which} album found after {attempts} attempts")
            }
            ScanOutcome::StillInTarget { album, attempts } => {
                write!(f, "Still in {album} after {attempts} attempts")
            }
            ScanOutcome::Cancelled { .. } => write!(f, "Album navigation cancelled"),
            ScanOutcome::Failed(e) => write!(f, "Album navigation failed: {e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    #[error("album navigation already in progress")]
    Busy,
    #[error(transparent)]
    Player(#[from] PlayerError),
}

struct HandleState {
    outcome: RefCell<Option<ScanOutcome>>,
    cancelled: Cell<bool>,
    done: Notify,
}

/// Caller's view of an in-flight scan.
#[derive(Clone)]
pub struct ScanHandle {
    state: Rc<HandleState>,
}

impl ScanHandle {
    fn new() -> Self {
        Self {
            state: Rc::new(HandleState {
                outcome: RefCell::new(None),
                cancelled: Cell::new(false),
                done: Notify::new(),
            }),
        }
    }

    /// Stop at the next scheduled poll. No further skips are issued.
    pub fn cancel(&self) {
        self.state.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.get()
    }

    pub fn outcome(&self) -> Option<ScanOutcome> {
        self.state.outcome.borrow().clone()
    }

    /// Wait for the terminal outcome. Only resolves if the scheduler driving
    /// the scan is being polled, i.e. inside the same `LocalSet`.
    pub async fn finished(&self) -> ScanOutcome {
        loop {
            if let Some(outcome) = self.outcome() {
                return outcome;
            }
            self.state.done.notified().await;
        }
    }

    fn complete(&self, outcome: ScanOutcome) {
        *self.state.outcome.borrow_mut() = Some(outcome);
        self.state.done.notify_one();
    }

    fn same(&self, other: &ScanHandle) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

pub type Report = Box<dyn FnOnce(&ScanOutcome)>;

/// Album navigation by skip-and-poll. At most one scan runs at a time.
pub struct AlbumNavigator {
    player: Rc<dyn PlayerController>,
    scheduler: Rc<dyn Scheduler>,
    settings: NavigationConfig,
    active: Rc<RefCell<Option<ScanHandle>>>,
}

impl AlbumNavigator {
    pub fn new(
        player: Rc<dyn PlayerController>,
        scheduler: Rc<dyn Scheduler>,
        settings: NavigationConfig,
    ) -> Self {
        Self {
            player,
            scheduler,
            settings,
            active: Rc::new(RefCell::new(None)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.active.borrow().is_some()
    }

    /// Cancel the in-flight scan, if any.
    pub fn cancel(&self) -> bool {
        match self.active.borrow().as_ref() {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Begin a scan: read the starting album, issue the first skip and
    /// schedule the first poll. `report` runs once with the terminal outcome.
    pub fn start(
        &self,
        direction: Direction,
        report: impl FnOnce(&ScanOutcome) + 'static,
    ) -> Result<ScanHandle, NavError> {
        if self.is_busy() {
            return Err(NavError::Busy);
        }

        let start = self.player.album()?;
        let session = ScanSession::new(direction, start, &self.settings);
        self.player.skip(session.first_skip())?;

        debug!(
            "Album scan started ({direction}), max {} attempts every {:?}",
            self.settings.max_album_skip_attempts,
            session.delay()
        );

        let handle = ScanHandle::new();
        *self.active.borrow_mut() = Some(handle.clone());

        Run {
            player: Rc::clone(&self.player),
            scheduler: Rc::clone(&self.scheduler),
            session,
            handle: handle.clone(),
            active: Rc::clone(&self.active),
            report: Some(Box::new(report)),
        }
        .schedule();

        Ok(handle)
    }
}

/// One scan in motion. Moved into each scheduled callback, so exactly one
/// poll of a given scan is ever pending.
struct Run {
    player: Rc<dyn PlayerController>,
    scheduler: Rc<dyn Scheduler>,
    session: ScanSession,
    handle: ScanHandle,
    active: Rc<RefCell<Option<ScanHandle>>>,
    report: Option<Report>,
}

impl Run {
    fn schedule(self) {
        let scheduler = Rc::clone(&self.scheduler);
        scheduler.after(self.session.delay(), Box::new(move || self.poll()));
    }

    fn poll(mut self) {
        if self.handle.is_cancelled() {
            let attempts = self.session.attempts();
            return self.finish(ScanOutcome::Cancelled { attempts });
        }

        let current = match self.player.album() {
            Ok(album) => album,
            Err(e) => return self.finish(ScanOutcome::Failed(e)),
        };

        debug!(
            "Poll {} ({:?}): album {current:?}",
            self.session.attempts() + 1,
            self.session.phase()
        );

        match self.session.advance(current) {
            Transition::Skip(direction) => match self.player.skip(direction) {
                Ok(()) => self.schedule(),
                Err(e) => self.finish(ScanOutcome::Failed(e)),
            },
            Transition::Finish {
                correction,
                outcome,
            } => {
                if let Some(direction) = correction {
                    if let Err(e) = self.player.skip(direction) {
                        return self.finish(ScanOutcome::Failed(e));
                    }
                }
                self.finish(outcome)
            }
        }
    }

    fn finish(mut self, outcome: ScanOutcome) {
        {
            let mut active = self.active.borrow_mut();
            if active.as_ref().is_some_and(|h| h.same(&self.handle)) {
                *active = None;
            }
        }

        match &outcome {
            ScanOutcome::Failed(e) => warn!("Album scan ({}) failed: {e}", self.session.direction()),
            other => info!("Album scan ({}): {other}", self.session.direction()),
        }

        self.handle.complete(outcome.clone());
        if let Some(report) = self.report.take() {
            report(&outcome);
        }
    }
}
