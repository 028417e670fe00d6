use std::time::Duration;

use crate::config::NavigationConfig;
use crate::models::{AlbumId, Direction};

use super::ScanOutcome;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Skipping in the session's direction until the album differs from `start`.
    Boundary { start: AlbumId },
    /// Backward only: skipping back through `target` to find its first track.
    FirstTrack { target: AlbumId },
}

/// What the driver must do after a poll.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Issue one skip, then poll again after the session delay.
    Skip(Direction),
    /// Terminal. Issue `correction` (if any) and report `outcome`.
    Finish {
        correction: Option<Direction>,
        outcome: ScanOutcome,
    },
}

/// State of one album navigation request.
///
/// The session performs no I/O: the driver feeds it the album observed after
/// each skip and executes whatever [`Transition`] it returns.
#[derive(Debug, Clone)]
pub struct ScanSession {
    direction: Direction,
    phase: Phase,
    attempts: u32,
    max_attempts: u32,
    delay: Duration,
}

impl ScanSession {
    pub fn new(direction: Direction, start: AlbumId, settings: &NavigationConfig) -> Self {
        Self {
            direction,
            phase: Phase::Boundary { start },
            attempts: 0,
            max_attempts: settings.max_album_skip_attempts.max(1),
            delay: settings.delay(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Polls made in the current phase.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// The skip that opens the session.
    pub fn first_skip(&self) -> Direction {
        self.direction
    }

    pub fn advance(&mut self, current: AlbumId) -> Transition {
        self.attempts += 1;

        match &self.phase {
            Phase::Boundary { start } => {
                if current != *start {
                    match self.direction {
                        Direction::Forward => Transition::Finish {
                            correction: None,
                            outcome: ScanOutcome::Reached {
                                direction: Direction::Forward,
                                album: current,
                                attempts: self.attempts,
                            },
                        },
                        Direction::Backward => {
                            self.phase = Phase::FirstTrack { target: current };
                            self.attempts = 0;
                            Transition::Skip(Direction::Backward)
                        }
                    }
                } else if self.attempts >= self.max_attempts {
                    Transition::Finish {
                        correction: None,
                        outcome: ScanOutcome::BoundaryNotFound {
                            direction: self.direction,
                            attempts: self.attempts,
                        },
                    }
                } else {
                    Transition::Skip(self.direction)
                }
            }
            Phase::FirstTrack { target } => {
                if current != *target {
                    // The previous position was the first track of `target`.
                    Transition::Finish {
                        correction: Some(Direction::Forward),
                        outcome: ScanOutcome::Reached {
                            direction: Direction::Backward,
                            album: target.clone(),
                            attempts: self.attempts,
                        },
                    }
                } else if self.attempts >= self.max_attempts {
                    Transition::Finish {
                        correction: None,
                        outcome: ScanOutcome::StillInTarget {
                            album: target.clone(),
                            attempts: self.attempts,
                        },
                    }
                } else {
                    Transition::Skip(Direction::Backward)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(max: u32) -> NavigationConfig {
        NavigationConfig {
            max_album_skip_attempts: max,
            album_skip_delay: 0.0,
        }
    }

    fn named(name: &str) -> AlbumId {
        AlbumId::Named(name.to_string())
    }

    #[test]
    fn test_forward_change_finishes_without_correction() {
        let mut session = ScanSession::new(Direction::Forward, named("A"), &settings(5));
        assert_eq!(session.advance(named("A")), Transition::Skip(Direction::Forward));
        assert_eq!(
            session.advance(named("B")),
            Transition::Finish {
                correction: None,
                outcome: ScanOutcome::Reached {
                    direction: Direction::Forward,
                    album: named("B"),
                    attempts: 2,
                },
            }
        );
    }

    #[test]
    fn test_attempt_limit_stops_boundary_scan() {
        let mut session = ScanSession::new(Direction::Forward, named("A"), &settings(3));
        assert_eq!(session.advance(named("A")), Transition::Skip(Direction::Forward));
        assert_eq!(session.advance(named("A")), Transition::Skip(Direction::Forward));
        assert_eq!(
            session.advance(named("A")),
            Transition::Finish {
                correction: None,
                outcome: ScanOutcome::BoundaryNotFound {
                    direction: Direction::Forward,
                    attempts: 3,
                },
            }
        );
    }

    #[test]
    fn test_absent_start_counts_as_distinct() {
        let mut session = ScanSession::new(Direction::Forward, AlbumId::Absent, &settings(3));
        assert!(matches!(
            session.advance(named("")),
            Transition::Finish {
                outcome: ScanOutcome::Reached { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_backward_change_switches_to_first_track_phase() {
        let mut session = ScanSession::new(Direction::Backward, named("B"), &settings(4));
        assert_eq!(session.advance(named("A")), Transition::Skip(Direction::Backward));
        assert_eq!(session.phase(), &Phase::FirstTrack { target: named("A") });
        assert_eq!(session.attempts(), 0);

        assert_eq!(session.advance(named("A")), Transition::Skip(Direction::Backward));
        assert_eq!(
            session.advance(named("Z")),
            Transition::Finish {
                correction: Some(Direction::Forward),
                outcome: ScanOutcome::Reached {
                    direction: Direction::Backward,
                    album: named("A"),
                    attempts: 2,
                },
            }
        );
    }

    #[test]
    fn test_first_track_limit_leaves_position_uncorrected() {
        let mut session = ScanSession::new(Direction::Backward, named("B"), &settings(2));
        session.advance(named("A"));
        assert_eq!(session.advance(named("A")), Transition::Skip(Direction::Backward));
        assert_eq!(
            session.advance(named("A")),
            Transition::Finish {
                correction: None,
                outcome: ScanOutcome::StillInTarget {
                    album: named("A"),
                    attempts: 2,
                },
            }
        );
    }

    #[test]
    fn test_zero_attempt_budget_is_raised_to_one() {
        let mut session = ScanSession::new(Direction::Forward, named("A"), &settings(0));
        assert!(matches!(session.advance(named("A")), Transition::Finish { .. }));
    }
}
