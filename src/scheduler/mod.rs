use std::time::Duration;

pub type Callback = Box<dyn FnOnce() + 'static>;

/// Deferred execution on the caller's logical thread.
///
/// Implementations run each callback exactly once, no earlier than `delay`,
/// and never concurrently with other callbacks from the same scheduler.
pub trait Scheduler {
    fn after(&self, delay: Duration, callback: Callback);
}

/// Schedules onto the current tokio `LocalSet`.
///
/// Must be used from inside `LocalSet::run_until` / `block_on`, which is
/// where the daemon and the one-shot CLI loop drive the controller.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalScheduler;

impl Scheduler for LocalScheduler {
    fn after(&self, delay: Duration, callback: Callback) {
        tokio::task::spawn_local(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            callback();
        });
    }
}

#[cfg(test)]
pub mod manual {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::time::Duration;

    use super::{Callback, Scheduler};

    /// Queues callbacks and runs them only when asked, so tests can step a
    /// scan one poll at a time without real timers.
    #[derive(Default)]
    pub struct ManualScheduler {
        queue: RefCell<VecDeque<(Duration, Callback)>>,
        delays: RefCell<Vec<Duration>>,
    }

    impl ManualScheduler {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn pending(&self) -> usize {
            self.queue.borrow().len()
        }

        pub fn delays(&self) -> Vec<Duration> {
            self.delays.borrow().clone()
        }

        /// Run the oldest pending callback. Returns false if none was queued.
        pub fn run_next(&self) -> bool {
            let next = self.queue.borrow_mut().pop_front();
            match next {
                Some((_, callback)) => {
                    callback();
                    true
                }
                None => false,
            }
        }

        /// Run until the queue drains, returning how many callbacks ran.
        pub fn run_all(&self) -> usize {
            let mut ran = 0;
            while self.run_next() {
                ran += 1;
            }
            ran
        }
    }

    impl Scheduler for ManualScheduler {
        fn after(&self, delay: Duration, callback: Callback) {
            self.delays.borrow_mut().push(delay);
            self.queue.borrow_mut().push_back((delay, callback));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::manual::ManualScheduler;
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_manual_scheduler_runs_in_order() {
        let scheduler = Rc::new(ManualScheduler::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        for i in 0..3 {
            let log = Rc::clone(&log);
            scheduler.after(Duration::from_millis(i), Box::new(move || log.borrow_mut().push(i)));
        }

        assert_eq!(scheduler.pending(), 3);
        assert_eq!(scheduler.run_all(), 3);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
        assert!(!scheduler.run_next());
    }

    #[test]
    fn test_manual_scheduler_allows_rescheduling_from_callback() {
        let scheduler = Rc::new(ManualScheduler::new());
        let inner = Rc::clone(&scheduler);
        let hits = Rc::new(RefCell::new(0));
        let hits_inner = Rc::clone(&hits);

        scheduler.after(
            Duration::ZERO,
            Box::new(move || {
                *hits_inner.borrow_mut() += 1;
                let hits = Rc::clone(&hits_inner);
                inner.after(Duration::ZERO, Box::new(move || *hits.borrow_mut() += 1));
            }),
        );

        assert_eq!(scheduler.run_all(), 2);
        assert_eq!(*hits.borrow(), 2);
    }

    #[tokio::test]
    async fn test_local_scheduler_runs_callback_after_delay() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let fired = Rc::new(RefCell::new(false));
                let flag = Rc::clone(&fired);
                let start = std::time::Instant::now();

                LocalScheduler.after(
                    Duration::from_millis(20),
                    Box::new(move || *flag.borrow_mut() = true),
                );
                assert!(!*fired.borrow());

                tokio::time::sleep(Duration::from_millis(100)).await;
                assert!(*fired.borrow());
                assert!(start.elapsed() >= Duration::from_millis(20));
            })
            .await;
    }
}
