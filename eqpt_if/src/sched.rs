//! # Periodic Task Scheduling Interface
//!
//! This module defines the scheduling capability consumed by software which needs a function run
//! at a fixed period, without tying that software to a particular timing source. Equipment-style
//! timing is provided by [`TimerScheduler`], which backs each task with a thread. Tests use
//! [`ManualScheduler`], which only fires tasks when told to, so scheduled behaviour can be driven
//! deterministically.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use std::thread;
use std::time::{Duration, Instant};

use log::warn;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A source of periodic task execution.
///
/// Implementations guarantee that a registered task is never invoked concurrently with itself,
/// so the task may keep per-invocation state without locking against its own next firing.
pub trait Scheduler {
    /// Register `task` to be invoked every `period_s` seconds, with the first invocation
    /// `delay_s` seconds from now.
    ///
    /// Once registered a task cannot be deregistered, it runs until the scheduler itself is
    /// stopped or dropped.
    fn call_every(&self, delay_s: f64, period_s: f64, task: Box<dyn FnMut() + Send>);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Thread backed scheduler.
///
/// Each registered task gets a background thread which invokes it, sleeps out the remainder of
/// the period, and warns if an invocation overran the period. Clones share the same run flag and
/// thread handles, so any clone may stop the lot.
#[derive(Clone)]
pub struct TimerScheduler {
    /// Flag indicating that task threads should keep running.
    run: Arc<AtomicBool>,

    /// Join handles of all spawned task threads.
    task_handles: Arc<Mutex<Vec<thread::JoinHandle<()>>>>,
}

/// Scheduler which fires tasks only when [`ManualScheduler::fire_all`] is called.
///
/// Registered periods are recorded but otherwise ignored, the owner decides when "time"
/// advances. Clones share the same task list.
#[derive(Clone)]
pub struct ManualScheduler {
    tasks: Arc<Mutex<Vec<Box<dyn FnMut() + Send>>>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TimerScheduler {
    /// Create a new scheduler with no registered tasks.
    pub fn new() -> Self {
        Self {
            run: Arc::new(AtomicBool::new(true)),
            task_handles: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Stop all task threads and wait for them to exit.
    ///
    /// A task currently sleeping out its period finishes that sleep before exiting, so this call
    /// may block for up to the longest registered period.
    pub fn stop(&self) {
        self.run.store(false, Ordering::Relaxed);

        let mut handles = self
            .task_handles
            .lock()
            .expect("TimerScheduler: task_handles mutex poisoned");

        while let Some(jh) = handles.pop() {
            jh.join().ok();
        }
    }
}

impl Default for TimerScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TimerScheduler {
    fn call_every(&self, delay_s: f64, period_s: f64, mut task: Box<dyn FnMut() + Send>) {
        let run = self.run.clone();

        let jh = thread::spawn(move || {
            if delay_s > 0.0 {
                thread::sleep(Duration::from_secs_f64(delay_s));
            }

            while run.load(Ordering::Relaxed) {
                // Get cycle start time
                let cycle_start_instant = Instant::now();

                task();

                let cycle_dur = Instant::now() - cycle_start_instant;

                // Sleep out the remainder of the period
                match Duration::from_secs_f64(period_s).checked_sub(cycle_dur) {
                    Some(d) => thread::sleep(d),
                    None => warn!(
                        "Scheduled task overran by {:.06} s",
                        cycle_dur.as_secs_f64() - period_s
                    ),
                }
            }
        });

        self.task_handles
            .lock()
            .expect("TimerScheduler: task_handles mutex poisoned")
            .push(jh);
    }
}

impl ManualScheduler {
    /// Create a new scheduler with no registered tasks.
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Invoke every registered task once, in registration order.
    pub fn fire_all(&self) {
        let mut tasks = self
            .tasks
            .lock()
            .expect("ManualScheduler: tasks mutex poisoned");

        for task in tasks.iter_mut() {
            task();
        }
    }

    /// Get the number of registered tasks.
    pub fn num_tasks(&self) -> usize {
        self.tasks
            .lock()
            .expect("ManualScheduler: tasks mutex poisoned")
            .len()
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ManualScheduler {
    fn call_every(&self, _delay_s: f64, _period_s: f64, task: Box<dyn FnMut() + Send>) {
        self.tasks
            .lock()
            .expect("ManualScheduler: tasks mutex poisoned")
            .push(task);
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn manual_fires_only_on_demand() {
        let sched = ManualScheduler::new();
        let count = Arc::new(AtomicUsize::new(0));

        let c = count.clone();
        sched.call_every(
            0.0,
            0.1,
            Box::new(move || {
                c.fetch_add(1, Ordering::Relaxed);
            }),
        );

        assert_eq!(sched.num_tasks(), 1);
        assert_eq!(count.load(Ordering::Relaxed), 0);

        sched.fire_all();
        sched.fire_all();

        assert_eq!(count.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn manual_clones_share_tasks() {
        let sched = ManualScheduler::new();
        let clone = sched.clone();
        let count = Arc::new(AtomicUsize::new(0));

        let c = count.clone();
        clone.call_every(
            0.0,
            0.1,
            Box::new(move || {
                c.fetch_add(1, Ordering::Relaxed);
            }),
        );

        sched.fire_all();

        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn timer_fires_periodically() {
        let sched = TimerScheduler::new();
        let count = Arc::new(AtomicUsize::new(0));

        let c = count.clone();
        sched.call_every(
            0.0,
            0.01,
            Box::new(move || {
                c.fetch_add(1, Ordering::Relaxed);
            }),
        );

        thread::sleep(Duration::from_millis(100));
        sched.stop();

        let fired = count.load(Ordering::Relaxed);
        assert!(fired > 0, "expected at least one firing, got {}", fired);
    }
}
