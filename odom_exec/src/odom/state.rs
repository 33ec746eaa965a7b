//! Implementations for the odometry engine state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;

// Internal
use super::{integrate, OdomError, Params};
use crate::loc::{Pose, PoseStore};
use eqpt_if::enc::EncoderBank;
use eqpt_if::sched::Scheduler;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Odometry engine.
///
/// The engine owns the odometry configuration and the shared [`PoseStore`], and is driven by
/// the injected scheduler rather than a main loop. Construct one per vehicle with
/// [`OdomEngine::new`], then call [`OdomEngine::init`] to start the periodic update task.
pub struct OdomEngine<E, S> {
    /// Current engine mode
    mode: Mode,

    /// Encoder bank sampled for wheel travel
    encoders: E,

    /// Scheduler the update task runs on
    scheduler: S,

    /// Store of the current pose estimate
    store: PoseStore,

    /// Parameters, `None` until `init` succeeds
    params: Option<Params>
}

/// Initialisation data for the odometry engine.
pub struct InitData {
    /// Engine parameters, normally loaded from `odom.toml`
    pub params: Params,

    /// Pose the estimate starts from, or `None` to start from the all-zero pose.
    pub initial_pose: Option<Pose>
}

/// The update task registered with the scheduler.
///
/// Owns everything one update needs, so the task never locks engine state.
struct OdomWorker<E> {
    params: Params,
    encoders: E,
    store: PoseStore,
    track: TravelTrack
}

/// Cumulative wheel travel as of the previous update, used to form per-step deltas.
#[derive(Debug, Default, Clone, Copy)]
struct TravelTrack {
    left_m: f64,
    right_m: f64
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The possible modes of the odometry engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `init` has not yet been called and the update task is not running.
    Uninitialised,

    /// `init` has succeeded, the update task runs until process exit.
    Running
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<E, S> OdomEngine<E, S>
where
    E: EncoderBank + Clone + Send + 'static,
    S: Scheduler
{
    /// Create a new engine in `Uninitialised` mode.
    ///
    /// No update task is registered until [`OdomEngine::init`] is called.
    pub fn new(encoders: E, scheduler: S) -> Self {
        Self {
            mode: Mode::Uninitialised,
            encoders,
            scheduler,
            store: PoseStore::default(),
            params: None
        }
    }

    /// Initialise the engine and start the periodic update task.
    ///
    /// Calling `init` on an engine which is already `Running` is a no-op which keeps the
    /// original configuration and pose, so the engine can be wired up from more than one entry
    /// point without double registration.
    ///
    /// # Notes
    /// - If `initial_pose` is `None` the estimate starts from the all-zero pose.
    /// - `axis_width_m`, `ticks_per_m` and `update_period_s` must all be strictly positive.
    pub fn init(&mut self, init_data: InitData) -> Result<(), OdomError> {
        // A running engine keeps its first configuration
        if self.mode == Mode::Running {
            return Ok(());
        }

        validate_params(&init_data.params)?;

        // Seed the store with the initial pose
        self.store.set_pose(init_data.initial_pose.unwrap_or_default());

        // Build the update task. Travel tracking starts from zero, so the first update's
        // deltas are relative to zero cumulative travel.
        let mut worker = OdomWorker {
            params: init_data.params.clone(),
            encoders: self.encoders.clone(),
            store: self.store.clone(),
            track: TravelTrack::default()
        };

        self.scheduler.call_every(
            0.0,
            init_data.params.update_period_s,
            Box::new(move || worker.update())
        );

        self.params = Some(init_data.params);
        self.mode = Mode::Running;

        Ok(())
    }

    /// Get a handle to the engine's pose store.
    ///
    /// The store is shared, clones see every update the engine makes and may also overwrite
    /// the estimate, for instance to correct it against an external fix.
    pub fn pose_store(&self) -> PoseStore {
        self.store.clone()
    }

    /// Get the engine's current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Get the engine's parameters, `None` until `init` has succeeded.
    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }
}

impl<E: EncoderBank> OdomWorker<E> {
    /// Perform one odometry update.
    fn update(&mut self) {
        // Sample cumulative wheel travel
        let left_m =
            self.encoders.cumulative_ticks(self.params.left_enc) as f64 / self.params.ticks_per_m;
        let right_m =
            self.encoders.cumulative_ticks(self.params.right_enc) as f64 / self.params.ticks_per_m;

        // Per-step deltas relative to the previous update
        let left_delta_m = left_m - self.track.left_m;
        let right_delta_m = right_m - self.track.right_m;

        self.track.left_m = left_m;
        self.track.right_m = right_m;

        let new_pose = integrate(
            &self.store.get_pose(),
            left_delta_m,
            right_delta_m,
            self.params.axis_width_m,
            self.params.update_period_s
        );

        self.store.set_pose(new_pose);

        trace!(
            "Odom update: pos [{:.3}, {:.3}] m, heading {:.3} rad",
            new_pose.position_m.x,
            new_pose.position_m.y,
            new_pose.heading_rad
        );
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Check the positivity constraints on the parameters.
///
/// The comparisons are negated rather than flipped so that NaN fails them along with zero and
/// negative values.
fn validate_params(params: &Params) -> Result<(), OdomError> {
    if !(params.axis_width_m > 0.0) {
        return Err(OdomError::NonPositiveParam {
            param: "axis_width_m",
            value: params.axis_width_m
        });
    }
    if !(params.ticks_per_m > 0.0) {
        return Err(OdomError::NonPositiveParam {
            param: "ticks_per_m",
            value: params.ticks_per_m
        });
    }
    if !(params.update_period_s > 0.0) {
        return Err(OdomError::NonPositiveParam {
            param: "update_period_s",
            value: params.update_period_s
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use eqpt_if::enc::EncoderId;
    use eqpt_if::sched::ManualScheduler;
    use nalgebra::Vector2;
    use std::sync::{Arc, Mutex};

    /// Encoder bank with test-settable counts.
    #[derive(Clone, Default)]
    struct FakeEncoders {
        counts: Arc<Mutex<[i64; 2]>>
    }

    impl FakeEncoders {
        fn set(&self, left: i64, right: i64) {
            let mut counts = self.counts.lock().unwrap();
            counts[0] = left;
            counts[1] = right;
        }
    }

    impl EncoderBank for FakeEncoders {
        fn cumulative_ticks(&self, channel: EncoderId) -> i64 {
            self.counts.lock().unwrap()[channel.0 as usize]
        }
    }

    fn test_params() -> Params {
        Params {
            axis_width_m: 1.0,
            ticks_per_m: 100.0,
            update_period_s: 0.1,
            left_enc: EncoderId(0),
            right_enc: EncoderId(1)
        }
    }

    #[test]
    fn init_registers_update_task() {
        let sched = ManualScheduler::new();
        let mut engine = OdomEngine::new(FakeEncoders::default(), sched.clone());

        assert_eq!(engine.mode(), Mode::Uninitialised);
        assert!(engine.params().is_none());

        engine
            .init(InitData {
                params: test_params(),
                initial_pose: None
            })
            .unwrap();

        assert_eq!(engine.mode(), Mode::Running);
        assert_eq!(sched.num_tasks(), 1);

        // No initial pose given so the estimate starts from zero
        let pose = engine.pose_store().get_pose();
        assert_eq!(pose.position_m, Vector2::new(0.0, 0.0));
        assert_eq!(pose.heading_rad, 0.0);
    }

    #[test]
    fn second_init_is_a_noop() {
        let sched = ManualScheduler::new();
        let mut engine = OdomEngine::new(FakeEncoders::default(), sched.clone());

        let initial_pose = Pose {
            position_m: Vector2::new(1.0, 2.0),
            heading_rad: 0.5,
            ..Default::default()
        };

        engine
            .init(InitData {
                params: test_params(),
                initial_pose: Some(initial_pose)
            })
            .unwrap();

        // A second init with different parameters and pose must leave the first configuration
        // untouched and must not register a second task
        let mut other_params = test_params();
        other_params.axis_width_m = 99.0;

        engine
            .init(InitData {
                params: other_params,
                initial_pose: Some(Pose::default())
            })
            .unwrap();

        assert_eq!(engine.params().unwrap().axis_width_m, 1.0);
        assert_eq!(sched.num_tasks(), 1);

        let pose = engine.pose_store().get_pose();
        assert_eq!(pose.position_m, Vector2::new(1.0, 2.0));
        assert_eq!(pose.heading_rad, 0.5);
    }

    #[test]
    fn init_rejects_non_positive_params() {
        let sched = ManualScheduler::new();
        let mut engine = OdomEngine::new(FakeEncoders::default(), sched);

        let mut params = test_params();
        params.ticks_per_m = 0.0;

        let res = engine.init(InitData {
            params,
            initial_pose: None
        });

        assert!(matches!(
            res,
            Err(OdomError::NonPositiveParam {
                param: "ticks_per_m",
                ..
            })
        ));
        assert_eq!(engine.mode(), Mode::Uninitialised);
    }

    #[test]
    fn init_rejects_nan_params() {
        let sched = ManualScheduler::new();
        let mut engine = OdomEngine::new(FakeEncoders::default(), sched);

        // NaN is not strictly positive and would poison every later calculation, it must be
        // caught here like any other non-positive value
        let mut params = test_params();
        params.update_period_s = f64::NAN;

        let res = engine.init(InitData {
            params,
            initial_pose: None
        });

        assert!(matches!(
            res,
            Err(OdomError::NonPositiveParam {
                param: "update_period_s",
                ..
            })
        ));
        assert_eq!(engine.mode(), Mode::Uninitialised);
    }

    #[test]
    fn updates_integrate_straight_travel() {
        let encoders = FakeEncoders::default();
        let sched = ManualScheduler::new();
        let mut engine = OdomEngine::new(encoders.clone(), sched.clone());

        engine
            .init(InitData {
                params: test_params(),
                initial_pose: None
            })
            .unwrap();

        let store = engine.pose_store();

        // 100 ticks on both wheels is 1 m of straight travel
        encoders.set(100, 100);
        sched.fire_all();

        let pose = store.get_pose();
        assert!((pose.position_m.x - 1.0).abs() < 1e-9);
        assert!(pose.position_m.y.abs() < 1e-9);
        assert_eq!(pose.heading_rad, 0.0);
        assert!((pose.speed_ms - 10.0).abs() < 1e-9);

        // A further 50 ticks each is another 0.5 m, deltas are relative to the last update
        // not to zero
        encoders.set(150, 150);
        sched.fire_all();

        let pose = store.get_pose();
        assert!((pose.position_m.x - 1.5).abs() < 1e-9);

        // No new ticks is a valid zero-motion step, not a fault
        sched.fire_all();

        let pose = store.get_pose();
        assert!((pose.position_m.x - 1.5).abs() < 1e-9);
        assert_eq!(pose.speed_ms, 0.0);
        assert_eq!(pose.turn_rate_rads, 0.0);
    }

    #[test]
    fn updates_integrate_turning_travel() {
        let encoders = FakeEncoders::default();
        let sched = ManualScheduler::new();
        let mut engine = OdomEngine::new(encoders.clone(), sched.clone());

        engine
            .init(InitData {
                params: test_params(),
                initial_pose: None
            })
            .unwrap();

        // Left wheel stationary, right wheel 10 ticks (0.1 m) over the 1 m axis turns the
        // heading by 0.1 rad
        encoders.set(0, 10);
        sched.fire_all();

        let pose = engine.pose_store().get_pose();
        assert!((pose.heading_rad - 0.1).abs() < 1e-9);
        assert!((pose.turn_rate_rads - 1.0).abs() < 1e-9);
    }
}
