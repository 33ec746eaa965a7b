//! # Odometry Executable
//!
//! This binary demonstrates the odometry system without requiring the physical rover. Simulated
//! wheel encoders stand in for the equipment, the odometry engine integrates them in the
//! background, and the main loop samples the estimated pose, archives it, and displays it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    thread,
    time::{Duration, Instant},
};

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};

// Internal
use eqpt_if::sched::TimerScheduler;
use odom_lib::{
    odom::{InitData, OdomEngine, Params as OdomParams},
    sim_enc::{Params as SimEncParams, SimEncoders},
};
use util::{
    archive::Archiver,
    logger::{logger_init, LevelFilter},
    session::{self, Session},
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.10;

/// Number of cycles per second
const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the odometry executable.
#[derive(Debug, Clone, Deserialize)]
struct OdomExecParams {
    /// Length of the demonstration run.
    ///
    /// Units: seconds
    run_duration_s: f64,
}

/// One row of the archived pose trace.
#[derive(Debug, Clone, Serialize)]
struct PoseRecord {
    /// Time since the session epoch.
    ///
    /// Units: seconds
    time_s: f64,

    /// Position in the odometry frame.
    ///
    /// Units: meters
    x_m: f64,
    y_m: f64,

    /// Heading in the odometry frame.
    ///
    /// Units: radians
    heading_rad: f64,

    /// Forward speed estimate.
    ///
    /// Units: meters/second
    speed_ms: f64,

    /// Turn rate estimate.
    ///
    /// Units: radians/second
    turn_rate_rads: f64,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("odom_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Deimos Odometry Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let odom_params: OdomParams =
        util::params::load("odom.toml").wrap_err("Could not load odom params")?;

    let sim_enc_params: SimEncParams =
        util::params::load("sim_enc.toml").wrap_err("Could not load sim_enc params")?;

    let exec_params: OdomExecParams =
        util::params::load("odom_exec.toml").wrap_err("Could not load odom_exec params")?;

    info!("Parameters loaded");

    // ---- MODULE INIT ----

    // Simulated encoders stand in for the wheel encoder equipment
    let encoders = SimEncoders::spawn(&sim_enc_params);

    let scheduler = TimerScheduler::new();

    let mut engine = OdomEngine::new(encoders.clone(), scheduler.clone());
    engine
        .init(InitData {
            params: odom_params,
            initial_pose: None,
        })
        .wrap_err("Failed to initialise the odometry engine")?;
    info!("OdomEngine init complete");

    let store = engine.pose_store();

    let mut archiver = Archiver::from_path(&session, "pose.csv")
        .map_err(|e| eyre!("Failed to create the pose archiver: {}", e))?;

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let run_duration = Duration::from_secs_f64(exec_params.run_duration_s);
    let run_start_instant = Instant::now();
    let mut num_cycles = 0u64;

    while Instant::now() - run_start_instant < run_duration {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- POSE SAMPLING ----

        let pose = store.get_pose();
        let time_s = session::get_elapsed_seconds();

        // ---- ARCHIVING ----

        match archiver.serialise(PoseRecord {
            time_s,
            x_m: pose.position_m.x,
            y_m: pose.position_m.y,
            heading_rad: pose.heading_rad,
            speed_ms: pose.speed_ms,
            turn_rate_rads: pose.turn_rate_rads,
        }) {
            Ok(_) => (),
            Err(e) => warn!("Pose archiver error: {}", e),
        }

        // Display the pose once a second
        if num_cycles % (CYCLE_FREQUENCY_HZ as u64) == 0 {
            info!(
                "Pose: position [{:.3}, {:.3}] m, heading {:.1} deg, speed {:.3} m/s",
                pose.position_m.x,
                pose.position_m.y,
                pose.heading_rad.to_degrees(),
                pose.speed_ms
            );
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
            }
        }

        // Increment cycle counter
        num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    let final_pose = store.get_pose();
    info!(
        "Run complete, final pose: position [{:.3}, {:.3}] m, heading {:.1} deg",
        final_pose.position_m.x,
        final_pose.position_m.y,
        final_pose.heading_rad.to_degrees()
    );

    session.save("final_pose.json", final_pose);

    scheduler.stop();
    encoders.stop();

    session.exit();

    Ok(())
}
