//! # Simulated Encoders
//!
//! SimEncoders stands in for the wheel encoder equipment so the software can be developed and
//! demonstrated without hardware. A background thread advances the two channel counts at rates
//! set by the configured wheel surface speeds, using the measured wall clock time between
//! updates rather than the nominal period.
//!
//! Channel 0 is the left wheel and channel 1 the right wheel.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    sync::{
        atomic::{AtomicBool, AtomicI64, Ordering},
        Arc, Mutex,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use log::warn;
use serde::Deserialize;

use eqpt_if::enc::{EncoderBank, EncoderId};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of simulated encoder channels.
pub const NUM_SIM_ENC_CHANNELS: usize = 2;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the simulated encoders.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Surface speed of the left wheel.
    ///
    /// Units: meters/second
    pub left_speed_ms: f64,

    /// Surface speed of the right wheel.
    ///
    /// Units: meters/second
    pub right_speed_ms: f64,

    /// Number of encoder ticks per meter of wheel surface travel.
    ///
    /// Units: ticks/meter
    pub ticks_per_m: f64,

    /// Period between simulation updates.
    ///
    /// Units: seconds
    pub update_period_s: f64,
}

/// Simulated two-channel encoder bank.
///
/// Cloneable handle, all clones read the same counts and any clone may stop the simulation.
#[derive(Clone)]
pub struct SimEncoders {
    bg_jh: Arc<Mutex<Option<JoinHandle<()>>>>,
    bg_run: Arc<AtomicBool>,
    counts: Arc<[AtomicI64; NUM_SIM_ENC_CHANNELS]>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimEncoders {
    /// Start the simulation with the given parameters.
    pub fn spawn(params: &Params) -> Self {
        let bg_run = Arc::new(AtomicBool::new(true));
        let counts: Arc<[AtomicI64; NUM_SIM_ENC_CHANNELS]> =
            Arc::new([AtomicI64::new(0), AtomicI64::new(0)]);

        // Create clones of these to pass to the bg thread
        let bg_run_clone = bg_run.clone();
        let counts_clone = counts.clone();
        let params_clone = params.clone();

        // Start BG thread
        let bg_jh = Some(thread::spawn(move || {
            bg_thread(params_clone, bg_run_clone, counts_clone)
        }));

        Self {
            bg_jh: Arc::new(Mutex::new(bg_jh)),
            bg_run,
            counts,
        }
    }

    /// Stop the simulation thread.
    ///
    /// The counts stay readable and frozen at their final values.
    pub fn stop(&self) {
        self.bg_run.store(false, Ordering::Relaxed);

        let jh = self
            .bg_jh
            .lock()
            .expect("SimEncoders: bg_jh mutex poisoned")
            .take();

        if let Some(jh) = jh {
            jh.join().ok();
        }
    }
}

impl EncoderBank for SimEncoders {
    fn cumulative_ticks(&self, channel: EncoderId) -> i64 {
        match self.counts.get(channel.0 as usize) {
            Some(c) => c.load(Ordering::Relaxed),
            None => {
                warn!("Read of unknown simulated encoder channel {:?}", channel);
                0
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Background thread, advances the encoder counts at the configured wheel speeds.
fn bg_thread(
    params: Params,
    run: Arc<AtomicBool>,
    counts: Arc<[AtomicI64; NUM_SIM_ENC_CHANNELS]>,
) {
    let period = Duration::from_secs_f64(params.update_period_s);

    // Tick fractions accumulate as floats and are rounded on store, so slow wheels still
    // advance over time
    let mut left_ticks = 0f64;
    let mut right_ticks = 0f64;

    let mut last_update = Instant::now();

    // While instructed to run
    while run.load(Ordering::Relaxed) {
        thread::sleep(period);

        // Use the measured elapsed time, the sleep itself is not exact
        let now = Instant::now();
        let dt_s = (now - last_update).as_secs_f64();
        last_update = now;

        left_ticks += params.left_speed_ms * params.ticks_per_m * dt_s;
        right_ticks += params.right_speed_ms * params.ticks_per_m * dt_s;

        counts[0].store(left_ticks.round() as i64, Ordering::Relaxed);
        counts[1].store(right_ticks.round() as i64, Ordering::Relaxed);
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn counts_advance_at_wheel_speed() {
        let sim = SimEncoders::spawn(&Params {
            left_speed_ms: 1.0,
            right_speed_ms: 2.0,
            ticks_per_m: 1000.0,
            update_period_s: 0.005,
        });

        thread::sleep(Duration::from_millis(100));
        sim.stop();

        let left = sim.cumulative_ticks(EncoderId(0));
        let right = sim.cumulative_ticks(EncoderId(1));

        // Wide margins, test hosts time imprecisely
        assert!(left > 0, "left count did not advance");
        assert!(right > left, "right wheel should outpace the left");
    }

    #[test]
    fn unknown_channel_reads_zero() {
        let sim = SimEncoders::spawn(&Params {
            left_speed_ms: 0.0,
            right_speed_ms: 0.0,
            ticks_per_m: 1000.0,
            update_period_s: 0.01,
        });

        assert_eq!(sim.cumulative_ticks(EncoderId(7)), 0);

        sim.stop();
    }
}
