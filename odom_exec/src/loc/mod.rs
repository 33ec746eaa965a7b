//! # Localisation module
//!
//! This module holds the rover's current pose estimate. The estimate is produced by the
//! odometry module's update task and read by anything which needs to know where the rover is,
//! so access goes through [`PoseStore`], which hands out whole-pose snapshots.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The current pose (position and heading in the LM frame) of the rover.
///
/// More specifically this represents the Rover Body (RB) frame in the Local
/// Map (LM) frame.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Default)]
pub struct Pose {

    /// The position in the LM frame.
    ///
    /// Units: meters
    pub position_m: Vector2<f64>,

    /// The heading (angle to the positive LM_X axis), in the range [0, 2*pi)
    /// for any pose produced by the odometry update.
    ///
    /// Units: radians
    pub heading_rad: f64,

    /// Speed of the rover along its heading, negative when reversing.
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// Turn rate of the rover about the vertical axis, positive anticlockwise.
    ///
    /// Units: radians/second
    pub turn_rate_rads: f64
}

/// Shared store of the current pose estimate.
///
/// The store is a cloneable handle, all clones view the same pose. Reads and writes exchange
/// whole-pose snapshots, so a reader never observes a pose mixing fields from two different
/// writes even while the odometry update task is writing.
#[derive(Clone, Default)]
pub struct PoseStore {
    pose: Arc<Mutex<Pose>>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PoseStore {
    /// Create a new store holding the given pose.
    pub fn new(pose: Pose) -> Self {
        Self {
            pose: Arc::new(Mutex::new(pose))
        }
    }

    /// Overwrite the stored pose.
    pub fn set_pose(&self, pose: Pose) {
        *self.pose.lock().expect("PoseStore: pose mutex poisoned") = pose;
    }

    /// Get a snapshot of the stored pose.
    pub fn get_pose(&self) -> Pose {
        *self.pose.lock().expect("PoseStore: pose mutex poisoned")
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::thread;

    #[test]
    fn round_trip() {
        let initial = Pose {
            position_m: Vector2::new(0.5, -0.5),
            heading_rad: 0.25,
            ..Default::default()
        };

        let store = PoseStore::new(initial);

        // The constructed store holds the seed pose
        let read = store.get_pose();
        assert_eq!(read.position_m, initial.position_m);
        assert_eq!(read.heading_rad, initial.heading_rad);

        let pose = Pose {
            position_m: Vector2::new(1.5, -2.25),
            heading_rad: 0.75,
            speed_ms: 0.2,
            turn_rate_rads: -0.1
        };

        store.set_pose(pose);
        let read = store.get_pose();

        assert_eq!(read.position_m, pose.position_m);
        assert_eq!(read.heading_rad, pose.heading_rad);
        assert_eq!(read.speed_ms, pose.speed_ms);
        assert_eq!(read.turn_rate_rads, pose.turn_rate_rads);
    }

    #[test]
    fn snapshots_are_never_torn() {
        let store = PoseStore::default();

        // The writer sets every field of each pose to the same value, so a snapshot mixing two
        // writes shows up as disagreeing fields
        let writer_store = store.clone();
        let writer = thread::spawn(move || {
            for i in 0..10_000 {
                let v = i as f64;
                writer_store.set_pose(Pose {
                    position_m: Vector2::new(v, v),
                    heading_rad: v,
                    speed_ms: v,
                    turn_rate_rads: v
                });
            }
        });

        for _ in 0..10_000 {
            let p = store.get_pose();
            assert_eq!(p.position_m.x, p.position_m.y);
            assert_eq!(p.position_m.x, p.heading_rad);
            assert_eq!(p.heading_rad, p.speed_ms);
            assert_eq!(p.speed_ms, p.turn_rate_rads);
        }

        writer.join().unwrap();
    }
}
