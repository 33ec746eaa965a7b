//! # Odometry module
//!
//! Dead reckoning pose estimation from wheel encoder counts. Once initialised the engine's
//! update task runs on the injected scheduler, turning per-period encoder travel into a new
//! pose in the shared [`PoseStore`](crate::loc::PoseStore) every update.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod integrator;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use integrator::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during Odom operation.
#[derive(Debug, thiserror::Error)]
pub enum OdomError {
    #[error("Expected a strictly positive value for `{param}`, found {value}")]
    NonPositiveParam {
        param: &'static str,
        value: f64
    },
}
