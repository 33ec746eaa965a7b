//! # Odometry library.
//!
//! This library allows other crates in the workspace to access items defined inside the odometry
//! crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Localisation module - holds the current pose estimate and shares it between threads
pub mod loc;

/// Odometry module - integrates wheel encoder travel into the pose estimate
pub mod odom;

/// Simulated encoders - provides encoder counts for development without hardware
pub mod sim_enc;
