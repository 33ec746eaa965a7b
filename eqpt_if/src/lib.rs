//! # Equipment interface crate.
//!
//! Provides the common interfaces between the software and vehicle equipment.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Wheel encoder interface
pub mod enc;

/// Periodic task scheduling interface
pub mod sched;
