//! # Wheel Encoder Interface
//!
//! This module defines the interface between the software and wheel encoder equipment. Encoder
//! drivers count ticks themselves (in hardware or in a background task); the software only ever
//! reads the running totals through [`EncoderBank::cumulative_ticks`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Identifies a single encoder channel within an [`EncoderBank`].
///
/// Channel numbering is equipment specific, so parameter files carry these ids rather than the
/// software assuming a layout.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncoderId(pub u8);

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A bank of wheel encoders which can be sampled for cumulative tick counts.
pub trait EncoderBank {
    /// Get the cumulative tick count of the given channel.
    ///
    /// The count accumulates from equipment start and decreases when the wheel is driven in
    /// reverse. The channel is assumed to have been initialised by the equipment driver before
    /// the first call.
    fn cumulative_ticks(&self, channel: EncoderId) -> i64;
}
