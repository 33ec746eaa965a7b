//! Parameters structure for Odom

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use eqpt_if::enc::EncoderId;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Odometry.
///
/// Distances are documented in meters. The calculations themselves are unit agnostic, any
/// consistent distance unit works provided `axis_width_m` and `ticks_per_m` use the same one.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- GEOMETRY ----

    /// The distance between the left and right wheel contact points.
    ///
    /// Units: meters
    pub axis_width_m: f64,

    /// Number of encoder ticks per meter of wheel surface travel.
    ///
    /// Units: ticks/meter
    pub ticks_per_m: f64,

    // ---- SCHEDULING ----

    /// Period between odometry updates.
    ///
    /// Units: seconds
    pub update_period_s: f64,

    // ---- EQUIPMENT ----

    /// Encoder channel of the left wheel.
    pub left_enc: EncoderId,

    /// Encoder channel of the right wheel.
    pub right_enc: EncoderId

}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_from_toml() {
        let params: Params = toml::from_str(
            r#"
            axis_width_m = 0.25
            ticks_per_m = 1400.0
            update_period_s = 0.1
            left_enc = 0
            right_enc = 1
            "#
        ).unwrap();

        assert_eq!(params.axis_width_m, 0.25);
        assert_eq!(params.ticks_per_m, 1400.0);
        assert_eq!(params.update_period_s, 0.1);
        assert_eq!(params.left_enc, EncoderId(0));
        assert_eq!(params.right_enc, EncoderId(1));
    }
}
