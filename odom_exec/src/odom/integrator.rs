//! Dead reckoning integration calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;

// Internal
use crate::loc::Pose;
use util::maths::{bound_to_2pi, nearly_eq};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Integrate one step of wheel travel into a new pose.
///
/// `left_delta_m` and `right_delta_m` are the distances the left and right wheel contact points
/// travelled since the previous update, negative for reverse travel. Over one step the vehicle
/// is modelled as moving on a circular arc about the instantaneous centre of rotation, which is
/// exact for constant wheel speeds rather than a small-angle approximation.
///
/// When the two deltas are nearly equal the motion is a straight line and is handled on its own,
/// the arc expressions divide by the difference of the deltas and blow up as the turning radius
/// grows without bound. In the straight case the heading is unchanged, otherwise the new heading
/// is bounded into [0, 2pi).
pub fn integrate(
    prev: &Pose,
    left_delta_m: f64,
    right_delta_m: f64,
    axis_width_m: f64,
    time_step_s: f64
) -> Pose {
    let heading_rad = prev.heading_rad;

    // Speed is the mean wheel speed whatever the path shape
    let speed_ms = (left_delta_m + right_delta_m) / 2.0 / time_step_s;

    if nearly_eq(left_delta_m, right_delta_m) {
        // Straight line case, no turn
        Pose {
            position_m: Vector2::new(
                prev.position_m.x + left_delta_m * heading_rad.cos(),
                prev.position_m.y + right_delta_m * heading_rad.sin()
            ),
            heading_rad,
            speed_ms,
            turn_rate_rads: 0.0
        }
    }
    else {
        // Signed radius of the arc traced by the axis midpoint about the instantaneous
        // centre of rotation
        let radius_m = axis_width_m * (left_delta_m + right_delta_m)
            / (2.0 * (right_delta_m - left_delta_m));

        // Heading change over this step
        let heading_delta_rad = (right_delta_m - left_delta_m) / axis_width_m;

        Pose {
            position_m: Vector2::new(
                prev.position_m.x
                    + radius_m * (heading_delta_rad + heading_rad).sin()
                    - radius_m * heading_rad.sin(),
                prev.position_m.y
                    - radius_m * (heading_delta_rad + heading_rad).cos()
                    + radius_m * heading_rad.cos()
            ),
            heading_rad: bound_to_2pi(heading_rad + heading_delta_rad),
            speed_ms,
            turn_rate_rads: heading_delta_rad / time_step_s
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
