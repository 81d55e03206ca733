//! Control messages accepted by a running flock.

use flock_core::ForceCoefficients;

/// One request from the presentation side.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ControlMessage {
    /// Rebuild the population as an `n×n×n` grid centered at the origin.
    Resize(usize),
    /// Replace the force coefficients used by subsequent steps.
    SetCoefficients(ForceCoefficients),
    /// Run one step, unless one is already in flight.
    Advance,
}
