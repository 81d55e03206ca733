//! Tunable force coefficients.

/// Scaling factors for the four flocking forces.
///
/// Set from the outside (UI sliders, config files) and replaced wholesale.
/// The orchestrator copies the current value into every chunk it dispatches,
/// so a step always sees one consistent set.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ForceCoefficients {
    /// Pull back toward the origin as an agent nears the containment edge.
    pub outer_bounds: f32,
    /// Steer along the neighbors' summed heading.
    pub alignment: f32,
    /// Steer toward the neighbors' averaged velocity.
    pub cohesion: f32,
    /// Push away from neighbors, weighted by inverse distance.
    pub separation: f32,
}

impl ForceCoefficients {
    /// Every force disabled.  Agents coast in straight lines.
    pub const ZERO: ForceCoefficients = ForceCoefficients {
        outer_bounds: 0.0,
        alignment:    0.0,
        cohesion:     0.0,
        separation:   0.0,
    };

    pub fn new(outer_bounds: f32, alignment: f32, cohesion: f32, separation: f32) -> Self {
        Self { outer_bounds, alignment, cohesion, separation }
    }

    /// Defaults used by the force functions when no UI is attached.
    pub fn classic() -> Self {
        Self::new(1.0, 6.0, 0.8, 0.1)
    }
}
