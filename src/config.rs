//! Configuration for an annotation session.

use crate::geometry::INTERSECT_EPSILON;

/// Session-wide policy knobs.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Minimum overlap, in document units, for a block to count as
    /// intersecting a selection.
    pub intersect_epsilon: f32,

    /// Reject zero-area selections at submission time instead of
    /// persisting them.
    pub reject_empty_regions: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            intersect_epsilon: INTERSECT_EPSILON,
            reject_empty_regions: true,
        }
    }

    /// Override the intersection epsilon.
    pub fn with_intersect_epsilon(mut self, epsilon: f32) -> Self {
        self.intersect_epsilon = epsilon;
        self
    }

    /// Allow zero-area selections through validation.
    pub fn with_reject_empty_regions(mut self, reject: bool) -> Self {
        self.reject_empty_regions = reject;
        self
    }
}
