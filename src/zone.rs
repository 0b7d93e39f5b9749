//! Bed zone configuration and proximity test.

use crate::domain::Position3D;

/// Spherical zone around the configured bed center.
///
/// Pure configuration: the proximity test is stateless and any update takes
/// effect on the next test.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BedZone {
    /// Bed center in camera-relative meters.
    pub center: Position3D,
    /// Zone radius in meters.
    pub radius_m: f32,
}

impl Default for BedZone {
    fn default() -> Self {
        // Typical wall-mount geometry: bed roughly 2 m from the camera.
        Self {
            center: Position3D::new(0.0, 0.0, 2.0),
            radius_m: 1.5,
        }
    }
}

impl BedZone {
    /// Create a zone from a center and radius.
    pub fn new(center: Position3D, radius_m: f32) -> Self {
        Self {
            center,
            radius_m: radius_m.max(0.0),
        }
    }

    /// Euclidean distance from a position to the bed center.
    pub fn proximity_m(&self, position: &Position3D) -> f32 {
        position.distance_to(&self.center)
    }

    /// Whether the position lies inside the zone.
    pub fn contains(&self, position: &Position3D) -> bool {
        self.proximity_m(position) <= self.radius_m
    }
}
