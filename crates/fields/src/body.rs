use emf_core::vector::{self, Vector2};
use serde::Serialize;

/// Gravitating point mass in the plane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointMass {
    pub name: String,
    pub mass_kg: f64,
    pub position_m: Vector2,
    /// Physical radius; only used when drawing the body.
    pub radius_m: f64,
}

impl PointMass {
    pub fn new(name: impl Into<String>, mass_kg: f64, position_m: Vector2, radius_m: f64) -> Self {
        Self {
            name: name.into(),
            mass_kg,
            position_m,
            radius_m,
        }
    }

    /// Offset from this mass to `query`.
    #[inline]
    pub fn offset_to(&self, query: &Vector2) -> Vector2 {
        vector::sub(query, &self.position_m)
    }

    /// Unclamped distance from this mass to `query`.
    #[inline]
    pub fn distance_to(&self, query: &Vector2) -> f64 {
        vector::norm(&self.offset_to(query))
    }
}
