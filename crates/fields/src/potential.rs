//! Scalar gravitational potential Φ = −G·M/r with the separation floored at 1 km.

use std::time::Instant;

use emf_core::constants::MIN_SEPARATION_M;
use emf_core::vector::{self, Vector2};
use serde::Serialize;
use tracing::debug;

use crate::body::PointMass;
use crate::grid::{SampleGrid, ScalarField};

/// Potential (J/kg) of a single mass at `query`.
///
/// The separation is clamped to [`MIN_SEPARATION_M`] so points on or next to
/// the mass read the same finite value as the clamp radius.
#[inline]
pub fn potential_at(g: f64, source: &PointMass, query: &Vector2) -> f64 {
    let r = source.distance_to(query).max(MIN_SEPARATION_M);
    -g * source.mass_kg / r
}

/// Superposed potential of every source at `query`.
pub fn total_potential(g: f64, sources: &[PointMass], query: &Vector2) -> f64 {
    sources.iter().map(|s| potential_at(g, s, query)).sum()
}

/// Potential at every cell of `grid`.
pub fn potential_field(g: f64, sources: &[PointMass], grid: &SampleGrid) -> ScalarField {
    let started = Instant::now();
    let values = grid.map(|p| total_potential(g, sources, &p));
    debug!(
        cells = grid.len(),
        sources = sources.len(),
        elapsed_ms = started.elapsed().as_secs_f64() * 1e3,
        "potential field evaluated"
    );
    ScalarField::new(grid.nx(), grid.ny(), values)
}

/// Potential sampled along a ray from `origin`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PotentialCurve {
    pub distances_m: Vec<f64>,
    pub potentials_j_kg: Vec<f64>,
}

impl PotentialCurve {
    pub fn len(&self) -> usize {
        self.distances_m.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances_m.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.distances_m
            .iter()
            .copied()
            .zip(self.potentials_j_kg.iter().copied())
    }
}

/// Potential at each distance along `direction` from `origin`.
pub fn potential_curve(
    g: f64,
    sources: &[PointMass],
    origin: &Vector2,
    direction: &Vector2,
    distances_m: &[f64],
) -> PotentialCurve {
    let unit = vector::unit(direction);
    let potentials_j_kg = distances_m
        .iter()
        .map(|&d| {
            let query = vector::add(origin, &vector::scale(&unit, d));
            total_potential(g, sources, &query)
        })
        .collect();
    PotentialCurve {
        distances_m: distances_m.to_vec(),
        potentials_j_kg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn curve_walks_along_the_normalized_direction() {
        let source = PointMass::new("unit", 1.0, [10_000.0, 0.0], 0.0);
        let distances = [2_000.0, 6_000.0];
        let curve = potential_curve(1.0, &[source], &[0.0, 0.0], &[5.0, 0.0], &distances);
        assert_eq!(curve.len(), 2);
        assert_relative_eq!(curve.potentials_j_kg[0], -1.0 / 8_000.0, max_relative = 1e-15);
        assert_relative_eq!(curve.potentials_j_kg[1], -1.0 / 4_000.0, max_relative = 1e-15);
    }

    #[test]
    fn clamp_radius_sets_the_deepest_value() {
        let source = PointMass::new("unit", 3.0, [1.0, 1.0], 0.0);
        assert_relative_eq!(potential_at(2.0, &source, &[1.0, 1.0]), -6.0 / MIN_SEPARATION_M);
    }
}
