//! Inverse-square force on a test mass, with r² floored at 1e6 m².

use std::time::Instant;

use emf_core::constants::MIN_SEPARATION_SQ_M2;
use emf_core::vector::{self, Vector2};
use tracing::debug;

use crate::body::PointMass;
use crate::grid::{SampleGrid, ScalarField};

/// Force (N) exerted by `source` on `test_mass_kg` sitting at `query`.
///
/// Points from the query toward the source. Inside the clamp radius the
/// magnitude holds at its 1 km value; exactly on the source the direction is
/// undefined and the force is zero.
#[inline]
pub fn force_at(g: f64, source: &PointMass, test_mass_kg: f64, query: &Vector2) -> Vector2 {
    let offset = source.offset_to(query);
    let r2 = vector::norm_squared(&offset).max(MIN_SEPARATION_SQ_M2);
    let magnitude = g * source.mass_kg * test_mass_kg / r2;
    vector::scale(&vector::unit(&offset), -magnitude)
}

/// Vector sum of the forces from every source.
pub fn total_force(g: f64, sources: &[PointMass], test_mass_kg: f64, query: &Vector2) -> Vector2 {
    sources.iter().fold([0.0, 0.0], |acc, s| {
        vector::add(&acc, &force_at(g, s, test_mass_kg, query))
    })
}

/// Force components at every cell, aligned with the grid they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorField {
    nx: usize,
    ny: usize,
    fx: Vec<f64>,
    fy: Vec<f64>,
}

impl VectorField {
    pub fn from_vectors(nx: usize, ny: usize, vectors: Vec<Vector2>) -> Self {
        debug_assert_eq!(vectors.len(), nx * ny);
        let (fx, fy) = vectors.into_iter().map(|v| (v[0], v[1])).unzip();
        Self { nx, ny, fx, fy }
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn fx(&self) -> &[f64] {
        &self.fx
    }

    pub fn fy(&self) -> &[f64] {
        &self.fy
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Vector2 {
        let idx = j * self.nx + i;
        [self.fx[idx], self.fy[idx]]
    }

    pub fn len(&self) -> usize {
        self.fx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fx.is_empty()
    }

    /// Per-cell |F|, always non-negative.
    pub fn magnitude(&self) -> ScalarField {
        let values = self
            .fx
            .iter()
            .zip(&self.fy)
            .map(|(x, y)| x.hypot(*y))
            .collect();
        ScalarField::new(self.nx, self.ny, values)
    }
}

/// Force on `test_mass_kg` at every cell of `grid`.
pub fn force_field(
    g: f64,
    sources: &[PointMass],
    test_mass_kg: f64,
    grid: &SampleGrid,
) -> VectorField {
    let started = Instant::now();
    let vectors = grid.map(|p| total_force(g, sources, test_mass_kg, &p));
    debug!(
        cells = grid.len(),
        sources = sources.len(),
        elapsed_ms = started.elapsed().as_secs_f64() * 1e3,
        "force field evaluated"
    );
    VectorField::from_vectors(grid.nx(), grid.ny(), vectors)
}
