//! Gravitational potential and force fields of point masses over planar grids.
//!
//! All evaluations are pure: identical inputs give identical outputs, and grid
//! maps run in parallel without changing results.

pub mod body;
pub mod force;
pub mod grid;
pub mod potential;

pub use body::PointMass;
pub use force::{VectorField, force_at, force_field, total_force};
pub use grid::{GridError, GridSpec, SampleGrid, ScalarField};
pub use potential::{PotentialCurve, potential_at, potential_curve, potential_field, total_potential};
