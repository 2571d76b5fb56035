//! Planar sample grids and the scalar fields aligned with them.

use emf_core::linspace;
use emf_core::vector::Vector2;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

/// Extent and resolution of a rectangular grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridSpec {
    pub x_min_m: f64,
    pub x_max_m: f64,
    pub y_min_m: f64,
    pub y_max_m: f64,
    pub nx: usize,
    pub ny: usize,
}

impl GridSpec {
    /// N×N grid over the given extent.
    pub fn square(x_range: (f64, f64), y_range: (f64, f64), n: usize) -> Self {
        Self {
            x_min_m: x_range.0,
            x_max_m: x_range.1,
            y_min_m: y_range.0,
            y_max_m: y_range.1,
            nx: n,
            ny: n,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("grid needs at least 2 samples per axis (got {nx}×{ny})")]
    TooFewSamples { nx: usize, ny: usize },
    #[error("grid range {axis} is empty or inverted ({min}..{max})")]
    InvertedRange { axis: char, min: f64, max: f64 },
}

/// Meshgrid of sample coordinates, stored row-major: cell `(i, j)` lives at `j * nx + i`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGrid {
    spec: GridSpec,
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl SampleGrid {
    pub fn new(spec: GridSpec) -> Result<Self, GridError> {
        if spec.nx < 2 || spec.ny < 2 {
            return Err(GridError::TooFewSamples {
                nx: spec.nx,
                ny: spec.ny,
            });
        }
        if !(spec.x_min_m < spec.x_max_m) {
            return Err(GridError::InvertedRange {
                axis: 'x',
                min: spec.x_min_m,
                max: spec.x_max_m,
            });
        }
        if !(spec.y_min_m < spec.y_max_m) {
            return Err(GridError::InvertedRange {
                axis: 'y',
                min: spec.y_min_m,
                max: spec.y_max_m,
            });
        }
        Ok(Self {
            xs: linspace(spec.x_min_m, spec.x_max_m, spec.nx),
            ys: linspace(spec.y_min_m, spec.y_max_m, spec.ny),
            spec,
        })
    }

    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    pub fn nx(&self) -> usize {
        self.spec.nx
    }

    pub fn ny(&self) -> usize {
        self.spec.ny
    }

    /// Column coordinates (one per `i`).
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    /// Row coordinates (one per `j`).
    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn len(&self) -> usize {
        self.spec.nx * self.spec.ny
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        j * self.spec.nx + i
    }

    /// Coordinate of the cell at flat index `idx`.
    #[inline]
    pub fn point(&self, idx: usize) -> Vector2 {
        let (i, j) = (idx % self.spec.nx, idx / self.spec.nx);
        [self.xs[i], self.ys[j]]
    }

    /// Cell spacing along x and y.
    pub fn spacing(&self) -> (f64, f64) {
        (
            (self.spec.x_max_m - self.spec.x_min_m) / (self.spec.nx - 1) as f64,
            (self.spec.y_max_m - self.spec.y_min_m) / (self.spec.ny - 1) as f64,
        )
    }

    /// Evaluate `f` at every cell in parallel; the output is in flat-index order.
    pub fn map<T, F>(&self, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(Vector2) -> T + Sync + Send,
    {
        (0..self.len())
            .into_par_iter()
            .map(|idx| f(self.point(idx)))
            .collect()
    }
}

/// One scalar per grid cell, aligned with a [`SampleGrid`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    nx: usize,
    ny: usize,
    values: Vec<f64>,
}

impl ScalarField {
    pub fn new(nx: usize, ny: usize, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), nx * ny);
        Self { nx, ny, values }
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[j * self.nx + i]
    }

    /// Rows of constant y, bottom to top.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.nx)
    }

    /// Smallest and largest finite values, if any.
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Apply `f` to every value.
    pub fn map(&self, f: impl Fn(f64) -> f64 + Sync + Send) -> ScalarField {
        ScalarField {
            nx: self.nx,
            ny: self.ny,
            values: self.values.par_iter().map(|&v| f(v)).collect(),
        }
    }
}
