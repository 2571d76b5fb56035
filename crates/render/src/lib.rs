//! PNG rendering for potential curves, potential heatmaps, contour plots and
//! force-field streamlines.
//!
//! Drawing goes through `plotters`' bitmap backend. The geometry helpers
//! (colormap, marching squares, streamline tracing) are plain functions so they
//! can be checked without touching a backend.

use std::fs;
use std::path::Path;

use plotters::prelude::*;
use thiserror::Error;

pub mod contour;
pub mod curve;
pub mod heatmap;
pub mod streamlines;

pub use contour::{contours, log_levels, marching_square_segments};
pub use curve::potential_curve;
pub use heatmap::heatmap;
pub use streamlines::{FieldSampler, streamlines, trace_streamline};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to prepare output: {0}")]
    Io(#[from] std::io::Error),
    #[error("plot backend failed: {0}")]
    Backend(String),
    #[error("nothing to draw: {0}")]
    EmptyData(&'static str),
}

/// Canvas size and caption shared by every figure.
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl PlotOptions {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            width: 1200,
            height: 900,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

pub(crate) fn backend_err<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Backend(err.to_string())
}

pub(crate) fn prepare_output(path: &Path) -> Result<(), RenderError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub(crate) fn select_font_family() -> FontFamily<'static> {
    if cfg!(target_os = "macos") {
        FontFamily::Name("Helvetica")
    } else if cfg!(target_os = "windows") {
        FontFamily::Name("Arial")
    } else {
        FontFamily::Name("DejaVu Sans")
    }
}

/// Jet colormap over `t ∈ [0, 1]`.
pub fn jet_color(t_in: f64) -> RGBColor {
    let t = t_in.clamp(0.0, 1.0);
    fn comp(v: f64) -> f64 {
        (1.0 - (v - 1.0).abs()).clamp(0.0, 1.0)
    }
    let r = comp(1.5 - 4.0 * (t - 0.75).abs());
    let g = comp(1.5 - 4.0 * (t - 0.5).abs());
    let b = comp(1.5 - 4.0 * (t - 0.25).abs());
    RGBColor((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

/// `log10(|v|)`, with zero mapped to NaN so it drops out of color ranges.
pub fn log_magnitude(v: f64) -> f64 {
    let a = v.abs();
    if a > 0.0 { a.log10() } else { f64::NAN }
}

/// Position of `value` within `[lo, hi]`, collapsing a flat range to 0.
pub(crate) fn normalize(value: f64, lo: f64, hi: f64) -> f64 {
    if (hi - lo).abs() < f64::EPSILON {
        0.0
    } else {
        ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
    }
}

/// Half-way bounds around `coords[idx]`, extrapolated at the edges.
pub(crate) fn cell_bounds(coords: &[f64], idx: usize) -> (f64, f64) {
    let center = coords[idx];
    let prev = idx.checked_sub(1).and_then(|i| coords.get(i)).copied();
    let next = coords.get(idx + 1).copied();

    let left = match (prev, next) {
        (Some(prev), _) => 0.5 * (prev + center),
        (None, Some(next)) => center - 0.5 * (next - center),
        (None, None) => center - 0.5,
    };

    let right = match (prev, next) {
        (_, Some(next)) => 0.5 * (center + next),
        (Some(prev), None) => center + 0.5 * (center - prev),
        (None, None) => center + 0.5,
    };

    (left, right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jet_runs_blue_to_red() {
        let low = jet_color(0.0);
        let high = jet_color(1.0);
        assert!(low.2 > low.0, "low end should be blue: {low:?}");
        assert!(high.0 > high.2, "high end should be red: {high:?}");
        assert_eq!(jet_color(-3.0), low);
        assert_eq!(jet_color(7.0), high);
    }

    #[test]
    fn log_magnitude_drops_zero() {
        assert!((log_magnitude(-1000.0) - 3.0).abs() < 1e-12);
        assert!(log_magnitude(0.0).is_nan());
    }

    #[test]
    fn cell_bounds_are_contiguous() {
        let xs = [0.0, 1.0, 3.0];
        assert_eq!(cell_bounds(&xs, 0), (-0.5, 0.5));
        assert_eq!(cell_bounds(&xs, 1), (0.5, 2.0));
        assert_eq!(cell_bounds(&xs, 2), (2.0, 4.0));
    }
}
