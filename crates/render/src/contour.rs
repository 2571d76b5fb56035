//! Iso-potential contour plots via marching squares.

use std::path::Path;

use emf_core::units::m_to_km;
use emf_fields::{PointMass, SampleGrid, ScalarField};
use plotters::coord::Shift;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use tracing::debug;

use crate::{
    PlotOptions, RenderError, backend_err, jet_color, log_magnitude, normalize, prepare_output,
    select_font_family,
};

type Segment = ((f64, f64), (f64, f64));

/// `count` levels evenly spaced in log10 between `lo` and `hi` (both already log10 values).
///
/// The end points are nudged inward by half a step so no level sits exactly on
/// the extreme cell value.
pub fn log_levels(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    if count == 0 || !(lo.is_finite() && hi.is_finite()) || hi <= lo {
        return Vec::new();
    }
    let step = (hi - lo) / count as f64;
    (0..count).map(|k| lo + step * (k as f64 + 0.5)).collect()
}

/// Line segments where the bilinear surface over one cell crosses `level`.
///
/// `values` and `coords` run counter-clockwise from the lower-left corner.
pub fn marching_square_segments(
    values: [f64; 4],
    coords: [(f64, f64); 4],
    level: f64,
) -> Vec<Segment> {
    let idx = values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v >= level)
        .fold(0u8, |acc, (bit, _)| acc | (1 << bit));
    if idx == 0 || idx == 15 {
        return Vec::new();
    }

    let edge_point = |edge: usize| -> (f64, f64) {
        let (a, b) = (edge, (edge + 1) % 4);
        let (va, vb) = (values[a], values[b]);
        let (xa, ya) = coords[a];
        let (xb, yb) = coords[b];
        if (vb - va).abs() < f64::EPSILON {
            return ((xa + xb) * 0.5, (ya + yb) * 0.5);
        }
        let t = (level - va) / (vb - va);
        (xa + t * (xb - xa), ya + t * (yb - ya))
    };

    let pairs: &[(usize, usize)] = match idx {
        1 | 14 => &[(3, 0)],
        2 | 13 => &[(0, 1)],
        3 | 12 => &[(3, 1)],
        4 | 11 => &[(1, 2)],
        6 | 9 => &[(0, 2)],
        7 | 8 => &[(3, 2)],
        5 => &[(3, 2), (0, 1)],
        10 => &[(3, 0), (1, 2)],
        _ => &[],
    };

    pairs
        .iter()
        .map(|&(e1, e2)| (edge_point(e1), edge_point(e2)))
        .collect()
}

/// All segments of one contour level across the field, in grid coordinates (m).
pub(crate) fn level_segments(grid: &SampleGrid, field: &ScalarField, level: f64) -> Vec<Segment> {
    let (xs, ys) = (grid.xs(), grid.ys());
    let mut segments = Vec::new();
    for j in 0..ys.len().saturating_sub(1) {
        for i in 0..xs.len().saturating_sub(1) {
            let values = [
                field.get(i, j),
                field.get(i + 1, j),
                field.get(i + 1, j + 1),
                field.get(i, j + 1),
            ];
            if values.iter().any(|v| !v.is_finite()) {
                continue;
            }
            let coords = [
                (xs[i], ys[j]),
                (xs[i + 1], ys[j]),
                (xs[i + 1], ys[j + 1]),
                (xs[i], ys[j + 1]),
            ];
            segments.extend(marching_square_segments(values, coords, level));
        }
    }
    segments
}

/// Contour plot of log10|Φ| with `level_count` iso-lines.
pub fn contours(
    path: &Path,
    grid: &SampleGrid,
    field: &ScalarField,
    bodies: &[PointMass],
    level_count: usize,
    options: &PlotOptions,
) -> Result<(), RenderError> {
    let log_field = field.map(log_magnitude);
    let (lo, hi) = log_field
        .finite_range()
        .ok_or(RenderError::EmptyData("potential field has no finite values"))?;
    let levels = log_levels(lo, hi, level_count);

    prepare_output(path)?;
    let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
    draw_contours(&root, grid, &log_field, bodies, &levels, options).map_err(backend_err)?;
    root.present().map_err(backend_err)?;
    debug!(path = %path.display(), levels = levels.len(), "contour plot written");
    Ok(())
}

fn draw_contours<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    grid: &SampleGrid,
    log_field: &ScalarField,
    bodies: &[PointMass],
    levels: &[f64],
    options: &PlotOptions,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;
    let font_family = select_font_family();
    let caption_font = FontDesc::new(font_family, 24.0, FontStyle::Bold);
    let label_font = FontDesc::new(font_family, 18.0, FontStyle::Normal);

    let spec = grid.spec();
    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .caption(options.title.clone(), caption_font)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d(
            m_to_km(spec.x_min_m)..m_to_km(spec.x_max_m),
            m_to_km(spec.y_min_m)..m_to_km(spec.y_max_m),
        )?;

    chart
        .configure_mesh()
        .x_desc("x (km)")
        .y_desc("y (km)")
        .label_style(label_font.clone())
        .axis_desc_style(label_font.clone())
        .x_label_formatter(&|v| format!("{v:.0}"))
        .y_label_formatter(&|v| format!("{v:.0}"))
        .draw()?;

    let (lo, hi) = (
        levels.first().copied().unwrap_or(0.0),
        levels.last().copied().unwrap_or(1.0),
    );
    for &level in levels {
        let color = jet_color(normalize(level, lo, hi));
        for (p1, p2) in level_segments(grid, log_field, level) {
            chart.draw_series(std::iter::once(PathElement::new(
                vec![
                    (m_to_km(p1.0), m_to_km(p1.1)),
                    (m_to_km(p2.0), m_to_km(p2.1)),
                ],
                ShapeStyle::from(&color).stroke_width(1),
            )))?;
        }
    }

    draw_bodies(&mut chart, bodies, &label_font)?;
    Ok(())
}

/// Marker and name for each body, in km chart coordinates.
pub(crate) fn draw_bodies<DB: DrawingBackend>(
    chart: &mut ChartContext<DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    bodies: &[PointMass],
    label_font: &FontDesc<'_>,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    for body in bodies {
        let at = (m_to_km(body.position_m[0]), m_to_km(body.position_m[1]));
        chart.draw_series(std::iter::once(Circle::new(
            at,
            5,
            ShapeStyle::from(&BLACK).stroke_width(2),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            body.name.clone(),
            at,
            label_font.clone().color(&BLACK),
        )))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT_SQUARE: [(f64, f64); 4] = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];

    #[test]
    fn uniform_cells_have_no_crossing() {
        assert!(marching_square_segments([1.0; 4], UNIT_SQUARE, 0.5).is_empty());
        assert!(marching_square_segments([0.0; 4], UNIT_SQUARE, 0.5).is_empty());
    }

    #[test]
    fn single_high_corner_cuts_its_two_edges() {
        let segs = marching_square_segments([1.0, 0.0, 0.0, 0.0], UNIT_SQUARE, 0.5);
        assert_eq!(segs, vec![((0.0, 0.5), (0.5, 0.0))]);
    }

    #[test]
    fn vertical_split_gives_horizontal_midline() {
        // bottom row high, top row low
        let segs = marching_square_segments([1.0, 1.0, 0.0, 0.0], UNIT_SQUARE, 0.5);
        assert_eq!(segs, vec![((0.0, 0.5), (1.0, 0.5))]);
    }

    #[test]
    fn saddle_produces_two_segments() {
        assert_eq!(
            marching_square_segments([1.0, 0.0, 1.0, 0.0], UNIT_SQUARE, 0.5).len(),
            2
        );
    }

    #[test]
    fn levels_stay_inside_range() {
        let levels = log_levels(0.0, 10.0, 5);
        assert_eq!(levels, vec![1.0, 3.0, 5.0, 7.0, 9.0]);
        assert!(log_levels(1.0, 1.0, 5).is_empty());
    }
}
