//! Potential heatmaps colored by log10|value| with a side colorbar.

use std::path::Path;

use emf_core::units::m_to_km;
use emf_fields::{PointMass, SampleGrid, ScalarField};
use plotters::coord::Shift;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use tracing::debug;

use crate::contour::draw_bodies;
use crate::{
    PlotOptions, RenderError, backend_err, cell_bounds, jet_color, log_magnitude, normalize,
    prepare_output, select_font_family,
};

/// Heatmap of log10|field| over the grid, with body markers.
pub fn heatmap(
    path: &Path,
    grid: &SampleGrid,
    field: &ScalarField,
    bodies: &[PointMass],
    colorbar_label: &str,
    options: &PlotOptions,
) -> Result<(), RenderError> {
    let log_field = field.map(log_magnitude);
    let range = log_field
        .finite_range()
        .ok_or(RenderError::EmptyData("field has no finite values"))?;

    prepare_output(path)?;
    let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
    draw_heatmap(&root, grid, &log_field, range, bodies, colorbar_label, options)
        .map_err(backend_err)?;
    root.present().map_err(backend_err)?;
    debug!(path = %path.display(), cells = grid.len(), "heatmap written");
    Ok(())
}

/// Cells of `log_field` as filled rectangles in km coordinates, shaded at `alpha`.
pub(crate) fn fill_cells<DB: DrawingBackend>(
    chart: &mut ChartContext<DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    grid: &SampleGrid,
    log_field: &ScalarField,
    (lo, hi): (f64, f64),
    alpha: f64,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let xs_km: Vec<f64> = grid.xs().iter().copied().map(m_to_km).collect();
    let ys_km: Vec<f64> = grid.ys().iter().copied().map(m_to_km).collect();
    for (j, row) in log_field.rows().enumerate() {
        let (y0, y1) = cell_bounds(&ys_km, j);
        let cells = row.iter().enumerate().filter(|(_, v)| v.is_finite()).map(|(i, &v)| {
            let (x0, x1) = cell_bounds(&xs_km, i);
            let color = jet_color(normalize(v, lo, hi)).mix(alpha);
            Rectangle::new([(x0, y0), (x1, y1)], color.filled())
        });
        chart.draw_series(cells)?;
    }
    Ok(())
}

fn draw_heatmap<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    grid: &SampleGrid,
    log_field: &ScalarField,
    (lo, hi): (f64, f64),
    bodies: &[PointMass],
    colorbar_label: &str,
    options: &PlotOptions,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;
    let font_family = select_font_family();
    let caption_font = FontDesc::new(font_family, 24.0, FontStyle::Bold);
    let label_font = FontDesc::new(font_family, 18.0, FontStyle::Normal);

    let legend_width = 140i32;
    let (plot_area, legend_area) =
        root.split_horizontally((options.width as i32 - legend_width).max(200));

    {
        let spec = grid.spec();
        let mut chart = ChartBuilder::on(&plot_area)
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
            .disable_mesh()
            .x_desc("x (km)")
            .y_desc("y (km)")
            .label_style(label_font.clone())
            .axis_desc_style(label_font.clone())
            .x_label_formatter(&|v| format!("{v:.0}"))
            .y_label_formatter(&|v| format!("{v:.0}"))
            .draw()?;

        fill_cells(&mut chart, grid, log_field, (lo, hi), 1.0)?;
        draw_bodies(&mut chart, bodies, &label_font)?;
    }

    draw_colorbar(&legend_area, (lo, hi), colorbar_label, &label_font)
}

/// Vertical jet colorbar spanning `[lo, hi]`.
pub(crate) fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    (lo, hi): (f64, f64),
    label: &str,
    label_font: &FontDesc<'_>,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let hi = if hi > lo { hi } else { lo + 1.0 };
    let mut chart = ChartBuilder::on(area)
        .margin_left(20)
        .margin_right(20)
        .margin_top(30)
        .margin_bottom(30)
        .x_label_area_size(0)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..1.0, lo..hi)?;

    let steps = 300;
    chart.draw_series((0..steps).map(|i| {
        let t0 = i as f64 / steps as f64;
        let t1 = (i + 1) as f64 / steps as f64;
        let v0 = lo + (hi - lo) * t0;
        let v1 = lo + (hi - lo) * t1;
        Rectangle::new([(0.0, v0), (1.0, v1)], jet_color(t0).filled())
    }))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(0)
        .y_labels(6)
        .y_desc(label)
        .y_label_style(label_font.clone())
        .axis_desc_style(label_font.clone())
        .y_label_formatter(&|v| format!("{v:.2}"))
        .draw()?;
    Ok(())
}
