//! |Φ| against distance on log–log axes.

use std::path::Path;

use emf_core::units::m_to_km;
use emf_fields::PotentialCurve;
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::debug;

use crate::{PlotOptions, RenderError, backend_err, prepare_output, select_font_family};

const SERIES_COLORS: [RGBColor; 4] = [
    RGBColor(31, 119, 180),
    RGBColor(214, 39, 40),
    RGBColor(44, 160, 44),
    RGBColor(148, 103, 189),
];

/// Points of a curve in (km, |J/kg|), dropping anything a log axis cannot show.
pub(crate) fn log_points(curve: &PotentialCurve) -> Vec<(f64, f64)> {
    curve
        .iter()
        .map(|(d, phi)| (m_to_km(d), phi.abs()))
        .filter(|(d, phi)| *d > 0.0 && *phi > 0.0 && d.is_finite() && phi.is_finite())
        .collect()
}

/// One line per `(label, curve)`; the legend carries the labels.
pub fn potential_curve(
    path: &Path,
    series: &[(&str, &PotentialCurve)],
    options: &PlotOptions,
) -> Result<(), RenderError> {
    let lines: Vec<(&str, Vec<(f64, f64)>)> = series
        .iter()
        .map(|(label, curve)| (*label, log_points(curve)))
        .filter(|(_, pts)| pts.len() >= 2)
        .collect();
    if lines.is_empty() {
        return Err(RenderError::EmptyData("no curve has two positive samples"));
    }

    let bounds = lines.iter().flat_map(|(_, pts)| pts.iter()).fold(
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
        |(x0, x1, y0, y1), &(x, y)| (x0.min(x), x1.max(x), y0.min(y), y1.max(y)),
    );

    prepare_output(path)?;
    let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
    draw_curve(&root, &lines, bounds, options).map_err(backend_err)?;
    root.present().map_err(backend_err)?;
    debug!(path = %path.display(), series = lines.len(), "potential curve written");
    Ok(())
}

fn draw_curve<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    lines: &[(&str, Vec<(f64, f64)>)],
    (x0, x1, y0, y1): (f64, f64, f64, f64),
    options: &PlotOptions,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;
    let font_family = select_font_family();
    let caption_font = FontDesc::new(font_family, 24.0, FontStyle::Bold);
    let label_font = FontDesc::new(font_family, 18.0, FontStyle::Normal);

    // pad the y span so flat curves still get a visible axis
    let (y0, y1) = if y1 > y0 { (y0 * 0.8, y1 * 1.25) } else { (y0 * 0.5, y0 * 2.0) };
    let x1 = if x1 > x0 { x1 } else { x0 * 10.0 };

    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .caption(options.title.clone(), caption_font)
        .x_label_area_size(60)
        .y_label_area_size(100)
        .build_cartesian_2d((x0..x1).log_scale(), (y0..y1).log_scale())?;

    chart
        .configure_mesh()
        .x_desc("Distance from Earth's centre (km)")
        .y_desc("|Potential| (J/kg)")
        .label_style(label_font.clone())
        .axis_desc_style(label_font.clone())
        .x_label_formatter(&|v| format!("{v:.0e}"))
        .y_label_formatter(&|v| format!("{v:.1e}"))
        .draw()?;

    for (k, (label, points)) in lines.iter().enumerate() {
        let color = SERIES_COLORS[k % SERIES_COLORS.len()];
        chart
            .draw_series(std::iter::once(PathElement::new(
                points.clone(),
                ShapeStyle::from(&color).stroke_width(2),
            )))?
            .label(*label)
            .legend(move |(x, y)| {
                PathElement::new(
                    vec![(x, y), (x + 20, y)],
                    ShapeStyle::from(&color).stroke_width(2),
                )
            });
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(label_font)
        .draw()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_points_drop_non_positive_samples() {
        let curve = PotentialCurve {
            distances_m: vec![0.0, 1_000.0, 2_000.0],
            potentials_j_kg: vec![-5.0, -4.0, 0.0],
        };
        assert_eq!(log_points(&curve), vec![(1.0, 4.0)]);
    }
}
