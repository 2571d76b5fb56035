//! Force-direction streamlines over a faint magnitude heatmap.

use std::path::Path;

use emf_core::units::m_to_km;
use emf_core::vector::{self, Vector2};
use emf_fields::{PointMass, SampleGrid, VectorField};
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::debug;

use crate::contour::draw_bodies;
use crate::heatmap::{draw_colorbar, fill_cells};
use crate::{
    PlotOptions, RenderError, backend_err, jet_color, log_magnitude, normalize, prepare_output,
    select_font_family,
};

/// Bilinear lookup into a [`VectorField`] on its [`SampleGrid`].
pub struct FieldSampler<'a> {
    grid: &'a SampleGrid,
    field: &'a VectorField,
}

impl<'a> FieldSampler<'a> {
    pub fn new(grid: &'a SampleGrid, field: &'a VectorField) -> Self {
        Self { grid, field }
    }

    /// Interpolated vector at `p`, or `None` outside the grid.
    pub fn sample(&self, p: &Vector2) -> Option<Vector2> {
        let spec = self.grid.spec();
        if !(spec.x_min_m..=spec.x_max_m).contains(&p[0])
            || !(spec.y_min_m..=spec.y_max_m).contains(&p[1])
        {
            return None;
        }
        let (dx, dy) = self.grid.spacing();
        let fx = (p[0] - spec.x_min_m) / dx;
        let fy = (p[1] - spec.y_min_m) / dy;
        let i = (fx.floor() as usize).min(spec.nx - 2);
        let j = (fy.floor() as usize).min(spec.ny - 2);
        let (tx, ty) = (fx - i as f64, fy - j as f64);

        let v00 = self.field.get(i, j);
        let v10 = self.field.get(i + 1, j);
        let v01 = self.field.get(i, j + 1);
        let v11 = self.field.get(i + 1, j + 1);
        let lerp = |k: usize| {
            let bottom = v00[k] + (v10[k] - v00[k]) * tx;
            let top = v01[k] + (v11[k] - v01[k]) * tx;
            bottom + (top - bottom) * ty
        };
        Some([lerp(0), lerp(1)])
    }

    /// Unit direction at `p`, or `None` outside the grid or where the field vanishes.
    fn direction(&self, p: &Vector2) -> Option<Vector2> {
        let v = self.sample(p)?;
        let n = vector::norm(&v);
        (n > 0.0 && n.is_finite()).then(|| vector::scale(&v, 1.0 / n))
    }
}

/// Follow the field direction from `seed` with midpoint steps of `step_m`.
///
/// Stops after `max_steps`, on leaving the grid, where the field vanishes, or
/// once within `capture_radius_m` of any point in `sinks`.
pub fn trace_streamline(
    sampler: &FieldSampler<'_>,
    seed: Vector2,
    step_m: f64,
    max_steps: usize,
    sinks: &[Vector2],
    capture_radius_m: f64,
) -> Vec<Vector2> {
    let captured =
        |p: &Vector2| sinks.iter().any(|s| vector::norm(&vector::sub(p, s)) <= capture_radius_m);

    let mut line = vec![seed];
    let mut p = seed;
    for _ in 0..max_steps {
        if captured(&p) {
            break;
        }
        let Some(d1) = sampler.direction(&p) else {
            break;
        };
        let mid = vector::add(&p, &vector::scale(&d1, 0.5 * step_m));
        let Some(d2) = sampler.direction(&mid) else {
            break;
        };
        let next = vector::add(&p, &vector::scale(&d2, step_m));
        if sampler.sample(&next).is_none() {
            break;
        }
        line.push(next);
        p = next;
    }
    line
}

/// Evenly spaced seeds, `per_axis` along each side of the grid.
pub(crate) fn seed_lattice(grid: &SampleGrid, per_axis: usize) -> Vec<Vector2> {
    let spec = grid.spec();
    let per_axis = per_axis.max(1);
    let fx = (spec.x_max_m - spec.x_min_m) / per_axis as f64;
    let fy = (spec.y_max_m - spec.y_min_m) / per_axis as f64;
    (0..per_axis)
        .flat_map(|j| {
            (0..per_axis).map(move |i| {
                [
                    spec.x_min_m + fx * (i as f64 + 0.5),
                    spec.y_min_m + fy * (j as f64 + 0.5),
                ]
            })
        })
        .collect()
}

/// Streamline plot of the force field, colored by log10|F| at each seed.
pub fn streamlines(
    path: &Path,
    grid: &SampleGrid,
    field: &VectorField,
    bodies: &[PointMass],
    seeds_per_axis: usize,
    options: &PlotOptions,
) -> Result<(), RenderError> {
    let log_magnitude_field = field.magnitude().map(log_magnitude);
    let range = log_magnitude_field
        .finite_range()
        .ok_or(RenderError::EmptyData("force field has no finite magnitude"))?;

    let sampler = FieldSampler::new(grid, field);
    let (dx, dy) = grid.spacing();
    let step = 0.5 * dx.min(dy);
    let max_steps = 4 * (grid.nx() + grid.ny());
    let sinks: Vec<Vector2> = bodies.iter().map(|b| b.position_m).collect();
    let capture = dx.max(dy);

    let lines: Vec<(RGBColor, Vec<(f64, f64)>)> = seed_lattice(grid, seeds_per_axis)
        .into_iter()
        .filter_map(|seed| {
            let strength = sampler.sample(&seed).map(|v| log_magnitude(vector::norm(&v)))?;
            let color = jet_color(normalize(strength, range.0, range.1));
            let line = trace_streamline(&sampler, seed, step, max_steps, &sinks, capture);
            (line.len() >= 2).then(|| {
                let km = line.iter().map(|p| (m_to_km(p[0]), m_to_km(p[1]))).collect();
                (color, km)
            })
        })
        .collect();

    prepare_output(path)?;
    let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
    draw_streamlines(&root, grid, &log_magnitude_field, range, &lines, bodies, options)
        .map_err(backend_err)?;
    root.present().map_err(backend_err)?;
    debug!(path = %path.display(), lines = lines.len(), "streamline plot written");
    Ok(())
}

fn draw_streamlines<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    grid: &SampleGrid,
    log_magnitude_field: &emf_fields::ScalarField,
    range: (f64, f64),
    lines: &[(RGBColor, Vec<(f64, f64)>)],
    bodies: &[PointMass],
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

        fill_cells(&mut chart, grid, log_magnitude_field, range, 0.25)?;

        for (color, points) in lines {
            chart.draw_series(std::iter::once(PathElement::new(
                points.clone(),
                ShapeStyle::from(color).stroke_width(2),
            )))?;
            if let Some(&start) = points.first() {
                chart.draw_series(std::iter::once(Circle::new(start, 2, color.filled())))?;
            }
        }

        draw_bodies(&mut chart, bodies, &label_font)?;
    }

    draw_colorbar(&legend_area, range, "log10 |F| (N)", &label_font)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use emf_fields::GridSpec;

    fn uniform(grid: &SampleGrid, v: Vector2) -> VectorField {
        VectorField::from_vectors(grid.nx(), grid.ny(), vec![v; grid.len()])
    }

    #[test]
    fn bilinear_sample_reproduces_linear_field() {
        let grid = SampleGrid::new(GridSpec::square((0.0, 4.0), (0.0, 4.0), 5)).unwrap();
        let vectors = (0..grid.len()).map(|idx| grid.point(idx)).collect();
        let field = VectorField::from_vectors(grid.nx(), grid.ny(), vectors);
        let sampler = FieldSampler::new(&grid, &field);

        let v = sampler.sample(&[1.25, 3.5]).unwrap();
        assert_relative_eq!(v[0], 1.25);
        assert_relative_eq!(v[1], 3.5);
        assert_eq!(sampler.sample(&[4.0, 4.0]), Some([4.0, 4.0]));
        assert!(sampler.sample(&[-0.1, 1.0]).is_none());
    }

    #[test]
    fn streamline_follows_uniform_field_until_edge() {
        let grid = SampleGrid::new(GridSpec::square((0.0, 10.0), (0.0, 10.0), 11)).unwrap();
        let field = uniform(&grid, [1.0, 0.0]);
        let sampler = FieldSampler::new(&grid, &field);

        let line = trace_streamline(&sampler, [0.5, 5.0], 1.0, 100, &[], 0.0);
        assert_eq!(line.len(), 10);
        let last = line.last().unwrap();
        assert_relative_eq!(last[0], 9.5);
        assert_relative_eq!(last[1], 5.0);
    }

    #[test]
    fn streamline_stops_at_sink() {
        let grid = SampleGrid::new(GridSpec::square((0.0, 10.0), (0.0, 10.0), 11)).unwrap();
        let field = uniform(&grid, [1.0, 0.0]);
        let sampler = FieldSampler::new(&grid, &field);

        let line = trace_streamline(&sampler, [0.5, 5.0], 1.0, 100, &[[5.0, 5.0]], 1.0);
        let last = line.last().unwrap();
        assert!((last[0] - 5.0).abs() <= 1.0 + 1e-9, "stopped at {last:?}");
    }

    #[test]
    fn vanishing_field_yields_only_the_seed() {
        let grid = SampleGrid::new(GridSpec::square((0.0, 1.0), (0.0, 1.0), 3)).unwrap();
        let field = uniform(&grid, [0.0, 0.0]);
        let sampler = FieldSampler::new(&grid, &field);
        assert_eq!(trace_streamline(&sampler, [0.5, 0.5], 0.1, 10, &[], 0.0).len(), 1);
    }

    #[test]
    fn seed_lattice_covers_cell_centres() {
        let grid = SampleGrid::new(GridSpec::square((0.0, 4.0), (0.0, 2.0), 3)).unwrap();
        let seeds = seed_lattice(&grid, 2);
        assert_eq!(seeds, vec![[1.0, 0.5], [3.0, 0.5], [1.0, 1.5], [3.0, 1.5]]);
    }
}
