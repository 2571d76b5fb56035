//! Top-level run: potential → render → combined potential → render → force
//! field → render → burnout altitude.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;
use tracing::info;

use crate::export::{self, ExportError};
use crate::fields::{
    GridError, PotentialCurve, SampleGrid, ScalarField, VectorField, force_field,
    potential_curve, potential_field,
};
use crate::propulsion::BurnSummary;
use crate::render::{self, PlotOptions, RenderError};
use crate::scenario::Scenario;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("failed to create export file: {0}")]
    Io(#[from] std::io::Error),
}

/// What to write besides the computed arrays.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory for PNG figures; `None` skips rendering.
    pub figure_dir: Option<PathBuf>,
    /// Directory for CSV/JSON exports; `None` skips exporting.
    pub export_dir: Option<PathBuf>,
    pub burn_samples: usize,
    pub contour_levels: usize,
    pub streamline_seeds_per_axis: usize,
    pub figure_size: (u32, u32),
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            figure_dir: None,
            export_dir: None,
            burn_samples: 50,
            contour_levels: 24,
            streamline_seeds_per_axis: 14,
            figure_size: (1200, 900),
        }
    }
}

/// Potential results for Earth alone and for Earth plus Moon.
#[derive(Debug, Clone)]
pub struct PotentialStage {
    pub earth_curve: PotentialCurve,
    pub combined_curve: PotentialCurve,
    pub earth_field: ScalarField,
    pub combined_field: ScalarField,
}

/// Everything one run computed, plus the files it wrote.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub grid: SampleGrid,
    pub potential: PotentialStage,
    pub force: VectorField,
    pub burn: BurnSummary,
    pub figures: Vec<PathBuf>,
    pub exports: Vec<PathBuf>,
}

/// Potential along the Earth–Moon axis for Earth alone.
pub fn earth_curve(scenario: &Scenario) -> PotentialCurve {
    potential_curve(
        scenario.gravitational_constant,
        std::slice::from_ref(&scenario.earth),
        &scenario.earth.position_m,
        &[1.0, 0.0],
        &scenario.curve_distances_m,
    )
}

/// Potential along the Earth–Moon axis with both bodies.
pub fn combined_curve(scenario: &Scenario) -> PotentialCurve {
    potential_curve(
        scenario.gravitational_constant,
        &scenario.sources(),
        &scenario.earth.position_m,
        &[1.0, 0.0],
        &scenario.curve_distances_m,
    )
}

/// Earth-only and combined potential over the scenario grid.
pub fn potential_stage(scenario: &Scenario, grid: &SampleGrid) -> PotentialStage {
    let g = scenario.gravitational_constant;
    PotentialStage {
        earth_curve: earth_curve(scenario),
        combined_curve: combined_curve(scenario),
        earth_field: potential_field(g, std::slice::from_ref(&scenario.earth), grid),
        combined_field: potential_field(g, &scenario.sources(), grid),
    }
}

/// Force on the probe from both bodies over the scenario grid.
pub fn force_stage(scenario: &Scenario, grid: &SampleGrid) -> VectorField {
    force_field(
        scenario.gravitational_constant,
        &scenario.sources(),
        scenario.probe_mass_kg,
        grid,
    )
}

pub fn burn_stage(scenario: &Scenario, samples: usize) -> BurnSummary {
    scenario.burn.summarize(&scenario.quadrature, samples)
}

/// Run every stage in order, rendering and exporting as requested.
pub fn run(scenario: &Scenario, options: &RunOptions) -> Result<RunReport, PipelineError> {
    let started = Instant::now();
    let grid = scenario.grid()?;
    let bodies = scenario.sources();
    let (width, height) = options.figure_size;
    let plot = |title: &str| PlotOptions::new(title).with_size(width, height);
    let mut figures = Vec::new();

    let g = scenario.gravitational_constant;
    let earth_only = std::slice::from_ref(&scenario.earth);
    let earth_curve = earth_curve(scenario);
    let earth_field = potential_field(g, earth_only, &grid);
    info!(cells = grid.len(), "earth potential computed");

    if let Some(dir) = &options.figure_dir {
        let path = dir.join("potential_curve.png");
        render::potential_curve(
            &path,
            &[("Earth", &earth_curve)],
            &plot("Gravitational potential of Earth"),
        )?;
        figures.push(path);
        let path = dir.join("potential_earth.png");
        render::heatmap(
            &path,
            &grid,
            &earth_field,
            earth_only,
            "log10 |Φ| (J/kg)",
            &plot("Potential of Earth"),
        )?;
        figures.push(path);
    }

    let combined_curve = combined_curve(scenario);
    let combined_field = potential_field(g, &bodies, &grid);
    info!(cells = grid.len(), "combined potential computed");

    if let Some(dir) = &options.figure_dir {
        let path = dir.join("potential_combined.png");
        render::heatmap(
            &path,
            &grid,
            &combined_field,
            &bodies,
            "log10 |Φ| (J/kg)",
            &plot("Potential of Earth and Moon"),
        )?;
        figures.push(path);
        let path = dir.join("potential_contours.png");
        render::contours(
            &path,
            &grid,
            &combined_field,
            &bodies,
            options.contour_levels,
            &plot("Equipotential contours, Earth and Moon"),
        )?;
        figures.push(path);
    }

    let force = force_stage(scenario, &grid);
    info!(cells = force.len(), "force field computed");

    if let Some(dir) = &options.figure_dir {
        let path = dir.join("force_streamlines.png");
        render::streamlines(
            &path,
            &grid,
            &force,
            &bodies,
            options.streamline_seeds_per_axis,
            &plot("Gravitational force on the command module"),
        )?;
        figures.push(path);
    }

    let burn = burn_stage(scenario, options.burn_samples);

    let potential = PotentialStage {
        earth_curve,
        combined_curve,
        earth_field,
        combined_field,
    };
    let exports = match &options.export_dir {
        Some(dir) => export_all(dir, scenario, &grid, &potential, &force, &burn)?,
        None => Vec::new(),
    };

    info!(
        figures = figures.len(),
        exports = exports.len(),
        elapsed_ms = started.elapsed().as_secs_f64() * 1e3,
        "run complete"
    );

    Ok(RunReport {
        grid,
        potential,
        force,
        burn,
        figures,
        exports,
    })
}

fn create(dir: &Path, name: &str) -> Result<(PathBuf, BufWriter<File>), PipelineError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(name);
    let file = File::create(&path)?;
    Ok((path, BufWriter::new(file)))
}

fn export_all(
    dir: &Path,
    scenario: &Scenario,
    grid: &SampleGrid,
    potential: &PotentialStage,
    force: &VectorField,
    burn: &BurnSummary,
) -> Result<Vec<PathBuf>, PipelineError> {
    let mut written = Vec::new();

    let (path, w) = create(dir, "potential_curve_earth.csv")?;
    export::fields::write_curve_csv(w, &potential.earth_curve)?;
    written.push(path);

    let (path, w) = create(dir, "potential_curve_combined.csv")?;
    export::fields::write_curve_csv(w, &potential.combined_curve)?;
    written.push(path);

    let (path, w) = create(dir, "potential_earth.csv")?;
    export::fields::write_scalar_csv(w, grid, &potential.earth_field)?;
    written.push(path);

    let (path, w) = create(dir, "potential_combined.csv")?;
    export::fields::write_scalar_csv(w, grid, &potential.combined_field)?;
    written.push(path);

    let (path, w) = create(dir, "force_field.csv")?;
    export::fields::write_vector_csv(w, grid, force)?;
    written.push(path);

    let (path, w) = create(dir, "burn_summary.json")?;
    export::burn::write_summary_json(w, &scenario.burn, burn)?;
    written.push(path);

    Ok(written)
}
