//! Export helpers for CSV and JSON artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export: {0}")]
    Io(#[from] io::Error),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{what} has {got} entries but the grid has {expected}")]
    LengthMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
}

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod fields {
    use std::io::Write;

    use emf_fields::{PotentialCurve, SampleGrid, ScalarField, VectorField};

    use super::ExportError;

    pub const SCALAR_HEADER: [&str; 3] = ["x_m", "y_m", "value"];
    pub const VECTOR_HEADER: [&str; 5] = ["x_m", "y_m", "fx_n", "fy_n", "magnitude_n"];
    pub const CURVE_HEADER: [&str; 2] = ["distance_m", "potential_j_kg"];

    fn check_len(what: &'static str, got: usize, grid: &SampleGrid) -> Result<(), ExportError> {
        if got != grid.len() {
            return Err(ExportError::LengthMismatch {
                what,
                got,
                expected: grid.len(),
            });
        }
        Ok(())
    }

    /// One row per cell in flat-index order: `x_m,y_m,value`.
    pub fn write_scalar_csv<W: Write>(
        writer: W,
        grid: &SampleGrid,
        field: &ScalarField,
    ) -> Result<(), ExportError> {
        check_len("scalar field", field.values().len(), grid)?;
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(SCALAR_HEADER)?;
        for (idx, value) in field.values().iter().enumerate() {
            let [x, y] = grid.point(idx);
            csv.write_record([x.to_string(), y.to_string(), value.to_string()])?;
        }
        csv.flush()?;
        Ok(())
    }

    /// One row per cell: `x_m,y_m,fx_n,fy_n,magnitude_n`.
    pub fn write_vector_csv<W: Write>(
        writer: W,
        grid: &SampleGrid,
        field: &VectorField,
    ) -> Result<(), ExportError> {
        check_len("vector field", field.len(), grid)?;
        let magnitude = field.magnitude();
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(VECTOR_HEADER)?;
        let rows = field
            .fx()
            .iter()
            .zip(field.fy())
            .zip(magnitude.values())
            .enumerate();
        for (idx, ((fx, fy), mag)) in rows {
            let [x, y] = grid.point(idx);
            csv.write_record([
                x.to_string(),
                y.to_string(),
                fx.to_string(),
                fy.to_string(),
                mag.to_string(),
            ])?;
        }
        csv.flush()?;
        Ok(())
    }

    /// `distance_m,potential_j_kg` for each curve sample.
    pub fn write_curve_csv<W: Write>(writer: W, curve: &PotentialCurve) -> Result<(), ExportError> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(CURVE_HEADER)?;
        for (d, phi) in curve.iter() {
            csv.write_record([d.to_string(), phi.to_string()])?;
        }
        csv.flush()?;
        Ok(())
    }
}

pub mod burn {
    use std::io::Write;

    use emf_propulsion::{BurnProfile, BurnSummary};
    use serde::Serialize;
    use serde_json::to_writer_pretty;

    use super::ExportError;

    #[derive(Serialize)]
    struct BurnSidecar<'a> {
        profile: &'a BurnProfile,
        #[serde(flatten)]
        summary: &'a BurnSummary,
    }

    /// Pretty JSON with the burn inputs alongside the computed summary.
    pub fn write_summary_json<W: Write>(
        mut writer: W,
        profile: &BurnProfile,
        summary: &BurnSummary,
    ) -> Result<(), ExportError> {
        to_writer_pretty(&mut writer, &BurnSidecar { profile, summary })?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}
