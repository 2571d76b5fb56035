use std::fs::File;

use earth_moon_fields::pipeline::{self, RunOptions};
use earth_moon_fields::scenario::Scenario;

fn small_scenario() -> Scenario {
    Scenario::load(None, Some(6)).expect("scenario")
}

#[test]
fn run_without_figures_exports_every_array() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = small_scenario();
    let options = RunOptions {
        export_dir: Some(dir.path().join("out")),
        burn_samples: 5,
        ..RunOptions::default()
    };
    let report = pipeline::run(&scenario, &options).expect("pipeline run");

    assert!(report.figures.is_empty());
    assert_eq!(report.exports.len(), 6);
    assert!(report.exports.iter().all(|p| p.exists()));
    assert_eq!(report.grid.len(), 36);
    assert_eq!(report.force.len(), 36);
    assert_eq!(report.burn.samples.len(), 5);
}

#[test]
fn scalar_csv_rows_follow_grid_order() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = small_scenario();
    let options = RunOptions {
        export_dir: Some(dir.path().to_path_buf()),
        ..RunOptions::default()
    };
    let report = pipeline::run(&scenario, &options).expect("pipeline run");

    let file = File::open(dir.path().join("potential_combined.csv")).unwrap();
    let mut reader = csv::Reader::from_reader(file);
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, ["x_m", "y_m", "value"]);
    let rows: Vec<Vec<f64>> = reader
        .records()
        .map(|r| r.unwrap().iter().map(|v| v.parse().unwrap()).collect())
        .collect();
    assert_eq!(rows.len(), report.grid.len());
    for (idx, row) in rows.iter().enumerate() {
        let [x, y] = report.grid.point(idx);
        assert_eq!(row.as_slice(), &[x, y, report.potential.combined_field.values()[idx]]);
    }
}

#[test]
fn vector_csv_carries_magnitude() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = small_scenario();
    let options = RunOptions {
        export_dir: Some(dir.path().to_path_buf()),
        ..RunOptions::default()
    };
    pipeline::run(&scenario, &options).expect("pipeline run");

    let file = File::open(dir.path().join("force_field.csv")).unwrap();
    let mut reader = csv::Reader::from_reader(file);
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, ["x_m", "y_m", "fx_n", "fy_n", "magnitude_n"]);
    for record in reader.records() {
        let row: Vec<f64> = record.unwrap().iter().map(|v| v.parse().unwrap()).collect();
        let expected = row[2].hypot(row[3]);
        assert!((row[4] - expected).abs() <= 1e-12 * expected.max(1.0));
    }
}

#[test]
fn burn_json_includes_profile_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = small_scenario();
    let options = RunOptions {
        export_dir: Some(dir.path().to_path_buf()),
        burn_samples: 3,
        ..RunOptions::default()
    };
    pipeline::run(&scenario, &options).expect("pipeline run");

    let json: serde_json::Value =
        serde_json::from_reader(File::open(dir.path().join("burn_summary.json")).unwrap()).unwrap();
    assert_eq!(json["profile"]["initial_mass_kg"], 2.8e6);
    assert_eq!(json["samples"].as_array().map(Vec::len), Some(3));
    let altitude = json["altitude_m"].as_f64().unwrap();
    assert!(altitude > 7.0e4 && altitude < 7.5e4, "altitude {altitude}");
    assert_eq!(json["quadrature_converged"], true);
}
