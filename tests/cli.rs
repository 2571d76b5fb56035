use assert_cmd::Command;
use predicates::prelude::*;

fn earth_moon() -> Command {
    Command::cargo_bin("earth_moon").expect("earth_moon bin")
}

#[test]
fn burn_prints_time_and_altitude() {
    earth_moon()
        .arg("burn")
        .assert()
        .success()
        .stdout(predicate::str::contains("Burn time: 157.69 s"))
        .stdout(predicate::str::contains("Altitude at burnout: 74"));
}

#[test]
fn burn_json_to_stdout_is_valid_json() {
    let output = earth_moon()
        .args(["burn", "--json", "-", "--samples", "4"])
        .output()
        .expect("run earth_moon");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json on stdout");
    assert_eq!(json["samples"].as_array().map(Vec::len), Some(4));
}

#[test]
fn potential_writes_grid_csv_to_stdout() {
    let output = earth_moon()
        .args(["--resolution", "4", "potential", "--output", "-"])
        .output()
        .expect("run earth_moon");
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "x_m,y_m,value");
    assert_eq!(lines.len(), 17);
}

#[test]
fn force_and_curve_write_files() {
    let dir = tempfile::tempdir().unwrap();
    let force = dir.path().join("force.csv");
    let grid = dir.path().join("potential.csv");
    let curve = dir.path().join("curve.csv");

    earth_moon()
        .args(["--resolution", "5", "force", "--output"])
        .arg(&force)
        .assert()
        .success();
    earth_moon()
        .args(["--resolution", "5", "potential", "--output"])
        .arg(&grid)
        .arg("--curve")
        .arg(&curve)
        .assert()
        .success();

    let force_text = std::fs::read_to_string(&force).unwrap();
    assert!(force_text.starts_with("x_m,y_m,fx_n,fy_n,magnitude_n"));
    assert_eq!(force_text.lines().count(), 26);
    let curve_text = std::fs::read_to_string(&curve).unwrap();
    assert!(curve_text.starts_with("distance_m,potential_j_kg"));
    assert_eq!(curve_text.lines().count(), 401);
}

#[test]
fn run_without_rendering_reports_burn() {
    let dir = tempfile::tempdir().unwrap();
    earth_moon()
        .args(["--config", "data/scenarios/earth_moon.yaml", "--resolution", "8"])
        .args(["run", "--no-render", "--export"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Burn time:"));
    assert!(dir.path().join("force_field.csv").exists());
    assert!(dir.path().join("potential_curve_earth.csv").exists());
}

#[test]
fn invalid_config_fails_with_message() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    std::io::Write::write_all(&mut file, b"[rocket]\nmass_flow_kg_s = 0.0\n").unwrap();
    earth_moon()
        .arg("--config")
        .arg(file.path())
        .arg("burn")
        .assert()
        .failure()
        .stderr(predicate::str::contains("mass_flow_kg_s"));
}

#[test]
fn zero_quadrature_tolerance_is_rejected_up_front() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    std::io::Write::write_all(&mut file, b"[quadrature]\nabs_tol = 0.0\nrel_tol = 0.0\n").unwrap();
    earth_moon()
        .arg("--config")
        .arg(file.path())
        .arg("burn")
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .failure()
        .stderr(predicate::str::contains("rel_tol"));
}
