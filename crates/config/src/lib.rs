//! Scenario configuration models and loaders for the Earth–Moon field workspace.
//!
//! Every section falls back to the built-in Earth–Moon scenario, so a file only
//! has to name the values it overrides.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use emf_core::constants;

/// Complete scenario: physical constants, bodies, probe, rocket and sampling layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub constants: ConstantsConfig,
    pub earth: BodyConfig,
    pub moon: MoonConfig,
    pub probe: ProbeConfig,
    pub rocket: RocketConfig,
    pub grid: GridConfig,
    pub curve: CurveConfig,
    pub quadrature: QuadratureConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstantsConfig {
    pub gravitational_constant: f64,
    pub surface_gravity_m_s2: f64,
}

impl Default for ConstantsConfig {
    fn default() -> Self {
        Self {
            gravitational_constant: constants::G,
            surface_gravity_m_s2: 9.81,
        }
    }
}

/// Mass and radius of a central body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub mass_kg: f64,
    pub radius_m: f64,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            mass_kg: 5.972e24,
            radius_m: 6.371e6,
        }
    }
}

/// The Moon sits on the +x axis at `distance_from_earth_m`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoonConfig {
    pub mass_kg: f64,
    pub radius_m: f64,
    pub distance_from_earth_m: f64,
}

impl Default for MoonConfig {
    fn default() -> Self {
        Self {
            mass_kg: 7.348e22,
            radius_m: 1.737e6,
            distance_from_earth_m: 3.844e8,
        }
    }
}

/// Test mass the force field acts on (the command module).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub mass_kg: f64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self { mass_kg: 5_500.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RocketConfig {
    pub exhaust_velocity_m_s: f64,
    pub mass_flow_kg_s: f64,
    pub initial_mass_kg: f64,
    pub final_mass_kg: f64,
}

impl Default for RocketConfig {
    fn default() -> Self {
        Self {
            exhaust_velocity_m_s: 2.4e3,
            mass_flow_kg_s: 1.3e4,
            initial_mass_kg: 2.8e6,
            final_mass_kg: 7.5e5,
        }
    }
}

/// Square sample grid used for the 2D potential and force fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub resolution: usize,
    pub x_min_m: f64,
    pub x_max_m: f64,
    pub y_min_m: f64,
    pub y_max_m: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            resolution: 200,
            x_min_m: -1.0e8,
            x_max_m: 4.8e8,
            y_min_m: -2.9e8,
            y_max_m: 2.9e8,
        }
    }
}

/// Sampling of the 1D potential-vs-distance curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    pub samples: usize,
    /// Curve starts at this distance from Earth's centre; defaults to the surface.
    pub start_m: Option<f64>,
    /// Curve ends here; defaults to twice the Earth–Moon distance.
    pub stop_m: Option<f64>,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            samples: 400,
            start_m: None,
            stop_m: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadratureConfig {
    pub abs_tol: f64,
    pub rel_tol: f64,
    /// Cap on adaptive subintervals (QUADPACK `limit`).
    pub max_subintervals: usize,
}

impl Default for QuadratureConfig {
    fn default() -> Self {
        Self {
            abs_tol: 1.49e-8,
            rel_tol: 1.49e-8,
            max_subintervals: 50,
        }
    }
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid scenario: {0}")]
    Invalid(String),
}

impl ScenarioConfig {
    /// First curve sample distance (m).
    pub fn curve_start_m(&self) -> f64 {
        self.curve.start_m.unwrap_or(self.earth.radius_m)
    }

    /// Last curve sample distance (m).
    pub fn curve_stop_m(&self) -> f64 {
        self.curve
            .stop_m
            .unwrap_or(2.0 * self.moon.distance_from_earth_m)
    }

    /// Check the invariants the physics relies on.
    ///
    /// Only the burn invariants and the grid/curve layout are checked; masses and
    /// constants are trusted as given.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rocket = &self.rocket;
        if !(rocket.mass_flow_kg_s > 0.0) {
            return Err(invalid(format!(
                "rocket.mass_flow_kg_s must be positive (got {})",
                rocket.mass_flow_kg_s
            )));
        }
        if !(rocket.final_mass_kg > 0.0) {
            return Err(invalid(format!(
                "rocket.final_mass_kg must be positive (got {})",
                rocket.final_mass_kg
            )));
        }
        if rocket.final_mass_kg > rocket.initial_mass_kg {
            return Err(invalid(format!(
                "rocket.final_mass_kg ({}) exceeds rocket.initial_mass_kg ({})",
                rocket.final_mass_kg, rocket.initial_mass_kg
            )));
        }

        let grid = &self.grid;
        if grid.resolution < 2 {
            return Err(invalid(format!(
                "grid.resolution must be at least 2 (got {})",
                grid.resolution
            )));
        }
        if !(grid.x_min_m < grid.x_max_m) || !(grid.y_min_m < grid.y_max_m) {
            return Err(invalid("grid extents must satisfy min < max".to_string()));
        }

        if self.curve.samples < 2 {
            return Err(invalid(format!(
                "curve.samples must be at least 2 (got {})",
                self.curve.samples
            )));
        }
        let (start, stop) = (self.curve_start_m(), self.curve_stop_m());
        if !(start > 0.0 && start < stop) {
            return Err(invalid(format!(
                "curve range must satisfy 0 < start < stop (got {start}..{stop})"
            )));
        }

        let quad = &self.quadrature;
        if !(quad.abs_tol >= 0.0 && quad.abs_tol.is_finite())
            || !(quad.rel_tol >= 0.0 && quad.rel_tol.is_finite())
        {
            return Err(invalid(format!(
                "quadrature tolerances must be finite and non-negative (got abs {} rel {})",
                quad.abs_tol, quad.rel_tol
            )));
        }
        // same floor QUADPACK applies to epsrel when epsabs is zero
        if quad.abs_tol <= 0.0 && quad.rel_tol < MIN_REL_TOL {
            return Err(invalid(format!(
                "quadrature.rel_tol must be at least {MIN_REL_TOL:e} when abs_tol is zero (got {})",
                quad.rel_tol
            )));
        }
        if quad.max_subintervals == 0 {
            return Err(invalid(
                "quadrature.max_subintervals must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

const MIN_REL_TOL: f64 = 50.0 * f64::EPSILON;

fn invalid(message: String) -> ConfigError {
    ConfigError::Invalid(message)
}

/// Load and validate a scenario from a `.toml` file or a YAML file.
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<ScenarioConfig, ConfigError> {
    let config = parse_scenario(path.as_ref())?;
    config.validate()?;
    Ok(config)
}

/// Load the scenario at `path` if given, otherwise the built-in defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<ScenarioConfig, ConfigError> {
    match path {
        Some(path) => load_scenario(path),
        None => Ok(ScenarioConfig::default()),
    }
}

fn parse_scenario(path: &Path) -> Result<ScenarioConfig, ConfigError> {
    if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_validate() {
        ScenarioConfig::default().validate().expect("defaults are valid");
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[rocket]\nmass_flow_kg_s = 2.0e4\n\n[grid]\nresolution = 32").unwrap();

        let cfg = load_scenario(file.path()).expect("partial scenario");
        assert_eq!(cfg.rocket.mass_flow_kg_s, 2.0e4);
        assert_eq!(cfg.rocket.initial_mass_kg, 2.8e6);
        assert_eq!(cfg.grid.resolution, 32);
        assert_eq!(cfg.moon, MoonConfig::default());
    }

    #[test]
    fn yaml_is_the_fallback_format() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "probe:\n  mass_kg: 1000.0").unwrap();

        let cfg = load_scenario(file.path()).expect("yaml scenario");
        assert_eq!(cfg.probe.mass_kg, 1000.0);
        assert_eq!(cfg.earth, BodyConfig::default());
    }

    #[test]
    fn inverted_burn_is_rejected() {
        let mut cfg = ScenarioConfig::default();
        cfg.rocket.final_mass_kg = cfg.rocket.initial_mass_kg * 2.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

        let mut cfg = ScenarioConfig::default();
        cfg.rocket.mass_flow_kg_s = 0.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn unreachable_quadrature_tolerance_is_rejected() {
        let mut cfg = ScenarioConfig::default();
        cfg.quadrature.abs_tol = 0.0;
        cfg.quadrature.rel_tol = 0.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

        cfg.quadrature.rel_tol = 1e-17;
        assert!(cfg.validate().is_err());

        cfg.quadrature.rel_tol = 1e-10;
        cfg.validate().expect("relative tolerance alone is enough");

        let mut cfg = ScenarioConfig::default();
        cfg.quadrature.abs_tol = f64::NAN;
        assert!(cfg.validate().is_err());

        let mut cfg = ScenarioConfig::default();
        cfg.quadrature.rel_tol = -1.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_subinterval_limit_is_rejected() {
        let mut cfg = ScenarioConfig::default();
        cfg.quadrature.max_subintervals = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("max_subintervals"), "{err}");
    }

    #[test]
    fn degenerate_grid_is_rejected() {
        let mut cfg = ScenarioConfig::default();
        cfg.grid.resolution = 1;
        assert!(cfg.validate().is_err());

        let mut cfg = ScenarioConfig::default();
        cfg.grid.x_max_m = cfg.grid.x_min_m;
        assert!(cfg.validate().is_err());
    }
}
