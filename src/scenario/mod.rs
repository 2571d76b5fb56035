//! Runtime Earth–Moon scenario assembled from a [`ScenarioConfig`].

use std::path::Path;

use thiserror::Error;

use crate::config::{ConfigError, ScenarioConfig, load_or_default};
use crate::numerics::logspace;
use crate::numerics::quadrature::QuadratureOptions;
use crate::fields::{GridError, GridSpec, PointMass, SampleGrid};
use crate::propulsion::BurnProfile;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid sample grid: {0}")]
    Grid(#[from] GridError),
}

/// Earth at the origin, the Moon on +x, a probe for the force field and the launch burn.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub gravitational_constant: f64,
    pub earth: PointMass,
    pub moon: PointMass,
    pub probe_mass_kg: f64,
    pub burn: BurnProfile,
    pub grid_spec: GridSpec,
    pub curve_distances_m: Vec<f64>,
    pub quadrature: QuadratureOptions,
}

impl Scenario {
    pub fn from_config(cfg: &ScenarioConfig) -> Self {
        let earth = PointMass::new("Earth", cfg.earth.mass_kg, [0.0, 0.0], cfg.earth.radius_m);
        let moon = PointMass::new(
            "Moon",
            cfg.moon.mass_kg,
            [cfg.moon.distance_from_earth_m, 0.0],
            cfg.moon.radius_m,
        );

        Self {
            gravitational_constant: cfg.constants.gravitational_constant,
            earth,
            moon,
            probe_mass_kg: cfg.probe.mass_kg,
            burn: BurnProfile {
                initial_mass_kg: cfg.rocket.initial_mass_kg,
                final_mass_kg: cfg.rocket.final_mass_kg,
                mass_flow_kg_s: cfg.rocket.mass_flow_kg_s,
                exhaust_velocity_m_s: cfg.rocket.exhaust_velocity_m_s,
                gravity_m_s2: cfg.constants.surface_gravity_m_s2,
            },
            grid_spec: GridSpec::square(
                (cfg.grid.x_min_m, cfg.grid.x_max_m),
                (cfg.grid.y_min_m, cfg.grid.y_max_m),
                cfg.grid.resolution,
            ),
            curve_distances_m: logspace(cfg.curve_start_m(), cfg.curve_stop_m(), cfg.curve.samples),
            quadrature: QuadratureOptions {
                abs_tol: cfg.quadrature.abs_tol,
                rel_tol: cfg.quadrature.rel_tol,
                max_subintervals: cfg.quadrature.max_subintervals,
            },
        }
    }

    /// Load from `path` (or the built-in defaults) and apply an optional grid override.
    pub fn load(path: Option<&Path>, resolution: Option<usize>) -> Result<Self, ScenarioError> {
        let mut cfg = load_or_default(path)?;
        if let Some(n) = resolution {
            cfg.grid.resolution = n;
        }
        cfg.validate()?;
        Ok(Self::from_config(&cfg))
    }

    /// Both gravitating bodies, Earth first.
    pub fn sources(&self) -> [PointMass; 2] {
        [self.earth.clone(), self.moon.clone()]
    }

    pub fn grid(&self) -> Result<SampleGrid, GridError> {
        SampleGrid::new(self.grid_spec)
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::from_config(&ScenarioConfig::default())
    }
}
