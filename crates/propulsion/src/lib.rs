//! Constant-flow rocket burn under uniform gravity and its burnout altitude.
//!
//! Velocity follows the rocket equation minus gravity loss while propellant
//! remains. Once the dry mass is reached, velocity is taken as zero rather than
//! coasting. That truncation is part of the model and is kept as is.

use emf_core::quadrature::{self, QuadratureOptions};
use serde::Serialize;
use tracing::{debug, info};

/// Mass-depleting burn at constant flow rate and exhaust velocity.
///
/// Expected to satisfy `0 < final_mass_kg <= initial_mass_kg` and
/// `mass_flow_kg_s > 0`; the scenario loader checks this, the math here does not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BurnProfile {
    pub initial_mass_kg: f64,
    pub final_mass_kg: f64,
    pub mass_flow_kg_s: f64,
    pub exhaust_velocity_m_s: f64,
    pub gravity_m_s2: f64,
}

/// Which branch of the velocity model applies at a given time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BurnPhase {
    Burning,
    BurnedOut,
}

/// Telemetry row for the burn profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BurnSample {
    pub time_s: f64,
    pub mass_kg: f64,
    pub velocity_m_s: f64,
}

/// Summary metrics for the computed burn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BurnSummary {
    pub burn_time_s: f64,
    pub altitude_m: f64,
    pub altitude_closed_form_m: f64,
    pub quadrature_error_estimate_m: f64,
    pub quadrature_evaluations: usize,
    pub quadrature_converged: bool,
    /// Velocity just before cut-off, from the burning branch.
    pub burnout_velocity_m_s: f64,
    pub propellant_mass_kg: f64,
    pub samples: Vec<BurnSample>,
}

impl BurnProfile {
    /// Propellant burned between ignition and dry mass.
    pub fn propellant_mass_kg(&self) -> f64 {
        self.initial_mass_kg - self.final_mass_kg
    }

    /// Time to burn down to dry mass, `(m0 - mf) / mdot`.
    pub fn burn_time_s(&self) -> f64 {
        self.propellant_mass_kg() / self.mass_flow_kg_s
    }

    /// `max(m0 - mdot·t, mf)`, pinned to `mf` from `T` on.
    pub fn mass_at(&self, t: f64) -> f64 {
        match self.phase_at(t) {
            BurnPhase::Burning => {
                (self.initial_mass_kg - self.mass_flow_kg_s * t).max(self.final_mass_kg)
            }
            BurnPhase::BurnedOut => self.final_mass_kg,
        }
    }

    /// Burning while `t < T`, i.e. while mass is still above the dry mass.
    pub fn phase_at(&self, t: f64) -> BurnPhase {
        if t < self.burn_time_s() {
            BurnPhase::Burning
        } else {
            BurnPhase::BurnedOut
        }
    }

    /// Vertical velocity at `t`; exactly zero once burned out.
    pub fn velocity_at(&self, t: f64) -> f64 {
        match self.phase_at(t) {
            BurnPhase::Burning => self.burning_velocity(t, self.mass_at(t)),
            BurnPhase::BurnedOut => 0.0,
        }
    }

    fn burning_velocity(&self, t: f64, mass_kg: f64) -> f64 {
        self.exhaust_velocity_m_s * (self.initial_mass_kg / mass_kg).ln() - self.gravity_m_s2 * t
    }

    /// Altitude at burnout, integrating `velocity_at` over `[0, T]`.
    pub fn altitude_at_burnout(&self, options: &QuadratureOptions) -> quadrature::Quadrature {
        quadrature::integrate(
            |t| self.velocity_at(t),
            0.0,
            self.burn_time_s(),
            options,
        )
    }

    /// Analytic reference for [`Self::altitude_at_burnout`]:
    /// `ve/mdot · (m0 - mf - mf·ln(m0/mf)) - g·T²/2`.
    pub fn altitude_closed_form_m(&self) -> f64 {
        let (m0, mf) = (self.initial_mass_kg, self.final_mass_kg);
        let t = self.burn_time_s();
        self.exhaust_velocity_m_s / self.mass_flow_kg_s * (m0 - mf - mf * (m0 / mf).ln())
            - 0.5 * self.gravity_m_s2 * t * t
    }

    /// `n` evenly spaced rows over `[0, T]`; the last row is the burned-out state.
    pub fn samples(&self, n: usize) -> Vec<BurnSample> {
        let t_end = self.burn_time_s();
        emf_core::linspace(0.0, t_end, n)
            .into_iter()
            .map(|time_s| BurnSample {
                time_s,
                mass_kg: self.mass_at(time_s),
                velocity_m_s: self.velocity_at(time_s),
            })
            .collect()
    }

    /// Burn time, altitude (numeric and closed form) and a telemetry table.
    pub fn summarize(&self, options: &QuadratureOptions, sample_count: usize) -> BurnSummary {
        let burn_time_s = self.burn_time_s();
        let altitude = self.altitude_at_burnout(options);
        let closed_form = self.altitude_closed_form_m();
        debug!(
            evaluations = altitude.evaluations,
            abs_error = altitude.abs_error,
            deviation_m = (altitude.value - closed_form).abs(),
            "burnout altitude integrated"
        );
        info!(burn_time_s, altitude_m = altitude.value, "burn profile evaluated");

        BurnSummary {
            burn_time_s,
            altitude_m: altitude.value,
            altitude_closed_form_m: closed_form,
            quadrature_error_estimate_m: altitude.abs_error,
            quadrature_evaluations: altitude.evaluations,
            quadrature_converged: altitude.converged,
            burnout_velocity_m_s: self.burning_velocity(burn_time_s, self.final_mass_kg),
            propellant_mass_kg: self.propellant_mass_kg(),
            samples: self.samples(sample_count),
        }
    }
}
