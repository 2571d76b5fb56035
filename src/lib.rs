//! Gravitational potential, force fields and a rocket-burn altitude estimate
//! for an Earth–Moon scenario.
//!
//! The physics lives in the member crates re-exported here; this crate wires
//! them into a scenario and the top-level run sequence so the CLI and tests
//! share one entry point.

pub mod pipeline;
pub mod scenario;

pub use emf_config as config;
pub use emf_core as numerics;
pub use emf_export as export;
pub use emf_fields as fields;
pub use emf_propulsion as propulsion;
pub use emf_render as render;
