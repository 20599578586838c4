//! # mbody-core
//!
//! A deterministic point-mass multi-body physics stepper.
//!
//! ## Architecture
//!
//! - `types`: Core value types (Vec3, body kinematic state, constants)
//! - `error`: Error taxonomy
//! - `forces`: Force rules (constant, gravity, drag, spring, friction, custom)
//! - `body`: Bodies and the identifier-keyed registry
//! - `integrator`: Semi-implicit Euler and RK4
//! - `collision`: Sphere–sphere detection and impulse resolution
//! - `constraints`: Distance, spring, pin and revolute constraints
//! - `engine`: The per-step pipeline and recorded results
//! - `config`: Run requests and scenario files (YAML/JSON)

pub mod body;
pub mod collision;
pub mod config;
pub mod constraints;
pub mod engine;
pub mod error;
pub mod forces;
pub mod integrator;
pub mod types;

pub use body::{Body, BodyRegistry};
pub use config::{BodyDescriptor, ForceDescriptor, RunRequest, RunResult, ScenarioLoader};
pub use constraints::{Constraint, ConstraintSolver};
pub use engine::{BodySnapshot, Simulation, SimulationConfig, SimulationResult};
pub use error::{LoadError, Result, SimError};
pub use forces::{CustomForce, CustomForces, Force, ForceModel};
pub use integrator::IntegrationMethod;
pub use types::{BodyState, Vec3};
