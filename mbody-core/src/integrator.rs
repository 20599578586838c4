//! Numerical integrators for advancing a single body in time.
//!
//! Two fixed-step strategies share one contract: given `dt`, a
//! [`BodyState`] and a way to evaluate acceleration at arbitrary states,
//! return the next state.
//!
//! ## Semi-implicit Euler
//!
//! ```text
//! v_new = v + a(x, v)*dt
//! x_new = x + v_new*dt      // updated velocity, symplectic
//! ```
//!
//! ## Classical RK4
//!
//! Applied to the coupled system `dx/dt = v, dv/dt = a(x, v)`. Each stage
//! evaluates acceleration at a hypothetical state of the body being
//! integrated; other bodies are not perturbed, so inter-body effects
//! (collisions, constraints) are not resolved at RK4 accuracy.

use std::fmt;
use std::str::FromStr;

use crate::error::SimError;
use crate::types::{BodyState, Vec3};

/// Result of an integration step, containing the new state and metadata.
#[derive(Debug, Clone, Copy)]
pub struct IntegrationResult {
    pub state: BodyState,
    /// Acceleration at the start of the step
    pub acceleration: Vec3,
}

/// Evaluates acceleration at a hypothetical state.
///
/// Implementations must be pure: asking for the acceleration at some state
/// must not change the thing being asked.
pub trait AccelerationSource {
    fn acceleration(&self, state: &BodyState) -> Vec3;
}

impl<F> AccelerationSource for F
where
    F: Fn(&BodyState) -> Vec3,
{
    fn acceleration(&self, state: &BodyState) -> Vec3 {
        self(state)
    }
}

/// Semi-implicit (symplectic) Euler integrator.
pub struct SemiImplicitEuler;

impl SemiImplicitEuler {
    pub fn step<A: AccelerationSource + ?Sized>(
        state: &BodyState,
        source: &A,
        dt: f64,
    ) -> IntegrationResult {
        let acceleration = source.acceleration(state);

        let vel = state.vel + acceleration * dt;
        let pos = state.pos + vel * dt;

        IntegrationResult {
            state: BodyState { pos, vel },
            acceleration,
        }
    }
}

/// Classical fourth-order Runge–Kutta integrator.
pub struct RungeKutta4;

impl RungeKutta4 {
    pub fn step<A: AccelerationSource + ?Sized>(
        state: &BodyState,
        source: &A,
        dt: f64,
    ) -> IntegrationResult {
        let half_dt = 0.5 * dt;
        let x = state.pos;
        let v = state.vel;

        let k1_v = source.acceleration(state);
        let k1_x = v;

        let k2_x = v + k1_v * half_dt;
        let k2_v = source.acceleration(&BodyState::new(x + k1_x * half_dt, k2_x));

        let k3_x = v + k2_v * half_dt;
        let k3_v = source.acceleration(&BodyState::new(x + k2_x * half_dt, k3_x));

        let k4_x = v + k3_v * dt;
        let k4_v = source.acceleration(&BodyState::new(x + k3_x * dt, k4_x));

        let sixth = dt / 6.0;
        IntegrationResult {
            state: BodyState {
                pos: x + (k1_x + k2_x * 2.0 + k3_x * 2.0 + k4_x) * sixth,
                vel: v + (k1_v + k2_v * 2.0 + k3_v * 2.0 + k4_v) * sixth,
            },
            acceleration: k1_v,
        }
    }
}

/// Integration strategy selected by name (`"euler"` or `"rk4"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationMethod {
    Euler,
    Rk4,
}

impl IntegrationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationMethod::Euler => "euler",
            IntegrationMethod::Rk4 => "rk4",
        }
    }

    pub fn step<A: AccelerationSource + ?Sized>(
        &self,
        state: &BodyState,
        source: &A,
        dt: f64,
    ) -> IntegrationResult {
        match self {
            IntegrationMethod::Euler => SemiImplicitEuler::step(state, source, dt),
            IntegrationMethod::Rk4 => RungeKutta4::step(state, source, dt),
        }
    }
}

impl FromStr for IntegrationMethod {
    type Err = SimError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "euler" => Ok(IntegrationMethod::Euler),
            "rk4" => Ok(IntegrationMethod::Rk4),
            other => Err(SimError::UnsupportedMethod(other.to_string())),
        }
    }
}

impl fmt::Display for IntegrationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Tests
// =============================================================================
