//! Forces acting on point masses.
//!
//! Every force is a pure function of a body's kinematic state and mass:
//!
//! - **Constant**: a fixed vector, independent of mass
//! - **Gravity**: uniform field, `F = m * g`
//! - **Drag**: quadratic air resistance opposing motion
//! - **Spring**: Hooke's law toward a fixed anchor, with optional damping
//! - **Friction**: kinetic friction of constant magnitude opposing motion
//! - **Custom**: a caller-supplied closure
//!
//! Parameters are fixed at construction; nothing here depends on simulation time.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::types::{constants, BodyState, Vec3};

/// Anything that produces a force vector from a body's state.
pub trait ForceModel {
    /// Force (not acceleration) acting on a body of `mass` in `state`.
    fn force(&self, state: &BodyState, mass: f64) -> Vec3;
}

/// Signature of a user-supplied force rule.
pub type CustomForceFn = dyn Fn(&BodyState, f64) -> Vec3 + Send + Sync;

/// A named closure force.
#[derive(Clone)]
pub struct CustomForce {
    name: String,
    func: Arc<CustomForceFn>,
}

impl CustomForce {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&BodyState, f64) -> Vec3 + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for CustomForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomForce")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Closed set of force rules a body can carry.
#[derive(Debug, Clone)]
pub enum Force {
    Constant {
        vector: Vec3,
    },
    Gravity {
        /// Field acceleration; the force is `acceleration * mass`
        acceleration: Vec3,
    },
    Drag {
        coefficient: f64,
        reference_area: f64,
        fluid_density: f64,
    },
    Spring {
        anchor: Vec3,
        stiffness: f64,
        damping: f64,
    },
    Friction {
        /// Carried for completeness; only kinetic friction is modelled.
        coefficient_static: f64,
        coefficient_kinetic: f64,
        /// Normal force per unit mass (N/kg)
        normal_force_magnitude: f64,
    },
    Custom(CustomForce),
}

impl Force {
    pub fn constant(vector: Vec3) -> Self {
        Force::Constant { vector }
    }

    pub fn gravity(acceleration: Vec3) -> Self {
        Force::Gravity { acceleration }
    }

    /// Drag with unit reference area in sea-level air.
    pub fn drag(coefficient: f64) -> Self {
        Force::Drag {
            coefficient,
            reference_area: 1.0,
            fluid_density: constants::AIR_DENSITY,
        }
    }

    pub fn spring(anchor: Vec3, stiffness: f64, damping: f64) -> Self {
        Force::Spring {
            anchor,
            stiffness,
            damping,
        }
    }

    pub fn friction(coefficient_kinetic: f64) -> Self {
        Force::Friction {
            coefficient_static: 0.8,
            coefficient_kinetic,
            normal_force_magnitude: 9.81,
        }
    }

    pub fn custom<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&BodyState, f64) -> Vec3 + Send + Sync + 'static,
    {
        Force::Custom(CustomForce::new(name, func))
    }

    /// Descriptor name of this variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Force::Constant { .. } => "constant",
            Force::Gravity { .. } => "gravity",
            Force::Drag { .. } => "drag",
            Force::Spring { .. } => "spring",
            Force::Friction { .. } => "friction",
            Force::Custom(_) => "custom",
        }
    }

    /// Drag equation: F = -0.5 * ρ * Cd * A * |v|² * v̂
    fn drag_force(state: &BodyState, coefficient: f64, area: f64, density: f64) -> Vec3 {
        let speed_sq = state.vel.magnitude_squared();
        if speed_sq == 0.0 {
            return Vec3::ZERO;
        }
        let magnitude = 0.5 * density * speed_sq * coefficient * area;
        state.vel.normalized() * (-magnitude)
    }
}

impl ForceModel for Force {
    fn force(&self, state: &BodyState, mass: f64) -> Vec3 {
        match self {
            Force::Constant { vector } => *vector,
            Force::Gravity { acceleration } => *acceleration * mass,
            Force::Drag {
                coefficient,
                reference_area,
                fluid_density,
            } => Self::drag_force(state, *coefficient, *reference_area, *fluid_density),
            Force::Spring {
                anchor,
                stiffness,
                damping,
            } => {
                let restoring = (state.pos - *anchor) * (-stiffness);
                restoring + state.vel * (-damping)
            }
            Force::Friction {
                coefficient_kinetic,
                normal_force_magnitude,
                ..
            } => {
                if state.vel.magnitude_squared() == 0.0 {
                    return Vec3::ZERO;
                }
                let magnitude = coefficient_kinetic * normal_force_magnitude * mass;
                state.vel.normalized() * (-magnitude)
            }
            Force::Custom(custom) => (custom.func)(state, mass),
        }
    }
}

/// Net force: plain vector sum in list order.
impl ForceModel for [Force] {
    fn force(&self, state: &BodyState, mass: f64) -> Vec3 {
        self.iter()
            .fold(Vec3::ZERO, |total, force| total + force.force(state, mass))
    }
}

/// Callbacks that `custom` force descriptors may refer to by name.
#[derive(Debug, Clone, Default)]
pub struct CustomForces {
    registered: HashMap<String, CustomForce>,
}

impl CustomForces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback under its own name, replacing any previous one.
    pub fn register(&mut self, force: CustomForce) {
        self.registered.insert(force.name().to_string(), force);
    }

    pub fn get(&self, name: &str) -> Option<&CustomForce> {
        self.registered.get(name)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn moving(vel: Vec3) -> BodyState {
        BodyState::new(Vec3::ZERO, vel)
    }

    #[test]
    fn test_gravity_scales_with_mass() {
        let gravity = Force::gravity(constants::DEFAULT_GRAVITY);
        let f = gravity.force(&BodyState::default(), 2.0);
        assert_relative_eq!(f.y, -2.0 * constants::STANDARD_GRAVITY);
        assert_eq!(f.x, 0.0);
    }

    #[test]
    fn test_constant_ignores_mass() {
        let force = Force::constant(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(
            force.force(&BodyState::default(), 50.0),
            Vec3::new(1.0, 2.0, 3.0)
        );
    }

    #[test]
    fn test_drag_opposes_motion() {
        let drag = Force::drag(0.47);
        let f = drag.force(&moving(Vec3::new(10.0, 0.0, 0.0)), 1.0);

        // 0.5 * 1.225 * 100 * 0.47 * 1.0
        assert!(f.x < 0.0, "Drag should oppose motion, got fx={}", f.x);
        assert_relative_eq!(f.x, -28.7875, epsilon = 1e-9);
        assert_eq!(f.y, 0.0);
    }

    #[test]
    fn test_drag_at_rest_is_zero() {
        let drag = Force::drag(0.47);
        assert_eq!(drag.force(&BodyState::default(), 1.0), Vec3::ZERO);
    }

    #[test]
    fn test_drag_increases_with_speed() {
        let drag = Force::drag(0.47);
        let slow = drag.force(&moving(Vec3::new(5.0, 0.0, 0.0)), 1.0);
        let fast = drag.force(&moving(Vec3::new(20.0, 0.0, 0.0)), 1.0);

        // Drag ∝ v², so 4x speed gives 16x drag
        assert_relative_eq!(fast.x / slow.x, 16.0, epsilon = 1e-9);
    }

    #[test]
    fn test_spring_restores_and_damps() {
        let spring = Force::spring(Vec3::ZERO, 10.0, 0.5);
        let state = BodyState::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 4.0, 0.0));
        let f = spring.force(&state, 1.0);
        assert_relative_eq!(f.x, -20.0);
        assert_relative_eq!(f.y, -2.0);
    }

    #[test]
    fn test_friction_is_constant_magnitude() {
        let friction = Force::friction(0.6);
        let slow = friction.force(&moving(Vec3::new(0.0, 0.0, 1.0)), 2.0);
        let fast = friction.force(&moving(Vec3::new(0.0, 0.0, 30.0)), 2.0);
        assert_relative_eq!(slow.z, -0.6 * 9.81 * 2.0, epsilon = 1e-12);
        assert_relative_eq!(slow.z, fast.z, epsilon = 1e-12);
        assert_eq!(friction.force(&BodyState::default(), 2.0), Vec3::ZERO);
    }

    #[test]
    fn test_custom_force_sees_state() {
        let force = Force::custom("lift", |state: &BodyState, mass: f64| {
            Vec3::new(0.0, state.vel.x * mass, 0.0)
        });
        let f = force.force(&moving(Vec3::new(3.0, 0.0, 0.0)), 2.0);
        assert_eq!(f, Vec3::new(0.0, 6.0, 0.0));
        assert_eq!(force.kind(), "custom");
    }

    #[test]
    fn test_net_force_sums_list() {
        let forces = vec![
            Force::constant(Vec3::new(1.0, 0.0, 0.0)),
            Force::gravity(Vec3::new(0.0, -10.0, 0.0)),
        ];
        let f = forces.as_slice().force(&BodyState::default(), 0.5);
        assert_eq!(f, Vec3::new(1.0, -5.0, 0.0));
    }

    #[test]
    fn test_custom_registry_lookup() {
        let mut customs = CustomForces::new();
        customs.register(CustomForce::new("wind", |_: &BodyState, _: f64| Vec3::X));
        assert!(customs.get("wind").is_some());
        assert!(customs.get("storm").is_none());
    }
}
