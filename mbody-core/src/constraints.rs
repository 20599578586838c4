//! Constraints between bodies, relaxed iteratively.
//!
//! Constraints refer to bodies by identifier and look them up on every
//! application. A constraint whose body is missing from the registry does
//! nothing for that application.
//!
//! The solver is a fixed-budget Gauss–Seidel style relaxation: each pass
//! applies every constraint once in list order, for a set number of passes.
//! There is no convergence check.

use serde::{Deserialize, Serialize};

use crate::body::BodyRegistry;
use crate::types::{constants, Vec3};

/// Closed set of constraint kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Constraint {
    /// Rigid rod: positional correction toward `target_distance`.
    Distance {
        body_a: String,
        body_b: String,
        target_distance: f64,
        #[serde(default = "default_stiffness")]
        stiffness: f64,
    },
    /// Hookean link applied as a velocity impulse over `dt`.
    Spring {
        body_a: String,
        body_b: String,
        rest_length: f64,
        spring_constant: f64,
        #[serde(default)]
        damping: f64,
    },
    /// Pulls one body toward a fixed point in space.
    Pin {
        body: String,
        #[serde(with = "components")]
        anchor: Vec3,
        #[serde(default = "default_stiffness")]
        stiffness: f64,
    },
    /// Pulls the pair's centre of mass toward a fixed anchor.
    Revolute {
        body_a: String,
        body_b: String,
        #[serde(with = "components")]
        anchor: Vec3,
    },
}

fn default_stiffness() -> f64 {
    1.0
}

/// Anchors travel as `[x, y]` or `[x, y, z]`, like every other request vector.
mod components {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::types::Vec3;

    pub fn serialize<S: Serializer>(v: &Vec3, serializer: S) -> Result<S::Ok, S::Error> {
        v.to_array().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec3, D::Error> {
        let values = Vec::<f64>::deserialize(deserializer)?;
        Vec3::from_slice(&values).map_err(D::Error::custom)
    }
}

impl Constraint {
    pub fn distance(body_a: &str, body_b: &str, target_distance: f64, stiffness: f64) -> Self {
        Constraint::Distance {
            body_a: body_a.to_string(),
            body_b: body_b.to_string(),
            target_distance,
            stiffness,
        }
    }

    pub fn spring(
        body_a: &str,
        body_b: &str,
        rest_length: f64,
        spring_constant: f64,
        damping: f64,
    ) -> Self {
        Constraint::Spring {
            body_a: body_a.to_string(),
            body_b: body_b.to_string(),
            rest_length,
            spring_constant,
            damping,
        }
    }

    pub fn pin(body: &str, anchor: Vec3, stiffness: f64) -> Self {
        Constraint::Pin {
            body: body.to_string(),
            anchor,
            stiffness,
        }
    }

    pub fn revolute(body_a: &str, body_b: &str, anchor: Vec3) -> Self {
        Constraint::Revolute {
            body_a: body_a.to_string(),
            body_b: body_b.to_string(),
            anchor,
        }
    }

    /// Identifiers this constraint refers to.
    pub fn bodies(&self) -> Vec<&str> {
        match self {
            Constraint::Pin { body, .. } => vec![body.as_str()],
            Constraint::Distance { body_a, body_b, .. }
            | Constraint::Spring { body_a, body_b, .. }
            | Constraint::Revolute { body_a, body_b, .. } => {
                vec![body_a.as_str(), body_b.as_str()]
            }
        }
    }

    /// Apply once. Returns `false` if a referenced body was missing and the
    /// constraint was skipped.
    pub fn apply(&self, bodies: &mut BodyRegistry, dt: f64) -> bool {
        match self {
            Constraint::Distance {
                body_a,
                body_b,
                target_distance,
                stiffness,
            } => {
                let Some((a, b)) = bodies.pair_mut(body_a, body_b) else {
                    return false;
                };
                let displacement = b.pos() - a.pos();
                let distance = displacement.magnitude();
                if distance < constants::COINCIDENT_EPSILON {
                    return true;
                }
                let violation = distance - target_distance;
                if violation.abs() < constants::DISTANCE_TOLERANCE {
                    return true;
                }

                let correction = displacement / distance * (violation * stiffness * 0.5);
                let total_mass = a.mass() + b.mass();
                // Each body moves by the other's mass share: heavier moves less
                let (share_a, share_b) = (b.mass() / total_mass, a.mass() / total_mass);
                a.state.pos += correction * share_a;
                b.state.pos -= correction * share_b;
                true
            }
            Constraint::Spring {
                body_a,
                body_b,
                rest_length,
                spring_constant,
                damping,
            } => {
                let Some((a, b)) = bodies.pair_mut(body_a, body_b) else {
                    return false;
                };
                let displacement = b.pos() - a.pos();
                let distance = displacement.magnitude();
                if distance < constants::COINCIDENT_EPSILON {
                    return true;
                }

                let direction = displacement / distance;
                let mut force = direction * (-spring_constant * (distance - rest_length));
                if *damping > 0.0 {
                    let closing = (b.vel() - a.vel()).dot(&direction);
                    force -= direction * (closing * damping);
                }

                let impulse = force * dt;
                a.state.vel -= impulse / a.mass();
                b.state.vel += impulse / b.mass();
                true
            }
            Constraint::Pin {
                body,
                anchor,
                stiffness,
            } => {
                let Some(target) = bodies.find_mut(body) else {
                    return false;
                };
                let offset = target.pos() - *anchor;
                target.state.pos -= offset * *stiffness;
                target.state.vel *= 1.0 - stiffness * dt;
                true
            }
            Constraint::Revolute {
                body_a,
                body_b,
                anchor,
            } => {
                let Some((a, b)) = bodies.pair_mut(body_a, body_b) else {
                    return false;
                };
                let total_mass = a.mass() + b.mass();
                let com = (a.pos() * a.mass() + b.pos() * b.mass()) / total_mass;
                let correction = *anchor - com;

                // Each body moves by its own mass share
                a.state.pos += correction * (a.mass() / total_mass);
                b.state.pos += correction * (b.mass() / total_mass);
                true
            }
        }
    }
}

/// Ordered list of constraints and the relaxation loop over them.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSolver {
    constraints: Vec<Constraint>,
}

impl ConstraintSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Remove the first constraint equal to `constraint`.
    pub fn remove(&mut self, constraint: &Constraint) -> bool {
        match self.constraints.iter().position(|c| c == constraint) {
            Some(i) => {
                self.constraints.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.constraints.clear();
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    /// Run `iterations` passes over every constraint in order.
    pub fn solve(&self, bodies: &mut BodyRegistry, dt: f64, iterations: usize) {
        for _ in 0..iterations {
            for constraint in &self.constraints {
                if !constraint.apply(bodies, dt) {
                    log::trace!(
                        "skipping constraint on missing body: {:?}",
                        constraint.bodies()
                    );
                }
            }
        }
    }
}

/// Rope between two bodies, as a slightly soft distance constraint.
pub fn rope(body_a: &str, body_b: &str, length: f64) -> Vec<Constraint> {
    vec![Constraint::distance(body_a, body_b, length, 0.8)]
}

pub fn spring_chain(
    body_a: &str,
    body_b: &str,
    rest_length: f64,
    spring_constant: f64,
    damping: f64,
) -> Vec<Constraint> {
    vec![Constraint::spring(
        body_a,
        body_b,
        rest_length,
        spring_constant,
        damping,
    )]
}

// =============================================================================
// Tests
// =============================================================================
