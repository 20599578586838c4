//! Simulation orchestrator.
//!
//! Each step runs, strictly in order:
//! 1. integrate every body independently (registry order)
//! 2. detect and resolve sphere contacts, if enabled
//! 3. relax constraints for a fixed number of passes
//! 4. record a snapshot and the energy proxy
//!
//! The energy proxy is `½·m·|v|² - m·(g · x)` with the engine's uniform `g`.
//! It is only a conserved quantity for scenes where that field is the sole
//! force; with drag, springs or custom forces it is a diagnostic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::body::{Body, BodyRegistry};
use crate::collision::{Collision, CollisionDetector, CollisionResolver};
use crate::constraints::{Constraint, ConstraintSolver};
use crate::error::{Result, SimError};
use crate::forces::Force;
use crate::integrator::IntegrationMethod;
use crate::types::{constants, Vec3};

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub timestep: f64,
    /// Integration method name, resolved when bodies are integrated
    pub method: String,
    pub gravity: Vec3,
    pub enable_collisions: bool,
    pub constraint_iterations: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            timestep: 0.01,
            method: IntegrationMethod::Rk4.to_string(),
            gravity: constants::DEFAULT_GRAVITY,
            enable_collisions: false,
            constraint_iterations: 2,
        }
    }
}

/// Position and velocity of one body at the end of a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Everything recorded by one call to [`Simulation::advance`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulationResult {
    /// One entry per step, keyed (and therefore sorted) by identifier
    pub steps: Vec<BTreeMap<String, BodySnapshot>>,
    /// Energy proxy per step
    pub energy: Vec<f64>,
    pub total_time: f64,
    pub collision_count: usize,
}

/// Point-mass multi-body simulation.
#[derive(Debug, Clone, Default)]
pub struct Simulation {
    config: SimulationConfig,
    bodies: BodyRegistry,
    constraints: ConstraintSolver,
    resolver: CollisionResolver,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn gravity(&self) -> Vec3 {
        self.config.gravity
    }

    /// Change the uniform field. Bodies already added keep the gravity they
    /// were given; the energy proxy uses the new value from the next step on.
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.config.gravity = gravity;
    }

    /// Add a body. A body without forces gets a gravity force with the
    /// engine's current field copied into it.
    pub fn add_body(&mut self, mut body: Body) -> Result<()> {
        if body.forces().is_empty() {
            body.add_force(Force::gravity(self.config.gravity));
        }
        self.bodies.add(body)
    }

    pub fn add_bodies(&mut self, bodies: impl IntoIterator<Item = Body>) -> Result<()> {
        for body in bodies {
            self.add_body(body)?;
        }
        Ok(())
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.add(constraint);
    }

    pub fn constraints_mut(&mut self) -> &mut ConstraintSolver {
        &mut self.constraints
    }

    pub fn bodies(&self) -> &BodyRegistry {
        &self.bodies
    }

    /// Strict lookup; unknown identifiers are an error.
    pub fn body(&self, id: &str) -> Result<&Body> {
        self.bodies.get(id)
    }

    /// Advance by `steps` fixed timesteps and return what was recorded.
    ///
    /// An unknown method name fails at the first body integration, so an
    /// engine without bodies never reports it.
    pub fn advance(&mut self, steps: usize) -> Result<SimulationResult> {
        log::debug!(
            "advancing {} bodies by {} steps (dt={}, method={}, collisions={})",
            self.bodies.len(),
            steps,
            self.config.timestep,
            self.config.method,
            self.config.enable_collisions
        );

        let mut result = SimulationResult {
            steps: Vec::with_capacity(steps),
            energy: Vec::with_capacity(steps),
            total_time: steps as f64 * self.config.timestep,
            collision_count: 0,
        };

        for _ in 0..steps {
            self.integrate()?;

            if self.config.enable_collisions {
                result.collision_count += self.handle_collisions()?;
            }

            self.constraints.solve(
                &mut self.bodies,
                self.config.timestep,
                self.config.constraint_iterations,
            );

            result.energy.push(self.energy());
            result.steps.push(self.snapshot());
        }

        log::debug!(
            "finished {} steps, {} collisions",
            steps,
            result.collision_count
        );
        Ok(result)
    }

    fn integrate(&mut self) -> Result<()> {
        let dt = self.config.timestep;
        for body in self.bodies.iter_mut() {
            let method: IntegrationMethod = self.config.method.parse()?;
            body.state = method.step(&body.state, &*body, dt).state;
        }
        Ok(())
    }

    /// Detect over the post-integration state, then resolve in detection order.
    fn handle_collisions(&mut self) -> Result<usize> {
        let collisions = CollisionDetector::detect_all(self.bodies.as_slice());
        self.resolve_collisions(&collisions)?;
        Ok(collisions.len())
    }

    /// Every contact keeps the relative velocity it was detected with, even
    /// when an earlier contact in the list already moved one of its bodies.
    /// Contacts come from the registry itself, so a body that cannot be found
    /// is an error rather than a skip.
    fn resolve_collisions(&mut self, collisions: &[Collision]) -> Result<()> {
        for collision in collisions {
            log::trace!(
                "contact {} <-> {} (depth {:.4})",
                collision.body_a,
                collision.body_b,
                collision.penetration
            );
            for id in [&collision.body_a, &collision.body_b] {
                if !self.bodies.contains(id) {
                    return Err(SimError::UnknownBody(id.clone()));
                }
            }
            let (a, b) = self
                .bodies
                .pair_mut(&collision.body_a, &collision.body_b)
                .ok_or_else(|| SimError::UnknownBody(collision.body_b.clone()))?;
            self.resolver.resolve(collision, a, b);
        }
        Ok(())
    }

    /// Kinetic energy plus the uniform-gravity potential proxy, summed over bodies.
    pub fn energy(&self) -> f64 {
        let g = self.config.gravity;
        self.bodies
            .iter()
            .map(|body| body.kinetic_energy() - body.mass() * g.dot(&body.pos()))
            .sum()
    }

    fn snapshot(&self) -> BTreeMap<String, BodySnapshot> {
        self.bodies
            .iter()
            .map(|body| {
                (
                    body.id().to_string(),
                    BodySnapshot {
                        position: body.pos(),
                        velocity: body.vel(),
                    },
                )
            })
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
