//! Bodies and the registry that owns them.
//!
//! A [`Body`] is a point mass with a collision radius, material coefficients
//! and the forces it carries. The [`BodyRegistry`] keys bodies by identifier
//! and iterates them in insertion order.

use std::collections::HashMap;

use crate::error::{Result, SimError};
use crate::forces::{Force, ForceModel};
use crate::integrator::AccelerationSource;
use crate::types::{BodyState, Vec3};

/// A point mass taking part in the simulation.
#[derive(Debug, Clone)]
pub struct Body {
    id: String,
    mass: f64,
    pub state: BodyState,
    radius: f64,
    restitution: f64,
    friction: f64,
    forces: Vec<Force>,
}

impl Body {
    /// Create a body with the default radius 1.0, restitution 0.5 and no friction.
    ///
    /// Fails if the identifier is empty or the mass is not strictly positive.
    pub fn new(id: impl Into<String>, mass: f64, pos: Vec3, vel: Vec3) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(SimError::InvalidBody {
                id,
                reason: "identifier cannot be empty".to_string(),
            });
        }
        // Written so NaN is rejected as well
        if !(mass > 0.0) {
            return Err(SimError::InvalidBody {
                id,
                reason: format!("mass must be positive, got {mass}"),
            });
        }
        Ok(Self {
            id,
            mass,
            state: BodyState::new(pos, vel),
            radius: 1.0,
            restitution: 0.5,
            friction: 0.0,
            forces: Vec::new(),
        })
    }

    pub fn with_radius(mut self, radius: f64) -> Result<Self> {
        if !(radius > 0.0) {
            return Err(self.invalid(format!(
                "radius must be positive, got {radius}"
            )));
        }
        self.radius = radius;
        Ok(self)
    }

    pub fn with_restitution(mut self, restitution: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&restitution) {
            return Err(self.invalid(format!(
                "restitution must be within [0, 1], got {restitution}"
            )));
        }
        self.restitution = restitution;
        Ok(self)
    }

    pub fn with_friction(mut self, friction: f64) -> Result<Self> {
        if !(friction >= 0.0) {
            return Err(self.invalid(format!(
                "friction must be non-negative, got {friction}"
            )));
        }
        self.friction = friction;
        Ok(self)
    }

    pub fn with_force(mut self, force: Force) -> Self {
        self.forces.push(force);
        self
    }

    fn invalid(&self, reason: String) -> SimError {
        SimError::InvalidBody {
            id: self.id.clone(),
            reason,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn pos(&self) -> Vec3 {
        self.state.pos
    }

    pub fn vel(&self) -> Vec3 {
        self.state.vel
    }

    /// Collision radius
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn restitution(&self) -> f64 {
        self.restitution
    }

    /// Surface friction coefficient, carried through for callers
    pub fn friction(&self) -> f64 {
        self.friction
    }

    pub fn forces(&self) -> &[Force] {
        &self.forces
    }

    pub fn add_force(&mut self, force: Force) {
        self.forces.push(force);
    }

    /// Net force at the body's current state.
    pub fn net_force(&self) -> Vec3 {
        self.net_force_at(&self.state)
    }

    /// Net force the body would feel in `state`; the body itself is not touched.
    pub fn net_force_at(&self, state: &BodyState) -> Vec3 {
        self.forces.force(state, self.mass)
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.state.kinetic_energy(self.mass)
    }
}

impl AccelerationSource for Body {
    fn acceleration(&self, state: &BodyState) -> Vec3 {
        self.net_force_at(state) / self.mass
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Bodies keyed by identifier, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct BodyRegistry {
    bodies: Vec<Body>,
    index: HashMap<String, usize>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a body. A second body with the same identifier is rejected.
    pub fn add(&mut self, body: Body) -> Result<()> {
        if self.index.contains_key(body.id()) {
            return Err(SimError::DuplicateBody(body.id().to_string()));
        }
        self.index.insert(body.id().to_string(), self.bodies.len());
        self.bodies.push(body);
        Ok(())
    }

    /// Strict lookup, for callers that cannot proceed without the body.
    pub fn get(&self, id: &str) -> Result<&Body> {
        self.find(id)
            .ok_or_else(|| SimError::UnknownBody(id.to_string()))
    }

    /// Tolerant lookup; `None` for unknown identifiers.
    pub fn find(&self, id: &str) -> Option<&Body> {
        self.index.get(id).map(|&i| &self.bodies[i])
    }

    /// Strict mutable lookup.
    pub fn get_mut(&mut self, id: &str) -> Result<&mut Body> {
        self.find_mut(id)
            .ok_or_else(|| SimError::UnknownBody(id.to_string()))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Body> {
        let i = *self.index.get(id)?;
        Some(&mut self.bodies[i])
    }

    /// Mutable access to two distinct bodies at once.
    ///
    /// `None` if either is unknown or both identifiers name the same body.
    pub fn pair_mut(&mut self, a: &str, b: &str) -> Option<(&mut Body, &mut Body)> {
        let ia = *self.index.get(a)?;
        let ib = *self.index.get(b)?;
        if ia == ib {
            return None;
        }
        if ia < ib {
            let (left, right) = self.bodies.split_at_mut(ib);
            Some((&mut left[ia], &mut right[0]))
        } else {
            let (left, right) = self.bodies.split_at_mut(ia);
            Some((&mut right[0], &mut left[ib]))
        }
    }

    /// Remove a body; unknown identifiers are ignored.
    pub fn remove(&mut self, id: &str) -> Option<Body> {
        let i = self.index.remove(id)?;
        let body = self.bodies.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(body)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.bodies.iter_mut()
    }

    /// Bodies in insertion order.
    pub fn as_slice(&self) -> &[Body] {
        &self.bodies
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
        self.index.clear();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn body(id: &str) -> Body {
        Body::new(id, 1.0, Vec3::ZERO, Vec3::ZERO).unwrap()
    }

    #[test]
    fn test_rejects_non_positive_mass() {
        for mass in [0.0, -1.0, f64::NAN] {
            let result = Body::new("a", mass, Vec3::ZERO, Vec3::ZERO);
            assert!(
                matches!(result, Err(SimError::InvalidBody { .. })),
                "mass {mass} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_empty_identifier() {
        assert!(Body::new("", 1.0, Vec3::ZERO, Vec3::ZERO).is_err());
    }

    #[test]
    fn test_material_validation() {
        assert!(body("a").with_radius(0.0).is_err());
        assert!(body("a").with_restitution(1.5).is_err());
        assert!(body("a").with_friction(-0.1).is_err());

        let b = body("a")
            .with_radius(0.25)
            .and_then(|b| b.with_restitution(1.0))
            .and_then(|b| b.with_friction(0.3))
            .unwrap();
        assert_eq!(b.radius(), 0.25);
        assert_eq!(b.restitution(), 1.0);
        assert_eq!(b.friction(), 0.3);
    }

    #[test]
    fn test_hypothetical_evaluation_leaves_body_alone() {
        let b = body("a").with_force(Force::spring(Vec3::ZERO, 4.0, 0.0));
        let before = b.state;

        let acc = b.acceleration(&BodyState::at_rest(Vec3::new(1.0, 0.0, 0.0)));

        assert_eq!(acc, Vec3::new(-4.0, 0.0, 0.0));
        assert_eq!(b.state, before);
        assert_eq!(b.net_force(), Vec3::ZERO);
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let mut registry = BodyRegistry::new();
        registry.add(body("a")).unwrap();
        assert!(matches!(
            registry.add(body("a")),
            Err(SimError::DuplicateBody(id)) if id == "a"
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = BodyRegistry::new();
        registry.add(body("a")).unwrap();

        assert!(registry.get("a").is_ok());
        assert!(matches!(registry.get("b"), Err(SimError::UnknownBody(_))));
        assert!(registry.find("b").is_none());
        assert!(registry.find_mut("b").is_none());

        registry.get_mut("a").unwrap().state.vel = Vec3::X;
        assert_eq!(registry.get("a").unwrap().vel(), Vec3::X);
        assert!(matches!(
            registry.get_mut("b"),
            Err(SimError::UnknownBody(id)) if id == "b"
        ));
    }

    #[test]
    fn test_default_materials() {
        let b = body("a");
        assert_eq!(b.radius(), 1.0);
        assert_eq!(b.restitution(), 0.5);
        assert_eq!(b.friction(), 0.0);
    }

    #[test]
    fn test_registry_keeps_insertion_order_across_removal() {
        let mut registry = BodyRegistry::new();
        for id in ["c", "a", "b"] {
            registry.add(body(id)).unwrap();
        }
        assert!(registry.remove("a").is_some());
        assert!(registry.remove("a").is_none());

        let ids: Vec<&str> = registry.iter().map(Body::id).collect();
        assert_eq!(ids, ["c", "b"]);
        assert_eq!(registry.get("b").unwrap().id(), "b");
    }

    #[test]
    fn test_pair_mut() {
        let mut registry = BodyRegistry::new();
        registry.add(body("a")).unwrap();
        registry.add(body("b")).unwrap();

        let (b, a) = registry.pair_mut("b", "a").unwrap();
        assert_eq!(a.id(), "a");
        assert_eq!(b.id(), "b");
        assert!(registry.pair_mut("a", "a").is_none());
        assert!(registry.pair_mut("a", "z").is_none());
    }
}
