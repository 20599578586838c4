//! Exhaustive sphere–sphere overlap detection.
//!
//! Every unordered pair is tested; there is no broad phase.

use crate::body::Body;
use crate::types::Vec3;

/// Contact between two overlapping spheres, valid for the step that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Collision {
    pub body_a: String,
    pub body_b: String,
    /// Point on A's surface along the normal
    pub point: Vec3,
    /// Unit normal pointing from A to B
    pub normal: Vec3,
    pub penetration: f64,
    /// `vel_b - vel_a` at detection time
    pub relative_velocity: Vec3,
}

/// Collision detector for sphere bodies.
pub struct CollisionDetector;

impl CollisionDetector {
    /// Test one pair. Touching spheres (`distance == rA + rB`) do not collide.
    pub fn detect_pair(a: &Body, b: &Body) -> Option<Collision> {
        let displacement = b.pos() - a.pos();
        let distance = displacement.magnitude();
        let combined_radius = a.radius() + b.radius();

        if distance >= combined_radius {
            return None;
        }

        let normal = if distance > 0.0 {
            displacement / distance
        } else {
            // Coincident centres have no direction; pick +X
            Vec3::X
        };

        Some(Collision {
            body_a: a.id().to_string(),
            body_b: b.id().to_string(),
            point: a.pos() + normal * a.radius(),
            normal,
            penetration: combined_radius - distance,
            relative_velocity: b.vel() - a.vel(),
        })
    }

    /// All overlapping pairs, ordered by (i, j) with i < j in slice order.
    pub fn detect_all(bodies: &[Body]) -> Vec<Collision> {
        let mut collisions = Vec::new();

        for (i, a) in bodies.iter().enumerate() {
            for b in &bodies[i + 1..] {
                if let Some(collision) = Self::detect_pair(a, b) {
                    collisions.push(collision);
                }
            }
        }

        collisions
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sphere(id: &str, x: f64, radius: f64) -> Body {
        Body::new(id, 1.0, Vec3::new(x, 0.0, 0.0), Vec3::ZERO)
            .and_then(|b| b.with_radius(radius))
            .unwrap()
    }

    #[test]
    fn test_separated_spheres_do_not_collide() {
        let a = sphere("a", 0.0, 0.5);
        let b = sphere("b", 2.0, 0.5);
        assert!(CollisionDetector::detect_pair(&a, &b).is_none());
    }

    #[test]
    fn test_touching_spheres_do_not_collide() {
        let a = sphere("a", 0.0, 0.5);
        let b = sphere("b", 1.0, 0.5);
        assert!(CollisionDetector::detect_pair(&a, &b).is_none());
    }

    #[test]
    fn test_overlap_geometry() {
        let mut a = sphere("a", 0.0, 0.5);
        let mut b = sphere("b", 0.6, 0.5);
        a.state.vel = Vec3::new(1.0, 0.0, 0.0);
        b.state.vel = Vec3::new(-1.0, 0.0, 0.0);

        let c = CollisionDetector::detect_pair(&a, &b)
            .expect("spheres overlap");

        assert_eq!(c.body_a, "a");
        assert_eq!(c.body_b, "b");
        assert_eq!(c.normal, Vec3::X);
        assert_relative_eq!(c.penetration, 0.4, epsilon = 1e-12);
        assert_relative_eq!(c.point.x, 0.5, epsilon = 1e-12);
        assert_eq!(c.relative_velocity, Vec3::new(-2.0, 0.0, 0.0));
    }

    #[test]
    fn test_coincident_bodies_use_default_normal() {
        let a = sphere("a", 3.0, 0.5);
        let b = sphere("b", 3.0, 0.5);

        let c = CollisionDetector::detect_pair(&a, &b).unwrap();
        assert_eq!(c.normal, Vec3::X);
        assert_relative_eq!(c.penetration, 1.0);
    }

    #[test]
    fn test_detect_all_pairs_in_order() {
        let bodies = vec![
            sphere("a", 0.0, 1.0),
            sphere("b", 1.0, 1.0),
            sphere("c", 2.0, 1.0),
            sphere("far", 100.0, 1.0),
        ];

        let pairs: Vec<(String, String)> = CollisionDetector::detect_all(&bodies)
            .into_iter()
            .map(|c| (c.body_a, c.body_b))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "b".to_string()),
                ("b".to_string(), "c".to_string()),
            ]
        );
    }
}
