//! Impulse-based contact resolution.
//!
//! For each approaching contact:
//! 1. Normal component of relative velocity `vn = (vB - vA) · n`
//! 2. Restitution is the smaller of the two bodies' coefficients
//! 3. Impulse `j = -(1 + e) * vn / (1/mA + 1/mB)`, A loses `j*n`, B gains it
//! 4. Baumgarte-style position correction along `n`, skipping the first
//!    `slop` of penetration to avoid jitter on resting contacts
//!
//! Separating contacts (`vn > 0`) are left untouched, including their overlap.

use crate::body::Body;
use crate::collision::Collision;

/// Penetration below this is tolerated
pub const DEFAULT_SLOP: f64 = 0.01;

/// Fraction of the remaining penetration removed per contact
pub const DEFAULT_CORRECTION_PERCENT: f64 = 0.4;

/// Contact resolver parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResolver {
    pub slop: f64,
    pub correction_percent: f64,
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self {
            slop: DEFAULT_SLOP,
            correction_percent: DEFAULT_CORRECTION_PERCENT,
        }
    }
}

impl CollisionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve one contact in place.
    ///
    /// Returns `false` when the bodies were already separating and nothing changed.
    pub fn resolve(&self, collision: &Collision, a: &mut Body, b: &mut Body) -> bool {
        let normal = collision.normal;
        let vn = collision.relative_velocity.dot(&normal);

        if vn > 0.0 {
            return false;
        }

        let restitution = a.restitution().min(b.restitution());
        let inv_mass_sum = 1.0 / a.mass() + 1.0 / b.mass();

        let impulse = normal * (-(1.0 + restitution) * vn / inv_mass_sum);
        a.state.vel -= impulse / a.mass();
        b.state.vel += impulse / b.mass();

        self.correct_positions(collision, a, b, inv_mass_sum);
        true
    }

    fn correct_positions(
        &self,
        collision: &Collision,
        a: &mut Body,
        b: &mut Body,
        inv_mass_sum: f64,
    ) {
        let depth = (collision.penetration - self.slop).max(0.0);
        let correction = collision.normal * (depth / inv_mass_sum * self.correction_percent);

        a.state.pos -= correction / a.mass();
        b.state.pos += correction / b.mass();
    }
}

// =============================================================================
// Tests
// =============================================================================
