//! Core value types for the simulation.
//!
//! Units are whatever the caller feeds in; the defaults assume SI:
//! - Position: meters (m)
//! - Velocity: meters per second (m/s)
//! - Mass: kilograms (kg)
//! - Force: Newtons (N)

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::error::{Result, SimError};

// =============================================================================
// Vec3 - 3D Vector
// =============================================================================

/// A 3D vector used for positions, velocities and forces.
///
/// Plain value type: every operation returns a new vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const X: Vec3 = Vec3 {
        x: 1.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Build a vector from a 2- or 3-component slice. A missing z is 0.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        match *values {
            [x, y] => Ok(Self::new(x, y, 0.0)),
            [x, y, z] => Ok(Self::new(x, y, z)),
            _ => Err(SimError::InvalidVector(values.len())),
        }
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Squared magnitude (avoids sqrt for comparisons)
    pub fn magnitude_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Magnitude (length) of the vector
    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    /// Returns a unit vector in the same direction, or zero if magnitude is zero
    pub fn normalized(&self) -> Self {
        let mag = self.magnitude();
        if mag == 0.0 {
            Self::ZERO
        } else {
            *self / mag
        }
    }

    /// Dot product
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product
    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Division that reports a zero divisor instead of panicking.
    pub fn checked_div(&self, scalar: f64) -> Result<Self> {
        if scalar == 0.0 {
            return Err(SimError::DivideByZero);
        }
        Ok(Self {
            x: self.x / scalar,
            y: self.y / scalar,
            z: self.z / scalar,
        })
    }
}

// Operator overloads for Vec3
impl Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
        self.z -= other.z;
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl MulAssign<f64> for Vec3 {
    fn mul_assign(&mut self, scalar: f64) {
        self.x *= scalar;
        self.y *= scalar;
        self.z *= scalar;
    }
}

/// # Panics
///
/// Panics when `scalar` is exactly zero, like integer division.
/// Use [`Vec3::checked_div`] when the divisor is not known to be non-zero.
impl Div<f64> for Vec3 {
    type Output = Self;
    fn div(self, scalar: f64) -> Self {
        assert!(scalar != 0.0, "cannot divide a vector by zero");
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
            z: self.z / scalar,
        }
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

// =============================================================================
// Body State
// =============================================================================

/// Kinematic state of a point mass: the pair every integrator advances.
///
/// Forces are evaluated against a `BodyState` rather than against the body
/// itself, so integrators can ask for accelerations at hypothetical states
/// without touching the body.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BodyState {
    pub pos: Vec3,
    pub vel: Vec3,
}

impl BodyState {
    pub fn new(pos: Vec3, vel: Vec3) -> Self {
        Self { pos, vel }
    }

    /// Point mass at rest at a given position
    pub fn at_rest(pos: Vec3) -> Self {
        Self {
            pos,
            vel: Vec3::ZERO,
        }
    }

    /// Translational kinetic energy for the given mass
    pub fn kinetic_energy(&self, mass: f64) -> f64 {
        0.5 * mass * self.vel.magnitude_squared()
    }
}

// =============================================================================
// Physical Constants
// =============================================================================

/// Physical constants and defaults used in the simulation.
pub mod constants {
    use super::Vec3;

    /// Standard gravitational acceleration (m/s²)
    pub const STANDARD_GRAVITY: f64 = 9.80665;

    /// Default uniform gravity field, pointing down Y
    pub const DEFAULT_GRAVITY: Vec3 = Vec3::new(0.0, -STANDARD_GRAVITY, 0.0);

    /// Air density at sea level, 15°C (kg/m³)
    pub const AIR_DENSITY: f64 = 1.225;

    /// Below this separation two bodies have no usable direction
    pub const COINCIDENT_EPSILON: f64 = 1e-10;

    /// Distance constraints within this of their target are left alone
    pub const DISTANCE_TOLERANCE: f64 = 1e-6;
}

// =============================================================================
// Tests
// =============================================================================
