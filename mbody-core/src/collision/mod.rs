//! Sphere–sphere collision detection and resolution.
//!
//! This module handles:
//! - **Detection**: exhaustive pass over every unordered body pair, producing
//!   a [`Collision`] for each overlapping pair
//! - **Resolution**: impulse exchange along the contact normal followed by a
//!   positional correction that pushes the spheres apart
//!
//! Detection finishes before any resolution starts. Contacts are resolved one
//! at a time in detection order; a body touching two others is resolved
//! against each in turn rather than in a joint solve.
//!
//! ```text
//!      A            B
//!    (  ●  ) ·  (  ●  )      normal points A → B
//!        └─┬─┘
//!     penetration = rA + rB - |B - A|
//! ```

pub mod detection;
pub mod resolution;

pub use detection::*;
pub use resolution::*;
