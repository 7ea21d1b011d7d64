//! Reine Geometrie-Bausteine: Trajektorien und Schnittpunkte.
//!
//! Layer-neutral, kennt weder Registry noch Host-Netzwerk.

pub mod intersect;
pub mod trajectory;

pub use intersect::{chord_curve_intersection_xz, ChordHit};
pub use trajectory::{length_xz, turn_xz, BezierTrajectory, StraightTrajectory};
