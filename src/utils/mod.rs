//! # Utilities Module
//!
//! Grid geometry and the A* pathfinder.

pub mod math;
pub mod pathfinding;

pub use math::*;
pub use pathfinding::*;
