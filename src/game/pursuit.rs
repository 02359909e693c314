//! # Pursuit
//!
//! Turn-by-turn chasing for runtime unit AI. Each turn the unit asks for one
//! step toward its target across the level's current passable cells; the
//! path is recomputed every turn because units and objects move.

use crate::utils::{Pathfinder, StepCost};
use crate::{Direction, Level, Position, TileType};
use rand::Rng;
use std::collections::HashSet;

/// What a pursuing unit should do this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PursuitStep {
    /// Step onto this cell
    Move(Position),
    /// Already on or orthogonally next to the target
    InReach,
    /// The target cannot be reached; fall back to another behaviour
    NoPath,
}

/// Chases a target with the A* pathfinder.
///
/// # Examples
///
/// ```
/// use delve::{Position, Pursuit, PursuitStep};
/// use rand::{rngs::StdRng, SeedableRng};
/// use std::collections::HashSet;
///
/// let passable: HashSet<Position> = (0..6).map(|x| Position::new(x, 3)).collect();
/// let mut rng = StdRng::seed_from_u64(1);
/// let step = Pursuit::uniform().next_step(
///     Position::new(0, 3),
///     Position::new(5, 3),
///     &passable,
///     &mut rng,
/// );
/// assert_eq!(step, PursuitStep::Move(Position::new(1, 3)));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Pursuit<C = StepCost> {
    pathfinder: Pathfinder<C>,
}

impl Pursuit<StepCost> {
    /// Pursuit where every step costs the same.
    pub fn uniform() -> Self {
        Self {
            pathfinder: Pathfinder::uniform(),
        }
    }
}

impl Default for Pursuit<StepCost> {
    fn default() -> Self {
        Self::uniform()
    }
}

impl<C> Pursuit<C>
where
    C: Fn(Position, Position) -> u32,
{
    /// Pursuit weighing each step with `cost`. Costs must be at least 1.
    pub fn with_cost(cost: C) -> Self {
        Self {
            pathfinder: Pathfinder::new(cost),
        }
    }

    /// The next step from `from` toward `target`.
    ///
    /// `target` is usually occupied by the unit being chased, so it need not
    /// be in `passable`.
    pub fn next_step<R: Rng + ?Sized>(
        &self,
        from: Position,
        target: Position,
        passable: &HashSet<Position>,
        rng: &mut R,
    ) -> PursuitStep {
        if from.manhattan_distance(target) <= 1 {
            return PursuitStep::InReach;
        }

        match self.pathfinder.find_path(from, target, passable, rng).get(1) {
            Some(&next) => PursuitStep::Move(next),
            None => PursuitStep::NoPath,
        }
    }

    /// Like [`Pursuit::next_step`], treating `occupied` cells of `level` as blocked.
    pub fn next_step_in<R: Rng + ?Sized>(
        &self,
        level: &Level,
        from: Position,
        target: Position,
        occupied: &HashSet<Position>,
        rng: &mut R,
    ) -> PursuitStep {
        self.next_step(from, target, &level.passable_cells(occupied), rng)
    }
}

/// Direction of a single step, if `to` is adjacent to `from`.
pub fn step_direction(from: Position, to: Position) -> Option<Direction> {
    Direction::from_delta(to - from)
}

/// A terrain cost that keeps units in rooms: corridor floor costs `hall_cost`,
/// anything else walkable costs 1.
pub fn terrain_cost(level: &Level, hall_cost: u32) -> impl Fn(Position, Position) -> u32 + '_ {
    move |_from, to| match level.grid.get(to) {
        Some(TileType::FloorHall) => hall_cost.max(1),
        _ => 1,
    }
}
