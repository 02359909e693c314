//! # Pathfinding Algorithms
//!
//! A* search over an explicit allow-list of passable cells, shared by the path
//! generator (carving corridors) and by runtime unit AI (chasing a target).
//!
//! The frontier is scanned linearly rather than kept in a priority queue; at
//! dungeon-tile scale that is cheap. Among frontier nodes tied on the lowest
//! `f` score one is picked uniformly at random with the caller's RNG, so two
//! calls with different RNG states may return different (equally short) paths.

use crate::Position;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// Per-step cost function: `(from, to) -> cost`. Costs must be at least 1 for
/// the Manhattan heuristic to stay admissible.
pub type StepCost = fn(Position, Position) -> u32;

/// Every step costs 1. Used by the generators.
pub fn uniform_cost(_from: Position, _to: Position) -> u32 {
    1
}

/// A node of the search tree. Parent links index into the node arena.
#[derive(Debug, Clone)]
struct Node {
    position: Position,
    g: u32,
    h: u32,
    parent: Option<usize>,
}

impl Node {
    fn f(&self) -> u32 {
        self.g.saturating_add(self.h)
    }
}

/// A* pathfinder with a pluggable step cost.
///
/// # Examples
///
/// ```
/// use delve::{Pathfinder, Position};
/// use rand::{rngs::StdRng, SeedableRng};
/// use std::collections::HashSet;
///
/// let passable: HashSet<Position> = (0..5)
///     .flat_map(|x| (0..5).map(move |y| Position::new(x, y)))
///     .collect();
/// let mut rng = StdRng::seed_from_u64(7);
///
/// let path = Pathfinder::uniform().find_path(
///     Position::new(0, 0),
///     Position::new(3, 2),
///     &passable,
///     &mut rng,
/// );
/// assert_eq!(path.len(), 6);
/// assert_eq!(path.first(), Some(&Position::new(0, 0)));
/// assert_eq!(path.last(), Some(&Position::new(3, 2)));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Pathfinder<C = StepCost> {
    cost: C,
}

impl Pathfinder<StepCost> {
    /// A pathfinder where every step costs 1.
    pub fn uniform() -> Self {
        Self { cost: uniform_cost }
    }
}

impl Default for Pathfinder<StepCost> {
    fn default() -> Self {
        Self::uniform()
    }
}

impl<C> Pathfinder<C>
where
    C: Fn(Position, Position) -> u32,
{
    /// A pathfinder using `cost` for each step.
    pub fn new(cost: C) -> Self {
        Self { cost }
    }

    /// Finds a shortest 4-directional path from `start` to `goal`.
    ///
    /// Every intermediate cell must be in `passable`. The start cell is where
    /// the searcher already stands and the goal is always enterable, so neither
    /// needs to be listed. Returns the cells from `start` to `goal` inclusive,
    /// `[start]` when they coincide, and an empty vector when no path exists.
    pub fn find_path<R: Rng + ?Sized>(
        &self,
        start: Position,
        goal: Position,
        passable: &HashSet<Position>,
        rng: &mut R,
    ) -> Vec<Position> {
        if start == goal {
            return vec![start];
        }

        let mut nodes = vec![Node {
            position: start,
            g: 0,
            h: start.manhattan_distance(goal),
            parent: None,
        }];
        let mut index: HashMap<Position, usize> = HashMap::from([(start, 0)]);
        let mut open: Vec<usize> = vec![0];
        let mut closed: HashSet<Position> = HashSet::new();
        let mut ties: Vec<usize> = Vec::new();

        while !open.is_empty() {
            let best = open
                .iter()
                .map(|&i| nodes[i].f())
                .min()
                .unwrap_or(u32::MAX);
            ties.clear();
            ties.extend((0..open.len()).filter(|&slot| nodes[open[slot]].f() == best));
            let Some(&slot) = ties.choose(rng) else {
                break;
            };
            let current = open.swap_remove(slot);
            let position = nodes[current].position;

            if position == goal {
                return Self::reconstruct(&nodes, current);
            }
            closed.insert(position);

            for neighbor in position.cardinal_adjacent_positions() {
                if closed.contains(&neighbor) || (neighbor != goal && !passable.contains(&neighbor))
                {
                    continue;
                }

                let g = nodes[current]
                    .g
                    .saturating_add((self.cost)(position, neighbor));
                match index.get(&neighbor) {
                    Some(&existing) => {
                        if g < nodes[existing].g {
                            nodes[existing].g = g;
                            nodes[existing].parent = Some(current);
                        }
                    }
                    None => {
                        nodes.push(Node {
                            position: neighbor,
                            g,
                            h: neighbor.manhattan_distance(goal),
                            parent: Some(current),
                        });
                        let id = nodes.len() - 1;
                        index.insert(neighbor, id);
                        open.push(id);
                    }
                }
            }
        }

        Vec::new()
    }

    fn reconstruct(nodes: &[Node], goal: usize) -> Vec<Position> {
        let mut path = Vec::new();
        let mut current = Some(goal);
        while let Some(i) = current {
            path.push(nodes[i].position);
            current = nodes[i].parent;
        }
        path.reverse();
        path
    }
}

/// Total cost of walking `path` under `cost`, excluding the starting cell.
pub fn path_cost(path: &[Position], cost: impl Fn(Position, Position) -> u32) -> u32 {
    path.windows(2).map(|step| cost(step[0], step[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn open_grid(width: i32, height: i32) -> HashSet<Position> {
        (0..width)
            .flat_map(|x| (0..height).map(move |y| Position::new(x, y)))
            .collect()
    }

    fn assert_contiguous(path: &[Position]) {
        for step in path.windows(2) {
            assert_eq!(step[0].manhattan_distance(step[1]), 1, "gap in {:?}", path);
        }
    }

    #[test]
    fn test_path_to_self() {
        let mut rng = StdRng::seed_from_u64(1);
        let path = Pathfinder::uniform().find_path(
            Position::new(2, 2),
            Position::new(2, 2),
            &HashSet::new(),
            &mut rng,
        );
        assert_eq!(path, vec![Position::new(2, 2)]);
    }

    #[test]
    fn test_open_grid_path_is_manhattan() {
        let passable = open_grid(12, 9);
        let mut rng = StdRng::seed_from_u64(2);
        let start = Position::new(1, 7);
        let goal = Position::new(10, 0);

        let path = Pathfinder::uniform().find_path(start, goal, &passable, &mut rng);
        assert_eq!(path.len(), start.manhattan_distance(goal) as usize + 1);
        assert_eq!(path[0], start);
        assert_eq!(*path.last().unwrap(), goal);
        assert_contiguous(&path);
    }

    #[test]
    fn test_routes_around_wall() {
        // Wall at x = 3 with a single gap at y = 4
        let passable: HashSet<_> = open_grid(7, 5)
            .into_iter()
            .filter(|p| p.x != 3 || p.y == 4)
            .collect();
        let mut rng = StdRng::seed_from_u64(3);

        let path = Pathfinder::uniform().find_path(
            Position::new(0, 0),
            Position::new(6, 0),
            &passable,
            &mut rng,
        );
        assert!(path.contains(&Position::new(3, 4)));
        assert_eq!(path.len(), 6 + 8 + 1);
        assert_contiguous(&path);
    }

    #[test]
    fn test_unreachable_goal_returns_empty() {
        let passable: HashSet<_> = open_grid(7, 5).into_iter().filter(|p| p.x != 3).collect();
        let mut rng = StdRng::seed_from_u64(4);
        let path = Pathfinder::uniform().find_path(
            Position::new(0, 0),
            Position::new(6, 4),
            &passable,
            &mut rng,
        );
        assert!(path.is_empty());
    }

    #[test]
    fn test_goal_outside_allow_list_is_enterable() {
        let goal = Position::new(4, 0);
        let passable: HashSet<_> = open_grid(5, 1).into_iter().filter(|p| *p != goal).collect();
        let mut rng = StdRng::seed_from_u64(5);
        let path =
            Pathfinder::uniform().find_path(Position::new(0, 0), goal, &passable, &mut rng);
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn test_weighted_cost_avoids_expensive_cells() {
        // A straight run through x = 2 is cheap in steps but expensive in cost
        let passable = open_grid(5, 3);
        let swamp = |_: Position, to: Position| if to.y == 1 && to.x == 2 { 20 } else { 1 };
        let mut rng = StdRng::seed_from_u64(6);

        let path = Pathfinder::new(swamp).find_path(
            Position::new(0, 1),
            Position::new(4, 1),
            &passable,
            &mut rng,
        );
        assert!(!path.contains(&Position::new(2, 1)));
        assert_eq!(path_cost(&path, swamp), 6);
    }

    #[test]
    fn test_same_seed_same_path() {
        let passable = open_grid(10, 10);
        let start = Position::new(0, 0);
        let goal = Position::new(9, 9);

        let first = Pathfinder::uniform().find_path(
            start,
            goal,
            &passable,
            &mut StdRng::seed_from_u64(99),
        );
        let second = Pathfinder::uniform().find_path(
            start,
            goal,
            &passable,
            &mut StdRng::seed_from_u64(99),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_ties_break_differently_across_seeds() {
        let passable = open_grid(10, 10);
        let start = Position::new(0, 0);
        let goal = Position::new(9, 9);

        let paths: HashSet<Vec<Position>> = (0..20)
            .map(|seed| {
                let path = Pathfinder::uniform().find_path(
                    start,
                    goal,
                    &passable,
                    &mut StdRng::seed_from_u64(seed),
                );
                assert_eq!(path.len(), 19);
                assert_contiguous(&path);
                path
            })
            .collect();
        assert!(paths.len() > 1, "every seed took the same route");
    }
}
