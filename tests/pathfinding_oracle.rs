//! Cross-checks the A* pathfinder against the `pathfinding` crate's BFS.

use delve::utils::path_cost;
use delve::{Pathfinder, Position};
use pathfinding::prelude::{bfs, dijkstra};
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use std::collections::HashSet;

const SIZE: i32 = 10;

fn passable_from(walls: &[bool]) -> HashSet<Position> {
    (0..SIZE)
        .flat_map(|y| (0..SIZE).map(move |x| Position::new(x, y)))
        .filter(|pos| !walls[(pos.y * SIZE + pos.x) as usize])
        .collect()
}

fn successors(pos: &Position, goal: Position, passable: &HashSet<Position>) -> Vec<Position> {
    pos.cardinal_adjacent_positions()
        .into_iter()
        .filter(|next| *next == goal || passable.contains(next))
        .collect()
}

fn assert_well_formed(path: &[Position], goal: Position, passable: &HashSet<Position>) {
    for step in path.windows(2) {
        assert_eq!(step[0].manhattan_distance(step[1]), 1);
    }
    if path.len() > 2 {
        for cell in &path[1..path.len() - 1] {
            assert!(passable.contains(cell), "{:?} is not passable", cell);
        }
    }
    assert_eq!(path.last(), Some(&goal));
}

proptest! {
    #[test]
    fn shortest_path_matches_bfs(
        walls in proptest::collection::vec(proptest::bool::weighted(0.3), (SIZE * SIZE) as usize),
        start in (0..SIZE, 0..SIZE),
        goal in (0..SIZE, 0..SIZE),
        seed in any::<u64>(),
    ) {
        let passable = passable_from(&walls);
        let start = Position::new(start.0, start.1);
        let goal = Position::new(goal.0, goal.1);
        let mut rng = StdRng::seed_from_u64(seed);

        let ours = Pathfinder::uniform().find_path(start, goal, &passable, &mut rng);
        let oracle = bfs(&start, |p| successors(p, goal, &passable), |p| *p == goal);

        match oracle {
            Some(expected) => {
                prop_assert_eq!(ours.len(), expected.len());
                prop_assert_eq!(ours.first(), Some(&start));
                assert_well_formed(&ours, goal, &passable);
            }
            None => prop_assert!(ours.is_empty()),
        }
    }

    #[test]
    fn weighted_path_matches_dijkstra(
        weights in proptest::collection::vec(1u32..6, (SIZE * SIZE) as usize),
        goal in (0..SIZE, 0..SIZE),
        seed in any::<u64>(),
    ) {
        let passable = passable_from(&[false; (SIZE * SIZE) as usize]);
        let start = Position::new(0, 0);
        let goal = Position::new(goal.0, goal.1);
        let cost = |_: Position, to: Position| weights[(to.y * SIZE + to.x) as usize];
        let mut rng = StdRng::seed_from_u64(seed);

        let ours = Pathfinder::new(cost).find_path(start, goal, &passable, &mut rng);
        let (_, expected) = dijkstra(
            &start,
            |p| {
                successors(p, goal, &passable)
                    .into_iter()
                    .map(|next| (next, cost(*p, next)))
                    .collect::<Vec<_>>()
            },
            |p| *p == goal,
        )
        .expect("open grid is connected");

        prop_assert_eq!(path_cost(&ours, cost), expected);
    }
}

#[test]
fn test_open_grid_length_is_manhattan() {
    let passable = passable_from(&[false; (SIZE * SIZE) as usize]);
    let mut rng = StdRng::seed_from_u64(0);
    for (a, b) in [((0, 0), (9, 9)), ((3, 7), (8, 1)), ((5, 5), (5, 0))] {
        let (a, b) = (Position::new(a.0, a.1), Position::new(b.0, b.1));
        let path = Pathfinder::uniform().find_path(a, b, &passable, &mut rng);
        assert_eq!(path.len() as u32, a.manhattan_distance(b) + 1);
    }
}

#[test]
fn test_walled_off_goal_is_unreachable() {
    let goal = Position::new(5, 5);
    let passable: HashSet<_> = passable_from(&[false; (SIZE * SIZE) as usize])
        .into_iter()
        .filter(|p| p.manhattan_distance(goal) > 1)
        .collect();
    let mut rng = StdRng::seed_from_u64(1);
    let path = Pathfinder::uniform().find_path(Position::new(0, 0), goal, &passable, &mut rng);
    assert!(path.is_empty());
}
