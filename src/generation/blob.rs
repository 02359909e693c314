//! # Blob Caves
//!
//! Grows a single organic cave outward from one seed cell. Each step adds a
//! floor cell next to the existing cave, favouring cells with few floor
//! neighbours so the cave snakes instead of ballooning.

use crate::config::RESERVED_TOP_ROWS;
use crate::generation::{apply_wall_tops, utils, Generator};
use crate::{DelveError, DelveResult, Direction, GenerationConfig, Position, TileGrid, TileType};
use log::debug;
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, Rng};

/// Cave generator driven by a target fill rate.
#[derive(Debug, Clone, Copy)]
pub struct BlobMapGenerator {
    /// Share of the whole map that should become floor
    pub fill_rate: f64,
}

impl BlobMapGenerator {
    pub fn new(fill_rate: f64) -> Self {
        Self { fill_rate }
    }

    pub fn from_config(config: &GenerationConfig) -> Self {
        Self::new(config.fill_rate)
    }

    /// Floor cells the cave stops at for a `width × height` map.
    pub fn target_floor_count(&self, width: u32, height: u32) -> usize {
        (f64::from(width) * f64::from(height) * self.fill_rate).round() as usize
    }

    /// Grows a cave on a fresh `width × height` grid.
    ///
    /// Stops at the target floor count or when no legal cell remains, so the
    /// floor count never exceeds the target.
    pub fn grow(&self, width: u32, height: u32, rng: &mut StdRng) -> DelveResult<TileGrid> {
        if width < 3 || height < RESERVED_TOP_ROWS as u32 + 2 {
            return Err(DelveError::GenerationFailed(format!(
                "{}x{} has no interior to grow a cave in",
                width, height
            )));
        }
        let mut grid = TileGrid::new(width, height);
        let target = self.target_floor_count(width, height).max(1);

        let (w, h) = (width as i32, height as i32);
        let seed_x = rng.gen_range(band(w, 1, w - 2));
        let seed_y = rng.gen_range(band(h, RESERVED_TOP_ROWS, h - 2));
        grid.set(Position::new(seed_x, seed_y), TileType::Floor)?;

        let mut floors = 1;
        while floors < target {
            let mut candidates = legal_candidates(&grid);
            if candidates.is_empty() {
                break;
            }

            candidates.shuffle(rng);
            candidates.sort_by_key(|&pos| snake_score(&grid, pos));
            let n = candidates.len();
            let low = n * 3 / 10;
            let high = (n * 8 / 10).max(low + 1).min(n);
            let pick = candidates[rng.gen_range(low..high)];

            grid.set(pick, TileType::Floor)?;
            floors += 1;
        }

        debug!(
            "Blob grew {} of {} target floor cells on {}x{}",
            floors, target, width, height
        );
        apply_wall_tops(&mut grid)?;
        Ok(grid)
    }
}

/// The middle 25%-75% of `0..size`, clamped to `min..=max`.
fn band(size: i32, min: i32, max: i32) -> std::ops::RangeInclusive<i32> {
    let low = (size / 4).clamp(min, max);
    let high = (size * 3 / 4).clamp(low, max);
    low..=high
}

fn is_floor(grid: &TileGrid, pos: Position) -> bool {
    grid.get(pos) == Some(TileType::Floor)
}

/// Empty interior cells next to the cave that keep it well formed.
fn legal_candidates(grid: &TileGrid) -> Vec<Position> {
    let (w, h) = (grid.width as i32, grid.height as i32);
    let mut candidates = Vec::new();
    for y in RESERVED_TOP_ROWS..h - 1 {
        for x in 1..w - 1 {
            let pos = Position::new(x, y);
            if grid.is_empty(pos)
                && pos
                    .cardinal_adjacent_positions()
                    .iter()
                    .any(|&n| is_floor(grid, n))
                && !leaves_row_gap(grid, pos)
                && !touches_diagonally(grid, pos)
            {
                candidates.push(pos);
            }
        }
    }
    candidates
}

/// Floor two rows up or down with an empty cell between: the gap could only
/// hold a wall top.
fn leaves_row_gap(grid: &TileGrid, pos: Position) -> bool {
    [-1, 1].iter().any(|&dy| {
        grid.is_empty(Position::new(pos.x, pos.y + dy))
            && is_floor(grid, Position::new(pos.x, pos.y + 2 * dy))
    })
}

/// Floor on a diagonal with neither shared orthogonal cell being floor.
fn touches_diagonally(grid: &TileGrid, pos: Position) -> bool {
    Direction::diagonal().into_iter().any(|direction| {
        let delta = direction.to_delta();
        is_floor(grid, pos + delta)
            && !is_floor(grid, Position::new(pos.x + delta.x, pos.y))
            && !is_floor(grid, Position::new(pos.x, pos.y + delta.y))
    })
}

/// Floor cells in the 3×3 window around `pos`; lower is snakier.
fn snake_score(grid: &TileGrid, pos: Position) -> usize {
    let own = usize::from(is_floor(grid, pos));
    own + pos
        .adjacent_positions()
        .into_iter()
        .filter(|&n| is_floor(grid, n))
        .count()
}

impl Generator<TileGrid> for BlobMapGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DelveResult<TileGrid> {
        self.grow(config.width, config.height, rng)
    }

    fn validate(&self, grid: &TileGrid, _config: &GenerationConfig) -> DelveResult<()> {
        utils::validate_level(grid)
    }

    fn generator_type(&self) -> &'static str {
        "BlobMapGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn grow(seed: u64, width: u32, height: u32, fill_rate: f64) -> TileGrid {
        let mut rng = StdRng::seed_from_u64(seed);
        BlobMapGenerator::new(fill_rate)
            .grow(width, height, &mut rng)
            .unwrap()
    }

    #[test]
    fn test_floor_count_near_target() {
        let generator = BlobMapGenerator::new(0.4);
        let target = generator.target_floor_count(60, 40);
        assert_eq!(target, 960);
        for seed in 0..10 {
            let floors = grow(seed, 60, 40, 0.4).count(|t| t == TileType::Floor);
            assert!(floors <= target);
            assert!(floors as f64 >= target as f64 * 0.9, "seed {} grew {}", seed, floors);
        }
    }

    #[test]
    fn test_cave_is_one_piece() {
        let grid = grow(3, 40, 30, 0.35);
        let floors: HashSet<_> = grid.positions_where(TileType::is_walkable).into_iter().collect();
        let start = *floors.iter().next().unwrap();
        let mut seen = HashSet::from([start]);
        let mut stack = vec![start];
        while let Some(pos) = stack.pop() {
            for n in pos.cardinal_adjacent_positions() {
                if floors.contains(&n) && seen.insert(n) {
                    stack.push(n);
                }
            }
        }
        assert_eq!(seen.len(), floors.len());
    }

    #[test]
    fn test_cave_shape_rules() {
        for seed in 0..8 {
            let grid = grow(seed, 40, 30, 0.4);
            for pos in grid.positions_where(|t| t == TileType::Floor) {
                assert!(pos.x >= 1 && pos.x < 39);
                assert!(pos.y >= RESERVED_TOP_ROWS && pos.y < 29);

                let below = Position::new(pos.x, pos.y + 1);
                let two_below = Position::new(pos.x, pos.y + 2);
                assert!(
                    is_floor(&grid, below) || !is_floor(&grid, two_below),
                    "one-row gap under {:?}",
                    pos
                );
                for (dx, dy) in [(1, 1), (-1, 1)] {
                    if is_floor(&grid, Position::new(pos.x + dx, pos.y + dy)) {
                        assert!(
                            is_floor(&grid, Position::new(pos.x + dx, pos.y))
                                || is_floor(&grid, Position::new(pos.x, pos.y + dy)),
                            "diagonal-only contact at {:?}",
                            pos
                        );
                    }
                }
            }
            assert!(utils::validate_level(&grid).is_ok());
        }
    }

    #[test]
    fn test_tiny_map() {
        let grid = grow(1, 3, 4, 1.0);
        assert_eq!(grid.count(|t| t == TileType::Floor), 1);
        assert_eq!(grid.get(Position::new(1, 2)), Some(TileType::Floor));
        assert_eq!(grid.get(Position::new(1, 1)), Some(TileType::Wall));
        assert_eq!(grid.get(Position::new(1, 0)), Some(TileType::WallTop));
    }

    #[test]
    fn test_growth_is_deterministic() {
        assert_eq!(grow(21, 30, 20, 0.4), grow(21, 30, 20, 0.4));
    }

    #[test]
    fn test_snake_score_counts_window() {
        let mut grid = TileGrid::new(5, 5);
        for pos in [Position::new(1, 1), Position::new(2, 1), Position::new(3, 3)] {
            grid.set(pos, TileType::Floor).unwrap();
        }
        assert_eq!(snake_score(&grid, Position::new(2, 2)), 3);
        assert_eq!(snake_score(&grid, Position::new(0, 4)), 0);
    }

    #[test]
    fn test_target_floor_count_on_huge_dimensions() {
        let generator = BlobMapGenerator::new(0.5);
        assert_eq!(generator.target_floor_count(70_000, 70_000), 2_450_000_000);
        assert_eq!(generator.target_floor_count(u32::MAX, 0), 0);
    }
}
