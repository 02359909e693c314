//! # Path Maps
//!
//! Threads corridors through a handful of random points, each joined to the
//! one before it by an A* path across the map interior.

use crate::config::{MAX_POINT_RETRIES, RESERVED_TOP_ROWS};
use crate::generation::{apply_wall_tops, utils, Generator};
use crate::utils::Pathfinder;
use crate::{DelveError, DelveResult, GenerationConfig, Position, TileGrid, TileType};
use log::debug;
use rand::{rngs::StdRng, Rng};
use std::collections::HashSet;

/// Generator producing a chain of winding corridors.
#[derive(Debug, Clone, Copy)]
pub struct PathMapGenerator {
    /// Points the chain passes through
    pub num_points: u32,
}

impl PathMapGenerator {
    pub fn new(num_points: u32) -> Self {
        Self { num_points }
    }

    pub fn from_config(config: &GenerationConfig) -> Self {
        Self::new(config.path_points)
    }

    /// Carves the point chain on a fresh `width × height` grid.
    ///
    /// A point landing on existing floor, or one the previous point cannot
    /// reach, is redrawn; after [`MAX_POINT_RETRIES`] redraws the attempt fails.
    pub fn carve(&self, width: u32, height: u32, rng: &mut StdRng) -> DelveResult<TileGrid> {
        let mut grid = TileGrid::new(width, height);
        let interior = interior_cells(width, height);
        if interior.is_empty() {
            return Err(DelveError::GenerationFailed(format!(
                "{}x{} has no interior to carve",
                width, height
            )));
        }

        let pathfinder = Pathfinder::uniform();
        let (w, h) = (width as i32, height as i32);
        let mut previous: Option<Position> = None;

        for index in 0..self.num_points {
            let mut placed = false;
            for _ in 0..MAX_POINT_RETRIES {
                let point = Position::new(
                    rng.gen_range(1..w - 1),
                    rng.gen_range(RESERVED_TOP_ROWS..h - 1),
                );
                if !grid.is_empty(point) {
                    continue;
                }

                let cells = match previous {
                    Some(from) => pathfinder.find_path(from, point, &interior, rng),
                    None => vec![point],
                };
                if cells.is_empty() {
                    continue;
                }

                for cell in cells {
                    grid.set(cell, TileType::Floor)?;
                }
                previous = Some(point);
                placed = true;
                break;
            }

            if !placed {
                return Err(DelveError::GenerationFailed(format!(
                    "Could not place point {} of {} after {} tries",
                    index + 1,
                    self.num_points,
                    MAX_POINT_RETRIES
                )));
            }
        }

        debug!(
            "Path map joined {} points with {} floor cells",
            self.num_points,
            grid.count(|t| t == TileType::Floor)
        );
        apply_wall_tops(&mut grid)?;
        Ok(grid)
    }
}

/// Cells away from the map edge and below the reserved rows.
fn interior_cells(width: u32, height: u32) -> HashSet<Position> {
    let (w, h) = (width as i32, height as i32);
    (RESERVED_TOP_ROWS..h - 1)
        .flat_map(|y| (1..w - 1).map(move |x| Position::new(x, y)))
        .collect()
}

impl Generator<TileGrid> for PathMapGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DelveResult<TileGrid> {
        self.carve(config.width, config.height, rng)
    }

    fn validate(&self, grid: &TileGrid, _config: &GenerationConfig) -> DelveResult<()> {
        utils::validate_level(grid)
    }

    fn generator_type(&self) -> &'static str {
        "PathMapGenerator"
    }
}
