//! # Tile Rasterization
//!
//! Turns a region tree and its connection plan into a [`TileGrid`], and hosts
//! the wall-topping pass every generator finishes with.

use crate::generation::{ConnectionPlan, EmptyRegionConnection, RegionTree};
use crate::utils::{walk, walk_through, Axis};
use crate::{DelveResult, Position, TileGrid, TileType};
use log::warn;

/// A rasterized layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rasterized {
    pub grid: TileGrid,
    /// Empty regions whose stitching was abandoned because a neighbour had no
    /// connection to them
    pub abandoned_stitches: usize,
}

/// Draws rooms, corridors and empty-region stitching onto a fresh grid.
#[derive(Debug, Clone, Copy)]
pub struct TileGenerator {
    pub width: u32,
    pub height: u32,
}

impl TileGenerator {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn rasterize(&self, tree: &RegionTree, plan: &ConnectionPlan) -> DelveResult<Rasterized> {
        let mut grid = TileGrid::new(self.width, self.height);

        for room in tree.rooms() {
            for pos in room.positions() {
                grid.set(pos, TileType::Floor)?;
            }
        }

        for connection in plan.connections() {
            carve_hall(&mut grid, &connection.corridor())?;
        }

        let mut abandoned_stitches = 0;
        for route in &plan.empty_regions {
            match stitch_path(route, plan) {
                Some(cells) => carve_hall(&mut grid, &cells)?,
                None => abandoned_stitches += 1,
            }
        }

        apply_wall_tops(&mut grid)?;
        Ok(Rasterized {
            grid,
            abandoned_stitches,
        })
    }
}

/// Marks cells as corridor floor without overwriting room floor.
fn carve_hall(grid: &mut TileGrid, cells: &[Position]) -> DelveResult<()> {
    for &pos in cells {
        if grid.get(pos) != Some(TileType::Floor) {
            grid.set(pos, TileType::FloorHall)?;
        }
    }
    Ok(())
}

/// Cells joining each consecutive pair of neighbours inside an empty region.
///
/// Returns `None` when a claimed neighbour has no connection to the region.
fn stitch_path(route: &EmptyRegionConnection, plan: &ConnectionPlan) -> Option<Vec<Position>> {
    let mut cells = Vec::new();
    for pair in route.neighbors.windows(2) {
        let lookup = |neighbor| {
            let found = plan.find(route.region, neighbor).and_then(|c| {
                c.entry_in(route.region)
                    .map(|entry| (entry, c.direction))
            });
            if found.is_none() {
                warn!(
                    "Region {} lists neighbour {} but no connection joins them; abandoning its stitching",
                    route.region, neighbor
                );
            }
            found
        };
        let (from, from_axis) = lookup(pair[0])?;
        let (to, to_axis) = lookup(pair[1])?;

        if from_axis != to_axis {
            cells.extend(walk(from, to, from_axis));
            continue;
        }

        // Both enter along the same axis: meet halfway, cross, carry on
        let waypoints = match from_axis {
            Axis::Horizontal => {
                let mid = (from.x + to.x) / 2;
                [from, Position::new(mid, from.y), Position::new(mid, to.y), to]
            }
            Axis::Vertical => {
                let mid = (from.y + to.y) / 2;
                [from, Position::new(from.x, mid), Position::new(to.x, mid), to]
            }
        };
        cells.extend(walk_through(&waypoints, from_axis));
    }
    Some(cells)
}

/// Gives every walkable cell a wall above it.
///
/// Scans top to bottom. A walkable cell with `Empty` directly above gets a
/// wall face there (`Wall` over room floor, `WallHall` over corridor floor)
/// topped by a `WallTop`. When the cell two rows up is not empty the gap is a
/// single row, which becomes a `WallTop` alone.
pub fn apply_wall_tops(grid: &mut TileGrid) -> DelveResult<()> {
    for y in 1..grid.height as i32 {
        for x in 0..grid.width as i32 {
            let pos = Position::new(x, y);
            let Some(tile) = grid.get(pos).filter(|t| t.is_walkable()) else {
                continue;
            };
            let above = Position::new(x, y - 1);
            if !grid.is_empty(above) {
                continue;
            }

            let two_above = Position::new(x, y - 2);
            if grid.is_empty(two_above) {
                let face = if tile == TileType::FloorHall {
                    TileType::WallHall
                } else {
                    TileType::Wall
                };
                grid.set(above, face)?;
                grid.set(two_above, TileType::WallTop)?;
            } else {
                grid.set(above, TileType::WallTop)?;
            }
        }
    }
    Ok(())
}
