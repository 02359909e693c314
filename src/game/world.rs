//! # World Representation
//!
//! Tile types, the dense tile grid every generator writes into, and the
//! finished `Level` the harness hands to the rest of the game.

use crate::{DelveError, DelveResult, Position};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// The kind of a single map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileType {
    /// Room floor
    Floor,
    /// Corridor floor
    FloorHall,
    /// Wall face above room floor
    Wall,
    /// Wall face above corridor floor
    WallHall,
    /// Top of a wall, drawn above the wall face
    WallTop,
    /// Nothing at all; solid rock
    #[default]
    Empty,
    StairsDown,
    StairsUp,
}

impl TileType {
    /// Whether a unit can stand on this tile.
    pub fn is_walkable(self) -> bool {
        matches!(
            self,
            TileType::Floor | TileType::FloorHall | TileType::StairsDown | TileType::StairsUp
        )
    }

    /// Whether this is a room or corridor floor (stairs excluded).
    pub fn is_floor(self) -> bool {
        matches!(self, TileType::Floor | TileType::FloorHall)
    }

    /// Whether this is a wall face.
    pub fn is_wall_face(self) -> bool {
        matches!(self, TileType::Wall | TileType::WallHall)
    }

    /// Character used by the ASCII dump.
    pub fn glyph(self) -> char {
        match self {
            TileType::Floor => '.',
            TileType::FloorHall => ',',
            TileType::Wall => '#',
            TileType::WallHall => '=',
            TileType::WallTop => '^',
            TileType::Empty => ' ',
            TileType::StairsDown => '>',
            TileType::StairsUp => '<',
        }
    }
}

/// A dense `width × height` grid of tiles stored row by row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    pub width: u32,
    pub height: u32,
    tiles: Vec<TileType>,
}

impl TileGrid {
    /// Creates a grid filled with `TileType::Empty`.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Position, TileGrid, TileType};
    ///
    /// let grid = TileGrid::new(8, 6);
    /// assert_eq!(grid.get(Position::new(7, 5)), Some(TileType::Empty));
    /// assert_eq!(grid.get(Position::new(8, 0)), None);
    /// ```
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, TileType::Empty)
    }

    /// Creates a grid with every cell set to `tile`.
    pub fn filled(width: u32, height: u32, tile: TileType) -> Self {
        Self {
            width,
            height,
            tiles: vec![tile; width as usize * height as usize],
        }
    }

    /// Checks if a position lies inside the grid.
    pub fn is_valid_position(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.is_valid_position(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    /// Gets the tile at a position, or `None` outside the grid.
    pub fn get(&self, pos: Position) -> Option<TileType> {
        self.index(pos).map(|i| self.tiles[i])
    }

    /// Sets the tile at a position.
    pub fn set(&mut self, pos: Position, tile: TileType) -> DelveResult<()> {
        let index = self.index(pos).ok_or(DelveError::OutOfBounds(pos))?;
        self.tiles[index] = tile;
        Ok(())
    }

    /// Whether the cell holds `TileType::Empty`. Cells outside the grid are not empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Some(TileType::Empty)
    }

    /// Whether a unit could stand on the cell.
    pub fn is_walkable(&self, pos: Position) -> bool {
        self.get(pos).is_some_and(TileType::is_walkable)
    }

    /// Iterates over every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let width = self.width as i32;
        let height = self.height as i32;
        (0..height).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }

    /// Iterates over every position together with its tile.
    pub fn iter(&self) -> impl Iterator<Item = (Position, TileType)> + '_ {
        self.positions().zip(self.tiles.iter().copied())
    }

    /// Returns the positions whose tile satisfies `predicate`.
    pub fn positions_where(&self, predicate: impl Fn(TileType) -> bool) -> Vec<Position> {
        self.iter()
            .filter(|(_, tile)| predicate(*tile))
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Counts the tiles satisfying `predicate`.
    pub fn count(&self, predicate: impl Fn(TileType) -> bool) -> usize {
        self.tiles.iter().filter(|tile| predicate(**tile)).count()
    }

    /// Renders the grid as one line of glyphs per row.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.tiles.len() + self.height as usize);
        for row in self.tiles.chunks(self.width.max(1) as usize) {
            out.extend(row.iter().map(|tile| tile.glyph()));
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii())
    }
}

/// A generated, validated dungeon level.
///
/// Room rectangles are not retained; the grid is the whole layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// Depth of this level in the dungeon (level number)
    pub depth: u32,
    /// The tile layout
    pub grid: TileGrid,
    /// Where the player arrives
    pub start: Position,
    /// Stairs leading further down
    pub stairs_down: Position,
    /// Stairs leading back up, placed on the start cell when enabled
    pub stairs_up: Option<Position>,
}

impl Level {
    pub fn width(&self) -> u32 {
        self.grid.width
    }

    pub fn height(&self) -> u32 {
        self.grid.height
    }

    /// The cells a unit may currently step onto: walkable tiles not listed in
    /// `occupied`. This is the allow-list runtime AI passes to the pathfinder
    /// each turn, so it changes as units and objects move.
    pub fn passable_cells(&self, occupied: &HashSet<Position>) -> HashSet<Position> {
        self.grid
            .iter()
            .filter(|(pos, tile)| tile.is_walkable() && !occupied.contains(pos))
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Floor cells an external placement step may scatter entities onto:
    /// room and corridor floor, excluding the start and stairs cells.
    pub fn placement_cells(&self) -> Vec<Position> {
        self.grid
            .positions_where(TileType::is_floor)
            .into_iter()
            .filter(|pos| *pos != self.start && *pos != self.stairs_down)
            .collect()
    }
}
