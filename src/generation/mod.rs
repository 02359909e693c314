//! # Generation Module
//!
//! Procedural level generation: the rooms-and-corridors pipeline, the blob and
//! path generators, and the harness that validates their output and retries.
//!
//! Every generator is a [`Generator`] producing a [`TileGrid`]; the
//! [`MapGenerator`] harness picks one according to [`GenerationConfig::algorithm`],
//! rejects grids that break wall-placement rules, and places stairs on the first
//! valid one.

pub mod blob;
pub mod connector;
pub mod dungeon;
pub mod harness;
pub mod paths;
pub mod regions;
pub mod tiles;

pub use blob::*;
pub use connector::*;
pub use dungeon::*;
pub use harness::*;
pub use paths::*;
pub use regions::*;
pub use tiles::*;

use crate::config::{MAX_DUNGEON_DIMENSION, RESERVED_TOP_ROWS};
use crate::{DelveError, DelveResult, Direction, TileGrid, TileType};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which layout strategy the harness runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Rooms in recursively split regions, joined by corridors
    #[default]
    RoomsAndCorridors,
    /// A single organic cave grown from the centre
    Blob,
    /// Corridors threaded between random points
    Path,
}

/// Configuration for procedural generation.
///
/// Missing fields take their values from [`GenerationConfig::default`] when
/// deserialized, so a config file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Level width in tiles
    pub width: u32,
    /// Level height in tiles
    pub height: u32,
    /// Layout strategy
    pub algorithm: Algorithm,
    /// Minimum room width and height
    pub min_room_size: u32,
    /// Maximum room width and height
    pub max_room_size: u32,
    /// Rooms-and-corridors attempts with fewer rooms are rejected
    pub min_rooms: u32,
    /// Probability that a leaf region is left without a room (0.0 to 1.0)
    pub empty_region_chance: f64,
    /// Probability that an adjacent, non-tree region pair gets a loop corridor (0.0 to 1.0)
    pub extra_connection_chance: f64,
    /// Share of the blob map that becomes floor (0.0 exclusive to 1.0)
    pub fill_rate: f64,
    /// Number of points the path generator threads corridors through
    pub path_points: u32,
    /// Attempts before the harness gives up
    pub max_attempts: u32,
    /// Whether the start cell is marked as stairs up
    pub place_stairs_up: bool,
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(42);
    /// assert_eq!(config.seed, 42);
    /// assert!(config.max_room_size >= config.min_room_size);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            width: crate::config::DEFAULT_DUNGEON_WIDTH,
            height: crate::config::DEFAULT_DUNGEON_HEIGHT,
            algorithm: Algorithm::RoomsAndCorridors,
            min_room_size: 5,
            max_room_size: 12,
            min_rooms: 4,
            empty_region_chance: 0.15,
            extra_connection_chance: 1.0,
            fill_rate: 0.4,
            path_points: 8,
            max_attempts: crate::config::MAX_GENERATION_ATTEMPTS,
            place_stairs_up: true,
        }
    }

    /// Creates a configuration for testing with smaller, simpler levels.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            width: 30,
            height: 20,
            max_room_size: 9,
            min_rooms: 3,
            path_points: 5,
            ..Self::new(seed)
        }
    }

    /// Returns a copy using `algorithm`.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> DelveResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Checks that the parameters can produce a level at all.
    ///
    /// Unlike a failed attempt, a bad configuration is never retried.
    pub fn validate(&self) -> DelveResult<()> {
        let invalid = |message: String| Err(DelveError::InvalidConfig(message));

        if self.width < 3 || self.height < RESERVED_TOP_ROWS as u32 + 2 {
            return invalid(format!(
                "{}x{} is too small for any level",
                self.width, self.height
            ));
        }
        if self.width > MAX_DUNGEON_DIMENSION || self.height > MAX_DUNGEON_DIMENSION {
            return invalid(format!(
                "{}x{} exceeds the {} tile limit per side",
                self.width, self.height, MAX_DUNGEON_DIMENSION
            ));
        }
        if self.max_attempts == 0 {
            return invalid("max_attempts must be at least 1".to_string());
        }
        for (name, chance) in [
            ("empty_region_chance", self.empty_region_chance),
            ("extra_connection_chance", self.extra_connection_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return invalid(format!("{} must be within 0.0..=1.0, got {}", name, chance));
            }
        }

        match self.algorithm {
            Algorithm::RoomsAndCorridors => {
                if self.min_room_size < 3 {
                    return invalid("min_room_size must be at least 3".to_string());
                }
                if self.max_room_size < self.min_room_size {
                    return invalid(format!(
                        "max_room_size {} is below min_room_size {}",
                        self.max_room_size, self.min_room_size
                    ));
                }
                let padding = crate::Padding::default();
                let min_width = self.min_room_size as i32 + padding.horizontal();
                let min_height = self.min_room_size as i32 + padding.vertical();
                if (self.width as i32) < min_width || (self.height as i32) < min_height {
                    return invalid(format!(
                        "{}x{} cannot hold a single {}x{} room",
                        self.width, self.height, self.min_room_size, self.min_room_size
                    ));
                }
            }
            Algorithm::Blob => {
                if !(self.fill_rate > 0.0 && self.fill_rate <= 1.0) {
                    return invalid(format!(
                        "fill_rate must be within (0.0, 1.0], got {}",
                        self.fill_rate
                    ));
                }
            }
            Algorithm::Path => {
                if self.path_points < 2 {
                    return invalid("path_points must be at least 2".to_string());
                }
            }
        }

        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Trait for procedural generators.
///
/// A generator runs one attempt; retrying is the harness's job. Attempts that
/// fail for random reasons return [`DelveError::GenerationFailed`].
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DelveResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> DelveResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use rand::SeedableRng;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }

    /// Checks the wall-placement rules every finished grid must satisfy.
    ///
    /// - the grid has at least one walkable tile
    /// - no walkable tile lies in the reserved top rows
    /// - no walkable tile has bare `Empty` directly above it
    /// - every wall face has a wall top or `Empty` directly above it
    ///
    /// Connectivity is not checked here; the generators guarantee it.
    pub fn validate_level(grid: &TileGrid) -> DelveResult<()> {
        if grid.count(TileType::is_walkable) == 0 {
            return Err(DelveError::InvalidLevel(
                "Level has no floor tiles".to_string(),
            ));
        }

        let north = Direction::North.to_delta();
        for (pos, tile) in grid.iter() {
            let above = grid.get(pos + north);

            if tile.is_walkable() {
                if pos.y < RESERVED_TOP_ROWS {
                    return Err(DelveError::InvalidLevel(format!(
                        "{:?} at ({}, {}) lies in the reserved top rows",
                        tile, pos.x, pos.y
                    )));
                }
                if above == Some(TileType::Empty) {
                    return Err(DelveError::InvalidLevel(format!(
                        "{:?} at ({}, {}) has no wall above it",
                        tile, pos.x, pos.y
                    )));
                }
            }

            if tile.is_wall_face() && !matches!(above, Some(TileType::WallTop | TileType::Empty)) {
                return Err(DelveError::InvalidLevel(format!(
                    "{:?} at ({}, {}) has {:?} above it instead of a wall top",
                    tile, pos.x, pos.y, above
                )));
            }
        }

        Ok(())
    }
}
