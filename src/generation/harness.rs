//! # Level Harness
//!
//! Runs the configured strategy until it produces a grid that passes
//! validation, then places the stairs and the start cell.

use crate::generation::{utils, Algorithm, Generator};
use crate::{
    BlobMapGenerator, DelveError, DelveResult, GenerationConfig, Level, PathMapGenerator,
    RoomCorridorGenerator, TileGrid, TileType,
};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Turns a [`GenerationConfig`] into playable levels.
///
/// # Examples
///
/// ```
/// use delve::{GenerationConfig, MapGenerator, TileType};
/// use delve::generation::utils::create_rng;
///
/// let config = GenerationConfig::for_testing(5);
/// let mut rng = create_rng(&config);
/// let level = MapGenerator::new(config).generate_level(1, &mut rng).unwrap();
///
/// assert_eq!(level.depth, 1);
/// assert_eq!(level.grid.get(level.stairs_down), Some(TileType::StairsDown));
/// assert_eq!(level.grid.get(level.start), Some(TileType::StairsUp));
/// ```
#[derive(Debug, Clone)]
pub struct MapGenerator {
    pub config: GenerationConfig,
}

impl MapGenerator {
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    /// The strategy selected by the configured algorithm.
    pub fn strategy(&self) -> Box<dyn Generator<TileGrid>> {
        match self.config.algorithm {
            Algorithm::RoomsAndCorridors => Box::new(RoomCorridorGenerator::new()),
            Algorithm::Blob => Box::new(BlobMapGenerator::from_config(&self.config)),
            Algorithm::Path => Box::new(PathMapGenerator::from_config(&self.config)),
        }
    }

    /// Generates the level at `depth`.
    ///
    /// An invalid configuration is reported immediately. Otherwise failed
    /// attempts are retried up to `max_attempts` times, after which
    /// [`DelveError::GenerationExhausted`] carries the last failure.
    pub fn generate_level(&self, depth: u32, rng: &mut StdRng) -> DelveResult<Level> {
        self.config.validate()?;
        let strategy = self.strategy();

        let mut last_error = String::from("no attempt made");
        for attempt in 1..=self.config.max_attempts {
            match self.attempt(strategy.as_ref(), depth, rng) {
                Ok(level) => {
                    info!(
                        "Generated {}x{} level {} with {} in {} attempt(s)",
                        level.width(),
                        level.height(),
                        depth,
                        strategy.generator_type(),
                        attempt
                    );
                    return Ok(level);
                }
                Err(e) => {
                    debug!("Attempt {} with {} failed: {}", attempt, strategy.generator_type(), e);
                    last_error = e.to_string();
                }
            }
        }

        Err(DelveError::GenerationExhausted {
            attempts: self.config.max_attempts,
            last_error,
        })
    }

    fn attempt(
        &self,
        strategy: &dyn Generator<TileGrid>,
        depth: u32,
        rng: &mut StdRng,
    ) -> DelveResult<Level> {
        let grid = strategy.generate(&self.config, rng)?;
        strategy.validate(&grid, &self.config)?;
        self.place_stairs(grid, depth, rng)
    }

    /// Picks the stairs and start from the room floor at random.
    fn place_stairs(&self, mut grid: TileGrid, depth: u32, rng: &mut StdRng) -> DelveResult<Level> {
        let mut floors = grid.positions_where(|t| t == TileType::Floor);
        floors.shuffle(rng);
        let (stairs_down, start) = match floors.as_slice() {
            [first, second, ..] => (*first, *second),
            _ => {
                return Err(DelveError::InvalidLevel(format!(
                    "{} floor cells cannot hold stairs and a start",
                    floors.len()
                )))
            }
        };

        grid.set(stairs_down, TileType::StairsDown)?;
        let stairs_up = if self.config.place_stairs_up {
            grid.set(start, TileType::StairsUp)?;
            Some(start)
        } else {
            None
        };

        Ok(Level {
            depth,
            grid,
            start,
            stairs_down,
            stairs_up,
        })
    }
}

impl Default for MapGenerator {
    fn default() -> Self {
        Self::new(GenerationConfig::default())
    }
}

/// Generates one level with a fresh RNG seeded from the config.
pub fn generate_level(config: &GenerationConfig, depth: u32) -> DelveResult<Level> {
    let mut rng = utils::create_rng(config);
    MapGenerator::new(config.clone()).generate_level(depth, &mut rng)
}
