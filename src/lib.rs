//! # Delve
//!
//! Procedural dungeon level generation for a tile-based game, plus the grid
//! pathfinder shared by the generators and by runtime unit AI.
//!
//! ## Architecture Overview
//!
//! - **Game**: positions, tile types, tile grids and finished levels, and the
//!   pursuit behaviour unit AI uses to chase a target
//! - **Generation**: the rooms-and-corridors pipeline (region splitting, region
//!   connecting, tile rasterizing), the blob and path generators, and the
//!   validate-and-retry harness that turns a strategy into a playable level
//! - **Utils**: rectangle geometry and the A* pathfinder
//!
//! All randomness is drawn from a caller-supplied RNG, so a fixed seed always
//! reproduces the same level.

pub mod game;
pub mod generation;
pub mod utils;

pub use game::{Direction, Level, Position, Pursuit, PursuitStep, TileGrid, TileType};
pub use generation::{
    Algorithm, BlobMapGenerator, GenerationConfig, Generator, MapGenerator, PathMapGenerator,
    RoomCorridorGenerator,
};
pub use utils::{Padding, Pathfinder, Rect};

/// Core error type for the Delve generation engine.
#[derive(thiserror::Error, Debug)]
pub enum DelveError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Generation parameters can never produce a level
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A grid access fell outside the grid
    #[error("Position ({}, {}) is out of bounds", .0.x, .0.y)]
    OutOfBounds(Position),

    /// A single generation attempt failed; the harness retries these
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// A generated grid broke a wall-placement rule; the harness retries these
    #[error("Invalid level: {0}")]
    InvalidLevel(String),

    /// Every attempt allowed by the configuration failed
    #[error("Generation exhausted after {attempts} attempts (last error: {last_error})")]
    GenerationExhausted { attempts: u32, last_error: String },
}

/// Result type used throughout the Delve codebase.
pub type DelveResult<T> = Result<T, DelveError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Generation constants.
pub mod config {
    /// Default dungeon width in tiles
    pub const DEFAULT_DUNGEON_WIDTH: u32 = 60;

    /// Default dungeon height in tiles
    pub const DEFAULT_DUNGEON_HEIGHT: u32 = 40;

    /// Attempts the harness makes before giving up on a level
    pub const MAX_GENERATION_ATTEMPTS: u32 = 100;

    /// Shortest shared border along which two regions may be connected
    pub const MIN_SHARED_BORDER: i32 = 5;

    /// Replacement points the path generator tries before failing an attempt
    pub const MAX_POINT_RETRIES: u32 = 20;

    /// Rows at the top of every grid reserved for wall faces and wall tops
    pub const RESERVED_TOP_ROWS: i32 = 2;

    /// Largest width or height a configuration may ask for
    pub const MAX_DUNGEON_DIMENSION: u32 = 4096;
}
