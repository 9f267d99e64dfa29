//! Battle City - A single-screen tank battle arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain, tanks, bullets, collisions, game state)
//! - `render`: One-pass draw routine over a host-provided canvas
//! - `audio`: Event to sound cue mapping over a host-provided sink
//! - `host`: Keyboard contract and input sampling
//! - `settings`: Data-driven game tuning

pub mod audio;
pub mod host;
pub mod render;
pub mod settings;
pub mod sim;

pub use settings::Settings;

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Playfield dimensions (pixels)
    pub const SCREEN_WIDTH: i32 = 415;
    pub const SCREEN_HEIGHT: i32 = 250;

    /// Terrain cell edge length
    pub const CELL_SIZE: i32 = 16;
    /// Top HUD strip; the terrain grid starts below it
    pub const GRID_ORIGIN_Y: i32 = 10;

    /// Tank sprite edge length
    pub const TANK_SIZE: i32 = 16;
    /// Pixels per frame, before power-up multiplier
    pub const TANK_SPEED: i32 = 2;

    /// Bullet extent used for overlap tests
    pub const BULLET_SIZE: i32 = 2;
    /// Pixels per frame
    pub const BULLET_SPEED: i32 = 4;

    /// Player spawn (bottom row, fifth column) facing up
    pub const PLAYER_SPAWN: (i32, i32) = (4 * CELL_SIZE, SCREEN_HEIGHT - TANK_SIZE);
    /// Enemy spawn (top right area) facing down
    pub const ENEMY_SPAWN: (i32, i32) = (21 * CELL_SIZE, CELL_SIZE);

    /// Enemy tanks are destroyed at this many hits
    pub const ENEMY_HIT_POINTS: u32 = 1;
}

/// One of the four cardinal headings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All headings, in sprite-sheet order
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Unit step in screen space (y grows downward)
    #[inline]
    pub fn step(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Right => IVec2::new(1, 0),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
        }
    }

    /// Column index into a four-frame sprite strip
    #[inline]
    pub fn sprite_index(self) -> i32 {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }
}

/// Clamp a tank's top-left corner so the whole sprite stays on screen
#[inline]
pub fn clamp_to_playfield(pos: IVec2) -> IVec2 {
    IVec2::new(
        pos.x.clamp(0, consts::SCREEN_WIDTH - consts::TANK_SIZE),
        pos.y.clamp(0, consts::SCREEN_HEIGHT - consts::TANK_SIZE),
    )
}
