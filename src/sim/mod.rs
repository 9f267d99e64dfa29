//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One `tick` per frame, fixed pixel steps
//! - Randomness only through an injected `RandomSource`
//! - Stable iteration order (raster order for cells, spawn order for bullets)
//! - No rendering or host dependencies

pub mod bullet;
pub mod collision;
pub mod rng;
pub mod state;
pub mod tank;
pub mod terrain;
pub mod tick;

pub use bullet::{Bullet, Owner};
pub use collision::{Aabb, TerrainHit, bullet_hits_box, resolve_bullet_terrain};
pub use rng::{RandomSource, ScriptedSource, SimRng};
pub use state::{GameEvent, GamePhase, GameState};
pub use tank::{Boost, Cooldown, EnemyKind, EnemyTank, PlayerTank, Tank};
pub use terrain::{Cell, CellKind, Grid, HitEffect, Mirror, slot_pos};
pub use tick::{TickInput, tick};
