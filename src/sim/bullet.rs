//! Projectiles
//!
//! Bullets only move. All collision resolution happens in the collision pass.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::Direction;
use crate::consts::*;

/// Who fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

/// A single shot in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    /// Top-left corner of the bullet's box
    pub pos: IVec2,
    pub direction: Direction,
    pub owner: Owner,
    pub exists: bool,
    /// Cell index of the mirror currently bending this bullet; the same
    /// mirror is ignored until the bullet has left it
    #[serde(default)]
    pub inside_mirror: Option<usize>,
}

impl Bullet {
    pub fn new(pos: IVec2, direction: Direction, owner: Owner) -> Self {
        Self {
            pos,
            direction,
            owner,
            exists: true,
            inside_mirror: None,
        }
    }

    /// Move one frame's worth along the current heading
    pub fn advance(&mut self) {
        self.pos += self.direction.step() * BULLET_SPEED;
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::square(self.pos, BULLET_SIZE)
    }

    /// True once the bullet has left the playfield rectangle
    pub fn is_off_field(&self, width: i32, height: i32) -> bool {
        self.pos.x < 0 || self.pos.x > width || self.pos.y < 0 || self.pos.y > height
    }

    /// Still alive and on screen
    pub fn is_live(&self) -> bool {
        self.exists && !self.is_off_field(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}
