//! Tanks: movement, firing and the enemy steering heuristic

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::bullet::{Bullet, Owner};
use super::collision::Aabb;
use super::rng::RandomSource;
use super::terrain::Grid;
use crate::consts::*;
use crate::settings::Settings;
use crate::{Direction, clamp_to_playfield};

/// Frames-until-next-shot gate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cooldown {
    remaining: i32,
}

impl Cooldown {
    /// Count down by `decay`, never below zero
    pub fn tick(&mut self, decay: i32) {
        self.remaining = (self.remaining - decay).max(0);
    }

    pub fn ready(&self) -> bool {
        self.remaining <= 0
    }

    pub fn trigger(&mut self, interval: i32) {
        self.remaining = interval;
    }

    pub fn remaining(&self) -> i32 {
        self.remaining
    }
}

/// Position, heading and gun state shared by every tank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tank {
    /// Top-left corner of the sprite
    pub pos: IVec2,
    pub direction: Direction,
    pub cooldown: Cooldown,
}

impl Tank {
    pub fn new(pos: IVec2, direction: Direction) -> Self {
        Self {
            pos,
            direction,
            cooldown: Cooldown::default(),
        }
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::square(self.pos, TANK_SIZE)
    }

    /// Try to drive `speed` pixels along `dir`.
    ///
    /// The move is rejected if the new box would overlap movement-blocking
    /// terrain. The result is clamped to the playfield either way. Returns
    /// whether the move was accepted.
    pub fn try_move(&mut self, dir: Direction, speed: i32, grid: &Grid) -> bool {
        self.direction = dir;
        let proposal = self.pos + dir.step() * speed;
        let accepted = grid
            .query_blocking(&Aabb::square(proposal, TANK_SIZE))
            .is_none();
        if accepted {
            self.pos = proposal;
        }
        self.pos = clamp_to_playfield(self.pos);
        accepted
    }

    /// Spawn point for a new bullet: centred on the leading edge, just outside
    /// the hull. Kept on the playfield so a tank against the border still
    /// gets a live shot.
    pub fn muzzle(&self) -> IVec2 {
        let mid = TANK_SIZE / 2 - BULLET_SIZE / 2;
        let muzzle = match self.direction {
            Direction::Up => self.pos + IVec2::new(mid, -BULLET_SIZE),
            Direction::Down => self.pos + IVec2::new(mid, TANK_SIZE),
            Direction::Left => self.pos + IVec2::new(-BULLET_SIZE, mid),
            Direction::Right => self.pos + IVec2::new(TANK_SIZE, mid),
        };
        muzzle.clamp(
            IVec2::ZERO,
            IVec2::new(SCREEN_WIDTH - BULLET_SIZE, SCREEN_HEIGHT - BULLET_SIZE),
        )
    }

    /// Fire along the current heading and restart the cooldown
    pub fn fire(&mut self, owner: Owner, interval: i32) -> Bullet {
        self.cooldown.trigger(interval);
        Bullet::new(self.muzzle(), self.direction, owner)
    }
}

/// Timed speed boost from a collected power-up
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Boost {
    remaining: u32,
}

impl Boost {
    pub fn grant(&mut self, duration: u32) {
        self.remaining = duration;
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Burn one frame; returns true on the frame the boost runs out
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }
}

/// The player's tank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerTank {
    pub tank: Tank,
    pub lives: u32,
    pub boost: Boost,
}

impl PlayerTank {
    pub fn new(lives: u32) -> Self {
        Self {
            tank: Tank::new(IVec2::from(PLAYER_SPAWN), Direction::Up),
            lives,
            boost: Boost::default(),
        }
    }

    /// Pixels per frame, boost included
    pub fn speed(&self, settings: &Settings) -> i32 {
        if self.boost.is_active() {
            TANK_SPEED * settings.power_up_speed_multiplier
        } else {
            TANK_SPEED
        }
    }

    /// Back to the spawn point, facing up
    pub fn respawn(&mut self) {
        self.tank.pos = IVec2::from(PLAYER_SPAWN);
        self.tank.direction = Direction::Up;
    }
}

/// Enemy variant; replacements come back tougher-looking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Light,
    Heavy,
}

impl EnemyKind {
    /// Variant for the enemy that appears after `kills` destructions
    pub fn for_kills(kills: u32) -> Self {
        if kills == 0 {
            EnemyKind::Light
        } else {
            EnemyKind::Heavy
        }
    }
}

/// The active enemy tank, owning the bullets it has fired
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyTank {
    pub tank: Tank,
    pub kind: EnemyKind,
    pub hits: u32,
    pub bullets: Vec<Bullet>,
}

impl EnemyTank {
    pub fn new(kind: EnemyKind) -> Self {
        Self {
            tank: Tank::new(IVec2::from(ENEMY_SPAWN), Direction::Down),
            kind,
            hits: 0,
            bullets: Vec::new(),
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.hits >= ENEMY_HIT_POINTS
    }

    /// Occasionally pick a new random heading
    pub fn steer<R: RandomSource>(&mut self, rng: &mut R, turn_chance: f32) {
        if rng.chance(turn_chance) {
            self.tank.direction = rng.pick(&Direction::ALL);
        }
    }

    /// One frame of enemy behaviour: steer, drive, fire whenever the gun is ready.
    /// Returns true if a shot was fired.
    pub fn update<R: RandomSource>(&mut self, grid: &Grid, rng: &mut R, settings: &Settings) -> bool {
        self.tank.cooldown.tick(settings.cooldown_decay);
        self.steer(rng, settings.enemy_turn_chance);
        self.tank.try_move(self.tank.direction, TANK_SPEED, grid);

        if self.tank.cooldown.ready() {
            let bullet = self.tank.fire(Owner::Enemy, settings.enemy_fire_interval);
            self.bullets.push(bullet);
            return true;
        }
        false
    }
}
