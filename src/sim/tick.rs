//! Per-frame simulation step
//!
//! Frame order:
//! 1. timers
//! 2. player bullets fly, then the player moves and fires
//! 3. player bullets vs enemy tank, then vs terrain
//! 4. the enemy steers, drives and fires, then its bullets fly
//! 5. enemy bullets vs terrain, then vs player tank
//! 6. cleanup
//!
//! Within each collision step the first match wins, so identical inputs
//! give identical sessions.

use super::bullet::{Bullet, Owner};
use super::collision::{bullet_hits_box, resolve_bullet_terrain};
use super::rng::RandomSource;
use super::state::{GameEvent, GameState};
use crate::Direction;

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Held movement direction, if any
    pub movement: Option<Direction>,
    /// Fire button held
    pub fire: bool,
    /// Restart the session
    pub reset: bool,
    /// Leave the game (honoured on end screens)
    pub quit: bool,
}

/// Advance the game state by one frame
pub fn tick<R: RandomSource>(state: &mut GameState<R>, input: &TickInput) {
    state.events.clear();

    if input.reset {
        state.reset();
        return;
    }

    if state.phase.is_terminal() {
        if input.quit && !state.quit_requested {
            state.quit_requested = true;
            state.emit(GameEvent::QuitRequested);
        }
        return;
    }

    state.time_ticks += 1;

    update_timers(state);

    for bullet in state.player_bullets.iter_mut() {
        bullet.advance();
    }
    update_player(state, input);
    resolve_player_bullets(state);

    if !state.phase.is_terminal() {
        if state
            .enemy
            .update(&state.grid, &mut state.rng, &state.settings)
        {
            state.emit(GameEvent::EnemyFired);
        }
        for bullet in state.enemy.bullets.iter_mut() {
            bullet.advance();
        }
        resolve_enemy_bullets(state);
    }

    state.player_bullets.retain(Bullet::is_live);
    state.enemy.bullets.retain(Bullet::is_live);
}

fn update_timers<R: RandomSource>(state: &mut GameState<R>) {
    if state.player.boost.tick() {
        state.emit(GameEvent::BoostEnded);
    }
    for _ in 0..state.grid.age_power_ups() {
        state.emit(GameEvent::PowerUpExpired);
    }
}

fn update_player<R: RandomSource>(state: &mut GameState<R>, input: &TickInput) {
    let speed = state.player.speed(&state.settings);
    let tank = &mut state.player.tank;
    tank.cooldown.tick(state.settings.cooldown_decay);

    match input.movement {
        Some(dir) => {
            if tank.try_move(dir, speed, &state.grid) {
                let aabb = tank.aabb();
                if state.grid.collect_power_ups(&aabb) > 0 {
                    state.collect_power_up();
                }
            }
        }
        None => tank.pos = crate::clamp_to_playfield(tank.pos),
    }

    let tank = &mut state.player.tank;
    if input.fire && tank.cooldown.ready() {
        let bullet = tank.fire(Owner::Player, state.settings.player_fire_interval);
        state.player_bullets.push(bullet);
        state.emit(GameEvent::PlayerFired);
    }
}

fn resolve_player_bullets<R: RandomSource>(state: &mut GameState<R>) {
    for i in 0..state.player_bullets.len() {
        if state.phase.is_terminal() {
            return;
        }
        if bullet_hits_box(&state.player_bullets[i], &state.enemy.tank.aabb()) {
            state.player_bullets[i].exists = false;
            state.enemy.hits += 1;
            state.emit(GameEvent::EnemyHit);
            if state.enemy.is_destroyed() {
                state.register_enemy_kill();
            }
        }
    }

    if !state.phase.is_terminal() {
        resolve_terrain(state, Owner::Player);
    }
}

fn resolve_enemy_bullets<R: RandomSource>(state: &mut GameState<R>) {
    resolve_terrain(state, Owner::Enemy);

    for i in 0..state.enemy.bullets.len() {
        if state.phase.is_terminal() {
            return;
        }
        if bullet_hits_box(&state.enemy.bullets[i], &state.player.tank.aabb()) {
            state.enemy.bullets[i].exists = false;
            state.register_player_hit();
        }
    }
}

/// Run every bullet of one owner against the terrain, then apply the
/// session-level consequences in bullet order
fn resolve_terrain<R: RandomSource>(state: &mut GameState<R>, owner: Owner) {
    let bullets = match owner {
        Owner::Player => &mut state.player_bullets,
        Owner::Enemy => &mut state.enemy.bullets,
    };

    let effects: Vec<_> = bullets
        .iter_mut()
        .filter_map(|bullet| resolve_bullet_terrain(bullet, &mut state.grid))
        .map(|hit| hit.effect)
        .collect();

    for effect in effects {
        state.apply_terrain_effect(owner, effect);
    }
}
