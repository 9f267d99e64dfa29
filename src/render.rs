//! Draw pass
//!
//! Issues one host draw call per visible entity. Holds no state between
//! frames; everything comes from the `GameState`.

use crate::Direction;
use crate::consts::*;
use crate::sim::{CellKind, EnemyKind, GamePhase, GameState, Mirror, Owner, RandomSource};

/// A 16x16 region of the host's sprite sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    pub u: i32,
    pub v: i32,
}

impl Sprite {
    pub const fn at(u: i32, v: i32) -> Self {
        Self { u, v }
    }
}

/// Drawing primitives provided by the host
pub trait Canvas {
    fn clear(&mut self, color: u8);
    /// Blit a 16x16 sprite-sheet region with colour 0 transparent
    fn sprite(&mut self, x: i32, y: i32, sprite: Sprite);
    fn rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u8);
    fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: u8);
    fn text(&mut self, x: i32, y: i32, text: &str, color: u8);
}

pub const BACKGROUND: u8 = 0;
pub const MIRROR_COLOR: u8 = 4;
pub const HUD_COLOR: u8 = 8;
pub const BOOST_COLOR: u8 = 10;
pub const PLAYER_BULLET_COLOR: u8 = 12;
pub const ENEMY_BULLET_COLOR: u8 = 8;

/// Sprite-sheet location for a terrain tile; mirrors are drawn as lines
pub fn cell_sprite(kind: CellKind) -> Option<Sprite> {
    match kind {
        CellKind::Empty => Some(Sprite::at(48, 32)),
        CellKind::Brick => Some(Sprite::at(0, 16)),
        CellKind::SemiCrackedBrick => Some(Sprite::at(16, 16)),
        CellKind::CrackedBrick => Some(Sprite::at(32, 16)),
        CellKind::Stone => Some(Sprite::at(48, 16)),
        CellKind::Water => Some(Sprite::at(0, 32)),
        CellKind::Forest => Some(Sprite::at(16, 32)),
        CellKind::Home => Some(Sprite::at(32, 32)),
        CellKind::PowerUp => Some(Sprite::at(0, 80)),
        CellKind::MirrorNe | CellKind::MirrorSe => None,
    }
}

/// Sprite-strip row for each tank type
pub const PLAYER_TANK_ROW: i32 = 0;
pub const LIGHT_ENEMY_ROW: i32 = 48;
pub const HEAVY_ENEMY_ROW: i32 = 64;

pub fn tank_sprite(row: i32, direction: Direction) -> Sprite {
    Sprite::at(direction.sprite_index() * TANK_SIZE, row)
}

pub fn enemy_row(kind: EnemyKind) -> i32 {
    match kind {
        EnemyKind::Light => LIGHT_ENEMY_ROW,
        EnemyKind::Heavy => HEAVY_ENEMY_ROW,
    }
}

/// Draw one frame. `frame_count` only drives the end-screen blink.
pub fn draw<R: RandomSource>(state: &GameState<R>, canvas: &mut impl Canvas, frame_count: u64) {
    canvas.clear(BACKGROUND);

    match state.phase {
        GamePhase::Playing => {}
        GamePhase::GameOver => return draw_end_screen(canvas, "GAME OVER", frame_count),
        GamePhase::Won => return draw_end_screen(canvas, "YOU WON!", frame_count),
    }

    for cell in state.grid.live_cells() {
        let (x, y) = (cell.pos.x, cell.pos.y);
        match cell.kind.mirror() {
            Some(Mirror::NorthEast) => {
                canvas.line(x + CELL_SIZE, y, x, y + CELL_SIZE, MIRROR_COLOR)
            }
            Some(Mirror::SouthEast) => {
                canvas.line(x, y, x + CELL_SIZE, y + CELL_SIZE, MIRROR_COLOR)
            }
            None => {
                if let Some(sprite) = cell_sprite(cell.kind) {
                    canvas.sprite(x, y, sprite);
                }
            }
        }
    }

    let enemy = &state.enemy.tank;
    canvas.sprite(
        enemy.pos.x,
        enemy.pos.y,
        tank_sprite(enemy_row(state.enemy.kind), enemy.direction),
    );

    for bullet in state.bullets() {
        let color = match bullet.owner {
            Owner::Player => PLAYER_BULLET_COLOR,
            Owner::Enemy => ENEMY_BULLET_COLOR,
        };
        canvas.rect(bullet.pos.x, bullet.pos.y, BULLET_SIZE, BULLET_SIZE, color);
    }

    let player = &state.player.tank;
    canvas.sprite(
        player.pos.x,
        player.pos.y,
        tank_sprite(PLAYER_TANK_ROW, player.direction),
    );

    canvas.text(5, 2, &format!("LIVES: {}", state.player.lives), HUD_COLOR);
    canvas.text(65, 2, &format!("KILLS: {}", state.kills), HUD_COLOR);
    if state.player.boost.is_active() {
        canvas.text(
            125,
            2,
            &format!("BOOST: {}", state.player.boost.remaining()),
            BOOST_COLOR,
        );
    }
}

fn draw_end_screen(canvas: &mut impl Canvas, title: &str, frame_count: u64) {
    let color = (frame_count % 16) as u8;
    canvas.text(185, 95, title, color);
    canvas.text(165, 165, "PRESS 'N' TO RESTART", color);
    canvas.text(170, 180, "PRESS 'Q' TO QUIT", color);
}
