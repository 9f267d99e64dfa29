//! Battle City entry point
//!
//! Native headless runner: plays an attract-mode session (a random pilot
//! drives the player tank), logs what happens and can dump the final frame
//! as text. Windowed hosts drive `sim::tick` and `render::draw` themselves.

use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;

use battle_city::audio::{AudioManager, AudioSink};
use battle_city::consts::*;
use battle_city::render::{self, Canvas, Sprite};
use battle_city::sim::{CellKind, GamePhase, GameState, RandomSource, SimRng, TickInput, tick};
use battle_city::{Direction, Settings};

const DEFAULT_FRAMES: u64 = 3600;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Options {
    /// Map and AI seed; defaults to the system clock
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
    /// Stop after this many frames if the session is still running
    #[arg(long, value_name = "COUNT", default_value_t = DEFAULT_FRAMES)]
    frames: u64,
    /// JSON settings file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Print the final frame as text
    #[arg(long)]
    ascii: bool,
}

fn system_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Stand-in for a human at the keyboard
struct AttractPilot {
    rng: SimRng,
    heading: Direction,
}

impl AttractPilot {
    fn new(seed: u64) -> Self {
        Self {
            rng: SimRng::seeded(seed),
            heading: Direction::Up,
        }
    }

    fn next_input(&mut self) -> TickInput {
        if self.rng.chance(0.04) {
            self.heading = self.rng.pick(&Direction::ALL);
        }
        TickInput {
            movement: Some(self.heading),
            fire: true,
            ..Default::default()
        }
    }
}

/// Counts sound cues instead of playing them
#[derive(Default)]
struct CueCounter {
    sounds: HashMap<u8, u32>,
    theme_starts: u32,
}

impl AudioSink for CueCounter {
    fn play_sound(&mut self, _channel: u8, sound: u8) {
        *self.sounds.entry(sound).or_default() += 1;
    }

    fn play_music(&mut self, _track: u8) {
        self.theme_starts += 1;
    }

    fn stop_music(&mut self) {}
}

/// Rasterises draw calls onto a character grid, one glyph per 16px cell
struct TextCanvas {
    cols: usize,
    rows: usize,
    glyphs: Vec<char>,
    lines: Vec<String>,
}

impl TextCanvas {
    fn new() -> Self {
        let cols = (SCREEN_WIDTH / CELL_SIZE + 1) as usize;
        let rows = (SCREEN_HEIGHT / CELL_SIZE + 1) as usize;
        Self {
            cols,
            rows,
            glyphs: vec![' '; cols * rows],
            lines: Vec::new(),
        }
    }

    fn put(&mut self, x: i32, y: i32, glyph: char) {
        let (col, row) = ((x + CELL_SIZE / 2) / CELL_SIZE, (y + CELL_SIZE / 2) / CELL_SIZE);
        if col >= 0 && row >= 0 && (col as usize) < self.cols && (row as usize) < self.rows {
            self.glyphs[row as usize * self.cols + col as usize] = glyph;
        }
    }

    fn glyph_for(sprite: Sprite) -> char {
        let cell = [
            (CellKind::Brick, '#'),
            (CellKind::SemiCrackedBrick, '%'),
            (CellKind::CrackedBrick, ':'),
            (CellKind::Stone, '@'),
            (CellKind::Water, '~'),
            (CellKind::Forest, '&'),
            (CellKind::Home, 'H'),
            (CellKind::PowerUp, '+'),
            (CellKind::Empty, '.'),
        ]
        .into_iter()
        .find(|(kind, _)| render::cell_sprite(*kind) == Some(sprite));
        match cell {
            Some((_, glyph)) => glyph,
            None if sprite.v == render::PLAYER_TANK_ROW => 'P',
            None => 'E',
        }
    }

    fn render(&self) -> String {
        let mut out = self.lines.join("  ");
        for row in self.glyphs.chunks(self.cols) {
            out.push('\n');
            out.extend(row.iter());
        }
        out
    }
}

impl Canvas for TextCanvas {
    fn clear(&mut self, _color: u8) {
        self.glyphs.fill(' ');
        self.lines.clear();
    }

    fn sprite(&mut self, x: i32, y: i32, sprite: Sprite) {
        self.put(x, y, Self::glyph_for(sprite));
    }

    fn rect(&mut self, x: i32, y: i32, _w: i32, _h: i32, _color: u8) {
        self.put(x - CELL_SIZE / 2, y - CELL_SIZE / 2, '*');
    }

    fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, _color: u8) {
        let glyph = if (x2 - x1).signum() == (y2 - y1).signum() {
            '\\'
        } else {
            '/'
        };
        self.put(x1.min(x2), y1.min(y2), glyph);
    }

    fn text(&mut self, _x: i32, _y: i32, text: &str, _color: u8) {
        self.lines.push(text.to_string());
    }
}

fn main() {
    env_logger::init();

    let options = Options::parse();

    let settings = options
        .config
        .as_ref()
        .map(Settings::load)
        .unwrap_or_default();
    let seed = options.seed.unwrap_or_else(system_seed);
    log::info!("Battle City (native, headless) starting with seed {}", seed);

    let mut audio = AudioManager::new(CueCounter::default());
    audio.set_muted(settings.muted);
    let mut state = GameState::with_settings(seed, settings);
    let mut pilot = AttractPilot::new(seed.wrapping_add(1));

    let mut frame = 0;
    while frame < options.frames {
        frame += 1;
        let input = pilot.next_input();
        tick(&mut state, &input);
        audio.handle_events(&state.drain_events());
        audio.sync_phase(state.phase);

        if state.phase.is_terminal() {
            break;
        }
        if frame % 600 == 0 {
            log::info!(
                "frame {}: lives {}, kills {}, bullets {}",
                frame,
                state.player.lives,
                state.kills,
                state.bullets().count()
            );
        }
    }

    let outcome = match state.phase {
        GamePhase::Playing => "still playing",
        GamePhase::GameOver => "game over",
        GamePhase::Won => "won",
    };
    log::info!(
        "Stopped after {} frames: {} (lives {}, kills {})",
        frame,
        outcome,
        state.player.lives,
        state.kills
    );
    log::debug!(
        "Sound cues: {:?}, theme started {} time(s)",
        audio.sink().sounds,
        audio.sink().theme_starts
    );

    if options.ascii {
        let mut canvas = TextCanvas::new();
        // Show the field even on an end screen
        let phase = state.phase;
        state.phase = GamePhase::Playing;
        render::draw(&state, &mut canvas, frame);
        state.phase = phase;
        println!("{}", canvas.render());
    }

    println!("{outcome} after {frame} frames (seed {seed})");
}
