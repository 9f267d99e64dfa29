//! Game state and core simulation types
//!
//! One `GameState` is one play session: terrain, both tanks, every bullet in
//! flight, and the win/loss phase. All mutation happens in `tick`.

use serde::{Deserialize, Serialize};

use super::bullet::{Bullet, Owner};
use super::rng::{RandomSource, SimRng};
use super::tank::{EnemyKind, EnemyTank, PlayerTank};
use super::terrain::{Grid, HitEffect};
use crate::consts::*;
use crate::settings::Settings;

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Out of lives or home destroyed; waiting for reset
    GameOver,
    /// Kill quota reached; waiting for reset
    Won,
}

impl GamePhase {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GamePhase::Playing)
    }
}

/// Something that happened during the last tick, for audio and HUD feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    PlayerFired,
    EnemyFired,
    /// A bullet struck terrain and was used up
    Impact { owner: Owner, effect: HitEffect },
    /// A bullet bounced off a mirror
    Ricochet { owner: Owner },
    EnemyHit,
    EnemyDestroyed { kills: u32 },
    PlayerHit { lives_left: u32 },
    PowerUpCollected,
    PowerUpExpired,
    BoostEnded,
    HomeDestroyed,
    GameOver,
    Won,
    Reset,
    QuitRequested,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState<R = SimRng> {
    pub settings: Settings,
    /// Terrain map
    pub grid: Grid,
    pub player: PlayerTank,
    /// Player shots in flight
    pub player_bullets: Vec<Bullet>,
    /// The single active enemy (owns its own bullets)
    pub enemy: EnemyTank,
    /// Enemies destroyed this session
    pub kills: u32,
    pub phase: GamePhase,
    /// Frames simulated while playing
    pub time_ticks: u64,
    /// Events raised by the most recent tick
    pub events: Vec<GameEvent>,
    /// Set once quit is pressed on an end screen
    pub quit_requested: bool,
    pub(crate) rng: R,
}

impl GameState<SimRng> {
    /// Create a new session with default settings from a seed
    pub fn new(seed: u64) -> Self {
        Self::with_settings(seed, Settings::default())
    }

    pub fn with_settings(seed: u64, settings: Settings) -> Self {
        log::info!("Starting session with seed {}", seed);
        Self::with_source(SimRng::seeded(seed), settings)
    }
}

impl<R: RandomSource> GameState<R> {
    /// Create a session whose map and enemy behaviour draw from `rng`
    pub fn with_source(mut rng: R, settings: Settings) -> Self {
        let grid = Grid::generate(
            SCREEN_WIDTH,
            SCREEN_HEIGHT,
            settings.empty_cell_chance,
            &mut rng,
        );
        Self::from_grid(grid, rng, settings)
    }

    /// Create a session on a prepared map
    pub fn from_grid(mut grid: Grid, rng: R, settings: Settings) -> Self {
        grid.arm_power_ups(settings.power_up_lifetime);
        Self {
            player: PlayerTank::new(settings.starting_lives),
            player_bullets: Vec::new(),
            enemy: EnemyTank::new(EnemyKind::for_kills(0)),
            kills: 0,
            phase: GamePhase::Playing,
            time_ticks: 0,
            events: Vec::new(),
            quit_requested: false,
            grid,
            rng,
            settings,
        }
    }

    /// Start over on the same map: damage undone, tanks and counters back to
    /// their initial values
    pub fn reset(&mut self) {
        self.grid.restore();
        self.grid.arm_power_ups(self.settings.power_up_lifetime);
        self.player = PlayerTank::new(self.settings.starting_lives);
        self.player_bullets.clear();
        self.enemy = EnemyTank::new(EnemyKind::for_kills(0));
        self.kills = 0;
        self.phase = GamePhase::Playing;
        self.quit_requested = false;
        self.emit(GameEvent::Reset);
        log::info!("Session reset");
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take the events raised by the last tick
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Current enemy was destroyed: count it and bring in the next one, or win
    pub(crate) fn register_enemy_kill(&mut self) {
        self.kills += 1;
        self.emit(GameEvent::EnemyDestroyed { kills: self.kills });
        log::info!("Enemy destroyed ({}/{})", self.kills, self.settings.kill_quota);

        if self.kills >= self.settings.kill_quota {
            self.phase = GamePhase::Won;
            self.emit(GameEvent::Won);
            log::info!("Kill quota reached - player wins");
        } else {
            self.enemy = EnemyTank::new(EnemyKind::for_kills(self.kills));
        }
    }

    /// Player took an enemy bullet
    pub(crate) fn register_player_hit(&mut self) {
        self.player.lives = self.player.lives.saturating_sub(1);
        self.emit(GameEvent::PlayerHit {
            lives_left: self.player.lives,
        });

        if self.player.lives == 0 {
            self.game_over();
        } else {
            log::info!("Player hit, {} lives left", self.player.lives);
            self.player.respawn();
        }
    }

    /// Session-level consequences of a bullet striking terrain
    pub(crate) fn apply_terrain_effect(&mut self, owner: Owner, effect: HitEffect) {
        match effect {
            HitEffect::HomeDestroyed => {
                self.emit(GameEvent::HomeDestroyed);
                log::info!("Home destroyed");
                self.game_over();
            }
            HitEffect::PowerUpCollected => self.collect_power_up(),
            HitEffect::Reflected(_) => self.emit(GameEvent::Ricochet { owner }),
            HitEffect::PassThrough => {}
            HitEffect::Cracked(_)
            | HitEffect::Destroyed
            | HitEffect::Absorbed
            | HitEffect::PowerUpDestroyed => {
                log::debug!("{:?} bullet impact: {:?}", owner, effect);
                self.emit(GameEvent::Impact { owner, effect });
            }
        }
    }

    pub(crate) fn collect_power_up(&mut self) {
        self.player.boost.grant(self.settings.power_up_duration);
        self.emit(GameEvent::PowerUpCollected);
        log::debug!("Power-up collected");
    }

    fn game_over(&mut self) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::GameOver;
            self.emit(GameEvent::GameOver);
            log::info!("Game over after {} ticks", self.time_ticks);
        }
    }

    /// Every bullet in flight, player shots first
    pub fn bullets(&self) -> impl Iterator<Item = &Bullet> {
        self.player_bullets.iter().chain(self.enemy.bullets.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::ScriptedSource;

    fn blank_state() -> GameState<ScriptedSource> {
        let (cols, rows) = Grid::playfield_dims();
        GameState::from_grid(Grid::blank(cols, rows), ScriptedSource::new(), Settings::default())
    }

    #[test]
    fn test_new_session_defaults() {
        let state = GameState::new(12345);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.lives, 2);
        assert_eq!(state.kills, 0);
        assert_eq!(state.enemy.kind, EnemyKind::Light);
        assert!(state.bullets().next().is_none());
        assert!(state.grid.home_exists());
    }

    #[test]
    fn test_kill_sequence_to_win() {
        let mut state = blank_state();
        state.register_enemy_kill();
        assert_eq!(state.enemy.kind, EnemyKind::Heavy);
        state.register_enemy_kill();
        assert_eq!(state.phase, GamePhase::Playing);
        state.register_enemy_kill();
        assert_eq!(state.phase, GamePhase::Won);
        assert_eq!(state.kills, 3);
        assert_eq!(state.events.last(), Some(&GameEvent::Won));
    }

    #[test]
    fn test_last_life_ends_game() {
        let mut state = blank_state();
        state.register_player_hit();
        assert_eq!(state.phase, GamePhase::Playing);
        state.register_player_hit();
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.player.lives, 0);
    }

    #[test]
    fn test_game_over_raised_once() {
        let mut state = blank_state();
        state.apply_terrain_effect(Owner::Enemy, HitEffect::HomeDestroyed);
        state.apply_terrain_effect(Owner::Player, HitEffect::HomeDestroyed);
        let overs = state
            .events
            .iter()
            .filter(|e| **e == GameEvent::GameOver)
            .count();
        assert_eq!(overs, 1);
    }

    #[test]
    fn test_drain_events() {
        let mut state = blank_state();
        state.emit(GameEvent::PlayerFired);
        assert_eq!(state.drain_events(), vec![GameEvent::PlayerFired]);
        assert!(state.events.is_empty());
    }
}
