//! Game settings and tuning
//!
//! Loaded from an optional JSON file; any missing field keeps its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Gameplay tuning and preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Session ===
    /// Lives at session start and after a reset
    pub starting_lives: u32,
    /// Enemy destructions needed to win
    pub kill_quota: u32,

    // === Guns ===
    /// Cooldown set on each player shot
    pub player_fire_interval: i32,
    /// Cooldown set on each enemy shot
    pub enemy_fire_interval: i32,
    /// Cooldown units removed per frame
    pub cooldown_decay: i32,

    // === Power-ups ===
    /// Frames a collected boost lasts
    pub power_up_duration: u32,
    /// Speed factor while boosted
    pub power_up_speed_multiplier: i32,
    /// Frames an uncollected power-up stays on the field
    pub power_up_lifetime: u32,

    // === Randomness ===
    /// Per-frame probability the enemy picks a new heading
    pub enemy_turn_chance: f32,
    /// Probability a random terrain slot is left empty
    pub empty_cell_chance: f32,

    // === Audio ===
    /// Suppress every sound cue
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            starting_lives: 2,
            kill_quota: 3,

            player_fire_interval: 15,
            enemy_fire_interval: 60,
            cooldown_decay: 3,

            power_up_duration: 300,
            power_up_speed_multiplier: 2,
            power_up_lifetime: 600,

            enemy_turn_chance: 0.05,
            empty_cell_chance: 0.6,

            muted: false,
        }
    }
}

impl Settings {
    /// Parse settings from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Settings>(json).map(Settings::sanitized)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a JSON file, falling back to defaults on any failure
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Invalid settings in {}: {} - using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read {}: {} - using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Clamp values the simulation cannot work with
    fn sanitized(mut self) -> Self {
        self.starting_lives = self.starting_lives.max(1);
        self.kill_quota = self.kill_quota.max(1);
        self.cooldown_decay = self.cooldown_decay.max(1);
        self.power_up_speed_multiplier = self.power_up_speed_multiplier.max(1);
        self.enemy_turn_chance = self.enemy_turn_chance.clamp(0.0, 1.0);
        self.empty_cell_chance = self.empty_cell_chance.clamp(0.0, 1.0);
        self
    }
}
