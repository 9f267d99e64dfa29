//! Sound cues
//!
//! The host owns the actual sound bank; the core only decides which cue to
//! trigger on which channel for each simulation event, and when the
//! background theme should loop.

use crate::sim::{GameEvent, GamePhase, HitEffect};

/// Sound effect types, numbered as in the host's sound bank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Player tank fires
    PlayerShot,
    /// Enemy tank fires
    EnemyShot,
    /// Session lost
    GameOver,
    /// Bullet hits a tank or breakable terrain
    Impact,
    /// Kill quota reached
    Victory,
}

impl SoundEffect {
    /// Slot in the host sound bank
    pub fn id(self) -> u8 {
        match self {
            SoundEffect::PlayerShot => 0,
            SoundEffect::EnemyShot => 1,
            SoundEffect::GameOver => 2,
            SoundEffect::Impact => 3,
            SoundEffect::Victory => 4,
        }
    }

    /// Cue for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::PlayerFired => Some(SoundEffect::PlayerShot),
            GameEvent::EnemyFired => Some(SoundEffect::EnemyShot),
            GameEvent::Impact { effect, .. } => match effect {
                HitEffect::Absorbed => None,
                _ => Some(SoundEffect::Impact),
            },
            GameEvent::EnemyHit | GameEvent::PlayerHit { .. } => Some(SoundEffect::Impact),
            GameEvent::GameOver => Some(SoundEffect::GameOver),
            GameEvent::Won => Some(SoundEffect::Victory),
            _ => None,
        }
    }
}

/// Effects channel
pub const SFX_CHANNEL: u8 = 0;
/// End-screen jingle channel
pub const JINGLE_CHANNEL: u8 = 2;
/// Looping in-game theme
pub const MAIN_THEME: u8 = 0;

/// Playback provided by the host
pub trait AudioSink {
    /// Fire-and-forget one-shot
    fn play_sound(&mut self, channel: u8, sound: u8);
    /// Start a music track looping
    fn play_music(&mut self, track: u8);
    fn stop_music(&mut self);
}

/// Audio manager for the game
pub struct AudioManager<S> {
    sink: S,
    muted: bool,
    music_playing: bool,
    phase: GamePhase,
}

impl<S: AudioSink> AudioManager<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            muted: false,
            music_playing: false,
            phase: GamePhase::Playing,
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted && self.music_playing {
            self.sink.stop_music();
            self.music_playing = false;
        }
    }

    pub fn play(&mut self, effect: SoundEffect) {
        self.play_on(SFX_CHANNEL, effect);
    }

    fn play_on(&mut self, channel: u8, effect: SoundEffect) {
        if self.muted {
            return;
        }
        self.sink.play_sound(channel, effect.id());
    }

    /// Trigger the cue for every event from the last tick
    pub fn handle_events(&mut self, events: &[GameEvent]) {
        for effect in events.iter().filter_map(SoundEffect::for_event) {
            self.play(effect);
        }
    }

    /// Follow the session phase: the theme loops while playing, and
    /// entering an end screen stops it and plays that screen's jingle once.
    pub fn sync_phase(&mut self, phase: GamePhase) {
        let want_music = phase == GamePhase::Playing && !self.muted;
        if want_music && !self.music_playing {
            self.sink.play_music(MAIN_THEME);
            self.music_playing = true;
        } else if !want_music && self.music_playing {
            self.sink.stop_music();
            self.music_playing = false;
        }

        if phase != self.phase {
            self.phase = phase;
            match phase {
                GamePhase::GameOver => self.play_on(JINGLE_CHANNEL, SoundEffect::GameOver),
                GamePhase::Won => self.play_on(JINGLE_CHANNEL, SoundEffect::Victory),
                GamePhase::Playing => {}
            }
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
