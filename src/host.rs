//! Host keyboard contract
//!
//! The host runtime owns the window and polls the keyboard; the core only
//! asks whether a key is currently held.

use crate::Direction;
use crate::sim::TickInput;

/// Keys the game listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Up,
    Down,
    Left,
    Right,
    Space,
    N,
    Q,
}

/// Per-frame keyboard state provided by the host
pub trait KeyState {
    fn is_down(&self, key: Key) -> bool;
}

/// Movement keys in priority order; the first held one wins
const MOVEMENT_KEYS: [(Key, Direction); 8] = [
    (Key::W, Direction::Up),
    (Key::Up, Direction::Up),
    (Key::S, Direction::Down),
    (Key::Down, Direction::Down),
    (Key::A, Direction::Left),
    (Key::Left, Direction::Left),
    (Key::D, Direction::Right),
    (Key::Right, Direction::Right),
];

/// Sample the keyboard into one tick's worth of input
pub fn read_input(keys: &impl KeyState) -> TickInput {
    TickInput {
        movement: MOVEMENT_KEYS
            .iter()
            .find(|(key, _)| keys.is_down(*key))
            .map(|&(_, dir)| dir),
        fire: keys.is_down(Key::Space),
        reset: keys.is_down(Key::N),
        quit: keys.is_down(Key::Q),
    }
}
