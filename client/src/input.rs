//! Keyboard sampling for the local player

use macroquad::prelude::*;
use shared::{Horizontal, InputState};

/// Turns held keys into a movement direction. Opposing keys cancel out.
pub fn direction(left: bool, right: bool) -> Horizontal {
    match (left, right) {
        (true, false) => Horizontal::Left,
        (false, true) => Horizontal::Right,
        _ => Horizontal::Neutral,
    }
}

/// Samples the keyboard once per frame
#[derive(Debug, Default)]
pub struct InputManager;

impl InputManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Movement follows held keys; jump fires only on the frame the key
    /// goes down.
    pub fn update(&self) -> InputState {
        let left = is_key_down(KeyCode::A) || is_key_down(KeyCode::Left);
        let right = is_key_down(KeyCode::D) || is_key_down(KeyCode::Right);
        let jump = is_key_pressed(KeyCode::Space)
            || is_key_pressed(KeyCode::W)
            || is_key_pressed(KeyCode::Up);

        InputState::new(direction(left, right), jump)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_keys() {
        assert_eq!(direction(true, false), Horizontal::Left);
        assert_eq!(direction(false, true), Horizontal::Right);
        assert_eq!(direction(false, false), Horizontal::Neutral);
        assert_eq!(direction(true, true), Horizontal::Neutral);
    }
}
