// Static key table for the combo keyboard channel

use crate::engine::input::Action;
use winit::keyboard::KeyCode;

/// Keys answering a combo prompt: arrows and WASD
pub const COMBO_KEYS: [(KeyCode, Action); 8] = [
    (KeyCode::ArrowLeft, Action::Left),
    (KeyCode::ArrowUp, Action::Up),
    (KeyCode::ArrowDown, Action::Down),
    (KeyCode::ArrowRight, Action::Right),
    (KeyCode::KeyA, Action::Left),
    (KeyCode::KeyW, Action::Up),
    (KeyCode::KeyS, Action::Down),
    (KeyCode::KeyD, Action::Right),
];

/// Direction a key answers, if any
pub fn direction_for_key(key: KeyCode) -> Option<Action> {
    COMBO_KEYS
        .iter()
        .find(|(code, _)| *code == key)
        .map(|(_, action)| *action)
}
