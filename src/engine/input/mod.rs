// Input handling system
//
// This module turns keyboard and gamepad input into per-player action
// queries for the two local player slots.
//
// ## Architecture
//
// - `action`: Actions, player slots, physical bindings and default layouts
// - `config`: Per-slot action map (keyboard remapping, fixed gamepad bindings)
// - `gamepad`: Gamepad snapshots, providers (gilrs, virtual) and slot assignment
// - `player`: Per-slot device state and axis edge bookkeeping
// - `manager`: The input system coordinating everything
//
// ## Usage Example
//
// ```rust
// use rusted_duo::engine::input::{Action, InputSystem, PlayerSlot, VirtualGamepads};
//
// let mut input = InputSystem::new();
// let mut pads = VirtualGamepads::new();
//
// // In your event loop, forward keyboard events
// input.process_keyboard_event(&key_event);
//
// // Once per tick, before any query
// input.update(&mut pads);
//
// if input.is_just_pressed(Action::Left, PlayerSlot::One) {
//     // Player 1 just pressed left
// }
// ```

pub mod action;
pub mod config;
pub mod gamepad;
pub mod manager;
pub mod player;

// Re-export commonly used types
pub use action::{Action, AxisSign, Binding, PlayerSlot};
pub use config::ActionMap;
pub use gamepad::{
    ButtonState, GamepadEvent, GamepadId, GamepadProvider, GamepadState, GilrsGamepads,
    VirtualGamepads,
};
pub use manager::InputSystem;
pub use player::PlayerInput;

/// Input configuration and device errors
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Unknown key name: {0}")]
    UnknownKey(String),

    #[error("Unknown action name: {0}")]
    UnknownAction(String),

    #[error("Gamepad backend unavailable: {0}")]
    GamepadUnavailable(String),
}

/// Parse "ACTION=KEY,KEY" entries into keyboard bindings
///
/// Used for bindings supplied as text, e.g. `LEFT=A,LEFT;RIGHT=D`.
pub fn parse_keyboard_bindings(text: &str) -> Result<Vec<(Action, Vec<&str>)>, InputError> {
    let mut bindings = Vec::new();
    for entry in text.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, keys) = entry.split_once('=').unwrap_or((entry, ""));
        let action =
            Action::from_name(name).ok_or_else(|| InputError::UnknownAction(name.to_string()))?;
        let keys = keys
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .collect();
        bindings.push((action, keys));
    }
    Ok(bindings)
}
