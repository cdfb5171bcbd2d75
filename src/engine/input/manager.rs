// Input system - per-player action queries over keyboard and gamepads

use super::action::{Action, PlayerSlot};
use super::config::ActionMap;
use super::gamepad::{GamepadEvent, GamepadId, GamepadProvider, GamepadSlots};
use super::player::PlayerInput;
use super::InputError;
use log::{debug, info, warn};
use std::collections::HashSet;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Owns both player slots and the physical device state feeding them
///
/// Call [`InputSystem::update`] exactly once per tick, after the tick's
/// keyboard events were processed and before any query.
#[derive(Debug)]
pub struct InputSystem {
    /// Input state per slot
    players: [PlayerInput; 2],

    /// Gamepad -> slot assignment
    gamepads: GamepadSlots,

    /// Keys currently held
    keys_down: HashSet<KeyCode>,

    /// Key-down events received since the last update
    pending_just_down: HashSet<KeyCode>,

    /// Key-down latches for the current tick, consumed on read
    just_down: HashSet<KeyCode>,

    /// Number of updates so far
    tick: u64,
}

impl InputSystem {
    /// Create an input system with the default bindings for both slots
    pub fn new() -> Self {
        Self::with_maps(
            ActionMap::with_defaults(PlayerSlot::One),
            ActionMap::with_defaults(PlayerSlot::Two),
        )
    }

    /// Create an input system with no keyboard bindings
    pub fn unbound() -> Self {
        Self::with_maps(
            ActionMap::new(PlayerSlot::One),
            ActionMap::new(PlayerSlot::Two),
        )
    }

    /// Create an input system from explicit action maps
    pub fn with_maps(player1: ActionMap, player2: ActionMap) -> Self {
        Self {
            players: [PlayerInput::with_map(player1), PlayerInput::with_map(player2)],
            gamepads: GamepadSlots::new(),
            keys_down: HashSet::new(),
            pending_just_down: HashSet::new(),
            just_down: HashSet::new(),
            tick: 0,
        }
    }

    /// Replace keyboard bindings for a slot's actions
    pub fn configure_keyboard(&mut self, bindings: &[(Action, Vec<KeyCode>)], slot: PlayerSlot) {
        self.player_mut(slot).map_mut().configure_keyboard(bindings);
        debug!(
            "Player {} keyboard reconfigured for {} action(s)",
            slot.number(),
            bindings.len()
        );
    }

    /// Replace keyboard bindings for a slot's actions using key names
    pub fn configure_keyboard_names(
        &mut self,
        bindings: &[(Action, Vec<&str>)],
        slot: PlayerSlot,
    ) -> Result<(), InputError> {
        self.player_mut(slot)
            .map_mut()
            .configure_keyboard_names(bindings)?;
        debug!(
            "Player {} keyboard reconfigured for {} action(s)",
            slot.number(),
            bindings.len()
        );
        Ok(())
    }

    /// Process a keyboard event from winit
    ///
    /// Returns the key code when the event is a fresh (non-repeat) press.
    pub fn process_keyboard_event(&mut self, event: &KeyEvent) -> Option<KeyCode> {
        let PhysicalKey::Code(code) = event.physical_key else {
            return None;
        };
        let pressed = event.state == ElementState::Pressed;
        self.process_key(code, pressed, event.repeat)
            .then_some(code)
    }

    /// Record a raw key transition
    ///
    /// Returns true when this was a fresh press.
    pub fn process_key(&mut self, code: KeyCode, pressed: bool, repeat: bool) -> bool {
        if !pressed {
            self.keys_down.remove(&code);
            return false;
        }

        // Only register if not a key repeat
        if repeat || !self.keys_down.insert(code) {
            return false;
        }
        self.pending_just_down.insert(code);
        true
    }

    /// Refresh device state for a new tick
    pub fn update(&mut self, provider: &mut dyn GamepadProvider) {
        for event in provider.poll_events() {
            match event {
                GamepadEvent::Connected(id) => match self.gamepads.connect(id) {
                    Some(slot) => info!("Gamepad {:?} connected as player {}", id, slot.number()),
                    None => warn!("Gamepad {:?} connected but both player slots are taken", id),
                },
                GamepadEvent::Disconnected(id) => {
                    if let Some(slot) = self.gamepads.disconnect(id) {
                        info!("Gamepad {:?} (player {}) disconnected", id, slot.number());
                    }
                }
            }
        }

        for slot in PlayerSlot::ALL {
            let pad = self
                .gamepads
                .gamepad_for(slot)
                .and_then(|id| provider.state(id));
            self.players[slot.index()].refresh(pad);
        }

        // Presses since the last tick become this tick's latches
        self.just_down = std::mem::take(&mut self.pending_just_down);
        self.tick += 1;
    }

    /// Check if any binding of an action is currently held
    pub fn is_pressed(&self, action: Action, slot: PlayerSlot) -> bool {
        self.player(slot).is_pressed(action, &self.keys_down)
    }

    /// Check if an action went down this tick
    ///
    /// Keyboard latches are consumed: a second query for the same key in
    /// the same tick returns false.
    pub fn is_just_pressed(&mut self, action: Action, slot: PlayerSlot) -> bool {
        self.players[slot.index()].is_just_pressed(action, &mut self.just_down)
    }

    /// Check if any player is holding an action
    pub fn any_player_pressed(&self, action: Action) -> bool {
        PlayerSlot::ALL
            .into_iter()
            .any(|slot| self.is_pressed(action, slot))
    }

    /// Check if any player pressed an action this tick
    pub fn any_player_just_pressed(&mut self, action: Action) -> bool {
        PlayerSlot::ALL
            .into_iter()
            .any(|slot| self.is_just_pressed(action, slot))
    }

    /// Get directional input as digital values (-1.0, 0.0 or 1.0)
    /// Returns (horizontal, vertical), with up positive
    pub fn direction(&self, slot: PlayerSlot) -> (f32, f32) {
        let axis = |negative: Action, positive: Action| -> f32 {
            match (self.is_pressed(negative, slot), self.is_pressed(positive, slot)) {
                (true, false) => -1.0,
                (false, true) => 1.0,
                _ => 0.0,
            }
        };

        (
            axis(Action::Left, Action::Right),
            axis(Action::Down, Action::Up),
        )
    }

    /// Get the binding table of a slot
    pub fn action_map(&self, slot: PlayerSlot) -> &ActionMap {
        self.player(slot).map()
    }

    /// Get the gamepad assigned to a slot
    pub fn gamepad_for(&self, slot: PlayerSlot) -> Option<GamepadId> {
        self.gamepads.gamepad_for(slot)
    }

    /// Number of gamepads assigned to a slot
    pub fn connected_gamepads(&self) -> usize {
        self.gamepads.assigned()
    }

    /// Number of updates so far
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Drop all held keys, latches and edge state
    pub fn reset(&mut self) {
        self.keys_down.clear();
        self.pending_just_down.clear();
        self.just_down.clear();
        for player in &mut self.players {
            player.reset();
        }
    }

    fn player(&self, slot: PlayerSlot) -> &PlayerInput {
        &self.players[slot.index()]
    }

    fn player_mut(&mut self, slot: PlayerSlot) -> &mut PlayerInput {
        &mut self.players[slot.index()]
    }
}

impl Default for InputSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::action::{axes, buttons};
    use crate::engine::input::gamepad::VirtualGamepads;
    use approx::assert_relative_eq;

    fn press(input: &mut InputSystem, code: KeyCode) {
        input.process_key(code, true, false);
    }

    fn release(input: &mut InputSystem, code: KeyCode) {
        input.process_key(code, false, false);
    }

    #[test]
    fn test_keyboard_press_and_release() {
        let mut input = InputSystem::new();
        let mut pads = VirtualGamepads::new();

        press(&mut input, KeyCode::KeyA);
        input.update(&mut pads);
        assert!(input.is_pressed(Action::Left, PlayerSlot::One));
        assert!(!input.is_pressed(Action::Left, PlayerSlot::Two));

        release(&mut input, KeyCode::KeyA);
        input.update(&mut pads);
        assert!(!input.is_pressed(Action::Left, PlayerSlot::One));
    }

    #[test]
    fn test_keyboard_just_pressed_lasts_one_tick() {
        let mut input = InputSystem::new();
        let mut pads = VirtualGamepads::new();

        press(&mut input, KeyCode::ArrowUp);
        input.update(&mut pads);
        assert!(input.is_just_pressed(Action::Up, PlayerSlot::Two));

        press(&mut input, KeyCode::ArrowDown);
        input.update(&mut pads);
        assert!(!input.is_just_pressed(Action::Up, PlayerSlot::Two));
        assert!(input.is_pressed(Action::Up, PlayerSlot::Two));
    }

    #[test]
    fn test_keyboard_just_pressed_is_consumed() {
        let mut input = InputSystem::new();
        let mut pads = VirtualGamepads::new();

        press(&mut input, KeyCode::KeyD);
        input.update(&mut pads);
        assert!(input.is_just_pressed(Action::Right, PlayerSlot::One));
        assert!(!input.is_just_pressed(Action::Right, PlayerSlot::One));
    }

    #[test]
    fn test_tap_between_ticks_is_not_lost() {
        let mut input = InputSystem::new();
        let mut pads = VirtualGamepads::new();

        press(&mut input, KeyCode::KeyW);
        release(&mut input, KeyCode::KeyW);
        input.update(&mut pads);
        assert!(!input.is_pressed(Action::Up, PlayerSlot::One));
        assert!(input.is_just_pressed(Action::Up, PlayerSlot::One));
    }

    #[test]
    fn test_key_repeat_ignored() {
        let mut input = InputSystem::new();
        assert!(input.process_key(KeyCode::KeyA, true, false));
        assert!(!input.process_key(KeyCode::KeyA, true, true));
        assert!(!input.process_key(KeyCode::KeyA, true, false));
    }

    #[test]
    fn test_binding_independence() {
        let mut input = InputSystem::new();
        let p2_before: Vec<_> = Action::ALL
            .iter()
            .map(|a| input.action_map(PlayerSlot::Two).keys(*a).to_vec())
            .collect();

        input.configure_keyboard(&[(Action::Left, vec![KeyCode::KeyX])], PlayerSlot::One);

        let p2_after: Vec<_> = Action::ALL
            .iter()
            .map(|a| input.action_map(PlayerSlot::Two).keys(*a).to_vec())
            .collect();
        assert_eq!(p2_before, p2_after);
        assert_eq!(
            input.action_map(PlayerSlot::One).keys(Action::Left),
            &[KeyCode::KeyX]
        );

        input.configure_keyboard(&[(Action::Left, vec![KeyCode::KeyZ])], PlayerSlot::Two);
        assert_eq!(
            input.action_map(PlayerSlot::One).keys(Action::Left),
            &[KeyCode::KeyX]
        );
    }

    #[test]
    fn test_configure_keyboard_names() {
        let mut input = InputSystem::unbound();
        input
            .configure_keyboard_names(&[(Action::East, vec!["SPACE"])], PlayerSlot::Two)
            .unwrap();
        let mut pads = VirtualGamepads::new();

        press(&mut input, KeyCode::Space);
        input.update(&mut pads);
        assert!(input.is_pressed(Action::East, PlayerSlot::Two));
        assert!(!input.is_pressed(Action::East, PlayerSlot::One));

        assert!(input
            .configure_keyboard_names(&[(Action::East, vec!["???"])], PlayerSlot::Two)
            .is_err());
    }

    #[test]
    fn test_unconfigured_queries_are_false() {
        let mut input = InputSystem::unbound();
        let mut pads = VirtualGamepads::new();
        press(&mut input, KeyCode::KeyA);
        input.update(&mut pads);

        for slot in PlayerSlot::ALL {
            for action in Action::ALL {
                assert!(!input.is_pressed(action, slot));
                assert!(!input.is_just_pressed(action, slot));
            }
        }
    }

    #[test]
    fn test_axis_edge_semantics() {
        let mut input = InputSystem::new();
        let mut pads = VirtualGamepads::new();
        let pad = GamepadId(0);
        pads.connect(pad);

        let samples = [0.0, 0.7, 0.7, 0.0, 0.7];
        let mut just = Vec::new();
        for value in samples {
            pads.set_axis(pad, axes::LEFT_X, value);
            input.update(&mut pads);
            just.push(input.is_just_pressed(Action::Right, PlayerSlot::One));
        }

        assert_eq!(just, vec![false, true, false, false, true]);
    }

    #[test]
    fn test_axis_edges_are_per_slot() {
        let mut input = InputSystem::new();
        let mut pads = VirtualGamepads::new();
        pads.connect(GamepadId(0));
        pads.connect(GamepadId(1));

        pads.set_axis(GamepadId(0), axes::LEFT_X, 0.9);
        input.update(&mut pads);
        assert!(input.is_just_pressed(Action::Right, PlayerSlot::One));
        assert!(!input.is_just_pressed(Action::Right, PlayerSlot::Two));

        pads.set_axis(GamepadId(1), axes::LEFT_X, 0.9);
        input.update(&mut pads);
        assert!(!input.is_just_pressed(Action::Right, PlayerSlot::One));
        assert!(input.is_just_pressed(Action::Right, PlayerSlot::Two));
    }

    #[test]
    fn test_axis_edge_not_consumed_by_repeat_queries() {
        let mut input = InputSystem::new();
        let mut pads = VirtualGamepads::new();
        pads.connect(GamepadId(0));
        pads.set_axis(GamepadId(0), axes::LEFT_Y, -0.8);
        input.update(&mut pads);

        // Several consumers may query the same tick
        assert!(input.is_just_pressed(Action::Up, PlayerSlot::One));
        assert!(input.is_just_pressed(Action::Up, PlayerSlot::One));
    }

    #[test]
    fn test_gamepad_slot_assignment() {
        let mut input = InputSystem::new();
        let mut pads = VirtualGamepads::new();
        let (a, b, c, d) = (GamepadId(1), GamepadId(2), GamepadId(3), GamepadId(4));

        pads.connect(a);
        pads.connect(b);
        pads.connect(c);
        input.update(&mut pads);
        assert_eq!(input.gamepad_for(PlayerSlot::One), Some(a));
        assert_eq!(input.gamepad_for(PlayerSlot::Two), Some(b));
        assert_eq!(input.connected_gamepads(), 2);

        pads.disconnect(a);
        input.update(&mut pads);
        assert_eq!(input.gamepad_for(PlayerSlot::One), None);

        pads.connect(d);
        input.update(&mut pads);
        assert_eq!(input.gamepad_for(PlayerSlot::One), Some(d));
    }

    #[test]
    fn test_ignored_pad_does_not_drive_players() {
        let mut input = InputSystem::unbound();
        let mut pads = VirtualGamepads::new();
        for id in 0..3 {
            pads.connect(GamepadId(id));
        }
        pads.press_button(GamepadId(2), buttons::DPAD_LEFT, true);
        input.update(&mut pads);

        assert!(!input.any_player_pressed(Action::Left));
    }

    #[test]
    fn test_gamepad_button_pressed_and_just_pressed() {
        let mut input = InputSystem::unbound();
        let mut pads = VirtualGamepads::new();
        pads.connect(GamepadId(7));
        pads.press_button(GamepadId(7), buttons::NORTH, true);
        input.update(&mut pads);

        assert!(input.is_pressed(Action::North, PlayerSlot::One));
        assert!(input.is_just_pressed(Action::North, PlayerSlot::One));
        assert!(!input.is_pressed(Action::North, PlayerSlot::Two));
    }

    #[test]
    fn test_direction() {
        let mut input = InputSystem::new();
        let mut pads = VirtualGamepads::new();

        input.update(&mut pads);
        let (h, v) = input.direction(PlayerSlot::One);
        assert_relative_eq!(h, 0.0);
        assert_relative_eq!(v, 0.0);

        press(&mut input, KeyCode::KeyD);
        press(&mut input, KeyCode::KeyS);
        input.update(&mut pads);
        let (h, v) = input.direction(PlayerSlot::One);
        assert_relative_eq!(h, 1.0);
        assert_relative_eq!(v, -1.0);

        // Opposite directions cancel out
        press(&mut input, KeyCode::KeyA);
        input.update(&mut pads);
        let (h, _) = input.direction(PlayerSlot::One);
        assert_relative_eq!(h, 0.0);
    }

    #[test]
    fn test_any_player_queries() {
        let mut input = InputSystem::new();
        let mut pads = VirtualGamepads::new();
        press(&mut input, KeyCode::ArrowLeft);
        input.update(&mut pads);

        assert!(input.any_player_pressed(Action::Left));
        assert!(!input.any_player_pressed(Action::Right));
        assert!(input.any_player_just_pressed(Action::Left));
    }

    #[test]
    fn test_reset() {
        let mut input = InputSystem::new();
        let mut pads = VirtualGamepads::new();
        press(&mut input, KeyCode::KeyA);
        input.update(&mut pads);
        input.reset();

        assert!(!input.is_pressed(Action::Left, PlayerSlot::One));
        assert!(!input.is_just_pressed(Action::Left, PlayerSlot::One));
        assert_eq!(input.tick(), 1);
    }
}
