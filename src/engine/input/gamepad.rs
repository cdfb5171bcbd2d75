// Gamepad devices: snapshots, providers and slot assignment

use super::action::{axes, buttons, PlayerSlot};
use super::InputError;
use gilrs::{Axis, Button, EventType, Gilrs};
use std::collections::HashMap;

/// Number of buttons in the standard gamepad layout
pub const STANDARD_BUTTON_COUNT: usize = 17;

/// Number of axes in the standard gamepad layout
pub const STANDARD_AXIS_COUNT: usize = 4;

/// Identifier of a connected gamepad, stable while it stays connected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GamepadId(pub usize);

/// State of a single gamepad button
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ButtonState {
    pub pressed: bool,
    /// Analog value in 0.0..=1.0 (digital buttons report 0.0 or 1.0)
    pub value: f32,
}

impl ButtonState {
    /// A digital button held down
    pub fn down() -> Self {
        Self {
            pressed: true,
            value: 1.0,
        }
    }
}

/// Snapshot of one gamepad's buttons and axes for the current tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamepadState {
    pub buttons: Vec<ButtonState>,
    pub axes: Vec<f32>,
}

impl GamepadState {
    /// Create an all-released state with the standard layout
    pub fn standard() -> Self {
        Self {
            buttons: vec![ButtonState::default(); STANDARD_BUTTON_COUNT],
            axes: vec![0.0; STANDARD_AXIS_COUNT],
        }
    }

    /// Button state, released if the pad has no such button
    pub fn button(&self, index: usize) -> ButtonState {
        self.buttons.get(index).copied().unwrap_or_default()
    }

    /// Axis value, centered if the pad has no such axis
    pub fn axis(&self, index: usize) -> f32 {
        self.axes.get(index).copied().unwrap_or(0.0)
    }
}

/// Connection changes reported by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamepadEvent {
    Connected(GamepadId),
    Disconnected(GamepadId),
}

/// Source of gamepad connection events and per-tick snapshots
pub trait GamepadProvider {
    /// Drain connection events since the last call
    fn poll_events(&mut self) -> Vec<GamepadEvent>;

    /// Current snapshot of a connected pad
    fn state(&self, id: GamepadId) -> Option<GamepadState>;
}

/// Assigns connected gamepads to player slots in order of connection
#[derive(Debug, Default)]
pub struct GamepadSlots {
    slots: [Option<GamepadId>; 2],
}

impl GamepadSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a newly connected pad to the first free slot
    ///
    /// Returns the slot it landed in, or `None` if both slots are taken.
    /// A pad that is already assigned keeps its slot.
    pub fn connect(&mut self, id: GamepadId) -> Option<PlayerSlot> {
        if let Some(slot) = self.slot_of(id) {
            return Some(slot);
        }

        let slot = PlayerSlot::ALL
            .into_iter()
            .find(|slot| self.slots[slot.index()].is_none())?;
        self.slots[slot.index()] = Some(id);
        Some(slot)
    }

    /// Free the slot held by a pad, returning it
    pub fn disconnect(&mut self, id: GamepadId) -> Option<PlayerSlot> {
        let slot = self.slot_of(id)?;
        self.slots[slot.index()] = None;
        Some(slot)
    }

    /// Pad assigned to a slot
    pub fn gamepad_for(&self, slot: PlayerSlot) -> Option<GamepadId> {
        self.slots[slot.index()]
    }

    /// Slot a pad is assigned to
    pub fn slot_of(&self, id: GamepadId) -> Option<PlayerSlot> {
        PlayerSlot::ALL
            .into_iter()
            .find(|slot| self.slots[slot.index()] == Some(id))
    }

    /// Number of assigned pads
    pub fn assigned(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

/// In-memory gamepads, for keyboard-only setups, replays and tests
#[derive(Debug, Default)]
pub struct VirtualGamepads {
    pending: Vec<GamepadEvent>,
    pads: HashMap<GamepadId, GamepadState>,
}

impl VirtualGamepads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plug in a pad with the standard layout
    pub fn connect(&mut self, id: GamepadId) {
        self.pads.insert(id, GamepadState::standard());
        self.pending.push(GamepadEvent::Connected(id));
    }

    /// Unplug a pad
    pub fn disconnect(&mut self, id: GamepadId) {
        if self.pads.remove(&id).is_some() {
            self.pending.push(GamepadEvent::Disconnected(id));
        }
    }

    /// Set a button's state; ignored for unknown pads
    pub fn set_button(&mut self, id: GamepadId, index: usize, state: ButtonState) {
        if let Some(pad) = self.pads.get_mut(&id) {
            if pad.buttons.len() <= index {
                pad.buttons.resize(index + 1, ButtonState::default());
            }
            pad.buttons[index] = state;
        }
    }

    /// Press or release a digital button
    pub fn press_button(&mut self, id: GamepadId, index: usize, pressed: bool) {
        let state = if pressed {
            ButtonState::down()
        } else {
            ButtonState::default()
        };
        self.set_button(id, index, state);
    }

    /// Set an axis value; ignored for unknown pads
    pub fn set_axis(&mut self, id: GamepadId, index: usize, value: f32) {
        if let Some(pad) = self.pads.get_mut(&id) {
            if pad.axes.len() <= index {
                pad.axes.resize(index + 1, 0.0);
            }
            pad.axes[index] = value.clamp(-1.0, 1.0);
        }
    }
}

impl GamepadProvider for VirtualGamepads {
    fn poll_events(&mut self) -> Vec<GamepadEvent> {
        std::mem::take(&mut self.pending)
    }

    fn state(&self, id: GamepadId) -> Option<GamepadState> {
        self.pads.get(&id).cloned()
    }
}

/// Standard layout order of gilrs buttons
const BUTTON_LAYOUT: [(usize, Button); STANDARD_BUTTON_COUNT] = [
    (buttons::SOUTH, Button::South),
    (buttons::EAST, Button::East),
    (buttons::WEST, Button::West),
    (buttons::NORTH, Button::North),
    (4, Button::LeftTrigger),
    (5, Button::RightTrigger),
    (6, Button::LeftTrigger2),
    (7, Button::RightTrigger2),
    (8, Button::Select),
    (9, Button::Start),
    (10, Button::LeftThumb),
    (11, Button::RightThumb),
    (buttons::DPAD_UP, Button::DPadUp),
    (buttons::DPAD_DOWN, Button::DPadDown),
    (buttons::DPAD_LEFT, Button::DPadLeft),
    (buttons::DPAD_RIGHT, Button::DPadRight),
    (16, Button::Mode),
];

/// Physical gamepads through gilrs
pub struct GilrsGamepads {
    gilrs: Gilrs,
    ids: HashMap<GamepadId, gilrs::GamepadId>,
    pending: Vec<GamepadEvent>,
}

impl GilrsGamepads {
    /// Open the platform gamepad backend
    ///
    /// Pads that are already plugged in are reported as connection
    /// events on the first poll.
    pub fn new() -> Result<Self, InputError> {
        let gilrs = Gilrs::new().map_err(|e| InputError::GamepadUnavailable(e.to_string()))?;

        let mut ids = HashMap::new();
        let mut pending = Vec::new();
        for (raw_id, _gamepad) in gilrs.gamepads() {
            let id = GamepadId(usize::from(raw_id));
            ids.insert(id, raw_id);
            pending.push(GamepadEvent::Connected(id));
        }

        Ok(Self {
            gilrs,
            ids,
            pending,
        })
    }
}

impl GamepadProvider for GilrsGamepads {
    fn poll_events(&mut self) -> Vec<GamepadEvent> {
        let mut events = std::mem::take(&mut self.pending);

        while let Some(event) = self.gilrs.next_event() {
            let id = GamepadId(usize::from(event.id));
            match event.event {
                EventType::Connected => {
                    self.ids.insert(id, event.id);
                    events.push(GamepadEvent::Connected(id));
                }
                EventType::Disconnected => {
                    self.ids.remove(&id);
                    events.push(GamepadEvent::Disconnected(id));
                }
                // Button and axis state is read from the cached pad state
                _ => {}
            }
        }

        events
    }

    fn state(&self, id: GamepadId) -> Option<GamepadState> {
        let raw_id = *self.ids.get(&id)?;
        let gamepad = self.gilrs.connected_gamepad(raw_id)?;

        let mut state = GamepadState::standard();
        for (index, button) in BUTTON_LAYOUT {
            let pressed = gamepad.is_pressed(button);
            let value = gamepad
                .button_data(button)
                .map(|data| data.value())
                .unwrap_or(if pressed { 1.0 } else { 0.0 });
            state.buttons[index] = ButtonState { pressed, value };
        }

        // gilrs reports stick Y as positive-up; the standard layout is negative-up
        state.axes[axes::LEFT_X] = gamepad.value(Axis::LeftStickX);
        state.axes[axes::LEFT_Y] = -gamepad.value(Axis::LeftStickY);
        state.axes[2] = gamepad.value(Axis::RightStickX);
        state.axes[3] = -gamepad.value(Axis::RightStickY);

        Some(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_assignment_order() {
        let mut slots = GamepadSlots::new();
        let (a, b, c, d) = (GamepadId(10), GamepadId(11), GamepadId(12), GamepadId(13));

        assert_eq!(slots.connect(a), Some(PlayerSlot::One));
        assert_eq!(slots.connect(b), Some(PlayerSlot::Two));
        assert_eq!(slots.connect(c), None);
        assert_eq!(slots.assigned(), 2);

        assert_eq!(slots.disconnect(a), Some(PlayerSlot::One));
        assert_eq!(slots.connect(d), Some(PlayerSlot::One));
        assert_eq!(slots.gamepad_for(PlayerSlot::One), Some(d));
        assert_eq!(slots.gamepad_for(PlayerSlot::Two), Some(b));
    }

    #[test]
    fn test_reconnect_same_pad_keeps_slot() {
        let mut slots = GamepadSlots::new();
        slots.connect(GamepadId(1));
        slots.connect(GamepadId(2));
        assert_eq!(slots.connect(GamepadId(2)), Some(PlayerSlot::Two));
        assert_eq!(slots.assigned(), 2);
    }

    #[test]
    fn test_disconnect_unknown_pad() {
        let mut slots = GamepadSlots::new();
        assert_eq!(slots.disconnect(GamepadId(5)), None);
    }

    #[test]
    fn test_freed_second_slot_is_reused() {
        let mut slots = GamepadSlots::new();
        slots.connect(GamepadId(1));
        slots.connect(GamepadId(2));
        slots.disconnect(GamepadId(2));
        assert_eq!(slots.connect(GamepadId(3)), Some(PlayerSlot::Two));
    }

    #[test]
    fn test_state_defaults_out_of_range() {
        let state = GamepadState::default();
        assert_eq!(state.button(99), ButtonState::default());
        assert_eq!(state.axis(7), 0.0);
    }

    #[test]
    fn test_virtual_gamepads_events() {
        let mut pads = VirtualGamepads::new();
        pads.connect(GamepadId(0));
        pads.disconnect(GamepadId(0));
        pads.disconnect(GamepadId(0));

        assert_eq!(
            pads.poll_events(),
            vec![
                GamepadEvent::Connected(GamepadId(0)),
                GamepadEvent::Disconnected(GamepadId(0)),
            ]
        );
        assert!(pads.poll_events().is_empty());
    }

    #[test]
    fn test_virtual_gamepads_state() {
        let mut pads = VirtualGamepads::new();
        let id = GamepadId(0);
        pads.connect(id);
        pads.press_button(id, buttons::DPAD_LEFT, true);
        pads.set_axis(id, axes::LEFT_X, 3.0);

        let state = pads.state(id).unwrap();
        assert!(state.button(buttons::DPAD_LEFT).pressed);
        assert_eq!(state.button(buttons::DPAD_LEFT).value, 1.0);
        assert_eq!(state.axis(axes::LEFT_X), 1.0);

        assert!(pads.state(GamepadId(1)).is_none());
    }

    #[test]
    fn test_button_layout_is_complete() {
        let mut seen = [false; STANDARD_BUTTON_COUNT];
        for (index, _) in BUTTON_LAYOUT {
            seen[index] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
