// Per-player input state: bindings, assigned pad snapshot and axis edges

use super::action::{Action, AxisSign, Binding, PlayerSlot, AXIS_THRESHOLD};
use super::config::ActionMap;
use super::gamepad::GamepadState;
use std::collections::{HashMap, HashSet};
use winit::keyboard::KeyCode;

/// Threshold state of one (axis, sign) pair across two polls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisEdge {
    /// Past the threshold on the latest poll
    pub past: bool,
    /// Crossed the threshold on the latest poll
    pub just: bool,
}

impl AxisEdge {
    /// Feed the latest sample
    pub fn sample(&mut self, past: bool) {
        self.just = past && !self.past;
        self.past = past;
    }
}

/// Input state owned by a single player slot
#[derive(Debug)]
pub struct PlayerInput {
    slot: PlayerSlot,

    /// Binding table for this slot
    map: ActionMap,

    /// Snapshot of the slot's gamepad for the current tick
    pad: Option<GamepadState>,

    /// Edge state per (axis, sign), refreshed once per poll
    axis_edges: HashMap<(usize, AxisSign), AxisEdge>,

    /// Axis pairs the map listens to
    axis_keys: Vec<(usize, AxisSign)>,
}

impl PlayerInput {
    /// Create input state with the slot's default bindings
    pub fn new(slot: PlayerSlot) -> Self {
        Self::with_map(ActionMap::with_defaults(slot))
    }

    /// Create input state around an existing action map
    pub fn with_map(map: ActionMap) -> Self {
        let axis_keys = map.axis_bindings();
        Self {
            slot: map.slot(),
            map,
            pad: None,
            axis_edges: HashMap::new(),
            axis_keys,
        }
    }

    /// Get the slot
    pub fn slot(&self) -> PlayerSlot {
        self.slot
    }

    /// Get the binding table
    pub fn map(&self) -> &ActionMap {
        &self.map
    }

    /// Get a mutable binding table
    pub fn map_mut(&mut self) -> &mut ActionMap {
        &mut self.map
    }

    /// Check if a gamepad snapshot is present this tick
    pub fn has_gamepad(&self) -> bool {
        self.pad.is_some()
    }

    /// Store this tick's pad snapshot and update axis edges
    /// Call exactly once per tick, before any query
    pub(crate) fn refresh(&mut self, pad: Option<GamepadState>) {
        self.pad = pad;
        for &(index, sign) in &self.axis_keys {
            let past = self
                .pad
                .as_ref()
                .map(|pad| sign.is_past(pad.axis(index), AXIS_THRESHOLD))
                .unwrap_or(false);
            self.axis_edges.entry((index, sign)).or_default().sample(past);
        }
    }

    /// Edge state of an axis pair
    pub fn axis_edge(&self, index: usize, sign: AxisSign) -> AxisEdge {
        self.axis_edges
            .get(&(index, sign))
            .copied()
            .unwrap_or_default()
    }

    /// Level-triggered check across every binding of an action
    pub fn is_pressed(&self, action: Action, keys_down: &HashSet<KeyCode>) -> bool {
        self.map
            .keys(action)
            .iter()
            .any(|key| keys_down.contains(key))
            || self
                .map
                .gamepad_bindings(action)
                .iter()
                .any(|binding| self.binding_pressed(*binding, keys_down))
    }

    /// Edge-triggered check across every binding of an action
    ///
    /// A matching keyboard latch is consumed.
    pub fn is_just_pressed(&self, action: Action, just_down: &mut HashSet<KeyCode>) -> bool {
        if let Some(key) = self
            .map
            .keys(action)
            .iter()
            .find(|key| just_down.contains(*key))
        {
            just_down.remove(key);
            return true;
        }

        self.map
            .gamepad_bindings(action)
            .iter()
            .any(|binding| self.binding_just_pressed(*binding))
    }

    fn binding_pressed(&self, binding: Binding, keys_down: &HashSet<KeyCode>) -> bool {
        match binding {
            Binding::Keyboard(code) => keys_down.contains(&code),
            Binding::GamepadButton(index) => self
                .pad
                .as_ref()
                .map(|pad| pad.button(index).pressed)
                .unwrap_or(false),
            Binding::GamepadAxis { index, sign } => self
                .pad
                .as_ref()
                .map(|pad| sign.is_past(pad.axis(index), AXIS_THRESHOLD))
                .unwrap_or(false),
        }
    }

    fn binding_just_pressed(&self, binding: Binding) -> bool {
        match binding {
            // Keyboard latches are consumed by the caller
            Binding::Keyboard(_) => false,
            // Buttons: held at full travel counts as a fresh press
            Binding::GamepadButton(index) => self
                .pad
                .as_ref()
                .map(|pad| {
                    let button = pad.button(index);
                    button.pressed && button.value >= 1.0
                })
                .unwrap_or(false),
            Binding::GamepadAxis { index, sign } => self.axis_edge(index, sign).just,
        }
    }

    /// Drop the pad snapshot and all edge state
    pub fn reset(&mut self) {
        self.pad = None;
        self.axis_edges.clear();
    }
}
