// Per-slot action map: which physical inputs satisfy which action

use super::action::{self, Action, Binding, PlayerSlot};
use super::InputError;
use std::collections::HashMap;
use winit::keyboard::KeyCode;

/// Binding table for a single player slot
///
/// Keyboard bindings are configurable per action; gamepad bindings are
/// the fixed defaults and apply to whichever pad is assigned to the slot.
#[derive(Debug, Clone)]
pub struct ActionMap {
    /// Slot this table belongs to
    slot: PlayerSlot,

    /// Action -> keyboard keys
    keyboard: HashMap<Action, Vec<KeyCode>>,

    /// Action -> gamepad buttons and axes
    gamepad: HashMap<Action, Vec<Binding>>,
}

impl ActionMap {
    /// Create an empty action map with the fixed gamepad bindings only
    pub fn new(slot: PlayerSlot) -> Self {
        let mut gamepad: HashMap<Action, Vec<Binding>> = HashMap::new();
        for (action, binding) in action::default_gamepad_bindings() {
            gamepad.entry(action).or_default().push(binding);
        }

        Self {
            slot,
            keyboard: HashMap::new(),
            gamepad,
        }
    }

    /// Create an action map with the slot's default keyboard layout
    pub fn with_defaults(slot: PlayerSlot) -> Self {
        let mut map = Self::new(slot);
        map.reset_to_defaults();
        map
    }

    /// Get the slot this map belongs to
    pub fn slot(&self) -> PlayerSlot {
        self.slot
    }

    /// Replace the keyboard bindings of an action
    ///
    /// An empty key list leaves the action without keyboard bindings.
    pub fn set_keys(&mut self, action: Action, keys: &[KeyCode]) {
        if keys.is_empty() {
            self.keyboard.remove(&action);
            return;
        }

        let mut unique = Vec::with_capacity(keys.len());
        for key in keys {
            if !unique.contains(key) {
                unique.push(*key);
            }
        }
        self.keyboard.insert(action, unique);
    }

    /// Replace keyboard bindings for several actions at once
    pub fn configure_keyboard(&mut self, bindings: &[(Action, Vec<KeyCode>)]) {
        for (action, keys) in bindings {
            self.set_keys(*action, keys);
        }
    }

    /// Replace keyboard bindings using key names ("A", "LEFT", "SPACE")
    ///
    /// All names are resolved before anything is applied, so an unknown
    /// name leaves the map untouched.
    pub fn configure_keyboard_names(
        &mut self,
        bindings: &[(Action, Vec<&str>)],
    ) -> Result<(), InputError> {
        let mut resolved = Vec::with_capacity(bindings.len());
        for (action, names) in bindings {
            let keys = names
                .iter()
                .map(|name| {
                    action::key_code_from_name(name)
                        .ok_or_else(|| InputError::UnknownKey(name.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            resolved.push((*action, keys));
        }

        self.configure_keyboard(&resolved);
        Ok(())
    }

    /// Keyboard keys bound to an action
    pub fn keys(&self, action: Action) -> &[KeyCode] {
        self.keyboard.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Gamepad bindings for an action
    pub fn gamepad_bindings(&self, action: Action) -> &[Binding] {
        self.gamepad.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All bindings (keyboard first, then gamepad) for an action
    pub fn bindings(&self, action: Action) -> Vec<Binding> {
        self.keys(action)
            .iter()
            .map(|key| Binding::key(*key))
            .chain(self.gamepad_bindings(action).iter().copied())
            .collect()
    }

    /// Check if an action has any binding at all
    pub fn has_binding(&self, action: Action) -> bool {
        !self.keys(action).is_empty() || !self.gamepad_bindings(action).is_empty()
    }

    /// Every action bound to a keyboard key
    pub fn actions_for_key(&self, key: KeyCode) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|action| self.keys(*action).contains(&key))
            .collect()
    }

    /// Distinct (axis, sign) pairs referenced by any gamepad binding
    pub fn axis_bindings(&self) -> Vec<(usize, action::AxisSign)> {
        let mut pairs = Vec::new();
        for action in Action::ALL {
            for binding in self.gamepad_bindings(action) {
                if let Binding::GamepadAxis { index, sign } = binding {
                    if !pairs.contains(&(*index, *sign)) {
                        pairs.push((*index, *sign));
                    }
                }
            }
        }
        pairs
    }

    /// Remove every keyboard binding
    pub fn clear_keyboard(&mut self) {
        self.keyboard.clear();
    }

    /// Restore the slot's default keyboard layout
    pub fn reset_to_defaults(&mut self) {
        self.clear_keyboard();
        for (action, key) in action::default_keyboard_bindings(self.slot) {
            self.keyboard.entry(action).or_default().push(key);
        }
    }
}
