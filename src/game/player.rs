// Player entity: lives, movement lock and movement intent

use crate::engine::input::{InputSystem, PlayerSlot};

/// Lives a player starts with and can never exceed
pub const MAX_LIVES: u8 = 3;

/// A local player as seen by the core
#[derive(Debug, Clone)]
pub struct Player {
    /// Slot controlling this player
    pub slot: PlayerSlot,

    /// Current life count
    pub lives: u8,

    /// Life cap
    pub max_lives: u8,

    /// Free movement allowed (false while a combo is running)
    pub can_move: bool,

    /// Horizontal movement intent (-1, 0 or 1)
    pub input_horizontal: f32,

    /// Vertical movement intent (-1, 0 or 1, up positive)
    pub input_vertical: f32,
}

impl Player {
    /// Create a player with full lives
    pub fn new(slot: PlayerSlot) -> Self {
        Self {
            slot,
            lives: MAX_LIVES,
            max_lives: MAX_LIVES,
            can_move: true,
            input_horizontal: 0.0,
            input_vertical: 0.0,
        }
    }

    /// Create a player with a given life count (clamped to the cap)
    pub fn with_lives(slot: PlayerSlot, lives: u8) -> Self {
        Self {
            lives: lives.min(MAX_LIVES),
            ..Self::new(slot)
        }
    }

    /// Add a life if below the cap; returns the new count when it changed
    pub fn gain_life(&mut self) -> Option<u8> {
        if self.lives >= self.max_lives {
            return None;
        }
        self.lives += 1;
        Some(self.lives)
    }

    /// Remove a life; returns the new count when it changed
    pub fn lose_life(&mut self) -> Option<u8> {
        if self.lives == 0 {
            return None;
        }
        self.lives -= 1;
        Some(self.lives)
    }

    /// Check if the player has no lives left
    pub fn is_out(&self) -> bool {
        self.lives == 0
    }

    /// Freeze free movement and drop any held intent
    pub fn freeze(&mut self) {
        self.can_move = false;
        self.input_horizontal = 0.0;
        self.input_vertical = 0.0;
    }

    /// Allow free movement again
    pub fn unfreeze(&mut self) {
        self.can_move = true;
    }

    /// Read movement intent for this tick; ignored while frozen
    pub fn update_intent(&mut self, input: &InputSystem) {
        if !self.can_move {
            self.input_horizontal = 0.0;
            self.input_vertical = 0.0;
            return;
        }

        let (horizontal, vertical) = input.direction(self.slot);
        self.input_horizontal = horizontal;
        self.input_vertical = vertical;
    }
}
