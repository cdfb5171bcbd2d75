// Combo mini-game
//
// A player answers a random sequence of directions, one step at a time,
// within a fixed response window. Each correct step shortens the pause
// before the next one; a clean run heals the player and makes the next
// combo longer.
//
// - `engine`: Per-player combo capability and its state machine
// - `state`: Session, step and outcome types
// - `keymap`: Keys accepted by the keyboard channel

pub mod engine;
pub mod keymap;
pub mod state;

pub use engine::ComboEngine;
pub use state::{ComboOutcome, ComboSession, ComboState, StepState};

use crate::engine::events::EventBus;
use crate::engine::input::PlayerSlot;
use crate::engine::scheduler::Scheduler;
use crate::game::player::Player;
use std::time::Duration;

/// Combo tuning
#[derive(Debug, Clone, PartialEq)]
pub struct ComboSettings {
    /// Time to answer a presented step
    pub response_window: Duration,
    /// Pause after a completed combo before control returns
    pub grace_delay: Duration,
    /// Pause between steps at the start (and after a failure)
    pub initial_delay: Duration,
    /// Shortest pause between steps
    pub min_delay: Duration,
    /// Pause reduction per correct step
    pub speed_boost: Duration,
    /// Sequence length of the first combo
    pub start_length: usize,
    /// Longest sequence
    pub max_length: usize,
}

/// Default combo tuning
pub const DEFAULT_SETTINGS: ComboSettings = ComboSettings {
    response_window: Duration::from_millis(1800),
    grace_delay: Duration::from_millis(1200),
    initial_delay: Duration::from_millis(800),
    min_delay: Duration::from_millis(300),
    speed_boost: Duration::from_millis(100),
    start_length: 4,
    max_length: 6,
};

impl Default for ComboSettings {
    fn default() -> Self {
        DEFAULT_SETTINGS
    }
}

impl ComboSettings {
    /// Fix inverted delay bounds and out-of-range lengths
    pub fn sanitized(mut self) -> Self {
        if self.min_delay > self.initial_delay {
            self.min_delay = self.initial_delay;
        }
        self.max_length = self.max_length.max(1);
        self.start_length = self.start_length.clamp(1, self.max_length);
        self
    }
}

/// What a combo timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboTimerKind {
    /// The response window of a step ran out
    ResponseWindow { step: usize },
    /// Present the next step
    NextStep,
    /// The post-completion grace delay ended
    Grace,
}

/// Timer payload routed back to the owning player's engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboTimer {
    pub player: PlayerSlot,
    /// Session the timer belongs to; stale sessions are ignored
    pub session: u64,
    pub kind: ComboTimerKind,
}

/// Collaborators a combo engine acts on
pub struct ComboContext<'a> {
    pub player: &'a mut Player,
    pub timers: &'a mut dyn Scheduler<ComboTimer>,
    pub events: &'a mut EventBus,
}
