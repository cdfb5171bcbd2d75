// Combo state machine types

use crate::engine::input::Action;
use crate::engine::scheduler::TimerHandle;

/// Phase of a player's combo capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComboState {
    /// No attempt in progress
    Idle,
    /// Steps are being presented and answered
    Running,
    /// Every step answered, waiting out the grace delay
    Completed,
    /// A step was missed (transient, the engine returns to idle at once)
    Failed,
}

impl Default for ComboState {
    fn default() -> Self {
        Self::Idle
    }
}

impl ComboState {
    /// Check if the player is locked into the combo
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Completed)
    }
}

/// How the last attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboOutcome {
    Completed,
    /// `received` is `None` when the response window ran out
    Failed {
        step: usize,
        received: Option<Action>,
    },
    /// Torn down from outside (scene change, player removed)
    Aborted,
}

/// Input channels armed for one presented step
///
/// The step accepts exactly one resolving input. Resolving disarms every
/// channel and hands back the response window timer for cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepState {
    /// Index into the sequence
    pub index: usize,
    /// One-shot keyboard key-down channel
    keyboard_armed: bool,
    /// Per-tick `is_just_pressed` channel
    poll_armed: bool,
    /// An input or the timeout has been accepted
    resolved: bool,
    /// Response window timer
    timeout: Option<TimerHandle>,
}

impl StepState {
    /// Arm both channels for a freshly presented step
    pub fn armed(index: usize, timeout: TimerHandle) -> Self {
        Self {
            index,
            keyboard_armed: true,
            poll_armed: true,
            resolved: false,
            timeout: Some(timeout),
        }
    }

    pub fn accepts_keyboard(&self) -> bool {
        !self.resolved && self.keyboard_armed
    }

    pub fn accepts_poll(&self) -> bool {
        !self.resolved && self.poll_armed
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Accept the resolving input, disarming every channel at once
    ///
    /// Returns the response window timer the first time only.
    pub fn resolve(&mut self) -> Option<TimerHandle> {
        self.resolved = true;
        self.keyboard_armed = false;
        self.poll_armed = false;
        self.timeout.take()
    }
}

/// One attempt at the sequence
#[derive(Debug, Clone)]
pub struct ComboSession {
    /// Distinguishes this attempt's timers from older ones
    pub id: u64,
    pub sequence: Vec<Action>,
    /// Always in `0..=sequence.len()`
    pub current_index: usize,
    /// Direction the presented step wants
    pub expected: Option<Action>,
    pub state: ComboState,
    /// Present while a step is on screen; `None` between steps
    pub step: Option<StepState>,
}

impl ComboSession {
    pub fn new(id: u64, sequence: Vec<Action>) -> Self {
        Self {
            id,
            sequence,
            current_index: 0,
            expected: None,
            state: ComboState::Running,
            step: None,
        }
    }

    /// Check if every step has been answered
    pub fn is_finished(&self) -> bool {
        self.current_index >= self.sequence.len()
    }

    /// Check if the presented step still takes input
    pub fn step_open(&self, index: usize) -> bool {
        self.step
            .as_ref()
            .map(|step| step.index == index && !step.is_resolved())
            .unwrap_or(false)
    }
}
