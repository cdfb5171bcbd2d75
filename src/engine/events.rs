// Typed publish/subscribe channel for gameplay events
//
// The bus is owned by the game session. Producers publish events, each
// subscriber drains the events of the topics it subscribed to.

use crate::engine::input::{Action, PlayerSlot};
use std::collections::HashMap;

/// Sound cues the audio collaborator plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    ComboSuccess,
    ComboFail,
}

/// Event topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Life,
    Combo,
    Audio,
    Ui,
}

/// Events emitted by gameplay systems
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A player's life counter changed
    LifeUpdated { player: PlayerSlot, lives: u8 },

    /// A combo attempt began
    ComboStarted { player: PlayerSlot, length: usize },

    /// A step is waiting for input
    ComboPrompt {
        player: PlayerSlot,
        step: usize,
        direction: Action,
    },

    /// A step was answered correctly
    ComboStepHit { player: PlayerSlot, step: usize },

    /// Every step was answered
    ComboCompleted { player: PlayerSlot },

    /// A step was missed or answered wrong (`received` is `None` on timeout)
    ComboFailed {
        player: PlayerSlot,
        step: usize,
        received: Option<Action>,
    },

    /// The player regained control after a combo
    ComboFinished { player: PlayerSlot, next_length: usize },

    /// Play a sound
    Sound(SoundCue),

    /// Show the "good rhythm" acknowledgement
    GoodRhythm { player: PlayerSlot },
}

impl GameEvent {
    /// Topic the event is delivered on
    pub fn topic(&self) -> Topic {
        match self {
            Self::LifeUpdated { .. } => Topic::Life,
            Self::ComboStarted { .. }
            | Self::ComboPrompt { .. }
            | Self::ComboStepHit { .. }
            | Self::ComboCompleted { .. }
            | Self::ComboFailed { .. }
            | Self::ComboFinished { .. } => Topic::Combo,
            Self::Sound(_) => Topic::Audio,
            Self::GoodRhythm { .. } => Topic::Ui,
        }
    }
}

/// Identifies a subscriber on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

#[derive(Debug)]
struct Subscriber {
    topics: Vec<Topic>,
    queue: Vec<GameEvent>,
}

/// Event bus owned by the session
#[derive(Debug, Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: HashMap<SubscriberId, Subscriber>,
    published: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one or more topics
    pub fn subscribe(&mut self, topics: &[Topic]) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.insert(
            id,
            Subscriber {
                topics: topics.to_vec(),
                queue: Vec::new(),
            },
        );
        id
    }

    /// Stop receiving events; queued events are dropped
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    /// Deliver an event to every subscriber of its topic
    pub fn publish(&mut self, event: GameEvent) {
        let topic = event.topic();
        self.published += 1;
        for subscriber in self.subscribers.values_mut() {
            if subscriber.topics.contains(&topic) {
                subscriber.queue.push(event.clone());
            }
        }
    }

    /// Take every queued event of a subscriber, in publish order
    pub fn drain(&mut self, id: SubscriberId) -> Vec<GameEvent> {
        self.subscribers
            .get_mut(&id)
            .map(|s| std::mem::take(&mut s.queue))
            .unwrap_or_default()
    }

    /// Total number of events published
    pub fn published(&self) -> u64 {
        self.published
    }
}
