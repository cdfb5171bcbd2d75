// Per-player combo capability
//
// One engine per player, created once. It owns the difficulty (sequence
// length and inter-step delay) that carries over between attempts, and
// at most one live `ComboSession`.
//
// Two channels can answer a step: the keyboard key-down channel
// (`handle_key`) and the per-tick poll of `InputSystem::is_just_pressed`
// (`poll`). Whichever resolves the step first disarms both.

use super::keymap;
use super::state::{ComboOutcome, ComboSession, ComboState, StepState};
use super::{ComboContext, ComboSettings, ComboTimer, ComboTimerKind};
use crate::engine::events::{GameEvent, SoundCue};
use crate::engine::input::{Action, InputSystem, PlayerSlot};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::time::Duration;
use winit::keyboard::KeyCode;

/// Poll channel priority when several directions go down in one tick
const POLL_ORDER: [Action; 4] = [Action::Left, Action::Right, Action::Up, Action::Down];

/// Combo mini-game for one player
#[derive(Debug)]
pub struct ComboEngine {
    slot: PlayerSlot,
    settings: ComboSettings,

    /// Length of the next generated sequence
    length: usize,

    /// Pause before the next step, in `[min_delay, initial_delay]`
    delay: Duration,

    /// Live attempt, if any
    session: Option<ComboSession>,

    next_session_id: u64,
    last_outcome: Option<ComboOutcome>,
    rng: StdRng,
}

impl ComboEngine {
    /// Create an engine with a randomly seeded sequence generator
    pub fn new(slot: PlayerSlot, settings: ComboSettings) -> Self {
        Self::with_rng(slot, settings, StdRng::from_entropy())
    }

    /// Create an engine with a reproducible sequence generator
    pub fn with_seed(slot: PlayerSlot, settings: ComboSettings, seed: u64) -> Self {
        Self::with_rng(slot, settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(slot: PlayerSlot, settings: ComboSettings, rng: StdRng) -> Self {
        let settings = settings.sanitized();
        Self {
            slot,
            length: settings.start_length,
            delay: settings.initial_delay,
            settings,
            session: None,
            next_session_id: 1,
            last_outcome: None,
            rng,
        }
    }

    pub fn slot(&self) -> PlayerSlot {
        self.slot
    }

    pub fn settings(&self) -> &ComboSettings {
        &self.settings
    }

    /// Check if an attempt is in progress (including the grace delay)
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Current phase
    pub fn state(&self) -> ComboState {
        self.session
            .as_ref()
            .map(|s| s.state)
            .unwrap_or(ComboState::Idle)
    }

    /// Length of the next generated sequence
    pub fn length(&self) -> usize {
        self.length
    }

    /// Current pause between steps
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Sequence of the live attempt
    pub fn sequence(&self) -> &[Action] {
        self.session
            .as_ref()
            .map(|s| s.sequence.as_slice())
            .unwrap_or(&[])
    }

    /// Index of the step being answered
    pub fn current_index(&self) -> usize {
        self.session.as_ref().map(|s| s.current_index).unwrap_or(0)
    }

    /// Direction the presented step wants
    pub fn expected(&self) -> Option<Action> {
        self.session.as_ref().and_then(|s| s.expected)
    }

    /// Check if a step is on screen and still takes input
    pub fn awaiting_input(&self) -> bool {
        self.session
            .as_ref()
            .and_then(|s| s.step.as_ref())
            .map(|step| !step.is_resolved())
            .unwrap_or(false)
    }

    /// How the last attempt ended
    pub fn last_outcome(&self) -> Option<ComboOutcome> {
        self.last_outcome
    }

    /// Build a sequence of the current length from shuffled rounds of the
    /// four directions
    pub fn generate_sequence(&mut self) -> Vec<Action> {
        let mut sequence = Vec::with_capacity(self.length);
        while sequence.len() < self.length {
            let mut round = Action::CARDINALS;
            round.shuffle(&mut self.rng);
            let needed = self.length - sequence.len();
            sequence.extend(round.into_iter().take(needed));
        }
        sequence
    }

    /// Start a combo with a generated sequence
    ///
    /// Returns false (and changes nothing) if an attempt is already active.
    pub fn start(&mut self, ctx: &mut ComboContext<'_>) -> bool {
        if self.is_active() {
            debug!("Player {} combo already active", self.slot.number());
            return false;
        }
        let sequence = self.generate_sequence();
        self.begin(sequence, ctx)
    }

    /// Start a combo with a given sequence
    pub fn begin(&mut self, sequence: Vec<Action>, ctx: &mut ComboContext<'_>) -> bool {
        if self.is_active() {
            debug!("Player {} combo already active", self.slot.number());
            return false;
        }

        let id = self.next_session_id;
        self.next_session_id += 1;

        info!(
            "Player {} combo started: {:?}",
            self.slot.number(),
            sequence
        );
        let length = sequence.len();
        self.session = Some(ComboSession::new(id, sequence));

        ctx.player.freeze();
        ctx.events.publish(GameEvent::ComboStarted {
            player: self.slot,
            length,
        });

        self.show_next_arrow(ctx);
        true
    }

    /// Present the step at the current index, or complete the combo
    pub fn show_next_arrow(&mut self, ctx: &mut ComboContext<'_>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.state != ComboState::Running || session.step.is_some() {
            return;
        }
        if session.is_finished() {
            self.complete(ctx);
            return;
        }

        let index = session.current_index;
        let direction = session.sequence[index];
        session.expected = Some(direction);

        let timeout = ctx.timers.schedule_once(
            self.settings.response_window,
            ComboTimer {
                player: self.slot,
                session: session.id,
                kind: ComboTimerKind::ResponseWindow { step: index },
            },
        );
        session.step = Some(StepState::armed(index, timeout));

        debug!(
            "Player {} combo step {} wants {:?}",
            self.slot.number(),
            index,
            direction
        );
        ctx.events.publish(GameEvent::ComboPrompt {
            player: self.slot,
            step: index,
            direction,
        });
    }

    /// Keyboard channel: a raw key went down
    ///
    /// Returns true if the key resolved the presented step.
    pub fn handle_key(&mut self, key: KeyCode, ctx: &mut ComboContext<'_>) -> bool {
        let Some(direction) = keymap::direction_for_key(key) else {
            return false;
        };
        let armed = self
            .session
            .as_ref()
            .and_then(|s| s.step.as_ref())
            .map(|step| step.accepts_keyboard())
            .unwrap_or(false);
        if !armed {
            return false;
        }
        self.process_input(direction, ctx)
    }

    /// Poll channel: check this tick's just-pressed directions
    ///
    /// Must run after `InputSystem::update` for the tick. Returns true if
    /// a direction resolved the presented step.
    pub fn poll(&mut self, input: &mut InputSystem, ctx: &mut ComboContext<'_>) -> bool {
        let armed = self
            .session
            .as_ref()
            .and_then(|s| s.step.as_ref())
            .map(|step| step.accepts_poll())
            .unwrap_or(false);
        if !armed {
            return false;
        }

        let pressed = POLL_ORDER
            .into_iter()
            .find(|direction| input.is_just_pressed(*direction, self.slot));
        match pressed {
            Some(direction) => self.process_input(direction, ctx),
            None => false,
        }
    }

    /// Resolve the presented step with a direction
    ///
    /// The first resolving input disarms every channel of the step; any
    /// later input for the same step is discarded.
    fn process_input(&mut self, direction: Action, ctx: &mut ComboContext<'_>) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let Some(step) = session.step.as_mut() else {
            return false;
        };
        if step.is_resolved() {
            debug!(
                "Player {} late input {:?} discarded",
                self.slot.number(),
                direction
            );
            return false;
        }

        if let Some(timeout) = step.resolve() {
            ctx.timers.cancel(timeout);
        }
        let index = step.index;

        if session.expected != Some(direction) {
            self.fail(Some(direction), ctx);
            return true;
        }

        session.current_index += 1;
        session.step = None;
        session.expected = None;
        let session_id = session.id;

        self.delay = self
            .delay
            .saturating_sub(self.settings.speed_boost)
            .max(self.settings.min_delay)
            .min(self.settings.initial_delay);

        ctx.events.publish(GameEvent::ComboStepHit {
            player: self.slot,
            step: index,
        });
        ctx.timers.schedule_once(
            self.delay,
            ComboTimer {
                player: self.slot,
                session: session_id,
                kind: ComboTimerKind::NextStep,
            },
        );
        true
    }

    /// Handle one of this engine's timers
    ///
    /// Timers of a finished or replaced session are ignored.
    pub fn on_timer(&mut self, timer: ComboTimer, ctx: &mut ComboContext<'_>) {
        let Some(session) = self.session.as_mut() else {
            debug!("Player {} stale combo timer {:?}", self.slot.number(), timer.kind);
            return;
        };
        if timer.player != self.slot || timer.session != session.id {
            debug!("Player {} stale combo timer {:?}", self.slot.number(), timer.kind);
            return;
        }

        match timer.kind {
            ComboTimerKind::ResponseWindow { step } => {
                // An input accepted earlier in the tick wins
                if !session.step_open(step) {
                    return;
                }
                if let Some(step) = session.step.as_mut() {
                    step.resolve();
                }
                self.fail(None, ctx);
            }
            ComboTimerKind::NextStep => {
                if session.state == ComboState::Running && session.step.is_none() {
                    self.show_next_arrow(ctx);
                }
            }
            ComboTimerKind::Grace => {
                if session.state == ComboState::Completed {
                    self.finish(ctx);
                }
            }
        }
    }

    /// Tear the live attempt down without an outcome (scene teardown)
    pub fn abort(&mut self, ctx: &mut ComboContext<'_>) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        if let Some(timeout) = session.step.as_mut().and_then(|step| step.resolve()) {
            ctx.timers.cancel(timeout);
        }

        ctx.player.unfreeze();
        self.last_outcome = Some(ComboOutcome::Aborted);
        info!("Player {} combo aborted", self.slot.number());
    }

    fn complete(&mut self, ctx: &mut ComboContext<'_>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.state = ComboState::Completed;
        session.expected = None;
        let session_id = session.id;

        info!("Player {} combo completed", self.slot.number());
        ctx.events.publish(GameEvent::ComboCompleted { player: self.slot });
        ctx.events.publish(GameEvent::Sound(SoundCue::ComboSuccess));
        if let Some(lives) = ctx.player.gain_life() {
            ctx.events.publish(GameEvent::LifeUpdated {
                player: self.slot,
                lives,
            });
        }
        ctx.events.publish(GameEvent::GoodRhythm { player: self.slot });

        ctx.timers.schedule_once(
            self.settings.grace_delay,
            ComboTimer {
                player: self.slot,
                session: session_id,
                kind: ComboTimerKind::Grace,
            },
        );
        self.last_outcome = Some(ComboOutcome::Completed);
    }

    fn finish(&mut self, ctx: &mut ComboContext<'_>) {
        self.session = None;
        self.length = (self.length + 1).min(self.settings.max_length);
        ctx.player.unfreeze();

        debug!(
            "Player {} regains control, next combo length {}",
            self.slot.number(),
            self.length
        );
        ctx.events.publish(GameEvent::ComboFinished {
            player: self.slot,
            next_length: self.length,
        });
    }

    fn fail(&mut self, received: Option<Action>, ctx: &mut ComboContext<'_>) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        session.state = ComboState::Failed;
        if let Some(timeout) = session.step.as_mut().and_then(|step| step.resolve()) {
            ctx.timers.cancel(timeout);
        }
        let step = session.current_index;

        match received {
            Some(direction) => info!(
                "Player {} combo failed at step {}: expected {:?}, got {:?}",
                self.slot.number(),
                step,
                session.expected,
                direction
            ),
            None => info!(
                "Player {} combo failed at step {}: timed out",
                self.slot.number(),
                step
            ),
        }

        ctx.events.publish(GameEvent::ComboFailed {
            player: self.slot,
            step,
            received,
        });
        ctx.events.publish(GameEvent::Sound(SoundCue::ComboFail));

        self.delay = self.settings.initial_delay;
        ctx.player.unfreeze();
        self.last_outcome = Some(ComboOutcome::Failed { step, received });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::events::{EventBus, Topic};
    use crate::engine::input::gamepad::VirtualGamepads;
    use crate::engine::input::GamepadId;
    use crate::engine::input::action::buttons;
    use crate::engine::scheduler::TimerQueue;
    use crate::game::combo::DEFAULT_SETTINGS;
    use crate::game::player::Player;

    const SEQUENCE: [Action; 4] = [Action::Left, Action::Up, Action::Down, Action::Right];

    struct Rig {
        engine: ComboEngine,
        player: Player,
        timers: TimerQueue<ComboTimer>,
        events: EventBus,
        input: InputSystem,
        pads: VirtualGamepads,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                engine: ComboEngine::with_seed(PlayerSlot::One, DEFAULT_SETTINGS, 7),
                player: Player::with_lives(PlayerSlot::One, 2),
                timers: TimerQueue::new(),
                events: EventBus::new(),
                input: InputSystem::new(),
                pads: VirtualGamepads::new(),
            }
        }

        fn begin(&mut self, sequence: &[Action]) -> bool {
            let mut ctx = ComboContext {
                player: &mut self.player,
                timers: &mut self.timers,
                events: &mut self.events,
            };
            self.engine.begin(sequence.to_vec(), &mut ctx)
        }

        fn start(&mut self) -> bool {
            let mut ctx = ComboContext {
                player: &mut self.player,
                timers: &mut self.timers,
                events: &mut self.events,
            };
            self.engine.start(&mut ctx)
        }

        fn key(&mut self, key: KeyCode) -> bool {
            self.input.process_key(key, true, false);
            let mut ctx = ComboContext {
                player: &mut self.player,
                timers: &mut self.timers,
                events: &mut self.events,
            };
            let resolved = self.engine.handle_key(key, &mut ctx);
            self.input.process_key(key, false, false);
            resolved
        }

        fn abort(&mut self) {
            let mut ctx = ComboContext {
                player: &mut self.player,
                timers: &mut self.timers,
                events: &mut self.events,
            };
            self.engine.abort(&mut ctx);
        }

        /// One tick: input refresh, poll channel, then timers
        fn tick(&mut self, dt: Duration) {
            self.input.update(&mut self.pads);
            let mut ctx = ComboContext {
                player: &mut self.player,
                timers: &mut self.timers,
                events: &mut self.events,
            };
            self.engine.poll(&mut self.input, &mut ctx);

            self.timers.advance(dt);
            while let Some(timer) = self.timers.pop_due() {
                let mut ctx = ComboContext {
                    player: &mut self.player,
                    timers: &mut self.timers,
                    events: &mut self.events,
                };
                self.engine.on_timer(timer, &mut ctx);
            }
        }

        /// Let `total` time pass in 10ms ticks
        fn wait(&mut self, total: Duration) {
            let step = Duration::from_millis(10);
            let mut elapsed = Duration::ZERO;
            while elapsed < total {
                self.tick(step);
                elapsed += step;
            }
        }

        fn answer_with_keys(&mut self) {
            while let Some(expected) = self.engine.expected() {
                let key = match expected {
                    Action::Left => KeyCode::ArrowLeft,
                    Action::Up => KeyCode::ArrowUp,
                    Action::Down => KeyCode::ArrowDown,
                    _ => KeyCode::ArrowRight,
                };
                assert!(self.key(key));
                self.wait(self.engine.settings().initial_delay);
            }
        }
    }

    #[test]
    fn test_start_locks_movement_and_presents_first_step() {
        let mut rig = Rig::new();
        let events = rig.events.subscribe(&[Topic::Combo]);
        assert!(rig.begin(&SEQUENCE));

        assert!(rig.engine.is_active());
        assert_eq!(rig.engine.state(), ComboState::Running);
        assert!(!rig.player.can_move);
        assert_eq!(rig.engine.current_index(), 0);
        assert_eq!(rig.engine.expected(), Some(Action::Left));
        assert!(rig.engine.awaiting_input());

        let events = rig.events.drain(events);
        assert_eq!(
            events,
            vec![
                GameEvent::ComboStarted {
                    player: PlayerSlot::One,
                    length: 4
                },
                GameEvent::ComboPrompt {
                    player: PlayerSlot::One,
                    step: 0,
                    direction: Action::Left
                },
            ]
        );
    }

    #[test]
    fn test_generated_sequence_uses_each_direction_once_at_length_four() {
        let mut rig = Rig::new();
        let sequence = rig.engine.generate_sequence();
        assert_eq!(sequence.len(), 4);
        for action in Action::CARDINALS {
            assert_eq!(sequence.iter().filter(|a| **a == action).count(), 1);
        }
    }

    #[test]
    fn test_start_generates_current_length() {
        let mut rig = Rig::new();
        assert!(rig.start());
        assert_eq!(rig.engine.sequence().len(), 4);
        assert!(rig.engine.sequence().iter().all(|a| a.is_direction()));
    }

    #[test]
    fn test_completion_heals_and_grows_length() {
        let mut rig = Rig::new();
        let life = rig.events.subscribe(&[Topic::Life]);
        rig.begin(&SEQUENCE);

        rig.answer_with_keys();

        assert_eq!(rig.engine.state(), ComboState::Completed);
        assert_eq!(rig.engine.last_outcome(), Some(ComboOutcome::Completed));
        assert_eq!(rig.player.lives, 3);
        assert_eq!(
            rig.events.drain(life),
            vec![GameEvent::LifeUpdated {
                player: PlayerSlot::One,
                lives: 3
            }]
        );

        // Still locked during the grace delay
        assert!(!rig.player.can_move);
        assert!(rig.engine.is_active());
        assert_eq!(rig.engine.length(), 4);

        rig.wait(DEFAULT_SETTINGS.grace_delay);
        assert!(rig.player.can_move);
        assert!(!rig.engine.is_active());
        assert_eq!(rig.engine.state(), ComboState::Idle);
        assert_eq!(rig.engine.length(), 5);
    }

    #[test]
    fn test_completion_at_full_lives_emits_no_life_event() {
        let mut rig = Rig::new();
        rig.player = Player::new(PlayerSlot::One);
        let life = rig.events.subscribe(&[Topic::Life]);
        rig.begin(&SEQUENCE);
        rig.answer_with_keys();

        assert_eq!(rig.player.lives, 3);
        assert!(rig.events.drain(life).is_empty());
    }

    #[test]
    fn test_length_capped_at_six() {
        let mut rig = Rig::new();
        for _ in 0..5 {
            rig.start();
            rig.answer_with_keys();
            rig.wait(DEFAULT_SETTINGS.grace_delay);
        }
        assert_eq!(rig.engine.length(), 6);
    }

    #[test]
    fn test_timeout_fails_and_restores_movement() {
        let mut rig = Rig::new();
        let combo = rig.events.subscribe(&[Topic::Combo]);
        rig.begin(&SEQUENCE);
        rig.events.drain(combo);

        rig.wait(Duration::from_millis(1790));
        assert!(rig.engine.is_active());

        rig.wait(Duration::from_millis(10));
        assert!(!rig.engine.is_active());
        assert!(rig.player.can_move);
        assert_eq!(
            rig.engine.last_outcome(),
            Some(ComboOutcome::Failed {
                step: 0,
                received: None
            })
        );
        assert_eq!(
            rig.events.drain(combo),
            vec![GameEvent::ComboFailed {
                player: PlayerSlot::One,
                step: 0,
                received: None
            }]
        );

        // Failure does not grow the next combo
        assert_eq!(rig.engine.length(), 4);
        rig.start();
        assert_eq!(rig.engine.sequence().len(), 4);
    }

    #[test]
    fn test_wrong_direction_fails_immediately() {
        let mut rig = Rig::new();
        rig.begin(&SEQUENCE);
        assert!(rig.key(KeyCode::ArrowRight));

        assert!(!rig.engine.is_active());
        assert!(rig.player.can_move);
        assert_eq!(
            rig.engine.last_outcome(),
            Some(ComboOutcome::Failed {
                step: 0,
                received: Some(Action::Right)
            })
        );
        // The response window was cancelled with the step
        assert!(rig.timers.is_empty());
    }

    #[test]
    fn test_delay_tightens_and_resets_on_failure() {
        let mut rig = Rig::new();
        rig.begin(&SEQUENCE);
        let initial = DEFAULT_SETTINGS.initial_delay;

        rig.key(KeyCode::ArrowLeft);
        assert_eq!(rig.engine.delay(), initial - DEFAULT_SETTINGS.speed_boost);

        rig.wait(initial);
        rig.key(KeyCode::ArrowLeft);
        assert_eq!(rig.engine.delay(), initial);
    }

    #[test]
    fn test_delay_floors_at_min() {
        let mut rig = Rig::new();
        rig.engine = ComboEngine::with_seed(
            PlayerSlot::One,
            ComboSettings {
                start_length: 6,
                speed_boost: Duration::from_millis(400),
                ..DEFAULT_SETTINGS
            },
            1,
        );
        rig.start();
        rig.answer_with_keys();
        assert_eq!(rig.engine.delay(), DEFAULT_SETTINGS.min_delay);
    }

    #[test]
    fn test_restart_guard() {
        let mut rig = Rig::new();
        let combo = rig.events.subscribe(&[Topic::Combo]);
        rig.begin(&SEQUENCE);
        rig.events.drain(combo);
        let timers = rig.timers.len();

        assert!(!rig.start());
        assert!(!rig.begin(&[Action::Up]));
        assert_eq!(rig.engine.sequence(), &SEQUENCE);
        assert_eq!(rig.engine.expected(), Some(Action::Left));
        assert_eq!(rig.timers.len(), timers);
        assert!(rig.events.drain(combo).is_empty());
    }

    #[test]
    fn test_restart_guard_during_grace() {
        let mut rig = Rig::new();
        rig.begin(&SEQUENCE);
        rig.answer_with_keys();
        assert_eq!(rig.engine.state(), ComboState::Completed);
        assert!(!rig.start());
    }

    #[test]
    fn test_no_input_between_steps() {
        let mut rig = Rig::new();
        rig.begin(&SEQUENCE);
        rig.key(KeyCode::ArrowLeft);

        // Step 1 is not presented yet; the key must not count
        assert!(!rig.engine.awaiting_input());
        assert!(!rig.key(KeyCode::ArrowUp));
        assert_eq!(rig.engine.current_index(), 1);
        assert!(rig.engine.is_active());
    }

    #[test]
    fn test_unmapped_key_is_ignored() {
        let mut rig = Rig::new();
        rig.begin(&SEQUENCE);
        assert!(!rig.key(KeyCode::Space));
        assert!(rig.engine.awaiting_input());
    }

    #[test]
    fn test_poll_channel_with_gamepad() {
        let mut rig = Rig::new();
        let pad = GamepadId(0);
        rig.pads.connect(pad);
        rig.begin(&SEQUENCE);

        rig.pads.press_button(pad, buttons::DPAD_LEFT, true);
        rig.tick(Duration::from_millis(10));
        assert_eq!(rig.engine.current_index(), 1);
        rig.pads.press_button(pad, buttons::DPAD_LEFT, false);

        rig.wait(DEFAULT_SETTINGS.initial_delay);
        assert_eq!(rig.engine.expected(), Some(Action::Up));
        rig.pads.press_button(pad, buttons::DPAD_UP, true);
        rig.tick(Duration::from_millis(10));
        assert_eq!(rig.engine.current_index(), 2);
    }

    #[test]
    fn test_poll_priority_left_first() {
        let mut rig = Rig::new();
        let pad = GamepadId(0);
        rig.pads.connect(pad);
        rig.begin(&[Action::Right, Action::Up]);

        // Left and right in the same tick: left wins, which is wrong here
        rig.pads.press_button(pad, buttons::DPAD_LEFT, true);
        rig.pads.press_button(pad, buttons::DPAD_RIGHT, true);
        rig.tick(Duration::from_millis(10));

        assert_eq!(
            rig.engine.last_outcome(),
            Some(ComboOutcome::Failed {
                step: 0,
                received: Some(Action::Left)
            })
        );
    }

    #[test]
    fn test_double_channel_race_advances_once() {
        let mut rig = Rig::new();
        let pad = GamepadId(0);
        rig.pads.connect(pad);
        rig.begin(&SEQUENCE);

        // Keyboard event and gamepad press land in the same tick
        rig.pads.press_button(pad, buttons::DPAD_LEFT, true);
        assert!(rig.key(KeyCode::KeyA));
        rig.tick(Duration::from_millis(10));

        assert_eq!(rig.engine.current_index(), 1);
        assert!(rig.engine.is_active());

        rig.pads.press_button(pad, buttons::DPAD_LEFT, false);
        rig.wait(DEFAULT_SETTINGS.initial_delay);
        assert_eq!(rig.engine.current_index(), 1);
        assert_eq!(rig.engine.expected(), Some(SEQUENCE[1]));
    }

    #[test]
    fn test_input_wins_over_timeout_in_same_tick() {
        let mut rig = Rig::new();
        let pad = GamepadId(0);
        rig.pads.connect(pad);
        rig.begin(&SEQUENCE);

        rig.wait(Duration::from_millis(1790));
        assert!(rig.engine.awaiting_input());

        // The response window expires during this tick, after the poll
        rig.pads.press_button(pad, buttons::DPAD_LEFT, true);
        rig.tick(Duration::from_millis(10));

        assert!(rig.engine.is_active());
        assert_eq!(rig.engine.current_index(), 1);
        assert_eq!(rig.engine.last_outcome(), None);
    }

    #[test]
    fn test_stale_timer_is_ignored() {
        let mut rig = Rig::new();
        rig.begin(&SEQUENCE);
        let stale = ComboTimer {
            player: PlayerSlot::One,
            session: 999,
            kind: ComboTimerKind::ResponseWindow { step: 0 },
        };
        let mut ctx = ComboContext {
            player: &mut rig.player,
            timers: &mut rig.timers,
            events: &mut rig.events,
        };
        rig.engine.on_timer(stale, &mut ctx);

        assert!(rig.engine.awaiting_input());
        assert_eq!(rig.engine.last_outcome(), None);
    }

    #[test]
    fn test_abort_disarms_and_unlocks() {
        let mut rig = Rig::new();
        rig.begin(&SEQUENCE);
        rig.abort();

        assert!(!rig.engine.is_active());
        assert!(rig.player.can_move);
        assert_eq!(rig.engine.last_outcome(), Some(ComboOutcome::Aborted));
        assert!(!rig.key(KeyCode::ArrowLeft));

        // Leftover timers of the aborted session do nothing
        rig.wait(Duration::from_millis(3000));
        assert_eq!(rig.engine.last_outcome(), Some(ComboOutcome::Aborted));
        assert!(rig.player.can_move);
    }

    #[test]
    fn test_abort_during_inter_step_delay() {
        let mut rig = Rig::new();
        rig.begin(&SEQUENCE);
        rig.key(KeyCode::ArrowLeft);
        rig.abort();

        rig.wait(DEFAULT_SETTINGS.initial_delay);
        assert!(!rig.engine.is_active());
        assert_eq!(rig.engine.expected(), None);
    }

    #[test]
    fn test_empty_sequence_completes_immediately() {
        let mut rig = Rig::new();
        rig.begin(&[]);
        assert_eq!(rig.engine.state(), ComboState::Completed);
    }
}
