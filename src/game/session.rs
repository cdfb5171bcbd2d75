// Game session
//
// Owns everything a running scene needs: the input system, the event bus,
// the timer queue, both players and their combo engines. One `tick` runs
// the fixed update in this order:
//
// 1. Input refresh (gamepads, key latches)
// 2. Movement intent
// 3. Combo poll channel
// 4. Timers
//
// so an input accepted in a tick always beats a timeout due in that tick.

use crate::engine::events::EventBus;
use crate::engine::input::{GamepadProvider, InputSystem, PlayerSlot};
use crate::engine::scheduler::TimerQueue;
use crate::game::combo::{ComboContext, ComboEngine, ComboSettings, ComboTimer};
use crate::game::player::Player;
use log::{debug, info};
use std::time::Duration;
use winit::event::KeyEvent;
use winit::keyboard::KeyCode;

/// Two local players, their input and their combos
#[derive(Debug)]
pub struct GameSession {
    input: InputSystem,
    events: EventBus,
    timers: TimerQueue<ComboTimer>,
    players: [Player; 2],
    combos: [ComboEngine; 2],
}

impl GameSession {
    /// Create a session with default bindings and the given combo tuning
    pub fn new(settings: ComboSettings) -> Self {
        Self::build(
            ComboEngine::new(PlayerSlot::One, settings.clone()),
            ComboEngine::new(PlayerSlot::Two, settings),
        )
    }

    /// Create a session with reproducible combo sequences
    pub fn with_seed(settings: ComboSettings, seed: u64) -> Self {
        Self::build(
            ComboEngine::with_seed(PlayerSlot::One, settings.clone(), seed),
            ComboEngine::with_seed(PlayerSlot::Two, settings, seed.wrapping_add(1)),
        )
    }

    fn build(player1: ComboEngine, player2: ComboEngine) -> Self {
        Self {
            input: InputSystem::new(),
            events: EventBus::new(),
            timers: TimerQueue::new(),
            players: [Player::new(PlayerSlot::One), Player::new(PlayerSlot::Two)],
            combos: [player1, player2],
        }
    }

    /// Process a keyboard event from winit
    pub fn handle_keyboard_event(&mut self, event: &KeyEvent) {
        if let Some(code) = self.input.process_keyboard_event(event) {
            self.dispatch_key(code);
        }
    }

    /// Record a raw key transition
    ///
    /// Fresh presses also go to both players' combo keyboard channels.
    pub fn handle_key(&mut self, code: KeyCode, pressed: bool, repeat: bool) {
        if self.input.process_key(code, pressed, repeat) {
            self.dispatch_key(code);
        }
    }

    fn dispatch_key(&mut self, code: KeyCode) {
        for slot in PlayerSlot::ALL {
            let index = slot.index();
            let mut ctx = ComboContext {
                player: &mut self.players[index],
                timers: &mut self.timers,
                events: &mut self.events,
            };
            if self.combos[index].handle_key(code, &mut ctx) {
                debug!("Key {:?} answered player {} combo", code, slot.number());
            }
        }
    }

    /// Run one fixed update
    pub fn tick(&mut self, dt: Duration, gamepads: &mut dyn GamepadProvider) {
        self.input.update(gamepads);

        for player in &mut self.players {
            player.update_intent(&self.input);
        }

        for slot in PlayerSlot::ALL {
            let index = slot.index();
            let mut ctx = ComboContext {
                player: &mut self.players[index],
                timers: &mut self.timers,
                events: &mut self.events,
            };
            self.combos[index].poll(&mut self.input, &mut ctx);
        }

        self.timers.advance(dt);
        while let Some(timer) = self.timers.pop_due() {
            let index = timer.player.index();
            let mut ctx = ComboContext {
                player: &mut self.players[index],
                timers: &mut self.timers,
                events: &mut self.events,
            };
            self.combos[index].on_timer(timer, &mut ctx);
        }
    }

    /// Start a player's combo; false if one is already running
    pub fn start_combo(&mut self, slot: PlayerSlot) -> bool {
        let index = slot.index();
        let mut ctx = ComboContext {
            player: &mut self.players[index],
            timers: &mut self.timers,
            events: &mut self.events,
        };
        self.combos[index].start(&mut ctx)
    }

    /// Abort every combo and drop pending timers and input state
    pub fn teardown(&mut self) {
        for slot in PlayerSlot::ALL {
            let index = slot.index();
            let mut ctx = ComboContext {
                player: &mut self.players[index],
                timers: &mut self.timers,
                events: &mut self.events,
            };
            self.combos[index].abort(&mut ctx);
        }
        self.timers.clear();
        self.input.reset();
        info!("Session torn down");
    }

    pub fn input(&self) -> &InputSystem {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputSystem {
        &mut self.input
    }

    pub fn events(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn player(&self, slot: PlayerSlot) -> &Player {
        &self.players[slot.index()]
    }

    pub fn player_mut(&mut self, slot: PlayerSlot) -> &mut Player {
        &mut self.players[slot.index()]
    }

    pub fn combo(&self, slot: PlayerSlot) -> &ComboEngine {
        &self.combos[slot.index()]
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(ComboSettings::default())
    }
}
