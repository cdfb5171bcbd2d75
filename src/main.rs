use anyhow::Result;
use log::{info, warn};
use rusted_duo::engine::events::Topic;
use rusted_duo::engine::game_loop::GameLoop;
use rusted_duo::engine::input::{GamepadProvider, GilrsGamepads, PlayerSlot, VirtualGamepads};
use rusted_duo::game::combo::ComboSettings;
use rusted_duo::game::GameSession;
use winit::{
    event::{ElementState, Event, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

/// Keys that start a combo, per player
const COMBO_TRIGGERS: [(KeyCode, PlayerSlot); 2] = [
    (KeyCode::KeyQ, PlayerSlot::One),
    (KeyCode::Numpad0, PlayerSlot::Two),
];

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting Rusted Duo...");

    let mut gamepads: Box<dyn GamepadProvider> = match GilrsGamepads::new() {
        Ok(gamepads) => Box::new(gamepads),
        Err(e) => {
            warn!("{}, continuing with keyboard only", e);
            Box::new(VirtualGamepads::new())
        }
    };

    let mut session = GameSession::new(ComboSettings::default());
    let log_events = session
        .events()
        .subscribe(&[Topic::Life, Topic::Combo, Topic::Audio, Topic::Ui]);
    let mut game_loop = GameLoop::new();

    // Create event loop and window
    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Rusted Duo")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720))
        .with_resizable(true)
        .build(&event_loop)?;

    info!("Window created successfully");
    info!("Press Q (player 1) or Numpad 0 (player 2) to start a combo");

    // Main event loop
    event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                info!("Close requested, shutting down...");
                session.teardown();
                elwt.exit();
            }
            Event::WindowEvent {
                event: WindowEvent::KeyboardInput { event, .. },
                ..
            } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        if code == KeyCode::Escape {
                            game_loop.toggle_pause();
                        }
                        for (trigger, slot) in COMBO_TRIGGERS {
                            if code == trigger && !session.start_combo(slot) {
                                info!("Player {} combo already running", slot.number());
                            }
                        }
                    }
                }
                session.handle_keyboard_event(&event);
            }
            Event::WindowEvent {
                event: WindowEvent::RedrawRequested,
                ..
            } => {
                let ticks = game_loop.begin_frame();
                for _ in 0..ticks {
                    session.tick(game_loop.tick_duration(), gamepads.as_mut());
                }

                for event in session.events().drain(log_events) {
                    info!("{:?}", event);
                }
            }
            Event::AboutToWait => {
                // Request redraw on next frame
                window.request_redraw();
            }
            _ => {}
        }
    }).map_err(|e| anyhow::anyhow!("Event loop error: {}", e))?;

    Ok(())
}
