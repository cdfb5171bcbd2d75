// Engine modules: input, events, timers and the tick loop

pub mod events;
pub mod game_loop;
pub mod input;
pub mod scheduler;
