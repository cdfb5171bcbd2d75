// Two-player local input and combo core
//
// - `engine`: Input, events, timers and the fixed-timestep loop
// - `game`: Players, the combo mini-game and the session driving them

pub mod engine;
pub mod game;
