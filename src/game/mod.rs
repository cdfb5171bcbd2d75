// Gameplay
//
// - `player`: Lives, movement lock and movement intent
// - `combo`: Directional combo mini-game
// - `session`: Ties input, timers, players and combos together

pub mod combo;
pub mod player;
pub mod session;

pub use player::Player;
pub use session::GameSession;
