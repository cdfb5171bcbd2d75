// Game action definitions, player slots and physical bindings

use winit::keyboard::KeyCode;

/// How far an axis must travel in the bound direction to count as pressed
pub const AXIS_THRESHOLD: f32 = 0.5;

/// Standard gamepad button indices
pub mod buttons {
    pub const SOUTH: usize = 0;
    pub const EAST: usize = 1;
    pub const WEST: usize = 2;
    pub const NORTH: usize = 3;
    pub const DPAD_UP: usize = 12;
    pub const DPAD_DOWN: usize = 13;
    pub const DPAD_LEFT: usize = 14;
    pub const DPAD_RIGHT: usize = 15;
}

/// Standard gamepad axis indices (negative Y is up)
pub mod axes {
    pub const LEFT_X: usize = 0;
    pub const LEFT_Y: usize = 1;
}

/// Logical, device-independent input actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Directions
    Up,
    Down,
    Left,
    Right,

    // Face buttons
    North,
    East,
    South,
    West,
}

impl Action {
    /// Every action, in declaration order
    pub const ALL: [Action; 8] = [
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
        Action::North,
        Action::East,
        Action::South,
        Action::West,
    ];

    /// The four directional actions used by the combo mini-game
    pub const CARDINALS: [Action; 4] = [Action::Left, Action::Up, Action::Down, Action::Right];

    /// Upper-case name used in string-based configuration
    pub fn name(&self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::North => "NORTH",
            Self::East => "EAST",
            Self::South => "SOUTH",
            Self::West => "WEST",
        }
    }

    /// Parse an action name, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|action| action.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Check if this is one of the four directions
    pub fn is_direction(&self) -> bool {
        matches!(self, Self::Up | Self::Down | Self::Left | Self::Right)
    }
}

/// One of the two local player slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    pub const ALL: [PlayerSlot; 2] = [PlayerSlot::One, PlayerSlot::Two];

    /// Zero-based index for slot-indexed storage
    pub fn index(&self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    /// One-based player number as shown to players
    pub fn number(&self) -> u8 {
        self.index() as u8 + 1
    }
}

/// Direction an axis binding listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisSign {
    Negative,
    Positive,
}

impl AxisSign {
    /// Check if `value` is past the threshold in this direction
    pub fn is_past(&self, value: f32, threshold: f32) -> bool {
        match self {
            Self::Negative => value < -threshold,
            Self::Positive => value > threshold,
        }
    }
}

/// A physical input that can satisfy an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    Keyboard(KeyCode),
    GamepadButton(usize),
    GamepadAxis { index: usize, sign: AxisSign },
}

impl Binding {
    /// Create a keyboard binding
    pub fn key(code: KeyCode) -> Self {
        Self::Keyboard(code)
    }

    /// Create a gamepad button binding
    pub fn button(index: usize) -> Self {
        Self::GamepadButton(index)
    }

    /// Create a gamepad axis binding
    pub fn axis(index: usize, sign: AxisSign) -> Self {
        Self::GamepadAxis { index, sign }
    }
}

/// Default keyboard bindings for a player slot
pub fn default_keyboard_bindings(slot: PlayerSlot) -> Vec<(Action, KeyCode)> {
    match slot {
        PlayerSlot::One => vec![
            (Action::Up, KeyCode::KeyW),
            (Action::Down, KeyCode::KeyS),
            (Action::Left, KeyCode::KeyA),
            (Action::Right, KeyCode::KeyD),
            (Action::North, KeyCode::KeyI),
            (Action::East, KeyCode::KeyL),
            (Action::South, KeyCode::KeyK),
            (Action::West, KeyCode::KeyJ),
        ],
        PlayerSlot::Two => vec![
            (Action::Up, KeyCode::ArrowUp),
            (Action::Down, KeyCode::ArrowDown),
            (Action::Left, KeyCode::ArrowLeft),
            (Action::Right, KeyCode::ArrowRight),
            (Action::North, KeyCode::Numpad8),
            (Action::East, KeyCode::Numpad6),
            (Action::South, KeyCode::Numpad2),
            (Action::West, KeyCode::Numpad4),
        ],
    }
}

/// Gamepad bindings shared by both slots (not reconfigurable)
pub fn default_gamepad_bindings() -> Vec<(Action, Binding)> {
    vec![
        (Action::Up, Binding::button(buttons::DPAD_UP)),
        (Action::Up, Binding::axis(axes::LEFT_Y, AxisSign::Negative)),
        (Action::Down, Binding::button(buttons::DPAD_DOWN)),
        (Action::Down, Binding::axis(axes::LEFT_Y, AxisSign::Positive)),
        (Action::Left, Binding::button(buttons::DPAD_LEFT)),
        (Action::Left, Binding::axis(axes::LEFT_X, AxisSign::Negative)),
        (Action::Right, Binding::button(buttons::DPAD_RIGHT)),
        (Action::Right, Binding::axis(axes::LEFT_X, AxisSign::Positive)),
        (Action::North, Binding::button(buttons::NORTH)),
        (Action::East, Binding::button(buttons::EAST)),
        (Action::South, Binding::button(buttons::SOUTH)),
        (Action::West, Binding::button(buttons::WEST)),
    ]
}

/// Resolve a human-readable key name ("A", "LEFT", "SPACE", "NUMPAD_4") to a key code
pub fn key_code_from_name(name: &str) -> Option<KeyCode> {
    let upper = name.trim().to_ascii_uppercase();

    if upper.len() == 1 {
        let c = upper.chars().next()?;
        return letter_or_digit(c);
    }

    let code = match upper.as_str() {
        "UP" => KeyCode::ArrowUp,
        "DOWN" => KeyCode::ArrowDown,
        "LEFT" => KeyCode::ArrowLeft,
        "RIGHT" => KeyCode::ArrowRight,
        "SPACE" => KeyCode::Space,
        "ENTER" => KeyCode::Enter,
        "TAB" => KeyCode::Tab,
        "ESC" | "ESCAPE" => KeyCode::Escape,
        "BACKSPACE" => KeyCode::Backspace,
        "SHIFT" => KeyCode::ShiftLeft,
        "CTRL" => KeyCode::ControlLeft,
        "ALT" => KeyCode::AltLeft,
        "ZERO" => KeyCode::Digit0,
        "ONE" => KeyCode::Digit1,
        "TWO" => KeyCode::Digit2,
        "THREE" => KeyCode::Digit3,
        "FOUR" => KeyCode::Digit4,
        "FIVE" => KeyCode::Digit5,
        "SIX" => KeyCode::Digit6,
        "SEVEN" => KeyCode::Digit7,
        "EIGHT" => KeyCode::Digit8,
        "NINE" => KeyCode::Digit9,
        other => {
            let digit = other
                .strip_prefix("NUMPAD_")
                .or_else(|| other.strip_prefix("NUMPAD"))?;
            return numpad(digit);
        }
    };

    Some(code)
}

fn letter_or_digit(c: char) -> Option<KeyCode> {
    const LETTERS: [KeyCode; 26] = [
        KeyCode::KeyA,
        KeyCode::KeyB,
        KeyCode::KeyC,
        KeyCode::KeyD,
        KeyCode::KeyE,
        KeyCode::KeyF,
        KeyCode::KeyG,
        KeyCode::KeyH,
        KeyCode::KeyI,
        KeyCode::KeyJ,
        KeyCode::KeyK,
        KeyCode::KeyL,
        KeyCode::KeyM,
        KeyCode::KeyN,
        KeyCode::KeyO,
        KeyCode::KeyP,
        KeyCode::KeyQ,
        KeyCode::KeyR,
        KeyCode::KeyS,
        KeyCode::KeyT,
        KeyCode::KeyU,
        KeyCode::KeyV,
        KeyCode::KeyW,
        KeyCode::KeyX,
        KeyCode::KeyY,
        KeyCode::KeyZ,
    ];
    const DIGITS: [KeyCode; 10] = [
        KeyCode::Digit0,
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
        KeyCode::Digit6,
        KeyCode::Digit7,
        KeyCode::Digit8,
        KeyCode::Digit9,
    ];

    match c {
        'A'..='Z' => Some(LETTERS[(c as u8 - b'A') as usize]),
        '0'..='9' => Some(DIGITS[(c as u8 - b'0') as usize]),
        _ => None,
    }
}

fn numpad(digit: &str) -> Option<KeyCode> {
    let code = match digit {
        "0" | "ZERO" => KeyCode::Numpad0,
        "1" | "ONE" => KeyCode::Numpad1,
        "2" | "TWO" => KeyCode::Numpad2,
        "3" | "THREE" => KeyCode::Numpad3,
        "4" | "FOUR" => KeyCode::Numpad4,
        "5" | "FIVE" => KeyCode::Numpad5,
        "6" | "SIX" => KeyCode::Numpad6,
        "7" | "SEVEN" => KeyCode::Numpad7,
        "8" | "EIGHT" => KeyCode::Numpad8,
        "9" | "NINE" => KeyCode::Numpad9,
        _ => return None,
    };
    Some(code)
}
