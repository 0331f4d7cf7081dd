//! Keyboard key identities and modifier state carried by `keydown` events.

/// Keyboard modifiers that may be held during a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyboardModifiers {
    /// The Shift key is held.
    pub shift: bool,
    /// The Control key is held.
    pub control: bool,
    /// The Alt key is held (Option on macOS).
    pub alt: bool,
    /// The Meta/Super key is held (Windows key, Cmd on macOS).
    pub meta: bool,
}

impl KeyboardModifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// Shift modifier only.
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// Control modifier only.
    pub const CTRL: Self = Self {
        control: true,
        ..Self::NONE
    };

    /// Alt modifier only.
    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };

    /// Meta modifier only.
    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };

    /// Check if any modifier is pressed.
    pub fn any(&self) -> bool {
        self.shift || self.control || self.alt || self.meta
    }

    /// Check if no modifiers are pressed.
    pub fn none(&self) -> bool {
        !self.any()
    }
}

/// Logical key identity.
///
/// Only keys a selection control reacts to get their own variant; everything
/// else that produces text arrives as [`Key::Character`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    Enter,
    Escape,
    Space,
    Tab,
    Backspace,
    /// A printable character.
    Character(char),
    /// A key without a logical mapping; carries the platform scan code.
    Unknown(u32),
}

impl Key {
    /// Map a legacy DOM `keyCode` to a key.
    pub fn from_key_code(code: u32) -> Self {
        match code {
            8 => Key::Backspace,
            9 => Key::Tab,
            13 => Key::Enter,
            27 => Key::Escape,
            32 => Key::Space,
            33 => Key::PageUp,
            34 => Key::PageDown,
            35 => Key::End,
            36 => Key::Home,
            37 => Key::ArrowLeft,
            38 => Key::ArrowUp,
            39 => Key::ArrowRight,
            40 => Key::ArrowDown,
            48..=57 | 65..=90 => char::from_u32(code)
                .map(|c| Key::Character(c.to_ascii_lowercase()))
                .unwrap_or(Key::Unknown(code)),
            other => Key::Unknown(other),
        }
    }

    /// Whether this is a vertical arrow key.
    pub fn is_vertical_arrow(&self) -> bool {
        matches!(self, Key::ArrowUp | Key::ArrowDown)
    }
}
