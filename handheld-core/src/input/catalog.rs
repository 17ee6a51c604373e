//! Front-panel button catalog.

use core::{fmt, time::Duration};

use super::DEFAULT_DEBOUNCE;
use crate::hal::Polarity;

/// Number of front-panel buttons.
pub const BUTTON_COUNT: usize = 3;

/// Identifier for the front-panel buttons, left to right.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ButtonId {
    A,
    B,
    C,
}

impl ButtonId {
    /// Deterministic index for lookups into [`ALL_BUTTONS`].
    pub const fn as_index(self) -> usize {
        match self {
            ButtonId::A => 0,
            ButtonId::B => 1,
            ButtonId::C => 2,
        }
    }

    /// Attempts to construct a [`ButtonId`] from a raw index.
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(ButtonId::A),
            1 => Some(ButtonId::B),
            2 => Some(ButtonId::C),
            _ => None,
        }
    }

    /// Parses a button name (`a`, `b` or `c`, any case).
    pub fn from_name(name: &str) -> Result<Self, CatalogError> {
        ALL_BUTTONS
            .iter()
            .find(|line| line.name.eq_ignore_ascii_case(name))
            .map(|line| line.id)
            .ok_or(CatalogError::UnknownButton)
    }

    pub const fn name(self) -> &'static str {
        button_by_id(self).name
    }
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised while resolving catalog entries.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CatalogError {
    UnknownButton,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::UnknownButton => f.write_str("unknown button"),
        }
    }
}

/// Electrical description of a button.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ButtonLine {
    pub id: ButtonId,
    pub name: &'static str,
    pub polarity: Polarity,
    pub debounce: Duration,
}

impl ButtonLine {
    pub const fn new(
        id: ButtonId,
        name: &'static str,
        polarity: Polarity,
        debounce: Duration,
    ) -> Self {
        Self {
            id,
            name,
            polarity,
            debounce,
        }
    }
}

/// All buttons are wired to ground with pull-ups.
pub const ALL_BUTTONS: [ButtonLine; BUTTON_COUNT] = [
    ButtonLine::new(ButtonId::A, "a", Polarity::ActiveLow, DEFAULT_DEBOUNCE),
    ButtonLine::new(ButtonId::B, "b", Polarity::ActiveLow, DEFAULT_DEBOUNCE),
    ButtonLine::new(ButtonId::C, "c", Polarity::ActiveLow, DEFAULT_DEBOUNCE),
];

/// Retrieve button metadata by identifier.
pub const fn button_by_id(id: ButtonId) -> ButtonLine {
    ALL_BUTTONS[id.as_index()]
}
