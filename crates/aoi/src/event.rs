//! Visibility events.
//!
//! Every notification is an `(AoiEvent, other)` pair handed to the callback of
//! the operation that caused it. `other` is the object whose visibility
//! relation with the mover changed.

use core::fmt;

/// What happened between the mover and the other object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AoiEvent {
    /// The pair became visible to each other.
    Enter,
    /// The pair is no longer visible.
    Leave,
    /// The mover changed position while staying visible.
    Update,
}

impl AoiEvent {
    /// All events in the order a cross-cell move emits them.
    pub const ALL: [AoiEvent; 3] = [AoiEvent::Enter, AoiEvent::Update, AoiEvent::Leave];

    /// Enter and Leave change what an observer can see; Update does not.
    #[must_use]
    pub const fn changes_visibility(self) -> bool {
        matches!(self, Self::Enter | Self::Leave)
    }
}

impl fmt::Display for AoiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Enter => "enter",
            Self::Leave => "leave",
            Self::Update => "update",
        })
    }
}
