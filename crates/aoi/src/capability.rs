//! What an object does in the visibility relation.

/// Role of a tracked object, fixed from `enter` until `leave`.
///
/// - A trigger is seen: its presence and movement are reported to observers.
/// - An observer sees: it is told about triggers around it.
///
/// A typical NPC is `TriggerOnly`, an invisible GM is `ObserverOnly`, and a
/// player is `TriggerAndObserver`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Capability {
    TriggerOnly,
    ObserverOnly,
    #[default]
    TriggerAndObserver,
}

impl Capability {
    /// Whether other observers are told about this object.
    #[inline]
    #[must_use]
    pub const fn emits_events(self) -> bool {
        matches!(self, Self::TriggerOnly | Self::TriggerAndObserver)
    }

    /// Whether this object is told about triggers around it.
    #[inline]
    #[must_use]
    pub const fn receives_events(self) -> bool {
        matches!(self, Self::ObserverOnly | Self::TriggerAndObserver)
    }

    /// Whether either object of the pair can see the other.
    #[inline]
    #[must_use]
    pub const fn relates_to(self, other: Self) -> bool {
        (self.emits_events() && other.receives_events())
            || (self.receives_events() && other.emits_events())
    }
}
