//! Outbound notify events.
//!
//! The [`NotifyService`](super::service::NotifyService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.

use super::flags::NotifyFlags;

/// Structured events emitted by the notify front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyEvent {
    /// Initialisation finished; carries healthy and registered counts.
    Started { healthy: usize, registered: usize },

    /// A backend's `init` failed; it has been dropped.
    BackendFailed { index: usize },

    /// The flag snapshot changed.
    FlagsChanged { from: NotifyFlags, to: NotifyFlags },

    /// An LED control request was forwarded to the backends.
    LedControlForwarded { instance: u8, pattern: u8 },
}
