//! Inbound commands to the notify front-end.
//!
//! These represent requests from the outside world (vehicle loop, GCS
//! message handler) that [`NotifyService`](super::service::NotifyService)
//! interprets and acts upon.

use crate::drivers::oreoled::control::LedControl;

use super::flags::NotifyFlags;

/// Commands that external code can send into the notify front-end.
#[derive(Debug, Clone)]
pub enum NotifyCommand {
    /// Replace the vehicle flag snapshot.
    UpdateFlags(NotifyFlags),

    /// An `LED_CONTROL` request from the ground station.
    LedControl(LedControl),
}
