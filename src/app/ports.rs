//! Port traits — the boundary between driver logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ OreoLedI2c / NotifyService
//! ```
//!
//! Driven adapters (I2C bus, clock, event sinks) implement these traits.
//! The driver consumes them via generics, so the state-diff logic never
//! touches a HAL directly and runs unchanged against mocks on the host.

use crate::drivers::oreoled::control::LedControl;
use crate::error::BusError;

use super::events::NotifyEvent;
use super::flags::NotifyFlags;

// ───────────────────────────────────────────────────────────────
// Bus port (driven adapter: driver → I2C)
// ───────────────────────────────────────────────────────────────

/// A shared I2C bus addressed per transfer.
pub trait LedBus {
    /// Write `write` to `address`, then read `read.len()` bytes back
    /// (skipped when `read` is empty). Retries per [`set_retries`].
    ///
    /// [`set_retries`]: LedBus::set_retries
    fn transfer(&mut self, address: u8, write: &[u8], read: &mut [u8]) -> Result<(), BusError>;

    /// Extra attempts after a failed transfer.
    fn set_retries(&mut self, retries: u8);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock. Wraps at `u32::MAX`.
pub trait Clock {
    fn millis(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Notification backend contract
// ───────────────────────────────────────────────────────────────

/// What every notification backend (I2C LEDs, PWM LEDs, displays, ...)
/// offers the notify front-end.
///
/// Methods take `&self`: backends are shared between the main loop and
/// their own bus-timer context and lock internally.
pub trait NotifyDevice: Send + Sync {
    /// Acquire hardware. `false` leaves the backend inert.
    fn init(&self) -> bool;

    /// Called at the notify rate (50 Hz) with the current flags.
    fn update(&self, flags: &NotifyFlags);

    /// Apply an external LED control request. Most backends ignore it.
    fn handle_led_control(&self, _msg: &LedControl) {}
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: front-end → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The notify front-end emits structured [`NotifyEvent`]s through this
/// port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &NotifyEvent);
}
