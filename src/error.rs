//! Unified error types for the OreoLED notify driver.
//!
//! A single `Error` enum that every subsystem can convert into.
//! All variants are `Copy` so they can be passed through the driver's
//! lock-held paths without allocation.
//!
//! Note that the driver itself never surfaces bus or decode errors to its
//! callers; those are logged and swallowed.
//! The typed errors exist for the adapters, the config layer, and tests.

use core::fmt;

use crate::drivers::oreoled::control::DecodeError;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An I2C transfer failed.
    Bus(BusError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
    /// An inbound LED control message was rejected.
    Decode(DecodeError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "bus: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Decode(e) => write!(f, "decode: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Bus errors
// ---------------------------------------------------------------------------

/// Classification of a failed bus transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// The addressed device (or the data byte) was not acknowledged.
    Nack,
    /// Another master won arbitration.
    ArbitrationLoss,
    /// Bus-level fault (misplaced start/stop condition).
    Bus,
    /// Anything else the HAL reports.
    Other,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nack => write!(f, "no acknowledge"),
            Self::ArbitrationLoss => write!(f, "arbitration lost"),
            Self::Bus => write!(f, "bus fault"),
            Self::Other => write!(f, "transfer failed"),
        }
    }
}

impl From<embedded_hal::i2c::ErrorKind> for BusError {
    fn from(kind: embedded_hal::i2c::ErrorKind) -> Self {
        use embedded_hal::i2c::ErrorKind;
        match kind {
            ErrorKind::NoAcknowledge(_) => Self::Nack,
            ErrorKind::ArbitrationLoss => Self::ArbitrationLoss,
            ErrorKind::Bus => Self::Bus,
            _ => Self::Other,
        }
    }
}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Self::Bus(e)
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
