//! Notify core — vehicle flags in, backend calls out, zero I/O.
//!
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer testable without real peripherals.

pub mod commands;
pub mod events;
pub mod flags;
pub mod ports;
pub mod service;
