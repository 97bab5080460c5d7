//! Notification backend drivers.

pub mod oreoled;
