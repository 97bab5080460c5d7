//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements | Connects to                      |
//! |------------|------------|----------------------------------|
//! | `i2c_bus`  | LedBus     | Any `embedded_hal` I2C master    |
//! | `log_sink` | EventSink  | Serial log output                |
//! | `time`     | Clock      | ESP32 system timer / `Instant`   |

pub mod i2c_bus;
pub mod log_sink;
pub mod time;
