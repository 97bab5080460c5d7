//! Driver configuration parameters
//!
//! All tunable parameters for the OreoLED notify driver.
//! Values can be loaded from a JSON parameter file or a postcard blob in
//! flash; both paths validate before handing the config out.

use serde::{Deserialize, Serialize};

use crate::drivers::oreoled::modes::Theme;
use crate::drivers::oreoled::protocol::BASE_I2C_ADDR;
use crate::drivers::oreoled::state::NUM_LEDS;
use crate::error::{Error, Result};

/// Highest usable 7-bit address; 0x78..=0x7F are reserved.
const MAX_I2C_ADDR: u8 = 0x77;

/// Core driver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyConfig {
    // --- Appearance ---
    /// Front/rear colour scheme
    pub theme: Theme,

    // --- Bus ---
    /// I2C bus the LEDs hang off
    pub i2c_bus: u8,
    /// Address of the back-left LED; the other three follow
    pub base_address: u8,
    /// Extra attempts per command transfer
    pub bus_retries: u8,

    // --- Boot / sync protocol ---
    /// Number of boot broadcasts after power-up
    pub boot_attempts: u8,
    /// Minimum spacing between boot broadcasts (milliseconds)
    pub boot_interval_ms: u32,
    /// Minimum spacing between sync broadcasts (milliseconds)
    pub sync_interval_ms: u32,

    // --- Timing ---
    /// Notify update rate (Hz)
    pub update_rate_hz: u16,
    /// Notify ticks per mode decision
    pub update_decimation: u8,
    /// Bus timer period (microseconds)
    pub bus_timer_period_us: u32,
    /// Bus timer ticks per transmission pass
    pub bus_decimation: u8,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            theme: Theme::Standard,

            // Bus
            i2c_bus: 0,
            base_address: BASE_I2C_ADDR,
            bus_retries: 2,

            // Boot / sync. The LED firmware expects sync slightly slower
            // than its own 4 s pattern clock.
            boot_attempts: 20,
            boot_interval_ms: 100,
            sync_interval_ms: 4100,

            // Timing
            update_rate_hz: 50,      // 50 Hz notify loop
            update_decimation: 5,    // 10 Hz decisions
            bus_timer_period_us: 1000, // 1 kHz bus timer
            bus_decimation: 5,       // 200 Hz transmission passes
        }
    }
}

impl NotifyConfig {
    /// Reject values the driver cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.base_address == 0 {
            return Err(Error::Config("base_address collides with general call"));
        }
        if self.base_address > MAX_I2C_ADDR - (NUM_LEDS as u8 - 1) {
            return Err(Error::Config("base_address leaves no room for all LEDs"));
        }
        if self.update_decimation == 0 || self.bus_decimation == 0 {
            return Err(Error::Config("decimation must be at least 1"));
        }
        if self.update_rate_hz == 0 || self.bus_timer_period_us == 0 {
            return Err(Error::Config("update rates must be non-zero"));
        }
        if self.boot_interval_ms == 0 {
            return Err(Error::Config("boot_interval_ms must be non-zero"));
        }
        if self.sync_interval_ms <= self.boot_interval_ms {
            return Err(Error::Config("sync_interval_ms must exceed boot_interval_ms"));
        }
        Ok(())
    }

    /// Parse and validate a JSON parameter file.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed JSON config"))?;
        config.validate()?;
        Ok(config)
    }

    /// Compact encoding for flash storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        postcard::to_allocvec(self).map_err(|_| Error::Config("config encoding failed"))
    }

    /// Decode and validate a blob written by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let config: Self =
            postcard::from_bytes(bytes).map_err(|_| Error::Config("corrupted config blob"))?;
        config.validate()?;
        Ok(config)
    }
}
