//! I2C bus adapter.
//!
//! Implements [`LedBus`] over any blocking `embedded_hal::i2c::I2c`
//! (the ESP-IDF `I2cDriver` on target, fakes on the host). Each transfer
//! is a plain write, or a write followed by a repeated-start read when a
//! reply is requested, attempted `1 + retries` times.

use embedded_hal::i2c::{Error as _, I2c};
use log::trace;

use crate::app::ports::LedBus;
use crate::error::BusError;

pub struct I2cLedBus<I> {
    i2c: I,
    retries: u8,
}

impl<I: I2c> I2cLedBus<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c, retries: 0 }
    }

    /// Give the underlying driver back.
    pub fn release(self) -> I {
        self.i2c
    }

    fn attempt(&mut self, address: u8, write: &[u8], read: &mut [u8]) -> Result<(), BusError> {
        let result = if read.is_empty() {
            self.i2c.write(address, write)
        } else {
            self.i2c.write_read(address, write, read)
        };
        result.map_err(|e| BusError::from(e.kind()))
    }
}

impl<I: I2c> LedBus for I2cLedBus<I> {
    fn transfer(&mut self, address: u8, write: &[u8], read: &mut [u8]) -> Result<(), BusError> {
        let mut result = self.attempt(address, write, read);
        for retry in 0..self.retries {
            if result.is_ok() {
                break;
            }
            trace!("i2c: retry {} to 0x{:02x}", retry + 1, address);
            result = self.attempt(address, write, read);
        }
        result
    }

    fn set_retries(&mut self, retries: u8) {
        self.retries = retries;
    }
}
