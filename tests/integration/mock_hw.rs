//! Mock hardware adapters for integration tests.
//!
//! Records every bus transfer so tests can assert on the full frame
//! history without a real I2C peripheral.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use oreoled::app::events::NotifyEvent;
use oreoled::app::ports::{Clock, EventSink, LedBus};
use oreoled::error::BusError;

// ── Transfer record ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub address: u8,
    pub bytes: Vec<u8>,
    pub read_len: usize,
    /// Retry setting in force when the transfer was issued.
    pub retries: u8,
}

// ── MockBus ───────────────────────────────────────────────────

/// Cloneable handle; clones share the log so the test keeps one while
/// the driver owns another.
#[derive(Clone, Default)]
pub struct MockBus {
    log: Arc<Mutex<Vec<Transfer>>>,
    retries: Arc<AtomicU32>,
    fail: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::Relaxed);
    }

    pub fn transfers(&self) -> Vec<Transfer> {
        self.log.lock().unwrap().clone()
    }

    /// Drain and return everything recorded so far.
    pub fn take(&self) -> Vec<Transfer> {
        std::mem::take(&mut *self.log.lock().unwrap())
    }

    pub fn to_address(&self, address: u8) -> Vec<Transfer> {
        self.transfers()
            .into_iter()
            .filter(|t| t.address == address)
            .collect()
    }
}

impl LedBus for MockBus {
    fn transfer(&mut self, address: u8, write: &[u8], read: &mut [u8]) -> Result<(), BusError> {
        self.log.lock().unwrap().push(Transfer {
            address,
            bytes: write.to_vec(),
            read_len: read.len(),
            retries: self.retries.load(Ordering::Relaxed) as u8,
        });
        if self.fail.load(Ordering::Relaxed) {
            Err(BusError::Nack)
        } else {
            Ok(())
        }
    }

    fn set_retries(&mut self, retries: u8) {
        self.retries.store(u32::from(retries), Ordering::Relaxed);
    }
}

// ── ManualClock ───────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct ManualClock(Arc<AtomicU32>);

#[allow(dead_code)]
impl ManualClock {
    pub fn new(start_ms: u32) -> Self {
        Self(Arc::new(AtomicU32::new(start_ms)))
    }

    pub fn set(&self, ms: u32) {
        self.0.store(ms, Ordering::Relaxed);
    }

    pub fn advance(&self, ms: u32) {
        self.0.fetch_add(ms, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn millis(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<NotifyEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &NotifyEvent) {
        self.events.push(event.clone());
    }
}
