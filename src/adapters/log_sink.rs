//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing notify events to the logger
//! (UART / USB-CDC through the ESP-IDF logger in production).

use log::{info, warn};

use crate::app::events::NotifyEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`NotifyEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &NotifyEvent) {
        match event {
            NotifyEvent::Started {
                healthy,
                registered,
            } => {
                info!("START | backends={}/{}", healthy, registered);
            }
            NotifyEvent::BackendFailed { index } => {
                warn!("FAIL  | backend #{} dropped", index);
            }
            NotifyEvent::FlagsChanged { from, to } => {
                info!(
                    "FLAGS | armed {} -> {} | auto {} -> {} | fs_radio={} fs_batt={} ekf_bad={}",
                    from.armed,
                    to.armed,
                    from.autopilot_mode,
                    to.autopilot_mode,
                    to.failsafe_radio,
                    to.failsafe_battery,
                    to.ekf_bad,
                );
            }
            NotifyEvent::LedControlForwarded { instance, pattern } => {
                info!("LEDCTL | instance=0x{:02x} pattern={}", instance, pattern);
            }
        }
    }
}
