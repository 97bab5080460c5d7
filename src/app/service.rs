//! Notify front-end — the hexagonal core.
//!
//! [`NotifyService`] owns the vehicle flag snapshot and the registered
//! notification backends. The vehicle loop feeds it flags and control
//! messages; it fans them out to every healthy backend.
//!
//! ```text
//!  NotifyCommand ──▶ ┌────────────────────┐ ──▶ EventSink
//!                    │   NotifyService    │
//!                    │  flags · backends  │ ──▶ NotifyDevice × N
//!                    └────────────────────┘
//! ```

use std::sync::Arc;

use log::{info, warn};

use crate::drivers::oreoled::control::LedControl;

use super::commands::NotifyCommand;
use super::events::NotifyEvent;
use super::flags::NotifyFlags;
use super::ports::{EventSink, NotifyDevice};

// ───────────────────────────────────────────────────────────────
// NotifyService
// ───────────────────────────────────────────────────────────────

pub struct NotifyService<S: EventSink> {
    backends: Vec<Arc<dyn NotifyDevice>>,
    flags: NotifyFlags,
    sink: S,
}

impl<S: EventSink> NotifyService<S> {
    pub fn new(sink: S) -> Self {
        Self {
            backends: Vec::new(),
            flags: NotifyFlags::default(),
            sink,
        }
    }

    /// Register a backend. Takes effect at the next [`init`](Self::init).
    pub fn add_backend(&mut self, backend: Arc<dyn NotifyDevice>) {
        self.backends.push(backend);
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Initialise every registered backend and drop the ones that fail.
    /// Returns the number still registered.
    pub fn init(&mut self) -> usize {
        let registered = self.backends.len();
        let mut index = 0;
        let sink = &mut self.sink;
        self.backends.retain(|backend| {
            let healthy = backend.init();
            if !healthy {
                warn!("notify: backend {} failed to initialise", index);
                sink.emit(&NotifyEvent::BackendFailed { index });
            }
            index += 1;
            healthy
        });

        let healthy = self.backends.len();
        self.sink.emit(&NotifyEvent::Started {
            healthy,
            registered,
        });
        info!("notify: {}/{} backends running", healthy, registered);
        healthy
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Push the current flags to every backend. Call at the notify rate.
    pub fn update(&self) {
        for backend in &self.backends {
            backend.update(&self.flags);
        }
    }

    // ── Command handling ──────────────────────────────────────

    pub fn set_flags(&mut self, flags: NotifyFlags) {
        if flags == self.flags {
            return;
        }
        self.sink.emit(&NotifyEvent::FlagsChanged {
            from: self.flags,
            to: flags,
        });
        self.flags = flags;
    }

    pub fn handle_led_control(&mut self, msg: &LedControl) {
        for backend in &self.backends {
            backend.handle_led_control(msg);
        }
        self.sink.emit(&NotifyEvent::LedControlForwarded {
            instance: msg.instance,
            pattern: msg.pattern,
        });
    }

    pub fn handle_command(&mut self, cmd: NotifyCommand) {
        match cmd {
            NotifyCommand::UpdateFlags(flags) => self.set_flags(flags),
            NotifyCommand::LedControl(msg) => self.handle_led_control(&msg),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn flags(&self) -> &NotifyFlags {
        &self.flags
    }

    pub fn backend_count(&self) -> usize {
        self.backends.len()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
