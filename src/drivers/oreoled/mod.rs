//! OreoLED smart-LED driver.
//!
//! Four LEDs sit on one I2C bus at `base + instance`. Each LED runs its
//! own pattern generator, so the driver only has to tell it *what* to
//! show; it never streams frames.
//!
//! ```text
//!   update() ──▶ ModeEngine ──▶ LedTable.desired ─┐
//!   handle_led_control() ───────▶ LedTable.desired ─┤ diff
//!                                                   ▼
//!   update_timer() ──▶ boot / sync ──▶ encode_command ──▶ LedBus
//! ```
//!
//! Two contexts touch the driver: the 50 Hz notify loop and the bus
//! timer. All shared state lives behind one mutex; every entry point
//! takes it for its whole body.

pub mod control;
pub mod modes;
pub mod protocol;
pub mod state;

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info, trace, warn};

use crate::app::flags::NotifyFlags;
use crate::app::ports::{Clock, LedBus, NotifyDevice};
use crate::config::NotifyConfig;

use control::LedControl;
use modes::{Mode, ModeEngine};
use protocol::{
    CommandFrame, REPLY_SIZE, SYNC_ADDRESS, SYNC_FRAME, boot_frame, encode_command, led_address,
};
use state::{Instance, LedState, LedTable, MacroId, Pattern, Rgb, Target};

/// Everything both contexts mutate.
struct Shared<B> {
    bus: Option<B>,
    initialised: bool,
    table: LedTable,
    engine: ModeEngine,
    /// Opcode of the active external override, if any.
    pattern_override: Option<u8>,
    bus_count: u8,
    boot_count: u8,
    last_boot_ms: u32,
    last_sync_ms: u32,
}

/// OreoLED backend: mode engine, state table and bus scheduler.
pub struct OreoLedI2c<B, C> {
    shared: Mutex<Shared<B>>,
    clock: C,
    config: NotifyConfig,
}

impl<B: LedBus, C: Clock> OreoLedI2c<B, C> {
    /// `bus` is `None` when the configured I2C bus could not be opened;
    /// [`init`](Self::init) then fails and the driver stays inert.
    pub fn new(bus: Option<B>, clock: C, config: NotifyConfig) -> Self {
        Self {
            shared: Mutex::new(Shared {
                bus,
                initialised: false,
                table: LedTable::default(),
                engine: ModeEngine::new(),
                pattern_override: None,
                bus_count: 0,
                boot_count: 0,
                last_boot_ms: 0,
                last_sync_ms: 0,
            }),
            clock,
            config,
        }
    }

    fn shared(&self) -> MutexGuard<'_, Shared<B>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the bus. Returns `false` if there is none.
    pub fn init(&self) -> bool {
        let mut s = self.shared();
        let Some(bus) = s.bus.as_mut() else {
            warn!("oreoled: no device on bus {}", self.config.i2c_bus);
            return false;
        };
        bus.set_retries(self.config.bus_retries);
        s.initialised = true;
        info!(
            "oreoled: ready on bus {} at 0x{:02x}",
            self.config.i2c_bus, self.config.base_address
        );
        true
    }

    /// Notify-rate entry point. Decides a mode on every
    /// `update_decimation`-th call.
    pub fn update(&self, flags: &NotifyFlags) {
        let mut s = self.shared();
        if !s.initialised || !s.engine.tick(self.config.update_decimation) {
            return;
        }
        let Shared {
            engine,
            table,
            pattern_override,
            ..
        } = &mut *s;
        let mode = engine.run(table, flags, self.config.theme, pattern_override.is_some());
        trace!("oreoled: mode {:?}", mode);
    }

    /// Bus timer entry point. Runs boot, sync and transmission on every
    /// `bus_decimation`-th call.
    pub fn update_timer(&self) {
        let mut s = self.shared();
        if !s.initialised {
            return;
        }
        s.bus_count = s.bus_count.saturating_add(1);
        if s.bus_count < self.config.bus_decimation {
            return;
        }
        s.bus_count = 0;

        let now = self.clock.millis();
        s.boot(now, &self.config);
        s.sync(now, &self.config);
        s.transmit(self.config.base_address);
    }

    // ── Desired-state mutators ───────────────────────────────

    pub fn set_rgb(&self, target: Target, pattern: Pattern, colour: Rgb) {
        self.apply(target, LedState::Rgb { pattern, colour });
    }

    pub fn set_rgb_extended(
        &self,
        target: Target,
        pattern: Pattern,
        colour: Rgb,
        amplitude: Rgb,
        period_ms: u16,
        phase_offset: u16,
    ) {
        self.apply(
            target,
            LedState::RgbExtended {
                pattern,
                colour,
                amplitude,
                period_ms,
                phase_offset,
            },
        );
    }

    pub fn set_solid(&self, target: Target, colour: Rgb) {
        self.set_rgb(target, Pattern::Solid, colour);
    }

    pub fn set_macro(&self, target: Target, id: MacroId) {
        self.apply(target, LedState::Macro(id));
    }

    /// Forget every desired state. LEDs keep showing what they were last
    /// sent; nothing new goes out until a mutator runs.
    pub fn clear_state(&self) {
        self.shared().table.clear();
    }

    fn apply(&self, target: Target, state: LedState) {
        self.shared().table.apply(target, state);
    }

    /// Apply an external `LED_CONTROL` request. Malformed requests are
    /// dropped.
    pub fn handle_led_control(&self, msg: &LedControl) {
        let cmd = match control::decode(msg) {
            Ok(cmd) => cmd,
            Err(e) => {
                debug!("oreoled: LED_CONTROL dropped: {}", e);
                return;
            }
        };

        let mut s = self.shared();
        match cmd.into_state() {
            None => {
                s.pattern_override = None;
                s.table.clear();
                debug!("oreoled: override cleared");
            }
            Some((target, state)) => {
                s.table.apply(target, state);
                s.pattern_override = Some(msg.pattern);
            }
        }
    }

    // ── Introspection ────────────────────────────────────────

    pub fn is_initialised(&self) -> bool {
        self.shared().initialised
    }

    pub fn desired_state(&self, instance: Instance) -> LedState {
        self.shared().table.desired(instance)
    }

    pub fn sent_state(&self, instance: Instance) -> LedState {
        self.shared().table.sent(instance)
    }

    pub fn send_required(&self) -> bool {
        self.shared().table.send_required()
    }

    /// Boot broadcasts sent so far.
    pub fn boot_count(&self) -> u8 {
        self.shared().boot_count
    }

    pub fn pattern_override(&self) -> Option<u8> {
        self.shared().pattern_override
    }

    /// Rear colour chosen by the last mode decision.
    pub fn rear_colour(&self) -> Rgb {
        self.shared().engine.rear_colour()
    }

    pub fn last_mode(&self) -> Option<Mode> {
        self.shared().engine.last_mode()
    }
}

impl<B: LedBus> Shared<B> {
    fn boot(&mut self, now: u32, config: &NotifyConfig) {
        if self.boot_count >= config.boot_attempts
            || now.wrapping_sub(self.last_boot_ms) < config.boot_interval_ms
        {
            return;
        }
        let Some(bus) = self.bus.as_mut() else {
            return;
        };
        for instance in Instance::ALL {
            send(bus, &boot_frame(led_address(config.base_address, instance)));
        }
        self.boot_count += 1;
        self.last_boot_ms = now;
        if self.boot_count == config.boot_attempts {
            info!("oreoled: boot sequence complete");
        }
    }

    fn sync(&mut self, now: u32, config: &NotifyConfig) {
        if now.wrapping_sub(self.last_sync_ms) < config.sync_interval_ms {
            return;
        }
        let Some(bus) = self.bus.as_mut() else {
            return;
        };
        // Broadcast, so nobody acknowledges; one attempt only.
        bus.set_retries(0);
        trace!("oreoled: sync");
        if let Err(e) = bus.transfer(SYNC_ADDRESS, &SYNC_FRAME, &mut []) {
            trace!("oreoled: sync not acknowledged: {}", e);
        }
        bus.set_retries(config.bus_retries);
        self.last_sync_ms = now;
    }

    fn transmit(&mut self, base_address: u8) {
        if !self.table.send_required() {
            return;
        }
        let Some(bus) = self.bus.as_mut() else {
            return;
        };
        for instance in Instance::ALL {
            let address = led_address(base_address, instance);
            if let Some(frame) = encode_command(address, &self.table.desired(instance)) {
                send(bus, &frame);
            }
            // Fire and forget: a failed write is not retried here.
            self.table.mark_sent(instance);
        }
        self.table.send_complete();
    }
}

fn send<B: LedBus>(bus: &mut B, frame: &CommandFrame) {
    let mut reply = [0u8; REPLY_SIZE];
    trace!("oreoled: 0x{:02x} <- {:02x?}", frame.address(), frame.as_bytes());
    if let Err(e) = bus.transfer(frame.address(), frame.as_bytes(), &mut reply) {
        debug!("oreoled: write to 0x{:02x} failed: {}", frame.address(), e);
    }
}

impl<B, C> NotifyDevice for OreoLedI2c<B, C>
where
    B: LedBus + Send,
    C: Clock + Send + Sync,
{
    fn init(&self) -> bool {
        OreoLedI2c::init(self)
    }

    fn update(&self, flags: &NotifyFlags) {
        OreoLedI2c::update(self, flags);
    }

    fn handle_led_control(&self, msg: &LedControl) {
        OreoLedI2c::handle_led_control(self, msg);
    }
}
