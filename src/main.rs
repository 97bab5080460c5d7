//! OreoLED notify firmware — main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │  I2cLedBus (LedBus)  MonotonicClock (Clock)  LogEventSink│
//! │  ──────────────── Port Trait Boundary ────────────────── │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │  NotifyService ──▶ OreoLedI2c (mode engine + diff) │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//!
//!   main thread:       50 Hz   NotifyService::update
//!   "oreoled-bus":      1 kHz  OreoLedI2c::update_timer
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::KiloHertz;
use log::{info, warn};

use oreoled::adapters::i2c_bus::I2cLedBus;
use oreoled::adapters::log_sink::LogEventSink;
use oreoled::adapters::time::MonotonicClock;
use oreoled::app::flags::NotifyFlags;
use oreoled::app::service::NotifyService;
use oreoled::config::NotifyConfig;
use oreoled::drivers::oreoled::OreoLedI2c;

/// OreoLEDs only speak 400 kHz fast mode.
const I2C_BAUDRATE_KHZ: u32 = 400;
const BUS_THREAD_STACK: usize = 4096;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    info!("OreoLED notify v{}", env!("CARGO_PKG_VERSION"));

    let config = NotifyConfig::default();
    config.validate()?;

    // ── 2. I2C bus ────────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let i2c_config = I2cConfig::new().baudrate(KiloHertz(I2C_BAUDRATE_KHZ).into());
    let bus = match I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio8,
        peripherals.pins.gpio9,
        &i2c_config,
    ) {
        Ok(driver) => Some(I2cLedBus::new(driver)),
        Err(e) => {
            warn!("I2C{} unavailable: {}", config.i2c_bus, e);
            None
        }
    };

    // ── 3. Backends ───────────────────────────────────────────
    let leds = Arc::new(OreoLedI2c::new(bus, MonotonicClock::new(), config.clone()));
    let mut notify = NotifyService::new(LogEventSink::new());
    notify.add_backend(leds.clone());
    if notify.init() == 0 {
        warn!("no notify backends running");
    }

    // ── 4. Bus timer ──────────────────────────────────────────
    let timer_leds = leds.clone();
    let timer_period = Duration::from_micros(u64::from(config.bus_timer_period_us));
    std::thread::Builder::new()
        .name("oreoled-bus".into())
        .stack_size(BUS_THREAD_STACK)
        .spawn(move || {
            loop {
                timer_leds.update_timer();
                std::thread::sleep(timer_period);
            }
        })?;

    // ── 5. Notify loop ────────────────────────────────────────
    // No vehicle attached: show the initialising pattern until the LEDs
    // have finished booting, then idle.
    let frame = Duration::from_millis(1000 / u64::from(config.update_rate_hz));
    loop {
        notify.set_flags(NotifyFlags {
            initialising: leds.boot_count() < config.boot_attempts,
            ..NotifyFlags::default()
        });
        notify.update();
        std::thread::sleep(frame);
    }
}
