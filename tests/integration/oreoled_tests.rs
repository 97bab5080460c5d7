//! End-to-end tests of the OreoLED driver against the mock bus: boot
//! handshake, sync broadcast, and state-diff transmission.

use std::sync::Arc;

use oreoled::app::flags::NotifyFlags;
use oreoled::app::ports::NotifyDevice;
use oreoled::config::NotifyConfig;
use oreoled::drivers::oreoled::OreoLedI2c;
use oreoled::drivers::oreoled::control::LedControl;
use oreoled::drivers::oreoled::modes::{COLOUR_BLUE, COLOUR_NO_GPS, Mode, PERIOD_SUPER, Theme};
use oreoled::drivers::oreoled::protocol::{
    BOOT_CMD_BOOT_APP, BOOT_CMD_BOOT_NONCE, REPLY_SIZE, SYNC_ADDRESS, SYNC_FRAME, xor_checksum,
};
use oreoled::drivers::oreoled::state::{Instance, LedState, MacroId, Pattern, Target};

use crate::mock_hw::{ManualClock, MockBus, Transfer};

type Driver = OreoLedI2c<MockBus, ManualClock>;

/// No decimation on either path, so every call does work.
fn fast_config() -> NotifyConfig {
    NotifyConfig {
        update_decimation: 1,
        bus_decimation: 1,
        ..NotifyConfig::default()
    }
}

fn setup(config: NotifyConfig) -> (Driver, MockBus, ManualClock) {
    let bus = MockBus::new();
    let clock = ManualClock::new(0);
    let driver = OreoLedI2c::new(Some(bus.clone()), clock.clone(), config);
    assert!(driver.init());
    (driver, bus, clock)
}

/// Skip straight past the boot handshake.
fn booted() -> (Driver, MockBus, ManualClock) {
    setup(NotifyConfig {
        boot_attempts: 0,
        ..fast_config()
    })
}

fn is_boot(t: &Transfer) -> bool {
    t.bytes.first() == Some(&BOOT_CMD_BOOT_APP)
}

// ── Boot handshake ────────────────────────────────────────────

#[test]
fn boot_is_broadcast_twenty_times_to_every_led() {
    let (driver, bus, clock) = setup(fast_config());

    driver.update_timer();
    assert!(bus.transfers().is_empty(), "nothing before the first interval");

    for _ in 0..30 {
        clock.advance(100);
        driver.update_timer();
    }

    let transfers = bus.transfers();
    assert_eq!(transfers.len(), 80);
    assert!(transfers.iter().all(is_boot));
    assert_eq!(driver.boot_count(), 20);

    for instance in Instance::ALL {
        let addr = 0x68 + instance as u8;
        let frames = bus.to_address(addr);
        assert_eq!(frames.len(), 20);
        let payload = [BOOT_CMD_BOOT_APP, BOOT_CMD_BOOT_NONCE, addr];
        let mut expected = payload.to_vec();
        expected.push(xor_checksum(addr, &payload));
        assert_eq!(frames[0].bytes, expected);
        assert_eq!(frames[0].read_len, REPLY_SIZE);
    }
}

#[test]
fn boot_respects_interval() {
    let (driver, bus, clock) = setup(fast_config());
    clock.set(100);
    driver.update_timer();
    assert_eq!(driver.boot_count(), 1);

    clock.set(199);
    driver.update_timer();
    assert_eq!(driver.boot_count(), 1);

    clock.set(200);
    driver.update_timer();
    assert_eq!(driver.boot_count(), 2);
    assert_eq!(bus.transfers().len(), 8);
}

// ── Sync ──────────────────────────────────────────────────────

#[test]
fn sync_goes_out_once_per_interval_without_retries() {
    let (driver, bus, clock) = booted();

    clock.set(4099);
    driver.update_timer();
    assert!(bus.transfers().is_empty());

    clock.set(4100);
    driver.update_timer();
    assert_eq!(
        bus.take(),
        vec![Transfer {
            address: SYNC_ADDRESS,
            bytes: SYNC_FRAME.to_vec(),
            read_len: 0,
            retries: 0,
        }]
    );

    // Retries are restored for the next command.
    driver.set_macro(Target::One(Instance::BackLeft), MacroId::RED);
    clock.set(4200);
    driver.update_timer();
    let sent = bus.take();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].retries, 2);

    clock.set(8200);
    driver.update_timer();
    assert_eq!(bus.take().len(), 1, "next sync 4.1 s after the last");
}

// ── State-diff transmission ───────────────────────────────────

#[test]
fn initialising_flags_produce_four_strobe_frames() {
    let (driver, bus, _clock) = booted();
    let flags = NotifyFlags {
        initialising: true,
        ..NotifyFlags::default()
    };
    driver.update(&flags);
    assert_eq!(driver.last_mode(), Some(Mode::Initialising));
    assert!(driver.send_required());

    driver.update_timer();
    let sent = bus.take();
    assert_eq!(sent.len(), 4);

    let addr = 0x68;
    let frame = &sent[0];
    assert_eq!(frame.address, addr);
    let payload = &frame.bytes[..frame.bytes.len() - 1];
    assert_eq!(payload.len(), 19);
    assert_eq!(payload[0], Pattern::Strobe as u8);
    assert_eq!(&payload[2..7], &[COLOUR_BLUE.0, 1, COLOUR_BLUE.1, 2, COLOUR_BLUE.2]);
    assert_eq!(&payload[13..16], &[6, 0, PERIOD_SUPER as u8]);
    assert_eq!(*frame.bytes.last().unwrap(), xor_checksum(addr, payload));

    // Steady state: nothing changes, nothing is sent.
    driver.update(&flags);
    driver.update_timer();
    assert!(bus.take().is_empty());
}

#[test]
fn only_changed_leds_trigger_a_pass_but_all_set_leds_are_resent() {
    let (driver, bus, _clock) = booted();
    driver.set_solid(Target::All, (10, 10, 10));
    driver.update_timer();
    assert_eq!(bus.take().len(), 4);

    driver.set_solid(Target::One(Instance::FrontRight), (10, 10, 11));
    driver.update_timer();
    assert_eq!(bus.take().len(), 4);
    assert_eq!(
        driver.sent_state(Instance::FrontRight),
        LedState::Rgb {
            pattern: Pattern::Solid,
            colour: (10, 10, 11)
        }
    );
}

#[test]
fn failed_transfers_are_not_retried_by_the_scheduler() {
    let (driver, bus, _clock) = booted();
    bus.set_failing(true);
    driver.set_macro(Target::All, MacroId::WHITE);
    driver.update_timer();
    assert_eq!(bus.take().len(), 4);

    bus.set_failing(false);
    driver.update_timer();
    assert!(bus.take().is_empty());
    assert!(!driver.send_required());
}

#[test]
fn clear_state_sends_nothing() {
    let (driver, bus, _clock) = booted();
    driver.set_solid(Target::All, (1, 2, 3));
    driver.clear_state();
    driver.update_timer();
    assert!(bus.take().is_empty());
    assert_eq!(driver.desired_state(Instance::BackRight), LedState::None);
}

#[test]
fn aircraft_without_gps_uses_yellow_rear() {
    let (driver, _bus, _clock) = setup(NotifyConfig {
        theme: Theme::Aircraft,
        boot_attempts: 0,
        ..fast_config()
    });
    driver.update(&NotifyFlags {
        failsafe_battery: true,
        ..NotifyFlags::default()
    });
    assert_eq!(driver.rear_colour(), COLOUR_NO_GPS);
    assert_eq!(driver.last_mode(), Some(Mode::FailsafeBattery));
}

// ── LED_CONTROL override ──────────────────────────────────────

#[test]
fn led_control_override_survives_mode_updates_until_off() {
    let (driver, bus, _clock) = booted();
    let flags = NotifyFlags {
        autopilot_mode: true,
        gps_fusion: true,
        ..NotifyFlags::default()
    };

    let msg = LedControl::new(0xFF, 255, b"RGB0\x02\x00\xff\x00").unwrap();
    driver.handle_led_control(&msg);
    driver.update(&flags);
    assert_eq!(driver.last_mode(), Some(Mode::Override));
    driver.update_timer();
    let sent = bus.take();
    assert_eq!(sent.len(), 4);
    assert!(sent.iter().all(|t| t.bytes[..7] == [2, 0, 0, 1, 255, 2, 0]));

    driver.handle_led_control(&LedControl::new(0xFF, 0, &[]).unwrap());
    assert_eq!(driver.pattern_override(), None);
    driver.update(&flags);
    assert_eq!(driver.last_mode(), Some(Mode::AutoFlight));
}

#[test]
fn runs_as_shared_backend_from_two_threads() {
    let (driver, bus, clock) = booted();
    let driver = Arc::new(driver);
    let device: Arc<dyn NotifyDevice> = driver.clone();

    let timer = {
        let driver = driver.clone();
        std::thread::spawn(move || {
            for _ in 0..200 {
                driver.update_timer();
            }
        })
    };
    for _ in 0..200 {
        device.update(&NotifyFlags {
            initialising: true,
            ..NotifyFlags::default()
        });
        clock.advance(1);
    }
    timer.join().unwrap();
    driver.update_timer();

    assert!(!driver.send_required());
    assert!(bus.transfers().iter().all(|t| !is_boot(t)));
}

// ── Init failure ──────────────────────────────────────────────

#[test]
fn driver_without_bus_never_transmits() {
    let clock = ManualClock::new(0);
    let driver: Driver = OreoLedI2c::new(None, clock.clone(), fast_config());
    assert!(!driver.init());
    driver.set_solid(Target::All, (1, 1, 1));
    for _ in 0..50 {
        clock.advance(100);
        driver.update_timer();
    }
    assert_eq!(driver.boot_count(), 0);
    assert!(!driver.is_initialised());
}
