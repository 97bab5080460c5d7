//! NotifyService wired to a real OreoLED backend over the mock bus.

use std::sync::Arc;

use oreoled::app::commands::NotifyCommand;
use oreoled::app::events::NotifyEvent;
use oreoled::app::flags::NotifyFlags;
use oreoled::app::service::NotifyService;
use oreoled::config::NotifyConfig;
use oreoled::drivers::oreoled::OreoLedI2c;
use oreoled::drivers::oreoled::control::LedControl;
use oreoled::drivers::oreoled::modes::Mode;
use oreoled::drivers::oreoled::state::{Instance, LedState, MacroId};

use crate::mock_hw::{ManualClock, MockBus, RecordingSink};

fn config() -> NotifyConfig {
    NotifyConfig {
        boot_attempts: 0,
        bus_decimation: 1,
        ..NotifyConfig::default()
    }
}

#[test]
fn backend_without_bus_is_dropped() {
    let good = Arc::new(OreoLedI2c::new(
        Some(MockBus::new()),
        ManualClock::new(0),
        config(),
    ));
    let bad = Arc::new(OreoLedI2c::<MockBus, _>::new(None, ManualClock::new(0), config()));

    let mut svc = NotifyService::new(RecordingSink::default());
    svc.add_backend(good.clone());
    svc.add_backend(bad.clone());

    assert_eq!(svc.init(), 1);
    assert_eq!(svc.backend_count(), 1);
    assert_eq!(
        svc.sink().events,
        vec![
            NotifyEvent::BackendFailed { index: 1 },
            NotifyEvent::Started {
                healthy: 1,
                registered: 2
            },
        ]
    );
}

#[test]
fn update_is_decimated_to_ten_hertz() {
    let leds = Arc::new(OreoLedI2c::new(
        Some(MockBus::new()),
        ManualClock::new(0),
        config(),
    ));
    let mut svc = NotifyService::new(RecordingSink::default());
    svc.add_backend(leds.clone());
    svc.init();

    svc.handle_command(NotifyCommand::UpdateFlags(NotifyFlags {
        failsafe_radio: true,
        ..NotifyFlags::default()
    }));
    for _ in 0..4 {
        svc.update();
    }
    assert_eq!(leds.last_mode(), None);
    svc.update();
    assert_eq!(leds.last_mode(), Some(Mode::FailsafeRadio));
}

#[test]
fn led_control_reaches_the_backend() {
    let bus = MockBus::new();
    let leds = Arc::new(OreoLedI2c::new(Some(bus.clone()), ManualClock::new(0), config()));
    let mut svc = NotifyService::new(RecordingSink::default());
    svc.add_backend(leds.clone());
    svc.init();

    let msg = LedControl::new(2, MacroId::AVIATION.0, &[]).unwrap();
    svc.handle_command(NotifyCommand::LedControl(msg));

    assert_eq!(leds.pattern_override(), Some(12));
    assert_eq!(
        leds.desired_state(Instance::FrontRight),
        LedState::Macro(MacroId::AVIATION)
    );
    assert_eq!(
        svc.sink().events.last(),
        Some(&NotifyEvent::LedControlForwarded {
            instance: 2,
            pattern: 12
        })
    );

    leds.update_timer();
    let sent = bus.take();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].address, 0x6A);
    assert_eq!(&sent[0].bytes[..3], &[7, 9, 12]);
}
