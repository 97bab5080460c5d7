//! Mode decision engine with priority-based pattern selection.
//!
//! Each decision cycle picks exactly one behaviour from the vehicle flags
//! and writes the desired state of all four LEDs.
//!
//! ## Priority hierarchy (highest first)
//!
//! 1. **Firmware update**: colour-cycle macro on every LED
//! 2. **Initialising**: fast blue strobe
//! 3. **Radio failsafe**: slow red strobe, front/back alternating
//! 4. **Battery failsafe**: theme colours, fast strobe
//! 5. **Override**: an external control message owns the LEDs
//! 6. **Autopilot flight**: theme colours, super-fast strobe
//! 7. **Pilot flight**: theme colours, mostly solid
//!
//! The rear colour is recomputed from GPS/EKF health every cycle that gets
//! past step 3.
//!
//! ## Timing
//!
//! | Period | ms  |
//! |--------|-----|
//! | Slow   | 800 |
//! | Fast   | 500 |
//! | Super  | 150 |

use serde::{Deserialize, Serialize};

use super::state::{Instance, LedState, LedTable, MacroId, Pattern, Rgb, Target};
use crate::app::flags::NotifyFlags;

pub const PERIOD_SLOW: u16 = 800;
pub const PERIOD_FAST: u16 = 500;
pub const PERIOD_SUPER: u16 = 150;
/// 180 degree phase offset.
pub const PO_ALTERNATE: u16 = 180;

/// Front/rear colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    /// Red/green navigation fronts, status-coloured rears.
    Aircraft,
    /// White headlights, red tail lights.
    Automobile,
    #[default]
    Standard,
}

impl Theme {
    /// Map the numeric theme parameter (`1` aircraft, `2` automobile).
    pub fn from_param(value: u8) -> Self {
        match value {
            1 => Self::Aircraft,
            2 => Self::Automobile,
            _ => Self::Standard,
        }
    }
}

/// Which branch of the hierarchy produced the current desired state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    FirmwareUpdate,
    Initialising,
    FailsafeRadio,
    FailsafeBattery,
    Override,
    AutoFlight,
    PilotFlight,
}

// ── Well-known colours ────────────────────────────────────────

pub const COLOUR_RED: Rgb = (255, 0, 0);
pub const COLOUR_GREEN: Rgb = (0, 255, 0);
pub const COLOUR_BLUE: Rgb = (0, 0, 255);
pub const COLOUR_WHITE: Rgb = (255, 255, 255);
/// Rear colour while GPS is not fused.
pub const COLOUR_NO_GPS: Rgb = (255, 50, 0);
/// Rear colour while the EKF is unhealthy.
pub const COLOUR_EKF_BAD: Rgb = (255, 0, 255);

/// Decimation counter, rear colour, and the last decision taken.
#[derive(Debug)]
pub(crate) struct ModeEngine {
    slow_count: u8,
    rear_colour: Rgb,
    last_mode: Option<Mode>,
}

impl ModeEngine {
    pub(crate) fn new() -> Self {
        Self {
            slow_count: 0,
            rear_colour: COLOUR_WHITE,
            last_mode: None,
        }
    }

    /// Count one caller tick; true on every `decimation`-th tick.
    pub(crate) fn tick(&mut self, decimation: u8) -> bool {
        self.slow_count = self.slow_count.saturating_add(1);
        if self.slow_count < decimation {
            return false;
        }
        self.slow_count = 0;
        true
    }

    pub(crate) fn rear_colour(&self) -> Rgb {
        self.rear_colour
    }

    pub(crate) fn last_mode(&self) -> Option<Mode> {
        self.last_mode
    }

    /// Run one decision cycle against `table`.
    pub(crate) fn run(
        &mut self,
        table: &mut LedTable,
        flags: &NotifyFlags,
        theme: Theme,
        override_active: bool,
    ) -> Mode {
        let mode = self.decide(table, flags, theme, override_active);
        self.last_mode = Some(mode);
        mode
    }

    fn decide(
        &mut self,
        table: &mut LedTable,
        flags: &NotifyFlags,
        theme: Theme,
        override_active: bool,
    ) -> Mode {
        if flags.firmware_update {
            table.apply(Target::All, LedState::Macro(MacroId::COLOUR_CYCLE));
            return Mode::FirmwareUpdate;
        }

        if flags.initialising {
            table.apply(Target::All, strobe(COLOUR_BLUE, PERIOD_SUPER, 0));
            return Mode::Initialising;
        }

        if flags.failsafe_radio {
            set_quad(
                table,
                strobe(COLOUR_RED, PERIOD_SLOW, 0),
                strobe(COLOUR_RED, PERIOD_SLOW, PO_ALTERNATE),
                strobe(COLOUR_RED, PERIOD_SLOW, PO_ALTERNATE),
                strobe(COLOUR_RED, PERIOD_SLOW, 0),
            );
            return Mode::FailsafeRadio;
        }

        self.rear_colour = rear_colour_for(flags);
        let rear = self.rear_colour;

        if flags.failsafe_battery {
            match theme {
                Theme::Aircraft => set_quad(
                    table,
                    strobe(COLOUR_RED, PERIOD_FAST, 0),
                    strobe(COLOUR_GREEN, PERIOD_FAST, 0),
                    strobe(rear, PERIOD_FAST, PO_ALTERNATE),
                    strobe(rear, PERIOD_FAST, PO_ALTERNATE),
                ),
                Theme::Automobile | Theme::Standard => set_quad(
                    table,
                    strobe(COLOUR_WHITE, PERIOD_FAST, 0),
                    strobe(COLOUR_WHITE, PERIOD_FAST, 0),
                    strobe(COLOUR_RED, PERIOD_FAST, PO_ALTERNATE),
                    strobe(COLOUR_RED, PERIOD_FAST, PO_ALTERNATE),
                ),
            }
            return Mode::FailsafeBattery;
        }

        if override_active {
            return Mode::Override;
        }

        if flags.autopilot_mode {
            match theme {
                Theme::Aircraft => {
                    let (back_left, back_right) = if flags.arming_ready() {
                        (
                            strobe(rear, PERIOD_SUPER, PO_ALTERNATE),
                            strobe(rear, PERIOD_SUPER, PO_ALTERNATE),
                        )
                    } else {
                        (solid(rear), solid(rear))
                    };
                    set_quad(
                        table,
                        strobe(COLOUR_RED, PERIOD_SUPER, 0),
                        strobe(COLOUR_GREEN, PERIOD_SUPER, 0),
                        back_left,
                        back_right,
                    );
                }
                Theme::Automobile | Theme::Standard => set_quad(
                    table,
                    strobe(COLOUR_WHITE, PERIOD_SUPER, 0),
                    strobe(COLOUR_WHITE, PERIOD_SUPER, 0),
                    strobe(COLOUR_RED, PERIOD_SUPER, PO_ALTERNATE),
                    strobe(COLOUR_RED, PERIOD_SUPER, PO_ALTERNATE),
                ),
            }
            return Mode::AutoFlight;
        }

        match theme {
            Theme::Aircraft => {
                let (back_left, back_right) = if flags.arming_ready() {
                    (
                        strobe(rear, PERIOD_FAST, 0),
                        strobe(rear, PERIOD_FAST, PO_ALTERNATE),
                    )
                } else {
                    (solid(rear), solid(rear))
                };
                set_quad(
                    table,
                    solid(COLOUR_RED),
                    solid(COLOUR_GREEN),
                    back_left,
                    back_right,
                );
            }
            Theme::Automobile | Theme::Standard => set_quad(
                table,
                solid(COLOUR_WHITE),
                solid(COLOUR_WHITE),
                solid(COLOUR_RED),
                solid(COLOUR_RED),
            ),
        }
        Mode::PilotFlight
    }
}

/// White when healthy, yellow without GPS fusion, purple on a bad EKF.
pub fn rear_colour_for(flags: &NotifyFlags) -> Rgb {
    if !flags.gps_fusion {
        COLOUR_NO_GPS
    } else if flags.ekf_bad {
        COLOUR_EKF_BAD
    } else {
        COLOUR_WHITE
    }
}

fn strobe(colour: Rgb, period_ms: u16, phase_offset: u16) -> LedState {
    LedState::RgbExtended {
        pattern: Pattern::Strobe,
        colour,
        amplitude: (0, 0, 0),
        period_ms,
        phase_offset,
    }
}

fn solid(colour: Rgb) -> LedState {
    LedState::Rgb {
        pattern: Pattern::Solid,
        colour,
    }
}

fn set_quad(
    table: &mut LedTable,
    front_left: LedState,
    front_right: LedState,
    back_left: LedState,
    back_right: LedState,
) {
    table.apply(Instance::FrontLeft.into(), front_left);
    table.apply(Instance::FrontRight.into(), front_right);
    table.apply(Instance::BackLeft.into(), back_left);
    table.apply(Instance::BackRight.into(), back_right);
}
