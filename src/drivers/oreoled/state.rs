//! Per-LED state model.
//!
//! Each OreoLED unit is either idle, running one of its built-in macros, or
//! rendering an RGB pattern (optionally with amplitude/period/phase
//! parameters). The same [`LedState`] shape is used for what we *want*
//! the LED to show and for what was last *sent* to it; the driver only
//! touches the bus when the two differ.

/// Colour or amplitude as (R, G, B) tuple, each 0–255.
pub type Rgb = (u8, u8, u8);

/// Number of OreoLED units on the bus.
pub const NUM_LEDS: usize = 4;

/// Wire value addressing every instance at once.
pub const INSTANCE_ALL: u8 = 0xFF;

// ── Instances ─────────────────────────────────────────────────

/// Physical LED position. The discriminant is the bus address offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Instance {
    BackLeft = 0,
    BackRight = 1,
    FrontRight = 2,
    FrontLeft = 3,
}

impl Instance {
    pub const ALL: [Instance; NUM_LEDS] = [
        Instance::BackLeft,
        Instance::BackRight,
        Instance::FrontRight,
        Instance::FrontLeft,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

static INSTANCES: [Instance; NUM_LEDS] = Instance::ALL;

/// Which LEDs a mutation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    One(Instance),
    All,
}

impl Target {
    /// Decode the wire representation (`0..4` or [`INSTANCE_ALL`]).
    pub fn from_raw(raw: u8) -> Option<Self> {
        if raw == INSTANCE_ALL {
            Some(Self::All)
        } else {
            Instance::from_index(raw).map(Self::One)
        }
    }

    pub(crate) fn instances(self) -> impl Iterator<Item = Instance> {
        let slice: &'static [Instance] = match self {
            Self::All => &INSTANCES,
            Self::One(i) => &INSTANCES[i.index()..=i.index()],
        };
        slice.iter().copied()
    }
}

impl From<Instance> for Target {
    fn from(instance: Instance) -> Self {
        Self::One(instance)
    }
}

// ── Patterns, params, macros ──────────────────────────────────

/// Waveform applied to an RGB colour by the LED firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Pattern {
    Off = 0,
    Sine = 1,
    Solid = 2,
    Siren = 3,
    Strobe = 4,
    FadeIn = 5,
    FadeOut = 6,
    ParamUpdate = 7,
}

impl Pattern {
    /// Number of valid pattern ids; anything at or above is rejected.
    pub const COUNT: u8 = 8;

    pub fn from_u8(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => Self::Off,
            1 => Self::Sine,
            2 => Self::Solid,
            3 => Self::Siren,
            4 => Self::Strobe,
            5 => Self::FadeIn,
            6 => Self::FadeOut,
            7 => Self::ParamUpdate,
            _ => return None,
        })
    }
}

/// Parameter tags interleaved with values in command frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Param {
    BiasRed = 0,
    BiasGreen = 1,
    BiasBlue = 2,
    AmplitudeRed = 3,
    AmplitudeGreen = 4,
    AmplitudeBlue = 5,
    Period = 6,
    Repeat = 7,
    PhaseOffset = 8,
    Macro = 9,
    Reset = 10,
    AppChecksum = 11,
}

/// Identifier of a sequence pre-programmed into the LED firmware.
///
/// Any byte is accepted: control messages may name macros this driver
/// has no constant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacroId(pub u8);

impl MacroId {
    pub const RESET: Self = Self(0);
    pub const COLOUR_CYCLE: Self = Self(1);
    pub const BREATH: Self = Self(2);
    pub const STROBE: Self = Self(3);
    pub const FADEIN: Self = Self(4);
    pub const FADEOUT: Self = Self(5);
    pub const RED: Self = Self(6);
    pub const GREEN: Self = Self(7);
    pub const BLUE: Self = Self(8);
    pub const YELLOW: Self = Self(9);
    pub const WHITE: Self = Self(10);
    pub const AUTOMOBILE: Self = Self(11);
    pub const AVIATION: Self = Self(12);
}

// ── LED state ─────────────────────────────────────────────────

/// What one LED shows (or should show).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedState {
    /// Nothing requested; no frame is sent for this LED.
    #[default]
    None,
    Macro(MacroId),
    Rgb {
        pattern: Pattern,
        colour: Rgb,
    },
    RgbExtended {
        pattern: Pattern,
        colour: Rgb,
        amplitude: Rgb,
        period_ms: u16,
        phase_offset: u16,
    },
}

/// Desired and last-sent state for every LED, plus the dirty flag.
#[derive(Debug, Default)]
pub(crate) struct LedTable {
    desired: [LedState; NUM_LEDS],
    sent: [LedState; NUM_LEDS],
    send_required: bool,
}

impl LedTable {
    /// Overwrite the desired state of `target` and flag a send if any
    /// touched LED now differs from what it was last sent.
    pub(crate) fn apply(&mut self, target: Target, state: LedState) {
        for instance in target.instances() {
            let i = instance.index();
            self.desired[i] = state;
            if self.desired[i] != self.sent[i] {
                self.send_required = true;
            }
        }
    }

    /// Reset every desired state. Does not compare against sent state.
    pub(crate) fn clear(&mut self) {
        self.desired = [LedState::None; NUM_LEDS];
        self.send_required = false;
    }

    pub(crate) fn desired(&self, instance: Instance) -> LedState {
        self.desired[instance.index()]
    }

    pub(crate) fn sent(&self, instance: Instance) -> LedState {
        self.sent[instance.index()]
    }

    pub(crate) fn mark_sent(&mut self, instance: Instance) {
        self.sent[instance.index()] = self.desired[instance.index()];
    }

    pub(crate) fn send_required(&self) -> bool {
        self.send_required
    }

    pub(crate) fn send_complete(&mut self) {
        self.send_required = false;
    }
}
