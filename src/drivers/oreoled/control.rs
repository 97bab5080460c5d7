//! Decoder for inbound LED control messages.
//!
//! The message layer hands us an already-parsed `LED_CONTROL` packet:
//! target instance, a pattern/opcode byte, and up to 24 custom bytes.
//!
//! | Opcode     | Meaning                                              |
//! |------------|------------------------------------------------------|
//! | `0`        | OFF: drop any override, clear all desired state      |
//! | `255`      | CUSTOM: 4-byte ASCII tag selects `RGB0` or `RGB1`    |
//! | anything   | Run that macro id                                    |
//!
//! ```text
//! RGB0: "RGB0" pattern r g b                                  (8 B)
//! RGB1: "RGB1" pattern r g b ar ag ab per_hi per_lo ph_hi ph_lo (15 B)
//! ```

use core::fmt;

use heapless::Vec;

use super::state::{LedState, MacroId, Pattern, Rgb, Target};

/// Opcode that cancels any override.
pub const LED_CONTROL_PATTERN_OFF: u8 = 0;
/// Opcode whose payload carries an RGB sub-command.
pub const LED_CONTROL_PATTERN_CUSTOM: u8 = 255;

/// Length of the ASCII sub-command tag.
pub const CUSTOM_HEADER_LENGTH: usize = 4;
/// Capacity of the custom byte field.
pub const MAX_CUSTOM_LEN: usize = 24;

const RGB0_TAG: &[u8; CUSTOM_HEADER_LENGTH] = b"RGB0";
const RGB1_TAG: &[u8; CUSTOM_HEADER_LENGTH] = b"RGB1";
const RGB0_LEN: usize = CUSTOM_HEADER_LENGTH + 4;
const RGB1_LEN: usize = CUSTOM_HEADER_LENGTH + 11;

/// One inbound LED control request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedControl {
    /// `0..4` for one LED, `0xFF` for all.
    pub instance: u8,
    pub pattern: u8,
    pub custom: Vec<u8, MAX_CUSTOM_LEN>,
}

impl LedControl {
    /// Build a message, rejecting payloads longer than the wire field.
    pub fn new(instance: u8, pattern: u8, custom: &[u8]) -> Result<Self, DecodeError> {
        let custom =
            Vec::from_slice(custom).map_err(|()| DecodeError::PayloadTooLong(custom.len()))?;
        Ok(Self {
            instance,
            pattern,
            custom,
        })
    }

    /// Build from the raw fixed-size wire field; `custom_len` is clamped.
    pub fn from_wire(
        instance: u8,
        pattern: u8,
        custom_len: u8,
        custom_bytes: &[u8; MAX_CUSTOM_LEN],
    ) -> Self {
        let len = (custom_len as usize).min(MAX_CUSTOM_LEN);
        let mut custom = Vec::new();
        // len never exceeds capacity.
        let _ = custom.extend_from_slice(&custom_bytes[..len]);
        Self {
            instance,
            pattern,
            custom,
        }
    }
}

/// A validated control request, ready to apply to the LED table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedCommand {
    Off,
    Rgb {
        target: Target,
        pattern: Pattern,
        colour: Rgb,
    },
    RgbExtended {
        target: Target,
        pattern: Pattern,
        colour: Rgb,
        amplitude: Rgb,
        period_ms: u16,
        phase_offset: u16,
    },
    Macro {
        target: Target,
        id: MacroId,
    },
}

impl LedCommand {
    /// Target and resulting desired state; `None` for [`LedCommand::Off`].
    pub fn into_state(self) -> Option<(Target, LedState)> {
        match self {
            Self::Off => None,
            Self::Rgb {
                target,
                pattern,
                colour,
            } => Some((target, LedState::Rgb { pattern, colour })),
            Self::RgbExtended {
                target,
                pattern,
                colour,
                amplitude,
                period_ms,
                phase_offset,
            } => Some((
                target,
                LedState::RgbExtended {
                    pattern,
                    colour,
                    amplitude,
                    period_ms,
                    phase_offset,
                },
            )),
            Self::Macro { target, id } => Some((target, LedState::Macro(id))),
        }
    }
}

/// Why a control message was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    InvalidInstance(u8),
    PayloadTooLong(usize),
    HeaderTooShort(usize),
    UnknownSubCommand([u8; CUSTOM_HEADER_LENGTH]),
    LengthMismatch { expected: usize, actual: usize },
    InvalidPattern(u8),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInstance(i) => write!(f, "invalid instance {i}"),
            Self::PayloadTooLong(n) => write!(f, "custom payload of {n} bytes exceeds {MAX_CUSTOM_LEN}"),
            Self::HeaderTooShort(n) => write!(f, "custom payload of {n} bytes has no sub-command"),
            Self::UnknownSubCommand(tag) => write!(f, "unknown sub-command {:02x?}", tag),
            Self::LengthMismatch { expected, actual } => {
                write!(f, "expected {expected} bytes, got {actual}")
            }
            Self::InvalidPattern(p) => write!(f, "invalid pattern id {p}"),
        }
    }
}

/// Validate `msg` and turn it into a [`LedCommand`].
pub fn decode(msg: &LedControl) -> Result<LedCommand, DecodeError> {
    let target = Target::from_raw(msg.instance).ok_or(DecodeError::InvalidInstance(msg.instance))?;

    match msg.pattern {
        LED_CONTROL_PATTERN_OFF => Ok(LedCommand::Off),
        LED_CONTROL_PATTERN_CUSTOM => decode_custom(target, &msg.custom),
        id => Ok(LedCommand::Macro {
            target,
            id: MacroId(id),
        }),
    }
}

fn decode_custom(target: Target, bytes: &[u8]) -> Result<LedCommand, DecodeError> {
    if bytes.len() < CUSTOM_HEADER_LENGTH {
        return Err(DecodeError::HeaderTooShort(bytes.len()));
    }
    let (tag, body) = bytes.split_at(CUSTOM_HEADER_LENGTH);

    if tag == RGB0_TAG {
        expect_len(bytes, RGB0_LEN)?;
        let pattern = parse_pattern(body[0])?;
        Ok(LedCommand::Rgb {
            target,
            pattern,
            colour: (body[1], body[2], body[3]),
        })
    } else if tag == RGB1_TAG {
        expect_len(bytes, RGB1_LEN)?;
        let pattern = parse_pattern(body[0])?;
        Ok(LedCommand::RgbExtended {
            target,
            pattern,
            colour: (body[1], body[2], body[3]),
            amplitude: (body[4], body[5], body[6]),
            period_ms: u16::from_be_bytes([body[7], body[8]]),
            phase_offset: u16::from_be_bytes([body[9], body[10]]),
        })
    } else {
        let mut unknown = [0u8; CUSTOM_HEADER_LENGTH];
        unknown.copy_from_slice(tag);
        Err(DecodeError::UnknownSubCommand(unknown))
    }
}

fn expect_len(bytes: &[u8], expected: usize) -> Result<(), DecodeError> {
    if bytes.len() == expected {
        Ok(())
    } else {
        Err(DecodeError::LengthMismatch {
            expected,
            actual: bytes.len(),
        })
    }
}

fn parse_pattern(raw: u8) -> Result<Pattern, DecodeError> {
    Pattern::from_u8(raw).ok_or(DecodeError::InvalidPattern(raw))
}
