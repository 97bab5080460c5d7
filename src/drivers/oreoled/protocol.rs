//! OreoLED I2C wire format.
//!
//! Every LED listens on `base + instance`. Command frames are a payload
//! followed by one XOR checksum byte:
//!
//! ```text
//! ┌───────────────────────────┬──────────────────────────────┐
//! │ Payload (3, 7 or 19 B)    │ XOR(address, payload...) 1 B │
//! └───────────────────────────┴──────────────────────────────┘
//! ```
//!
//! | State        | Payload                                                    |
//! |--------------|------------------------------------------------------------|
//! | Macro        | `ParamUpdate, Param::Macro, id`                            |
//! | Rgb          | `pattern, BiasRed, r, BiasGreen, g, BiasBlue, b`           |
//! | RgbExtended  | Rgb + amplitudes + `Period, hi, lo, PhaseOffset, hi, lo`   |
//!
//! 16-bit values go out big-endian. The sync broadcast is the only frame
//! sent without a checksum.

use heapless::Vec;

use super::state::{Instance, LedState, Param, Pattern, Rgb};

/// Default address of the back-left LED; the others follow it.
pub const BASE_I2C_ADDR: u8 = 0x68;

/// First byte of the bootloader "start application" command.
pub const BOOT_CMD_BOOT_APP: u8 = 0x60;
/// Nonce the bootloader expects after [`BOOT_CMD_BOOT_APP`].
pub const BOOT_CMD_BOOT_NONCE: u8 = 0xA2;

/// General-call address used by the sync broadcast.
pub const SYNC_ADDRESS: u8 = 0x00;
/// General hardware call, master address 0.
pub const SYNC_FRAME: [u8; 2] = [0x01, 0x00];

/// Longest payload (RgbExtended) plus the checksum byte.
pub const MAX_FRAME_SIZE: usize = 20;

/// Bytes requested back from an LED after a command. Contents are ignored.
pub const REPLY_SIZE: usize = 3;

const RGB_PAYLOAD_LEN: usize = 7;
const EXTENDED_PAYLOAD_LEN: usize = 19;

/// Bus address of one LED.
pub fn led_address(base: u8, instance: Instance) -> u8 {
    base.wrapping_add(instance as u8)
}

/// XOR of the target address followed by every payload byte.
pub fn xor_checksum(address: u8, payload: &[u8]) -> u8 {
    payload.iter().fold(address, |acc, b| acc ^ b)
}

/// A checksummed frame ready for the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFrame {
    address: u8,
    bytes: Vec<u8, MAX_FRAME_SIZE>,
}

impl CommandFrame {
    fn sealed(address: u8, payload: &[u8]) -> Self {
        debug_assert!(payload.len() < MAX_FRAME_SIZE);
        let mut bytes = Vec::new();
        // Capacity covers the longest layout plus checksum.
        let _ = bytes.extend_from_slice(payload);
        let _ = bytes.push(xor_checksum(address, payload));
        Self { address, bytes }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn checksum(&self) -> u8 {
        self.bytes.last().copied().unwrap_or(0)
    }
}

/// Serialize `state` for the LED at `address`. `None` has no frame.
pub fn encode_command(address: u8, state: &LedState) -> Option<CommandFrame> {
    let frame = match *state {
        LedState::None => return None,
        LedState::Macro(id) => CommandFrame::sealed(
            address,
            &[Pattern::ParamUpdate as u8, Param::Macro as u8, id.0],
        ),
        LedState::Rgb { pattern, colour } => {
            CommandFrame::sealed(address, &rgb_payload(pattern, colour))
        }
        LedState::RgbExtended {
            pattern,
            colour,
            amplitude,
            period_ms,
            phase_offset,
        } => {
            let (ar, ag, ab) = amplitude;
            let [period_hi, period_lo] = period_ms.to_be_bytes();
            let [phase_hi, phase_lo] = phase_offset.to_be_bytes();

            let mut payload = [0u8; EXTENDED_PAYLOAD_LEN];
            payload[..RGB_PAYLOAD_LEN].copy_from_slice(&rgb_payload(pattern, colour));
            payload[RGB_PAYLOAD_LEN..].copy_from_slice(&[
                Param::AmplitudeRed as u8,
                ar,
                Param::AmplitudeGreen as u8,
                ag,
                Param::AmplitudeBlue as u8,
                ab,
                Param::Period as u8,
                period_hi,
                period_lo,
                Param::PhaseOffset as u8,
                phase_hi,
                phase_lo,
            ]);
            CommandFrame::sealed(address, &payload)
        }
    };
    Some(frame)
}

/// Bootloader command telling the LED at `address` to start its application.
pub fn boot_frame(address: u8) -> CommandFrame {
    CommandFrame::sealed(address, &[BOOT_CMD_BOOT_APP, BOOT_CMD_BOOT_NONCE, address])
}

fn rgb_payload(pattern: Pattern, (r, g, b): Rgb) -> [u8; RGB_PAYLOAD_LEN] {
    [
        pattern as u8,
        Param::BiasRed as u8,
        r,
        Param::BiasGreen as u8,
        g,
        Param::BiasBlue as u8,
        b,
    ]
}
