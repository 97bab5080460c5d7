//! Vehicle status snapshot consumed by notification backends.
//!
//! The vehicle code fills one of these each loop and hands it to
//! [`NotifyService`](super::service::NotifyService). Backends only ever
//! read it.

/// Point-in-time vehicle status flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyFlags {
    /// Firmware update / bootloader in progress.
    pub firmware_update: bool,
    /// Sensors (gyros) still initialising.
    pub initialising: bool,
    /// RC link lost.
    pub failsafe_radio: bool,
    /// Battery below failsafe threshold.
    pub failsafe_battery: bool,
    /// An autopilot (non-manual) flight mode is active.
    pub autopilot_mode: bool,
    pub armed: bool,
    /// General pre-arm checks pass.
    pub pre_arm_check: bool,
    /// GPS-specific pre-arm checks pass.
    pub pre_arm_gps_check: bool,
    /// GPS is being fused by the EKF.
    pub gps_fusion: bool,
    /// EKF reports a bad solution.
    pub ekf_bad: bool,
}

impl NotifyFlags {
    /// Armed, or ready to arm.
    pub fn arming_ready(&self) -> bool {
        self.armed || (self.pre_arm_check && self.pre_arm_gps_check)
    }
}
