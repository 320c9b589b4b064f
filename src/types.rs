//! Type definitions and enumerations for ISL9241 configuration
//!
//! Strongly-typed views of the level-coded and status bit-fields.

/// Charger state machine status, bits 11:8 of Information2
///
/// Reported by the hardware's own state machine; the driver only observes it
/// and never drives transitions. The odd-numbered `InternalWakeUp*` states are
/// transient wake states the charger passes through on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[repr(u8)]
pub enum StateMachineStatus {
    /// Power-on reset state
    Reset = 0,
    InternalWakeUp1 = 1,
    /// Charging autonomously from the adapter
    AutoCharge = 2,
    InternalWakeUp2 = 3,
    /// Running from the battery, no adapter present
    BattOnly = 4,
    InternalWakeUp3 = 5,
    /// Charging under SMBus host control
    SmbCharge = 6,
    /// Fault condition latched
    Fault = 7,
    InternalWakeUp4 = 8,
    /// Reverse boost, sourcing power out of the adapter port
    Otg = 9,
    /// Configured and waiting
    Ready = 10,
    InternalWakeUp5 = 11,
    /// Regulating the system rail
    Vsys = 12,
}

impl StateMachineStatus {
    /// Decode the 4-bit status code from Information2
    ///
    /// The datasheet defines codes 0 through 12; the remaining encodings of
    /// the 4-bit field are reserved and fold to `Reset`.
    pub const fn from_raw(raw: u16) -> Self {
        match raw & 0x0F {
            0 => Self::Reset,
            1 => Self::InternalWakeUp1,
            2 => Self::AutoCharge,
            3 => Self::InternalWakeUp2,
            4 => Self::BattOnly,
            5 => Self::InternalWakeUp3,
            6 => Self::SmbCharge,
            7 => Self::Fault,
            8 => Self::InternalWakeUp4,
            9 => Self::Otg,
            10 => Self::Ready,
            11 => Self::InternalWakeUp5,
            12 => Self::Vsys,
            _ => Self::Reset,
        }
    }
}

/// Trickle charge current levels for deeply discharged batteries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[repr(u8)]
pub enum TrickleChargeCurrent {
    I32mA = 0,
    I64mA = 1,
    I128mA = 2,
    I160mA = 3,
    I192mA = 4,
    I224mA = 5,
    I256mA = 6,
}

impl TrickleChargeCurrent {
    /// Decode the 3-bit trickle level code; the unused top code reads back as
    /// the maximum level
    pub const fn from_raw(raw: u16) -> Self {
        match raw & 0x07 {
            0 => Self::I32mA,
            1 => Self::I64mA,
            2 => Self::I128mA,
            3 => Self::I160mA,
            4 => Self::I192mA,
            5 => Self::I224mA,
            _ => Self::I256mA,
        }
    }
}
