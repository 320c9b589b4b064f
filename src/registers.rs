//! Register addresses, bit-field descriptors and scale constants for the ISL9241
//!
//! Addresses, field masks and LSB weights follow the ISL9241 datasheet. The
//! 16-bit registers are little-endian on the wire (low byte first).

/// SMBus address for the ISL9241 (fixed for the device family)
pub const ISL9241_SLAVE_ADDRESS: u8 = 0x09;

/// Device ID register - reads back the silicon identity code
pub const ISL9241_DEVICE_ID: u8 = 0xFF;

/// Expected Device ID value for the ISL9241
pub const ISL9241_CHIP_ID: u16 = 0x000E;

/// Manufacturer ID register
pub const ISL9241_MANUFACTURER_ID: u8 = 0xFE;

/// Expected Manufacturer ID value (Renesas/Intersil)
pub const ISL9241_MANUFACTURER_CODE: u16 = 0x0049;

/// Charge current limit register - battery fast-charge current, 4mA LSB
pub const ISL9241_CHARGE_CURRENT_LIMIT: u8 = 0x14;

/// Maximum system voltage register - charger output ceiling, 8mV LSB
pub const ISL9241_MAX_SYSTEM_VOLTAGE: u8 = 0x15;

/// Control0 register - charger pump, gate drive and trickle options
pub const ISL9241_CONTROL0: u8 = 0x39;

/// Information1 register - live charger flags
pub const ISL9241_INFORMATION1: u8 = 0x3A;

/// Adapter current limit 2 register - secondary input current limit, 4mA LSB
pub const ISL9241_ADAPTER_CURRENT_LIMIT2: u8 = 0x3B;

/// Control7 register - shares address 0x3B with AdapterCurrentLimit2; the
/// device interprets it by mode, callers pick the meaning explicitly
pub const ISL9241_CONTROL7: u8 = 0x3B;

/// Control1 register - NGATE/BGATE drive, learn mode, OTG control
pub const ISL9241_CONTROL1: u8 = 0x3C;

/// Control2 register - prochot debounce and trickle charge options
pub const ISL9241_CONTROL2: u8 = 0x3D;

/// Minimum system voltage register - 64mV LSB
pub const ISL9241_MIN_SYSTEM_VOLTAGE: u8 = 0x3E;

/// Adapter current limit 1 register - primary input current limit, 4mA LSB
pub const ISL9241_ADAPTER_CURRENT_LIMIT1: u8 = 0x3F;

/// ACOK reference register
pub const ISL9241_ACOK_REFERENCE: u8 = 0x40;

/// Control6 register
pub const ISL9241_CONTROL6: u8 = 0x43;

/// AC PROCHOT threshold register
pub const ISL9241_AC_PROCHOT: u8 = 0x47;

/// DC PROCHOT threshold register
pub const ISL9241_DC_PROCHOT: u8 = 0x48;

/// OTG output voltage register
pub const ISL9241_OTG_VOLTAGE: u8 = 0x49;

/// OTG output current register
pub const ISL9241_OTG_CURRENT: u8 = 0x4A;

/// VIN voltage set point register
pub const ISL9241_VIN_VOLTAGE: u8 = 0x4B;

/// Control3 register - ADC conversion enables, battery learn options
pub const ISL9241_CONTROL3: u8 = 0x4C;

/// Information2 register - state machine status in bits 11:8
pub const ISL9241_INFORMATION2: u8 = 0x4D;

/// Control4 register
pub const ISL9241_CONTROL4: u8 = 0x4E;

/// Control5 register
pub const ISL9241_CONTROL5: u8 = 0x4F;

/// NTC ADC result register - thermistor voltage, 8mV LSB
pub const ISL9241_NTC_ADC_RESULT: u8 = 0x80;

/// VBAT ADC result register - battery voltage, 64mV LSB
pub const ISL9241_VBAT_ADC_RESULT: u8 = 0x81;

/// TJ ADC result register - junction temperature
pub const ISL9241_TJ_ADC_RESULT: u8 = 0x82;

/// IADP ADC result register - adapter current, 22.2mA LSB
pub const ISL9241_IADP_ADC_RESULT: u8 = 0x83;

/// DC ADC result register - battery discharge current, 44.4mA LSB
pub const ISL9241_DC_ADC_RESULT: u8 = 0x84;

/// CC ADC result register - battery charge current, 22.2mA LSB
pub const ISL9241_CC_ADC_RESULT: u8 = 0x85;

/// VSYS ADC result register - system voltage, 96mV LSB
pub const ISL9241_VSYS_ADC_RESULT: u8 = 0x86;

/// VIN ADC result register - adapter voltage, 96mV LSB
pub const ISL9241_VIN_ADC_RESULT: u8 = 0x87;

/// Information3 register
pub const ISL9241_INFORMATION3: u8 = 0x90;

/// Information4 register
pub const ISL9241_INFORMATION4: u8 = 0x91;

/// NGATE drive bit in Control1 - set to disconnect the battery from VSYS
pub const ISL9241_CONTROL1_NGATE_BIT: u8 = 12;

/// ADC conversion enable bit in Control3 - enables conversions in all modes
pub const ISL9241_CONTROL3_ADC_ENABLE_BIT: u8 = 0;

/// Hardware ceiling for the programmable system voltage (4 cells x 4.576V)
pub const ISL9241_SYSTEM_MAX_VOLTAGE: f32 = 18.304;

/// Minimum adapter voltage at which the charger keeps operating
pub const ISL9241_MIN_OPERATING_VOLTAGE: f32 = 3.9;

/// Charge current limit programmed by `init` until the host picks its own
pub const ISL9241_DEFAULT_CHARGE_CURRENT_LIMIT: f32 = 0.5;

/// Adapter current limit programmed by `init` until the host picks its own
pub const ISL9241_DEFAULT_ADAPTER_CURRENT_LIMIT: f32 = 1.5;

/// One bit-field of a 16-bit ISL9241 register
///
/// Each logical parameter is a `(register, mask, shift, lsb)` tuple fixed at
/// compile time. `lsb` is the physical value of one raw step (volts or amps);
/// fields that carry level codes rather than linear quantities use the
/// step-based accessors directly.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Field {
    /// Register address on the bus
    pub reg: u8,
    /// Mask selecting the field within the register
    pub mask: u16,
    /// Position of the field's least significant bit
    pub shift: u8,
    /// Physical value of one raw step
    pub lsb: f32,
}

impl Field {
    /// Define a bit-field descriptor
    pub const fn new(reg: u8, mask: u16, shift: u8, lsb: f32) -> Self {
        Self {
            reg,
            mask,
            shift,
            lsb,
        }
    }

    /// Largest raw step count the field can hold
    pub const fn max_steps(&self) -> u16 {
        self.mask >> self.shift
    }

    /// Place a raw step count into the field, saturating at the field width
    ///
    /// Out-of-range requests clamp to the maximum instead of wrapping, so an
    /// oversized value can never corrupt neighbouring fields in the register.
    pub const fn encode_steps(&self, steps: u16) -> u16 {
        let max = self.max_steps();
        let steps = if steps > max { max } else { steps };
        steps << self.shift
    }

    /// Extract the raw step count from a register value
    pub const fn decode_steps(&self, raw: u16) -> u16 {
        (raw & self.mask) >> self.shift
    }

    /// Encode a physical value into the register, rounding to the nearest LSB
    ///
    /// Negative requests clamp to zero, oversized ones saturate at
    /// [`max_value`](Self::max_value).
    pub fn encode(&self, value: f32) -> u16 {
        if value <= 0.0 {
            return 0;
        }
        self.encode_steps((value / self.lsb + 0.5) as u16)
    }

    /// Decode a register value back into a physical quantity
    pub fn decode(&self, raw: u16) -> f32 {
        self.decode_steps(raw) as f32 * self.lsb
    }

    /// Largest physical value the field can represent
    pub fn max_value(&self) -> f32 {
        self.max_steps() as f32 * self.lsb
    }
}

/// Battery fast-charge current limit, bits 12:2, 4mA LSB
pub const CHARGE_CURRENT_LIMIT: Field = Field::new(ISL9241_CHARGE_CURRENT_LIMIT, 0x1FFC, 2, 4e-3);

/// Trickle charge level code, bits 4:2 of the charge current limit register
///
/// Level-coded, not linear: the raw value selects one of the
/// [`TrickleChargeCurrent`](crate::TrickleChargeCurrent) presets.
pub const TRICKLE_CHARGE_LEVEL: Field = Field::new(ISL9241_CHARGE_CURRENT_LIMIT, 0x001C, 2, 1.0);

/// Maximum system voltage, bits 13:3, 8mV LSB
pub const MAX_SYSTEM_VOLTAGE: Field = Field::new(ISL9241_MAX_SYSTEM_VOLTAGE, 0x3FF8, 3, 8e-3);

/// Minimum system voltage, bits 13:6, 64mV LSB
pub const MIN_SYSTEM_VOLTAGE: Field = Field::new(ISL9241_MIN_SYSTEM_VOLTAGE, 0x3FC0, 6, 64e-3);

/// Adapter current limit 1, bits 12:2, 4mA LSB
pub const ADAPTER_CURRENT_LIMIT_1: Field =
    Field::new(ISL9241_ADAPTER_CURRENT_LIMIT1, 0x1FFC, 2, 4e-3);

/// Adapter current limit 2, bits 12:2, 4mA LSB
pub const ADAPTER_CURRENT_LIMIT_2: Field =
    Field::new(ISL9241_ADAPTER_CURRENT_LIMIT2, 0x1FFC, 2, 4e-3);

/// NTC thermistor voltage ADC reading, bits 13:6, 8mV LSB
pub const NTC_VOLTAGE: Field = Field::new(ISL9241_NTC_ADC_RESULT, 0x3FC0, 6, 8e-3);

/// Battery voltage ADC reading, bits 13:6, 64mV LSB
pub const BATTERY_VOLTAGE: Field = Field::new(ISL9241_VBAT_ADC_RESULT, 0x3FC0, 6, 64e-3);

/// Adapter current ADC reading, bits 7:0, 22.2mA LSB
pub const ADAPTER_CURRENT: Field = Field::new(ISL9241_IADP_ADC_RESULT, 0x00FF, 0, 22.2e-3);

/// Battery discharge current ADC reading, bits 7:0, 44.4mA LSB
pub const BATT_DISCHARGE_CURRENT: Field = Field::new(ISL9241_DC_ADC_RESULT, 0x00FF, 0, 44.4e-3);

/// Battery charge current ADC reading, bits 7:0, 22.2mA LSB
pub const BATT_CHARGE_CURRENT: Field = Field::new(ISL9241_CC_ADC_RESULT, 0x00FF, 0, 22.2e-3);

/// System voltage ADC reading, bits 13:6, 96mV LSB
pub const SYSTEM_VOLTAGE: Field = Field::new(ISL9241_VSYS_ADC_RESULT, 0x3FC0, 6, 96e-3);

/// Adapter voltage ADC reading, bits 13:6, 96mV LSB
pub const ADAPTER_VOLTAGE: Field = Field::new(ISL9241_VIN_ADC_RESULT, 0x3FC0, 6, 96e-3);

/// Charger state machine status code, bits 11:8 of Information2
pub const STATE_MACHINE_STATUS: Field = Field::new(ISL9241_INFORMATION2, 0x0F00, 8, 1.0);
