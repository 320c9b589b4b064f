//! Synchronous ISL9241 charger driver implementation

use crate::{error::Error, registers::*, types::*};
use embedded_hal::i2c::I2c;

/// ISL9241 battery charger driver
///
/// Owns the bus-transaction sequencing for one device; no register state is
/// cached. Every call performs at least one bus transaction and no retries
/// are attempted here - retry policy belongs to the caller.
pub struct Isl9241<I> {
    i2c: I,
    addr: u8,
}

impl<I> Isl9241<I>
where
    I: I2c,
{
    /// Create a new ISL9241 driver instance
    ///
    /// # Arguments
    /// * `i2c` - I2C/SMBus bus instance
    ///
    /// # Example
    /// ```no_run
    /// # use isl9241::Isl9241;
    /// # use embedded_hal::i2c::I2c;
    /// # fn example<I: I2c>(i2c: I) {
    /// let charger = Isl9241::new(i2c);
    /// # }
    /// ```
    pub fn new(i2c: I) -> Self {
        Self::with_address(i2c, ISL9241_SLAVE_ADDRESS)
    }

    /// Create a new ISL9241 driver instance with a custom bus address
    ///
    /// The device family uses a fixed 7-bit address unless strapped otherwise
    /// in hardware.
    pub fn with_address(i2c: I, addr: u8) -> Self {
        Self { i2c, addr }
    }

    /// Initialize the charger for a battery pack of `cells` series cells
    ///
    /// Validates the configuration, verifies the device identity, programs
    /// the derived system voltage window and safe default current limits,
    /// then enables ADC conversions in all operating modes.
    ///
    /// * `cells` must be 2, 3 or 4
    /// * `0 <= min_cell_voltage <= max_cell_voltage`
    /// * `cells * max_cell_voltage` must not exceed the 18.304V hardware
    ///   ceiling
    ///
    /// Violations return `Error::InvalidParameter` before any bus traffic;
    /// an identity mismatch returns `Error::DeviceNotFound`. A failure
    /// partway through leaves the device partially configured - re-run
    /// `init` or power-cycle before trusting its state.
    pub fn init(
        &mut self,
        cells: u8,
        min_cell_voltage: f32,
        max_cell_voltage: f32,
    ) -> Result<(), Error<I::Error>> {
        if !(2..=4).contains(&cells) {
            return Err(Error::InvalidParameter);
        }
        if min_cell_voltage < 0.0 || min_cell_voltage > max_cell_voltage {
            return Err(Error::InvalidParameter);
        }
        let cells = cells as f32;
        if cells * max_cell_voltage > ISL9241_SYSTEM_MAX_VOLTAGE {
            return Err(Error::InvalidParameter);
        }

        let id = self.read_register(ISL9241_DEVICE_ID)?;
        if id != ISL9241_CHIP_ID {
            return Err(Error::DeviceNotFound);
        }

        self.set_max_system_voltage(cells * max_cell_voltage)?;
        self.set_min_system_voltage(cells * min_cell_voltage)?;
        self.set_charge_current_limit(ISL9241_DEFAULT_CHARGE_CURRENT_LIMIT)?;
        self.set_adapter_current_limit(ISL9241_DEFAULT_ADAPTER_CURRENT_LIMIT)?;

        // ADC conversions stay on in every operating mode
        self.write_bit(ISL9241_CONTROL3, ISL9241_CONTROL3_ADC_ENABLE_BIT, true)
    }

    // ========================================
    // Low-level register operations
    // ========================================

    /// Read a 16-bit register
    ///
    /// One address-byte write followed by a two-byte read, low byte first.
    pub fn read_register(&mut self, reg: u8) -> Result<u16, Error<I::Error>> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.addr, &[reg], &mut buf)
            .map_err(Error::I2c)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Write a 16-bit register
    ///
    /// One three-byte write: address, low byte, high byte.
    pub fn write_register(&mut self, reg: u8, value: u16) -> Result<(), Error<I::Error>> {
        let [low, high] = value.to_le_bytes();
        self.i2c
            .write(self.addr, &[reg, low, high])
            .map_err(Error::I2c)
    }

    /// Set or clear a single bit of a register, leaving the rest unchanged
    ///
    /// Read-modify-write in two bus transactions. Not atomic against another
    /// bus master; a concurrent external write between the phases is lost.
    /// The device sits on a single-master bus by expectation.
    pub fn write_bit(&mut self, reg: u8, bit: u8, value: bool) -> Result<(), Error<I::Error>> {
        let current = self.read_register(reg)?;
        let updated = if value {
            current | (1u16 << bit)
        } else {
            current & !(1u16 << bit)
        };
        self.write_register(reg, updated)
    }

    /// Read a single bit of a register
    pub fn read_bit(&mut self, reg: u8, bit: u8) -> Result<bool, Error<I::Error>> {
        Ok(self.read_register(reg)? & (1u16 << bit) != 0)
    }

    /// Write a physical value into a bit-field and report what was committed
    fn write_field(&mut self, field: Field, value: f32) -> Result<f32, Error<I::Error>> {
        let raw = field.encode(value);
        self.write_register(field.reg, raw)?;
        Ok(field.decode(raw))
    }

    /// Read a bit-field back as a physical value
    fn read_field(&mut self, field: Field) -> Result<f32, Error<I::Error>> {
        Ok(field.decode(self.read_register(field.reg)?))
    }

    // ========================================
    // System voltage window
    // ========================================

    /// Set the maximum system voltage (8mV steps)
    ///
    /// Returns the value actually committed after quantization; out-of-range
    /// requests saturate at the field maximum.
    pub fn set_max_system_voltage(&mut self, volts: f32) -> Result<f32, Error<I::Error>> {
        self.write_field(MAX_SYSTEM_VOLTAGE, volts)
    }

    /// Get the programmed maximum system voltage
    pub fn get_max_system_voltage(&mut self) -> Result<f32, Error<I::Error>> {
        self.read_field(MAX_SYSTEM_VOLTAGE)
    }

    /// Set the minimum system voltage (64mV steps)
    ///
    /// Returns the value actually committed after quantization.
    pub fn set_min_system_voltage(&mut self, volts: f32) -> Result<f32, Error<I::Error>> {
        self.write_field(MIN_SYSTEM_VOLTAGE, volts)
    }

    /// Get the programmed minimum system voltage
    pub fn get_min_system_voltage(&mut self) -> Result<f32, Error<I::Error>> {
        self.read_field(MIN_SYSTEM_VOLTAGE)
    }

    // ========================================
    // Current limits
    // ========================================

    /// Set the battery fast-charge current limit (4mA steps)
    ///
    /// Returns the value actually committed after quantization.
    pub fn set_charge_current_limit(&mut self, amps: f32) -> Result<f32, Error<I::Error>> {
        self.write_field(CHARGE_CURRENT_LIMIT, amps)
    }

    /// Get the programmed battery fast-charge current limit
    pub fn get_charge_current_limit(&mut self) -> Result<f32, Error<I::Error>> {
        self.read_field(CHARGE_CURRENT_LIMIT)
    }

    /// Set adapter current limit 1 (4mA steps)
    ///
    /// Returns the value actually committed after quantization.
    pub fn set_adapter_current_limit(&mut self, amps: f32) -> Result<f32, Error<I::Error>> {
        self.write_field(ADAPTER_CURRENT_LIMIT_1, amps)
    }

    /// Get adapter current limit 1
    pub fn get_adapter_current_limit(&mut self) -> Result<f32, Error<I::Error>> {
        self.read_field(ADAPTER_CURRENT_LIMIT_1)
    }

    /// Set adapter current limit 2 (4mA steps)
    ///
    /// Register 0x3B doubles as Control7 in other device modes; this call
    /// always addresses it as the secondary current limit.
    pub fn set_adapter_current_limit2(&mut self, amps: f32) -> Result<f32, Error<I::Error>> {
        self.write_field(ADAPTER_CURRENT_LIMIT_2, amps)
    }

    /// Get adapter current limit 2
    pub fn get_adapter_current_limit2(&mut self) -> Result<f32, Error<I::Error>> {
        self.read_field(ADAPTER_CURRENT_LIMIT_2)
    }

    /// Select the trickle charge current level for deeply discharged packs
    ///
    /// The level code shares bits with the charge current limit field, so the
    /// rest of the register is preserved via read-modify-write.
    pub fn set_trickle_charge_current(
        &mut self,
        level: TrickleChargeCurrent,
    ) -> Result<(), Error<I::Error>> {
        let current = self.read_register(TRICKLE_CHARGE_LEVEL.reg)?;
        let updated =
            (current & !TRICKLE_CHARGE_LEVEL.mask) | TRICKLE_CHARGE_LEVEL.encode_steps(level as u16);
        self.write_register(TRICKLE_CHARGE_LEVEL.reg, updated)
    }

    /// Get the selected trickle charge current level
    pub fn get_trickle_charge_current(&mut self) -> Result<TrickleChargeCurrent, Error<I::Error>> {
        let raw = self.read_register(TRICKLE_CHARGE_LEVEL.reg)?;
        Ok(TrickleChargeCurrent::from_raw(
            TRICKLE_CHARGE_LEVEL.decode_steps(raw),
        ))
    }

    // ========================================
    // ADC readback
    // ========================================

    /// Get the measured battery voltage (64mV LSB)
    pub fn get_battery_voltage(&mut self) -> Result<f32, Error<I::Error>> {
        self.read_field(BATTERY_VOLTAGE)
    }

    /// Get the measured battery charge current (22.2mA LSB)
    pub fn get_batt_charge_current(&mut self) -> Result<f32, Error<I::Error>> {
        self.read_field(BATT_CHARGE_CURRENT)
    }

    /// Get the measured battery discharge current (44.4mA LSB)
    pub fn get_batt_discharge_current(&mut self) -> Result<f32, Error<I::Error>> {
        self.read_field(BATT_DISCHARGE_CURRENT)
    }

    /// Get the measured adapter voltage (96mV LSB)
    pub fn get_adapter_voltage(&mut self) -> Result<f32, Error<I::Error>> {
        self.read_field(ADAPTER_VOLTAGE)
    }

    /// Get the measured adapter current (22.2mA LSB)
    pub fn get_adapter_current(&mut self) -> Result<f32, Error<I::Error>> {
        self.read_field(ADAPTER_CURRENT)
    }

    /// Get the measured system voltage (96mV LSB)
    pub fn get_system_voltage(&mut self) -> Result<f32, Error<I::Error>> {
        self.read_field(SYSTEM_VOLTAGE)
    }

    /// Get the measured NTC thermistor voltage (8mV LSB)
    pub fn get_ntc_voltage(&mut self) -> Result<f32, Error<I::Error>> {
        self.read_field(NTC_VOLTAGE)
    }

    // ========================================
    // Status and identity
    // ========================================

    /// Get the charger's internal state machine status
    ///
    /// Read-only from the driver's perspective; the hardware drives its own
    /// transitions.
    pub fn get_state_machine_status(&mut self) -> Result<StateMachineStatus, Error<I::Error>> {
        let raw = self.read_register(STATE_MACHINE_STATUS.reg)?;
        Ok(StateMachineStatus::from_raw(
            STATE_MACHINE_STATUS.decode_steps(raw),
        ))
    }

    /// Read the raw device identity register
    pub fn device_id(&mut self) -> Result<u16, Error<I::Error>> {
        self.read_register(ISL9241_DEVICE_ID)
    }

    /// Read the raw manufacturer identity register
    pub fn manufacturer_id(&mut self) -> Result<u16, Error<I::Error>> {
        self.read_register(ISL9241_MANUFACTURER_ID)
    }

    // ========================================
    // Control bits
    // ========================================

    /// Drive the NGATE control bit
    ///
    /// Set `true` to electrically disconnect the battery from the system
    /// rail.
    pub fn set_ngate(&mut self, disconnect: bool) -> Result<(), Error<I::Error>> {
        self.write_bit(ISL9241_CONTROL1, ISL9241_CONTROL1_NGATE_BIT, disconnect)
    }

    /// Enable ADC conversions in all operating modes
    pub fn enable_adc(&mut self) -> Result<(), Error<I::Error>> {
        self.write_bit(ISL9241_CONTROL3, ISL9241_CONTROL3_ADC_ENABLE_BIT, true)
    }

    /// Disable ADC conversions outside of active charging
    pub fn disable_adc(&mut self) -> Result<(), Error<I::Error>> {
        self.write_bit(ISL9241_CONTROL3, ISL9241_CONTROL3_ADC_ENABLE_BIT, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::i2c::{Mock, Transaction};

    const ADDR: u8 = ISL9241_SLAVE_ADDRESS;

    fn read_tx(reg: u8, value: u16) -> Transaction {
        let [low, high] = value.to_le_bytes();
        Transaction::write_read(ADDR, vec![reg], vec![low, high])
    }

    fn write_tx(reg: u8, value: u16) -> Transaction {
        let [low, high] = value.to_le_bytes();
        Transaction::write(ADDR, vec![reg, low, high])
    }

    #[test]
    fn init_programs_three_cell_window() {
        let expectations = [
            read_tx(ISL9241_DEVICE_ID, 0x000E),
            // 3 * 4.192V = 12.576V -> 1572 steps of 8mV, shifted to bit 3
            write_tx(ISL9241_MAX_SYSTEM_VOLTAGE, 0x3120),
            // 3 * 2.8V = 8.4V -> 131 steps of 64mV, shifted to bit 6
            write_tx(ISL9241_MIN_SYSTEM_VOLTAGE, 0x20C0),
            // default 0.5A charge limit -> 125 steps of 4mA
            write_tx(ISL9241_CHARGE_CURRENT_LIMIT, 125 << 2),
            // default 1.5A adapter limit -> 375 steps of 4mA
            write_tx(ISL9241_ADAPTER_CURRENT_LIMIT1, 375 << 2),
            // ADC enable is a read-modify-write of Control3 bit 0
            read_tx(ISL9241_CONTROL3, 0x0000),
            write_tx(ISL9241_CONTROL3, 0x0001),
        ];
        let mut i2c = Mock::new(&expectations);
        let mut charger = Isl9241::new(i2c.clone());

        charger.init(3, 2.8, 4.192).unwrap();

        i2c.done();
    }

    #[test]
    fn init_rejects_unknown_device() {
        let expectations = [read_tx(ISL9241_DEVICE_ID, 0x9241)];
        let mut i2c = Mock::new(&expectations);
        let mut charger = Isl9241::new(i2c.clone());

        assert_eq!(charger.init(3, 2.8, 4.192), Err(Error::DeviceNotFound));

        i2c.done();
    }

    #[test]
    fn init_rejects_bad_cell_count_without_bus_traffic() {
        let expectations: [Transaction; 0] = [];
        let mut i2c = Mock::new(&expectations);
        let mut charger = Isl9241::new(i2c.clone());

        assert_eq!(charger.init(5, 2.8, 4.192), Err(Error::InvalidParameter));
        assert_eq!(charger.init(1, 2.8, 4.192), Err(Error::InvalidParameter));

        i2c.done();
    }

    #[test]
    fn init_rejects_window_above_hardware_ceiling_without_bus_traffic() {
        let expectations: [Transaction; 0] = [];
        let mut i2c = Mock::new(&expectations);
        let mut charger = Isl9241::new(i2c.clone());

        // 2 * 10.0V = 20V, above the 18.304V ceiling
        assert_eq!(charger.init(2, 10.0, 10.0), Err(Error::InvalidParameter));

        i2c.done();
    }

    #[test]
    fn init_rejects_inverted_cell_bounds_without_bus_traffic() {
        let expectations: [Transaction; 0] = [];
        let mut i2c = Mock::new(&expectations);
        let mut charger = Isl9241::new(i2c.clone());

        assert_eq!(charger.init(3, 4.2, 2.8), Err(Error::InvalidParameter));
        assert_eq!(charger.init(3, -1.0, 4.2), Err(Error::InvalidParameter));

        i2c.done();
    }

    #[test]
    fn set_max_system_voltage_reports_committed_value() {
        let expectations = [write_tx(ISL9241_MAX_SYSTEM_VOLTAGE, 0x3120)];
        let mut i2c = Mock::new(&expectations);
        let mut charger = Isl9241::new(i2c.clone());

        // exact multiple of the 8mV LSB, so no quantization loss
        let committed = charger.set_max_system_voltage(12.576).unwrap();
        assert!((committed - 12.576).abs() < 1e-4);

        i2c.done();
    }

    #[test]
    fn setter_reports_quantized_setpoint() {
        // 1.001A is not a multiple of 4mA; the hardware gets 250 steps and
        // the caller must see 1.000A, not the request
        let expectations = [write_tx(ISL9241_CHARGE_CURRENT_LIMIT, 250 << 2)];
        let mut i2c = Mock::new(&expectations);
        let mut charger = Isl9241::new(i2c.clone());

        let committed = charger.set_charge_current_limit(1.001).unwrap();
        assert!((committed - 1.0).abs() < 1e-4);

        i2c.done();
    }

    #[test]
    fn oversized_request_saturates_the_field() {
        let expectations = [write_tx(ISL9241_ADAPTER_CURRENT_LIMIT1, 0x1FFC)];
        let mut i2c = Mock::new(&expectations);
        let mut charger = Isl9241::new(i2c.clone());

        let committed = charger.set_adapter_current_limit(100.0).unwrap();
        assert!((committed - ADAPTER_CURRENT_LIMIT_1.max_value()).abs() < 1e-4);

        i2c.done();
    }

    #[test]
    fn adapter_current_limit2_addresses_its_own_register() {
        let expectations = [
            write_tx(ISL9241_ADAPTER_CURRENT_LIMIT2, 500 << 2),
            read_tx(ISL9241_ADAPTER_CURRENT_LIMIT2, 500 << 2),
        ];
        let mut i2c = Mock::new(&expectations);
        let mut charger = Isl9241::new(i2c.clone());

        let committed = charger.set_adapter_current_limit2(2.0).unwrap();
        assert!((committed - 2.0).abs() < 1e-4);
        let read_back = charger.get_adapter_current_limit2().unwrap();
        assert!((read_back - 2.0).abs() < 1e-4);

        i2c.done();
    }

    #[test]
    fn write_bit_preserves_other_bits() {
        let expectations = [
            read_tx(ISL9241_CONTROL1, 0xA50F),
            write_tx(ISL9241_CONTROL1, 0xB50F),
            read_tx(ISL9241_CONTROL1, 0xB50F),
            write_tx(ISL9241_CONTROL1, 0xA50F),
        ];
        let mut i2c = Mock::new(&expectations);
        let mut charger = Isl9241::new(i2c.clone());

        charger.write_bit(ISL9241_CONTROL1, 12, true).unwrap();
        charger.write_bit(ISL9241_CONTROL1, 12, false).unwrap();

        i2c.done();
    }

    #[test]
    fn read_bit_extracts_single_bit() {
        let expectations = [
            read_tx(ISL9241_CONTROL1, 1 << 12),
            read_tx(ISL9241_CONTROL1, 1 << 12),
        ];
        let mut i2c = Mock::new(&expectations);
        let mut charger = Isl9241::new(i2c.clone());

        assert!(charger.read_bit(ISL9241_CONTROL1, 12).unwrap());
        assert!(!charger.read_bit(ISL9241_CONTROL1, 0).unwrap());

        i2c.done();
    }

    #[test]
    fn set_ngate_drives_control1_bit_12() {
        let expectations = [
            read_tx(ISL9241_CONTROL1, 0x0000),
            write_tx(ISL9241_CONTROL1, 0x1000),
        ];
        let mut i2c = Mock::new(&expectations);
        let mut charger = Isl9241::new(i2c.clone());

        charger.set_ngate(true).unwrap();

        i2c.done();
    }

    #[test]
    fn state_machine_status_decodes_information2() {
        let expectations = [
            read_tx(ISL9241_INFORMATION2, 0x0600),
            read_tx(ISL9241_INFORMATION2, 0x0A00),
            // status field is bits 11:8 only, surrounding bits are noise
            read_tx(ISL9241_INFORMATION2, 0xF4FF),
        ];
        let mut i2c = Mock::new(&expectations);
        let mut charger = Isl9241::new(i2c.clone());

        assert_eq!(
            charger.get_state_machine_status().unwrap(),
            StateMachineStatus::SmbCharge
        );
        assert_eq!(
            charger.get_state_machine_status().unwrap(),
            StateMachineStatus::Ready
        );
        assert_eq!(
            charger.get_state_machine_status().unwrap(),
            StateMachineStatus::BattOnly
        );

        i2c.done();
    }

    #[test]
    fn bus_failure_propagates_as_i2c_error() {
        use embedded_hal::i2c::ErrorKind;
        let expectations =
            [read_tx(ISL9241_INFORMATION2, 0).with_error(ErrorKind::Other)];
        let mut i2c = Mock::new(&expectations);
        let mut charger = Isl9241::new(i2c.clone());

        assert!(matches!(
            charger.get_state_machine_status(),
            Err(Error::I2c(_))
        ));

        i2c.done();
    }

    #[test]
    fn adc_getters_apply_mask_shift_and_lsb() {
        let expectations = [
            // VBAT: 65 steps of 64mV = 4.16V in bits 13:6
            read_tx(ISL9241_VBAT_ADC_RESULT, 65 << 6),
            // IADP: 10 steps of 22.2mA in bits 7:0, upper byte is noise
            read_tx(ISL9241_IADP_ADC_RESULT, 0xFF0A),
            // VSYS: 120 steps of 96mV = 11.52V
            read_tx(ISL9241_VSYS_ADC_RESULT, 120 << 6),
            // DC: 5 steps of 44.4mA
            read_tx(ISL9241_DC_ADC_RESULT, 0x0005),
        ];
        let mut i2c = Mock::new(&expectations);
        let mut charger = Isl9241::new(i2c.clone());

        assert!((charger.get_battery_voltage().unwrap() - 4.16).abs() < 1e-3);
        assert!((charger.get_adapter_current().unwrap() - 0.222).abs() < 1e-3);
        assert!((charger.get_system_voltage().unwrap() - 11.52).abs() < 1e-3);
        assert!((charger.get_batt_discharge_current().unwrap() - 0.222).abs() < 1e-3);

        i2c.done();
    }

    #[test]
    fn trickle_level_read_modify_write_keeps_neighbouring_bits() {
        let expectations = [
            read_tx(ISL9241_CHARGE_CURRENT_LIMIT, 0x01F4),
            // level I128mA = code 2 into bits 4:2, bits outside 0x001C kept
            write_tx(ISL9241_CHARGE_CURRENT_LIMIT, 0x01E8),
            read_tx(ISL9241_CHARGE_CURRENT_LIMIT, 0x0018),
        ];
        let mut i2c = Mock::new(&expectations);
        let mut charger = Isl9241::new(i2c.clone());

        charger
            .set_trickle_charge_current(TrickleChargeCurrent::I128mA)
            .unwrap();
        assert_eq!(
            charger.get_trickle_charge_current().unwrap(),
            TrickleChargeCurrent::I256mA
        );

        i2c.done();
    }

    #[test]
    fn identity_getters_read_raw_registers() {
        let expectations = [
            read_tx(ISL9241_DEVICE_ID, ISL9241_CHIP_ID),
            read_tx(ISL9241_MANUFACTURER_ID, ISL9241_MANUFACTURER_CODE),
        ];
        let mut i2c = Mock::new(&expectations);
        let mut charger = Isl9241::new(i2c.clone());

        assert_eq!(charger.device_id().unwrap(), 0x000E);
        assert_eq!(charger.manufacturer_id().unwrap(), 0x0049);

        i2c.done();
    }

    #[test]
    fn register_bytes_are_little_endian_on_the_wire() {
        let expectations = [
            Transaction::write(ADDR, vec![ISL9241_MAX_SYSTEM_VOLTAGE, 0x20, 0x31]),
            Transaction::write_read(
                ADDR,
                vec![ISL9241_MAX_SYSTEM_VOLTAGE],
                vec![0x20, 0x31],
            ),
        ];
        let mut i2c = Mock::new(&expectations);
        let mut charger = Isl9241::new(i2c.clone());

        charger
            .write_register(ISL9241_MAX_SYSTEM_VOLTAGE, 0x3120)
            .unwrap();
        assert_eq!(
            charger.read_register(ISL9241_MAX_SYSTEM_VOLTAGE).unwrap(),
            0x3120
        );

        i2c.done();
    }
}
