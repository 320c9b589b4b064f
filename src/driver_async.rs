//! Async ISL9241 charger driver implementation

use crate::{error::Error, registers::*, types::*};

#[cfg(feature = "async")]
use embedded_hal_async::i2c::I2c as AsyncI2c;

/// Async ISL9241 battery charger driver
///
/// Available when the `async` feature is enabled. All methods mirror the
/// synchronous [`Isl9241`](crate::Isl9241) API but return futures that can be
/// awaited. The transaction shapes, quantization behaviour and error
/// contract are identical.
///
/// # Example
/// ```no_run
/// # #[cfg(feature = "async")]
/// # async fn example<I: embedded_hal_async::i2c::I2c>(i2c: I) -> Result<(), isl9241::Error<I::Error>> {
/// use isl9241::AsyncIsl9241;
///
/// let mut charger = AsyncIsl9241::new(i2c);
/// charger.init(3, 2.8, 4.192).await?;
///
/// let committed = charger.set_charge_current_limit(1.5).await?;
/// let vbat = charger.get_battery_voltage().await?;
/// # let _ = (committed, vbat);
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "async")]
pub struct AsyncIsl9241<I> {
    i2c: I,
    addr: u8,
}

#[cfg(feature = "async")]
impl<I> AsyncIsl9241<I>
where
    I: AsyncI2c,
{
    /// Create a new async ISL9241 driver instance
    pub fn new(i2c: I) -> Self {
        Self::with_address(i2c, ISL9241_SLAVE_ADDRESS)
    }

    /// Create a new async ISL9241 driver instance with a custom bus address
    pub fn with_address(i2c: I, addr: u8) -> Self {
        Self { i2c, addr }
    }

    /// Initialize the charger for a battery pack of `cells` series cells
    ///
    /// Same sequence and invariants as the synchronous
    /// [`init`](crate::Isl9241::init): validate before any bus traffic,
    /// verify the device identity, program the voltage window and default
    /// current limits, enable ADC conversions.
    pub async fn init(
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

        let id = self.read_register(ISL9241_DEVICE_ID).await?;
        if id != ISL9241_CHIP_ID {
            return Err(Error::DeviceNotFound);
        }

        self.set_max_system_voltage(cells * max_cell_voltage).await?;
        self.set_min_system_voltage(cells * min_cell_voltage).await?;
        self.set_charge_current_limit(ISL9241_DEFAULT_CHARGE_CURRENT_LIMIT)
            .await?;
        self.set_adapter_current_limit(ISL9241_DEFAULT_ADAPTER_CURRENT_LIMIT)
            .await?;

        // ADC conversions stay on in every operating mode
        self.write_bit(ISL9241_CONTROL3, ISL9241_CONTROL3_ADC_ENABLE_BIT, true)
            .await
    }

    // ========================================
    // Low-level register operations
    // ========================================

    /// Read a 16-bit register (low byte first on the wire)
    pub async fn read_register(&mut self, reg: u8) -> Result<u16, Error<I::Error>> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.addr, &[reg], &mut buf)
            .await
            .map_err(Error::I2c)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Write a 16-bit register (address, low byte, high byte)
    pub async fn write_register(&mut self, reg: u8, value: u16) -> Result<(), Error<I::Error>> {
        let [low, high] = value.to_le_bytes();
        self.i2c
            .write(self.addr, &[reg, low, high])
            .await
            .map_err(Error::I2c)
    }

    /// Set or clear a single bit of a register, leaving the rest unchanged
    ///
    /// Read-modify-write; not atomic against another bus master.
    pub async fn write_bit(&mut self, reg: u8, bit: u8, value: bool) -> Result<(), Error<I::Error>> {
        let current = self.read_register(reg).await?;
        let updated = if value {
            current | (1u16 << bit)
        } else {
            current & !(1u16 << bit)
        };
        self.write_register(reg, updated).await
    }

    /// Read a single bit of a register
    pub async fn read_bit(&mut self, reg: u8, bit: u8) -> Result<bool, Error<I::Error>> {
        Ok(self.read_register(reg).await? & (1u16 << bit) != 0)
    }

    async fn write_field(&mut self, field: Field, value: f32) -> Result<f32, Error<I::Error>> {
        let raw = field.encode(value);
        self.write_register(field.reg, raw).await?;
        Ok(field.decode(raw))
    }

    async fn read_field(&mut self, field: Field) -> Result<f32, Error<I::Error>> {
        Ok(field.decode(self.read_register(field.reg).await?))
    }

    // ========================================
    // System voltage window
    // ========================================

    /// Set the maximum system voltage (8mV steps), returning the committed value
    pub async fn set_max_system_voltage(&mut self, volts: f32) -> Result<f32, Error<I::Error>> {
        self.write_field(MAX_SYSTEM_VOLTAGE, volts).await
    }

    /// Get the programmed maximum system voltage
    pub async fn get_max_system_voltage(&mut self) -> Result<f32, Error<I::Error>> {
        self.read_field(MAX_SYSTEM_VOLTAGE).await
    }

    /// Set the minimum system voltage (64mV steps), returning the committed value
    pub async fn set_min_system_voltage(&mut self, volts: f32) -> Result<f32, Error<I::Error>> {
        self.write_field(MIN_SYSTEM_VOLTAGE, volts).await
    }

    /// Get the programmed minimum system voltage
    pub async fn get_min_system_voltage(&mut self) -> Result<f32, Error<I::Error>> {
        self.read_field(MIN_SYSTEM_VOLTAGE).await
    }

    // ========================================
    // Current limits
    // ========================================

    /// Set the battery fast-charge current limit (4mA steps), returning the
    /// committed value
    pub async fn set_charge_current_limit(&mut self, amps: f32) -> Result<f32, Error<I::Error>> {
        self.write_field(CHARGE_CURRENT_LIMIT, amps).await
    }

    /// Get the programmed battery fast-charge current limit
    pub async fn get_charge_current_limit(&mut self) -> Result<f32, Error<I::Error>> {
        self.read_field(CHARGE_CURRENT_LIMIT).await
    }

    /// Set adapter current limit 1 (4mA steps), returning the committed value
    pub async fn set_adapter_current_limit(&mut self, amps: f32) -> Result<f32, Error<I::Error>> {
        self.write_field(ADAPTER_CURRENT_LIMIT_1, amps).await
    }

    /// Get adapter current limit 1
    pub async fn get_adapter_current_limit(&mut self) -> Result<f32, Error<I::Error>> {
        self.read_field(ADAPTER_CURRENT_LIMIT_1).await
    }

    /// Set adapter current limit 2 (4mA steps), returning the committed value
    pub async fn set_adapter_current_limit2(&mut self, amps: f32) -> Result<f32, Error<I::Error>> {
        self.write_field(ADAPTER_CURRENT_LIMIT_2, amps).await
    }

    /// Get adapter current limit 2
    pub async fn get_adapter_current_limit2(&mut self) -> Result<f32, Error<I::Error>> {
        self.read_field(ADAPTER_CURRENT_LIMIT_2).await
    }

    /// Select the trickle charge current level for deeply discharged packs
    pub async fn set_trickle_charge_current(
        &mut self,
        level: TrickleChargeCurrent,
    ) -> Result<(), Error<I::Error>> {
        let current = self.read_register(TRICKLE_CHARGE_LEVEL.reg).await?;
        let updated =
            (current & !TRICKLE_CHARGE_LEVEL.mask) | TRICKLE_CHARGE_LEVEL.encode_steps(level as u16);
        self.write_register(TRICKLE_CHARGE_LEVEL.reg, updated).await
    }

    /// Get the selected trickle charge current level
    pub async fn get_trickle_charge_current(
        &mut self,
    ) -> Result<TrickleChargeCurrent, Error<I::Error>> {
        let raw = self.read_register(TRICKLE_CHARGE_LEVEL.reg).await?;
        Ok(TrickleChargeCurrent::from_raw(
            TRICKLE_CHARGE_LEVEL.decode_steps(raw),
        ))
    }

    // ========================================
    // ADC readback
    // ========================================

    /// Get the measured battery voltage (64mV LSB)
    pub async fn get_battery_voltage(&mut self) -> Result<f32, Error<I::Error>> {
        self.read_field(BATTERY_VOLTAGE).await
    }

    /// Get the measured battery charge current (22.2mA LSB)
    pub async fn get_batt_charge_current(&mut self) -> Result<f32, Error<I::Error>> {
        self.read_field(BATT_CHARGE_CURRENT).await
    }

    /// Get the measured battery discharge current (44.4mA LSB)
    pub async fn get_batt_discharge_current(&mut self) -> Result<f32, Error<I::Error>> {
        self.read_field(BATT_DISCHARGE_CURRENT).await
    }

    /// Get the measured adapter voltage (96mV LSB)
    pub async fn get_adapter_voltage(&mut self) -> Result<f32, Error<I::Error>> {
        self.read_field(ADAPTER_VOLTAGE).await
    }

    /// Get the measured adapter current (22.2mA LSB)
    pub async fn get_adapter_current(&mut self) -> Result<f32, Error<I::Error>> {
        self.read_field(ADAPTER_CURRENT).await
    }

    /// Get the measured system voltage (96mV LSB)
    pub async fn get_system_voltage(&mut self) -> Result<f32, Error<I::Error>> {
        self.read_field(SYSTEM_VOLTAGE).await
    }

    /// Get the measured NTC thermistor voltage (8mV LSB)
    pub async fn get_ntc_voltage(&mut self) -> Result<f32, Error<I::Error>> {
        self.read_field(NTC_VOLTAGE).await
    }

    // ========================================
    // Status and identity
    // ========================================

    /// Get the charger's internal state machine status
    pub async fn get_state_machine_status(
        &mut self,
    ) -> Result<StateMachineStatus, Error<I::Error>> {
        let raw = self.read_register(STATE_MACHINE_STATUS.reg).await?;
        Ok(StateMachineStatus::from_raw(
            STATE_MACHINE_STATUS.decode_steps(raw),
        ))
    }

    /// Read the raw device identity register
    pub async fn device_id(&mut self) -> Result<u16, Error<I::Error>> {
        self.read_register(ISL9241_DEVICE_ID).await
    }

    /// Read the raw manufacturer identity register
    pub async fn manufacturer_id(&mut self) -> Result<u16, Error<I::Error>> {
        self.read_register(ISL9241_MANUFACTURER_ID).await
    }

    // ========================================
    // Control bits
    // ========================================

    /// Drive the NGATE control bit; `true` disconnects the battery from the
    /// system rail
    pub async fn set_ngate(&mut self, disconnect: bool) -> Result<(), Error<I::Error>> {
        self.write_bit(ISL9241_CONTROL1, ISL9241_CONTROL1_NGATE_BIT, disconnect)
            .await
    }

    /// Enable ADC conversions in all operating modes
    pub async fn enable_adc(&mut self) -> Result<(), Error<I::Error>> {
        self.write_bit(ISL9241_CONTROL3, ISL9241_CONTROL3_ADC_ENABLE_BIT, true)
            .await
    }

    /// Disable ADC conversions outside of active charging
    pub async fn disable_adc(&mut self) -> Result<(), Error<I::Error>> {
        self.write_bit(ISL9241_CONTROL3, ISL9241_CONTROL3_ADC_ENABLE_BIT, false)
            .await
    }
}
