#![cfg_attr(not(test), no_std)]
//! # ISL9241 Battery Charger Driver
//!
//! This crate provides an embedded driver for the Renesas ISL9241 buck-boost
//! narrow-VDC battery charger. It supports:
//! - Safe initialization with cell-count and voltage validation
//! - System voltage window programming (min/max, per-cell derived)
//! - Adapter and charge current limits
//! - Trickle charge level selection
//! - ADC readback of battery/adapter/system voltages and currents
//! - Charger state machine status decoding
//! - NGATE battery disconnect control
//!
//! All registers are 16-bit, little-endian on the wire, reached through the
//! SMBus-style two-transaction read and single-transaction write the chip
//! expects. Setters return the value actually committed to hardware after
//! LSB quantization, so the caller always observes the real setpoint.
//!
//! The driver is synchronous and blocking, and assumes it is the only bus
//! master; the bit read-modify-write helpers are not atomic against another
//! master. Callers in multi-threaded hosts must serialize access to a device
//! handle externally.
//!
//! ## Example
//!
//! ```no_run
//! use isl9241::{Error, Isl9241};
//! # use embedded_hal::i2c::I2c;
//! # fn example<I: I2c>(i2c: I) -> Result<(), Error<I::Error>> {
//! let mut charger = Isl9241::new(i2c);
//!
//! // Initialize a 3-cell pack: 2.8V to 4.192V per cell
//! charger.init(3, 2.8, 4.192)?;
//!
//! // Limits are quantized to the register LSB; the setter reports the
//! // value that actually reached the hardware
//! let committed = charger.set_charge_current_limit(1.5)?;
//!
//! let vbat = charger.get_battery_voltage()?;
//! let state = charger.get_state_machine_status()?;
//! # let _ = (committed, vbat, state);
//! # Ok(())
//! # }
//! ```
//!
//! ## Async Support
//!
//! When the `async` feature is enabled, the crate provides `AsyncIsl9241`
//! with the same API but async/await support:
//!
//! ```no_run
//! # #[cfg(feature = "async")]
//! # async fn example<I: embedded_hal_async::i2c::I2c>(i2c: I) -> Result<(), isl9241::Error<I::Error>> {
//! use isl9241::AsyncIsl9241;
//!
//! let mut charger = AsyncIsl9241::new(i2c);
//! charger.init(3, 2.8, 4.192).await?;
//! charger.set_adapter_current_limit(2.0).await?;
//! # Ok(())
//! # }
//! ```

mod driver;
#[cfg(feature = "async")]
mod driver_async;
mod error;
mod registers;
mod types;

// Re-export main types
pub use driver::Isl9241;
#[cfg(feature = "async")]
pub use driver_async::AsyncIsl9241;
pub use error::Error;
pub use registers::*;
pub use types::*;
