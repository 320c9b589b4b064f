//! Error types for ISL9241 operations
//!
//! Every fallible operation reports through [`Error`]; there is no global
//! error state and no sentinel return values.

/// Error types for ISL9241 operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Error<E> {
    /// Bus transaction failed (not acknowledged, or short read)
    I2c(E),
    /// Configuration violates the cell-count or voltage invariants; rejected
    /// before any bus write
    InvalidParameter,
    /// Device identity register did not match the expected chip ID
    DeviceNotFound,
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Error::I2c(error)
    }
}
