//! The I2C bus as the device encoders see it.

use embedded_hal::i2c::{Error, ErrorKind, I2c};

use crate::configuration::BusRole;

/// Why a bus transaction did not happen.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The module is a follower, so it may not start transactions.
    NotLeader,
    /// The transaction was attempted and the peripheral reported a failure.
    Transaction(ErrorKind),
}

#[cfg(feature = "defmt")]
impl defmt::Format for BusError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::NotLeader => defmt::write!(f, "NotLeader"),
            // embedded-hal only implements Format against defmt 0.3
            Self::Transaction(kind) => defmt::write!(f, "Transaction({})", defmt::Debug2Format(kind)),
        }
    }
}

/// Wraps an I2C peripheral and gates every transaction on the module's [`BusRole`].
pub struct Bus<I: I2c> {
    i2c: I,
    role: BusRole,
}

impl<I: I2c> Bus<I> {
    /// Creates a bus in the default (follower) role.
    pub fn new(i2c: I) -> Self {
        Self {
            i2c,
            role: BusRole::default(),
        }
    }

    /// The current role.
    pub fn role(&self) -> BusRole {
        self.role
    }

    /// Returns true when transactions may be started.
    pub fn is_leader(&self) -> bool {
        self.role.is_leader()
    }

    /// Changes the role. Takes effect with the next transaction.
    pub fn set_role(&mut self, role: BusRole) {
        info!("I2C role changed to {}", role);
        self.role = role;
    }

    /// Writes `data` to the device at `address`.
    pub fn write(&mut self, address: u8, data: &[u8]) -> Result<(), BusError> {
        if !self.is_leader() {
            return Err(BusError::NotLeader);
        }
        self.i2c
            .write(address, data)
            .map_err(|e| BusError::Transaction(e.kind()))
    }

    /// Writes `request` to the device at `address`, then fills `response` from it.
    pub fn read(&mut self, address: u8, request: &[u8], response: &mut [u8]) -> Result<(), BusError> {
        if !self.is_leader() {
            return Err(BusError::NotLeader);
        }
        self.i2c
            .write_read(address, request, response)
            .map_err(|e| BusError::Transaction(e.kind()))
    }

    /// Writes `data` to `address` and returns the number of bytes sent, which is 0 when nothing was sent.
    ///
    /// Failures are logged and swallowed: device encoders fire and forget.
    pub fn send(&mut self, address: u8, data: &[u8]) -> usize {
        match self.write(address, data) {
            Ok(()) => data.len(),
            Err(e) => {
                warn!("I2C write to {=u8:#x} dropped: {}", address, e);
                0
            }
        }
    }

    /// Borrows the underlying peripheral.
    pub fn i2c(&self) -> &I {
        &self.i2c
    }

    /// Mutably borrows the underlying peripheral.
    pub fn i2c_mut(&mut self) -> &mut I {
        &mut self.i2c
    }
}
