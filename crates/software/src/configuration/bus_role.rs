/// Determines whether the module may initiate transactions on the I2C bus.
///
/// Only one device on a bus should lead. A follower still owns the bus peripheral, but every outgoing transaction is
/// dropped (see [`Bus::write`](crate::bus::Bus::write)).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusRole {
    /// The module drives the bus and may address any device on it.
    Leader,
    /// The module answers to `address` and stays silent otherwise. An address of 0 means "not yet assigned."
    Follower {
        /// The 7-bit address other leaders use to reach this module.
        address: u8,
    },
}

impl Default for BusRole {
    fn default() -> Self {
        Self::Follower { address: 0 }
    }
}

impl BusRole {
    /// Returns true for [`BusRole::Leader`].
    pub fn is_leader(&self) -> bool {
        *self == Self::Leader
    }
}
