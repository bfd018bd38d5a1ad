use std::sync::{Arc, PoisonError, RwLock};

use axisbus_frame::{SlaveAddress, Telemetry};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Last reported velocity of every slave, shared between the poll loop and
/// command callers.
///
/// Cloning yields another handle to the same state. Only decoded telemetry
/// writes to it; readers get consistent snapshots.
#[derive(Debug, Clone, Default)]
pub struct VelocityState {
    inner: Arc<RwLock<[i32; 4]>>,
}

impl VelocityState {
    /// All slaves start at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a telemetry report.
    pub fn apply(&self, telemetry: &Telemetry) {
        let mut values = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        values[telemetry.slave.index()] = telemetry.velocity;
    }

    pub fn get(&self, slave: SlaveAddress) -> i32 {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)[slave.index()]
    }

    /// Copy of every slave's velocity, taken atomically.
    pub fn snapshot(&self) -> VelocitySnapshot {
        VelocitySnapshot {
            values: *self.inner.read().unwrap_or_else(PoisonError::into_inner),
        }
    }
}

/// Point-in-time copy of [`VelocityState`].
///
/// Serializes as a map keyed by slave address, e.g. `{"01": 0, "02": -2, ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VelocitySnapshot {
    values: [i32; 4],
}

impl VelocitySnapshot {
    pub fn get(&self, slave: SlaveAddress) -> i32 {
        self.values[slave.index()]
    }

    /// `(slave, velocity)` pairs in address order.
    pub fn iter(&self) -> impl Iterator<Item = (SlaveAddress, i32)> + '_ {
        SlaveAddress::ALL
            .into_iter()
            .map(|slave| (slave, self.values[slave.index()]))
    }
}

impl Serialize for VelocitySnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (slave, velocity) in self.iter() {
            map.serialize_entry(slave.as_hex(), &velocity)?;
        }
        map.end()
    }
}
