//! QSAN client data types
//!
//! Inventory records are kept as plain string maps: the array reports every field
//! as text and only the derived stats are numeric.
//!
//! - [`Attributes`] - one entity's discovered fields
//! - [`Inventory`] - all entities of one kind, keyed by identifier
//! - [`StatSet`] - one entity's counters, already converted to bytes/IOPS
//! - [`StatsTable`] - counters for a whole kind, keyed by identifier
//! - [`Health`] - tri-state storage health

use std::collections::BTreeMap;
use std::fmt;

/// Attribute name → value for one discovered entity
pub type Attributes = BTreeMap<String, String>;

/// Entity identifier → attributes
pub type Inventory = BTreeMap<String, Attributes>;

/// Metric name → string-encoded numeric value
pub type StatSet = BTreeMap<String, String>;

/// Entity identifier (or pool name) → counters
pub type StatsTable = BTreeMap<String, StatSet>;

/// Overall array health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Healthy,
    Unhealthy,
    /// The status page could not be evaluated (SANOS 4 only)
    Unknown,
}

impl Health {
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Health::Healthy => Some(true),
            Health::Unhealthy => Some(false),
            Health::Unknown => None,
        }
    }
}

impl From<bool> for Health {
    fn from(healthy: bool) -> Self {
        if healthy {
            Health::Healthy
        } else {
            Health::Unhealthy
        }
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Health::Healthy => write!(f, "healthy"),
            Health::Unhealthy => write!(f, "unhealthy"),
            Health::Unknown => write!(f, "unknown"),
        }
    }
}
