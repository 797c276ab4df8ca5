//! Cache administration DTOs.

use crate::cache::CacheStatsReport;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Unhealthy,
    Disabled,
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
            Self::Disabled => "disabled",
        })
    }
}

/// Result of a cache health probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheHealth {
    pub status: HealthState,
    pub connected: bool,
    pub backend: String,
}

/// Stats plus the number of live keys under each domain prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheInfo {
    pub stats: CacheStatsReport,
    pub key_counts: BTreeMap<String, u64>,
}
