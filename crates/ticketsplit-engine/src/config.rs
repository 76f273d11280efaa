//! Engine tunables.
//!
//! The defaults are the production values; tests exercise smaller caps to
//! hit the fallback paths without building 50-ticket fixtures.

use serde::Deserialize;

/// Tunable parameters for a planning run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of distinct purchases any one participant may be
    /// assigned.
    #[serde(default = "default_per_user_cap")]
    pub per_user_cap: u32,

    /// Largest acceptable gap between the most- and least-loaded
    /// participants after rebalancing.
    #[serde(default = "default_fairness_spread")]
    pub fairness_spread: usize,

    /// Upper bound on rebalancing passes. Guarantees termination on
    /// pathological inputs.
    #[serde(default = "default_max_rebalance_passes")]
    pub max_rebalance_passes: u32,
}

const fn default_per_user_cap() -> u32 {
    50
}

const fn default_fairness_spread() -> usize {
    2
}

const fn default_max_rebalance_passes() -> u32 {
    32
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            per_user_cap: default_per_user_cap(),
            fairness_spread: default_fairness_spread(),
            max_rebalance_passes: default_max_rebalance_passes(),
        }
    }
}

impl EngineConfig {
    /// A config with a small cap, for exercising exhaustion paths in tests.
    pub const fn with_cap(per_user_cap: u32) -> Self {
        Self {
            per_user_cap,
            fairness_spread: default_fairness_spread(),
            max_rebalance_passes: default_max_rebalance_passes(),
        }
    }
}
