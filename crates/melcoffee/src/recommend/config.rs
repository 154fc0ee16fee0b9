use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

pub const DEFAULT_LIMIT: usize = 8;

/// Tunables for the recommendation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendConfig {
    pub default_limit: NonZeroUsize,
    /// Popularity points per unit of score.
    pub popularity_divisor: f64,
    /// Upper bound on the popularity contribution.
    pub popularity_cap: f64,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            default_limit: NonZeroUsize::new(DEFAULT_LIMIT).unwrap_or(NonZeroUsize::MIN),
            popularity_divisor: 50.0,
            popularity_cap: 2.0,
        }
    }
}
