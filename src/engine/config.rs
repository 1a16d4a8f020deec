//! Engine tuning parameters.

/// All tuneable parameters for the tier decision engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Account base currency; orders in any other currency are never
    /// switched automatically.
    pub base_currency: String,
    /// Quiet period after the last observed order fact before evaluating (ms).
    pub debounce_ms: u64,
    /// Minimum interval between courtage-class reads from the API (ms).
    pub min_api_interval_ms: u64,
    /// Delay before the post-order reset switch (ms).
    pub reset_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_currency: "SEK".to_string(),
            debounce_ms: 300,
            min_api_interval_ms: 1000,
            reset_delay_ms: 500,
        }
    }
}
