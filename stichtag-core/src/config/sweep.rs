//! Background sweep configuration.

/// Background sweep configuration.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Seconds between automatic deadline sweeps. `0` disables the loop.
    pub interval_secs: u64,
}
