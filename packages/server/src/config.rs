//! Server configuration.

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("`{0}` must be greater than zero")]
    ZeroDuration(&'static str),

    #[error(
        "heartbeat timeout ({timeout:?}) must be greater than the sweep interval ({sweep:?})"
    )]
    TimeoutNotAfterSweep { timeout: Duration, sweep: Duration },
}

/// Cadences of the broadcast scheduler and the liveness monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    /// Delay between two scheduled deliveries to the same connection.
    pub tick_interval: Duration,
    /// Delay between two liveness sweeps.
    pub sweep_interval: Duration,
    /// Silence after which a tracked connection is evicted.
    pub heartbeat_timeout: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            heartbeat_timeout: DEFAULT_HEARTBEAT_TIMEOUT,
        }
    }
}

impl TimingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("tick_interval", self.tick_interval),
            ("sweep_interval", self.sweep_interval),
            ("heartbeat_timeout", self.heartbeat_timeout),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ZeroDuration(name));
            }
        }
        if self.heartbeat_timeout <= self.sweep_interval {
            return Err(ConfigError::TimeoutNotAfterSweep {
                timeout: self.heartbeat_timeout,
                sweep: self.sweep_interval,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub timing: TimingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            timing: TimingConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
