//! Retry and request logging settings for SWIS interactions

pub mod config;
pub mod retry;

pub use config::{MonitoringConfig, ResilienceConfig};
pub use retry::RetryPolicy;
