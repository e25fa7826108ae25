//! SolarWinds Information Service (SWIS) API Module
//!
//! Provides the operation model, the `SwisApi` trait the provisioning
//! service is written against, a reqwest-backed client for the JSON REST
//! endpoint, and an offline client for dry runs.

pub mod client;
pub mod dry_run;
pub mod operations;
pub mod resilience;
pub mod swis;

pub use client::{Credentials, SwisClient};
pub use dry_run::DryRunClient;
pub use operations::Operation;
pub use resilience::ResilienceConfig;
pub use swis::SwisApi;
