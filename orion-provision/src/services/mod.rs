// Business logic services layer
//
// Provisioning logic lives here, written against the SwisApi trait so the
// CLI, dry runs and tests share one implementation.

pub mod provisioning;
