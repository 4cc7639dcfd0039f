//! Environment provisioning
//!
//! Creates, lists and removes per-branch environments. Creation runs a fixed
//! sequence of steps and records each one as it commits; a failure stops the
//! sequence and reports which steps already took effect. Nothing is rolled back.

mod provisioner;
mod report;

pub use provisioner::EnvironmentProvisioner;
pub use report::ProvisionReport;
