//! Trigger and status relay workflows for bundle-shepherd.
//!
//! The trigger path runs, in order:
//! - [`ConfigResolver`] reads the commit's override files
//! - [`ProjectProvisioner`] finds the build project or creates it
//! - [`BuildDispatcher`] starts the build
//!
//! The [`StatusRelay`] runs independently for every build-state-change event.
//! All external calls go through the port traits in `shepherd_core`.

pub mod dispatcher;
pub mod provisioner;
pub mod relay;
pub mod resolver;
pub mod trigger;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatcher::BuildDispatcher;
pub use provisioner::{ProjectProvisioner, ProvisionOptions, ProvisioningSettings};
pub use relay::{RelayOutcome, StatusRelay};
pub use resolver::ConfigResolver;
pub use trigger::{TriggerOutcome, TriggerWorkflow};
