pub mod provisioning;

pub use provisioning::{ProvisioningError, UserProvisioner};
