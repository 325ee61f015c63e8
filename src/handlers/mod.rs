// handlers/mod.rs - two security tiers
//
// Public (no auth): service descriptor and health.
// Elevated (bearer token resolved by the identity provider): user provisioning.
pub mod elevated;
pub mod public;
