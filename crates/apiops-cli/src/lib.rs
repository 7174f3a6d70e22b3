//! # apiops-cli — CLI for the Gateway Toolchain
//!
//! Provides the `apiops` command-line interface over the core engines and
//! the decK wrapper.
//!
//! ## Subcommands
//!
//! - `apiops env lint` — Validate an environment directory against the
//!   gateway conventions.
//! - `apiops env generate` — Merge an environment into one state document
//!   scoped to a compliance type and data center.
//! - `apiops cluster validate|diff|sync|dump` — Forward a state file to the
//!   control plane resolved from the topology document.

pub mod cluster;
pub mod env;
