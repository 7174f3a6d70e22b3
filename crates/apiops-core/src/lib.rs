//! # apiops-core — Gateway Configuration Engines
//!
//! Core library for the apiops toolchain. Turns a directory tree of
//! declarative gateway resources (services, routes, upstreams) into:
//!
//! - a lint report of structural and semantic defects
//!   ([`validate::lint_environment`]), and
//! - one merged gateway-state document scoped to a single environment,
//!   compliance classification, and data center
//!   ([`merge::merge_environment`]).
//!
//! ## Directory Convention
//!
//! ```text
//! <gateway root>/<environment>/<product group>/
//!     *.yaml             single-service resource files
//!     upstreams.yaml     upstream name -> per-dc weighted targets
//! ```
//!
//! ## Defect Collection
//!
//! Every engine collects defects instead of stopping at the first one: a
//! run reports as many problems as possible, and only missing top-level
//! inputs short-circuit. See [`error::Report`].
//!
//! Each run reads the directory tree fresh; nothing is cached between
//! invocations and no operation touches the network.

pub mod error;
pub mod merge;
pub mod resource;
pub mod scan;
pub mod topology;
pub mod validate;

pub use error::{Defect, DefectKind, GatewayError, Report};
pub use merge::{merge_environment, write_state, GatewayState, MergeConfig, MergeOutcome};
pub use scan::{scan_environment, ProductGroup, UPSTREAMS_FILENAME};
pub use topology::{ControlPlane, Environment, Topology};
pub use validate::{lint_environment, LintConfig};
