//! # Topology Registry
//!
//! Loads and validates the cluster topology document: a mapping from
//! environment name to the environment's data centers and control-plane
//! entries.
//!
//! ```yaml
//! dev:
//!   dc:
//!     - delhi
//!     - mumbai
//!   control_plane:
//!     - compliance_type: pci
//!       dc: delhi
//!       address: http://localhost:8001
//! ```
//!
//! The registry answers two questions: does data center X exist for
//! environment Y, and what is the control-plane address for a given
//! `(compliance type, dc)` pair. Address resolution is consumed by the
//! cluster subcommands that forward state files to a live control plane;
//! the lint and merge engines never dial out themselves.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Defect, GatewayError};

/// One control-plane entry: where the gateway cluster for a
/// `(compliance type, dc)` pair is reachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlPlane {
    /// Compliance classification this control plane serves (e.g. `pci`).
    #[serde(default)]
    pub compliance_type: String,
    /// Data center this control plane serves.
    #[serde(default)]
    pub dc: String,
    /// Network address of the control plane.
    #[serde(default)]
    pub address: String,
}

/// One environment's topology: its data centers and control planes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Declared data center names.
    #[serde(default)]
    pub dc: Vec<String>,
    /// Control-plane entries covering the declared data centers.
    #[serde(default)]
    pub control_plane: Vec<ControlPlane>,
}

impl Environment {
    /// Whether `dc` is one of the environment's declared data centers.
    pub fn has_dc(&self, dc: &str) -> bool {
        self.dc.iter().any(|d| d == dc)
    }

    /// Resolve the control-plane address for a `(compliance type, dc)` pair.
    pub fn control_plane_address(&self, compliance_type: &str, dc: &str) -> Option<&str> {
        self.control_plane
            .iter()
            .find(|cp| cp.compliance_type == compliance_type && cp.dc == dc)
            .map(|cp| cp.address.as_str())
    }

    /// Collect every defect in this environment's topology entry.
    ///
    /// All violations are reported, not just the first: empty dc list,
    /// empty control-plane list, data centers with no covering control
    /// plane, and control-plane entries missing a compliance type, dc,
    /// or address.
    pub fn collect_defects(&self, env_name: &str) -> Vec<Defect> {
        let mut defects = Vec::new();

        if self.dc.is_empty() {
            defects.push(Defect::semantic(format!(
                "environment '{env_name}' declares no data centers"
            )));
        }
        if self.control_plane.is_empty() {
            defects.push(Defect::semantic(format!(
                "environment '{env_name}' declares no control planes"
            )));
        }

        for dc in &self.dc {
            if !self.control_plane.iter().any(|cp| &cp.dc == dc) {
                defects.push(Defect::semantic(format!(
                    "no control plane defined for dc '{dc}' in environment '{env_name}'"
                )));
            }
        }

        for (index, cp) in self.control_plane.iter().enumerate() {
            if cp.compliance_type.is_empty() {
                defects.push(Defect::semantic(format!(
                    "control plane {index} in environment '{env_name}' is missing a compliance type"
                )));
            }
            if cp.dc.is_empty() {
                defects.push(Defect::semantic(format!(
                    "control plane {index} in environment '{env_name}' is missing a dc"
                )));
            }
            if cp.address.is_empty() {
                defects.push(Defect::semantic(format!(
                    "control plane {index} in environment '{env_name}' is missing an address"
                )));
            }
        }

        defects
    }
}

/// The full topology registry, keyed by environment name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    environments: BTreeMap<String, Environment>,
}

impl Topology {
    /// Load the registry from a YAML document.
    ///
    /// Fails only when the file cannot be read or is not a well-formed
    /// mapping of environment entries; per-environment violations are
    /// collected by [`Topology::validate_environment`] instead.
    pub fn load(path: &Path) -> Result<Self, GatewayError> {
        let raw = std::fs::read_to_string(path).map_err(|source| GatewayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let environments: BTreeMap<String, Environment> =
            serde_yaml::from_str(&raw).map_err(|source| GatewayError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(
            path = %path.display(),
            environments = environments.len(),
            "loaded topology registry"
        );
        Ok(Self { environments })
    }

    /// Look up one environment.
    pub fn environment(&self, name: &str) -> Result<&Environment, GatewayError> {
        self.environments
            .get(name)
            .ok_or_else(|| GatewayError::EnvironmentNotFound(name.to_string()))
    }

    /// Collect the defects of a single environment's topology entry.
    ///
    /// A missing environment is itself one defect.
    pub fn validate_environment(&self, name: &str) -> Vec<Defect> {
        match self.environments.get(name) {
            None => vec![Defect::structural(format!(
                "environment '{name}' not defined in topology file"
            ))],
            Some(env) => env.collect_defects(name),
        }
    }

    /// Collect the defects of every environment in the registry.
    pub fn validate(&self) -> Vec<Defect> {
        self.environments
            .iter()
            .flat_map(|(name, env)| env.collect_defects(name))
            .collect()
    }
}
