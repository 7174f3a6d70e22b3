//! # Resource Documents
//!
//! Typed model for the two document kinds that live inside a product group:
//! service resource files and the upstream-definition file.
//!
//! Parsing fails closed: a file that is not well-formed YAML of the expected
//! shape yields a single parse [`Defect`] naming the file, never a panic or
//! a propagated error. Field-level problems (empty name, bad weight) survive
//! parsing — they are loose `Option`/`Value` fields here so the validators
//! can report them individually instead of losing the whole file.
//!
//! Unrecognized attributes on services and routes (ports, protocols,
//! timeouts, plugin settings) pass through untouched via a flattened map so
//! the merge engine emits them exactly as written.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Defect;

/// One gateway resource file. Convention: exactly one service per file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceDocument {
    /// The `services` sequence; `None` when the key is absent entirely.
    #[serde(default)]
    pub services: Option<Vec<Service>>,
}

/// One service record as written on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Service name. Required by convention; validated, not enforced here.
    #[serde(default)]
    pub name: String,
    /// Upstream lookup key. Required by convention.
    #[serde(default)]
    pub host: String,
    /// Tags; at least one acts as the compliance classification selector.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Route children. Stripped and relocated during a merge.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<Route>,
    /// Remaining gateway attributes, passed through verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// One route record. Routes inherit their compliance classification from
/// the parent service; carrying tags of their own is a convention violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Route name. Required by convention.
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Back-reference to the owning service, stamped during a merge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceRef>,
    /// Remaining gateway attributes (hosts, paths, methods, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Service back-reference carried by relocated routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRef {
    /// Name of the owning service.
    pub name: String,
}

/// Parsed upstream-definition file: upstream name to ordered DC target
/// groups.
pub type UpstreamSet = BTreeMap<String, Vec<DcTargetGroup>>;

/// One entry of an upstream's group list. Convention: a single key naming
/// the data center, mapped to that DC's target sequence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct DcTargetGroup(pub BTreeMap<String, serde_yaml::Value>);

impl DcTargetGroup {
    /// The `(dc, raw targets)` pair when this group honors the single-key
    /// convention, `None` otherwise.
    pub fn single(&self) -> Option<(&str, &serde_yaml::Value)> {
        if self.0.len() == 1 {
            self.0.iter().next().map(|(k, v)| (k.as_str(), v))
        } else {
            None
        }
    }
}

/// One upstream target as written on disk. Fields stay loose so a bad
/// weight or port surfaces as an indexed defect instead of failing the
/// whole file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawTarget {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub weight: Option<serde_yaml::Value>,
    #[serde(default)]
    pub port: Option<serde_yaml::Value>,
}

/// A target that passed field validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Backend host.
    pub host: String,
    /// Positive load-balancing weight.
    pub weight: i64,
    /// Backend port; the merge engine defaults an absent port to 443.
    pub port: Option<u16>,
}

/// Load a service resource file, folding any failure into a parse defect.
pub fn load_service_document(path: &Path) -> Result<ServiceDocument, Defect> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| Defect::parse(format!("failed to read {}: {e}", path.display())))?;
    serde_yaml::from_str(&raw)
        .map_err(|e| Defect::parse(format!("failed to parse {}: {e}", path.display())))
}

/// Load an upstream-definition file, folding any failure into a parse
/// defect.
pub fn load_upstream_set(path: &Path) -> Result<UpstreamSet, Defect> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| Defect::parse(format!("failed to read {}: {e}", path.display())))?;
    serde_yaml::from_str(&raw)
        .map_err(|e| Defect::parse(format!("failed to parse {}: {e}", path.display())))
}

/// Decode one DC's raw target value into validated targets plus the defects
/// found along the way.
///
/// The returned targets carry only entries whose host and weight check out;
/// malformed entries are reported by 0-based index and contribute nothing.
pub fn decode_target_group(
    upstream: &str,
    dc: &str,
    value: &serde_yaml::Value,
) -> (Vec<Target>, Vec<Defect>) {
    let mut targets = Vec::new();
    let mut defects = Vec::new();

    let Some(entries) = value.as_sequence() else {
        defects.push(Defect::semantic(format!(
            "targets for dc '{dc}' in upstream '{upstream}' must be a sequence"
        )));
        return (targets, defects);
    };

    for (index, entry) in entries.iter().enumerate() {
        let raw: RawTarget = match serde_yaml::from_value(entry.clone()) {
            Ok(raw) => raw,
            Err(_) => {
                defects.push(Defect::semantic(format!(
                    "target {index} for dc '{dc}' in upstream '{upstream}' is malformed"
                )));
                continue;
            }
        };

        let host = match raw.host.as_deref() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => {
                defects.push(Defect::semantic(format!(
                    "target {index} for dc '{dc}' in upstream '{upstream}' is missing a host"
                )));
                continue;
            }
        };

        let Some(weight) = raw.weight.as_ref().and_then(positive_int) else {
            defects.push(Defect::semantic(format!(
                "target {index} for dc '{dc}' in upstream '{upstream}' must have a positive integer weight"
            )));
            continue;
        };

        let port = match raw.port.as_ref() {
            None => None,
            Some(value) => match value.as_u64().and_then(|p| u16::try_from(p).ok()) {
                Some(port) => Some(port),
                None => {
                    defects.push(Defect::semantic(format!(
                        "target {index} for dc '{dc}' in upstream '{upstream}' has an invalid port"
                    )));
                    continue;
                }
            },
        };

        targets.push(Target { host, weight, port });
    }

    (targets, defects)
}

fn positive_int(value: &serde_yaml::Value) -> Option<i64> {
    value.as_i64().filter(|w| *w > 0)
}
