//! # Merge Engine
//!
//! Folds an environment directory into one gateway-state document scoped to
//! a single compliance classification and data center:
//!
//! - services whose tags contain the requested classification are kept,
//!   with their routes detached into the top-level route list and stamped
//!   with a `service.name` back-reference;
//! - upstreams are materialized only for the requested data center, each
//!   target rewritten to `host:port` (443 when unspecified) and decorated
//!   with the fixed passive healthcheck policy;
//! - everything else is filtered out.
//!
//! The engine tolerates broken inputs the same way the validators do: a
//! file that fails to parse is recorded as a defect and skipped, and the
//! run keeps going. A run with any recorded defect is a failed run — the
//! produced document must not be treated as authoritative.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Defect, GatewayError, Report};
use crate::resource::{
    decode_target_group, load_service_document, load_upstream_set, Route, Service, ServiceRef,
    UpstreamSet,
};
use crate::scan::{scan_environment, ProductGroup};
use crate::topology::Topology;

/// Declarative format version stamped on every generated document.
pub const STATE_FORMAT_VERSION: &str = "3.0";

/// Directory (under the gateway root) receiving generated state files.
pub const GENERATED_DIR: &str = "generated";

/// Port used for targets that do not declare one.
const DEFAULT_TARGET_PORT: u16 = 443;

/// Inputs for one merge run.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Root directory holding one subdirectory per environment.
    pub gateway_root: PathBuf,
    /// Environment to merge.
    pub env_name: String,
    /// Topology registry; merge preconditions consult it only when given.
    pub topology_file: Option<PathBuf>,
    /// Compliance classification selecting which services are kept.
    pub compliance_type: String,
    /// Data center whose upstream targets are materialized.
    pub dc_name: String,
}

/// The merged gateway-state document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayState {
    /// Declarative format version marker.
    #[serde(rename = "_format_version")]
    pub format_version: String,
    /// Matching services, routes stripped.
    pub services: Vec<Service>,
    /// Upstreams materialized for the requested data center.
    pub upstreams: Vec<Upstream>,
    /// Relocated routes, each carrying its owning service's name.
    pub routes: Vec<Route>,
}

impl GatewayState {
    fn empty() -> Self {
        Self {
            format_version: STATE_FORMAT_VERSION.to_string(),
            services: Vec::new(),
            upstreams: Vec::new(),
            routes: Vec::new(),
        }
    }
}

/// One materialized upstream with its load-balancing defaults and the
/// fixed healthcheck policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upstream {
    /// Upstream name; matches the owning service's host.
    pub name: String,
    /// Targets for the requested data center.
    pub targets: Vec<UpstreamTarget>,
    pub hash_on: String,
    pub hash_fallback: String,
    pub hash_on_cookie_path: String,
    pub slots: u32,
    pub healthchecks: Healthchecks,
}

impl Upstream {
    /// Build an upstream with the toolchain's fixed policy block.
    pub fn new(name: impl Into<String>, targets: Vec<UpstreamTarget>) -> Self {
        Self {
            name: name.into(),
            targets,
            hash_on: "none".to_string(),
            hash_fallback: "none".to_string(),
            hash_on_cookie_path: "/".to_string(),
            slots: 10_000,
            healthchecks: Healthchecks::default(),
        }
    }
}

/// One rewritten target: `host:port` plus its weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamTarget {
    pub target: String,
    pub weight: i64,
}

/// Healthcheck policy carried by every materialized upstream. Passive
/// only — the gateway observes live traffic, it never probes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Healthchecks {
    pub passive: PassiveHealthcheck,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassiveHealthcheck {
    pub healthy: PassiveHealthy,
    pub unhealthy: PassiveUnhealthy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassiveHealthy {
    pub http_statuses: Vec<u16>,
    pub successes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassiveUnhealthy {
    pub http_statuses: Vec<u16>,
    pub http_failures: u32,
    pub interval: u32,
}

impl Default for Healthchecks {
    fn default() -> Self {
        Self {
            passive: PassiveHealthcheck {
                healthy: PassiveHealthy {
                    http_statuses: vec![
                        200, 201, 202, 203, 204, 205, 206, 207, 208, 226, 300, 301, 302, 303,
                        304, 305, 306, 307, 308,
                    ],
                    successes: 0,
                },
                unhealthy: PassiveUnhealthy {
                    http_statuses: vec![429, 500, 503],
                    http_failures: 5,
                    interval: 0,
                },
            },
        }
    }
}

/// Result of one merge run: the produced document plus the defect report.
///
/// The document is only authoritative when the report is clean.
#[derive(Debug)]
pub struct MergeOutcome {
    /// The merged document as built, defects or not.
    pub state: GatewayState,
    /// Every defect recorded during preconditions and per-file processing.
    pub report: Report,
}

impl MergeOutcome {
    /// True when no defect was recorded and the document may be used.
    pub fn is_success(&self) -> bool {
        self.report.is_clean()
    }
}

/// Run the merge over one environment directory.
pub fn merge_environment(config: &MergeConfig) -> MergeOutcome {
    let mut report = Report::new();
    let mut state = GatewayState::empty();

    if !check_preconditions(config, &mut report) {
        return MergeOutcome { state, report };
    }

    let groups = match scan_environment(&config.gateway_root, &config.env_name) {
        Err(err) => {
            report.push(Defect::structural(err.to_string()));
            return MergeOutcome { state, report };
        }
        Ok(groups) => groups,
    };

    for group in &groups {
        merge_product_group(group, config, &mut state, &mut report);
    }

    tracing::info!(
        env = %config.env_name,
        compliance = %config.compliance_type,
        dc = %config.dc_name,
        services = state.services.len(),
        upstreams = state.upstreams.len(),
        routes = state.routes.len(),
        defects = report.len(),
        "merge finished"
    );
    MergeOutcome { state, report }
}

/// Check the fatal preconditions. Any failure short-circuits the run.
fn check_preconditions(config: &MergeConfig, report: &mut Report) -> bool {
    let before = report.len();

    if !config.gateway_root.is_dir() {
        report.push(Defect::structural(format!(
            "gateway directory not found: {}",
            config.gateway_root.display()
        )));
    }
    if config.env_name.is_empty() {
        report.push(Defect::structural(
            "environment name must not be empty".to_string(),
        ));
    }
    if config.compliance_type.is_empty() {
        report.push(Defect::structural(
            "compliance type must not be empty".to_string(),
        ));
    }
    if config.dc_name.is_empty() {
        report.push(Defect::structural("dc name must not be empty".to_string()));
    }

    // The topology file is wholly optional for a merge; when given, the
    // environment must exist and a declared dc list must contain the
    // requested dc.
    if let Some(path) = &config.topology_file {
        match Topology::load(path) {
            Err(err) => report.push(Defect::parse(err.to_string())),
            Ok(topology) => match topology.environment(&config.env_name) {
                Err(err) => report.push(Defect::structural(err.to_string())),
                Ok(env) => {
                    if !env.dc.is_empty() && !env.has_dc(&config.dc_name) {
                        report.push(Defect::semantic(format!(
                            "'{}' is not a dc of environment '{}'; declared dcs: {}",
                            config.dc_name,
                            config.env_name,
                            env.dc.join(", ")
                        )));
                    }
                }
            },
        }
    }

    report.len() == before
}

fn merge_product_group(
    group: &ProductGroup,
    config: &MergeConfig,
    state: &mut GatewayState,
    report: &mut Report,
) {
    // An absent upstream file contributes an empty mapping; a malformed
    // one is a defect and likewise contributes nothing.
    let upstreams: UpstreamSet = match &group.upstream_file {
        None => UpstreamSet::new(),
        Some(path) => match load_upstream_set(path) {
            Ok(set) => set,
            Err(defect) => {
                report.push(defect);
                UpstreamSet::new()
            }
        },
    };

    for file in &group.service_files {
        let document = match load_service_document(file) {
            Ok(document) => document,
            Err(defect) => {
                tracing::warn!(file = %file.display(), "skipping unparseable resource file");
                report.push(defect);
                continue;
            }
        };

        for mut service in document.services.unwrap_or_default() {
            if !service.tags.iter().any(|t| t == &config.compliance_type) {
                continue;
            }

            let routes = std::mem::take(&mut service.routes);
            for mut route in routes {
                route.service = Some(ServiceRef {
                    name: service.name.clone(),
                });
                state.routes.push(route);
            }

            merge_upstream(&service.host, &upstreams, config, state, report);
            state.services.push(service);
        }
    }
}

/// Materialize the upstream for one kept service, scoped to the requested
/// data center. No group for that dc means no upstream — not an error.
fn merge_upstream(
    host: &str,
    upstreams: &UpstreamSet,
    config: &MergeConfig,
    state: &mut GatewayState,
    report: &mut Report,
) {
    let Some(groups) = upstreams.get(host) else {
        return;
    };
    if state.upstreams.iter().any(|u| u.name == host) {
        return;
    }

    let Some(raw_targets) = groups
        .iter()
        .filter_map(|g| g.single())
        .find(|(dc, _)| *dc == config.dc_name)
        .map(|(_, value)| value)
    else {
        return;
    };

    let (targets, defects) = decode_target_group(host, &config.dc_name, raw_targets);
    report.extend(defects);

    let targets = targets
        .into_iter()
        .map(|t| UpstreamTarget {
            target: format!("{}:{}", t.host, t.port.unwrap_or(DEFAULT_TARGET_PORT)),
            weight: t.weight,
        })
        .collect();

    state.upstreams.push(Upstream::new(host, targets));
}

/// File name of the generated state document for one
/// `(environment, compliance type, dc)` triple.
pub fn state_file_name(env_name: &str, compliance_type: &str, dc_name: &str) -> String {
    format!("kong-{env_name}-{compliance_type}-{dc_name}.yaml")
}

/// Persist a merged document under the gateway root.
///
/// Creates `generated/` when absent and overwrites any previous file of the
/// same name, so reruns are idempotent.
pub fn write_state(config: &MergeConfig, state: &GatewayState) -> Result<PathBuf, GatewayError> {
    let out_dir = config.gateway_root.join(GENERATED_DIR);
    std::fs::create_dir_all(&out_dir).map_err(|source| GatewayError::Write {
        path: out_dir.clone(),
        source,
    })?;

    let path = out_dir.join(state_file_name(
        &config.env_name,
        &config.compliance_type,
        &config.dc_name,
    ));
    let rendered = serde_yaml::to_string(state)?;
    std::fs::write(&path, rendered).map_err(|source| GatewayError::Write {
        path: path.clone(),
        source,
    })?;

    tracing::info!(path = %path.display(), "wrote gateway state");
    Ok(path)
}
