//! # Validation Engine
//!
//! Aggregates every lint check over an environment directory into one
//! report: environment naming and existence, the topology entry scoped to
//! that environment, and the per-product-group record validations.
//!
//! The pipeline never fails fast. Each stage runs even when earlier stages
//! reported defects, so one lint pass surfaces as many problems as
//! possible; the only short circuit is a missing environment directory,
//! which leaves nothing to scan.

pub mod service;
pub mod upstream;

use std::path::PathBuf;

use crate::error::{Defect, Report};
use crate::scan::{scan_environment, ProductGroup, UPSTREAMS_FILENAME};
use crate::topology::Topology;

pub use service::validate_service_file;
pub use upstream::validate_upstream_file;

/// Inputs for one lint run.
#[derive(Debug, Clone)]
pub struct LintConfig {
    /// Root directory holding one subdirectory per environment.
    pub gateway_root: PathBuf,
    /// Environment under test.
    pub env_name: String,
    /// Topology registry; topology checks are skipped when absent.
    pub topology_file: Option<PathBuf>,
}

/// Run the full validation pipeline and collect every defect found.
///
/// An empty report means the environment passed.
pub fn lint_environment(config: &LintConfig) -> Report {
    let mut report = Report::new();

    let scannable = environment_stage(config, &mut report);
    topology_stage(config, &mut report);
    if scannable {
        directory_stage(config, &mut report);
    }

    tracing::info!(
        env = %config.env_name,
        defects = report.len(),
        "lint finished"
    );
    report
}

/// Environment name charset: letters, digits, `-` and `_`.
fn valid_env_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Stage 1: environment name and directory. Returns whether the directory
/// exists — the only structural precondition for the directory stage.
fn environment_stage(config: &LintConfig, report: &mut Report) -> bool {
    if !valid_env_name(&config.env_name) {
        report.push(Defect::structural(format!(
            "environment name '{}' may only contain letters, digits, '-' and '_'",
            config.env_name
        )));
    }

    let env_dir = crate::scan::environment_dir(&config.gateway_root, &config.env_name);
    if !env_dir.is_dir() {
        report.push(Defect::structural(format!(
            "environment directory not found: {}",
            env_dir.display()
        )));
        return false;
    }
    true
}

/// Stage 2: topology entry for the environment under test, when a topology
/// file was supplied.
fn topology_stage(config: &LintConfig, report: &mut Report) {
    let Some(path) = &config.topology_file else {
        return;
    };
    match Topology::load(path) {
        Err(err) => report.push(Defect::parse(err.to_string())),
        Ok(topology) => report.extend(topology.validate_environment(&config.env_name)),
    }
}

/// Stage 3: per-product-group record validation.
fn directory_stage(config: &LintConfig, report: &mut Report) {
    let groups = match scan_environment(&config.gateway_root, &config.env_name) {
        Err(err) => {
            report.push(Defect::structural(err.to_string()));
            return;
        }
        Ok(groups) => groups,
    };

    for group in &groups {
        validate_product_group(group, report);
    }
}

fn validate_product_group(group: &ProductGroup, report: &mut Report) {
    for unknown in &group.unknown_files {
        report.push(Defect::structural(format!(
            "unknown file '{}' in product group '{}'",
            unknown.display(),
            group.name
        )));
    }

    if group.service_files.is_empty() {
        report.push(Defect::structural(format!(
            "no service files in product group '{}'",
            group.name
        )));
    }

    let mut services = Vec::new();
    for file in &group.service_files {
        let (defects, mut parsed) = validate_service_file(file);
        report.extend(defects);
        services.append(&mut parsed);
    }

    match &group.upstream_file {
        None => report.push(Defect::structural(format!(
            "Missing {UPSTREAMS_FILENAME} in product group '{}'",
            group.name
        ))),
        Some(path) => report.extend(validate_upstream_file(path, &services)),
    }
}
