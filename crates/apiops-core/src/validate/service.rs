//! # Service Record Validation
//!
//! Checks one service resource file against the directory convention. All
//! rules run independently so a single pass reports every problem in the
//! file, and the parsed services come back alongside the defects for
//! cross-referencing against the product group's upstream definitions.

use std::path::Path;

use crate::error::Defect;
use crate::resource::{load_service_document, Service};

/// Validate one service resource file.
///
/// Returns the defects found plus every service entry that parsed, even
/// when the entry count itself is a defect — later rules still apply to
/// each entry present.
pub fn validate_service_file(path: &Path) -> (Vec<Defect>, Vec<Service>) {
    let document = match load_service_document(path) {
        Ok(document) => document,
        Err(defect) => return (vec![defect], Vec::new()),
    };

    let mut defects = Vec::new();

    let Some(services) = document.services else {
        defects.push(Defect::structural(format!(
            "{} is missing a 'services' key",
            path.display()
        )));
        return (defects, Vec::new());
    };

    if services.len() != 1 {
        defects.push(Defect::semantic(format!(
            "{} must define exactly one service, found {}",
            path.display(),
            services.len()
        )));
    }

    for service in &services {
        validate_service(service, path, &mut defects);
    }

    (defects, services)
}

fn validate_service(service: &Service, path: &Path, defects: &mut Vec<Defect>) {
    if service.name.is_empty() {
        defects.push(Defect::semantic(format!(
            "service in {} must have a name",
            path.display()
        )));
    }
    if service.host.is_empty() {
        defects.push(Defect::semantic(format!(
            "service '{}' in {} must have a host",
            service.name,
            path.display()
        )));
    }
    if service.tags.is_empty() {
        defects.push(Defect::semantic(format!(
            "service '{}' in {} must have at least one tag",
            service.name,
            path.display()
        )));
    }

    for route in &service.routes {
        if route.name.is_empty() {
            defects.push(Defect::semantic(format!(
                "route on service '{}' must have a name",
                service.name
            )));
        }
        if !route.tags.is_empty() {
            defects.push(Defect::semantic(format!(
                "route '{}' on service '{}' must not define tags",
                route.name, service.name
            )));
        }
    }
}
