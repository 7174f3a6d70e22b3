//! # Upstream Record Validation
//!
//! Checks one product group's upstream-definition file: structural shape,
//! cross-references against the sibling services' hosts, the single-key
//! group convention, per-target field rules, and the per-DC weight
//! invariant.

use std::collections::BTreeSet;
use std::path::Path;

use crate::error::Defect;
use crate::resource::{decode_target_group, load_upstream_set, Service};

/// Sum every DC target group's weights must reach exactly.
pub const TARGET_WEIGHT_SUM: i64 = 100;

/// Validate one upstream-definition file against its sibling services.
pub fn validate_upstream_file(path: &Path, services: &[Service]) -> Vec<Defect> {
    let set = match load_upstream_set(path) {
        Ok(set) => set,
        Err(defect) => return vec![defect],
    };

    let mut defects = Vec::new();

    // Every host referenced by a sibling service needs an upstream entry
    // under that exact key.
    let hosts: BTreeSet<&str> = services
        .iter()
        .map(|s| s.host.as_str())
        .filter(|h| !h.is_empty())
        .collect();
    for host in hosts {
        if !set.contains_key(host) {
            defects.push(Defect::semantic(format!(
                "no upstream defined for host '{host}' in {}",
                path.display()
            )));
        }
    }

    for (upstream, groups) in &set {
        for group in groups {
            let Some((dc, raw_targets)) = group.single() else {
                defects.push(Defect::semantic(format!(
                    "upstream '{upstream}' has a target group that must name exactly one dc"
                )));
                continue;
            };

            let (targets, target_defects) = decode_target_group(upstream, dc, raw_targets);
            defects.extend(target_defects);

            // Malformed targets contribute nothing to the sum.
            let sum: i64 = targets.iter().map(|t| t.weight).sum();
            if sum != TARGET_WEIGHT_SUM {
                defects.push(Defect::semantic(format!(
                    "targets for dc '{dc}' in upstream '{upstream}' must sum to weight {TARGET_WEIGHT_SUM}, got {sum}"
                )));
            }
        }
    }

    defects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DefectKind;
    use std::collections::BTreeMap;

    fn write_upstreams(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upstreams.yaml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    fn service_with_host(host: &str) -> Service {
        Service {
            name: format!("svc-{host}"),
            host: host.to_string(),
            tags: vec!["pci".to_string()],
            routes: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    const BALANCED: &str = "\
test.upstream:
  - delhi:
      - host: b1.delhi.example.com
        weight: 50
      - host: b2.delhi.example.com
        weight: 50
  - mumbai:
      - host: b3.mumbai.example.com
        weight: 100
";

    #[test]
    fn balanced_file_passes() {
        let (_dir, path) = write_upstreams(BALANCED);
        let defects = validate_upstream_file(&path, &[service_with_host("test.upstream")]);
        assert!(defects.is_empty(), "unexpected defects: {defects:?}");
    }

    #[test]
    fn parse_failure_is_one_defect() {
        let (_dir, path) = write_upstreams("test.upstream: [broken\n");
        let defects = validate_upstream_file(&path, &[]);
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].kind(), DefectKind::Parse);
    }

    #[test]
    fn missing_host_reference_is_a_defect_per_host() {
        let (_dir, path) = write_upstreams(BALANCED);
        let services = [
            service_with_host("test.upstream"),
            service_with_host("absent.upstream"),
            service_with_host("also-absent.upstream"),
        ];
        let defects = validate_upstream_file(&path, &services);
        assert_eq!(defects.len(), 2);
        assert!(defects
            .iter()
            .all(|d| d.message().contains("no upstream defined for host")));
    }

    #[test]
    fn duplicate_hosts_report_once() {
        let (_dir, path) = write_upstreams(BALANCED);
        let services = [
            service_with_host("absent.upstream"),
            service_with_host("absent.upstream"),
        ];
        let defects = validate_upstream_file(&path, &services);
        assert_eq!(defects.len(), 1);
    }

    #[test]
    fn weight_sum_defect_names_dc_upstream_and_sum() {
        let doc = "\
test.upstream:
  - delhi:
      - host: b1
        weight: 50
      - host: b2
        weight: 30
";
        let (_dir, path) = write_upstreams(doc);
        let defects = validate_upstream_file(&path, &[]);
        assert_eq!(defects.len(), 1);
        let message = defects[0].message();
        assert!(message.contains("'delhi'"));
        assert!(message.contains("'test.upstream'"));
        assert!(message.contains("got 80"));
    }

    #[test]
    fn exact_sum_produces_no_weight_defect() {
        let doc = "\
test.upstream:
  - delhi:
      - host: b1
        weight: 1
      - host: b2
        weight: 99
";
        let (_dir, path) = write_upstreams(doc);
        assert!(validate_upstream_file(&path, &[]).is_empty());
    }

    #[test]
    fn multi_key_group_is_skipped_for_weight_checking() {
        let doc = "\
test.upstream:
  - delhi:
      - host: b1
        weight: 10
    mumbai:
      - host: b2
        weight: 10
";
        let (_dir, path) = write_upstreams(doc);
        let defects = validate_upstream_file(&path, &[]);
        // One defect for the convention violation, none for the sums.
        assert_eq!(defects.len(), 1);
        assert!(defects[0].message().contains("exactly one dc"));
    }

    #[test]
    fn malformed_targets_contribute_zero_to_the_sum() {
        let doc = "\
test.upstream:
  - delhi:
      - host: b1
        weight: sixty
      - host: b2
        weight: 40
";
        let (_dir, path) = write_upstreams(doc);
        let defects = validate_upstream_file(&path, &[]);
        let messages: Vec<_> = defects.iter().map(|d| d.message().to_string()).collect();
        assert!(messages
            .iter()
            .any(|m| m.contains("target 0") && m.contains("positive integer weight")));
        assert!(messages.iter().any(|m| m.contains("got 40")));
    }

    #[test]
    fn non_sequence_targets_are_a_defect() {
        let doc = "\
test.upstream:
  - delhi: 100
";
        let (_dir, path) = write_upstreams(doc);
        let defects = validate_upstream_file(&path, &[]);
        let messages: Vec<_> = defects.iter().map(|d| d.message().to_string()).collect();
        assert!(messages.iter().any(|m| m.contains("must be a sequence")));
        // The empty decoded group still fails the sum invariant.
        assert!(messages.iter().any(|m| m.contains("got 0")));
    }

    #[test]
    fn services_without_hosts_are_not_cross_referenced() {
        let (_dir, path) = write_upstreams(BALANCED);
        let mut service = service_with_host("test.upstream");
        service.host.clear();
        assert!(validate_upstream_file(&path, &[service]).is_empty());
    }
}
