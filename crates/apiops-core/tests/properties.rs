//! Property tests for the weight-sum invariant and the compliance
//! filtering law.

use std::fmt::Write as _;

use proptest::prelude::*;

use apiops_core::merge::{merge_environment, MergeConfig};
use apiops_core::validate::upstream::validate_upstream_file;

fn upstreams_yaml(weights: &[i64]) -> String {
    let mut doc = String::from("test.upstream:\n  - delhi:\n");
    for (i, weight) in weights.iter().enumerate() {
        let _ = writeln!(doc, "      - host: backend{i}.example.com");
        let _ = writeln!(doc, "        weight: {weight}");
    }
    doc
}

fn service_yaml(tags: &[String]) -> String {
    let mut doc = String::from(
        "services:\n  - name: svc\n    host: test.upstream\n    tags:\n",
    );
    for tag in tags {
        let _ = writeln!(doc, "      - {tag}");
    }
    if tags.is_empty() {
        doc = doc.replace("tags:\n", "tags: []\n");
    }
    doc
}

proptest! {
    /// A DC target group is defective exactly when its weights do not sum
    /// to 100.
    #[test]
    fn weight_sum_invariant(weights in proptest::collection::vec(1i64..=150, 1..5)) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upstreams.yaml");
        std::fs::write(&path, upstreams_yaml(&weights)).unwrap();

        let defects = validate_upstream_file(&path, &[]);
        let sum: i64 = weights.iter().sum();
        let sum_defects = defects
            .iter()
            .filter(|d| d.message().contains("must sum to weight"))
            .count();

        if sum == 100 {
            prop_assert_eq!(sum_defects, 0, "defects: {:?}", defects);
        } else {
            prop_assert_eq!(sum_defects, 1, "defects: {:?}", defects);
            let message = defects
                .iter()
                .find(|d| d.message().contains("must sum to weight"))
                .unwrap()
                .message()
                .to_string();
            prop_assert!(message.contains("'delhi'"));
            prop_assert!(message.contains("'test.upstream'"));
            let got_needle = format!("got {}", sum);
            prop_assert!(message.contains(&got_needle));
        }
    }

    /// A service appears in the merged output exactly when its tags contain
    /// the requested compliance classification.
    #[test]
    fn compliance_filtering_law(
        tags in proptest::collection::vec("[a-z]{1,8}", 0..4),
        requested in "[a-z]{1,8}",
    ) {
        let dir = tempfile::tempdir().unwrap();
        let product = dir.path().join("dev").join("product1");
        std::fs::create_dir_all(&product).unwrap();
        std::fs::write(product.join("service1.yaml"), service_yaml(&tags)).unwrap();

        let outcome = merge_environment(&MergeConfig {
            gateway_root: dir.path().to_path_buf(),
            env_name: "dev".to_string(),
            topology_file: None,
            compliance_type: requested.clone(),
            dc_name: "delhi".to_string(),
        });

        prop_assert!(outcome.is_success());
        let expected = usize::from(tags.contains(&requested));
        prop_assert_eq!(outcome.state.services.len(), expected);
    }
}
