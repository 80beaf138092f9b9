//! Property-based tests for investigation id validation and generation.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use boundary_cli::domain::{
    InvestigationKey, StatusFilter, TaskStatus, generate_investigation_id,
    validate_investigation_id,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

// ============================================================================
// generate_investigation_id() property tests
// ============================================================================

proptest! {
    /// Generated ids are three lowercase words that pass validation.
    #[test]
    fn prop_generated_id_is_valid(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let id = generate_investigation_id(&mut rng);
        prop_assert_eq!(id.split('-').count(), 3, "not three words: {}", id);
        prop_assert!(validate_investigation_id(&id).is_ok(), "invalid: {}", id);
    }

    /// The same seed always yields the same id.
    #[test]
    fn prop_generated_id_is_deterministic_per_seed(seed in any::<u64>()) {
        let a = generate_investigation_id(&mut StdRng::seed_from_u64(seed));
        let b = generate_investigation_id(&mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(a, b);
    }
}

#[test]
fn test_generated_ids_vary() {
    let mut rng = StdRng::seed_from_u64(1);
    let ids: std::collections::HashSet<_> =
        (0..50).map(|_| generate_investigation_id(&mut rng)).collect();
    assert!(ids.len() > 1, "generator returned a constant");
}

// ============================================================================
// validate_investigation_id() property tests
// ============================================================================

proptest! {
    /// Slugs of lowercase alphanumerics joined by single dashes are accepted.
    #[test]
    fn prop_slug_ids_are_accepted(id in "[a-z0-9]{1,20}(-[a-z0-9]{1,20}){0,2}") {
        prop_assert!(validate_investigation_id(&id).is_ok(), "rejected: {}", id);
    }

    /// Any uppercase letter is rejected.
    #[test]
    fn prop_uppercase_is_rejected(prefix in "[a-z]{0,10}", upper in "[A-Z]", suffix in "[a-z]{0,10}") {
        let id = format!("{prefix}{upper}{suffix}");
        prop_assert!(validate_investigation_id(&id).is_err(), "accepted: {}", id);
    }

    /// Characters outside `[a-z0-9-]` are rejected.
    #[test]
    fn prop_foreign_characters_are_rejected(
        prefix in "[a-z]{1,10}",
        bad in "[_./ :@]",
        suffix in "[a-z]{1,10}",
    ) {
        let id = format!("{prefix}{bad}{suffix}");
        prop_assert!(validate_investigation_id(&id).is_err(), "accepted: {}", id);
    }

    /// Leading or trailing dashes are rejected.
    #[test]
    fn prop_edge_dashes_are_rejected(body in "[a-z]{1,20}") {
        let leading = format!("-{body}");
        let trailing = format!("{body}-");
        prop_assert!(validate_investigation_id(&leading).is_err());
        prop_assert!(validate_investigation_id(&trailing).is_err());
    }

    /// Ids longer than 63 characters are rejected.
    #[test]
    fn prop_long_ids_are_rejected(len in 64usize..200) {
        let id = "a".repeat(len);
        prop_assert!(validate_investigation_id(&id).is_err());
    }

    /// A key built from valid parts renders as `cluster/investigation`.
    #[test]
    fn prop_key_display(cluster in "[a-z0-9-]{1,20}", inv in "[a-z]{1,10}") {
        let key = InvestigationKey::new(cluster.clone(), inv.clone()).expect("valid key");
        prop_assert_eq!(key.to_string(), format!("{cluster}/{inv}"));
    }
}

// ============================================================================
// StatusFilter property tests
// ============================================================================

proptest! {
    /// Status names parse case-insensitively.
    #[test]
    fn prop_status_filter_ignores_case(name in prop::sample::select(vec![
        "running", "RUNNING", "Running", "rUnNiNg",
    ])) {
        prop_assert_eq!(StatusFilter::parse(name), StatusFilter::Only(TaskStatus::Running));
    }
}

#[test]
fn test_status_filter_all_and_empty() {
    assert_eq!(StatusFilter::parse("all"), StatusFilter::All);
    assert_eq!(StatusFilter::parse("ALL"), StatusFilter::All);
    assert_eq!(StatusFilter::parse(""), StatusFilter::All);
    assert!(!StatusFilter::parse("PENDING").accepts(&TaskStatus::Running));
}
