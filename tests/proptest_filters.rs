//! Property-based tests using proptest
//!
//! These tests check the filter and projection engine against plain Rust
//! predicates over randomized records.

use ovhcloud::filter::{FilterSet, Projection};
use proptest::prelude::*;
use serde_json::{json, Value};

/// Generate an arbitrary loadbalancer-like record
fn arb_record() -> impl Strategy<Value = Value> {
    (
        "[a-z][a-z0-9-]{0,20}", // id
        prop_oneof!["ACTIVE", "ERROR", "PENDING_CREATE", "DELETED"],
        prop_oneof!["GRA7", "GRA11", "BHS5", "SBG5", "WAW1", "DE1"],
        0i64..10_000,
        any::<bool>(),
    )
        .prop_map(|(id, status, region, size, public)| {
            json!({
                "id": id,
                "status": status,
                "region": region,
                "size": size,
                "network": {"public": public}
            })
        })
}

fn arb_records() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(arb_record(), 0..50)
}

fn field<'a>(record: &'a Value, name: &str) -> &'a Value {
    &record[name]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A filter keeps exactly the records the equivalent predicate keeps, in order
    #[test]
    fn filter_matches_predicate(records in arb_records()) {
        let filters = FilterSet::compile(&[r#"status == "ACTIVE" && region =~ "^GRA""#]).unwrap();

        let expected: Vec<Value> = records
            .iter()
            .filter(|r| {
                field(r, "status") == "ACTIVE"
                    && field(r, "region").as_str().unwrap().starts_with("GRA")
            })
            .cloned()
            .collect();

        prop_assert_eq!(filters.apply(records), expected);
    }

    /// Several filters behave as their conjunction
    #[test]
    fn filters_are_and_combined(records in arb_records(), threshold in 0i64..10_000) {
        let size_filter = format!("size >= {threshold}");
        let separate = FilterSet::compile(&[size_filter.as_str(), "network.public"]).unwrap();
        let combined =
            FilterSet::compile(&[format!("size >= {threshold} && network.public == true")]).unwrap();

        prop_assert_eq!(separate.apply(records.clone()), combined.apply(records));
    }

    /// Filtering never invents or reorders records
    #[test]
    fn filter_output_is_ordered_subset(records in arb_records()) {
        let filters = FilterSet::compile(&["size % 2 == 0 || status != \"ERROR\""]).unwrap();
        let kept = filters.apply(records.clone());

        let mut remaining = records.iter();
        for record in &kept {
            prop_assert!(remaining.any(|r| r == record));
        }
    }

    /// An unsatisfiable filter yields an empty result, never an error
    #[test]
    fn unsatisfiable_filter_is_empty(records in arb_records()) {
        let filters = FilterSet::compile(&["status == \"ACTIVE\" && status == \"ERROR\""]).unwrap();
        prop_assert!(filters.apply(records).is_empty());
    }

    /// A filter erroring on every record rejects them all
    #[test]
    fn evaluation_errors_reject_records(records in arb_records()) {
        let filters = FilterSet::compile(&["status * 2 > 1"]).unwrap();
        prop_assert!(filters.apply(records).is_empty());
    }

    /// Projections see the same values as direct field access
    #[test]
    fn projection_extracts_fields(record in arb_record()) {
        let projection = Projection::compile("[id, network.public, size * 2]").unwrap();
        let projected = projection.apply(&record).unwrap();

        let doubled = record["size"].as_i64().unwrap() * 2;
        prop_assert_eq!(
            projected,
            json!([record["id"], record["network"]["public"], doubled])
        );
    }

    /// Arbitrary input never panics the compiler
    #[test]
    fn compile_never_panics(source in "\\PC{0,40}") {
        let _ = FilterSet::compile(&[source.as_str()]);
        let _ = Projection::compile(&source);
    }
}

#[test]
fn test_malformed_filter_is_rejected_up_front() {
    assert!(FilterSet::compile(&["status == \"ACTIVE\"", "region =~"]).is_err());
    assert!(FilterSet::compile(&["name =~ \"([\""]).is_err());
}
