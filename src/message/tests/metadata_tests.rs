//! Unit tests for the case-insensitive, insertion-ordered metadata store.

use crate::message::domain::MetadataStore;
use rstest::rstest;

// ============================================================================
// Case-insensitive lookup
// ============================================================================

#[rstest]
#[case("Key1")]
#[case("key1")]
#[case("KEY1")]
#[case("kEy1")]
fn get_matches_any_case_variant(#[case] lookup: &str) {
    let mut store = MetadataStore::new();
    store.add("Key1", "A");
    assert_eq!(store.get(lookup), Some("A"));
}

#[rstest]
fn contains_key_is_case_insensitive() {
    let mut store = MetadataStore::new();
    store.add("Content-Type", "text/plain");
    assert!(store.contains_key("content-type"));
    assert!(store.contains_key("CONTENT-TYPE"));
    assert!(!store.contains_key("content-length"));
}

// ============================================================================
// Overwrite semantics
// ============================================================================

#[rstest]
fn re_add_overwrites_value_in_place() {
    let mut store = MetadataStore::new();
    store.add("first", "1");
    store.add("Second", "2");
    store.add("SECOND", "two");

    assert_eq!(store.len(), 2);
    assert_eq!(store.get("second"), Some("two"));
    // Position and first-inserted casing are preserved.
    let keys: Vec<&str> = store.keys().collect();
    assert_eq!(keys, vec!["first", "Second"]);
}

// ============================================================================
// Removal
// ============================================================================

#[rstest]
fn remove_returns_value_and_shrinks_store() {
    let mut store = MetadataStore::new();
    store.add("a", "1");
    store.add("b", "2");
    store.add("c", "3");

    assert_eq!(store.remove("B"), Some("2".to_owned()));
    assert_eq!(store.len(), 2);
    assert!(!store.contains_key("b"));
    // Later entries are still reachable after the positional shift.
    assert_eq!(store.get("c"), Some("3"));
    let keys: Vec<&str> = store.keys().collect();
    assert_eq!(keys, vec!["a", "c"]);
}

#[rstest]
fn remove_missing_key_returns_none() {
    let mut store = MetadataStore::new();
    store.add("a", "1");
    assert_eq!(store.remove("missing"), None);
    assert_eq!(store.len(), 1);
}

// ============================================================================
// Iteration order
// ============================================================================

#[rstest]
fn keys_iterate_in_insertion_order_and_restart() {
    let mut store = MetadataStore::new();
    store.add("Zebra", "z");
    store.add("alpha", "a");
    store.add("Mango", "m");

    let first_pass: Vec<&str> = store.keys().collect();
    let second_pass: Vec<&str> = store.keys().collect();
    assert_eq!(first_pass, vec!["Zebra", "alpha", "Mango"]);
    assert_eq!(first_pass, second_pass);
}

#[rstest]
fn entries_pair_keys_with_values() {
    let mut store = MetadataStore::new();
    store.add("a", "1");
    store.add("b", "2");

    let entries: Vec<(&str, &str)> = store.entries().collect();
    assert_eq!(entries, vec![("a", "1"), ("b", "2")]);
}

// ============================================================================
// Merge
// ============================================================================

#[rstest]
fn merge_overwrites_collisions_and_appends_new_keys() {
    let mut base = MetadataStore::new();
    base.add("host", "localhost");
    base.add("port", "5672");

    let mut incoming = MetadataStore::new();
    incoming.add("PORT", "5673");
    incoming.add("vhost", "orders");

    base.merge(&incoming);

    assert_eq!(base.len(), 3);
    assert_eq!(base.get("port"), Some("5673"));
    assert_eq!(base.get("vhost"), Some("orders"));
    // Collision keeps the base position; the new key appends.
    let keys: Vec<&str> = base.keys().collect();
    assert_eq!(keys, vec!["host", "port", "vhost"]);
}

// ============================================================================
// Equality
// ============================================================================

#[rstest]
fn equality_ignores_order_and_key_case() {
    let left: MetadataStore = [("A", "1"), ("b", "2")].into_iter().collect();
    let right: MetadataStore = [("B", "2"), ("a", "1")].into_iter().collect();
    assert_eq!(left, right);
}

#[rstest]
fn equality_compares_values() {
    let left: MetadataStore = [("a", "1")].into_iter().collect();
    let right: MetadataStore = [("a", "2")].into_iter().collect();
    assert_ne!(left, right);
}

#[rstest]
fn equality_compares_key_sets() {
    let left: MetadataStore = [("a", "1")].into_iter().collect();
    let right: MetadataStore = [("a", "1"), ("b", "2")].into_iter().collect();
    assert_ne!(left, right);
}

// ============================================================================
// Serialisation
// ============================================================================

#[rstest]
fn serde_round_trip_preserves_order_and_casing() {
    let mut store = MetadataStore::new();
    store.add("Zulu", "1");
    store.add("Alpha", "2");

    let json = serde_json::to_string(&store).expect("serialize");
    assert_eq!(json, r#"{"Zulu":"1","Alpha":"2"}"#);

    let back: MetadataStore = serde_json::from_str(&json).expect("deserialize");
    let keys: Vec<&str> = back.keys().collect();
    assert_eq!(keys, vec!["Zulu", "Alpha"]);
    assert_eq!(back, store);
}

#[rstest]
fn clear_empties_the_store() {
    let mut store = MetadataStore::new();
    store.add("a", "1");
    store.clear();
    assert!(store.is_empty());
    assert_eq!(store.get("a"), None);
}
