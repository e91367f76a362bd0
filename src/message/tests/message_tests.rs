//! Unit tests for the Message aggregate: content, metadata, object headers,
//! failure slot, and fan-out forking.

use crate::message::domain::{ContentEncoding, MetadataStore};
use crate::message::services::factory::{FactoryConfig, MessageFactory};
use mockable::DefaultClock;
use rstest::rstest;
use std::io::{Error, ErrorKind};

fn factory() -> MessageFactory {
    MessageFactory::new()
}

// ============================================================================
// Content conversion
// ============================================================================

#[rstest]
fn set_content_uses_the_message_encoding() {
    let mut message = factory().new_message();
    message.set_content("grüße");
    assert_eq!(message.payload_bytes(), "grüße".as_bytes());
    assert_eq!(message.content(), "grüße");
}

#[rstest]
fn set_content_with_override_switches_the_encoding() {
    let mut message = factory().new_message();
    message.set_content_with("café", ContentEncoding::Latin1);

    assert_eq!(message.content_encoding(), ContentEncoding::Latin1);
    assert_eq!(message.payload_bytes(), &[b'c', b'a', b'f', 0xE9]);
    assert_eq!(message.content(), "café");
}

#[rstest]
fn content_with_reads_under_an_explicit_encoding() {
    let mut message = factory().new_message();
    message.set_payload(vec![b'c', b'a', b'f', 0xE9]);

    // The message encoding stays UTF-8; the per-call override decodes
    // the same bytes as Latin-1.
    assert_eq!(message.content_with(ContentEncoding::Latin1), "café");
    assert_eq!(message.content_encoding(), ContentEncoding::Utf8);
}

#[rstest]
fn set_content_encoding_name_resolves_or_rejects() {
    let mut message = factory().new_message();
    message
        .set_content_encoding_name("ISO-8859-1")
        .expect("known charset");
    assert_eq!(message.content_encoding(), ContentEncoding::Latin1);

    let err = message.set_content_encoding_name("cp1252");
    assert!(err.is_err());
    // A failed resolution leaves the encoding unchanged.
    assert_eq!(message.content_encoding(), ContentEncoding::Latin1);
}

// ============================================================================
// Metadata operations
// ============================================================================

#[rstest]
fn metadata_operations_are_case_insensitive() {
    let mut message = factory().new_message();
    message.add_metadata("Channel", "orders");

    assert_eq!(message.metadata_value("channel"), Some("orders"));
    assert!(message.contains_metadata("CHANNEL"));
    assert_eq!(message.remove_metadata("cHaNnEl"), Some("orders".to_owned()));
    assert!(message.metadata().is_empty());
}

#[rstest]
fn replace_metadata_swaps_the_whole_store() {
    let mut message = factory().new_message();
    message.add_metadata("old", "1");

    let replacement: MetadataStore = [("new", "2")].into_iter().collect();
    message.replace_metadata(replacement);

    assert!(!message.contains_metadata("old"));
    assert_eq!(message.metadata_value("new"), Some("2"));
}

// ============================================================================
// Object headers
// ============================================================================

#[rstest]
fn object_headers_store_typed_values() {
    let mut message = factory().new_message();
    message.set_object_header("attempt", 2_u32);

    assert_eq!(message.object_header::<u32>("attempt"), Some(&2));
    // Wrong type downcasts to None.
    assert_eq!(message.object_header::<String>("attempt"), None);
    // Keys are case-sensitive, unlike metadata.
    assert_eq!(message.object_header::<u32>("Attempt"), None);
}

#[rstest]
fn object_headers_can_be_removed() {
    let mut message = factory().new_message();
    message.set_object_header("handle", "raw".to_owned());

    let removed = message.remove_object_header("handle");
    assert!(removed.is_some());
    assert!(message.object_headers().is_empty());
}

// ============================================================================
// Failure slot
// ============================================================================

#[rstest]
fn record_and_clear_failure() {
    let mut message = factory().new_message();
    assert!(message.last_failure().is_none());

    message.record_failure(Error::new(ErrorKind::TimedOut, "upstream timeout"));
    let failure = message.last_failure().expect("failure recorded");
    assert!(failure.to_string().contains("upstream timeout"));

    message.clear_failure();
    assert!(message.last_failure().is_none());
}

// ============================================================================
// Forking
// ============================================================================

#[rstest]
fn fork_copies_payload_and_metadata_under_a_fresh_id() {
    let clock = DefaultClock;
    let mut original = factory().from_text("fan out");
    original.add_metadata("Branch", "left");

    let fork = original.fork(&clock);

    assert_ne!(fork.id(), original.id());
    assert_eq!(fork.payload_bytes(), original.payload_bytes());
    assert_eq!(fork.metadata(), original.metadata());
    assert_eq!(fork.content_encoding(), original.content_encoding());
}

#[rstest]
fn fork_is_independent_of_the_original() {
    let clock = DefaultClock;
    let original = factory().from_text("shared");
    let mut fork = original.fork(&clock);

    fork.set_payload(b"diverged".to_vec());
    fork.add_metadata("only", "fork");

    assert_eq!(original.payload_bytes(), b"shared");
    assert!(!original.contains_metadata("only"));
}

#[rstest]
fn fork_drops_object_headers_and_failure() {
    let clock = DefaultClock;
    let mut original = factory().new_message();
    original.set_object_header("handle", 7_u64);
    original.record_failure(Error::other("stage blew up"));

    let fork = original.fork(&clock);

    assert!(fork.object_headers().is_empty());
    assert!(fork.last_failure().is_none());
}

#[rstest]
fn fork_does_not_inherit_an_open_stream_guard() {
    let clock = DefaultClock;
    let mut original = factory().new_message();
    let _writer = original.open_output_stream().expect("first open");

    let mut fork = original.fork(&clock);
    assert!(fork.open_output_stream().is_ok());
}

// ============================================================================
// Serialisation
// ============================================================================

#[rstest]
fn serde_round_trip_keeps_envelope_and_skips_side_channels() {
    let config = FactoryConfig::from_names("ISO-8859-1", "standard").expect("known options");
    let latin1_factory = MessageFactory::with_config(config);

    let mut message = latin1_factory.from_text("wire me");
    message.add_metadata("Route", "a");
    message.set_object_header("live-handle", 1_u8);

    let json = serde_json::to_string(&message).expect("serialize");
    assert!(!json.contains("live-handle"));

    let back: crate::message::domain::Message = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.id(), message.id());
    assert_eq!(back.payload_bytes(), message.payload_bytes());
    assert_eq!(back.metadata(), message.metadata());
    assert_eq!(back.content_encoding(), ContentEncoding::Latin1);
    assert!(back.object_headers().is_empty());
}
