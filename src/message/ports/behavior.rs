//! The stage-facing message capability port.
//!
//! Pipeline stages (routers, transformers, transport producers) are written
//! against [`MessageBehavior`] rather than a concrete envelope type, so the
//! factory can select an alternate implementation variant without touching
//! stage code.

use crate::message::domain::{ContentEncoding, Message, MessageId};
use crate::message::error::MessageError;

/// The operation set every message envelope variant provides.
///
/// The trait is object-safe: the factory hands stages a
/// `Box<dyn MessageBehavior>` when dispatching on its configured variant.
/// Streaming payload access and object headers are deliberately outside the
/// port; stages that need them work with the concrete
/// [`Message`] type.
///
/// # Implementation Notes
///
/// Implementations must uphold the envelope invariants:
///
/// - mutation is immediately visible to the single current owner
/// - metadata keys are matched case-insensitively and stay unique
/// - resolution is lenient (unresolved references pass through verbatim)
pub trait MessageBehavior: Send {
    /// Returns the envelope identifier.
    fn id(&self) -> MessageId;

    /// Returns the payload bytes.
    fn payload_bytes(&self) -> &[u8];

    /// Replaces the payload bytes.
    fn set_payload_bytes(&mut self, bytes: Vec<u8>);

    /// Decodes the payload as text using the envelope's content encoding.
    fn content(&self) -> String;

    /// Replaces the payload with text encoded under the envelope's content
    /// encoding.
    fn set_content(&mut self, text: &str);

    /// Returns the content encoding.
    fn content_encoding(&self) -> ContentEncoding;

    /// Adds a metadata key/value pair, overwriting on case-insensitive
    /// collision.
    fn add_metadata(&mut self, key: &str, value: &str);

    /// Returns the metadata value for a key, matched case-insensitively.
    fn metadata_value(&self, key: &str) -> Option<&str>;

    /// Removes a metadata key, returning its value.
    fn remove_metadata(&mut self, key: &str) -> Option<String>;

    /// Returns `true` if a case-variant of the metadata key is present.
    fn contains_metadata(&self, key: &str) -> bool;

    /// Substitutes `%message{...}` references in a template leniently.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::MalformedExpression`] when a reference token
    /// is opened but never closed.
    fn resolve(&self, template: &str) -> Result<String, MessageError>;
}

impl MessageBehavior for Message {
    fn id(&self) -> MessageId {
        Self::id(self)
    }

    fn payload_bytes(&self) -> &[u8] {
        Self::payload_bytes(self)
    }

    fn set_payload_bytes(&mut self, bytes: Vec<u8>) {
        self.set_payload(bytes);
    }

    fn content(&self) -> String {
        Self::content(self)
    }

    fn set_content(&mut self, text: &str) {
        Self::set_content(self, text);
    }

    fn content_encoding(&self) -> ContentEncoding {
        Self::content_encoding(self)
    }

    fn add_metadata(&mut self, key: &str, value: &str) {
        Self::add_metadata(self, key, value);
    }

    fn metadata_value(&self, key: &str) -> Option<&str> {
        Self::metadata_value(self, key)
    }

    fn remove_metadata(&mut self, key: &str) -> Option<String> {
        Self::remove_metadata(self, key)
    }

    fn contains_metadata(&self, key: &str) -> bool {
        Self::contains_metadata(self, key)
    }

    fn resolve(&self, template: &str) -> Result<String, MessageError> {
        Self::resolve(self, template)
    }
}
