//! The Message aggregate: the mutable unit-of-work envelope.
//!
//! A message composes a payload buffer, a metadata store, an identity, and
//! an object-header side channel, and is handed from stage to stage of a
//! pipeline. Exactly one owner mutates it at a time; fan-out to parallel
//! branches requires [`Message::fork`] per branch.

use super::{
    ContentEncoding, MessageId, MetadataStore, ObjectHeaders, PayloadBuffer, PayloadReader,
    PayloadWriter,
};
use crate::message::error::MessageError;
use crate::message::services::resolver::ExpressionResolver;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::error::Error;
use std::sync::Arc;
use tracing::debug;

/// A mutable unit-of-work envelope carrying payload, metadata, and identity
/// through a processing pipeline.
///
/// Messages are created exclusively through a
/// [`MessageFactory`](crate::message::services::factory::MessageFactory),
/// mutated in place by pipeline stages, and handed off sequentially. All
/// mutation is immediately visible to the holder; the only buffered path is
/// the output stream, which commits atomically on close.
///
/// # Invariants
///
/// - `id` is a non-nil UUID, stable across mutation
/// - the payload buffer is always present; empty bytes are valid
/// - no two metadata keys differ only in ASCII case
/// - a fork carries identical payload bytes and metadata entries under a
///   fresh id, with object headers and any recorded failure dropped
///
/// # Serialisation
///
/// The id, encoding, payload, metadata, and creation timestamp serialise;
/// object headers and the failure slot are in-process only and are skipped.
#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier for this envelope.
    id: MessageId,

    /// Encoding used when converting payload bytes to and from text.
    content_encoding: ContentEncoding,

    /// The primary byte content.
    payload: PayloadBuffer,

    /// Case-insensitive key/value annotations.
    metadata: MetadataStore,

    /// In-process side channel; never serialised, dropped on fork.
    #[serde(skip)]
    object_headers: ObjectHeaders,

    /// Last processing failure attached by a stage, cleared on success.
    #[serde(skip)]
    failure: Option<Arc<dyn Error + Send + Sync>>,

    /// Guard for the single-open-output-stream contract.
    #[serde(skip)]
    writer_open: bool,

    /// When the envelope was created.
    created_at: DateTime<Utc>,
}

impl Message {
    /// Creates a message. Crate-private: construction goes through the
    /// factory so every envelope is well-formed and carries the factory's
    /// default encoding.
    pub(crate) fn create(
        payload: PayloadBuffer,
        content_encoding: ContentEncoding,
        metadata: MetadataStore,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: MessageId::new(),
            content_encoding,
            payload,
            metadata,
            object_headers: ObjectHeaders::new(),
            failure: None,
            writer_open: false,
            created_at: clock.utc(),
        }
    }

    /// Returns the message identifier.
    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // ------------------------------------------------------------------
    // Payload
    // ------------------------------------------------------------------

    /// Returns the payload buffer.
    #[must_use]
    pub const fn payload(&self) -> &PayloadBuffer {
        &self.payload
    }

    /// Returns the payload bytes.
    #[must_use]
    pub fn payload_bytes(&self) -> &[u8] {
        self.payload.as_bytes()
    }

    /// Replaces the payload bytes.
    ///
    /// The replacement is immediately visible; any staged output-stream
    /// bytes are unaffected and will overwrite this payload if their
    /// writer is later closed.
    pub fn set_payload(&mut self, bytes: impl Into<Vec<u8>>) {
        self.payload.set_bytes(bytes.into());
    }

    // ------------------------------------------------------------------
    // Content (text view of the payload)
    // ------------------------------------------------------------------

    /// Decodes the payload as text using the message's content encoding.
    #[must_use]
    pub fn content(&self) -> String {
        self.payload.decode(self.content_encoding)
    }

    /// Decodes the payload as text using an explicit encoding, leaving the
    /// message's content encoding unchanged.
    #[must_use]
    pub fn content_with(&self, encoding: ContentEncoding) -> String {
        self.payload.decode(encoding)
    }

    /// Replaces the payload with text encoded under the message's content
    /// encoding.
    pub fn set_content(&mut self, text: &str) {
        self.payload.set_bytes(self.content_encoding.encode(text));
    }

    /// Replaces the payload with text encoded under an explicit encoding,
    /// which also becomes the message's content encoding.
    pub fn set_content_with(&mut self, text: &str, encoding: ContentEncoding) {
        self.content_encoding = encoding;
        self.payload.set_bytes(encoding.encode(text));
    }

    /// Returns the content encoding.
    #[must_use]
    pub const fn content_encoding(&self) -> ContentEncoding {
        self.content_encoding
    }

    /// Sets the content encoding without touching the payload bytes.
    pub const fn set_content_encoding(&mut self, encoding: ContentEncoding) {
        self.content_encoding = encoding;
    }

    /// Sets the content encoding from a character-set name.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::UnsupportedEncoding`] when the name is not
    /// resolvable.
    pub fn set_content_encoding_name(&mut self, name: &str) -> Result<(), MessageError> {
        self.content_encoding = ContentEncoding::resolve(name)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Streams
    // ------------------------------------------------------------------

    /// Opens a finite read stream over the current payload bytes.
    ///
    /// Each call returns a fresh view positioned at the start.
    #[must_use]
    pub fn open_input_stream(&self) -> PayloadReader<'_> {
        self.payload.reader()
    }

    /// Opens a staging output stream over the payload.
    ///
    /// Writes accumulate privately and replace the payload atomically when
    /// the writer is [closed](PayloadWriter::close); nothing is observable
    /// before that. Only one output stream may be open per message at a
    /// time.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::ResourceBusy`] while a previously opened
    /// writer has been neither closed nor aborted.
    pub fn open_output_stream(&mut self) -> Result<PayloadWriter, MessageError> {
        if self.writer_open {
            return Err(MessageError::ResourceBusy);
        }
        self.writer_open = true;
        Ok(PayloadWriter::open(self.id))
    }

    /// Releases the output-stream guard left held by a writer that was
    /// dropped without being closed or aborted.
    ///
    /// Returns `true` if a guard was actually held. The payload is
    /// untouched either way; an unclosed writer is a leak, never a
    /// correctness hazard.
    pub const fn release_output_stream(&mut self) -> bool {
        let was_open = self.writer_open;
        self.writer_open = false;
        was_open
    }

    pub(crate) fn complete_output_stream(
        &mut self,
        owner: MessageId,
        staged: Option<Vec<u8>>,
    ) -> Result<(), MessageError> {
        if owner != self.id {
            return Err(MessageError::invalid_argument(format!(
                "output stream was opened on message {owner}, not {id}",
                id = self.id
            )));
        }
        if !self.writer_open {
            return Err(MessageError::invalid_argument(
                "no output stream is open for this message",
            ));
        }
        self.writer_open = false;
        if let Some(bytes) = staged {
            debug!(message_id = %self.id, bytes = bytes.len(), "payload replaced from output stream");
            self.payload.set_bytes(bytes);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------

    /// Returns the metadata store.
    #[must_use]
    pub const fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    /// Returns the metadata store for bulk mutation.
    pub const fn metadata_mut(&mut self) -> &mut MetadataStore {
        &mut self.metadata
    }

    /// Replaces the whole metadata store.
    pub fn replace_metadata(&mut self, metadata: MetadataStore) {
        self.metadata = metadata;
    }

    /// Adds a metadata key/value pair, overwriting in place if a
    /// case-variant of the key is already present.
    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.add(key, value);
    }

    /// Returns the metadata value for a key, matched case-insensitively.
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key)
    }

    /// Removes a metadata key, matched case-insensitively, returning its
    /// value.
    pub fn remove_metadata(&mut self, key: &str) -> Option<String> {
        self.metadata.remove(key)
    }

    /// Returns `true` if a case-variant of the metadata key is present.
    #[must_use]
    pub fn contains_metadata(&self, key: &str) -> bool {
        self.metadata.contains_key(key)
    }

    // ------------------------------------------------------------------
    // Object headers
    // ------------------------------------------------------------------

    /// Returns the object-header side channel.
    #[must_use]
    pub const fn object_headers(&self) -> &ObjectHeaders {
        &self.object_headers
    }

    /// Returns the object-header side channel for bulk mutation.
    pub const fn object_headers_mut(&mut self) -> &mut ObjectHeaders {
        &mut self.object_headers
    }

    /// Attaches an in-memory value under a case-sensitive key.
    ///
    /// Object headers never serialise and do not survive a fork.
    pub fn set_object_header(&mut self, key: impl Into<String>, value: impl Any + Send + Sync) {
        self.object_headers.insert(key, value);
    }

    /// Returns an object header downcast to the requested type.
    #[must_use]
    pub fn object_header<T: Any>(&self, key: &str) -> Option<&T> {
        self.object_headers.get(key)
    }

    /// Removes and returns an object header.
    pub fn remove_object_header(&mut self, key: &str) -> Option<Box<dyn Any + Send + Sync>> {
        self.object_headers.remove(key)
    }

    // ------------------------------------------------------------------
    // Failure slot
    // ------------------------------------------------------------------

    /// Attaches the last processing failure to the message.
    ///
    /// Replaces any previously recorded failure.
    pub fn record_failure(&mut self, failure: impl Error + Send + Sync + 'static) {
        self.failure = Some(Arc::new(failure));
    }

    /// Returns the last recorded processing failure, if any.
    #[must_use]
    pub fn last_failure(&self) -> Option<&(dyn Error + Send + Sync)> {
        self.failure.as_deref()
    }

    /// Clears the recorded failure; stages call this on success.
    pub fn clear_failure(&mut self) {
        self.failure = None;
    }

    // ------------------------------------------------------------------
    // Fan-out
    // ------------------------------------------------------------------

    /// Deep-copies the payload bytes and metadata entries into a new
    /// message with a freshly generated id, for handing to a parallel
    /// branch.
    ///
    /// Object headers and any recorded failure are dropped: sharing live
    /// in-memory handles between branches would reintroduce exactly the
    /// shared-mutation hazard forking exists to avoid. The fork's creation
    /// timestamp is taken from the supplied clock.
    #[must_use]
    pub fn fork(&self, clock: &impl Clock) -> Self {
        let fork = Self {
            id: MessageId::new(),
            content_encoding: self.content_encoding,
            payload: self.payload.clone(),
            metadata: self.metadata.clone(),
            object_headers: ObjectHeaders::new(),
            failure: None,
            writer_open: false,
            created_at: clock.utc(),
        };
        debug!(source = %self.id, fork = %fork.id, "message forked for fan-out");
        fork
    }

    // ------------------------------------------------------------------
    // Expression resolution
    // ------------------------------------------------------------------

    /// Substitutes `%message{...}` references in a template string with
    /// this message's metadata values, leniently: unresolved references
    /// pass through verbatim.
    ///
    /// Use an [`ExpressionResolver`] directly for strict resolution.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::MalformedExpression`] when a reference token
    /// is opened but never closed.
    pub fn resolve(&self, template: &str) -> Result<String, MessageError> {
        ExpressionResolver::lenient().resolve(self, template)
    }
}
