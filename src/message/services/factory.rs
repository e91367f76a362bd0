//! Configurable construction of message envelopes.
//!
//! A factory applies its default content encoding and implementation
//! variant to every envelope it creates, so all messages entering a
//! pipeline through one factory behave uniformly. Factory configuration is
//! read-only after construction; one factory may be shared across threads
//! to create independent messages concurrently.

use crate::message::domain::{ContentEncoding, Message, MetadataStore, PayloadBuffer};
use crate::message::error::MessageError;
use crate::message::ports::behavior::MessageBehavior;
use mockable::{Clock, DefaultClock};
use std::io::Read;
use tracing::debug;

/// The selectable message implementation variant.
///
/// Maps the `defaultImplementationClass` configuration option onto a closed
/// identifier set; the factory dispatches on it when constructing
/// envelopes. `Standard` is the in-memory implementation shipped with this
/// crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MessageVariant {
    /// The standard in-memory envelope.
    #[default]
    Standard,
}

impl MessageVariant {
    /// Resolves a configured variant identifier.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidArgument`] for an unrecognised
    /// identifier; unknown options are rejected rather than silently
    /// defaulted.
    pub fn resolve(name: &str) -> Result<Self, MessageError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" | "default" => Ok(Self::Standard),
            _ => Err(MessageError::invalid_argument(format!(
                "unknown message implementation variant '{name}'"
            ))),
        }
    }

    /// Returns the canonical identifier for this variant.
    #[must_use]
    pub const fn identifier(self) -> &'static str {
        match self {
            Self::Standard => "standard",
        }
    }
}

/// Factory configuration: the default content encoding and implementation
/// variant applied to every message the factory creates.
///
/// # Examples
///
/// ```
/// use dunnage::message::domain::ContentEncoding;
/// use dunnage::message::services::factory::FactoryConfig;
///
/// let config = FactoryConfig::from_names("ISO-8859-1", "standard").expect("known options");
/// assert_eq!(config.default_encoding, ContentEncoding::Latin1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FactoryConfig {
    /// Encoding stamped onto every created message.
    pub default_encoding: ContentEncoding,
    /// Implementation variant the factory constructs.
    pub variant: MessageVariant,
}

impl FactoryConfig {
    /// Builds a configuration from the raw option strings found in
    /// pipeline configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::UnsupportedEncoding`] for an unresolvable
    /// character-set name and [`MessageError::InvalidArgument`] for an
    /// unknown variant identifier.
    pub fn from_names(encoding: &str, variant: &str) -> Result<Self, MessageError> {
        Ok(Self {
            default_encoding: ContentEncoding::resolve(encoding)?,
            variant: MessageVariant::resolve(variant)?,
        })
    }
}

/// Constructs well-formed message envelopes under shared default
/// configuration.
///
/// Every message produced by one factory instance carries the factory's
/// default encoding unless explicitly overridden per message afterwards.
/// The clock is injected so creation timestamps are deterministic in tests.
///
/// # Examples
///
/// ```
/// use dunnage::message::services::factory::MessageFactory;
///
/// let factory = MessageFactory::new();
/// let message = factory.from_text("hello");
/// assert_eq!(message.payload_bytes(), b"hello");
/// assert!(message.metadata().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct MessageFactory<C: Clock = DefaultClock> {
    config: FactoryConfig,
    clock: C,
}

impl MessageFactory<DefaultClock> {
    /// Creates a factory with the default configuration (UTF-8, standard
    /// variant) and the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(FactoryConfig::default())
    }

    /// Creates a factory with the given configuration and the system clock.
    #[must_use]
    pub const fn with_config(config: FactoryConfig) -> Self {
        Self {
            config,
            clock: DefaultClock,
        }
    }
}

impl Default for MessageFactory<DefaultClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MessageFactory<C> {
    /// Creates a factory with an explicit clock, for deterministic
    /// creation timestamps in tests.
    pub const fn with_clock(config: FactoryConfig, clock: C) -> Self {
        Self { config, clock }
    }

    /// Returns the factory configuration.
    #[must_use]
    pub const fn config(&self) -> &FactoryConfig {
        &self.config
    }

    /// Creates an empty message: zero-length payload, empty metadata,
    /// fresh id, the factory's default encoding.
    #[must_use]
    pub fn new_message(&self) -> Message {
        self.build(PayloadBuffer::new(), MetadataStore::new())
    }

    /// Creates a message whose payload is initialised from raw bytes.
    #[must_use]
    pub fn from_bytes(&self, bytes: impl Into<Vec<u8>>) -> Message {
        self.build(PayloadBuffer::from_bytes(bytes.into()), MetadataStore::new())
    }

    /// Creates a message whose payload is the text encoded under the
    /// factory's default encoding.
    #[must_use]
    pub fn from_text(&self, text: &str) -> Message {
        self.from_text_with_metadata(text, MetadataStore::new())
    }

    /// Creates a message by draining a byte stream into the payload.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::PayloadStream`] if reading from the source
    /// fails.
    pub fn from_reader(&self, mut reader: impl Read) -> Result<Message, MessageError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(self.build(PayloadBuffer::from_bytes(bytes), MetadataStore::new()))
    }

    /// Creates a message from raw bytes with metadata seeded at
    /// construction, so no empty-metadata window is ever observable.
    #[must_use]
    pub fn from_bytes_with_metadata(
        &self,
        bytes: impl Into<Vec<u8>>,
        metadata: MetadataStore,
    ) -> Message {
        self.build(PayloadBuffer::from_bytes(bytes.into()), metadata)
    }

    /// Creates a message from text with metadata seeded at construction.
    #[must_use]
    pub fn from_text_with_metadata(&self, text: &str, metadata: MetadataStore) -> Message {
        let payload = PayloadBuffer::from_bytes(self.config.default_encoding.encode(text));
        self.build(payload, metadata)
    }

    /// Creates an empty message behind the stage-facing port, dispatching
    /// on the configured implementation variant.
    #[must_use]
    pub fn new_message_boxed(&self) -> Box<dyn MessageBehavior> {
        match self.config.variant {
            MessageVariant::Standard => Box::new(self.new_message()),
        }
    }

    fn build(&self, payload: PayloadBuffer, metadata: MetadataStore) -> Message {
        let message = match self.config.variant {
            MessageVariant::Standard => Message::create(
                payload,
                self.config.default_encoding,
                metadata,
                &self.clock,
            ),
        };
        debug!(
            message_id = %message.id(),
            encoding = %message.content_encoding(),
            payload_bytes = message.payload().len(),
            "message created"
        );
        message
    }
}
