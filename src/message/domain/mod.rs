//! Domain types for the message envelope.
//!
//! This module contains pure envelope types with no infrastructure
//! dependencies. The serialisable parts ([`Message`], [`MetadataStore`],
//! [`PayloadBuffer`]) derive or implement serde; the object-header side
//! channel is in-process only and never serialised.

mod encoding;
mod headers;
mod ids;
mod message;
mod metadata;
mod payload;

pub use encoding::ContentEncoding;
pub use headers::ObjectHeaders;
pub use ids::MessageId;
pub use message::Message;
pub use metadata::MetadataStore;
pub use payload::{PayloadBuffer, PayloadReader, PayloadWriter};
