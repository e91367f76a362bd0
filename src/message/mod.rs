//! The unit-of-work message envelope and its factory.
//!
//! This module implements the core envelope types: the payload buffer, the
//! case-insensitive metadata store, the object-header side channel, and the
//! [`domain::Message`] aggregate that composes them, along with the factory
//! and the metadata-reference resolver that configuration-driven stages use
//! to substitute metadata values into strings.
//!
//! # Architecture
//!
//! The module follows hexagonal architecture principles:
//!
//! - **Domain**: Pure envelope types ([`domain::Message`],
//!   [`domain::MetadataStore`], [`domain::PayloadBuffer`], etc.)
//! - **Ports**: Abstract trait interfaces ([`ports::behavior::MessageBehavior`])
//! - **Services**: Envelope construction and template resolution
//!   ([`services::factory::MessageFactory`],
//!   [`services::resolver::ExpressionResolver`])
//!
//! # Example
//!
//! ```
//! use dunnage::message::domain::ContentEncoding;
//! use dunnage::message::services::factory::{FactoryConfig, MessageFactory};
//!
//! let config = FactoryConfig::from_names("UTF-8", "standard").expect("known options");
//! let factory = MessageFactory::with_config(config);
//!
//! let message = factory.from_text("order #42");
//! assert_eq!(message.content(), "order #42");
//! assert_eq!(message.content_encoding(), ContentEncoding::Utf8);
//! ```

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
