//! Dunnage: the message envelope at the core of an integration pipeline.
//!
//! This crate provides the mutable unit-of-work envelope that carries a
//! payload, metadata, and identity between pipeline stages, together with
//! the factory that constructs well-formed instances of it.
//!
//! # Architecture
//!
//! Dunnage follows hexagonal architecture principles:
//!
//! - **Domain**: Pure envelope types with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for pipeline stages
//! - **Services**: The factory and the metadata-reference resolver
//!
//! Transport connectors, workflow orchestration, and persistence are
//! external collaborators: they receive and hand off
//! [`message::domain::Message`] instances but do not define their internal
//! contract.
//!
//! # Example
//!
//! ```
//! use dunnage::message::services::factory::MessageFactory;
//!
//! let factory = MessageFactory::new();
//! let mut message = factory.from_text("hello");
//! message.add_metadata("Channel", "orders");
//!
//! let routed = message
//!     .resolve("queue/%message{channel}")
//!     .expect("template resolves");
//! assert_eq!(routed, "queue/orders");
//! ```

pub mod message;
