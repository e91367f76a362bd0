//! Port trait definitions for the message envelope.
//!
//! Ports define the abstract interfaces pipeline stages program against.
//! The standard [`domain::Message`](crate::message::domain::Message)
//! implements them; alternate envelope variants selected through factory
//! configuration implement the same contracts.

pub mod behavior;
