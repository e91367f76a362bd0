//! Application services for the message envelope.
//!
//! Services sit at the seams of the domain: the factory constructs
//! well-formed envelopes under shared default configuration, and the
//! resolver substitutes metadata references into configuration-driven
//! template strings.

pub mod factory;
pub mod resolver;
