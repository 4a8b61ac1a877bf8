//! # botledger Definition
//!
//! Typed chatbot definition payloads: the "definition builder" collaborator
//! that produces the bytes the ledger stores, and parses stored bytes back
//! into structured form.
//!
//! The ledger core treats these payloads as opaque byte sequences; this
//! crate owns their meaning. Decoding is fail-loud by design: missing or
//! malformed required fields are explicit errors, never silent defaults.

pub mod definition;
pub mod error;

pub use definition::{BotDefinition, Intent, Response};
pub use error::DefinitionError;
