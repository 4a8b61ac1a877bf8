//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use botledger_core::Chain;
use botledger_definition::{BotDefinition, Intent, Response};
use botledger_store::MemoryStore;

/// A test fixture with a memory store.
pub struct TestFixture {
    pub store: MemoryStore,
}

impl TestFixture {
    /// Create a new test fixture with an empty memory store.
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
        }
    }

    /// Build a chain of `len` records with distinguishable payloads.
    pub fn make_chain(&self, len: u64) -> Chain {
        let mut chain = Chain::new();
        for i in 0..len {
            chain.append(format!("payload {}", i).into_bytes());
        }
        chain
    }

    /// Build a chain whose payloads are serialized definition revisions.
    pub fn make_definition_chain(&self, revisions: u32) -> Chain {
        let mut chain = Chain::new();
        for revision in 0..revisions {
            let bytes = sample_definition(revision)
                .to_bytes()
                .expect("sample definition serializes");
            chain.append(bytes);
        }
        chain
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A small but fully populated definition, varied by revision number.
pub fn sample_definition(revision: u32) -> BotDefinition {
    BotDefinition::new(
        "MyChatbot",
        format!("A decentralized chatbot, rev {}", revision),
    )
    .with_intent(Intent::new(
        "greeting",
        "Greeting intent",
        vec!["hello".into(), "hi".into()],
    ))
    .with_intent(Intent::new(
        "goodbye",
        "Goodbye intent",
        vec!["bye".into(), "see you later".into()],
    ))
    .with_response(Response::new(
        "Hello! How can I assist you today?",
        "greeting",
    ))
    .with_response(Response::new(
        "Goodbye! It was nice chatting with you.",
        "goodbye",
    ))
}
