//! Proptest generators for property-based testing.

use proptest::prelude::*;

use botledger_core::{Blake3Hash, Chain, Record};
use botledger_definition::{BotDefinition, Intent, Response};

/// Generate a random Blake3Hash.
pub fn blake3_hash() -> impl Strategy<Value = Blake3Hash> {
    any::<[u8; 32]>().prop_map(Blake3Hash::from_bytes)
}

/// Generate payload bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate an intent or response name.
pub fn short_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,31}".prop_map(String::from)
}

/// Generate an Intent.
pub fn intent() -> impl Strategy<Value = Intent> {
    (
        short_name(),
        ".{0,64}",
        prop::collection::vec(".{1,32}", 0..=4),
    )
        .prop_map(|(name, description, examples)| Intent::new(name, description, examples))
}

/// Generate a Response.
pub fn response() -> impl Strategy<Value = Response> {
    (".{1,64}", short_name()).prop_map(|(text, kind)| Response::new(text, kind))
}

/// Generate a BotDefinition.
pub fn definition() -> impl Strategy<Value = BotDefinition> {
    (
        short_name(),
        ".{0,64}",
        prop::collection::vec(intent(), 0..=4),
        prop::collection::vec(response(), 0..=4),
    )
        .prop_map(|(name, description, intents, responses)| {
            let mut definition = BotDefinition::new(name, description);
            for intent in intents {
                definition = definition.with_intent(intent);
            }
            for response in responses {
                definition = definition.with_response(response);
            }
            definition
        })
}

/// Parameters for deriving one record.
#[derive(Debug, Clone)]
pub struct RecordParams {
    pub position: u64,
    pub payload: Vec<u8>,
    pub previous_hash: Blake3Hash,
}

impl Arbitrary for RecordParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (0u64..=1000u64, payload(1000), any::<[u8; 32]>())
            .prop_map(|(position, payload, prev)| RecordParams {
                position,
                payload,
                previous_hash: Blake3Hash::from_bytes(prev),
            })
            .boxed()
    }
}

/// Derive a record from parameters.
pub fn record_from_params(params: &RecordParams) -> Record {
    Record::derive(params.position, params.payload.clone(), params.previous_hash)
}

/// Build a chain by appending each payload in order.
pub fn chain_from_payloads(payloads: &[Vec<u8>]) -> Chain {
    let mut chain = Chain::new();
    for payload in payloads {
        chain.append(payload.clone());
    }
    chain
}
