//! Chatbot definition payloads.
//!
//! A definition is the structured document the ledger versions: a bot name
//! and description, the intents it recognizes, and the responses it can
//! produce. The ledger itself never interprets these; this crate is the
//! collaborator that turns them into bytes and back.

use serde::{Deserialize, Serialize};

use crate::error::DefinitionError;

/// A complete chatbot definition.
///
/// One serialized `BotDefinition` is one ledger payload; successive edits
/// become successive records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotDefinition {
    /// Display name of the bot.
    pub name: String,

    /// Human-readable description.
    pub description: String,

    /// Intents the bot recognizes.
    pub intents: Vec<Intent>,

    /// Responses the bot can produce.
    pub responses: Vec<Response>,
}

/// A recognizable user intent with example phrases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    /// Intent identifier, e.g. "greeting".
    pub name: String,

    /// What the intent covers.
    pub description: String,

    /// Example utterances that trigger this intent.
    pub examples: Vec<String>,
}

/// A canned response, tagged with the intent kind it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// The response text.
    pub text: String,

    /// Which kind of intent this response answers. Serialized as "type".
    #[serde(rename = "type")]
    pub kind: String,
}

impl BotDefinition {
    /// Start a definition with no intents or responses.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            intents: Vec::new(),
            responses: Vec::new(),
        }
    }

    /// Add an intent.
    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.intents.push(intent);
        self
    }

    /// Add a response.
    pub fn with_response(mut self, response: Response) -> Self {
        self.responses.push(response);
        self
    }

    /// Serialize to the UTF-8 JSON bytes stored as a ledger payload.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DefinitionError> {
        serde_json::to_vec(self).map_err(DefinitionError::Encode)
    }

    /// Deserialize from payload bytes.
    ///
    /// Decoding fails loudly: a missing or malformed required field is an
    /// error, never silently defaulted to an empty value. Corruption in
    /// stored payloads must surface, not masquerade as an empty string.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DefinitionError> {
        serde_json::from_slice(bytes).map_err(DefinitionError::Decode)
    }
}

impl Intent {
    /// Create an intent from its parts.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        examples: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            examples,
        }
    }
}

impl Response {
    /// Create a response from its parts.
    pub fn new(text: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: kind.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BotDefinition {
        BotDefinition::new("MyChatbot", "A decentralized chatbot")
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

    #[test]
    fn test_roundtrip() {
        let def = sample();
        let bytes = def.to_bytes().unwrap();
        let decoded = BotDefinition::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, def);
    }

    #[test]
    fn test_response_kind_serializes_as_type() {
        let def = sample();
        let json: serde_json::Value = serde_json::from_slice(&def.to_bytes().unwrap()).unwrap();
        assert_eq!(json["responses"][0]["type"], "greeting");
        assert!(json["responses"][0].get("kind").is_none());
    }

    #[test]
    fn test_missing_field_fails_loudly() {
        // No "description": must be an error, not an empty-string default.
        let bytes = br#"{"name":"Bot","intents":[],"responses":[]}"#;
        let result = BotDefinition::from_bytes(bytes);
        assert!(matches!(result, Err(DefinitionError::Decode(_))));
    }

    #[test]
    fn test_missing_nested_field_fails_loudly() {
        let bytes = br#"{
            "name": "Bot",
            "description": "d",
            "intents": [{"name": "greeting", "examples": []}],
            "responses": []
        }"#;
        assert!(BotDefinition::from_bytes(bytes).is_err());
    }

    #[test]
    fn test_malformed_json_fails() {
        assert!(BotDefinition::from_bytes(b"not json").is_err());
        assert!(BotDefinition::from_bytes(b"").is_err());
    }

    #[test]
    fn test_wrong_field_type_fails() {
        let bytes = br#"{"name":42,"description":"d","intents":[],"responses":[]}"#;
        assert!(BotDefinition::from_bytes(bytes).is_err());
    }

    #[test]
    fn test_empty_collections_are_valid() {
        let def = BotDefinition::new("Minimal", "No intents yet");
        let decoded = BotDefinition::from_bytes(&def.to_bytes().unwrap()).unwrap();
        assert!(decoded.intents.is_empty());
        assert!(decoded.responses.is_empty());
    }
}
