//! Request and response bodies of the image actions endpoints.

use digitalocean_core::types::Action;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Action type that converts an image to a snapshot.
pub const ACTION_CONVERT: &str = "convert";

/// Action type that transfers an image to another region.
pub const ACTION_TRANSFER: &str = "transfer";

/// Free-form body of an image action request.
///
/// The API accepts an object with a `type` key plus whatever parameters that
/// action type takes, e.g. `{"type": "transfer", "region": "nyc2"}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionRequest(Map<String, Value>);

impl ActionRequest {
    /// Create an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that moves an image to `region`.
    #[must_use]
    pub fn transfer(region: impl Into<String>) -> Self {
        let region: String = region.into();
        Self::new()
            .with("type", ACTION_TRANSFER)
            .with("region", region)
    }

    /// Request that converts an image to a snapshot.
    #[must_use]
    pub fn convert() -> Self {
        Self::new().with("type", ACTION_CONVERT)
    }

    /// Set `key`, replacing any previous value.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The `type` of the action, if set to a string.
    #[must_use]
    pub fn action_type(&self) -> Option<&str> {
        self.get("type").and_then(Value::as_str)
    }

    /// Whether no keys are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The request as a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for ActionRequest {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K, V> FromIterator<(K, V)> for ActionRequest
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Envelope wrapping a single action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEnvelope {
    /// The wrapped action.
    pub action: Action,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transfer_request_shape() {
        let request = ActionRequest::transfer("nyc2");
        assert_eq!(request.to_value(), json!({"type": "transfer", "region": "nyc2"}));
        assert_eq!(request.action_type(), Some(ACTION_TRANSFER));
    }

    #[test]
    fn convert_request_shape() {
        let request = ActionRequest::convert();
        assert_eq!(serde_json::to_string(&request).unwrap(), r#"{"type":"convert"}"#);
    }

    #[test]
    fn request_from_pairs_and_insert() {
        let mut request: ActionRequest = [("type", "transfer")].into_iter().collect();
        assert!(request.insert("region", "sfo3").is_none());
        assert_eq!(request.insert("region", "ams3"), Some(json!("sfo3")));
        assert_eq!(request.get("region"), Some(&json!("ams3")));
        assert!(!request.is_empty());
        assert!(ActionRequest::new().is_empty());
        assert_eq!(ActionRequest::new().action_type(), None);
    }

    #[test]
    fn envelope_decodes_action() {
        let envelope: ActionEnvelope = serde_json::from_value(json!({
            "action": {
                "id": 5,
                "status": "in-progress",
                "type": "transfer",
                "resource_id": 123,
                "resource_type": "image",
                "region_slug": "nyc3"
            }
        }))
        .unwrap();

        assert_eq!(envelope.action.id, 5);
        assert_eq!(envelope.action.resource_id, 123);
    }

    #[test]
    fn envelope_requires_action_key() {
        let result = serde_json::from_value::<ActionEnvelope>(json!({"droplet": {}}));
        assert!(result.is_err());
    }
}
