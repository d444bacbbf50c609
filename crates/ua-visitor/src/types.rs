//! Hit types and wire encoding.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A flat mapping of parameter codes to scalar values.
pub type Params = BTreeMap<String, Value>;

/// Kind of hit sent to the collection endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitType {
    Pageview,
    Event,
    Transaction,
    Item,
}

impl HitType {
    /// The value sent as the `t` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            HitType::Pageview => "pageview",
            HitType::Event => "event",
            HitType::Transaction => "transaction",
            HitType::Item => "item",
        }
    }
}

impl fmt::Display for HitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved, stamped hit waiting in the queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    #[serde(rename = "type")]
    kind: HitType,
    params: Params,
}

impl Hit {
    pub(crate) fn new(kind: HitType, params: Params) -> Self {
        Self { kind, params }
    }

    /// The kind this hit was recorded as.
    pub fn kind(&self) -> HitType {
        self.kind
    }

    /// All parameters, including the protocol stamps.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Look up a single parameter.
    pub fn get(&self, code: &str) -> Option<&Value> {
        self.params.get(code)
    }

    /// Encode the parameters as `application/x-www-form-urlencoded`.
    pub fn to_query(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (code, value) in &self.params {
            serializer.append_pair(code, &scalar_string(value));
        }
        serializer.finish()
    }
}

/// Render a parameter value the way it appears on the wire.
pub(crate) fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Raw response handed back by a [`Transport`](crate::Transport).
#[derive(Debug, Clone, Default)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
    pub headers: HashMap<String, String>,
}

impl TransportResponse {
    /// Any status below 300 counts as delivered.
    pub fn is_success(&self) -> bool {
        self.status < 300
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hit_type_wire_names() {
        assert_eq!(HitType::Pageview.as_str(), "pageview");
        assert_eq!(HitType::Item.to_string(), "item");
        assert_eq!(serde_json::to_value(HitType::Transaction).unwrap(), "transaction");
    }

    #[test]
    fn test_query_encodes_every_param() {
        let hit = Hit::new(
            HitType::Event,
            Params::from([
                ("ec".to_string(), json!("video player")),
                ("ev".to_string(), json!(42)),
                ("p".to_string(), json!("/a&b")),
            ]),
        );

        assert_eq!(hit.to_query(), "ec=video+player&ev=42&p=%2Fa%26b");
    }

    #[test]
    fn test_scalar_rendering() {
        assert_eq!(scalar_string(&json!("x")), "x");
        assert_eq!(scalar_string(&json!(1.5)), "1.5");
        assert_eq!(scalar_string(&json!(true)), "true");
    }

    #[test]
    fn test_response_success_threshold() {
        let ok = TransportResponse { status: 204, ..Default::default() };
        let redirect = TransportResponse { status: 302, ..Default::default() };
        assert!(ok.is_success());
        assert!(!redirect.is_success());
    }
}
