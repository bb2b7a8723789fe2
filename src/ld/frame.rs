// Copyright 2025 Fondazione LINKS

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::Error;

/// Indexes of the statements to reveal in a derived proof.
#[derive(Clone, Default, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct DisclosureFrame {
    revealed: BTreeSet<usize>,
}

impl DisclosureFrame {
    pub fn new(revealed: impl IntoIterator<Item = usize>) -> Self {
        Self {
            revealed: revealed.into_iter().collect(),
        }
    }

    /// Reveals every statement of a set of `count` statements.
    pub fn all(count: usize) -> Self {
        Self::new(0..count)
    }

    pub fn revealed_indexes(&self) -> Vec<usize> {
        self.revealed.iter().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.revealed.is_empty()
    }

    /// Splits `0..total` into `(revealed, hidden)`, both ascending.
    pub fn partition(&self, total: usize) -> Result<(Vec<usize>, Vec<usize>), Error> {
        if self.revealed.is_empty() {
            return Err(Error::FrameMismatch("the frame reveals no statement".to_owned()));
        }
        if let Some(out_of_bounds) = self.revealed.iter().find(|&&i| i >= total) {
            return Err(Error::FrameMismatch(format!(
                "index {} out of bounds for {} statements",
                out_of_bounds, total
            )));
        }

        let hidden = (0..total).filter(|i| !self.revealed.contains(i)).collect();
        Ok((self.revealed_indexes(), hidden))
    }
}

/// A JSON frame selecting the nodes and properties of a document to reveal.
///
/// * `type` in a frame must be matched by the node's types, otherwise the node is left out.
/// * A property whose frame value is an object is framed recursively; any other value
///   reveals the property as is.
/// * With `"@explicit": true` only the framed properties are kept. The flag is inherited by nested frames.
/// * Node identifiers and types are always kept.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevealFrame {
    frame: Value,
}

impl RevealFrame {
    pub fn new(frame: Value) -> Result<Self, Error> {
        if !frame.is_object() {
            return Err(Error::FrameMismatch("a reveal frame must be a JSON object".to_owned()));
        }
        Ok(Self { frame })
    }

    pub fn as_value(&self) -> &Value {
        &self.frame
    }

    /// Applies the frame to `document`, returning the revealed document.
    pub fn apply(&self, document: &Value) -> Result<Value, Error> {
        let (node, frame) = match (document.as_object(), self.frame.as_object()) {
            (Some(node), Some(frame)) => (node, frame),
            _ => return Err(Error::FrameMismatch("document and frame must be JSON objects".to_owned())),
        };

        let mut revealed = frame_node(node, frame, false)
            .ok_or_else(|| Error::FrameMismatch("the frame does not match the document".to_owned()))?;

        if let Some(context) = node.get("@context") {
            revealed.insert("@context".to_owned(), context.clone());
        }
        Ok(Value::Object(revealed))
    }
}

fn types_of(value: Option<&Value>) -> Vec<&str> {
    match value {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn node_types(node: &Map<String, Value>) -> Vec<&str> {
    let mut types = types_of(node.get("type"));
    types.extend(types_of(node.get("@type")));
    types
}

fn is_frame_keyword(key: &str) -> bool {
    matches!(key, "@context" | "@explicit" | "id" | "@id" | "type" | "@type")
}

fn frame_node(node: &Map<String, Value>, frame: &Map<String, Value>, inherited_explicit: bool) -> Option<Map<String, Value>> {
    let explicit = frame.get("@explicit").and_then(Value::as_bool).unwrap_or(inherited_explicit);

    let required = {
        let mut required = types_of(frame.get("type"));
        required.extend(types_of(frame.get("@type")));
        required
    };
    let present = node_types(node);
    if !required.iter().all(|t| present.contains(t)) {
        return None;
    }

    let mut output = Map::new();
    for key in ["id", "@id", "type", "@type"] {
        if let Some(value) = node.get(key) {
            output.insert(key.to_owned(), value.clone());
        }
    }

    for (key, framed) in frame.iter().filter(|(k, _)| !is_frame_keyword(k)) {
        let Some(value) = node.get(key) else {
            continue;
        };

        match framed {
            Value::Object(sub_frame) => {
                if let Some(framed_value) = frame_value(value, sub_frame, explicit) {
                    output.insert(key.clone(), framed_value);
                }
            }
            _ => {
                output.insert(key.clone(), value.clone());
            }
        }
    }

    if !explicit {
        for (key, value) in node.iter().filter(|(k, _)| !is_frame_keyword(k) && !frame.contains_key(k.as_str())) {
            output.insert(key.clone(), value.clone());
        }
    }

    Some(output)
}

fn frame_value(value: &Value, frame: &Map<String, Value>, explicit: bool) -> Option<Value> {
    match value {
        Value::Object(node) if !node.contains_key("@value") => frame_node(node, frame, explicit).map(Value::Object),
        Value::Array(items) => {
            let framed: Vec<Value> = items.iter().filter_map(|item| frame_value(item, frame, explicit)).collect();
            if framed.is_empty() {
                None
            } else {
                Some(Value::Array(framed))
            }
        }
        other => Some(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{DisclosureFrame, RevealFrame};
    use crate::errors::Error;

    #[test]
    fn partition_splits_indexes() {
        let frame = DisclosureFrame::new([3, 0, 3]);
        assert_eq!(frame.partition(5).unwrap(), (vec![0, 3], vec![1, 2, 4]));
    }

    #[test]
    fn partition_rejects_empty_and_out_of_bounds() {
        assert!(matches!(DisclosureFrame::default().partition(3), Err(Error::FrameMismatch(_))));
        assert!(matches!(DisclosureFrame::new([3]).partition(3), Err(Error::FrameMismatch(_))));
    }

    #[test]
    fn explicit_frame_keeps_only_framed_properties() {
        let document = json!({
            "@context": "https://example.org/ctx",
            "id": "urn:doc",
            "type": ["Credential"],
            "issuer": "did:example:issuer",
            "subject": {
                "id": "urn:bnid:_:c14n0",
                "type": "Person",
                "givenName": "Alice",
                "familyName": "Smith"
            }
        });
        let frame = RevealFrame::new(json!({
            "type": ["Credential"],
            "@explicit": true,
            "issuer": {},
            "subject": {"type": "Person", "givenName": {}}
        }))
        .unwrap();

        let revealed = frame.apply(&document).unwrap();
        assert_eq!(
            revealed,
            json!({
                "@context": "https://example.org/ctx",
                "id": "urn:doc",
                "type": ["Credential"],
                "issuer": "did:example:issuer",
                "subject": {"id": "urn:bnid:_:c14n0", "type": "Person", "givenName": "Alice"}
            })
        );
    }

    #[test]
    fn implicit_frame_keeps_everything_that_matches() {
        let document = json!({"id": "urn:doc", "type": "Credential", "a": 1, "b": {"c": 2}});
        let frame = RevealFrame::new(json!({"type": "Credential"})).unwrap();
        assert_eq!(frame.apply(&document).unwrap(), document);
    }

    #[test]
    fn type_mismatch_is_reported() {
        let document = json!({"id": "urn:doc", "type": "Credential"});
        let frame = RevealFrame::new(json!({"type": "Passport"})).unwrap();
        assert!(matches!(frame.apply(&document), Err(Error::FrameMismatch(_))));
    }
}
