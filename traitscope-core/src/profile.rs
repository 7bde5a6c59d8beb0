// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Profile tree as returned by the personality-analysis service.
//!
//! The service answers with an envelope ([`ProfileDocument`]) around a rooted,
//! ordered tree of [`ProfileNode`]s. Documents are validated once, when they
//! cross into the process, so the transformations downstream can rely on
//! percentages being in range and ids being unique.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised while parsing or validating a profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Malformed profile JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid profile node '{node}': {reason}")]
    Invalid { node: String, reason: String },
}

/// A node in the trait hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileNode {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Score in `[0, 1]`. Absent on purely structural nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling_error: Option<f64>,

    /// `None` and `Some(vec![])` are different: the latter still counts as
    /// "has children" for display classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ProfileNode>>,
}

impl ProfileNode {
    /// Structural node with no score and no children field.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: None,
            percentage: None,
            sampling_error: None,
            children: None,
        }
    }

    pub fn with_percentage(mut self, percentage: f64) -> Self {
        self.percentage = Some(percentage);
        self
    }

    pub fn with_children(mut self, children: Vec<ProfileNode>) -> Self {
        self.children = Some(children);
        self
    }

    /// Child slice, empty when the field is absent.
    pub fn children(&self) -> &[ProfileNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Whether the children field is present, regardless of its length.
    pub fn has_children_field(&self) -> bool {
        self.children.is_some()
    }
}

/// Envelope around the profile tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDocument {
    #[serde(default = "default_marker")]
    pub id: String,

    #[serde(default = "default_marker")]
    pub source: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u64>,

    /// Warning the service attaches when the input was short.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_lang: Option<String>,

    pub tree: ProfileNode,
}

fn default_marker() -> String {
    "*".to_string()
}

impl ProfileDocument {
    /// Wrap a bare tree in an envelope with default metadata.
    pub fn from_tree(tree: ProfileNode) -> Self {
        Self {
            id: default_marker(),
            source: default_marker(),
            word_count: None,
            word_count_message: None,
            processed_lang: None,
            tree,
        }
    }

    /// Parse and validate a profile.
    ///
    /// Accepts either the full envelope (an object with a `tree` field) or a
    /// bare root node.
    pub fn from_json(raw: &str) -> Result<Self, ProfileError> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, ProfileError> {
        let document = if value.get("tree").is_some() {
            serde_json::from_value::<ProfileDocument>(value)?
        } else {
            Self::from_tree(serde_json::from_value::<ProfileNode>(value)?)
        };
        document.validate()?;
        Ok(document)
    }

    /// Top-level traits: the children of the root. The root is never shown.
    pub fn top_level(&self) -> &[ProfileNode] {
        self.tree.children()
    }

    /// Check percentages, ids and id uniqueness across the whole tree.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&ProfileNode> = vec![&self.tree];

        while let Some(node) = stack.pop() {
            if node.id.is_empty() {
                return Err(ProfileError::Invalid {
                    node: node.name.clone(),
                    reason: "empty id".to_string(),
                });
            }
            if !seen.insert(node.id.as_str()) {
                return Err(ProfileError::Invalid {
                    node: node.id.clone(),
                    reason: "duplicate id".to_string(),
                });
            }
            if let Some(p) = node.percentage {
                if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                    return Err(ProfileError::Invalid {
                        node: node.id.clone(),
                        reason: format!("percentage {} outside [0, 1]", p),
                    });
                }
            }
            // Reversed so nodes pop in document order.
            stack.extend(node.children().iter().rev());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENVELOPE: &str = r#"{
        "id": "*",
        "source": "*",
        "word_count": 142,
        "word_count_message": "There were 142 words in the input.",
        "processed_lang": "en",
        "tree": {
            "id": "r",
            "name": "root",
            "children": [
                {
                    "id": "personality",
                    "name": "Big 5",
                    "children": [
                        {
                            "id": "Openness_parent",
                            "name": "Openness",
                            "category": "personality",
                            "percentage": 0.81,
                            "children": [
                                {
                                    "id": "Openness",
                                    "name": "Openness",
                                    "category": "personality",
                                    "percentage": 0.81,
                                    "sampling_error": 0.05,
                                    "children": [
                                        { "id": "Adventurousness", "name": "Adventurousness", "percentage": 0.72 }
                                    ]
                                }
                            ]
                        }
                    ]
                }
            ]
        }
    }"#;

    #[test]
    fn test_parse_envelope() {
        let doc = ProfileDocument::from_json(ENVELOPE).unwrap();
        assert_eq!(doc.word_count, Some(142));
        assert_eq!(doc.processed_lang.as_deref(), Some("en"));
        assert_eq!(doc.top_level().len(), 1);
        assert_eq!(doc.top_level()[0].id, "personality");
        assert!(doc.top_level()[0].percentage.is_none());
    }

    #[test]
    fn test_parse_bare_tree() {
        let raw = r#"{"id":"r","name":"root","children":[{"id":"needs","name":"Needs"}]}"#;
        let doc = ProfileDocument::from_json(raw).unwrap();
        assert_eq!(doc.id, "*");
        assert_eq!(doc.top_level()[0].id, "needs");
    }

    #[test]
    fn test_absent_and_empty_children_differ() {
        let raw = r#"{"id":"r","children":[{"id":"a","children":[]},{"id":"b"}]}"#;
        let doc = ProfileDocument::from_json(raw).unwrap();
        assert!(doc.top_level()[0].has_children_field());
        assert!(!doc.top_level()[1].has_children_field());
    }

    #[test]
    fn test_rejects_out_of_range_percentage() {
        let raw = r#"{"id":"r","children":[{"id":"a","percentage":1.5}]}"#;
        match ProfileDocument::from_json(raw) {
            Err(ProfileError::Invalid { node, .. }) => assert_eq!(node, "a"),
            other => panic!("expected invalid node, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let raw = r#"{"id":"r","children":[{"id":"a"},{"id":"x","children":[{"id":"a"}]}]}"#;
        assert!(matches!(
            ProfileDocument::from_json(raw),
            Err(ProfileError::Invalid { .. })
        ));
    }

    #[test]
    fn test_rejects_missing_id() {
        let raw = r#"{"id":"r","children":[{"name":"nameless"}]}"#;
        assert!(matches!(
            ProfileDocument::from_json(raw),
            Err(ProfileError::Json(_))
        ));
    }

    #[test]
    fn test_serialization_omits_absent_fields() {
        let node = ProfileNode::new("a", "A");
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(json, r#"{"id":"a","name":"A"}"#);
    }
}
