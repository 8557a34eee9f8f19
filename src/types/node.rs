//! Input node types for the layout engine.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque identifier of a causal node.
///
/// Uniqueness within one input collection is assumed, not validated.
/// Implements `Ord` (code-point order) for deterministic ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a new NodeId.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Domain classification assigned by the content store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Top-level cause of a narrative.
    Root,
    /// Intermediate event.
    Event,
    /// Consequence of an event.
    Impact,
    /// Tradable instrument.
    Ticker,
    /// Any kind the store sends that this crate does not know.
    #[serde(other)]
    Unknown,
}

impl NodeKind {
    /// Parse node kind from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "root" => Some(Self::Root),
            "event" => Some(Self::Event),
            "impact" => Some(Self::Impact),
            "ticker" => Some(Self::Ticker),
            _ => None,
        }
    }
}

impl Default for NodeKind {
    fn default() -> Self {
        Self::Event
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::Event => write!(f, "event"),
            Self::Impact => write!(f, "impact"),
            Self::Ticker => write!(f, "ticker"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A node of a causal narrative, as supplied by the content store.
///
/// Field names follow the store's rows; `type` and `parentId` are accepted
/// as aliases so renderer-shaped payloads deserialize as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CausalNode {
    /// Unique node identifier.
    pub id: NodeId,
    /// Free-text description.
    pub label: String,
    /// Domain classification.
    #[serde(alias = "type", default)]
    pub kind: NodeKind,
    /// Parent reference. May dangle.
    #[serde(
        alias = "parentId",
        default,
        deserialize_with = "deserialize_parent",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<NodeId>,
}

impl CausalNode {
    /// Create a top-level node.
    pub fn new(id: impl Into<NodeId>, label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            parent_id: None,
        }
    }

    /// Set the parent reference. An empty id clears it.
    pub fn with_parent(mut self, parent_id: impl Into<NodeId>) -> Self {
        let parent_id = parent_id.into();
        self.parent_id = if parent_id.as_str().is_empty() { None } else { Some(parent_id) };
        self
    }

    /// Parent id, ignoring empty references.
    pub fn parent(&self) -> Option<&NodeId> {
        self.parent_id.as_ref().filter(|p| !p.as_str().is_empty())
    }
}

/// The store writes `""` for cleared parents; treat it as no parent.
fn deserialize_parent<'de, D>(deserializer: D) -> Result<Option<NodeId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(NodeId::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_deserializes_unknown() {
        let node: CausalNode =
            serde_json::from_str(r#"{"id":"a","label":"x","type":"catalyst"}"#).unwrap();
        assert_eq!(node.kind, NodeKind::Unknown);
        assert!(node.parent_id.is_none());
    }

    #[test]
    fn test_parent_aliases_and_empty() {
        let node: CausalNode =
            serde_json::from_str(r#"{"id":"b","label":"x","kind":"impact","parentId":"a"}"#).unwrap();
        assert_eq!(node.parent(), Some(&NodeId::from("a")));

        let node: CausalNode =
            serde_json::from_str(r#"{"id":"b","label":"x","kind":"event","parent_id":""}"#).unwrap();
        assert!(node.parent().is_none());

        let node: CausalNode =
            serde_json::from_str(r#"{"id":"b","label":"x","kind":"event","parent_id":null}"#).unwrap();
        assert!(node.parent().is_none());
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!(NodeKind::from_str("Ticker"), Some(NodeKind::Ticker));
        assert_eq!(NodeKind::from_str("ROOT"), Some(NodeKind::Root));
        assert_eq!(NodeKind::from_str("catalyst"), None);
    }

    #[test]
    fn test_with_parent_empty_clears() {
        let node = CausalNode::new("a", "A", NodeKind::Root).with_parent("");
        assert!(node.parent_id.is_none());
    }
}
