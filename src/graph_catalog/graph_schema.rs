//! Graph schema definitions: node and edge types with their key attributes.
//!
//! The schema is the single source of truth for label resolution. Node and
//! edge labels live in one namespace and must be unique; every type carries
//! at least one key, and the first key acts as the default (primary) key.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::errors::SchemaError;
use super::relational_schema::ColumnType;

/// A node type: label plus the ordered list of key attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeType {
    pub label: String,
    pub keys: Vec<String>,
    /// Optional per-key column types; keys not listed default to `int`.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub types: HashMap<String, ColumnType>,
}

impl NodeType {
    pub fn new(label: impl Into<String>, keys: Vec<String>) -> Self {
        NodeType {
            label: label.into(),
            keys,
            types: HashMap::new(),
        }
    }

    /// The default key is the first declared key.
    pub fn default_key(&self) -> &str {
        &self.keys[0]
    }
}

/// A directed edge type between two node labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeType {
    pub label: String,
    pub src: String,
    pub tgt: String,
    pub keys: Vec<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub types: HashMap<String, ColumnType>,
}

impl EdgeType {
    pub fn new(
        label: impl Into<String>,
        src: impl Into<String>,
        tgt: impl Into<String>,
        keys: Vec<String>,
    ) -> Self {
        EdgeType {
            label: label.into(),
            src: src.into(),
            tgt: tgt.into(),
            keys,
            types: HashMap::new(),
        }
    }

    pub fn default_key(&self) -> &str {
        &self.keys[0]
    }
}

/// The full graph schema. Insertion order of nodes and edges is preserved
/// so that schema induction is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSchema {
    #[serde(default)]
    pub nodes: Vec<NodeType>,
    #[serde(default)]
    pub edges: Vec<EdgeType>,
}

fn is_valid_label(label: &str) -> bool {
    let mut chars = label.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl GraphSchema {
    pub fn new() -> Self {
        GraphSchema::default()
    }

    /// Parse a schema from its JSON representation and validate it.
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        let schema: GraphSchema =
            serde_json::from_str(text).map_err(|e| SchemaError::Parse {
                message: e.to_string(),
            })?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn add_node(&mut self, node: NodeType) -> Result<(), SchemaError> {
        if self.label_exists(&node.label) {
            return Err(SchemaError::DuplicateLabel { label: node.label });
        }
        self.nodes.push(node);
        Ok(())
    }

    pub fn add_edge(&mut self, edge: EdgeType) -> Result<(), SchemaError> {
        if self.label_exists(&edge.label) {
            return Err(SchemaError::DuplicateLabel { label: edge.label });
        }
        for endpoint in [&edge.src, &edge.tgt] {
            if self.node(endpoint).is_none() {
                return Err(SchemaError::MissingNodeLabel {
                    edge: edge.label.clone(),
                    label: endpoint.clone(),
                });
            }
        }
        self.edges.push(edge);
        Ok(())
    }

    pub fn node(&self, label: &str) -> Option<&NodeType> {
        self.nodes.iter().find(|n| n.label == label)
    }

    pub fn edge(&self, label: &str) -> Option<&EdgeType> {
        self.edges.iter().find(|e| e.label == label)
    }

    fn label_exists(&self, label: &str) -> bool {
        self.node(label).is_some() || self.edge(label).is_some()
    }

    /// Check all schema invariants: label syntax, uniqueness across the
    /// shared node/edge namespace, endpoint resolution, and non-empty keys.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen: Vec<&str> = Vec::new();
        for (label, keys) in self
            .nodes
            .iter()
            .map(|n| (&n.label, &n.keys))
            .chain(self.edges.iter().map(|e| (&e.label, &e.keys)))
        {
            if !is_valid_label(label) {
                return Err(SchemaError::InvalidLabel {
                    label: label.clone(),
                });
            }
            if seen.contains(&label.as_str()) {
                return Err(SchemaError::DuplicateLabel {
                    label: label.clone(),
                });
            }
            seen.push(label);
            if keys.is_empty() {
                return Err(SchemaError::NoKeys {
                    label: label.clone(),
                });
            }
        }
        for edge in &self.edges {
            for endpoint in [&edge.src, &edge.tgt] {
                if self.node(endpoint).is_none() {
                    return Err(SchemaError::MissingNodeLabel {
                        edge: edge.label.clone(),
                        label: endpoint.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
