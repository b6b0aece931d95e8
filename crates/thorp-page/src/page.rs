use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute a page element carries once its card has been counted.
pub const COUNTED_MARKER: &str = "data-card-counted";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    #[default]
    Element,
    Text,
}

/// One node added to the document.
///
/// `key` identifies the underlying element across mutation batches; nodes
/// without a key are treated as new elements every time they appear.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub node_type: NodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    pub text: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl PageNode {
    pub fn element(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn is_marked_counted(&self) -> bool {
        self.attributes.contains_key(COUNTED_MARKER)
    }

    pub fn class_lower(&self) -> String {
        self.class_name
            .as_deref()
            .unwrap_or_default()
            .to_lowercase()
    }
}

/// Page content visible when the document finished loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLoad {
    pub url: String,
    pub title: String,
    pub body: String,
    pub nodes: Vec<PageNode>,
}

/// One line of the page feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageEvent {
    Load(PageLoad),
    Mutations {
        #[serde(default)]
        added: Vec<PageNode>,
    },
}

impl PageEvent {
    pub fn from_json(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}
