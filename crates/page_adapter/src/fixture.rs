use std::{collections::BTreeMap, fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};

const DEFAULT_DOCUMENT_URL: &str = "http://localhost/";

fn default_document_url() -> String {
    DEFAULT_DOCUMENT_URL.to_string()
}

/// Serialized page: the document URL and its node tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageFixture {
    #[serde(default = "default_document_url")]
    pub url: String,
    #[serde(default)]
    pub scroll_y: f64,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

impl Default for PageFixture {
    fn default() -> Self {
        Self {
            url: default_document_url(),
            scroll_y: 0.0,
            nodes: Vec::new(),
        }
    }
}

impl PageFixture {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).context("malformed page fixture")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read page fixture '{}'", path.display()))?;
        Self::from_json(&raw)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub offset_top: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            text: String::new(),
            value: String::new(),
            disabled: false,
            offset_top: 0.0,
            children: Vec::new(),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn offset_top(mut self, offset_top: f64) -> Self {
        self.offset_top = offset_top;
        self
    }

    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }
}
