//! Domain entities: component types, attribute values and variant specs

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::arena::NodeId;

/// Closed set of component kinds. Fixed on the root masters and inherited
/// unchanged by every variant derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentType {
    Container,
    Header,
    Paragraph,
    Image,
}

impl ComponentType {
    pub const ALL: [ComponentType; 4] = [
        ComponentType::Container,
        ComponentType::Paragraph,
        ComponentType::Header,
        ComponentType::Image,
    ];

    /// Name of the root master carrying this type.
    pub fn master_name(self) -> &'static str {
        match self {
            ComponentType::Container => "container",
            ComponentType::Paragraph => "text",
            ComponentType::Header => "header",
            ComponentType::Image => "image",
        }
    }

    /// Inverse of [`ComponentType::master_name`].
    pub fn from_master_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.master_name() == name)
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComponentType::Container => "CONTAINER",
            ComponentType::Header => "HEADER",
            ComponentType::Paragraph => "PARAGRAPH",
            ComponentType::Image => "IMAGE",
        };
        write!(f, "{}", s)
    }
}

/// A single attribute value as written by the editing UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Flag(b) => write!(f, "{}", b),
            // whole numbers print without a trailing ".0"
            AttrValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            AttrValue::Number(n) => write!(f, "{}", n),
            AttrValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Number(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Number(value as f64)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Flag(value)
    }
}

/// Attribute key to value. On a node this holds only its local overrides.
pub type Attributes = BTreeMap<String, AttrValue>;

/// Optional input to [`crate::domain::ComponentArena::create_variant`].
///
/// `VariantSpec::default()` means "no spec": empty local attributes and
/// children mirrored from the source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantSpec {
    /// Local overrides for the new variant. Taken by value, so the caller's
    /// map can never alias the variant's.
    pub attributes: Option<Attributes>,
    /// Existing detached nodes to adopt as children, in order. `None`
    /// mirrors the source's children instead.
    pub children: Option<Vec<NodeId>>,
}

impl VariantSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes
            .get_or_insert_with(Attributes::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<NodeId>) -> Self {
        self.children = Some(children);
        self
    }
}

/// Resolved attributes split the way the renderer consumes them:
/// element properties (text content, image source) and style.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderProps {
    pub html: Attributes,
    pub style: Attributes,
}

impl RenderProps {
    /// Route every key listed in `html_keys` to `html`, the rest to `style`.
    pub fn split<S: AsRef<str>>(attributes: Attributes, html_keys: &[S]) -> Self {
        let mut props = RenderProps::default();
        for (key, value) in attributes {
            if html_keys.iter().any(|k| k.as_ref() == key) {
                props.html.insert(key, value);
            } else {
                props.style.insert(key, value);
            }
        }
        props
    }
}
