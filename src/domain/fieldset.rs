//! Attribute metadata: which kind of field edits which attribute key.
//!
//! Static configuration consumed by the editing UI. Keys without an entry
//! are edited as plain text.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A dropdown entry, either a bare value or a value with display text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Choice {
    Plain(String),
    Labeled { value: String, text: String },
}

impl Choice {
    pub fn value(&self) -> &str {
        match self {
            Choice::Plain(v) => v,
            Choice::Labeled { value, .. } => value,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Choice::Plain(v) => v,
            Choice::Labeled { text, .. } => text,
        }
    }
}

/// Field kind plus its field-specific settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    TextField,
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<f64>,
    },
    Color,
    Dropdown { choices: Vec<Choice> },
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::TextField => write!(f, "text"),
            FieldKind::Number { min, max, .. } => {
                write!(f, "number")?;
                match (min, max) {
                    (Some(lo), Some(hi)) => write!(f, " [{}, {}]", lo, hi),
                    (Some(lo), None) => write!(f, " [{}, ..)", lo),
                    (None, Some(hi)) => write!(f, " (.., {}]", hi),
                    (None, None) => Ok(()),
                }
            }
            FieldKind::Color => write!(f, "color"),
            FieldKind::Dropdown { choices } => {
                let values: Vec<&str> = choices.iter().map(Choice::value).collect();
                write!(f, "dropdown ({})", values.join(" | "))
            }
        }
    }
}

static TEXT_FIELD: FieldKind = FieldKind::TextField;

/// Lookup table from attribute key to [`FieldKind`].
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeFieldset {
    fields: BTreeMap<String, FieldKind>,
}

impl Default for AttributeFieldset {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AttributeFieldset {
    pub fn empty() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Fields for the attributes the page builder knows out of the box.
    pub fn builtin() -> Self {
        let dropdown = |values: &[&str]| FieldKind::Dropdown {
            choices: values.iter().map(|v| Choice::Plain(v.to_string())).collect(),
        };
        let length = FieldKind::Number {
            min: Some(0.0),
            max: None,
            step: Some(1.0),
        };

        let mut fields = BTreeMap::new();
        fields.insert("text".to_string(), FieldKind::TextField);
        fields.insert("src".to_string(), FieldKind::TextField);
        fields.insert("color".to_string(), FieldKind::Color);
        fields.insert("backgroundColor".to_string(), FieldKind::Color);
        fields.insert("borderColor".to_string(), FieldKind::Color);
        fields.insert("fontSize".to_string(), length.clone());
        fields.insert("padding".to_string(), length.clone());
        fields.insert("margin".to_string(), length.clone());
        fields.insert("width".to_string(), length.clone());
        fields.insert("height".to_string(), length);
        fields.insert(
            "opacity".to_string(),
            FieldKind::Number {
                min: Some(0.0),
                max: Some(1.0),
                step: Some(0.05),
            },
        );
        fields.insert("textAlign".to_string(), dropdown(&["left", "center", "right"]));
        fields.insert("flexDirection".to_string(), dropdown(&["row", "column"]));
        fields.insert(
            "display".to_string(),
            dropdown(&["block", "flex", "inline-block", "none"]),
        );
        fields.insert(
            "fontWeight".to_string(),
            FieldKind::Dropdown {
                choices: vec![
                    Choice::Labeled {
                        value: "400".into(),
                        text: "normal".into(),
                    },
                    Choice::Labeled {
                        value: "700".into(),
                        text: "bold".into(),
                    },
                ],
            },
        );
        Self { fields }
    }

    /// Field for `key`, falling back to a text field.
    pub fn field_for(&self, key: &str) -> &FieldKind {
        self.fields.get(key).unwrap_or(&TEXT_FIELD)
    }

    pub fn get(&self, key: &str) -> Option<&FieldKind> {
        self.fields.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, field: FieldKind) -> Option<FieldKind> {
        self.fields.insert(key.into(), field)
    }

    /// Apply overrides on top of this table; overrides win per key.
    pub fn extend(&mut self, overrides: &BTreeMap<String, FieldKind>) {
        for (key, field) in overrides {
            self.fields.insert(key.clone(), field.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldKind)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
