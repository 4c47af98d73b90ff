//! Post metadata: parse, allow-list filter and re-serialization.

use serde_yaml::{Mapping, Value};
use thiserror::Error;

/// Metadata keys kept in the cleaned header, everything else is export noise.
pub const ALLOWED_KEYS: [&str; 11] = [
    "title",
    "date",
    "status",
    "permalink",
    "author",
    "excerpt",
    "type",
    "id",
    "category",
    "tag",
    "layout",
];

/// Layout assigned to posts that do not name one.
pub const DEFAULT_LAYOUT: &str = "post";

/// Why a metadata block could not be read.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("invalid YAML: {0}")]
    Syntax(#[from] serde_yaml::Error),

    #[error("expected a key/value mapping, found a {0}")]
    NotAMapping(&'static str),
}

/// The `date` entry of a metadata block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateField {
    /// Key absent or explicitly null
    Missing,
    /// Scalar value rendered as text
    Text(String),
    /// Sequence or mapping, never a date
    Unusable,
}

/// Ordered metadata mapping of one post.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    fields: Mapping,
}

impl Metadata {
    /// Parse the content of a metadata block.
    ///
    /// An empty block is an empty mapping; any other non-mapping document
    /// is rejected.
    pub fn parse(block: &str) -> Result<Self, MetadataError> {
        let fields = match serde_yaml::from_str::<Value>(block)? {
            Value::Mapping(fields) => fields,
            Value::Null => Mapping::new(),
            other => return Err(MetadataError::NotAMapping(kind_of(&other))),
        };
        Ok(Self { fields })
    }

    /// Keep only allow-listed keys and make sure `layout` is set.
    pub fn into_cleaned(self) -> Self {
        let mut fields: Mapping = self
            .fields
            .into_iter()
            .filter(|(key, _)| key.as_str().is_some_and(|k| ALLOWED_KEYS.contains(&k)))
            .collect();

        if !fields.contains_key("layout") {
            fields.insert("layout".into(), DEFAULT_LAYOUT.into());
        }

        Self { fields }
    }

    #[allow(dead_code)] // Used in tests
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    #[allow(dead_code)] // Used in tests
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().filter_map(Value::as_str)
    }

    #[allow(dead_code)] // Used in tests
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// The `date` field as text, when it has a scalar shape.
    pub fn date(&self) -> DateField {
        match self.fields.get("date") {
            None | Some(Value::Null) => DateField::Missing,
            Some(Value::String(s)) => DateField::Text(s.clone()),
            Some(Value::Number(n)) => DateField::Text(n.to_string()),
            Some(Value::Bool(b)) => DateField::Text(b.to_string()),
            Some(Value::Tagged(tagged)) => match &tagged.value {
                Value::String(s) => DateField::Text(s.clone()),
                _ => DateField::Unusable,
            },
            Some(Value::Sequence(_) | Value::Mapping(_)) => DateField::Unusable,
        }
    }

    /// Render as a `---` delimited header followed by a blank line.
    pub fn to_header(&self) -> Result<String, serde_yaml::Error> {
        let yaml = serde_yaml::to_string(&self.fields)?;
        let yaml = yaml.strip_prefix("---\n").unwrap_or(&yaml);
        Ok(format!("---\n{yaml}---\n\n"))
    }

    /// Header used for posts that carry no metadata at all.
    pub fn default_header() -> String {
        format!("---\nlayout: {DEFAULT_LAYOUT}\n---\n\n")
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
