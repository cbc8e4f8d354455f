//! Front matter codec: a `---` fenced YAML block followed by a Markdown body.

use crate::AppError;
use serde::{Serialize, Serializer};
use serde_yaml::{Mapping, Value};

const FENCE: &str = "---";

/// Ordered front matter mapping.
///
/// Keys keep their document order; inserting an existing key replaces the
/// value in place, new keys are appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter(Mapping);

impl FrontMatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Read a scalar value as text.
    ///
    /// # Returns
    /// `None` for missing keys, `null`, and non-scalar values.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(scalar_to_string)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(Value::String(key.to_string()), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys rendered as text, in document order.
    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.0.keys().map(key_to_string)
    }

    /// Convert to a JSON object, stringifying non-string keys.
    pub fn to_json_map(&self) -> serde_json::Map<String, serde_json::Value> {
        self.0
            .iter()
            .map(|(key, value)| {
                let json = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
                (key_to_string(key), json)
            })
            .collect()
    }
}

impl Serialize for FrontMatter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn key_to_string(key: &Value) -> String {
    scalar_to_string(key).unwrap_or_else(|| {
        serde_yaml::to_string(key)
            .map(|text| text.trim_end().to_string())
            .unwrap_or_default()
    })
}

/// A document split into its front matter and body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDocument {
    pub front_matter: FrontMatter,
    pub body: String,
}

/// Locate a leading fenced block.
///
/// # Returns
/// `(yaml, body)` slices when `source` opens with a `---` line that is later
/// closed by another `---` line.
fn split_fenced(source: &str) -> Option<(&str, &str)> {
    let mut lines = source.split_inclusive('\n');
    let first = lines.next()?;
    if !first.ends_with('\n') || first.trim_end_matches(['\r', '\n']) != FENCE {
        return None;
    }
    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if line.trim_end_matches(['\r', '\n']) == FENCE {
            return Some((&source[yaml_start..offset], &source[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Split a document into front matter and body.
///
/// Documents without a closed leading fence have empty front matter and the
/// whole input as body.
///
/// # Errors
/// Returns [`AppError::Decode`] when the fenced block is not valid YAML or is
/// not a mapping.
pub fn parse(source: &str) -> Result<ParsedDocument, AppError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let Some((yaml, body)) = split_fenced(source) else {
        return Ok(ParsedDocument {
            front_matter: FrontMatter::new(),
            body: source.to_string(),
        });
    };

    let front_matter = if yaml.trim().is_empty() {
        FrontMatter::new()
    } else {
        match serde_yaml::from_str::<Value>(yaml)? {
            Value::Mapping(mapping) => FrontMatter(mapping),
            Value::Null => FrontMatter::new(),
            _ => {
                return Err(AppError::Decode(
                    "front matter must be a key/value mapping".to_string(),
                ))
            }
        }
    };

    Ok(ParsedDocument {
        front_matter,
        body: body.to_string(),
    })
}

/// Serialize front matter and body into one document.
///
/// The body is written verbatim so [`parse`] returns it unchanged.
///
/// # Errors
/// Returns [`AppError::Decode`] if a value cannot be represented as YAML.
pub fn render(front_matter: &FrontMatter, body: &str) -> Result<String, AppError> {
    if front_matter.is_empty() && split_fenced(body).is_none() {
        return Ok(body.to_string());
    }
    let mut out = String::with_capacity(body.len() + 128);
    out.push_str(FENCE);
    out.push('\n');
    if !front_matter.is_empty() {
        out.push_str(&serde_yaml::to_string(&front_matter.0)?);
    }
    out.push_str(FENCE);
    out.push('\n');
    out.push_str(body);
    Ok(out)
}
