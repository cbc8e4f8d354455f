//! Article index records, documents and request payloads.

use crate::frontmatter::FrontMatter;
use crate::AppError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};

/// One index element exactly as stored.
///
/// Indexes are served and merged as raw JSON so keys this crate does not
/// know, and records missing optional metadata, pass through untouched.
pub type IndexEntry = Value;

/// One entry of the article index.
///
/// `path` is the document's repository location and uniquely identifies it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    /// Last commit date for the document, or its content sha when the
    /// history is unavailable.
    #[serde(default)]
    pub last_modified: String,
    pub path: String,
}

impl ArticleRecord {
    /// Build an index record from a document's front matter.
    ///
    /// # Arguments
    /// - `front_matter`: Parsed metadata; must contain `title`, `description`
    ///   and `date`.
    /// - `last_modified`: Commit date or content sha.
    /// - `path`: Repository path of the document.
    ///
    /// # Errors
    /// Returns [`AppError::Decode`] naming the first missing required key.
    pub fn from_front_matter(
        front_matter: &FrontMatter,
        last_modified: String,
        path: &str,
    ) -> Result<Self, AppError> {
        let required = |key: &str| {
            front_matter.get_string(key).ok_or_else(|| {
                AppError::Decode(format!("{}: front matter is missing '{}'", path, key))
            })
        };
        Ok(Self {
            title: required("title")?,
            description: required("description")?,
            date: required("date")?,
            last_modified,
            path: path.to_string(),
        })
    }

    /// The record as a stored index element.
    pub fn to_index_entry(&self) -> IndexEntry {
        json!({
            "title": self.title,
            "description": self.description,
            "date": self.date,
            "lastModified": self.last_modified,
            "path": self.path,
        })
    }
}

/// String field of an index element, empty when absent or not a string.
pub fn entry_str<'a>(entry: &'a IndexEntry, key: &str) -> &'a str {
    entry.get(key).and_then(Value::as_str).unwrap_or("")
}

/// A Markdown document split into metadata and body.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleDocument {
    pub front_matter: FrontMatter,
    pub content: String,
    pub path: String,
}

/// API shape: front matter fields flattened next to `content` and `path`.
///
/// `content` and `path` take precedence over same-named metadata keys.
impl Serialize for ArticleDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut fields = self.front_matter.to_json_map();
        fields.remove("content");
        fields.remove("path");
        let mut map = serializer.serialize_map(Some(fields.len() + 2))?;
        for (key, value) in &fields {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry("content", &self.content)?;
        map.serialize_entry("path", &self.path)?;
        map.end()
    }
}

/// Caller-supplied edit for one article.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArticleUpdate {
    pub path: String,
    pub title: String,
    pub description: String,
    pub content: String,
}

/// Request payload for `POST /api/articles`.
#[derive(Debug, Deserialize)]
pub struct UpdateArticleRequest {
    pub article: ArticleUpdate,
}

/// Query parameters for `GET /api/articles`.
#[derive(Debug, Default, Deserialize)]
pub struct ArticlesQuery {
    pub sync: Option<String>,
    pub path: Option<String>,
}

impl ArticlesQuery {
    /// `true` only for the literal `sync=true`.
    pub fn sync_requested(&self) -> bool {
        self.sync.as_deref().map(str::trim) == Some("true")
    }
}

/// Sort index elements newest first by their `date` string.
///
/// ISO dates compare correctly as text; equal dates keep index order and
/// undated elements sort last.
pub fn sort_newest_first(entries: &mut [IndexEntry]) {
    entries.sort_by(|left, right| entry_str(right, "date").cmp(entry_str(left, "date")));
}
