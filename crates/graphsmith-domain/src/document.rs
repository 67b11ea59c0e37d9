//! Source documents fed to the extractor

use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for a document based on UUIDv7
///
/// UUIDv7 keeps identifiers sortable by creation time, which keeps batch
/// output and logs in a stable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(u128);

impl DocumentId {
    /// Generate a new UUIDv7-based DocumentId
    ///
    /// # Examples
    ///
    /// ```
    /// use graphsmith_domain::DocumentId;
    ///
    /// let id = DocumentId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a DocumentId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a DocumentId from its hyphenated UUID form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid document id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// A plain-text document with optional metadata
///
/// Documents are handed to the extractor behind an `Arc` so the resulting
/// [`GraphDocument`](crate::GraphDocument) can point back at its source
/// without taking it away from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    id: DocumentId,
    text: String,
    metadata: BTreeMap<String, String>,
}

impl Document {
    /// Create a document with a fresh id and no metadata
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_id(DocumentId::new(), text)
    }

    /// Create a document with an explicit id
    pub fn with_id(id: DocumentId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata entry (e.g. `source`, `title`)
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Document identifier
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Full document text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Metadata entries, ordered by key
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }
}
