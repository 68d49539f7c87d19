use library_http::links::Link;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted book owned by an author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    /// Nil until storage assigns an id, unless the client supplied one
    pub id: Uuid,
    /// Owning author; fixed once the book is stored
    pub author_id: Uuid,
    pub title: String,
    pub description: String,
}

/// Book as returned to clients, decorated with follow-up links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDto {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Inbound payload for creating a book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BookForCreation {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Inbound payload for replacing a book, and the candidate state a patch is
/// applied to. Both fields serialize even when unset so patch paths resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BookForUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Collection of resources plus collection-level links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedCollection<T> {
    pub value: Vec<T>,
    pub links: Vec<Link>,
}
