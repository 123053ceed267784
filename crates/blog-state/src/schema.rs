//! Post shapes as they move in and out of the store
//!
//! - `PostContent`: the content fields alone, used to build a new post before
//!   the store assigns an id.
//! - `PostDocument`: a persisted post with its typed id.
//! - `PostRow`: what the store hands back. The id is still the raw string the
//!   backend returned; decoding it is the caller's job.

use serde::{Deserialize, Serialize};

use crate::object_id::ObjectId;

/// Content fields of a blog post
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PostContent {
    pub author_id: String,
    pub title: String,
    pub content: String,
}

impl PostContent {
    pub fn new(
        author_id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            author_id: author_id.into(),
            title: title.into(),
            content: content.into(),
        }
    }
}

/// A stored blog post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDocument {
    pub id: ObjectId,
    pub author_id: String,
    pub content: String,
    pub title: String,
}

impl PostDocument {
    /// Attach an id to content fields.
    pub fn from_content(id: ObjectId, content: PostContent) -> Self {
        Self {
            id,
            author_id: content.author_id,
            content: content.content,
            title: content.title,
        }
    }

    /// Overwrite every content field, keeping the id.
    pub fn apply(&mut self, content: PostContent) {
        self.author_id = content.author_id;
        self.content = content.content;
        self.title = content.title;
    }

    /// Raw row form, as written to the store.
    pub fn to_row(&self) -> PostRow {
        PostRow {
            oid: self.id.to_hex(),
            author_id: self.author_id.clone(),
            content: self.content.clone(),
            title: self.title.clone(),
        }
    }
}

/// Raw stored row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRow {
    /// Object id in hex, exactly as stored
    pub oid: String,
    pub author_id: String,
    pub content: String,
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_keeps_id() {
        let id = ObjectId::new();
        let mut doc = PostDocument::from_content(id, PostContent::new("a", "t", "c"));
        doc.apply(PostContent::new("a2", "t2", "c2"));

        assert_eq!(doc.id, id);
        assert_eq!(doc.author_id, "a2");
        assert_eq!(doc.title, "t2");
        assert_eq!(doc.content, "c2");
    }

    #[test]
    fn row_serializes_with_hex_oid() {
        let id = ObjectId::from_bytes([1; 12]);
        let row = PostDocument::from_content(id, PostContent::new("a", "t", "c")).to_row();
        let json = serde_json::to_value(&row).unwrap();

        assert_eq!(json["oid"], "010101010101010101010101");
        assert_eq!(json["author_id"], "a");
    }
}
