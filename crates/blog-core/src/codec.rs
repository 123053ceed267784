//! Record codec: wire `Blog` messages ⇄ persisted post documents
//!
//! The identifier travels separately from the content fields because create
//! requests carry none. [`encode_identifier`] and [`decode_identifier`] are
//! inverses over every 24-character lowercase hex string; anything else is
//! rejected with [`CodecError::InvalidIdentifier`].

use blog_state::{ObjectId, PostContent, PostDocument, PostRow};

use crate::error::CodecError;
use crate::proto::blog::Blog;

/// Canonical hex form of an identifier.
pub fn encode_identifier(id: &ObjectId) -> String {
    id.to_hex()
}

/// Parse an identifier from its canonical hex form.
pub fn decode_identifier(s: &str) -> Result<ObjectId, CodecError> {
    ObjectId::parse_str(s).map_err(|_| CodecError::InvalidIdentifier(s.to_string()))
}

/// Wire form of a stored post.
pub fn encode_document(document: &PostDocument) -> Blog {
    Blog {
        id: encode_identifier(&document.id),
        author_id: document.author_id.clone(),
        title: document.title.clone(),
        content: document.content.clone(),
    }
}

/// Content fields of a wire record. The `id` field is not looked at.
pub fn decode_record(record: &Blog) -> PostContent {
    PostContent {
        author_id: record.author_id.clone(),
        title: record.title.clone(),
        content: record.content.clone(),
    }
}

/// Turn a raw stored row into a document, validating its id.
pub fn decode_row(row: PostRow) -> Result<PostDocument, CodecError> {
    let id = decode_identifier(&row.oid)?;
    Ok(PostDocument {
        id,
        author_id: row.author_id,
        content: row.content,
        title: row.title,
    })
}
