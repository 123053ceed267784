//! Record service: the five blog operations against a `PostStore`
//!
//! The service keeps no state between calls besides the injected store handle
//! and its logging span. Every store failure is translated on the spot into
//! one of the three [`ServiceError`] kinds; nothing is retried.
//!
//! `list` streams one row at a time: a row is fetched, decoded, handed to the
//! sink and acknowledged before the next fetch. The cursor is dropped on every
//! exit path, including a sink that has gone away.

use std::sync::Arc;

use async_trait::async_trait;
use blog_state::{ByIdQuery, DocumentCursor, PostDocument, PostStore, StorageError};
use tracing::{info_span, Instrument, Span};

use crate::codec;
use crate::error::{ConfigError, ServiceError};
use crate::obs;
use crate::proto::blog::Blog;
use crate::ServiceResult;

/// Returned by a [`RecordSink`] whose consumer is gone.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("record sink closed: {0}")]
pub struct SinkClosed(pub String);

/// Destination for streamed records.
#[async_trait]
pub trait RecordSink: Send {
    /// Deliver one record. Resolves once the record has been accepted.
    async fn send(&mut self, record: Blog) -> Result<(), SinkClosed>;
}

#[async_trait]
impl RecordSink for Vec<Blog> {
    async fn send(&mut self, record: Blog) -> Result<(), SinkClosed> {
        self.push(record);
        Ok(())
    }
}

/// Builder for [`PostService`]
#[derive(Default)]
pub struct PostServiceBuilder {
    store: Option<Arc<dyn PostStore>>,
    span: Option<Span>,
}

impl PostServiceBuilder {
    /// Document store the service reads and writes.
    pub fn store(mut self, store: Arc<dyn PostStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Parent span for every operation's span.
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn build(self) -> Result<PostService, ConfigError> {
        let store = self.store.ok_or(ConfigError::MissingStore)?;
        let span = self
            .span
            .unwrap_or_else(|| info_span!("blog_service"));
        Ok(PostService { store, span })
    }
}

/// Create / read / update / delete / list for blog posts.
pub struct PostService {
    store: Arc<dyn PostStore>,
    span: Span,
}

impl PostService {
    pub fn builder() -> PostServiceBuilder {
        PostServiceBuilder::default()
    }

    fn rpc_span(&self, op: &'static str) -> Span {
        info_span!(parent: &self.span, "rpc", op = op)
    }

    /// Store a new post. Any id on the incoming record is ignored.
    pub async fn create(&self, record: Blog) -> ServiceResult<Blog> {
        const OP: &str = "create";
        async move {
            obs::emit_request(OP);
            let content = codec::decode_record(&record);

            let inserted = self
                .store
                .insert_one(content.clone())
                .await
                .map_err(|e| ServiceError::Internal(format!("Internal error: {e}")))?;

            let id = codec::decode_identifier(&inserted.0).map_err(|_| {
                ServiceError::Internal(format!("Cannot convert identifier: {inserted}"))
            })?;

            let blog_id = codec::encode_identifier(&id);
            obs::emit_created(&blog_id);
            Ok(Blog {
                id: blog_id,
                author_id: content.author_id,
                title: content.title,
                content: content.content,
            })
        }
        .instrument(self.rpc_span(OP))
        .await
        .inspect_err(|e| obs::emit_failure(OP, e))
    }

    /// Fetch one post by id.
    pub async fn read(&self, blog_id: &str) -> ServiceResult<Blog> {
        const OP: &str = "read";
        async move {
            obs::emit_request(OP);
            let query = parse_query(blog_id)?;
            let document = self.fetch(&query).await?;
            Ok(codec::encode_document(&document))
        }
        .instrument(self.rpc_span(OP))
        .await
        .inspect_err(|e| obs::emit_failure(OP, e))
    }

    /// Overwrite author, title and content of an existing post.
    ///
    /// Last write wins: two concurrent updates of the same post both succeed
    /// and the later replace is what remains.
    pub async fn update(&self, record: Blog) -> ServiceResult<Blog> {
        const OP: &str = "update";
        async move {
            obs::emit_request(OP);
            let query = parse_query(&record.id)?;
            let mut document = self.fetch(&query).await?;

            document.apply(codec::decode_record(&record));

            let outcome = self
                .store
                .replace_one(&query, &document)
                .await
                .map_err(|e| ServiceError::Internal(format!("Cannot update blog post: {e}")))?;
            if outcome.matched_count == 0 {
                return Err(not_found(&query));
            }

            let updated = codec::encode_document(&document);
            obs::emit_updated(&updated.id);
            Ok(updated)
        }
        .instrument(self.rpc_span(OP))
        .await
        .inspect_err(|e| obs::emit_failure(OP, e))
    }

    /// Delete a post, echoing the caller's id string back.
    pub async fn delete(&self, blog_id: &str) -> ServiceResult<String> {
        const OP: &str = "delete";
        async move {
            obs::emit_request(OP);
            let query = parse_query(blog_id)?;

            let outcome = self
                .store
                .delete_one(&query)
                .await
                .map_err(|e| ServiceError::Internal(format!("Cannot delete blog post: {e}")))?;
            if outcome.deleted_count == 0 {
                return Err(not_found(&query));
            }

            obs::emit_deleted(blog_id);
            Ok(blog_id.to_string())
        }
        .instrument(self.rpc_span(OP))
        .await
        .inspect_err(|e| obs::emit_failure(OP, e))
    }

    /// Stream every stored post into `sink`, returning how many were sent.
    pub async fn list<S>(&self, sink: &mut S) -> ServiceResult<u64>
    where
        S: RecordSink + ?Sized,
    {
        const OP: &str = "list";
        async move {
            obs::emit_request(OP);
            let mut cursor = self
                .store
                .find_all()
                .await
                .map_err(|e| ServiceError::Internal(format!("Unknown internal error: {e}")))?;

            let mut sent = 0u64;
            while let Some(item) = cursor.next().await {
                let row = item
                    .map_err(|e| ServiceError::Internal(format!("Unknown internal error: {e}")))?;
                let document = codec::decode_row(row).map_err(|e| {
                    ServiceError::Internal(format!("Error while decoding stored data: {e}"))
                })?;

                sink.send(codec::encode_document(&document))
                    .await
                    .map_err(|e| {
                        ServiceError::Internal(format!("Error while sending data to client: {e}"))
                    })?;
                sent += 1;
            }

            obs::emit_list_completed(sent);
            Ok(sent)
        }
        .instrument(self.rpc_span(OP))
        .await
        .inspect_err(|e| obs::emit_failure(OP, e))
    }

    /// Look up one document; absent or undecodable both read as not found.
    async fn fetch(&self, query: &ByIdQuery) -> ServiceResult<PostDocument> {
        let row = self
            .store
            .find_one(query)
            .await
            .map_err(|e| match e {
                StorageError::Decode(_) => not_found(query),
                other => ServiceError::Internal(format!("Cannot look up blog post: {other}")),
            })?
            .ok_or_else(|| not_found(query))?;

        codec::decode_row(row).map_err(|_| not_found(query))
    }
}

fn parse_query(blog_id: &str) -> ServiceResult<ByIdQuery> {
    codec::decode_identifier(blog_id)
        .map(ByIdQuery::new)
        .map_err(|_| ServiceError::InvalidArgument(format!("Cannot parse ID: {blog_id:?}")))
}

fn not_found(query: &ByIdQuery) -> ServiceError {
    ServiceError::NotFound(format!(
        "Cannot find blog post with specified ID: {}",
        query.id()
    ))
}
