//! tonic adapter for `blog.BlogService`
//!
//! Unary calls delegate straight to [`PostService`]. `ListBlog` runs the
//! service's `list` in its own task and feeds a channel of capacity one, so at
//! most one record is waiting for the client at any time. When the client
//! drops the stream the next send fails, the task ends with `Internal` and the
//! cursor is released.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;
use tokio::sync::mpsc;
use tonic::{Request, Response, Status};
use tracing::debug;

use crate::proto::blog::blog_service_server::{BlogService, BlogServiceServer};
use crate::proto::blog::{
    Blog, CreateBlogRequest, CreateBlogResponse, DeleteBlogRequest, DeleteBlogResponse,
    ListBlogRequest, ListBlogResponse, ReadBlogRequest, ReadBlogResponse, UpdateBlogRequest,
    UpdateBlogResponse,
};
use crate::service::{PostService, RecordSink, SinkClosed};

/// Server-streaming response type of `ListBlog`.
pub type ListBlogStream = Pin<Box<dyn Stream<Item = Result<ListBlogResponse, Status>> + Send>>;

/// gRPC front of a [`PostService`].
#[derive(Clone)]
pub struct BlogGrpc {
    service: Arc<PostService>,
}

impl BlogGrpc {
    pub fn new(service: PostService) -> Self {
        Self::from_shared(Arc::new(service))
    }

    pub fn from_shared(service: Arc<PostService>) -> Self {
        Self { service }
    }

    /// Wrap in the generated tonic server.
    pub fn into_server(self) -> BlogServiceServer<Self> {
        BlogServiceServer::new(self)
    }
}

/// Sink that forwards records into the response channel.
struct ChannelSink {
    tx: mpsc::Sender<Result<ListBlogResponse, Status>>,
}

#[async_trait]
impl RecordSink for ChannelSink {
    async fn send(&mut self, record: Blog) -> Result<(), SinkClosed> {
        self.tx
            .send(Ok(ListBlogResponse { blog: Some(record) }))
            .await
            .map_err(|_| SinkClosed("client disconnected".to_string()))
    }
}

#[tonic::async_trait]
impl BlogService for BlogGrpc {
    type ListBlogStream = ListBlogStream;

    async fn create_blog(
        &self,
        request: Request<CreateBlogRequest>,
    ) -> Result<Response<CreateBlogResponse>, Status> {
        let blog = request.into_inner().blog.unwrap_or_default();
        let blog = self.service.create(blog).await?;
        Ok(Response::new(CreateBlogResponse { blog: Some(blog) }))
    }

    async fn read_blog(
        &self,
        request: Request<ReadBlogRequest>,
    ) -> Result<Response<ReadBlogResponse>, Status> {
        let blog_id = request.into_inner().blog_id;
        let blog = self.service.read(&blog_id).await?;
        Ok(Response::new(ReadBlogResponse { blog: Some(blog) }))
    }

    async fn update_blog(
        &self,
        request: Request<UpdateBlogRequest>,
    ) -> Result<Response<UpdateBlogResponse>, Status> {
        let blog = request.into_inner().blog.unwrap_or_default();
        let blog = self.service.update(blog).await?;
        Ok(Response::new(UpdateBlogResponse { blog: Some(blog) }))
    }

    async fn delete_blog(
        &self,
        request: Request<DeleteBlogRequest>,
    ) -> Result<Response<DeleteBlogResponse>, Status> {
        let blog_id = request.into_inner().blog_id;
        let blog_id = self.service.delete(&blog_id).await?;
        Ok(Response::new(DeleteBlogResponse { blog_id }))
    }

    async fn list_blog(
        &self,
        _request: Request<ListBlogRequest>,
    ) -> Result<Response<Self::ListBlogStream>, Status> {
        let (tx, rx) = mpsc::channel(1);
        let service = Arc::clone(&self.service);

        tokio::spawn(async move {
            let mut sink = ChannelSink { tx };
            if let Err(err) = service.list(&mut sink).await {
                // Receiver may already be gone; then there is nobody to tell.
                if sink.tx.send(Err(err.into())).await.is_err() {
                    debug!("list stream ended after client disconnected");
                }
            }
        });

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        Ok(Response::new(Box::pin(stream)))
    }
}
