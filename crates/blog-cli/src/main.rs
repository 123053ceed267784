//! Blog CLI
//!
//! The `blog` command talks to a running `blogd` over gRPC.
//!
//! ## Commands
//!
//! - `create`: Store a new post
//! - `read`: Show one post
//! - `update`: Replace author, title and content of a post
//! - `delete`: Remove a post
//! - `list`: Stream every post

use anyhow::{Context, Result};
use blog_core::proto::blog::blog_service_client::BlogServiceClient;
use blog_core::proto::blog::{
    Blog, CreateBlogRequest, DeleteBlogRequest, ListBlogRequest, ReadBlogRequest,
    UpdateBlogRequest,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tonic::transport::Channel;
use tracing::{debug, Level};

#[derive(Parser)]
#[command(name = "blog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Client for the blog record service", long_about = None)]
struct Cli {
    /// Server address
    #[arg(long, global = true, env = "BLOG_ADDR", default_value = "http://127.0.0.1:50051")]
    addr: String,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a new post
    Create {
        #[arg(short, long)]
        author: String,

        #[arg(short, long)]
        title: String,

        #[arg(short, long, default_value = "")]
        content: String,
    },

    /// Show one post
    Read {
        /// Post ID (24 hex characters)
        id: String,
    },

    /// Replace author, title and content of a post
    Update {
        /// Post ID (24 hex characters)
        id: String,

        #[arg(short, long)]
        author: String,

        #[arg(short, long)]
        title: String,

        #[arg(short, long, default_value = "")]
        content: String,
    },

    /// Remove a post
    Delete {
        /// Post ID (24 hex characters)
        id: String,
    },

    /// Stream every post
    List,
}

/// A post as printed by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct PostView {
    id: String,
    author_id: String,
    title: String,
    content: String,
}

impl From<Blog> for PostView {
    fn from(blog: Blog) -> Self {
        Self {
            id: blog.id,
            author_id: blog.author_id,
            title: blog.title,
            content: blog.content,
        }
    }
}

/// Result of one command, ready to be rendered.
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
enum Output {
    Post(PostView),
    Posts(Vec<PostView>),
    Deleted { deleted: String },
}

impl Output {
    fn render(&self, json: bool) -> Result<String> {
        if json {
            return serde_json::to_string_pretty(self).context("Failed to encode output");
        }

        Ok(match self {
            Output::Post(post) => render_post(post),
            Output::Posts(posts) if posts.is_empty() => "No posts found.".to_string(),
            Output::Posts(posts) => posts
                .iter()
                .map(render_post)
                .collect::<Vec<_>>()
                .join("\n\n"),
            Output::Deleted { deleted } => format!("Deleted post {deleted}"),
        })
    }
}

fn render_post(post: &PostView) -> String {
    format!(
        "post {}\nAuthor: {}\nTitle:  {}\n\n    {}",
        post.id, post.author_id, post.title, post.content
    )
}

fn blog(id: String, author_id: String, title: String, content: String) -> Blog {
    Blog {
        id,
        author_id,
        title,
        content,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    blog_core::init_tracing(false, level);

    debug!(addr = %cli.addr, "connecting");
    let mut client = BlogServiceClient::connect(cli.addr.clone())
        .await
        .with_context(|| format!("Could not connect to {}", cli.addr))?;

    let output = run(&mut client, cli.command).await?;
    println!("{}", output.render(cli.json)?);
    Ok(())
}

async fn run(client: &mut BlogServiceClient<Channel>, command: Commands) -> Result<Output> {
    match command {
        Commands::Create {
            author,
            title,
            content,
        } => cmd_create(client, blog(String::new(), author, title, content)).await,
        Commands::Read { id } => cmd_read(client, id).await,
        Commands::Update {
            id,
            author,
            title,
            content,
        } => cmd_update(client, blog(id, author, title, content)).await,
        Commands::Delete { id } => cmd_delete(client, id).await,
        Commands::List => cmd_list(client).await,
    }
}

/// Store a new post
async fn cmd_create(client: &mut BlogServiceClient<Channel>, blog: Blog) -> Result<Output> {
    let response = client
        .create_blog(CreateBlogRequest { blog: Some(blog) })
        .await
        .context("Failed to create post")?;
    let blog = response
        .into_inner()
        .blog
        .context("Server returned no post")?;
    Ok(Output::Post(blog.into()))
}

/// Show one post
async fn cmd_read(client: &mut BlogServiceClient<Channel>, id: String) -> Result<Output> {
    let response = client
        .read_blog(ReadBlogRequest {
            blog_id: id.clone(),
        })
        .await
        .with_context(|| format!("Failed to read post '{}'", id))?;
    let blog = response
        .into_inner()
        .blog
        .context("Server returned no post")?;
    Ok(Output::Post(blog.into()))
}

/// Replace a post's content fields
async fn cmd_update(client: &mut BlogServiceClient<Channel>, blog: Blog) -> Result<Output> {
    let id = blog.id.clone();
    let response = client
        .update_blog(UpdateBlogRequest { blog: Some(blog) })
        .await
        .with_context(|| format!("Failed to update post '{}'", id))?;
    let blog = response
        .into_inner()
        .blog
        .context("Server returned no post")?;
    Ok(Output::Post(blog.into()))
}

/// Remove a post
async fn cmd_delete(client: &mut BlogServiceClient<Channel>, id: String) -> Result<Output> {
    let response = client
        .delete_blog(DeleteBlogRequest {
            blog_id: id.clone(),
        })
        .await
        .with_context(|| format!("Failed to delete post '{}'", id))?;
    Ok(Output::Deleted {
        deleted: response.into_inner().blog_id,
    })
}

/// Stream every post
async fn cmd_list(client: &mut BlogServiceClient<Channel>) -> Result<Output> {
    let mut stream = client
        .list_blog(ListBlogRequest {})
        .await
        .context("Failed to list posts")?
        .into_inner();

    let mut posts = Vec::new();
    while let Some(item) = stream
        .message()
        .await
        .context("List stream ended with an error")?
    {
        if let Some(blog) = item.blog {
            posts.push(blog.into());
        }
    }
    Ok(Output::Posts(posts))
}
