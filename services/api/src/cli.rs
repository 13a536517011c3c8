//! services/api/src/cli.rs
//!
//! Command-line front end for the API client. It plays the browser's role:
//! it keeps the credential store on disk and reaches the remote service
//! through a running relay.

use crate::client::WallabagClient;
use crate::error::ApiError;
use clap::{Parser, Subcommand};
use reading_list_core::domain::{Annotation, Article, ArticleFilter};
use std::path::PathBuf;

/// Reading-list client for Wallabag-compatible services
#[derive(Parser, Debug)]
#[command(name = "reader", version, about)]
pub struct Cli {
    /// Relay endpoint URL (overrides RELAY_URL)
    #[arg(long, global = true)]
    pub relay_url: Option<String>,

    /// Directory holding the stored token and settings (overrides READER_STATE_DIR)
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with OAuth2 password credentials and remember the connection
    Login {
        /// Base address of the service, e.g. https://wallabag.example.org
        #[arg(long)]
        url: String,
        #[arg(long)]
        client_id: String,
        #[arg(long, env = "WALLABAG_CLIENT_SECRET", hide_env_values = true)]
        client_secret: String,
        #[arg(long)]
        username: String,
        #[arg(long, env = "WALLABAG_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored token, credentials and setup markers
    Logout,

    /// Show whether setup is complete and a token is usable
    Status,

    /// List saved articles
    List {
        /// unread, archived, starred or all
        #[arg(short, long, default_value = "unread")]
        filter: ArticleFilter,
        /// Print JSON instead of one line per article
        #[arg(long)]
        json: bool,
    },

    /// Show one article with its annotations
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },

    /// Save a URL for later reading
    Add { url: String },

    /// Mark an article as read
    Archive { id: String },

    /// Move an article back to the unread list
    Unarchive { id: String },

    /// Star an article
    Star { id: String },

    /// Remove the star from an article
    Unstar { id: String },

    /// Delete an article (cannot be undone)
    Delete { id: String },

    /// Manage annotations
    Annotations {
        #[command(subcommand)]
        command: AnnotationCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum AnnotationCommands {
    /// List the annotations of an article
    List { article_id: String },
    /// Annotate a quoted passage of an article
    Add {
        article_id: String,
        #[arg(long)]
        quote: String,
        #[arg(long)]
        text: String,
    },
    /// Replace the note of an annotation
    Edit {
        annotation_id: String,
        #[arg(long)]
        text: String,
    },
    /// Delete an annotation
    Rm { annotation_id: String },
}

/// Executes `command` and returns what should be printed.
pub async fn run(command: Commands, client: &WallabagClient) -> Result<String, ApiError> {
    let output = match command {
        Commands::Login {
            url,
            client_id,
            client_secret,
            username,
            password,
        } => {
            client
                .login(&username, &password, &url, &client_id, &client_secret)
                .await?;
            "Logged in.".to_string()
        }
        Commands::Logout => {
            client.logout();
            "Logged out.".to_string()
        }
        Commands::Status => {
            let store = client.store();
            format!(
                "configured: {}\nauthenticated: {}\napi url: {}",
                store.is_configured(),
                store.is_authenticated(),
                store.base_url().unwrap_or_else(|| "-".to_string())
            )
        }
        Commands::List { filter, json } => {
            let articles = client.list_articles(filter).await?;
            if json {
                to_json(&articles)?
            } else if articles.is_empty() {
                format!("No {} articles.", filter)
            } else {
                articles.iter().map(article_line).collect::<Vec<_>>().join("\n")
            }
        }
        Commands::Show { id, json } => {
            let article = client.open_article(&id).await?;
            if json {
                to_json(&article)?
            } else {
                article_detail(&article)
            }
        }
        Commands::Add { url } => {
            client.add_article(&url).await?;
            format!("Saved {}", url)
        }
        Commands::Archive { id } => {
            client.set_archived(&id, true).await?;
            format!("Archived {}", id)
        }
        Commands::Unarchive { id } => {
            client.set_archived(&id, false).await?;
            format!("Moved {} back to unread", id)
        }
        Commands::Star { id } => {
            client.set_starred(&id, true).await?;
            format!("Starred {}", id)
        }
        Commands::Unstar { id } => {
            client.set_starred(&id, false).await?;
            format!("Unstarred {}", id)
        }
        Commands::Delete { id } => {
            client.delete_article(&id).await?;
            format!("Deleted {}", id)
        }
        Commands::Annotations { command } => match command {
            AnnotationCommands::List { article_id } => {
                let annotations = client.list_annotations(&article_id).await?;
                if annotations.is_empty() {
                    "No annotations yet.".to_string()
                } else {
                    annotations.iter().map(annotation_line).collect::<Vec<_>>().join("\n")
                }
            }
            AnnotationCommands::Add { article_id, quote, text } => {
                client.create_annotation(&article_id, &quote, &text).await?;
                "Annotation saved.".to_string()
            }
            AnnotationCommands::Edit { annotation_id, text } => {
                client.update_annotation(&annotation_id, &text).await?;
                "Annotation updated.".to_string()
            }
            AnnotationCommands::Rm { annotation_id } => {
                client.delete_annotation(&annotation_id).await?;
                "Annotation deleted.".to_string()
            }
        },
    };
    Ok(output)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(|e| ApiError::Internal(e.to_string()))
}

fn article_line(article: &Article) -> String {
    let mut flags = String::new();
    if article.is_starred {
        flags.push('*');
    }
    if article.is_archived {
        flags.push('a');
    }
    format!("{:>6} {:<2} {} ({})", article.id, flags, article.title, article.domain)
}

fn annotation_line(annotation: &Annotation) -> String {
    format!("{:>6} \"{}\" - {}", annotation.id, annotation.quote, annotation.text)
}

fn article_detail(article: &Article) -> String {
    let mut out = format!(
        "{}\n{}\nsaved {} | archived: {} | starred: {}\n\n{}",
        article.title, article.url, article.created_at, article.is_archived, article.is_starred, article.preview
    );
    out.push_str(&format!("\n\nAnnotations ({})", article.annotations.len()));
    for annotation in &article.annotations {
        out.push('\n');
        out.push_str(&annotation_line(annotation));
    }
    out
}
