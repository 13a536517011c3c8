//! crates/reading_list_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! Wire names follow the remote service so records can be persisted and
//! exchanged without a separate mapping layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifetime assumed for a token whose `expires_in` is absent: two years.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 2 * 365 * 24 * 60 * 60;

/// A saved article ("entry" on the remote service).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub url: String,
    pub content: String,
    pub preview: String,
    pub domain: String,
    pub created_at: String,
    pub is_archived: bool,
    pub is_starred: bool,
    pub annotations: Vec<Annotation>,
}

/// A user's note anchored to a quoted passage of an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    pub text: String,
    pub quote: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranges: Option<Vec<AnnotationRange>>,
}

/// Locates a quote inside the rendered content with XPath-like anchors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRange {
    pub start: String,
    pub start_offset: u64,
    pub end: String,
    pub end_offset: u64,
}

/// An OAuth2 token record as persisted by the credential store.
///
/// `expires_at` is an absolute timestamp in milliseconds since the epoch,
/// computed when the token is saved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TokenData {
    #[serde(default)]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

/// Connection settings for the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub api_url: String,
}

impl Credentials {
    /// True when nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.client_id.is_empty() && self.client_secret.is_empty() && self.api_url.is_empty()
    }
}

/// Which slice of the reading list to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArticleFilter {
    #[default]
    Unread,
    Archived,
    Starred,
    All,
}

impl ArticleFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleFilter::Unread => "unread",
            ArticleFilter::Archived => "archived",
            ArticleFilter::Starred => "starred",
            ArticleFilter::All => "all",
        }
    }
}

impl fmt::Display for ArticleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArticleFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unread" => Ok(ArticleFilter::Unread),
            "archived" => Ok(ArticleFilter::Archived),
            "starred" => Ok(ArticleFilter::Starred),
            "all" => Ok(ArticleFilter::All),
            other => Err(format!("unknown filter '{}'", other)),
        }
    }
}
