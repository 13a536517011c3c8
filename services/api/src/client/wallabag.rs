//! services/api/src/client/wallabag.rs
//!
//! The API client. Each operation resolves the base URL and bearer token from
//! the credential store, describes one HTTP request, hands it to the relay and
//! maps the answer onto domain types.

use crate::client::credential_store::{normalize_base_url, CredentialStore};
use crate::client::error::{ApiFailure, ClientError, Operation};
use crate::client::normalize::{annotations_from_rows, article_from_entry};
use reading_list_core::domain::{Annotation, AnnotationRange, Article, ArticleFilter, Credentials, TokenData};
use reading_list_core::ports::RelayTransport;
use reading_list_core::relay::{RelayEnvelope, RelayRequest};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const ENTRIES_PATH: &str = "/api/entries.json";
const TOKEN_PATH: &str = "/oauth/v2/token";

/// Anchor used for every new annotation; quotes are assumed to sit in the
/// first paragraph.
pub const ANNOTATION_ANCHOR: &str = "/div[1]/p[1]";

const PAGE_SIZE: &str = "30";

pub struct WallabagClient {
    store: Arc<CredentialStore>,
    relay: Arc<dyn RelayTransport>,
}

impl WallabagClient {
    pub fn new(store: Arc<CredentialStore>, relay: Arc<dyn RelayTransport>) -> Self {
        Self { store, relay }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    //=====================================================================================
    // Articles
    //=====================================================================================

    pub async fn list_articles(&self, filter: ArticleFilter) -> Result<Vec<Article>, ApiFailure> {
        let op = Operation::FetchArticles;
        let base = self.base_url().map_err(|e| fail(op, e))?;
        let url = entries_url(&base, filter).map_err(|e| fail(op, e))?;

        let data = self.send_authorized(RelayRequest::new("GET", url)).await.map_err(|e| fail(op, e))?;

        let items = data
            .get("_embedded")
            .and_then(|embedded| embedded.get("items"))
            .and_then(Value::as_array)
            .ok_or_else(|| fail(op, ClientError::invalid_format()))?;

        items
            .iter()
            .map(article_from_entry)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| fail(op, e))
    }

    pub async fn get_article(&self, id: &str) -> Result<Article, ApiFailure> {
        let op = Operation::FetchArticle;
        let url = self.entry_url(id).map_err(|e| fail(op, e))?;
        debug!(url = %url, "Fetching article");

        let item = self.send_authorized(RelayRequest::new("GET", url)).await.map_err(|e| fail(op, e))?;
        article_from_entry(&item).map_err(|e| fail(op, e))
    }

    /// Fetches an article and then, best effort, its annotations.
    ///
    /// An annotation failure is logged and the annotations embedded in the
    /// entry are kept.
    pub async fn open_article(&self, id: &str) -> Result<Article, ApiFailure> {
        let mut article = self.get_article(id).await?;
        match self.list_annotations(id).await {
            Ok(annotations) => article.annotations = annotations,
            Err(e) => warn!(article_id = id, "Failed to fetch annotations: {}", e),
        }
        Ok(article)
    }

    pub async fn add_article(&self, url: &str) -> Result<(), ApiFailure> {
        let op = Operation::AddArticle;
        let base = self.base_url().map_err(|e| fail(op, e))?;
        let request = RelayRequest::new("POST", format!("{}{}", base, ENTRIES_PATH)).json(json!({ "url": url }));

        self.send_authorized(request).await.map_err(|e| fail(op, e))?;
        Ok(())
    }

    pub async fn set_archived(&self, id: &str, archived: bool) -> Result<(), ApiFailure> {
        self.patch_entry(id, json!({ "archive": u8::from(archived) })).await
    }

    pub async fn set_starred(&self, id: &str, starred: bool) -> Result<(), ApiFailure> {
        self.patch_entry(id, json!({ "starred": u8::from(starred) })).await
    }

    /// Irreversible from the client's side.
    pub async fn delete_article(&self, id: &str) -> Result<(), ApiFailure> {
        let op = Operation::DeleteArticle;
        let url = self.entry_url(id).map_err(|e| fail(op, e))?;

        self.send_authorized(RelayRequest::new("DELETE", url)).await.map_err(|e| fail(op, e))?;
        Ok(())
    }

    async fn patch_entry(&self, id: &str, data: Value) -> Result<(), ApiFailure> {
        let op = Operation::UpdateArticle;
        let url = self.entry_url(id).map_err(|e| fail(op, e))?;

        self.send_authorized(RelayRequest::new("PATCH", url).json(data))
            .await
            .map_err(|e| fail(op, e))?;
        Ok(())
    }

    //=====================================================================================
    // Annotations
    //=====================================================================================

    pub async fn list_annotations(&self, article_id: &str) -> Result<Vec<Annotation>, ApiFailure> {
        let op = Operation::FetchAnnotations;
        let url = self.annotation_url(article_id).map_err(|e| fail(op, e))?;
        debug!(article_id, "Fetching annotations");

        let data = self.send_authorized(RelayRequest::new("GET", url)).await.map_err(|e| fail(op, e))?;
        match data.get("rows") {
            Some(Value::Array(rows)) => annotations_from_rows(rows).map_err(|e| fail(op, e)),
            _ => Ok(Vec::new()),
        }
    }

    /// Annotates `quote` in an article with `text`.
    pub async fn create_annotation(&self, article_id: &str, quote: &str, text: &str) -> Result<(), ApiFailure> {
        let op = Operation::SaveAnnotation;
        let url = self.annotation_url(article_id).map_err(|e| fail(op, e))?;
        let body = annotation_body(quote, text);
        debug!(article_id, "Creating annotation");

        self.send_authorized(RelayRequest::new("POST", url).json(body))
            .await
            .map_err(|e| fail(op, e))?;
        Ok(())
    }

    pub async fn update_annotation(&self, annotation_id: &str, text: &str) -> Result<(), ApiFailure> {
        let op = Operation::UpdateAnnotation;
        let url = self.annotation_url(annotation_id).map_err(|e| fail(op, e))?;

        self.send_authorized(RelayRequest::new("PUT", url).json(json!({ "text": text })))
            .await
            .map_err(|e| fail(op, e))?;
        Ok(())
    }

    pub async fn delete_annotation(&self, annotation_id: &str) -> Result<(), ApiFailure> {
        let op = Operation::DeleteAnnotation;
        let url = self.annotation_url(annotation_id).map_err(|e| fail(op, e))?;

        self.send_authorized(RelayRequest::new("DELETE", url)).await.map_err(|e| fail(op, e))?;
        Ok(())
    }

    //=====================================================================================
    // Authentication
    //=====================================================================================

    /// Performs the OAuth2 password grant and returns the raw token envelope.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        api_url: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Value, ApiFailure> {
        let op = Operation::Authenticate;
        if api_url.is_empty() || client_id.is_empty() || client_secret.is_empty() {
            return Err(fail(
                op,
                ClientError::Configuration("API URL, Client ID, and Client Secret are required".to_string()),
            ));
        }

        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "password")
            .append_pair("client_id", client_id)
            .append_pair("client_secret", client_secret)
            .append_pair("username", username)
            .append_pair("password", password)
            .finish();
        let request = RelayRequest::new("POST", format!("{}{}", normalize_base_url(api_url), TOKEN_PATH)).form(form);

        self.send(request).await.map_err(|e| fail(op, e))
    }

    /// Authenticates and persists the token, the credentials and the setup
    /// markers.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        api_url: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<TokenData, ApiFailure> {
        let op = Operation::Authenticate;
        if [username, password, api_url, client_id, client_secret].iter().any(|f| f.is_empty()) {
            return Err(fail(op, ClientError::Configuration("All fields are required".to_string())));
        }

        let envelope = self.authenticate(username, password, api_url, client_id, client_secret).await?;
        let token: TokenData = serde_json::from_value(envelope)
            .map_err(|e| fail(op, ClientError::Shape(format!("Invalid token response: {}", e))))?;
        if token.access_token.is_empty() {
            return Err(fail(op, ClientError::Shape("Token response has no access_token".to_string())));
        }

        self.store.save_token(&token);
        self.store.save_credentials(&Credentials {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            api_url: api_url.to_string(),
        });
        self.store.mark_setup_complete(api_url);
        info!(api_url = %normalize_base_url(api_url), "Logged in");

        Ok(token)
    }

    pub fn logout(&self) {
        self.store.logout();
        info!("Logged out");
    }

    //=====================================================================================
    // Request plumbing
    //=====================================================================================

    fn base_url(&self) -> Result<String, ClientError> {
        self.store.base_url().ok_or_else(ClientError::missing_base_url)
    }

    fn bearer(&self) -> Result<String, ClientError> {
        let token = self.store.get_token().ok_or(ClientError::Authentication)?;
        Ok(format!("Bearer {}", token.access_token))
    }

    fn entry_url(&self, id: &str) -> Result<String, ClientError> {
        Ok(format!("{}/api/entries/{}.json", self.base_url()?, id))
    }

    /// Annotation paths take an entry id for list/create and an annotation
    /// id for update/delete.
    fn annotation_url(&self, id: &str) -> Result<String, ClientError> {
        Ok(format!("{}/api/annotations/{}.json", self.base_url()?, id))
    }

    async fn send_authorized(&self, request: RelayRequest) -> Result<Value, ClientError> {
        let request = request.header("Authorization", self.bearer()?);
        self.send(request).await
    }

    /// Relays `request` and unwraps the envelope into the upstream body.
    async fn send(&self, request: RelayRequest) -> Result<Value, ClientError> {
        let method = request.method_or_default().to_string();
        let url = request.url.clone().unwrap_or_default();
        debug!(url = %url, method = %method, "Relaying request");

        let envelope = self.relay.relay(request).await.map_err(|e| {
            error!(url = %url, "Relay request failed: {}", e);
            ClientError::from(e)
        })?;

        match envelope {
            RelayEnvelope::Reply(reply) if reply.is_error() => Err(ClientError::Upstream {
                status: reply.status,
                status_text: reply.status_text,
                body: reply.data,
            }),
            RelayEnvelope::Reply(reply) => Ok(reply.data),
            RelayEnvelope::Failure(failure) => Err(ClientError::Transport(failure.error)),
        }
    }
}

fn fail(operation: Operation, source: ClientError) -> ApiFailure {
    error!("{}: {}", operation, source);
    ApiFailure::new(operation, source)
}

/// Entries collection URL with the fixed sort/paging parameters and the
/// filter's own parameter.
pub fn entries_url(base: &str, filter: ArticleFilter) -> Result<String, ClientError> {
    let mut url = url::Url::parse(&format!("{}{}", base, ENTRIES_PATH))
        .map_err(|e| ClientError::Configuration(format!("Invalid API URL: {}", e)))?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("sort", "created")
            .append_pair("order", "desc")
            .append_pair("page", "1")
            .append_pair("perPage", PAGE_SIZE);
        match filter {
            ArticleFilter::Unread => {
                query.append_pair("archive", "0");
            }
            ArticleFilter::Archived => {
                query.append_pair("archive", "1");
            }
            ArticleFilter::Starred => {
                query.append_pair("starred", "1");
            }
            ArticleFilter::All => {}
        }
    }
    Ok(url.into())
}

/// Payload for a new annotation: one range over the whole quote, anchored at
/// [`ANNOTATION_ANCHOR`]. Offsets count UTF-16 units like browser ranges do.
pub fn annotation_body(quote: &str, text: &str) -> Value {
    let range = AnnotationRange {
        start: ANNOTATION_ANCHOR.to_string(),
        start_offset: 0,
        end: ANNOTATION_ANCHOR.to_string(),
        end_offset: quote.encode_utf16().count() as u64,
    };
    json!({
        "text": text,
        "quote": quote,
        "ranges": [range],
    })
}
