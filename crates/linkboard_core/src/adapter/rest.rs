//! Request/response REST backend.
//!
//! # Responsibility
//! - Map the adapter contract onto the board's REST routes.
//! - Translate HTTP outcomes into tagged adapter errors.
//!
//! # Invariants
//! - 4xx responses are `Rejected` (404 on an id route is `NotFound`).
//! - 5xx responses, transport failures and undecodable bodies are
//!   `Transient`.
//! - The server returns both collections oldest-first.

use super::{
    AdapterError, AdapterResult, BackendKind, PersistenceAdapter, RefreshTrigger, SnapshotOrder,
    Subscription,
};
use crate::model::id::EntityId;
use crate::model::link::{Link, LinkDraft};
use crate::model::notice::Notice;
use log::debug;
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use url::Url;

const BACKEND: BackendKind = BackendKind::Rest;
const LINKS_PATH: &str = "/api/links";
const NOTICES_PATH: &str = "/api/notice";

/// Scratch origin used only to percent-encode path segments.
static SEGMENT_BASE: Lazy<Url> =
    Lazy::new(|| Url::parse("http://board.invalid/").expect("valid segment base"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// One API call. `path` is absolute from the API root (`/api/...`).
#[derive(Debug, Clone, PartialEq)]
pub struct RestRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Value>,
}

impl RestRequest {
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Raw server reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestResponse {
    pub status: u16,
    pub body: String,
}

impl RestResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Network-level failure; the request never produced a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "transport failure: {}", self.message)
    }
}

impl Error for TransportError {}

/// Sends API requests. Implemented over HTTP by `HttpTransport`.
#[allow(async_fn_in_trait)]
pub trait RestTransport {
    async fn send(&self, request: RestRequest) -> Result<RestResponse, TransportError>;
}

#[derive(Debug, Deserialize)]
struct Ack {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedLink {
    link: Link,
}

#[derive(Debug, Deserialize)]
struct NoticeList {
    #[serde(default)]
    notices: Vec<Notice>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn default_success() -> bool {
    true
}

/// REST backend over any transport.
pub struct RestAdapter<T> {
    transport: T,
}

impl<T: RestTransport> RestAdapter<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn call(&self, request: RestRequest, target: Option<&EntityId>) -> AdapterResult<String> {
        let method = request.method;
        let path = request.path.clone();
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|err| AdapterError::transient(BACKEND, err.message))?;
        debug!(
            "event=rest_call module=rest status={} method={} path={}",
            response.status,
            method.as_str(),
            path
        );

        match (response.status, target) {
            (200..=299, _) => Ok(response.body),
            (404, Some(id)) => Err(AdapterError::not_found(BACKEND, id)),
            (400..=499, _) => Err(AdapterError::rejected(BACKEND, error_message(&response))),
            _ => Err(AdapterError::transient(BACKEND, error_message(&response))),
        }
    }

    async fn call_ack(&self, request: RestRequest, target: Option<&EntityId>) -> AdapterResult<()> {
        let body = self.call(request, target).await?;
        if body.trim().is_empty() {
            return Ok(());
        }
        let ack: Ack = decode(&body)?;
        if ack.success {
            Ok(())
        } else {
            Err(AdapterError::rejected(
                BACKEND,
                ack.message
                    .unwrap_or_else(|| "request rejected by server".to_string()),
            ))
        }
    }
}

impl<T: RestTransport> PersistenceAdapter for RestAdapter<T> {
    fn backend_kind(&self) -> BackendKind {
        BACKEND
    }

    fn refresh_trigger(&self) -> RefreshTrigger {
        RefreshTrigger::CallSite
    }

    fn snapshot_order(&self) -> SnapshotOrder {
        SnapshotOrder::OldestFirst
    }

    async fn list_links(&self) -> AdapterResult<Vec<Link>> {
        let body = self
            .call(RestRequest::new(HttpMethod::Get, LINKS_PATH), None)
            .await?;
        decode(&body)
    }

    async fn create_link(&self, draft: &LinkDraft) -> AdapterResult<Link> {
        let request = RestRequest::new(HttpMethod::Post, LINKS_PATH).with_body(json!({
            "url": draft.url,
            "title": draft.title,
            "description": draft.description,
            "image": draft.image.as_deref().unwrap_or(""),
            "note": draft.note.as_deref().unwrap_or(""),
        }));
        let body = self.call(request, None).await?;
        let ack: Ack = decode(&body)?;
        if !ack.success {
            return Err(AdapterError::rejected(
                BACKEND,
                ack.message
                    .unwrap_or_else(|| "link rejected by server".to_string()),
            ));
        }
        let created: CreatedLink = decode(&body)?;
        Ok(created.link)
    }

    async fn delete_link(&self, id: &EntityId) -> AdapterResult<()> {
        let request = RestRequest::new(HttpMethod::Delete, item_path(LINKS_PATH, id));
        self.call_ack(request, Some(id)).await
    }

    async fn update_link_note(&self, id: &EntityId, note: &str) -> AdapterResult<()> {
        let request = RestRequest::new(HttpMethod::Patch, item_path(LINKS_PATH, id))
            .with_body(json!({ "note": note }));
        self.call_ack(request, Some(id)).await
    }

    async fn list_notices(&self) -> AdapterResult<Vec<Notice>> {
        let body = self
            .call(RestRequest::new(HttpMethod::Get, NOTICES_PATH), None)
            .await?;
        let list: NoticeList = decode(&body)?;
        Ok(list.notices)
    }

    async fn create_notice(&self, text: &str) -> AdapterResult<()> {
        let request =
            RestRequest::new(HttpMethod::Post, NOTICES_PATH).with_body(json!({ "text": text }));
        self.call_ack(request, None).await
    }

    async fn delete_notice(&self, id: &EntityId) -> AdapterResult<()> {
        let request = RestRequest::new(HttpMethod::Delete, item_path(NOTICES_PATH, id));
        self.call_ack(request, Some(id)).await
    }

    async fn clear_notices(&self) -> AdapterResult<()> {
        self.call_ack(RestRequest::new(HttpMethod::Delete, NOTICES_PATH), None)
            .await
    }

    fn subscribe(&self) -> Subscription {
        Subscription::inactive()
    }
}

fn item_path(collection: &str, id: &EntityId) -> String {
    let mut url = SEGMENT_BASE.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments
            .clear()
            .extend(collection.split('/').filter(|part| !part.is_empty()))
            .push(&id.to_string());
    }
    url.path().to_string()
}

fn decode<T: DeserializeOwned>(body: &str) -> AdapterResult<T> {
    serde_json::from_str(body).map_err(|err| {
        AdapterError::transient(BACKEND, format!("unexpected response body: {err}"))
    })
}

fn error_message(response: &RestResponse) -> String {
    let parsed: ErrorBody = serde_json::from_str(&response.body).unwrap_or_default();
    parsed
        .message
        .or(parsed.error)
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| format!("server responded with status {}", response.status))
}
