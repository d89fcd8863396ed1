use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use shared::error::ErrorBody;
use storage::{KeyValueStore, MemoryStore};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

use crate::error::RequestError;

pub const TOKEN_STORAGE_KEY: &str = "ves_jwt_token";
pub const ADMIN_TOKEN_STORAGE_KEY: &str = "ves_admin_jwt";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/";

#[derive(Default)]
struct SessionTokens {
    token: Option<String>,
    admin_token: Option<String>,
}

/// HTTP access to the event backend. Requests carry `Authorization: Bearer`
/// with the admin token if one is set, otherwise the user token.
pub struct SessionClient {
    http: Client,
    base_url: Url,
    local_store: Arc<dyn KeyValueStore>,
    session_store: Arc<dyn KeyValueStore>,
    tokens: RwLock<SessionTokens>,
}

impl SessionClient {
    pub fn new(base_url: &str, local_store: Arc<dyn KeyValueStore>) -> Result<Self, RequestError> {
        Self::with_stores(base_url, local_store, Arc::new(MemoryStore::new()))
    }

    pub fn with_stores(
        base_url: &str,
        local_store: Arc<dyn KeyValueStore>,
        session_store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, RequestError> {
        let base_url = parse_base_url(base_url)?;
        Ok(Self {
            http: Client::new(),
            base_url,
            local_store,
            session_store,
            tokens: RwLock::new(SessionTokens::default()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Installs the user token and mirrors it into local storage. `None` logs
    /// the session out and forgets the stored token.
    pub async fn set_token(&self, token: Option<String>) {
        persist(
            self.local_store.as_ref(),
            TOKEN_STORAGE_KEY,
            token.as_deref(),
        )
        .await;
        self.tokens.write().await.token = token;
    }

    pub async fn set_admin_token(&self, token: Option<String>) {
        persist(
            self.session_store.as_ref(),
            ADMIN_TOKEN_STORAGE_KEY,
            token.as_deref(),
        )
        .await;
        self.tokens.write().await.admin_token = token;
    }

    pub async fn token(&self) -> Option<String> {
        self.tokens.read().await.token.clone()
    }

    pub async fn load_token_from_store(&self) -> Option<String> {
        load(self.local_store.as_ref(), TOKEN_STORAGE_KEY).await
    }

    pub async fn load_admin_token_from_store(&self) -> Option<String> {
        load(self.session_store.as_ref(), ADMIN_TOKEN_STORAGE_KEY).await
    }

    async fn bearer(&self) -> Option<String> {
        let tokens = self.tokens.read().await;
        tokens.admin_token.clone().or_else(|| tokens.token.clone())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestError> {
        let url = self.endpoint(path)?;
        self.send(Method::GET, path, self.http.get(url)).await
    }

    pub async fn get_query<Q, T>(&self, path: &str, query: &Q) -> Result<T, RequestError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        self.send(Method::GET, path, self.http.get(url).query(query))
            .await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, RequestError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        self.send(Method::POST, path, self.http.post(url).json(body))
            .await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, RequestError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        self.send(Method::PUT, path, self.http.put(url).json(body))
            .await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, RequestError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        self.send(Method::PATCH, path, self.http.patch(url).json(body))
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestError> {
        let url = self.endpoint(path)?;
        self.send(Method::DELETE, path, self.http.delete(url)).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, RequestError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|source| RequestError::InvalidPath {
                path: path.to_string(),
                source,
            })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, RequestError> {
        let request = match self.bearer().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        debug!(%method, path, "sending request");
        let response = request
            .send()
            .await
            .map_err(|source| RequestError::Transport {
                path: path.to_string(),
                source,
            })?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| RequestError::Transport {
                path: path.to_string(),
                source,
            })?;

        if !status.is_success() {
            let message = ErrorBody::message_from_bytes(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
            warn!(%method, path, %status, %message, "request rejected");
            return Err(RequestError::Status {
                method,
                path: path.to_string(),
                status,
                message,
            });
        }

        decode_body(path, &body)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, RequestError> {
    let raw = raw.trim();
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|source| RequestError::InvalidPath {
        path: raw.to_string(),
        source,
    })
}

/// Empty bodies decode as JSON `null`, so endpoints that answer with nothing
/// still satisfy `()`, `Option<_>` and `IgnoredAny` callers.
fn decode_body<T: DeserializeOwned>(path: &str, body: &[u8]) -> Result<T, RequestError> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"null".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|source| RequestError::Decode {
        path: path.to_string(),
        source,
    })
}

async fn persist(store: &dyn KeyValueStore, key: &str, value: Option<&str>) {
    let result = match value {
        Some(value) => store.set_item(key, value).await,
        None => store.remove_item(key).await,
    };
    if let Err(err) = result {
        warn!(key, "failed to persist token: {err:#}");
    }
}

async fn load(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get_item(key).await {
        Ok(value) => value.filter(|token| !token.trim().is_empty()),
        Err(err) => {
            warn!(key, "failed to load token: {err:#}");
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
