//! HTTP implementation of the remote cart store.
//!
//! - `GET  {base}/users/{id}/cart` returns the snapshot as a JSON array;
//!   `404` means the user has no cart yet.
//! - `PUT  {base}/users/{id}/cart` replaces it with the JSON array body.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};
use url::Url;

use orderdesk_core::{CartLineItem, UserId};

use super::{RemoteCartError, RemoteCartStore};
use crate::config::RemoteConfig;

/// Longest response body kept in an error.
const MAX_ERROR_BODY: usize = 500;

/// Remote cart store over a REST API.
#[derive(Clone)]
pub struct HttpRemoteCart {
    client: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
}

impl std::fmt::Debug for HttpRemoteCart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRemoteCart")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl HttpRemoteCart {
    /// Create a client for the configured remote.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot carry a path or the HTTP
    /// client cannot be built.
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteCartError> {
        if config.base_url.cannot_be_a_base() {
            return Err(RemoteCartError::InvalidUrl(config.base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }

    fn cart_url(&self, user_id: UserId) -> Result<Url, RemoteCartError> {
        let id = user_id.to_string();
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| RemoteCartError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["users", id.as_str(), "cart"]);
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }
}

async fn status_error(response: reqwest::Response) -> RemoteCartError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(MAX_ERROR_BODY)
        .collect();
    RemoteCartError::Status { status, body }
}

impl RemoteCartStore for HttpRemoteCart {
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn fetch_cart(&self, user_id: UserId) -> Result<Vec<CartLineItem>, RemoteCartError> {
        let url = self.cart_url(user_id)?;
        let response = self.authorize(self.client.get(url)).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!("no remote cart yet");
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body = response.text().await?;
        let items: Vec<CartLineItem> = serde_json::from_str(&body)?;
        debug!(items = items.len(), "fetched remote cart");
        Ok(items)
    }

    #[instrument(skip(self, items), fields(user_id = %user_id, items = items.len()))]
    async fn persist_cart(
        &self,
        user_id: UserId,
        items: Vec<CartLineItem>,
    ) -> Result<(), RemoteCartError> {
        let url = self.cart_url(user_id)?;
        let response = self
            .authorize(self.client.put(url))
            .json(&items)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        debug!("persisted remote cart");
        Ok(())
    }
}
