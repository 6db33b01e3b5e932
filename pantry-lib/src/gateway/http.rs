//! HTTP/JSON gateway client

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;
use uuid::Uuid;

use super::AddIngredient;
use super::AddedItem;
use super::IngredientList;
use super::Inventory;
use super::PantryGateway;
use super::RemoveIngredient;
use super::RemovedItem;
use super::SelectPantry;
use super::UpdateInventory;
use super::UpdatedItem;
use crate::error::ApiError;
use crate::error::Error;
use crate::model::UserId;

/// Header carrying the acting user on every request.
pub const USER_HEADER: &str = "x-pantry-user";

/// Gateway that posts JSON to `{base}/{router}.{procedure}` endpoints.
///
/// This client is cheap to clone (uses `Arc` internally).
///
/// # Example
///
/// ```ignore
/// let gateway = HttpGateway::builder()
///     .url("https://pantry.example.com/api/trpc")
///     .timeout(Duration::from_secs(10))
///     .build()?;
///
/// let inventory = gateway.get_inventory(user, pantry_id).await?;
/// ```
#[derive(Clone)]
pub struct HttpGateway {
    inner: Arc<HttpGatewayInner>,
}

struct HttpGatewayInner {
    base_url: Url,
    session_token: Option<String>,
    http_client: Client,
    timeout: Option<Duration>,
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl HttpGateway {
    /// Creates a new builder for constructing a gateway.
    pub fn builder() -> HttpGatewayBuilder<Missing> {
        HttpGatewayBuilder::new()
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    async fn call<I, O>(&self, procedure: &str, user: UserId, input: &I) -> Result<O, Error>
    where
        I: Serialize + Sync,
        O: DeserializeOwned,
    {
        let url = self
            .inner
            .base_url
            .join(procedure)
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        debug!("POST {}", url);

        let mut request = self
            .inner
            .http_client
            .post(url)
            .header(USER_HEADER, user.to_string())
            .json(input);

        if let Some(token) = &self.inner.session_token {
            request = request.bearer_auth(token);
        }
        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_send_error(e))?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| ApiError::parse_with_body(e.to_string(), body).into())
        } else {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or(body);
            Err(ApiError::from_status(status.as_u16(), message).into())
        }
    }

    fn map_send_error(&self, error: reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout(self.inner.timeout.unwrap_or_default())
        } else {
            ApiError::Network(error)
        }
    }
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.inner.base_url.as_str())
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PantryGateway for HttpGateway {
    async fn get_inventory(&self, user: UserId, pantry_id: Uuid) -> Result<Inventory, Error> {
        self.call("pantries.get-inventory", user, &SelectPantry { pantry_id })
            .await
    }

    async fn update_inventory(&self, user: UserId, request: UpdateInventory) -> Result<UpdatedItem, Error> {
        self.call("pantries.update-inventory", user, &request).await
    }

    async fn add_ingredient(&self, user: UserId, request: AddIngredient) -> Result<AddedItem, Error> {
        self.call("pantries.add-ingredient", user, &request).await
    }

    async fn remove_ingredient(&self, user: UserId, item_id: Uuid) -> Result<RemovedItem, Error> {
        self.call("pantries.remove-ingredient", user, &RemoveIngredient { id: item_id })
            .await
    }

    async fn all_ingredients(&self, user: UserId) -> Result<IngredientList, Error> {
        self.call("ingredients.all-ingredients", user, &serde_json::json!({}))
            .await
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing an [`HttpGateway`].
///
/// The base URL is required; `build()` only exists once it is set.
pub struct HttpGatewayBuilder<U> {
    url: U,
    session_token: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl HttpGatewayBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            session_token: None,
            timeout: None,
            connect_timeout: None,
            http_client: None,
        }
    }

    /// Sets the API base URL.
    pub fn url(self, url: impl Into<String>) -> HttpGatewayBuilder<Set<String>> {
        HttpGatewayBuilder {
            url: Set(url.into()),
            session_token: self.session_token,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl Default for HttpGatewayBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> HttpGatewayBuilder<U> {
    /// Sets the session token sent as a bearer credential.
    pub fn session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// Ignored when a custom HTTP client is supplied.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl HttpGatewayBuilder<Set<String>> {
    /// Builds the [`HttpGateway`].
    pub fn build(self) -> Result<HttpGateway, ApiError> {
        let mut raw = self.url.0;
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(HttpGateway {
            inner: Arc::new(HttpGatewayInner {
                base_url,
                session_token: self.session_token,
                http_client,
                timeout: self.timeout,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_appends_trailing_slash() {
        let gateway = HttpGateway::builder().url("http://localhost:3000/api/trpc").build().unwrap();
        assert_eq!(gateway.base_url().as_str(), "http://localhost:3000/api/trpc/");
        let url = gateway.base_url().join("pantries.get-inventory").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/trpc/pantries.get-inventory");
    }

    #[test]
    fn test_build_rejects_invalid_url() {
        let err = HttpGateway::builder().url("not a url").build().unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }
}
