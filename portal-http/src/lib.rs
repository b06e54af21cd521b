// SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP implementation of [`Portal`] over the ArcGIS REST API.
//!
//! [`HttpPortal`] combines an [`HttpClient`] with the portal base URL and
//! credentials. Credentials are exchanged for a token through the portal
//! `generateToken` operation; the token is cached until shortly before it
//! expires and sent as the `token` parameter of every request.

#[cfg(feature = "reqwest")]
pub mod reqwest;

use gpu_webmap_core::FeatureQuery;
use gpu_webmap_core::FeatureSet;
use gpu_webmap_core::ItemId;
use gpu_webmap_core::LayerInfo;
use gpu_webmap_core::LayerUrl;
use gpu_webmap_core::Portal;
use gpu_webmap_core::PortalCredentials;
use gpu_webmap_core::UpdateResult;
use gpu_webmap_core::WebMap;
use http::HeaderMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::error::Error as StdError;
use std::future::Future;
use std::sync::RwLock;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;
use tracing::debug;
use url::Url;

/// Request parameters: query string for `GET`, form body for `POST`.
pub type Params = [(&'static str, String)];

pub trait HttpClient: Send + Sync {
    type Error: Send + StdError;

    /// Perform an HTTP GET request with query parameters.
    fn get<T>(
        &self,
        url: Url,
        params: &Params,
        custom_headers: &HeaderMap,
    ) -> impl Future<Output = Result<T, Self::Error>> + Send
    where
        T: DeserializeOwned + Send + Sync;

    /// Perform an HTTP POST request with a url-encoded form body.
    fn post_form<T>(
        &self,
        url: Url,
        form: &Params,
        custom_headers: &HeaderMap,
    ) -> impl Future<Output = Result<T, Self::Error>> + Send
    where
        T: DeserializeOwned + Send + Sync;
}

/// Trait for errors that the portal client itself has to create or
/// inspect.
pub trait PortalHttpError {
    /// Returns true if the portal rejected the token (REST codes 498 / 499).
    fn is_invalid_token(&self) -> bool;

    /// Token cache lock is poisoned.
    fn lock_error(reason: String) -> Self;

    /// Failed to encode a request payload.
    fn encode_error(err: serde_json::Error) -> Self;
}

/// `TokenSettings` for tokens requested by [`HttpPortal`].
#[derive(Debug, Clone)]
pub struct TokenSettings {
    expiration: Duration,
    renew_before: Duration,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            expiration: Duration::from_secs(60 * 60),
            renew_before: Duration::from_secs(60),
        }
    }
}

impl TokenSettings {
    /// Requested token lifetime (rounded down to minutes by the portal).
    #[must_use]
    pub const fn with_expiration(mut self, expiration: Duration) -> Self {
        self.expiration = expiration;
        self
    }

    /// Renew the token when it expires in less than `renew_before`.
    #[must_use]
    pub const fn renew_before(mut self, renew_before: Duration) -> Self {
        self.renew_before = renew_before;
        self
    }
}

/// Base URL of a portal (`https://www.arcgis.com`,
/// `https://org.maps.arcgis.com`, `https://gis.example.org/portal`).
///
/// Provides conversion to the endpoints of the sharing REST API.
#[derive(Debug, Clone)]
pub struct PortalEndpoint {
    base_url: Url,
}

impl PortalEndpoint {
    /// Create a new `PortalEndpoint` from a base URL
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    /// URL of `sharing/rest/<segments>` under the portal.
    #[must_use]
    pub fn sharing_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        let path = format!(
            "{}/sharing/rest/{}",
            url.path().trim_end_matches('/'),
            segments.join("/")
        );
        url.set_path(&path);
        url.set_query(None);
        url
    }

    /// Value sent as `referer` when requesting tokens.
    #[must_use]
    pub fn referer(&self) -> String {
        self.base_url.origin().ascii_serialization()
    }
}

impl From<Url> for PortalEndpoint {
    fn from(url: Url) -> Self {
        Self::new(url)
    }
}

/// Cached portal token.
#[derive(Debug, Clone, Deserialize)]
struct Token {
    token: String,
    /// Expiration, milliseconds since the Unix epoch.
    expires: u64,
}

impl Token {
    fn is_fresh(&self, renew_before: Duration) -> bool {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .saturating_add(renew_before);
        u128::from(self.expires) > now.as_millis()
    }
}

/// Item description, only the parts needed to address the owner's content.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemInfo {
    owner: String,
}

/// HTTP-based portal implementation that wraps an [`HttpClient`].
///
/// # Examples
///
/// ```rust,no_run
/// use gpu_webmap_core::PortalCredentials;
/// use gpu_webmap_portal_http::reqwest::Client;
/// use gpu_webmap_portal_http::HttpPortal;
/// use gpu_webmap_portal_http::TokenSettings;
/// use url::Url;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = PortalCredentials::new("urba".to_string(), "password".to_string());
/// let http_client = Client::new()?;
/// let endpoint = Url::parse("https://www.arcgis.com")?;
///
/// let portal = HttpPortal::new(http_client, endpoint, credentials, TokenSettings::default());
/// # Ok(())
/// # }
/// ```
pub struct HttpPortal<C: HttpClient> {
    client: C,
    endpoint: PortalEndpoint,
    credentials: Option<PortalCredentials>,
    token_settings: TokenSettings,
    token: RwLock<Option<Token>>,
    custom_headers: HeaderMap,
}

impl<C: HttpClient> HttpPortal<C>
where
    C::Error: PortalHttpError,
{
    /// Create a new portal client authenticating with `credentials`.
    pub fn new(
        client: C,
        endpoint: Url,
        credentials: PortalCredentials,
        token_settings: TokenSettings,
    ) -> Self {
        Self::with_custom_headers(
            client,
            endpoint,
            Some(credentials),
            token_settings,
            HeaderMap::new(),
        )
    }

    /// Create a new portal client for public content (no token).
    pub fn anonymous(client: C, endpoint: Url) -> Self {
        Self::with_custom_headers(
            client,
            endpoint,
            None,
            TokenSettings::default(),
            HeaderMap::new(),
        )
    }

    /// Create a new portal client with custom headers included in all
    /// requests.
    pub fn with_custom_headers(
        client: C,
        endpoint: Url,
        credentials: Option<PortalCredentials>,
        token_settings: TokenSettings,
        custom_headers: HeaderMap,
    ) -> Self {
        Self {
            client,
            endpoint: PortalEndpoint::from(endpoint),
            credentials,
            token_settings,
            token: RwLock::new(None),
            custom_headers,
        }
    }
}

impl<C: HttpClient> HttpPortal<C>
where
    C::Error: PortalHttpError + StdError + Send + Sync,
{
    /// Current token, requesting a new one when none is cached or the
    /// cached one is about to expire. `None` for anonymous access.
    #[allow(clippy::significant_drop_tightening)]
    async fn token(&self) -> Result<Option<String>, C::Error> {
        let Some(credentials) = &self.credentials else {
            return Ok(None);
        };
        {
            let token = self
                .token
                .read()
                .map_err(|e| C::Error::lock_error(e.to_string()))?;
            if let Some(token) = token
                .as_ref()
                .filter(|t| t.is_fresh(self.token_settings.renew_before))
            {
                return Ok(Some(token.token.clone()));
            }
        }

        debug!(username = %credentials.username, "requesting portal token");
        let form = [
            ("username", credentials.username.clone()),
            ("password", credentials.password().to_string()),
            ("client", "referer".to_string()),
            ("referer", self.endpoint.referer()),
            (
                "expiration",
                (self.token_settings.expiration.as_secs() / 60).to_string(),
            ),
            ("f", "json".to_string()),
        ];
        let token: Token = self
            .client
            .post_form(
                self.endpoint.sharing_url(&["generateToken"]),
                &form,
                &self.custom_headers,
            )
            .await?;
        let value = token.token.clone();
        *self
            .token
            .write()
            .map_err(|e| C::Error::lock_error(e.to_string()))? = Some(token);
        Ok(Some(value))
    }

    /// Parameters extended with `token` when authenticated.
    async fn authorized(
        &self,
        mut params: Vec<(&'static str, String)>,
    ) -> Result<Vec<(&'static str, String)>, C::Error> {
        if let Some(token) = self.token().await? {
            params.push(("token", token));
        }
        Ok(params)
    }

    /// Drop the cached token if the portal rejected it so that the next
    /// request asks for a new one.
    fn forget_rejected_token<T>(&self, result: Result<T, C::Error>) -> Result<T, C::Error> {
        if let Err(err) = &result {
            if err.is_invalid_token() {
                if let Ok(mut token) = self.token.write() {
                    token.take();
                }
            }
        }
        result
    }

    async fn get<T: DeserializeOwned + Send + Sync>(
        &self,
        url: Url,
        params: Vec<(&'static str, String)>,
    ) -> Result<T, C::Error> {
        let params = self.authorized(params).await?;
        let result = self.client.get(url, &params, &self.custom_headers).await;
        self.forget_rejected_token(result)
    }

    async fn post_form<T: DeserializeOwned + Send + Sync>(
        &self,
        url: Url,
        form: Vec<(&'static str, String)>,
    ) -> Result<T, C::Error> {
        let form = self.authorized(form).await?;
        let result = self
            .client
            .post_form(url, &form, &self.custom_headers)
            .await;
        self.forget_rejected_token(result)
    }
}

fn json_format() -> Vec<(&'static str, String)> {
    vec![("f", "json".to_string())]
}

impl<C: HttpClient> Portal for HttpPortal<C>
where
    C::Error: PortalHttpError + StdError + Send + Sync,
{
    type Error = C::Error;

    async fn layer_info(&self, layer: &LayerUrl) -> Result<LayerInfo, Self::Error> {
        self.get(layer.as_url().clone(), json_format()).await
    }

    async fn query(
        &self,
        layer: &LayerUrl,
        query: &FeatureQuery,
    ) -> Result<FeatureSet, Self::Error> {
        self.get(layer.query_url(), query.to_query_pairs()).await
    }

    async fn webmap(&self, id: &ItemId) -> Result<WebMap, Self::Error> {
        let url = self
            .endpoint
            .sharing_url(&["content", "items", id.as_str(), "data"]);
        self.get(url, json_format()).await
    }

    async fn update_webmap(&self, id: &ItemId, webmap: &WebMap) -> Result<UpdateResult, Self::Error> {
        let item: ItemInfo = self
            .get(
                self.endpoint.sharing_url(&["content", "items", id.as_str()]),
                json_format(),
            )
            .await?;
        let text = serde_json::to_string(webmap).map_err(C::Error::encode_error)?;
        let url = self.endpoint.sharing_url(&[
            "content",
            "users",
            &item.owner,
            "items",
            id.as_str(),
            "update",
        ]);
        self.post_form(url, vec![("text", text), ("f", "json".to_string())])
            .await
    }
}
