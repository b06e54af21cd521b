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

use crate::HttpClient;
use crate::Params;
use crate::PortalHttpError;
use http::HeaderMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Error reported by the REST API in a successful HTTP response:
/// `{"error": {"code": 498, "message": "Invalid token.", "details": []}}`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RestError {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RestErrorEnvelope {
    error: RestError,
}

#[derive(Debug)]
pub enum PortalError {
    ReqwestError(reqwest::Error),
    JsonError(serde_path_to_error::Error<serde_json::Error>),
    InvalidResponse(Box<reqwest::Response>),
    Rest(RestError),
    Encode(serde_json::Error),
    LockError(String),
}

impl From<reqwest::Error> for PortalError {
    fn from(value: reqwest::Error) -> Self {
        Self::ReqwestError(value)
    }
}

impl PortalHttpError for PortalError {
    fn is_invalid_token(&self) -> bool {
        match self {
            Self::Rest(err) => err.code == 498 || err.code == 499,
            _ => false,
        }
    }

    fn lock_error(reason: String) -> Self {
        Self::LockError(reason)
    }

    fn encode_error(err: serde_json::Error) -> Self {
        Self::Encode(err)
    }
}

#[allow(clippy::absolute_paths)]
impl std::fmt::Display for PortalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReqwestError(e) => write!(f, "HTTP client error: {e:?}"),
            Self::InvalidResponse(response) => {
                write!(f, "Invalid HTTP response: {}", response.status())
            }
            Self::Rest(e) => {
                write!(f, "portal error {}: {}", e.code, e.message)?;
                if !e.details.is_empty() {
                    write!(f, " ({})", e.details.join("; "))?;
                }
                Ok(())
            }
            Self::Encode(e) => write!(f, "JSON serialization error: {e}"),
            Self::LockError(r) => write!(f, "Token cache lock error {r:?}"),
            Self::JsonError(e) => write!(
                f,
                "JSON deserialization error at line {} column {} path {}: {e}",
                e.inner().line(),
                e.inner().column(),
                e.path(),
            ),
        }
    }
}

#[allow(clippy::absolute_paths)]
impl std::error::Error for PortalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReqwestError(e) => Some(e),
            Self::JsonError(e) => Some(e.inner()),
            Self::Encode(e) => Some(e),
            _ => None,
        }
    }
}

/// Settings of the reqwest HTTP client, readable from the `[http]` table
/// of a configuration file.
///
/// ```rust
/// use gpu_webmap_portal_http::reqwest::ClientParams;
///
/// let params = ClientParams::default().timeout_secs(30).accept_invalid_certs(true);
/// assert_eq!(params.connect_timeout_secs, Some(10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClientParams {
    /// Whole request timeout. `None` waits forever.
    pub timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    pub user_agent: String,
    /// Accept self-signed certificates of on-premise portals.
    pub accept_invalid_certs: bool,
    pub max_redirects: usize,
}

impl Default for ClientParams {
    fn default() -> Self {
        Self {
            timeout_secs: Some(120),
            connect_timeout_secs: Some(10),
            user_agent: concat!("gpu-webmap/", env!("CARGO_PKG_VERSION")).into(),
            accept_invalid_certs: false,
            max_redirects: 10,
        }
    }
}

impl ClientParams {
    #[must_use]
    pub const fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    #[must_use]
    pub const fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }
}

/// [`HttpClient`] over a rustls `reqwest::Client`.
///
/// ```rust,no_run
/// use gpu_webmap_portal_http::reqwest::Client;
/// use gpu_webmap_portal_http::reqwest::ClientParams;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::with_params(&ClientParams::default().timeout_secs(60))?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    client: reqwest::Client,
}

#[allow(clippy::missing_errors_doc)]
impl Client {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_params(&ClientParams::default())
    }

    pub fn with_params(params: &ClientParams) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .user_agent(params.user_agent.as_str())
            .danger_accept_invalid_certs(params.accept_invalid_certs)
            .redirect(reqwest::redirect::Policy::limited(params.max_redirects));
        if let Some(secs) = params.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = params.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Client {
    async fn handle_response<T>(&self, response: reqwest::Response) -> Result<T, PortalError>
    where
        T: DeserializeOwned,
    {
        if !response.status().is_success() {
            return Err(PortalError::InvalidResponse(Box::new(response)));
        }

        let value: serde_json::Value = response.json().await.map_err(PortalError::ReqwestError)?;

        // REST API reports most failures with HTTP 200.
        if value.get("error").is_some() {
            if let Ok(envelope) = serde_json::from_value::<RestErrorEnvelope>(value.clone()) {
                return Err(PortalError::Rest(envelope.error));
            }
        }

        serde_path_to_error::deserialize(value).map_err(PortalError::JsonError)
    }
}

impl HttpClient for Client {
    type Error = PortalError;

    async fn get<T>(
        &self,
        url: Url,
        params: &Params,
        custom_headers: &HeaderMap,
    ) -> Result<T, Self::Error>
    where
        T: DeserializeOwned,
    {
        let response = self
            .client
            .get(url)
            .headers(custom_headers.clone())
            .query(params)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn post_form<T>(
        &self,
        url: Url,
        form: &Params,
        custom_headers: &HeaderMap,
    ) -> Result<T, Self::Error>
    where
        T: DeserializeOwned + Send + Sync,
    {
        let response = self
            .client
            .post(url)
            .headers(custom_headers.clone())
            .form(form)
            .send()
            .await?;
        self.handle_response(response).await
    }
}
