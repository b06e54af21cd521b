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

//! Portal client abstraction
//!
//! This module defines the transport-agnostic [`Portal`] trait, a minimal
//! interface to an ArcGIS portal as needed to prune web map symbology.
//! Implementors provide asynchronous operations to read a feature layer
//! schema, query distinct attribute values, read a web map item and save
//! it back.
//!
//! Operation semantics:
//! - `layer_info` fetches the description of the feature layer at the given
//!   [`LayerUrl`], including its field list.
//! - `query` runs a [`FeatureQuery`] against the layer `query` endpoint.
//! - `webmap` fetches the data (JSON document) of a web map item.
//! - `update_webmap` replaces the data of a web map item. This is the only
//!   write operation and it is expected to be called once per run.
//!
//! Notes for implementors:
//! - The trait is `Send + Sync` and returns `Send` futures to support use in
//!   async runtimes.
//! - Calls are issued sequentially by this workspace; implementations do not
//!   need to retry.
//! - Errors should implement `std::error::Error` and be safely transferable
//!   across threads.

use crate::FeatureQuery;
use crate::FeatureSet;
use crate::ItemId;
use crate::LayerInfo;
use crate::LayerUrl;
use crate::UpdateResult;
use crate::WebMap;
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;

/// Portal trait defines access to the content of an ArcGIS portal.
pub trait Portal: Send + Sync {
    /// Portal Error.
    type Error: StdError + Send + Sync;

    /// Get feature layer description (schema).
    fn layer_info(
        &self,
        layer: &LayerUrl,
    ) -> impl Future<Output = Result<LayerInfo, Self::Error>> + Send;

    /// Query features of the layer.
    fn query(
        &self,
        layer: &LayerUrl,
        query: &FeatureQuery,
    ) -> impl Future<Output = Result<FeatureSet, Self::Error>> + Send;

    /// Get web map item data.
    fn webmap(&self, id: &ItemId) -> impl Future<Output = Result<WebMap, Self::Error>> + Send;

    /// Save web map item data.
    fn update_webmap(
        &self,
        id: &ItemId,
        webmap: &WebMap,
    ) -> impl Future<Output = Result<UpdateResult, Self::Error>> + Send;
}

/// Credentials used to access the portal.
///
/// Security notes:
/// - `Debug`/`Display` redact the password.
/// - Prefer short-lived instances and avoid logging credentials.
#[derive(Clone)]
pub struct PortalCredentials {
    /// Username to access portal.
    pub username: String,
    password: String,
}

impl PortalCredentials {
    /// Create new credentials.
    #[must_use]
    pub const fn new(username: String, password: String) -> Self {
        Self { username, password }
    }

    /// Get password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for PortalCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for PortalCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PortalCredentials(username: {}, password: [REDACTED])",
            self.username
        )
    }
}
