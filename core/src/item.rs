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

//! Portal identifiers
//!
//! Minimal wrappers for the identifiers used to address portal content:
//! - [`ItemId`]: identifier of a portal item (for example a web map),
//!   a 32 characters hexadecimal string in ArcGIS Online.
//! - [`LayerUrl`]: absolute URL of a feature layer endpoint as stored in
//!   the `url` property of a web map operational layer.
//!
//! Notes
//! - [`ItemId`] is semantic-unaware; it does not validate content.
//! - Formatting/Display returns the raw underlying string.
//!
//! Example
//! ```rust
//! use gpu_webmap_core::LayerUrl;
//!
//! let layer = LayerUrl::parse("https://services.arcgis.com/org/arcgis/rest/services/plu/FeatureServer/1").unwrap();
//! assert_eq!(
//!     layer.query_url().as_str(),
//!     "https://services.arcgis.com/org/arcgis/rest/services/plu/FeatureServer/1/query"
//! );
//! ```

use core::fmt::Display;
use core::fmt::Formatter;
use core::fmt::Result as FmtResult;
use serde::Deserialize;
use serde::Serialize;
use url::ParseError;
use url::Url;

/// Identifier of a portal item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        self.0.fmt(f)
    }
}

/// URL of a feature layer endpoint (`.../FeatureServer/<n>`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct LayerUrl(Url);

impl LayerUrl {
    /// Parse layer URL.
    ///
    /// # Errors
    ///
    /// Returns error if `s` is not an absolute URL.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        Url::parse(s.trim_end_matches('/')).map(Self)
    }

    /// Endpoint of the layer resource itself (schema description).
    #[must_use]
    pub const fn as_url(&self) -> &Url {
        &self.0
    }

    /// Endpoint of the layer `query` operation.
    #[must_use]
    pub fn query_url(&self) -> Url {
        let mut url = self.0.clone();
        let path = format!("{}/query", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url
    }
}

impl From<Url> for LayerUrl {
    fn from(url: Url) -> Self {
        Self(url)
    }
}

impl Display for LayerUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        self.0.fmt(f)
    }
}
