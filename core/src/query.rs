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

//! Feature layer query parameters.
//!
//! [`FeatureQuery`] builds the parameters of the ArcGIS REST `query`
//! operation of a feature layer. Only the subset needed to read attribute
//! values is supported: row predicate (`where`), output fields, distinct
//! values, geometry suppression and paging.
//!
//! ```rust
//! use gpu_webmap_core::FeatureQuery;
//!
//! let query = FeatureQuery::distinct(&["TYPEPSC", "STYPEPSC"]);
//! assert_eq!(
//!     query.to_query_string(),
//!     "where=1=1&outFields=TYPEPSC,STYPEPSC&returnDistinctValues=true&returnGeometry=false&f=json"
//! );
//! ```
//!
//! # References
//!
//! - [ArcGIS REST API, Query (Feature Service/Layer)](https://developers.arcgis.com/rest/services-reference/enterprise/query-feature-service-layer/)

/// Predicate matching every row.
pub const MATCH_ALL: &str = "1=1";

/// Builder of feature layer `query` parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureQuery {
    /// SQL-92 `where` clause.
    where_clause: String,
    /// Fields included in the result. Empty means all fields (`*`).
    out_fields: Vec<String>,
    /// Return distinct combinations of `out_fields`.
    distinct: bool,
    /// Return feature geometry.
    geometry: bool,
    /// Rows skipped before the first returned row.
    offset: Option<usize>,
    /// Page size. The layer's `maxRecordCount` applies when absent.
    record_count: Option<usize>,
}

impl Default for FeatureQuery {
    /// All rows, all fields, no geometry.
    fn default() -> Self {
        Self {
            where_clause: MATCH_ALL.into(),
            out_fields: Vec::new(),
            distinct: false,
            geometry: false,
            offset: None,
            record_count: None,
        }
    }
}

impl FeatureQuery {
    /// Create a new query over all rows and all fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Distinct combinations of `fields` over all rows, without geometry.
    #[must_use]
    pub fn distinct<S: AsRef<str>>(fields: &[S]) -> Self {
        Self::new().out_fields(fields).distinct_values(true)
    }

    /// Replace the row predicate.
    #[must_use]
    pub fn where_clause<S: Into<String>>(mut self, clause: S) -> Self {
        self.where_clause = clause.into();
        self
    }

    /// Replace output fields.
    #[must_use]
    pub fn out_fields<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.out_fields = fields.iter().map(|f| f.as_ref().to_string()).collect();
        self
    }

    /// Request distinct values.
    #[must_use]
    pub const fn distinct_values(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// Request geometry.
    #[must_use]
    pub const fn return_geometry(mut self, geometry: bool) -> Self {
        self.geometry = geometry;
        self
    }

    /// Start the result at row `offset`.
    #[must_use]
    pub const fn result_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub const fn result_record_count(mut self, count: usize) -> Self {
        self.record_count = Some(count);
        self
    }

    #[must_use]
    pub const fn offset(&self) -> Option<usize> {
        self.offset
    }

    /// Output fields of the query.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.out_fields
    }

    /// Parameters as `(name, value)` pairs, suitable for URL encoding.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let out_fields = if self.out_fields.is_empty() {
            "*".to_string()
        } else {
            self.out_fields.join(",")
        };
        let mut pairs = vec![
            ("where", self.where_clause.clone()),
            ("outFields", out_fields),
            ("returnDistinctValues", self.distinct.to_string()),
            ("returnGeometry", self.geometry.to_string()),
        ];
        if let Some(offset) = self.offset {
            pairs.push(("resultOffset", offset.to_string()));
        }
        if let Some(count) = self.record_count {
            pairs.push(("resultRecordCount", count.to_string()));
        }
        pairs.push(("f", "json".to_string()));
        pairs
    }

    /// Parameters joined as a (not percent-encoded) query string.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.to_query_pairs()
            .into_iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}
