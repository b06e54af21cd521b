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

//! Existing renderer values of a published layer.

use crate::category::attribute_text;
use crate::FieldPair;
use crate::LayerCategory;
use gpu_webmap_core::Feature;
use gpu_webmap_core::FeatureQuery;
use gpu_webmap_core::LayerUrl;
use gpu_webmap_core::Portal;
use std::collections::HashSet;
use tracing::debug;
use tracing::error;
use tracing::warn;

/// Renderer values present in the data of a layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingValues {
    /// Encoded values.
    pub values: HashSet<String>,
    /// Rows returned by the distinct query over all pages, including
    /// skipped ones.
    pub rows: usize,
    /// The portal reported more rows but returned none, so `values` may be
    /// incomplete.
    pub truncated: bool,
}

/// Query distinct (type, subtype) pairs of `layer` and encode them with
/// `category`.
///
/// The query is repeated with `resultOffset` while the portal reports
/// `exceededTransferLimit`, so every page is read. Rows with a `null` or
/// absent attribute are skipped. Nothing is encoded for
/// [`LayerCategory::Unrecognized`].
///
/// # Errors
///
/// Returns the portal error if a query fails.
pub async fn collect_existing_values<P: Portal>(
    portal: &P,
    layer: &LayerUrl,
    fields: &FieldPair,
    category: LayerCategory,
) -> Result<ExistingValues, P::Error> {
    let first_page = FeatureQuery::distinct(&fields.as_array());
    let mut query = first_page.clone();
    let mut existing = ExistingValues::default();
    loop {
        let page = portal.query(layer, &query).await?;
        existing.rows += page.features.len();
        existing.values.extend(
            page.features
                .iter()
                .filter_map(|feature| encode_feature(feature, fields, category)),
        );
        if !page.exceeded_transfer_limit {
            break;
        }
        if page.features.is_empty() {
            warn!(%layer, rows = existing.rows, "transfer limit exceeded on an empty page, result is incomplete");
            existing.truncated = true;
            break;
        }
        debug!(%layer, offset = existing.rows, "transfer limit exceeded, reading next page");
        query = first_page.clone().result_offset(existing.rows);
    }
    Ok(existing)
}

fn encode_feature(feature: &Feature, fields: &FieldPair, category: LayerCategory) -> Option<String> {
    let (Some(type_val), Some(stype_val)) = (
        feature.attribute(&fields.type_field),
        feature.attribute(&fields.subtype_field),
    ) else {
        error!(
            type_field = %fields.type_field,
            subtype_field = %fields.subtype_field,
            "field missing from query result row"
        );
        return None;
    };
    category.encode(&attribute_text(type_val)?, &attribute_text(stype_val)?)
}
