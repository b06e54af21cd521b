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

//! Renderer pruning of a saved web map.
//!
//! Each operational layer is processed in order. Faults of one layer are
//! recorded in the [`RunReport`] and never stop the following layers. The
//! web map is saved once, after the last layer.

use crate::collector::collect_existing_values;
use crate::error::Error;
use crate::error::LayerFault;
use crate::fields::available_fields;
use crate::report::LayerOutcome;
use crate::report::RunReport;
use crate::report::SkipReason;
use crate::FieldKeys;
use crate::FieldPair;
use crate::LayerCategory;
use gpu_webmap_core::ItemId;
use gpu_webmap_core::LayerUrl;
use gpu_webmap_core::OperationalLayer;
use gpu_webmap_core::Portal;
use gpu_webmap_core::WebMap;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

/// Pruning settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PruneConfig {
    /// Number of leading operational layers left untouched. The first
    /// layer of a published map is the reference layer.
    pub skip_leading_layers: usize,
    pub field_keys: FieldKeys,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            skip_leading_layers: 1,
            field_keys: FieldKeys::default(),
        }
    }
}

/// Drops renderer classes whose value does not occur in the layer data.
pub struct RendererPruner<P: Portal> {
    portal: Arc<P>,
    config: PruneConfig,
}

impl<P: Portal> RendererPruner<P> {
    #[must_use]
    pub const fn new(portal: Arc<P>, config: PruneConfig) -> Self {
        Self { portal, config }
    }

    #[must_use]
    pub const fn config(&self) -> &PruneConfig {
        &self.config
    }

    /// Read web map `id`, prune the renderers of its layers and save it.
    ///
    /// # Errors
    ///
    /// Returns an error if the web map cannot be read or saved. Layer
    /// faults are reported in the returned [`RunReport`].
    pub async fn prune_webmap(&self, id: &ItemId) -> Result<RunReport, Error<P>> {
        info!(%id, "pruning web map renderers");
        let mut webmap = self.portal.webmap(id).await.map_err(Error::Portal)?;
        let report = self.prune_layers(&mut webmap).await;
        report.log_summary();
        persist_webmap(self.portal.as_ref(), id, &webmap).await?;
        Ok(report)
    }

    /// Prune the renderers of `webmap` in place without saving it.
    pub async fn prune_layers(&self, webmap: &mut WebMap) -> RunReport {
        let mut report = RunReport::default();
        for (index, layer) in webmap.operational_layers.iter_mut().enumerate() {
            let title = layer.title().to_owned();
            if index < self.config.skip_leading_layers {
                debug!(index, %title, "leading layer excluded");
                report.push(index, &title, LayerOutcome::Skipped(SkipReason::Excluded));
                continue;
            }
            info!(index, %title, "processing layer");
            let outcome = match self.prune_layer(layer).await {
                Ok(outcome) => outcome,
                Err(fault) => {
                    error!(%title, %fault, "layer processing failed");
                    LayerOutcome::Failed(fault.to_string())
                }
            };
            report.push(index, &title, outcome);
        }
        report
    }

    async fn prune_layer(&self, layer: &mut OperationalLayer) -> Result<LayerOutcome, LayerFault<P>> {
        let title = layer.title().to_owned();
        let category = LayerCategory::from_title(&title);
        if !category.is_recognized() {
            warn!(%title, "layer category not recognized, no value can be encoded");
            return Ok(LayerOutcome::Skipped(SkipReason::UnrecognizedCategory));
        }
        let url = layer.url.as_deref().ok_or(LayerFault::MissingUrl)?;
        let url = LayerUrl::parse(url).map_err(|err| LayerFault::InvalidUrl(url.into(), err))?;
        if layer.renderer().is_none() {
            return Err(LayerFault::MissingRenderer);
        }

        let info = self.portal.layer_info(&url).await.map_err(LayerFault::Schema)?;
        let fields = match FieldPair::resolve(&info.fields, &self.config.field_keys) {
            Ok(fields) => fields,
            Err(key) => {
                let available = available_fields(&info.fields);
                warn!(%title, key, ?available, "field not found");
                return Ok(LayerOutcome::Skipped(SkipReason::FieldNotFound {
                    key: key.into(),
                    available,
                }));
            }
        };
        debug!(%title, type_field = %fields.type_field, subtype_field = %fields.subtype_field, "fields resolved");

        let existing = collect_existing_values(self.portal.as_ref(), &url, &fields, category)
            .await
            .map_err(LayerFault::Query)?;
        if existing.truncated {
            warn!(%title, rows = existing.rows, "incomplete distinct values, renderer left unchanged");
            return Ok(LayerOutcome::Skipped(SkipReason::Truncated));
        }
        if existing.rows == 0 {
            warn!(%title, "no features");
            return Ok(LayerOutcome::Skipped(SkipReason::NoFeatures));
        }
        if existing.values.is_empty() {
            warn!(%title, rows = existing.rows, "no valid values");
            return Ok(LayerOutcome::Skipped(SkipReason::NoValues));
        }
        debug!(%title, values = existing.values.len(), "existing values collected");

        let renderer = layer.renderer().ok_or(LayerFault::MissingRenderer)?;
        let total = renderer.class_count();
        let filtered = renderer
            .retain_values(&existing.values)
            .map_err(LayerFault::Filter)?;
        let kept = filtered.class_count();
        if kept == 0 {
            warn!(%title, total, "no renderer class matches the layer data");
        }
        layer.set_renderer(filtered);
        info!(%title, kept, total, "renderer filtered");
        Ok(LayerOutcome::Filtered { kept, total })
    }
}

/// Save `webmap` as the data of item `id`.
///
/// # Errors
///
/// Returns [`Error::Persist`] if the portal call fails and
/// [`Error::PersistRejected`] if the portal reports no success.
pub async fn persist_webmap<P: Portal>(
    portal: &P,
    id: &ItemId,
    webmap: &WebMap,
) -> Result<(), Error<P>> {
    let result = portal.update_webmap(id, webmap).await.map_err(|err| {
        error!(%id, %err, "failed to update web map");
        Error::Persist(err)
    })?;
    if result.success {
        info!(%id, "web map updated");
        Ok(())
    } else {
        error!(%id, "portal rejected web map update");
        Err(Error::PersistRejected(id.clone()))
    }
}
