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

//! Errors of web map processing.
//!
//! [`Error`] is fatal for a run. [`LayerFault`] only concerns one layer:
//! the layer is reported as failed and processing continues.

use gpu_webmap_core::FilterError;
use gpu_webmap_core::ItemId;
use gpu_webmap_core::Portal;
use std::error::Error as StdError;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use url::ParseError;

/// Run-level errors.
pub enum Error<P: Portal> {
    /// Failed to read the web map.
    Portal(P::Error),
    /// Failed to save the web map.
    Persist(P::Error),
    /// Portal answered the save with `success: false`.
    PersistRejected(ItemId),
}

impl<P: Portal> Display for Error<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Portal(err) => write!(f, "portal error: {err}"),
            Self::Persist(err) => write!(f, "failed to update web map: {err}"),
            Self::PersistRejected(id) => write!(f, "portal rejected update of web map {id}"),
        }
    }
}

impl<P: Portal> Debug for Error<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Portal(err) => f.debug_tuple("Portal").field(err).finish(),
            Self::Persist(err) => f.debug_tuple("Persist").field(err).finish(),
            Self::PersistRejected(id) => f.debug_tuple("PersistRejected").field(id).finish(),
        }
    }
}

impl<P: Portal> StdError for Error<P>
where
    P::Error: 'static,
{
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Portal(err) | Self::Persist(err) => Some(err),
            Self::PersistRejected(_) => None,
        }
    }
}

/// Fault while processing one layer.
pub enum LayerFault<P: Portal> {
    /// Layer has no `url`.
    MissingUrl,
    /// Layer `url` is not an absolute URL.
    InvalidUrl(String, ParseError),
    /// Layer has no `layerDefinition.drawingInfo.renderer`.
    MissingRenderer,
    /// Failed to read the layer schema.
    Schema(P::Error),
    /// Distinct values query failed.
    Query(P::Error),
    /// Renderer is not a grouped unique-value renderer.
    Filter(FilterError),
}

impl<P: Portal> Display for LayerFault<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::MissingUrl => write!(f, "layer has no url"),
            Self::InvalidUrl(url, err) => write!(f, "invalid layer url {url}: {err}"),
            Self::MissingRenderer => write!(f, "layer has no renderer"),
            Self::Schema(err) => write!(f, "failed to read layer schema: {err}"),
            Self::Query(err) => write!(f, "distinct values query failed: {err}"),
            Self::Filter(err) => write!(f, "renderer filtering failed: {err}"),
        }
    }
}

impl<P: Portal> Debug for LayerFault<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::MissingUrl => f.write_str("MissingUrl"),
            Self::InvalidUrl(url, err) => f.debug_tuple("InvalidUrl").field(url).field(err).finish(),
            Self::MissingRenderer => f.write_str("MissingRenderer"),
            Self::Schema(err) => f.debug_tuple("Schema").field(err).finish(),
            Self::Query(err) => f.debug_tuple("Query").field(err).finish(),
            Self::Filter(err) => f.debug_tuple("Filter").field(err).finish(),
        }
    }
}

impl<P: Portal> StdError for LayerFault<P> where P::Error: 'static {}
