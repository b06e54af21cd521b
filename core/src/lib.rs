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

//! Core types of `gpu-webmap`
//!
//! This crate holds the pieces shared by every portal implementation:
//! - [`Portal`]: transport-agnostic access to an ArcGIS portal (feature
//!   layer schema and queries, web map items).
//! - [`ItemId`] and [`LayerUrl`]: identifiers of portal items and feature
//!   layer endpoints.
//! - [`FeatureQuery`]: builder of feature layer query parameters.
//! - [`webmap`] and [`renderer`]: typed web map JSON with passthrough of
//!   every key that is not interpreted here.
//! - [`Renderer::retain_values`]: pruning of a unique-value renderer to a
//!   set of existing values.

pub mod feature;
pub mod item;
pub mod portal;
pub mod query;
pub mod renderer;
pub mod webmap;

#[doc(inline)]
pub use feature::Feature;
#[doc(inline)]
pub use feature::FeatureSet;
#[doc(inline)]
pub use feature::Field;
#[doc(inline)]
pub use feature::LayerInfo;
#[doc(inline)]
pub use feature::UpdateResult;
#[doc(inline)]
pub use item::ItemId;
#[doc(inline)]
pub use item::LayerUrl;
#[doc(inline)]
pub use portal::Portal;
#[doc(inline)]
pub use portal::PortalCredentials;
#[doc(inline)]
pub use query::FeatureQuery;
#[doc(inline)]
pub use renderer::FilterError;
#[doc(inline)]
pub use renderer::Renderer;
#[doc(inline)]
pub use renderer::UniqueValueClass;
#[doc(inline)]
pub use renderer::UniqueValueGroup;
#[doc(inline)]
pub use renderer::UniqueValueInfo;
#[doc(inline)]
pub use webmap::DrawingInfo;
#[doc(inline)]
pub use webmap::LayerDefinition;
#[doc(inline)]
pub use webmap::OperationalLayer;
#[doc(inline)]
pub use webmap::WebMap;

/// Passthrough bag for JSON keys that are not modeled explicitly.
pub type Extra = serde_json::Map<String, serde_json::Value>;
