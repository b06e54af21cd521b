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

//! Web map item data
//!
//! Typed view of the JSON document stored as the data of a `Web Map` item.
//! Operational layers are kept in map order; the drawing order and the
//! legend order of the map depend on it.

use crate::Extra;
use crate::Renderer;
use serde::Deserialize;
use serde::Serialize;

/// Web map document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WebMap {
    /// Thematic layers, bottom to top.
    #[serde(default)]
    pub operational_layers: Vec<OperationalLayer>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Operational layer of a web map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperationalLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Feature layer endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_definition: Option<LayerDefinition>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Layer definition overrides of an operational layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LayerDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drawing_info: Option<DrawingInfo>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Drawing info: renderer plus labeling and transparency settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DrawingInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<Renderer>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl OperationalLayer {
    /// Layer title, empty if absent.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    /// Renderer at `layerDefinition.drawingInfo.renderer`.
    #[must_use]
    pub fn renderer(&self) -> Option<&Renderer> {
        self.layer_definition
            .as_ref()
            .and_then(|d| d.drawing_info.as_ref())
            .and_then(|d| d.renderer.as_ref())
    }

    /// Replace the renderer, creating the enclosing definitions if needed.
    pub fn set_renderer(&mut self, renderer: Renderer) {
        self.layer_definition
            .get_or_insert_with(LayerDefinition::default)
            .drawing_info
            .get_or_insert_with(DrawingInfo::default)
            .renderer = Some(renderer);
    }

    /// Replace the whole drawing info.
    pub fn set_drawing_info(&mut self, drawing_info: DrawingInfo) {
        self.layer_definition
            .get_or_insert_with(LayerDefinition::default)
            .drawing_info = Some(drawing_info);
    }
}
