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

use gpu_webmap_core::FeatureQuery;
use serde_json::json;
use serde_json::Value;

/// Feature layer `n` of the published GPU service.
#[must_use]
pub fn layer_url(n: usize) -> String {
    format!("https://services.arcgis.com/gpu/arcgis/rest/services/psc_75056/FeatureServer/{n}")
}

/// Distinct query issued for the canonical field names.
#[must_use]
pub fn distinct_query() -> FeatureQuery {
    FeatureQuery::distinct(&["TYPEPSC", "STYPEPSC"])
}

/// Symbol class drawing `value`.
#[must_use]
pub fn class(value: &str) -> Value {
    json!({
        "value": value,
        "label": format!("Prescription {value}"),
        "symbol": {"type": "esriSFS", "color": [255, 0, 0, 255], "style": "esriSFSSolid"}
    })
}

/// Grouped unique-value renderer with one class per value.
#[must_use]
pub fn renderer(values: &[&str]) -> Value {
    let infos: Vec<Value> = values.iter().map(|v| class(v)).collect();
    let classes: Vec<Value> = values
        .iter()
        .map(|v| {
            let mut class = class(v);
            if let Some(class) = class.as_object_mut() {
                class.remove("value");
                class.insert("values".into(), json!([[v]]));
            }
            class
        })
        .collect();
    json!({
        "type": "uniqueValue",
        "field1": "TYPEPSC",
        "field2": "STYPEPSC",
        "fieldDelimiter": ",",
        "uniqueValueInfos": infos,
        "uniqueValueGroups": [{"heading": "Prescriptions", "classes": classes}]
    })
}

/// Operational layer with a renderer.
#[must_use]
pub fn layer(title: &str, url: &str, renderer: Value) -> Value {
    json!({
        "id": format!("{title}_layer"),
        "title": title,
        "url": url,
        "layerType": "ArcGISFeatureLayer",
        "visibility": true,
        "layerDefinition": {
            "drawingInfo": {"renderer": renderer, "transparency": 0}
        }
    })
}

#[must_use]
pub fn webmap(layers: Vec<Value>) -> Value {
    json!({
        "operationalLayers": layers,
        "baseMap": {"baseMapLayers": [], "title": "Topographic"},
        "spatialReference": {"wkid": 102100, "latestWkid": 3857},
        "version": "2.31"
    })
}

/// Layer schema with string fields `names`.
#[must_use]
pub fn schema(names: &[&str]) -> Value {
    let fields: Vec<Value> = names
        .iter()
        .map(|name| json!({"name": name, "type": "esriFieldTypeString", "alias": name}))
        .collect();
    json!({"name": "prescription", "geometryType": "esriGeometryPolygon", "fields": fields})
}

/// Distinct query result with (type, subtype) `rows`.
#[must_use]
pub fn distinct_rows(rows: &[(Value, Value)]) -> Value {
    let features: Vec<Value> = rows
        .iter()
        .map(|(t, s)| json!({"attributes": {"TYPEPSC": t, "STYPEPSC": s}}))
        .collect();
    json!({
        "fields": [
            {"name": "TYPEPSC", "type": "esriFieldTypeString"},
            {"name": "STYPEPSC", "type": "esriFieldTypeString"}
        ],
        "features": features
    })
}

#[must_use]
pub fn update_success() -> Value {
    json!({"success": true, "id": crate::WEBMAP_ID})
}
