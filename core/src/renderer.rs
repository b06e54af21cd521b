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

//! Unique-value renderer
//!
//! Typed view of the ArcGIS `uniqueValue` renderer JSON. Only the keys this
//! workspace interprets are modeled; every other key (symbols, labels,
//! `field1`, `fieldDelimiter`, `authoringInfo`, ...) is kept in a
//! passthrough map so that a read → prune → save round trip does not lose
//! anything.
//!
//! Renderer shape:
//!
//! ```json
//! {
//!   "type": "uniqueValue",
//!   "uniqueValueInfos": [ { "value": "p-05-00", "label": "...", "symbol": {} } ],
//!   "uniqueValueGroups": [
//!     { "heading": "...", "classes": [ { "label": "...", "symbol": {}, "values": [["p-05-00"]] } ] }
//!   ]
//! }
//! ```
//!
//! Invariant kept by [`Renderer::retain_values`]: every value left in
//! `uniqueValueInfos` has exactly one class in `uniqueValueGroups[0].classes`
//! whose `values` is `[[value]]`, in the same order.

use crate::Extra;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

/// Renderer transform errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// Renderer has no `uniqueValueInfos`.
    MissingValueInfos,
    /// Renderer has no `uniqueValueGroups[0]`.
    MissingGroups,
}

impl Display for FilterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::MissingValueInfos => write!(f, "renderer has no uniqueValueInfos"),
            Self::MissingGroups => write!(f, "renderer has no uniqueValueGroups[0]"),
        }
    }
}

impl StdError for FilterError {}

/// Unique-value renderer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Renderer {
    #[serde(flatten)]
    pub extra: Extra,
    /// Symbol classes in drawing / legend order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_value_infos: Option<Vec<UniqueValueInfo>>,
    /// Legend groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_value_groups: Option<Vec<UniqueValueGroup>>,
}

/// Symbol class of a unique-value renderer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UniqueValueInfo {
    /// Match value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<JsonValue>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl UniqueValueInfo {
    /// Class with a string value and passthrough attributes.
    #[must_use]
    pub fn new<S: Into<String>>(value: S, extra: Extra) -> Self {
        Self {
            value: Some(JsonValue::String(value.into())),
            extra,
        }
    }

    /// Match value if it is a string.
    #[must_use]
    pub fn value_str(&self) -> Option<&str> {
        self.value.as_ref().and_then(JsonValue::as_str)
    }
}

/// Legend group of a unique-value renderer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UniqueValueGroup {
    #[serde(flatten)]
    pub extra: Extra,
    #[serde(default)]
    pub classes: Vec<UniqueValueClass>,
}

/// Class of a legend group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UniqueValueClass {
    #[serde(flatten)]
    pub extra: Extra,
    /// Value combinations drawn by this class.
    #[serde(default)]
    pub values: Vec<Vec<JsonValue>>,
}

impl UniqueValueClass {
    /// Group class of a symbol class: the same attributes, `value`
    /// replaced by `values: [[value]]`. A `values` key already present on
    /// the symbol class is overwritten.
    #[must_use]
    pub fn from_info(info: &UniqueValueInfo, value: &str) -> Self {
        let mut extra = info.extra.clone();
        extra.retain(|key, _| key != "values");
        Self {
            extra,
            values: vec![vec![JsonValue::String(value.into())]],
        }
    }

    /// The value if the class draws exactly one single-field combination.
    #[must_use]
    pub fn single_value(&self) -> Option<&str> {
        match self.values.as_slice() {
            [combination] => match combination.as_slice() {
                [value] => value.as_str(),
                _ => None,
            },
            _ => None,
        }
    }
}

impl Renderer {
    /// Number of symbol classes.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.unique_value_infos.as_ref().map_or(0, Vec::len)
    }

    /// Build a renderer that keeps only the classes whose value is in
    /// `existing_values`.
    ///
    /// Surviving classes keep their relative order. The classes of the
    /// first group are rebuilt from the surviving classes; other groups and
    /// all passthrough keys are kept as is. `self` is not modified. An empty
    /// `existing_values` yields a renderer without classes.
    ///
    /// # Errors
    ///
    /// - `FilterError::MissingValueInfos` if there is no `uniqueValueInfos`.
    /// - `FilterError::MissingGroups` if there is no `uniqueValueGroups[0]`.
    pub fn retain_values(&self, existing_values: &HashSet<String>) -> Result<Self, FilterError> {
        let infos = self
            .unique_value_infos
            .as_ref()
            .ok_or(FilterError::MissingValueInfos)?;
        let mut groups = self
            .unique_value_groups
            .clone()
            .ok_or(FilterError::MissingGroups)?;
        let first_group = groups.first_mut().ok_or(FilterError::MissingGroups)?;

        let (kept, classes): (Vec<_>, Vec<_>) = infos
            .iter()
            .filter_map(|info| {
                let value = info.value_str().filter(|v| existing_values.contains(*v))?;
                Some((info.clone(), UniqueValueClass::from_info(info, value)))
            })
            .unzip();
        first_group.classes = classes;

        Ok(Self {
            extra: self.extra.clone(),
            unique_value_infos: Some(kept),
            unique_value_groups: Some(groups),
        })
    }
}
