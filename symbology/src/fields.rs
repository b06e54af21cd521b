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

//! Attribute field resolution.
//!
//! Published shapefiles do not always keep the canonical field names:
//! depending on the producer the prescription type can be `TYPEPSC`,
//! `typepsc` or `TYPEPSC_1`. Fields are resolved by canonical key, first by
//! case-insensitive equality, then by the first field (in schema order)
//! whose uppercased name contains the key.
//!
//! Names are compared uppercased, so several fields can be equal to the
//! key. The last of them in schema order wins. The substring fallback keeps
//! the first match.

use gpu_webmap_core::Field;
use serde::Deserialize;

/// Canonical keys of the (type, subtype) attribute pair.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FieldKeys {
    pub type_field: String,
    pub subtype_field: String,
}

impl Default for FieldKeys {
    fn default() -> Self {
        Self {
            type_field: "TYPEPSC".into(),
            subtype_field: "STYPEPSC".into(),
        }
    }
}

/// Actual names of the (type, subtype) fields of a layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPair {
    pub type_field: String,
    pub subtype_field: String,
}

impl FieldPair {
    /// Resolve both keys against `fields`.
    ///
    /// # Errors
    ///
    /// Returns the first key that does not resolve.
    pub fn resolve<'a>(fields: &[Field], keys: &'a FieldKeys) -> Result<Self, &'a str> {
        let type_field = resolve_field(fields, &keys.type_field);
        let subtype_field = resolve_field(fields, &keys.subtype_field);
        match (type_field, subtype_field) {
            (Some(type_field), Some(subtype_field)) => Ok(Self {
                type_field: type_field.into(),
                subtype_field: subtype_field.into(),
            }),
            (None, _) => Err(&keys.type_field),
            (_, None) => Err(&keys.subtype_field),
        }
    }

    /// Output fields of the distinct query.
    #[must_use]
    pub fn as_array(&self) -> [&str; 2] {
        [self.type_field.as_str(), self.subtype_field.as_str()]
    }
}

/// Name of the field matching `key`, if any.
#[must_use]
pub fn resolve_field<'a>(fields: &'a [Field], key: &str) -> Option<&'a str> {
    let key = key.to_uppercase();
    fields
        .iter()
        .rev()
        .find(|f| f.name.to_uppercase() == key)
        .or_else(|| fields.iter().find(|f| f.name.to_uppercase().contains(&key)))
        .map(|f| f.name.as_str())
}

/// Uppercased field names, used in diagnostics.
#[must_use]
pub fn available_fields(fields: &[Field]) -> Vec<String> {
    fields.iter().map(|f| f.name.to_uppercase()).collect()
}
