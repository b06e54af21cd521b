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

//! Layer categories and renderer value encoding.
//!
//! GPU prescription layers come in three geometries. The symbology files
//! key their classes with a string built from the `TYPEPSC` / `STYPEPSC`
//! pair, using a different convention per geometry:
//!
//! | title contains | category | value |
//! |---|---|---|
//! | `surf` | [`LayerCategory::Surface`] | `p-{type}-{stype}` |
//! | `lin`  | [`LayerCategory::Line`]    | `P L {type} {stype}` |
//! | `pct`  | [`LayerCategory::Point`]   | `P P {type} {stype}` |
//!
//! The test is case-insensitive and checked in table order.

use serde_json::Value as JsonValue;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

/// Category of a thematic layer derived from its title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerCategory {
    Surface,
    Line,
    Point,
    Unrecognized,
}

impl LayerCategory {
    /// Category of the layer titled `title`.
    #[must_use]
    pub fn from_title(title: &str) -> Self {
        let title = title.to_lowercase();
        if title.contains("surf") {
            Self::Surface
        } else if title.contains("lin") {
            Self::Line
        } else if title.contains("pct") {
            Self::Point
        } else {
            Self::Unrecognized
        }
    }

    /// Renderer value of a (type, subtype) pair. `None` for
    /// [`LayerCategory::Unrecognized`].
    #[must_use]
    pub fn encode(self, type_val: &str, stype_val: &str) -> Option<String> {
        match self {
            Self::Surface => Some(format!("p-{type_val}-{stype_val}")),
            Self::Line => Some(format!("P L {type_val} {stype_val}")),
            Self::Point => Some(format!("P P {type_val} {stype_val}")),
            Self::Unrecognized => None,
        }
    }

    #[must_use]
    pub const fn is_recognized(self) -> bool {
        !matches!(self, Self::Unrecognized)
    }
}

impl Display for LayerCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Surface => "surface".fmt(f),
            Self::Line => "line".fmt(f),
            Self::Point => "point".fmt(f),
            Self::Unrecognized => "unrecognized".fmt(f),
        }
    }
}

/// Renderer value of a (type, subtype) pair for the layer titled `title`.
#[must_use]
pub fn encode(title: &str, type_val: &str, stype_val: &str) -> Option<String> {
    LayerCategory::from_title(title).encode(type_val, stype_val)
}

/// Text of an attribute value as interpolated in renderer values. `None`
/// for `null`.
#[must_use]
pub fn attribute_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
