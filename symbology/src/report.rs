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

//! Per-layer outcomes of a pruning run.

use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use tracing::info;

/// Why a layer was left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Layer is among the leading layers excluded by configuration.
    Excluded,
    /// Title matches no layer category.
    UnrecognizedCategory,
    /// A field key did not resolve. `available` lists the uppercased
    /// field names of the layer.
    FieldNotFound { key: String, available: Vec<String> },
    /// Distinct query returned no rows.
    NoFeatures,
    /// Rows were returned but none encoded to a value.
    NoValues,
    /// The portal stopped returning rows before the distinct query was
    /// complete.
    Truncated,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Excluded => write!(f, "excluded leading layer"),
            Self::UnrecognizedCategory => write!(f, "unrecognized layer category"),
            Self::FieldNotFound { key, available } => {
                write!(f, "field {key} not found (available: {})", available.join(", "))
            }
            Self::NoFeatures => write!(f, "no features"),
            Self::NoValues => write!(f, "no valid values"),
            Self::Truncated => write!(f, "incomplete query result"),
        }
    }
}

/// Outcome of one operational layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerOutcome {
    /// Renderer was rewritten keeping `kept` of `total` classes.
    Filtered { kept: usize, total: usize },
    Skipped(SkipReason),
    /// Processing faulted. Holds the rendered fault.
    Failed(String),
}

impl Display for LayerOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Filtered { kept, total } => write!(f, "kept {kept} of {total} classes"),
            Self::Skipped(reason) => write!(f, "skipped: {reason}"),
            Self::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerReport {
    /// Position in `operationalLayers`.
    pub index: usize,
    pub title: String,
    pub outcome: LayerOutcome,
}

/// One entry per operational layer, in web map order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub layers: Vec<LayerReport>,
}

impl RunReport {
    pub(crate) fn push(&mut self, index: usize, title: &str, outcome: LayerOutcome) {
        self.layers.push(LayerReport {
            index,
            title: title.into(),
            outcome,
        });
    }

    /// Number of layers whose renderer was rewritten.
    #[must_use]
    pub fn filtered(&self) -> usize {
        self.count(|o| matches!(o, LayerOutcome::Filtered { .. }))
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, LayerOutcome::Skipped(_)))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, LayerOutcome::Failed(_)))
    }

    /// Outcome of the layer titled `title`.
    #[must_use]
    pub fn outcome(&self, title: &str) -> Option<&LayerOutcome> {
        self.layers
            .iter()
            .find(|l| l.title == title)
            .map(|l| &l.outcome)
    }

    /// Log one line per layer and a summary.
    pub fn log_summary(&self) {
        for layer in &self.layers {
            info!(index = layer.index, title = %layer.title, "{}", layer.outcome);
        }
        info!(
            filtered = self.filtered(),
            skipped = self.skipped(),
            failed = self.failed(),
            "renderer pruning finished"
        );
    }

    fn count(&self, f: impl Fn(&LayerOutcome) -> bool) -> usize {
        self.layers.iter().filter(|l| f(&l.outcome)).count()
    }
}
