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

//! Stored drawing info applied to layers by title.

use crate::driver::persist_webmap;
use crate::error::Error;
use gpu_webmap_core::DrawingInfo;
use gpu_webmap_core::ItemId;
use gpu_webmap_core::Portal;
use gpu_webmap_core::WebMap;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::fs;
use std::io::Error as IoError;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;
use tracing::error;
use tracing::info;

/// Title fragment to symbology file, first match wins.
pub const SYMBOLOGY_FILES: [(&str, &str); 4] = [
    ("prescription_pct", "DrawInfo_PCT.txt"),
    ("prescription_lin", "DrawInfo_LIN.txt"),
    ("prescription_surf", "DrawInfo_SURF.txt"),
    ("zone_urba", "DrawInfo_ZU.txt"),
];

/// Default location of the symbology files.
pub const DEFAULT_SYMBOLOGY_DIR: &str = "./Symbology";

#[derive(Debug)]
pub enum SymbologyError {
    Io(PathBuf, IoError),
    Json(PathBuf, serde_json::Error),
}

impl Display for SymbologyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Io(path, err) => write!(f, "cannot read {}: {err}", path.display()),
            Self::Json(path, err) => write!(f, "invalid drawing info in {}: {err}", path.display()),
        }
    }
}

impl StdError for SymbologyError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(_, err) => Some(err),
            Self::Json(_, err) => Some(err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbologyOutcome {
    /// Drawing info replaced with the content of `file`.
    Applied { file: PathBuf },
    /// Title matches no symbology file.
    NoMatch,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSymbology {
    pub index: usize,
    pub title: String,
    pub outcome: SymbologyOutcome,
}

/// Directory of stored drawing info files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbologyCatalog {
    dir: PathBuf,
}

impl Default for SymbologyCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_SYMBOLOGY_DIR)
    }
}

impl SymbologyCatalog {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Symbology file name for a layer title.
    #[must_use]
    pub fn file_for(title: &str) -> Option<&'static str> {
        let title = title.to_lowercase();
        SYMBOLOGY_FILES
            .iter()
            .find(|(fragment, _)| title.contains(fragment))
            .map(|(_, file)| *file)
    }

    /// Read drawing info `file`, trying its lowercase name when it does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if neither file can be read or the content is not
    /// a drawing info object.
    pub fn load(&self, file: &str) -> Result<(PathBuf, DrawingInfo), SymbologyError> {
        let path = self.dir.join(file);
        let (path, content) = match fs::read_to_string(&path) {
            Ok(content) => (path, content),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                let lower = self.dir.join(file.to_lowercase());
                debug!(path = %path.display(), fallback = %lower.display(), "symbology file not found");
                let content =
                    fs::read_to_string(&lower).map_err(|err| SymbologyError::Io(lower.clone(), err))?;
                (lower, content)
            }
            Err(err) => return Err(SymbologyError::Io(path, err)),
        };
        let drawing_info =
            serde_json::from_str(&content).map_err(|err| SymbologyError::Json(path.clone(), err))?;
        Ok((path, drawing_info))
    }

    /// Replace the drawing info of every layer whose title selects a
    /// symbology file. A layer that fails is reported and the others are
    /// still processed.
    pub fn apply(&self, webmap: &mut WebMap) -> Vec<LayerSymbology> {
        webmap
            .operational_layers
            .iter_mut()
            .enumerate()
            .map(|(index, layer)| {
                let title = layer.title().to_owned();
                let outcome = match Self::file_for(&title) {
                    None => SymbologyOutcome::NoMatch,
                    Some(file) => match self.load(file) {
                        Ok((file, drawing_info)) => {
                            layer.set_drawing_info(drawing_info);
                            info!(%title, file = %file.display(), "symbology applied");
                            SymbologyOutcome::Applied { file }
                        }
                        Err(err) => {
                            error!(%title, %err, "failed to apply symbology");
                            SymbologyOutcome::Failed(err.to_string())
                        }
                    },
                };
                LayerSymbology {
                    index,
                    title,
                    outcome,
                }
            })
            .collect()
    }

    /// Read web map `id`, apply stored symbology and save it.
    ///
    /// # Errors
    ///
    /// Returns an error if the web map cannot be read or saved.
    pub async fn apply_webmap<P: Portal>(
        &self,
        portal: &P,
        id: &ItemId,
    ) -> Result<Vec<LayerSymbology>, Error<P>> {
        info!(%id, dir = %self.dir.display(), "applying stored symbology");
        let mut webmap = portal.webmap(id).await.map_err(Error::Portal)?;
        let layers = self.apply(&mut webmap);
        persist_webmap(portal, id, &webmap).await?;
        Ok(layers)
    }
}
