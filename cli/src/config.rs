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

//! Configuration file.
//!
//! ```toml
//! portal = "https://www.arcgis.com"
//! username = "gpu_publisher"
//! symbology-dir = "./Symbology"
//! log-file = "gpu_script.log"
//! token-expiration-minutes = 60
//!
//! [http]
//! timeout-secs = 120
//!
//! [prune]
//! skip-leading-layers = 1
//!
//! [prune.field-keys]
//! type-field = "TYPEPSC"
//! subtype-field = "STYPEPSC"
//! ```
//!
//! Every key is optional. Command line arguments take precedence.

use gpu_webmap::PruneConfig;
use gpu_webmap_portal_http::reqwest::ClientParams;
use serde::Deserialize;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::fs::File;
use std::io::Error as IoError;
use std::io::Read as _;
use std::path::Path;
use std::path::PathBuf;
use toml::de::Error as TomlError;
use url::Url;

#[derive(Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Portal root, e.g. `https://www.arcgis.com`.
    pub portal: Option<Url>,
    pub username: Option<String>,
    /// Directory of the `DrawInfo_*.txt` files.
    pub symbology_dir: Option<PathBuf>,
    /// Log file written in addition to stderr.
    pub log_file: Option<PathBuf>,
    /// Requested token lifetime.
    pub token_expiration_minutes: Option<u64>,
    pub http: ClientParams,
    pub prune: PruneConfig,
}

impl Config {
    /// Read configuration from toml file.
    ///
    /// # Errors
    ///
    /// - `Error::Io` if failed to read file
    /// - `Error::Toml` if failed to parse content as TOML / invalid configuration.
    pub fn read(fname: &Path) -> Result<Self, Error> {
        let mut file = File::open(fname).map_err(|err| Error::Io(fname.into(), err))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|err| Error::Io(fname.into(), err))?;
        Self::parse(&content)
    }

    /// # Errors
    ///
    /// Returns `Error::Toml` if `content` is not a valid configuration.
    pub fn parse(content: &str) -> Result<Self, Error> {
        toml::from_str(content).map_err(Error::Toml)
    }
}

#[derive(Debug)]
pub enum Error {
    Io(PathBuf, IoError),
    Toml(TomlError),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Io(path, err) => write!(f, "cannot read {}: {err}", path.display()),
            Self::Toml(err) => write!(f, "configuration file format error: {err}"),
        }
    }
}

impl StdError for Error {}
