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

//! Expectations for Portal Mock.

use gpu_webmap_core::FeatureQuery;
use gpu_webmap_core::ItemId;
use gpu_webmap_core::LayerUrl;
use serde_json::from_str;
use serde_json::Value as JsonValue;
use std::fmt::Display;

pub type Response<E> = Result<JsonValue, E>;

/// Request expected by Portal.
#[derive(Debug)]
pub enum ExpectedRequest {
    /// Expected layer schema request.
    LayerInfo { layer: LayerUrl },
    /// Expected layer query.
    Query { layer: LayerUrl, query: FeatureQuery },
    /// Expected web map read.
    WebMap { id: ItemId },
    /// Expected web map update. `request: None` accepts any document.
    UpdateWebMap {
        id: ItemId,
        request: Option<JsonValue>,
    },
}

/// Expectation for the tests.
#[derive(Debug)]
pub struct Expect<E> {
    pub request: ExpectedRequest,
    pub response: Response<E>,
}

fn layer_url(url: impl Display) -> LayerUrl {
    LayerUrl::parse(&url.to_string()).expect("invalid layer url")
}

fn json(v: impl Display) -> JsonValue {
    from_str(&v.to_string()).expect("invalid json")
}

impl<E> Expect<E> {
    pub fn layer_info(url: impl Display, response: impl Display) -> Self {
        Expect {
            request: ExpectedRequest::LayerInfo {
                layer: layer_url(url),
            },
            response: Ok(json(response)),
        }
    }

    pub fn query(url: impl Display, query: FeatureQuery, response: impl Display) -> Self {
        Expect {
            request: ExpectedRequest::Query {
                layer: layer_url(url),
                query,
            },
            response: Ok(json(response)),
        }
    }

    pub fn webmap(id: impl Display, response: impl Display) -> Self {
        Expect {
            request: ExpectedRequest::WebMap {
                id: id.to_string().into(),
            },
            response: Ok(json(response)),
        }
    }

    pub fn update_webmap(id: impl Display, response: impl Display) -> Self {
        Expect {
            request: ExpectedRequest::UpdateWebMap {
                id: id.to_string().into(),
                request: None,
            },
            response: Ok(json(response)),
        }
    }

    pub fn update_webmap_with(
        id: impl Display,
        request: impl Display,
        response: impl Display,
    ) -> Self {
        Expect {
            request: ExpectedRequest::UpdateWebMap {
                id: id.to_string().into(),
                request: Some(json(request)),
            },
            response: Ok(json(response)),
        }
    }

    /// Same request, answered with `err`.
    #[must_use]
    pub fn fail(self, err: E) -> Self {
        Expect {
            request: self.request,
            response: Err(err),
        }
    }
}
