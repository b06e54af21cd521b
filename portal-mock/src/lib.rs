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

pub mod expect;

#[doc(inline)]
pub use expect::Expect;
pub use expect::ExpectedRequest;

use gpu_webmap_core::FeatureQuery;
use gpu_webmap_core::FeatureSet;
use gpu_webmap_core::ItemId;
use gpu_webmap_core::LayerInfo;
use gpu_webmap_core::LayerUrl;
use gpu_webmap_core::Portal as GpuWebmapPortal;
use gpu_webmap_core::UpdateResult;
use gpu_webmap_core::WebMap;
use serde::de::DeserializeOwned;
use serde_json::from_value;
use serde_json::to_value;
use serde_json::Error as JsonError;
use serde_json::Value as JsonValue;
use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::sync::Mutex;
use std::sync::PoisonError;

#[derive(Debug)]
pub enum Error {
    ErrorResponse(Box<dyn StdError + Send + Sync>),
    MutexLock(String),
    NothingIsExpected,
    BadResponseJson(JsonError),
    UnexpectedLayerInfo(LayerUrl, ExpectedRequest),
    UnexpectedQuery(LayerUrl, String, ExpectedRequest),
    UnexpectedWebMap(ItemId, ExpectedRequest),
    UnexpectedUpdate(ItemId, String, ExpectedRequest),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::ErrorResponse(err) => write!(f, "response: {err}"),
            Self::MutexLock(err) => write!(f, "lock error: {err}"),
            Self::NothingIsExpected => {
                write!(f, "nothing is expected to happen but something happened")
            }
            Self::BadResponseJson(err) => write!(f, "bad json response: {err}"),
            Self::UnexpectedLayerInfo(layer, expected) => {
                write!(f, "unexpected layer info: {layer}; expected: {expected:?}")
            }
            Self::UnexpectedQuery(layer, query, expected) => {
                write!(
                    f,
                    "unexpected query: {layer}; query: {query} expected: {expected:?}"
                )
            }
            Self::UnexpectedWebMap(id, expected) => {
                write!(f, "unexpected web map: {id}; expected: {expected:?}")
            }
            Self::UnexpectedUpdate(id, json, expected) => {
                write!(
                    f,
                    "unexpected update: {id}; json: {json} expected: {expected:?}"
                )
            }
        }
    }
}

impl StdError for Error {}

impl Error {
    pub fn mutex_lock<T>(err: PoisonError<T>) -> Self {
        Self::MutexLock(err.to_string())
    }
}

/// Portal answering requests from a queue of expectations.
///
/// Every request pops the first expectation; a request that does not match
/// it fails with one of the `Unexpected*` errors. Web maps received by
/// `update_webmap` are recorded.
pub struct Portal<E> {
    expect: Mutex<VecDeque<Expect<E>>>,
    updates: Mutex<Vec<JsonValue>>,
}

impl<E> Default for Portal<E> {
    fn default() -> Self {
        Self {
            expect: Mutex::new(VecDeque::new()),
            updates: Mutex::new(Vec::new()),
        }
    }
}

impl<E> Portal<E> {
    /// Replace all expectations with `exp`.
    pub fn expect(&self, exp: Expect<E>) {
        let expect: &mut VecDeque<Expect<E>> = &mut self.expect.lock().expect("not poisoned");
        expect.clear();
        expect.push_front(exp);
    }

    /// Append `exp` after the current expectations.
    pub fn then(&self, exp: Expect<E>) -> &Self {
        self.expect.lock().expect("not poisoned").push_back(exp);
        self
    }

    /// Number of expectations not consumed yet.
    pub fn remaining(&self) -> usize {
        self.expect.lock().expect("not poisoned").len()
    }

    /// Web maps received by `update_webmap`, as JSON.
    pub fn updates(&self) -> Vec<JsonValue> {
        self.updates.lock().expect("not poisoned").clone()
    }

    pub fn debug_expect(&self) {
        let expect: &VecDeque<Expect<E>> = &self.expect.lock().expect("not poisoned");
        println!("Expectations (total: {})", expect.len());
        for v in expect {
            println!("{:#?}", v.request);
        }
    }

    fn next(&self) -> Result<Expect<E>, Error> {
        self.expect
            .lock()
            .map_err(Error::mutex_lock)?
            .pop_front()
            .ok_or(Error::NothingIsExpected)
    }
}

fn respond<T, E>(response: Result<JsonValue, E>) -> Result<T, Error>
where
    T: DeserializeOwned,
    E: StdError + Send + Sync + 'static,
{
    let response = response.map_err(|err| Error::ErrorResponse(Box::new(err)))?;
    from_value(response).map_err(Error::BadResponseJson)
}

impl<E> GpuWebmapPortal for Portal<E>
where
    E: StdError + Send + Sync + 'static,
{
    type Error = Error;

    async fn layer_info(&self, in_layer: &LayerUrl) -> Result<LayerInfo, Self::Error> {
        let expect = self.next()?;
        match expect {
            Expect {
                request: ExpectedRequest::LayerInfo { layer },
                response,
            } if layer == *in_layer => respond(response),
            _ => Err(Error::UnexpectedLayerInfo(in_layer.clone(), expect.request)),
        }
    }

    async fn query(
        &self,
        in_layer: &LayerUrl,
        in_query: &FeatureQuery,
    ) -> Result<FeatureSet, Self::Error> {
        let expect = self.next()?;
        match expect {
            Expect {
                request: ExpectedRequest::Query { layer, query },
                response,
            } if layer == *in_layer && query == *in_query => respond(response),
            _ => Err(Error::UnexpectedQuery(
                in_layer.clone(),
                in_query.to_query_string(),
                expect.request,
            )),
        }
    }

    async fn webmap(&self, in_id: &ItemId) -> Result<WebMap, Self::Error> {
        let expect = self.next()?;
        match expect {
            Expect {
                request: ExpectedRequest::WebMap { id },
                response,
            } if id == *in_id => respond(response),
            _ => Err(Error::UnexpectedWebMap(in_id.clone(), expect.request)),
        }
    }

    async fn update_webmap(
        &self,
        in_id: &ItemId,
        webmap: &WebMap,
    ) -> Result<UpdateResult, Self::Error> {
        let expect = self.next()?;
        let in_request = to_value(webmap).expect("json serializable");
        match expect {
            Expect {
                request: ExpectedRequest::UpdateWebMap { id, request },
                response,
            } if id == *in_id && request.as_ref().map_or(true, |r| *r == in_request) => {
                self.updates
                    .lock()
                    .map_err(Error::mutex_lock)?
                    .push(in_request);
                respond(response)
            }
            _ => Err(Error::UnexpectedUpdate(
                in_id.clone(),
                in_request.to_string(),
                expect.request,
            )),
        }
    }
}
