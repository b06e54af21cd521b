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

//! Symbology of GPU planning web maps
//!
//! Published GPU planning layers carry a unique-value renderer that lists
//! every prescription type of the national nomenclature. This crate
//! rewrites saved web maps through a [`Portal`](gpu_webmap_core::Portal):
//! - [`SymbologyCatalog`] replaces the drawing info of each layer with a
//!   stored file chosen by the layer title.
//! - [`RendererPruner`] keeps only the renderer classes whose value occurs
//!   in the layer data.
//!
//! ```ignore
//! let pruner = RendererPruner::new(portal, PruneConfig::default());
//! let report = pruner.prune_webmap(&ItemId::from("0123456789abcdef")).await?;
//! assert_eq!(report.failed(), 0);
//! ```

pub mod category;
pub mod collector;
pub mod driver;
pub mod error;
pub mod fields;
pub mod report;
pub mod symbology;

#[doc(inline)]
pub use category::encode;
#[doc(inline)]
pub use category::LayerCategory;
#[doc(inline)]
pub use collector::collect_existing_values;
#[doc(inline)]
pub use collector::ExistingValues;
#[doc(inline)]
pub use driver::persist_webmap;
#[doc(inline)]
pub use driver::PruneConfig;
#[doc(inline)]
pub use driver::RendererPruner;
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use error::LayerFault;
#[doc(inline)]
pub use fields::resolve_field;
#[doc(inline)]
pub use fields::FieldKeys;
#[doc(inline)]
pub use fields::FieldPair;
#[doc(inline)]
pub use report::LayerOutcome;
#[doc(inline)]
pub use report::LayerReport;
#[doc(inline)]
pub use report::RunReport;
#[doc(inline)]
pub use report::SkipReason;
#[doc(inline)]
pub use symbology::LayerSymbology;
#[doc(inline)]
pub use symbology::SymbologyCatalog;
#[doc(inline)]
pub use symbology::SymbologyError;
#[doc(inline)]
pub use symbology::SymbologyOutcome;
