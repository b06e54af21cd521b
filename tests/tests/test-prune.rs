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
//! Integration tests for renderer pruning of a web map.

use gpu_webmap::Error;
use gpu_webmap::FieldKeys;
use gpu_webmap::LayerOutcome;
use gpu_webmap::PruneConfig;
use gpu_webmap::RendererPruner;
use gpu_webmap::SkipReason;
use gpu_webmap_core::FeatureQuery;
use gpu_webmap_core::ItemId;
use gpu_webmap_tests::fixtures::distinct_query;
use gpu_webmap_tests::fixtures::distinct_rows;
use gpu_webmap_tests::fixtures::layer;
use gpu_webmap_tests::fixtures::layer_url;
use gpu_webmap_tests::fixtures::renderer;
use gpu_webmap_tests::fixtures::schema;
use gpu_webmap_tests::fixtures::update_success;
use gpu_webmap_tests::fixtures::webmap;
use gpu_webmap_tests::Expect;
use gpu_webmap_tests::Portal;
use gpu_webmap_tests::TestError;
use gpu_webmap_tests::WEBMAP_ID;
use serde_json::json;
use serde_json::Value;
use std::error::Error as StdError;
use std::sync::Arc;
use std::sync::Mutex;
use tokio::test;
use tracing::Event;
use tracing::Level;
use tracing::Subscriber;
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;

const CANONICAL_FIELDS: [&str; 4] = ["FID", "TYPEPSC", "STYPEPSC", "LIBELLE"];

/// Levels of the events emitted while it is the default subscriber.
#[derive(Clone, Default)]
struct EventLevels(Arc<Mutex<Vec<Level>>>);

impl EventLevels {
    fn recorded(&self) -> Vec<Level> {
        self.0.lock().map(|levels| levels.clone()).unwrap_or_default()
    }
}

impl<S: Subscriber> Layer<S> for EventLevels {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if let Ok(mut levels) = self.0.lock() {
            levels.push(*event.metadata().level());
        }
    }
}

fn pruner(portal: &Arc<Portal>) -> RendererPruner<Portal> {
    RendererPruner::new(portal.clone(), PruneConfig::default())
}

fn reference_layer() -> Value {
    layer("zone_urba", &layer_url(0), renderer(&["AU", "N", "U"]))
}

fn id() -> ItemId {
    ItemId::from(WEBMAP_ID)
}

fn saved_renderer(portal: &Portal, layer: usize) -> Value {
    let updates = portal.updates();
    assert_eq!(updates.len(), 1, "web map saved once");
    updates[0]["operationalLayers"][layer]["layerDefinition"]["drawingInfo"]["renderer"].clone()
}

fn info_values(renderer: &Value) -> Vec<Value> {
    renderer["uniqueValueInfos"]
        .as_array()
        .map(|infos| infos.iter().map(|info| info["value"].clone()).collect())
        .unwrap_or_default()
}

fn group_values(renderer: &Value) -> Vec<Value> {
    renderer["uniqueValueGroups"][0]["classes"]
        .as_array()
        .map(|classes| classes.iter().map(|class| class["values"].clone()).collect())
        .unwrap_or_default()
}

#[test]
async fn keeps_existing_classes_in_order() -> Result<(), Box<dyn StdError>> {
    let portal = Arc::new(Portal::default());
    let surf = layer_url(3);
    let original = webmap(vec![
        reference_layer(),
        layer(
            "prescription_surf",
            &surf,
            renderer(&["p-01-00", "p-02-00", "p-03-01"]),
        ),
    ]);
    portal
        .then(Expect::webmap(WEBMAP_ID, &original))
        .then(Expect::layer_info(&surf, schema(&CANONICAL_FIELDS)))
        .then(Expect::query(
            &surf,
            distinct_query(),
            distinct_rows(&[(json!("03"), json!("01")), (json!("01"), json!("00"))]),
        ))
        .then(Expect::update_webmap(WEBMAP_ID, update_success()));

    let report = pruner(&portal).prune_webmap(&id()).await?;

    assert_eq!(portal.remaining(), 0);
    assert_eq!(
        report.outcome("zone_urba"),
        Some(&LayerOutcome::Skipped(SkipReason::Excluded))
    );
    assert_eq!(
        report.outcome("prescription_surf"),
        Some(&LayerOutcome::Filtered { kept: 2, total: 3 })
    );
    let saved = saved_renderer(&portal, 1);
    assert_eq!(info_values(&saved), [json!("p-01-00"), json!("p-03-01")]);
    assert_eq!(
        group_values(&saved),
        [json!([["p-01-00"]]), json!([["p-03-01"]])]
    );
    assert_eq!(saved["uniqueValueGroups"][0]["heading"], "Prescriptions");
    assert_eq!(saved["field1"], "TYPEPSC");
    assert_eq!(saved["uniqueValueInfos"][1]["label"], "Prescription p-03-01");
    assert!(saved["uniqueValueGroups"][0]["classes"][0].get("value").is_none());

    // Everything outside the pruned renderer is saved as read.
    let update = &portal.updates()[0];
    assert_eq!(update["baseMap"], original["baseMap"]);
    assert_eq!(update["version"], original["version"]);
    assert_eq!(update["operationalLayers"][0], original["operationalLayers"][0]);
    assert_eq!(
        update["operationalLayers"][1]["layerDefinition"]["drawingInfo"]["transparency"],
        0
    );
    assert_eq!(update["operationalLayers"][1]["layerType"], "ArcGISFeatureLayer");
    Ok(())
}

#[test]
async fn encodes_values_per_category() -> Result<(), Box<dyn StdError>> {
    let portal = Arc::new(Portal::default());
    let lin = layer_url(1);
    let pct = layer_url(2);
    portal
        .then(Expect::webmap(
            WEBMAP_ID,
            webmap(vec![
                reference_layer(),
                layer("Prescription_LIN", &lin, renderer(&["P L 05 00", "P L 15 01"])),
                layer("prescription_pct", &pct, renderer(&["P P 5 0", "P P 07 00"])),
            ]),
        ))
        .then(Expect::layer_info(&lin, schema(&CANONICAL_FIELDS)))
        .then(Expect::query(
            &lin,
            distinct_query(),
            distinct_rows(&[(json!("05"), json!("00"))]),
        ))
        .then(Expect::layer_info(&pct, schema(&CANONICAL_FIELDS)))
        .then(Expect::query(
            &pct,
            distinct_query(),
            distinct_rows(&[(json!(5), json!(0))]),
        ))
        .then(Expect::update_webmap(WEBMAP_ID, update_success()));

    let report = pruner(&portal).prune_webmap(&id()).await?;

    assert_eq!(report.filtered(), 2);
    assert_eq!(info_values(&saved_renderer(&portal, 1)), [json!("P L 05 00")]);
    assert_eq!(info_values(&saved_renderer(&portal, 2)), [json!("P P 5 0")]);
    Ok(())
}

#[test]
async fn queries_resolved_field_names() -> Result<(), Box<dyn StdError>> {
    let portal = Arc::new(Portal::default());
    let surf = layer_url(3);
    portal
        .then(Expect::webmap(
            WEBMAP_ID,
            webmap(vec![
                reference_layer(),
                layer("prescription_surf", &surf, renderer(&["p-01-00"])),
            ]),
        ))
        .then(Expect::layer_info(
            &surf,
            schema(&["objectid", "typepsc_1", "stypepsc_1"]),
        ))
        .then(Expect::query(
            &surf,
            FeatureQuery::distinct(&["typepsc_1", "stypepsc_1"]),
            json!({"features": [{"attributes": {"typepsc_1": "01", "stypepsc_1": "00"}}]}),
        ))
        .then(Expect::update_webmap(WEBMAP_ID, update_success()));

    let report = pruner(&portal).prune_webmap(&id()).await?;

    assert_eq!(
        report.outcome("prescription_surf"),
        Some(&LayerOutcome::Filtered { kept: 1, total: 1 })
    );
    Ok(())
}

#[test]
async fn reads_every_page_of_distinct_values() -> Result<(), Box<dyn StdError>> {
    let portal = Arc::new(Portal::default());
    let surf = layer_url(3);
    let mut first_page = distinct_rows(&[(json!("01"), json!("00"))]);
    first_page["exceededTransferLimit"] = json!(true);
    portal
        .then(Expect::webmap(
            WEBMAP_ID,
            webmap(vec![
                reference_layer(),
                layer(
                    "prescription_surf",
                    &surf,
                    renderer(&["p-01-00", "p-02-00", "p-03-00"]),
                ),
            ]),
        ))
        .then(Expect::layer_info(&surf, schema(&CANONICAL_FIELDS)))
        .then(Expect::query(&surf, distinct_query(), first_page))
        .then(Expect::query(
            &surf,
            distinct_query().result_offset(1),
            distinct_rows(&[(json!("02"), json!("00"))]),
        ))
        .then(Expect::update_webmap(WEBMAP_ID, update_success()));

    let report = pruner(&portal).prune_webmap(&id()).await?;

    assert_eq!(portal.remaining(), 0);
    assert_eq!(
        report.outcome("prescription_surf"),
        Some(&LayerOutcome::Filtered { kept: 2, total: 3 })
    );
    assert_eq!(
        info_values(&saved_renderer(&portal, 1)),
        [json!("p-01-00"), json!("p-02-00")]
    );
    Ok(())
}

#[test]
async fn leaves_renderer_of_incomplete_result() -> Result<(), Box<dyn StdError>> {
    let portal = Arc::new(Portal::default());
    let surf = layer_url(3);
    let original = webmap(vec![
        reference_layer(),
        layer("prescription_surf", &surf, renderer(&["p-01-00", "p-02-00"])),
    ]);
    let mut first_page = distinct_rows(&[(json!("01"), json!("00"))]);
    first_page["exceededTransferLimit"] = json!(true);
    let mut empty_page = distinct_rows(&[]);
    empty_page["exceededTransferLimit"] = json!(true);
    portal
        .then(Expect::webmap(WEBMAP_ID, &original))
        .then(Expect::layer_info(&surf, schema(&CANONICAL_FIELDS)))
        .then(Expect::query(&surf, distinct_query(), first_page))
        .then(Expect::query(&surf, distinct_query().result_offset(1), empty_page))
        .then(Expect::update_webmap_with(WEBMAP_ID, &original, update_success()));

    let report = pruner(&portal).prune_webmap(&id()).await?;

    assert_eq!(
        report.outcome("prescription_surf"),
        Some(&LayerOutcome::Skipped(SkipReason::Truncated))
    );
    assert_eq!(
        info_values(&saved_renderer(&portal, 1)),
        [json!("p-01-00"), json!("p-02-00")]
    );
    Ok(())
}

#[test]
async fn resolves_type_field_by_first_substring_match() -> Result<(), Box<dyn StdError>> {
    let portal = Arc::new(Portal::default());
    let surf = layer_url(3);
    portal
        .then(Expect::webmap(
            WEBMAP_ID,
            webmap(vec![
                reference_layer(),
                layer("prescription_surf", &surf, renderer(&["p-00-00"])),
            ]),
        ))
        .then(Expect::layer_info(
            &surf,
            schema(&["objectid", "stypepsc_1", "typepsc_1"]),
        ))
        .then(Expect::query(
            &surf,
            FeatureQuery::distinct(&["stypepsc_1", "stypepsc_1"]),
            json!({"features": [{"attributes": {"stypepsc_1": "00"}}]}),
        ))
        .then(Expect::update_webmap(WEBMAP_ID, update_success()));

    let report = pruner(&portal).prune_webmap(&id()).await?;

    // "STYPEPSC_1" contains "TYPEPSC" and comes first in the schema.
    assert_eq!(
        report.outcome("prescription_surf"),
        Some(&LayerOutcome::Filtered { kept: 1, total: 1 })
    );
    assert_eq!(portal.remaining(), 0);
    Ok(())
}

#[test]
async fn warns_about_unrecognized_layers() -> Result<(), Box<dyn StdError>> {
    let levels = EventLevels::default();
    let _guard = tracing::subscriber::set_default(Registry::default().with(levels.clone()));
    let portal = Arc::new(Portal::default());
    let original = webmap(vec![reference_layer()]);
    portal
        .then(Expect::webmap(WEBMAP_ID, &original))
        .then(Expect::update_webmap(WEBMAP_ID, update_success()));
    let pruner = RendererPruner::new(
        portal.clone(),
        PruneConfig {
            skip_leading_layers: 0,
            field_keys: FieldKeys::default(),
        },
    );

    pruner.prune_webmap(&id()).await?;

    assert!(levels.recorded().contains(&Level::WARN));
    Ok(())
}

#[test]
async fn skips_layer_without_fields() -> Result<(), Box<dyn StdError>> {
    let portal = Arc::new(Portal::default());
    let lin = layer_url(1);
    let original = webmap(vec![
        reference_layer(),
        layer("prescription_lin", &lin, renderer(&["P L 05 00"])),
    ]);
    portal
        .then(Expect::webmap(WEBMAP_ID, &original))
        .then(Expect::layer_info(&lin, schema(&["FID", "Typepsc_Code", "Other"])))
        .then(Expect::update_webmap_with(WEBMAP_ID, &original, update_success()));

    let report = pruner(&portal).prune_webmap(&id()).await?;

    assert_eq!(
        report.outcome("prescription_lin"),
        Some(&LayerOutcome::Skipped(SkipReason::FieldNotFound {
            key: "STYPEPSC".into(),
            available: vec!["FID".into(), "TYPEPSC_CODE".into(), "OTHER".into()],
        }))
    );
    assert_eq!(portal.remaining(), 0);
    Ok(())
}

#[test]
async fn skips_layer_without_values() -> Result<(), Box<dyn StdError>> {
    let portal = Arc::new(Portal::default());
    let lin = layer_url(1);
    let pct = layer_url(2);
    let original = webmap(vec![
        reference_layer(),
        layer("prescription_lin", &lin, renderer(&["P L 05 00"])),
        layer("prescription_pct", &pct, renderer(&["P P 05 00"])),
    ]);
    portal
        .then(Expect::webmap(WEBMAP_ID, &original))
        .then(Expect::layer_info(&lin, schema(&CANONICAL_FIELDS)))
        .then(Expect::query(&lin, distinct_query(), distinct_rows(&[])))
        .then(Expect::layer_info(&pct, schema(&CANONICAL_FIELDS)))
        .then(Expect::query(
            &pct,
            distinct_query(),
            distinct_rows(&[(json!("05"), Value::Null), (Value::Null, json!("00"))]),
        ))
        .then(Expect::update_webmap_with(WEBMAP_ID, &original, update_success()));

    let report = pruner(&portal).prune_webmap(&id()).await?;

    assert_eq!(
        report.outcome("prescription_lin"),
        Some(&LayerOutcome::Skipped(SkipReason::NoFeatures))
    );
    assert_eq!(
        report.outcome("prescription_pct"),
        Some(&LayerOutcome::Skipped(SkipReason::NoValues))
    );
    Ok(())
}

#[test]
async fn keeps_no_class_when_nothing_matches() -> Result<(), Box<dyn StdError>> {
    let portal = Arc::new(Portal::default());
    let surf = layer_url(3);
    portal
        .then(Expect::webmap(
            WEBMAP_ID,
            webmap(vec![
                reference_layer(),
                layer("prescription_surf", &surf, renderer(&["p-01-00", "p-02-00"])),
            ]),
        ))
        .then(Expect::layer_info(&surf, schema(&CANONICAL_FIELDS)))
        .then(Expect::query(
            &surf,
            distinct_query(),
            distinct_rows(&[(json!("09"), json!("09"))]),
        ))
        .then(Expect::update_webmap(WEBMAP_ID, update_success()));

    let report = pruner(&portal).prune_webmap(&id()).await?;

    assert_eq!(
        report.outcome("prescription_surf"),
        Some(&LayerOutcome::Filtered { kept: 0, total: 2 })
    );
    let saved = saved_renderer(&portal, 1);
    assert_eq!(saved["uniqueValueInfos"], json!([]));
    assert_eq!(saved["uniqueValueGroups"][0]["classes"], json!([]));
    Ok(())
}

#[test]
async fn skips_unrecognized_layers_without_requests() -> Result<(), Box<dyn StdError>> {
    let portal = Arc::new(Portal::default());
    let original = webmap(vec![
        reference_layer(),
        layer("secteur_information", &layer_url(4), renderer(&["01"])),
    ]);
    portal
        .then(Expect::webmap(WEBMAP_ID, &original))
        .then(Expect::update_webmap_with(WEBMAP_ID, &original, update_success()));
    let pruner = RendererPruner::new(
        portal.clone(),
        PruneConfig {
            skip_leading_layers: 0,
            field_keys: FieldKeys::default(),
        },
    );

    let report = pruner.prune_webmap(&id()).await?;

    assert_eq!(report.skipped(), 2);
    assert_eq!(
        report.outcome("zone_urba"),
        Some(&LayerOutcome::Skipped(SkipReason::UnrecognizedCategory))
    );
    assert_eq!(
        report.outcome("secteur_information"),
        Some(&LayerOutcome::Skipped(SkipReason::UnrecognizedCategory))
    );
    assert_eq!(portal.remaining(), 0);
    Ok(())
}

#[test]
async fn excludes_configured_leading_layers() -> Result<(), Box<dyn StdError>> {
    let portal = Arc::new(Portal::default());
    portal
        .then(Expect::webmap(
            WEBMAP_ID,
            webmap(vec![
                reference_layer(),
                layer("prescription_surf", &layer_url(3), renderer(&["p-01-00"])),
                layer("prescription_lin", &layer_url(1), renderer(&["P L 05 00"])),
            ]),
        ))
        .then(Expect::update_webmap(WEBMAP_ID, update_success()));
    let pruner = RendererPruner::new(
        portal.clone(),
        PruneConfig {
            skip_leading_layers: 3,
            field_keys: FieldKeys::default(),
        },
    );

    let report = pruner.prune_webmap(&id()).await?;

    assert_eq!(report.skipped(), 3);
    assert!(report
        .layers
        .iter()
        .all(|l| l.outcome == LayerOutcome::Skipped(SkipReason::Excluded)));
    assert_eq!(portal.remaining(), 0);
    Ok(())
}

#[test]
async fn failing_layer_does_not_stop_the_next() -> Result<(), Box<dyn StdError>> {
    let portal = Arc::new(Portal::default());
    let lin = layer_url(1);
    let pct = layer_url(2);
    let mut no_url = layer("prescription_surf", "", renderer(&["p-01-00"]));
    no_url
        .as_object_mut()
        .map(|layer| layer.remove("url"))
        .ok_or("layer is an object")?;
    portal
        .then(Expect::webmap(
            WEBMAP_ID,
            webmap(vec![
                reference_layer(),
                no_url,
                layer("prescription_lin", &lin, renderer(&["P L 05 00"])),
                layer("prescription_pct", &pct, renderer(&["P P 05 00", "P P 06 00"])),
            ]),
        ))
        .then(Expect::layer_info(&lin, schema(&CANONICAL_FIELDS)))
        .then(Expect::query(&lin, distinct_query(), json!({})).fail(TestError("timeout")))
        .then(Expect::layer_info(&pct, schema(&CANONICAL_FIELDS)))
        .then(Expect::query(
            &pct,
            distinct_query(),
            distinct_rows(&[(json!("06"), json!("00"))]),
        ))
        .then(Expect::update_webmap(WEBMAP_ID, update_success()));

    let report = pruner(&portal).prune_webmap(&id()).await?;

    assert_eq!(
        report.outcome("prescription_surf"),
        Some(&LayerOutcome::Failed("layer has no url".into()))
    );
    assert!(matches!(
        report.outcome("prescription_lin"),
        Some(LayerOutcome::Failed(err)) if err.contains("timeout")
    ));
    assert_eq!(
        report.outcome("prescription_pct"),
        Some(&LayerOutcome::Filtered { kept: 1, total: 2 })
    );
    assert_eq!(report.failed(), 2);
    assert_eq!(info_values(&saved_renderer(&portal, 2)), [json!("P L 05 00")]);
    assert_eq!(info_values(&saved_renderer(&portal, 3)), [json!("P P 06 00")]);
    Ok(())
}

#[test]
async fn renderer_without_groups_is_a_layer_fault() -> Result<(), Box<dyn StdError>> {
    let portal = Arc::new(Portal::default());
    let surf = layer_url(3);
    let mut ungrouped = renderer(&["p-01-00"]);
    ungrouped
        .as_object_mut()
        .map(|renderer| renderer.remove("uniqueValueGroups"))
        .ok_or("renderer is an object")?;
    portal
        .then(Expect::webmap(
            WEBMAP_ID,
            webmap(vec![
                reference_layer(),
                layer("prescription_surf", &surf, ungrouped),
            ]),
        ))
        .then(Expect::layer_info(&surf, schema(&CANONICAL_FIELDS)))
        .then(Expect::query(
            &surf,
            distinct_query(),
            distinct_rows(&[(json!("01"), json!("00"))]),
        ))
        .then(Expect::update_webmap(WEBMAP_ID, update_success()));

    let report = pruner(&portal).prune_webmap(&id()).await?;

    assert!(matches!(
        report.outcome("prescription_surf"),
        Some(LayerOutcome::Failed(_))
    ));
    assert_eq!(info_values(&saved_renderer(&portal, 1)), [json!("p-01-00")]);
    Ok(())
}

#[test]
async fn persist_failure_is_fatal() {
    let portal = Arc::new(Portal::default());
    portal
        .then(Expect::webmap(WEBMAP_ID, webmap(vec![reference_layer()])))
        .then(Expect::update_webmap(WEBMAP_ID, json!({})).fail(TestError("503")));

    let result = pruner(&portal).prune_webmap(&id()).await;

    assert!(matches!(result, Err(Error::Persist(_))));
}

#[test]
async fn rejected_update_is_fatal() {
    let portal = Arc::new(Portal::default());
    portal
        .then(Expect::webmap(WEBMAP_ID, webmap(vec![reference_layer()])))
        .then(Expect::update_webmap(WEBMAP_ID, json!({"success": false})));

    let result = pruner(&portal).prune_webmap(&id()).await;

    assert!(matches!(result, Err(Error::PersistRejected(item)) if item == id()));
}

#[test]
async fn unreadable_webmap_is_fatal() {
    let portal = Arc::new(Portal::default());
    portal.expect(Expect::webmap(WEBMAP_ID, json!({})).fail(TestError("404")));

    let result = pruner(&portal).prune_webmap(&id()).await;

    assert!(matches!(result, Err(Error::Portal(_))));
    assert!(portal.updates().is_empty());
}
