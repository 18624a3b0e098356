//! Versioned project and flowchart blobs.
//!
//! Every blob carries a `version`. Loading parses the raw JSON, migrates it
//! step by step up to [`SCHEMA_VERSION`], then deserializes. Blobs without a
//! version are legacy v1 blobs: camelCase keys, a nested undo history inside
//! the canvas state and loosely typed element content.

use crate::document::CanvasState;
use crate::elements::{ElementType, new_element_id};
use crate::flowchart::{FlowchartState, NodeType};
use crate::settings::ProjectSettings;
use crate::storage::{KeyValueStore, StorageError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

/// Current blob format version.
pub const SCHEMA_VERSION: u64 = 2;
/// Version assumed for blobs that carry none.
pub const LEGACY_VERSION: u64 = 1;

/// Storage key of the page-builder project.
pub const PROJECT_KEY: &str = "sitecanvas-project";
/// Storage key of the flowchart.
pub const FLOWCHART_KEY: &str = "sitecanvas-flowchart";

/// Subtrees whose keys are user data and must not be renamed.
const PROJECT_VERBATIM: &[&str] = &["styles", "props"];

#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Invalid blob: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Stored blob is not a JSON object")]
    NotAnObject,
    #[error("Invalid blob version: {0}")]
    InvalidVersion(Value),
    #[error("Unsupported blob version {found} (newest supported is {SCHEMA_VERSION})")]
    UnsupportedVersion { found: u64 },
}

pub type PersistResult<T> = Result<T, PersistError>;

/// The stored page-builder project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectBlob {
    pub version: u64,
    pub canvas_state: CanvasState,
    #[serde(default)]
    pub settings: ProjectSettings,
    pub timestamp: DateTime<Utc>,
}

impl ProjectBlob {
    pub fn new(canvas_state: CanvasState, settings: ProjectSettings, now: DateTime<Utc>) -> Self {
        Self {
            version: SCHEMA_VERSION,
            canvas_state,
            settings,
            timestamp: now,
        }
    }
}

/// The stored flowchart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowchartBlob {
    pub version: u64,
    pub flowchart: FlowchartState,
    pub timestamp: DateTime<Utc>,
}

impl FlowchartBlob {
    pub fn new(flowchart: FlowchartState, now: DateTime<Utc>) -> Self {
        Self {
            version: SCHEMA_VERSION,
            flowchart,
            timestamp: now,
        }
    }
}

// --- Key renaming ---

fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn snake_map(map: Map<String, Value>, verbatim: &[&str]) -> Map<String, Value> {
    map.into_iter()
        .map(|(key, value)| {
            let value = if verbatim.contains(&key.as_str()) {
                value
            } else {
                snake_value(value, verbatim)
            };
            (snake_case(&key), value)
        })
        .collect()
}

fn snake_value(value: Value, verbatim: &[&str]) -> Value {
    match value {
        Value::Object(map) => Value::Object(snake_map(map, verbatim)),
        Value::Array(items) => Value::Array(items.into_iter().map(|v| snake_value(v, verbatim)).collect()),
        other => other,
    }
}

// --- Shared helpers ---

fn blob_version(root: &Map<String, Value>) -> PersistResult<u64> {
    match root.get("version") {
        None | Some(Value::Null) => Ok(LEGACY_VERSION),
        Some(value) => value.as_u64().ok_or_else(|| PersistError::InvalidVersion(value.clone())),
    }
}

/// Run `step` for each version between the stored one and the current one.
fn migrate_with(
    value: Value,
    step: impl Fn(u64, Map<String, Value>) -> PersistResult<Map<String, Value>>,
) -> PersistResult<Value> {
    let Value::Object(mut root) = value else {
        return Err(PersistError::NotAnObject);
    };
    let mut version = blob_version(&root)?;
    if version > SCHEMA_VERSION {
        return Err(PersistError::UnsupportedVersion { found: version });
    }
    while version < SCHEMA_VERSION {
        root = step(version, root)?;
        version += 1;
        log::info!("Migrated blob to version {}", version);
    }
    Ok(Value::Object(root))
}

/// Legacy timestamps are epoch milliseconds or ISO strings.
fn timestamp_value(value: Option<&Value>, now: DateTime<Utc>) -> Value {
    let time = match value {
        Some(Value::Number(ms)) => ms.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s).ok().map(|t| t.with_timezone(&Utc)),
        _ => None,
    };
    Value::String(time.unwrap_or(now).to_rfc3339())
}

/// The wrapped document, or the root itself when it was saved bare.
fn take_document(root: &mut Map<String, Value>, names: &[&str], marker: &str) -> Map<String, Value> {
    for name in names {
        if let Some(Value::Object(doc)) = root.remove(*name) {
            return doc;
        }
    }
    if root.contains_key(marker) {
        return std::mem::take(root);
    }
    Map::new()
}

// --- Project ---

fn migrate_element(value: Value, index: usize, now: DateTime<Utc>) -> Option<Value> {
    let Value::Object(mut element) = value else {
        log::warn!("Dropping malformed element at index {}", index);
        return None;
    };

    let content = element.remove("content");
    let tag = element
        .remove("type")
        .and_then(|t| t.as_str().map(str::to_string))
        .or_else(|| {
            content
                .as_ref()
                .and_then(|c| c.get("type"))
                .and_then(Value::as_str)
                .map(str::to_string)
        });
    let Some(element_type) = tag.as_deref().and_then(|t| t.parse::<ElementType>().ok()) else {
        log::warn!("Dropping element with unknown type {:?}", tag);
        return None;
    };

    let mut content = match content {
        Some(Value::Object(map)) => map,
        Some(Value::String(text)) => {
            let mut map = Map::new();
            map.insert(element_type.primary_text_field().to_string(), Value::String(text));
            map
        }
        _ => Map::new(),
    };
    content.insert("type".to_string(), json!(element_type.as_str()));
    element.insert("content".to_string(), Value::Object(content));

    let size = element_type.default_size();
    element.entry("id").or_insert_with(|| json!(new_element_id()));
    element.entry("x").or_insert(json!(0.0));
    element.entry("y").or_insert(json!(0.0));
    element.entry("width").or_insert(json!(size.width));
    element.entry("height").or_insert(json!(size.height));
    element.entry("z_index").or_insert(json!(index + 1));

    let metadata = element.entry("metadata").or_insert_with(|| json!({}));
    if let Value::Object(metadata) = metadata {
        metadata
            .entry("name")
            .or_insert_with(|| json!(element_type.display_name()));
        for key in ["created", "modified"] {
            let stamp = timestamp_value(metadata.get(key), now);
            metadata.insert(key.to_string(), stamp);
        }
    }
    Some(Value::Object(element))
}

fn project_v1_to_v2(root: Map<String, Value>, now: DateTime<Utc>) -> Map<String, Value> {
    let mut root = snake_map(root, PROJECT_VERBATIM);
    let mut canvas = take_document(&mut root, &["canvas_state"], "elements");

    if canvas.remove("history").is_some() {
        log::info!("Dropped legacy nested history");
    }

    let toggles: Vec<(String, Value)> = ["show_grid", "show_rulers", "show_guides"]
        .into_iter()
        .filter_map(|key| canvas.remove(key).map(|v| (key.to_string(), v)))
        .collect();
    if let Value::Object(settings) = canvas.entry("settings").or_insert_with(|| json!({})) {
        settings.extend(toggles);
    }

    if let Some(Value::Array(elements)) = canvas.remove("elements") {
        let elements: Vec<Value> = elements
            .into_iter()
            .enumerate()
            .filter_map(|(i, element)| migrate_element(element, i, now))
            .collect();
        canvas.insert("elements".to_string(), Value::Array(elements));
    }

    let mut migrated = Map::new();
    migrated.insert("version".to_string(), json!(2));
    migrated.insert("canvas_state".to_string(), Value::Object(canvas));
    migrated.insert("settings".to_string(), root.remove("settings").unwrap_or_else(|| json!({})));
    migrated.insert("timestamp".to_string(), timestamp_value(root.get("timestamp"), now));
    migrated
}

/// Bring a project blob of any known version up to [`SCHEMA_VERSION`].
pub fn migrate_project(value: Value, now: DateTime<Utc>) -> PersistResult<Value> {
    migrate_with(value, |version, root| match version {
        LEGACY_VERSION => Ok(project_v1_to_v2(root, now)),
        found => Err(PersistError::UnsupportedVersion { found }),
    })
}

/// Parse, migrate and deserialize a stored project.
pub fn decode_project(raw: &str, now: DateTime<Utc>) -> PersistResult<ProjectBlob> {
    let value: Value = serde_json::from_str(raw)?;
    let mut blob: ProjectBlob = serde_json::from_value(migrate_project(value, now)?)?;

    let state = &mut blob.canvas_state;
    state.set_zoom(state.zoom);
    if let Some(selected) = state.selected_element_id.clone() {
        if !state.contains(&selected) {
            state.selected_element_id = None;
        }
    }
    Ok(blob)
}

/// Load the project from `store`. `Ok(None)` when nothing is stored.
pub fn load_project<S: KeyValueStore + ?Sized>(store: &S) -> PersistResult<Option<ProjectBlob>> {
    match store.get(PROJECT_KEY)? {
        Some(raw) => decode_project(&raw, Utc::now()).map(Some),
        None => Ok(None),
    }
}

// --- Flowchart ---

fn migrate_nodes(nodes: Vec<Value>) -> Vec<Value> {
    nodes
        .into_iter()
        .filter_map(|node| {
            let Value::Object(mut node) = node else {
                return None;
            };
            let tag = node.get("type").cloned().unwrap_or_else(|| json!("process"));
            let Ok(node_type) = serde_json::from_value::<NodeType>(tag.clone()) else {
                log::warn!("Dropping node with unknown type {}", tag);
                return None;
            };
            let size = node_type.default_size();
            node.insert("type".to_string(), tag);
            node.entry("id").or_insert_with(|| json!(new_element_id()));
            node.entry("label").or_insert_with(|| json!(node_type.default_label()));
            node.entry("x").or_insert(json!(0.0));
            node.entry("y").or_insert(json!(0.0));
            node.entry("width").or_insert(json!(size.width));
            node.entry("height").or_insert(json!(size.height));

            if let Some(Value::Object(sub)) = node.get_mut("sub_flowchart") {
                if let Some(Value::Array(inner)) = sub.remove("nodes") {
                    sub.insert("nodes".to_string(), Value::Array(migrate_nodes(inner)));
                }
                sub.entry("id").or_insert_with(|| json!(new_element_id()));
                sub.entry("name").or_insert_with(|| json!(""));
            }
            Some(Value::Object(node))
        })
        .collect()
}

fn flowchart_v1_to_v2(root: Map<String, Value>, now: DateTime<Utc>) -> Map<String, Value> {
    let mut root = snake_map(root, &[]);
    let mut chart = take_document(&mut root, &["flowchart", "flowchart_state"], "nodes");

    if let Some(Value::Array(nodes)) = chart.remove("nodes") {
        chart.insert("nodes".to_string(), Value::Array(migrate_nodes(nodes)));
    }
    if let Some(parents) = chart.remove("parent_states") {
        chart.insert("parents".to_string(), parents);
    }

    let mut migrated = Map::new();
    migrated.insert("version".to_string(), json!(2));
    migrated.insert("flowchart".to_string(), Value::Object(chart));
    migrated.insert("timestamp".to_string(), timestamp_value(root.get("timestamp"), now));
    migrated
}

/// Bring a flowchart blob of any known version up to [`SCHEMA_VERSION`].
pub fn migrate_flowchart(value: Value, now: DateTime<Utc>) -> PersistResult<Value> {
    migrate_with(value, |version, root| match version {
        LEGACY_VERSION => Ok(flowchart_v1_to_v2(root, now)),
        found => Err(PersistError::UnsupportedVersion { found }),
    })
}

/// Drop references that point nowhere.
fn repair_flowchart(chart: &mut FlowchartState) {
    let before = chart.connections.len();
    let nodes = std::mem::take(&mut chart.nodes);
    chart
        .connections
        .retain(|c| nodes.iter().any(|n| n.id == c.from) && nodes.iter().any(|n| n.id == c.to));
    chart.nodes = nodes;
    if chart.connections.len() != before {
        log::warn!("Dropped {} dangling connection(s)", before - chart.connections.len());
    }

    if chart.selected_node_id.as_deref().is_some_and(|id| chart.node(id).is_none()) {
        chart.selected_node_id = None;
    }
    if chart
        .selected_connection_id
        .as_deref()
        .is_some_and(|id| chart.connection(id).is_none())
    {
        chart.selected_connection_id = None;
    }
    if chart.parents.len() != chart.current_path.len() {
        log::warn!("Inconsistent navigation stack; reopening at the current level");
        chart.parents.clear();
        chart.current_path.clear();
    }
    chart.set_zoom(chart.zoom);
}

/// Parse, migrate and deserialize a stored flowchart.
pub fn decode_flowchart(raw: &str, now: DateTime<Utc>) -> PersistResult<FlowchartBlob> {
    let value: Value = serde_json::from_str(raw)?;
    let mut blob: FlowchartBlob = serde_json::from_value(migrate_flowchart(value, now)?)?;
    repair_flowchart(&mut blob.flowchart);
    Ok(blob)
}

/// Load the flowchart from `store`. `Ok(None)` when nothing is stored.
pub fn load_flowchart<S: KeyValueStore + ?Sized>(store: &S) -> PersistResult<Option<FlowchartBlob>> {
    match store.get(FLOWCHART_KEY)? {
        Some(raw) => decode_flowchart(&raw, Utc::now()).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Viewport;
    use crate::elements::{Element, ElementContent};
    use crate::storage::MemoryStore;
    use kurbo::Point;

    const LEGACY_PROJECT: &str = r##"{
        "canvasState": {
            "elements": [
                {
                    "id": "el-1", "type": "heading",
                    "x": 10, "y": 20, "width": 300, "height": 60, "zIndex": 1,
                    "content": "Welcome",
                    "styles": {"fontSize": "32px"},
                    "metadata": {"name": "Title", "created": "2024-01-01T00:00:00Z", "modified": 1704067200000}
                },
                {
                    "id": "el-2", "type": "button", "x": 0, "y": 100, "width": 120, "height": 40,
                    "content": {"label": "Go", "href": "/go"},
                    "constraints": {"lockAspectRatio": true}
                },
                {"id": "el-3", "type": "carousel"}
            ],
            "selectedElementId": "el-1",
            "canvasWidth": 768, "canvasHeight": 900, "zoom": 1.5, "viewport": "tablet",
            "showGrid": false, "showRulers": true,
            "settings": {"autoSave": false, "snapToGrid": true, "gridSize": 10},
            "history": {"past": [], "present": null, "future": []}
        },
        "timestamp": 1704067200000
    }"##;

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("selectedElementId"), "selected_element_id");
        assert_eq!(snake_case("zIndex"), "z_index");
        assert_eq!(snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn test_legacy_project_migrates() {
        let blob = decode_project(LEGACY_PROJECT, Utc::now()).unwrap();
        let state = &blob.canvas_state;

        assert_eq!(blob.version, SCHEMA_VERSION);
        assert_eq!(state.len(), 2);
        assert_eq!(state.viewport, Viewport::Tablet);
        assert_eq!(state.zoom, 1.5);
        assert!(!state.settings.auto_save);
        assert!(state.settings.snap_to_grid);
        assert_eq!(state.settings.grid_size, 10.0);
        assert!(!state.settings.show_grid);
        assert!(state.settings.show_rulers);
        assert_eq!(state.selected_element_id.as_deref(), Some("el-1"));
        assert_eq!(blob.timestamp.timestamp_millis(), 1704067200000);

        let heading = state.element("el-1").unwrap();
        match &heading.content {
            ElementContent::Heading(h) => assert_eq!(h.text, "Welcome"),
            other => panic!("unexpected content {other:?}"),
        }
        assert_eq!(heading.styles.get("fontSize").map(String::as_str), Some("32px"));
        assert_eq!(heading.metadata.name, "Title");
        assert_eq!(heading.metadata.modified.timestamp_millis(), 1704067200000);

        let button = state.element("el-2").unwrap();
        assert_eq!(button.z_index, 2);
        assert!(button.keeps_aspect_ratio());
        assert_eq!(button.metadata.name, "Button");
    }

    #[test]
    fn test_legacy_history_is_dropped() {
        let value: Value = serde_json::from_str(LEGACY_PROJECT).unwrap();
        let migrated = migrate_project(value, Utc::now()).unwrap();
        assert!(migrated["canvas_state"].get("history").is_none());
        assert_eq!(migrated["version"], 2);
    }

    #[test]
    fn test_current_project_roundtrip() {
        let mut state = CanvasState::new();
        let id = state.add_element(Element::new(ElementType::Card, Point::new(5.0, 5.0), Utc::now()));
        state.select(Some(&id));
        let blob = ProjectBlob::new(state, ProjectSettings::default(), Utc::now());

        let decoded = decode_project(&serde_json::to_string(&blob).unwrap(), Utc::now()).unwrap();
        assert_eq!(decoded, blob);
    }

    #[test]
    fn test_future_version_is_rejected() {
        let err = decode_project(r#"{"version": 3, "canvas_state": {}}"#, Utc::now()).unwrap_err();
        assert!(matches!(err, PersistError::UnsupportedVersion { found: 3 }));
    }

    #[test]
    fn test_malformed_blobs() {
        assert!(matches!(decode_project("[]", Utc::now()), Err(PersistError::NotAnObject)));
        assert!(matches!(decode_project("{", Utc::now()), Err(PersistError::Json(_))));
        assert!(matches!(
            decode_project(r#"{"version": "two"}"#, Utc::now()),
            Err(PersistError::InvalidVersion(_))
        ));
    }

    #[test]
    fn test_stale_selection_is_cleared() {
        let raw = r#"{"version": 2, "canvas_state": {"selected_element_id": "gone"}, "timestamp": "2024-01-01T00:00:00Z"}"#;
        let blob = decode_project(raw, Utc::now()).unwrap();
        assert_eq!(blob.canvas_state.selected_element_id, None);
    }

    #[test]
    fn test_load_from_empty_store() {
        let store = MemoryStore::new();
        assert!(load_project(&store).unwrap().is_none());
        assert!(load_flowchart(&store).unwrap().is_none());
    }

    #[test]
    fn test_legacy_flowchart_migrates_and_repairs() {
        let raw = r##"{
            "nodes": [
                {"id": "n1", "type": "start", "label": "Go", "x": 0, "y": 0, "width": 120, "height": 60,
                 "styles": {"backgroundColor": "#000000"}},
                {"id": "n2", "type": "mystery", "x": 0, "y": 100},
                {"id": "n3", "type": "subprocess", "x": 0, "y": 200,
                 "subFlowchart": {"id": "s1", "name": "Inner", "nodes": [{"id": "i1", "type": "end"}], "connections": []}}
            ],
            "connections": [
                {"id": "c1", "from": "n1", "to": "n2"},
                {"id": "c2", "from": "n1", "to": "n3", "type": "curved"}
            ],
            "selectedNodeId": "n2",
            "zoom": 9
        }"##;
        let blob = decode_flowchart(raw, Utc::now()).unwrap();
        let chart = &blob.flowchart;

        assert_eq!(chart.nodes.len(), 2);
        assert_eq!(chart.node("n1").unwrap().styles.background_color, "#000000");
        assert_eq!(chart.connections.len(), 1);
        assert_eq!(chart.connections[0].id, "c2");
        assert_eq!(chart.selected_node_id, None);
        assert_eq!(chart.zoom, 3.0);

        let inner = chart.node("n3").and_then(|n| n.sub_flowchart.as_ref()).unwrap();
        assert_eq!(inner.nodes[0].label, "End");
    }
}
