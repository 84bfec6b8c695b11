// Diagram scene snapshots.
//
// The diagram widget emits its full runtime state on every edit. Only a
// fixed whitelist of display properties is retained; everything else the
// widget tracks is transient and must not reach the persistence layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// SceneAppState
// ---------------------------------------------------------------------------

/// The whitelisted display properties of the diagram canvas.
///
/// Unknown fields in incoming widget state are dropped when converting
/// through [`SceneAppState::sanitize`]; unknown fields in stored payloads
/// are ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneAppState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl SceneAppState {
    /// Extract the whitelisted fields from the widget's raw state blob.
    pub fn sanitize(raw: &Value) -> SceneAppState {
        SceneAppState {
            view_background_color: raw
                .get("viewBackgroundColor")
                .and_then(Value::as_str)
                .map(str::to_string),
            grid_size: raw.get("gridSize").and_then(Value::as_f64),
            scroll_x: raw.get("scrollX").and_then(Value::as_f64),
            scroll_y: raw.get("scrollY").and_then(Value::as_f64),
            zoom: raw.get("zoom").cloned().filter(|v| !v.is_null()),
            theme: raw.get("theme").and_then(Value::as_str).map(str::to_string),
        }
    }
}

// ---------------------------------------------------------------------------
// DiagramScene
// ---------------------------------------------------------------------------

/// Serializable snapshot of the architecture sketch.
///
/// `elements` are opaque shape records owned by the widget; the studio
/// stores and replays them without interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramScene {
    #[serde(default)]
    pub elements: Vec<Value>,
    #[serde(default)]
    pub app_state: SceneAppState,
}

impl DiagramScene {
    /// Build a scene from a widget change event, stripping the app state
    /// down to the whitelist.
    pub fn from_widget(elements: Vec<Value>, raw_app_state: &Value) -> DiagramScene {
        DiagramScene {
            elements,
            app_state: SceneAppState::sanitize(raw_app_state),
        }
    }
}

impl Default for DiagramScene {
    /// Empty board with a white background.
    fn default() -> Self {
        DiagramScene {
            elements: Vec::new(),
            app_state: SceneAppState {
                view_background_color: Some("#ffffff".to_string()),
                ..SceneAppState::default()
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_scene_is_empty_white_board() {
        let scene = DiagramScene::default();
        assert!(scene.elements.is_empty());
        assert_eq!(
            scene.app_state.view_background_color.as_deref(),
            Some("#ffffff")
        );
        assert!(scene.app_state.grid_size.is_none());
    }

    #[test]
    fn sanitize_keeps_only_whitelisted_fields() {
        let raw = json!({
            "viewBackgroundColor": "#fafafa",
            "gridSize": 20.0,
            "scrollX": -14.5,
            "scrollY": 230.0,
            "zoom": {"value": 1.25},
            "theme": "dark",
            "collaborators": {"alice": {}},
            "cursorButton": "down",
            "openDialog": "export"
        });
        let state = SceneAppState::sanitize(&raw);
        assert_eq!(state.view_background_color.as_deref(), Some("#fafafa"));
        assert_eq!(state.grid_size, Some(20.0));
        assert_eq!(state.scroll_x, Some(-14.5));
        assert_eq!(state.scroll_y, Some(230.0));
        assert_eq!(state.zoom, Some(json!({"value": 1.25})));
        assert_eq!(state.theme.as_deref(), Some("dark"));

        // Transient fields never survive into the serialized form.
        let serialized = serde_json::to_value(&state).unwrap();
        assert!(serialized.get("collaborators").is_none());
        assert!(serialized.get("cursorButton").is_none());
    }

    #[test]
    fn sanitize_tolerates_missing_and_null_fields() {
        let state = SceneAppState::sanitize(&json!({"zoom": null}));
        assert_eq!(state, SceneAppState::default());
    }

    #[test]
    fn from_widget_carries_elements_through_opaque() {
        let elements = vec![json!({"type": "rectangle", "x": 1, "y": 2})];
        let scene = DiagramScene::from_widget(elements.clone(), &json!({"theme": "light"}));
        assert_eq!(scene.elements, elements);
        assert_eq!(scene.app_state.theme.as_deref(), Some("light"));
    }

    #[test]
    fn deserialization_ignores_unknown_app_state_fields() {
        let json = r##"{
            "elements": [],
            "appState": {"viewBackgroundColor": "#ffffff", "leftoverField": true}
        }"##;
        let scene: DiagramScene = serde_json::from_str(json).unwrap();
        assert_eq!(
            scene.app_state.view_background_color.as_deref(),
            Some("#ffffff")
        );
    }

    #[test]
    fn round_trip_preserves_scene() {
        let scene = DiagramScene::from_widget(
            vec![json!({"type": "arrow"})],
            &json!({"scrollX": 10.0, "scrollY": 20.0, "zoom": 1.5}),
        );
        let text = serde_json::to_string(&scene).unwrap();
        let back: DiagramScene = serde_json::from_str(&text).unwrap();
        assert_eq!(back, scene);
    }
}
