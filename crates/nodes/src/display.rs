//! `PipemindDisplayAny`: render an arbitrary value as text.

use serde_json::Value;
use tracing::debug;

/// Renders `value` for display.
///
/// Strings are returned verbatim, `null` as `None`, arrays and objects as
/// compact JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "None".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Stores `rendered` as the widget value of the node whose id matches
/// `unique_id` in `workflow.nodes`. Returns whether a node was updated.
pub fn write_widget_value(workflow_info: &mut Value, unique_id: &str, rendered: &str) -> bool {
    let Some(nodes) = workflow_info
        .get_mut("workflow")
        .and_then(|w| w.get_mut("nodes"))
        .and_then(Value::as_array_mut)
    else {
        return false;
    };
    let node = nodes.iter_mut().find(|node| match node.get("id") {
        Some(Value::String(id)) => id == unique_id,
        Some(Value::Number(id)) => id.to_string() == unique_id,
        _ => false,
    });
    match node.and_then(Value::as_object_mut) {
        Some(node) => {
            node.insert(
                "widgets_values".to_string(),
                Value::Array(vec![Value::String(rendered.to_string())]),
            );
            true
        }
        None => {
            debug!(unique_id, "no workflow node matches id");
            false
        }
    }
}

/// Renders `value` and, when both a workflow document and a node id are
/// supplied, records the rendering on that node.
pub fn display_any(value: &Value, unique_id: Option<&str>, workflow_info: Option<&mut Value>) -> String {
    let rendered = render_value(value);
    if let (Some(id), Some(info)) = (unique_id, workflow_info) {
        write_widget_value(info, id, &rendered);
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_scalars() {
        assert_eq!(render_value(&json!("plain text")), "plain text");
        assert_eq!(render_value(&json!(42)), "42");
        assert_eq!(render_value(&json!(1.5)), "1.5");
        assert_eq!(render_value(&json!(true)), "true");
        assert_eq!(render_value(&Value::Null), "None");
    }

    #[test]
    fn renders_collections_as_compact_json() {
        assert_eq!(render_value(&json!([1, "a"])), r#"[1,"a"]"#);
        assert_eq!(render_value(&json!({"k": null})), r#"{"k":null}"#);
    }

    #[test]
    fn writes_widget_value_on_matching_node() {
        let mut info = json!({
            "workflow": {"nodes": [{"id": 3, "widgets_values": []}, {"id": "7"}]}
        });
        let out = display_any(&json!(12), Some("7"), Some(&mut info));
        assert_eq!(out, "12");
        assert_eq!(info["workflow"]["nodes"][1]["widgets_values"], json!(["12"]));
        assert_eq!(info["workflow"]["nodes"][0]["widgets_values"], json!([]));

        assert!(write_widget_value(&mut info, "3", "x"));
        assert_eq!(info["workflow"]["nodes"][0]["widgets_values"], json!(["x"]));
    }

    #[test]
    fn missing_workflow_is_ignored() {
        let mut info = json!({"other": 1});
        assert!(!write_widget_value(&mut info, "1", "x"));
        assert_eq!(info, json!({"other": 1}));
        assert_eq!(display_any(&json!("t"), None, None), "t");
    }
}
