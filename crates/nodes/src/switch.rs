//! `BooleanSwitchAny`: forward one of two inputs.

use tracing::debug;

/// Returns `on_true` when `switch` is set, otherwise `on_false`.
///
/// Generic over the value so any payload type can be routed; both branches
/// must share a type.
pub fn boolean_switch<T>(on_true: T, on_false: T, switch: bool) -> T {
    debug!(switch, "boolean switch");
    if switch {
        on_true
    } else {
        on_false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn routes_strings() {
        assert_eq!(boolean_switch("value_true", "value_false", true), "value_true");
        assert_eq!(boolean_switch("value_true", "value_false", false), "value_false");
    }

    #[test]
    fn routes_owned_collections() {
        assert_eq!(boolean_switch(vec![1, 2, 3], vec![4, 5, 6], false), vec![4, 5, 6]);
        assert_eq!(boolean_switch(Some(42), None, true), Some(42));
    }

    #[test]
    fn routes_heterogeneous_json_values() {
        let out = boolean_switch(json!("string"), json!(123), false);
        assert_eq!(out, json!(123));
        let out = boolean_switch(json!({"key": "true"}), json!(null), true);
        assert_eq!(out["key"], "true");
    }
}
