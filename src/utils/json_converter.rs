use serde_json::Value;

/// Convert a JSON value to the text shown in a table cell. Null becomes empty.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Whether a payload field counts as "present" when picking error details.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_render_plainly() {
        assert_eq!(value_to_string(&json!(7)), "7");
        assert_eq!(value_to_string(&json!("x")), "x");
        assert_eq!(value_to_string(&Value::Null), "");
    }

    #[test]
    fn empty_and_zero_are_not_truthy() {
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(is_truthy(&json!("boom")));
    }
}
