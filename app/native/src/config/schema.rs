//! JSON Schema for the configuration file.

use super::WinCtxConfig;

/// Generates a JSON Schema for the winctx configuration.
#[must_use]
pub fn generate_schema() -> schemars::Schema {
    let mut schema = schemars::schema_for!(WinCtxConfig);

    if let Some(obj) = schema.as_object_mut() {
        obj.insert(
            "$id".to_string(),
            serde_json::json!("https://raw.githubusercontent.com/winctx/winctx/main/winctx.schema.json"),
        );
    }

    schema
}

/// Generates a pretty-printed JSON Schema string.
#[must_use]
pub fn print_schema() -> String {
    serde_json::to_string_pretty(&generate_schema()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_describes_sections() {
        let parsed: serde_json::Value = serde_json::from_str(&print_schema()).unwrap();

        assert_eq!(parsed["title"], "WinCtxConfig");
        assert!(parsed["$id"].as_str().unwrap().ends_with("winctx.schema.json"));
        assert!(parsed["properties"]["layout"].is_object());
        assert!(parsed["properties"]["audio"].is_object());
        assert!(parsed["properties"]["windows"].is_object());
    }
}
