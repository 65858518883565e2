//! Generator option parsing and merging utilities.

use serde_json::Value;

use crate::parameters::GeneratorOptions;

/// Parse an inline JSON object such as `{"name": "lab", "node_count": 4}`
pub fn parse_inline_options(text: &str) -> Result<GeneratorOptions, String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(options)) => Ok(options),
        Ok(other) => Err(format!("Generator options must be a JSON object, found: {}", other)),
        Err(e) => Err(format!("Generator options are not valid JSON: {}", e)),
    }
}

/// Merge two option maps, with overrides taking precedence over defaults
pub fn merge_options(
    defaults: Option<GeneratorOptions>,
    overrides: Option<GeneratorOptions>,
) -> GeneratorOptions {
    let mut merged = defaults.unwrap_or_default();

    if let Some(overrides) = overrides {
        for (key, value) in overrides {
            merged.insert(key, value);
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_inline_options() {
        let options = parse_inline_options(r#"{"name": "lab", "node_count": 4}"#).unwrap();
        assert_eq!(options.get("name"), Some(&json!("lab")));
        assert_eq!(options.get("node_count"), Some(&json!(4)));

        assert!(parse_inline_options("[1, 2]").is_err());
        assert!(parse_inline_options("{name").is_err());
    }

    #[test]
    fn test_merge_options_overrides_win() {
        let defaults = parse_inline_options(r#"{"name": "file", "node_count": "3"}"#).unwrap();
        let overrides = parse_inline_options(r#"{"name": "inline"}"#).unwrap();

        let merged = merge_options(Some(defaults), Some(overrides));
        assert_eq!(merged.get("name"), Some(&json!("inline")));
        assert_eq!(merged.get("node_count"), Some(&json!("3")));

        assert!(merge_options(None, None).is_empty());
    }
}
