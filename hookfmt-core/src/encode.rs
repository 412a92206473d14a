//! JSON to block-style YAML conversion.
//!
//! `serde_json` is built with `preserve_order`, so mapping keys come out in
//! the order they appeared in the request body. The YAML emitter never
//! produces anchors or aliases for values built from JSON.

use crate::error::Result;

/// Parse `json` and serialize it as YAML.
pub fn json_to_yaml(json: &str) -> Result<String> {
    let value: serde_json::Value = serde_json::from_str(json.trim())?;
    let yaml = serde_yaml::to_string(&value)?;
    Ok(yaml)
}
