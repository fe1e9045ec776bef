//! Item descriptor loading
//!
//! A descriptor is a JSON document named after the item it describes:
//!
//! ```json
//! {
//!   "description": "A mighty blade",
//!   "default": { "showName": "Mighty Blade", "damage": 50 }
//! }
//! ```
//!
//! The `default` object is open: keys the generator does not recognise are
//! kept but never fail loading.

use forge_foundation::{ForgeError, ForgeResult};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
struct RawDescriptor {
    #[serde(default)]
    description: Option<String>,
    #[serde(default, rename = "default")]
    defaults: Option<Map<String, Value>>,
}

/// One item's generation input
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    /// File stem of the descriptor, e.g. `mighty_blade`
    pub item_id: String,
    /// Where the descriptor was read from
    pub source: PathBuf,
    /// Tooltip text, empty when absent
    pub description: String,
    /// Display name, if the descriptor provides one
    pub show_name: Option<String>,
    /// The raw `default` object
    pub defaults: Map<String, Value>,
}

impl Descriptor {
    /// An empty descriptor, equivalent to the document `{}`
    pub fn new(item_id: impl Into<String>) -> Self {
        let item_id = item_id.into();
        Self {
            source: PathBuf::from(format!("{}.json", item_id)),
            item_id,
            description: String::new(),
            show_name: None,
            defaults: Map::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_default(mut self, field: impl Into<String>, value: Value) -> Self {
        let field = field.into();
        if field == "showName" {
            self.show_name = value.as_str().map(str::to_string);
        }
        self.defaults.insert(field, value);
        self
    }

    /// Read and validate the descriptor at `path`
    pub fn load(path: &Path) -> ForgeResult<Self> {
        let item_id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ForgeError::descriptor(path, "file name is not valid UTF-8"))?;
        let text = fs::read_to_string(path).map_err(|e| ForgeError::io(path, e))?;
        Self::from_json(item_id, path, &text)
    }

    /// Parse descriptor text for `item_id`
    pub fn from_json(item_id: &str, source: &Path, text: &str) -> ForgeResult<Self> {
        let raw: RawDescriptor = serde_json::from_str(text)
            .map_err(|e| ForgeError::descriptor(source, format!("invalid JSON: {}", e)))?;
        let defaults = raw.defaults.unwrap_or_default();

        let show_name = match defaults.get("showName") {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(name.clone()),
            Some(other) => {
                return Err(ForgeError::descriptor(
                    source,
                    format!("default.showName must be a string, found {}", other),
                ))
            }
        };

        if let Some(damage) = defaults.get("damage") {
            if !damage.is_null() && damage.as_i64().is_none() {
                return Err(ForgeError::descriptor(
                    source,
                    format!("default.damage must be an integer, found {}", damage),
                ));
            }
        }

        Ok(Self {
            item_id: item_id.to_string(),
            source: source.to_path_buf(),
            description: raw.description.unwrap_or_default(),
            show_name,
            defaults,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(text: &str) -> ForgeResult<Descriptor> {
        Descriptor::from_json("mighty_blade", Path::new("mighty_blade.json"), text)
    }

    #[test]
    fn test_full_descriptor() {
        let descriptor = parse(
            r#"{"description": "A mighty blade", "default": {"showName": "Mighty Blade", "damage": 50}}"#,
        )
        .unwrap();

        assert_eq!(descriptor.item_id, "mighty_blade");
        assert_eq!(descriptor.description, "A mighty blade");
        assert_eq!(descriptor.show_name.as_deref(), Some("Mighty Blade"));
        assert_eq!(descriptor.defaults.get("damage"), Some(&json!(50)));
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let descriptor = parse("{}").unwrap();
        assert_eq!(descriptor, Descriptor::new("mighty_blade"));
        assert!(descriptor.defaults.is_empty());
    }

    #[test]
    fn test_null_description_is_empty() {
        let descriptor = parse(r#"{"description": null}"#).unwrap();
        assert_eq!(descriptor.description, "");
    }

    #[test]
    fn test_unknown_default_keys_are_kept() {
        let descriptor = parse(r#"{"default": {"sparkles": [1, 2, 3]}}"#).unwrap();
        assert_eq!(descriptor.defaults.get("sparkles"), Some(&json!([1, 2, 3])));
    }

    #[test]
    fn test_wrong_types_are_descriptor_errors() {
        for text in [
            r#"{"default": {"damage": "lots"}}"#,
            r#"{"default": {"damage": 1.5}}"#,
            r#"{"default": {"showName": 7}}"#,
            r#"{"description": 3}"#,
            r#"[1, 2]"#,
            "{ not json",
        ] {
            let err = parse(text).unwrap_err();
            assert!(
                matches!(err, ForgeError::Descriptor { .. }),
                "{} should fail as a descriptor error, got {:?}",
                text,
                err
            );
        }
    }

    #[test]
    fn test_builder_matches_parsed_form() {
        let built = Descriptor::new("mighty_blade")
            .with_description("A mighty blade")
            .with_default("showName", json!("Mighty Blade"))
            .with_default("damage", json!(50));
        let parsed = parse(
            r#"{"description": "A mighty blade", "default": {"showName": "Mighty Blade", "damage": 50}}"#,
        )
        .unwrap();
        assert_eq!(built, parsed);
    }
}
