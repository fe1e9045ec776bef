//! Test helper functions and fixtures

use serde_json::{json, Value};

/// `mighty_blade`: description plus display name and damage
pub fn mighty_blade_descriptor() -> Value {
    json!({
        "description": "A mighty blade",
        "default": {
            "showName": "Mighty Blade",
            "damage": 50
        }
    })
}

/// `basic_item`: the empty document
pub fn basic_item_descriptor() -> Value {
    json!({})
}
