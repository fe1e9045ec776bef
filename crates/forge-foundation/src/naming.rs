//! Naming utilities for generated code
//!
//! Item ids come from descriptor file names and are usually snake_case or
//! kebab-case (`mighty_blade`, `frost-bow`). The generated C# class is the
//! PascalCase form of the id. Identifiers coming from configuration
//! (namespace, base type, member names) are validated here as well.

use crate::error::{ForgeError, ForgeResult};

/// Reserved C# keywords. Contextual keywords (`var`, `record`, ...) are legal
/// identifiers and are deliberately absent.
const CSHARP_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// Convert an item id to the class name the generator emits for it
///
/// # Examples
///
/// ```
/// use forge_foundation::naming::class_name_for_item;
/// assert_eq!(class_name_for_item("mighty_blade").unwrap(), "MightyBlade");
/// assert_eq!(class_name_for_item("frost-bow").unwrap(), "FrostBow");
/// assert_eq!(class_name_for_item("MightyBlade").unwrap(), "MightyBlade");
/// ```
pub fn class_name_for_item(item_id: &str) -> ForgeResult<String> {
    let name = to_pascal_case(item_id);
    if name.is_empty() {
        return Err(ForgeError::invalid_identifier(
            item_id,
            "item id contains no word characters",
        ));
    }
    if !is_valid_identifier(&name) {
        return Err(ForgeError::invalid_identifier(
            name,
            format!("derived from item id '{}' is not a valid C# identifier", item_id),
        ));
    }
    Ok(name)
}

/// Join the words of `s` in PascalCase
///
/// Words are separated by `_`, `-`, `.` or whitespace. The first character of
/// each word is uppercased; the rest keeps its casing so that ids which are
/// already PascalCase survive unchanged.
pub fn to_pascal_case(s: &str) -> String {
    split_words(s).into_iter().map(capitalize_first).collect()
}

/// Split a string into words on separator characters
fn split_words(s: &str) -> Vec<&str> {
    s.split(|c: char| c == '_' || c == '-' || c == '.' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Capitalize the first character of a string
fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Check that `s` is a plain (non-verbatim) C# identifier that is not a keyword
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_alphabetic() || first == '_') {
        return false;
    }
    if !chars.all(|c| c.is_alphanumeric() || c == '_') {
        return false;
    }
    !CSHARP_KEYWORDS.contains(&s)
}

/// Check a dotted name such as `TerraDota.Items` or `Item.damage`
pub fn is_valid_qualified_name(s: &str) -> bool {
    !s.is_empty() && s.split('.').all(is_valid_identifier)
}
