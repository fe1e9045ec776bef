//! Configuration management for itemforge

use forge_foundation::naming::{is_valid_identifier, is_valid_qualified_name};
use forge_foundation::{ForgeError, ForgeResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Configuration file picked up from the working directory when no explicit
/// path is given.
pub const CONFIG_FILE_NAME: &str = "itemforge.toml";

/// Prefix of environment overrides, e.g. `ITEMFORGE__generator__baseType=ModItem`.
pub const ENV_PREFIX: &str = "ITEMFORGE__";

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Input and output locations
    #[serde(default)]
    pub paths: PathsConfig,
    /// Constants shared by the bootstrapper, locator and synthesizer
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Conventional locations, relative to the working directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathsConfig {
    /// Directory holding `*.json` item descriptors
    pub descriptors: PathBuf,
    /// Directory receiving the generated `*.cs` files
    pub output: PathBuf,
}

/// Everything the generator treats as fixed for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// Namespace holding the generated classes
    pub namespace: String,
    /// Parent type every generated class derives from
    pub base_type: String,
    /// Comment placed at the top of bootstrapped files
    pub banner: String,
    /// `using` directives required by the host framework
    pub imports: Vec<String>,
    /// Dotted path of the tooltip registration call
    pub tooltip_entry_point: String,
    /// Spaces per indentation level in generated files
    pub indent_width: usize,
    /// Names and return kinds of the generator-owned members
    pub members: CanonicalMembers,
    /// Recognised default-data fields, in emission order
    pub properties: Vec<PropertyRule>,
}

/// The fixed dispatch surface expected by the host framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalMembers {
    /// Registers the tooltip text
    pub static_defaults: MemberSignature,
    /// Assigns recognised default-data fields
    pub defaults: MemberSignature,
    /// Recipe registration, empty unless extended
    pub recipes: MemberSignature,
    /// Use handler, returns `true` by default
    pub use_item: MemberSignature,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSignature {
    pub name: String,
    pub return_type: String,
}

/// Maps one descriptor `default` field onto an item property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRule {
    /// Key inside the descriptor's `default` object
    pub field: String,
    /// Dotted assignment target, e.g. `Item.damage`
    pub target: String,
    /// Expected JSON value kind
    pub kind: ValueKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Integer,
    Float,
    Boolean,
    String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format for development
    #[default]
    Pretty,
    /// Structured JSON format
    Json,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            descriptors: PathBuf::from("Configurations"),
            output: PathBuf::from("TerraDota/Items"),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            namespace: "TerraDota.Items".to_string(),
            base_type: "ModItem".to_string(),
            banner: "/***automatically generated by itemforge***/".to_string(),
            imports: vec![
                "Terraria".to_string(),
                "Terraria.ID".to_string(),
                "Terraria.ModLoader".to_string(),
            ],
            tooltip_entry_point: "Tooltip.SetDefault".to_string(),
            indent_width: 4,
            members: CanonicalMembers::default(),
            properties: vec![
                PropertyRule::new("damage", "Item.damage", ValueKind::Integer),
                PropertyRule::new("knockBack", "Item.knockBack", ValueKind::Float),
                PropertyRule::new("useTime", "Item.useTime", ValueKind::Integer),
                PropertyRule::new("useAnimation", "Item.useAnimation", ValueKind::Integer),
                PropertyRule::new("width", "Item.width", ValueKind::Integer),
                PropertyRule::new("height", "Item.height", ValueKind::Integer),
                PropertyRule::new("value", "Item.value", ValueKind::Integer),
                PropertyRule::new("rare", "Item.rare", ValueKind::Integer),
                PropertyRule::new("autoReuse", "Item.autoReuse", ValueKind::Boolean),
            ],
        }
    }
}

impl Default for CanonicalMembers {
    fn default() -> Self {
        Self {
            static_defaults: MemberSignature::new("SetStaticDefaults", "void"),
            defaults: MemberSignature::new("SetDefaults", "void"),
            recipes: MemberSignature::new("AddRecipes", "void"),
            use_item: MemberSignature::new("UseItem", "bool?"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl MemberSignature {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
        }
    }
}

impl PropertyRule {
    pub fn new(field: impl Into<String>, target: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            field: field.into(),
            target: target.into(),
            kind,
        }
    }
}

impl CanonicalMembers {
    /// All four signatures in dispatch-table order.
    pub fn all(&self) -> [&MemberSignature; 4] {
        [
            &self.static_defaults,
            &self.defaults,
            &self.recipes,
            &self.use_item,
        ]
    }
}

impl GeneratorConfig {
    fn validate(&self) -> ForgeResult<()> {
        if !is_valid_qualified_name(&self.namespace) {
            return Err(ForgeError::config(format!(
                "generator.namespace '{}' is not a valid C# namespace",
                self.namespace
            )));
        }
        if !is_valid_identifier(&self.base_type) {
            return Err(ForgeError::config(format!(
                "generator.baseType '{}' is not a valid C# identifier",
                self.base_type
            )));
        }
        if !is_comment_block(&self.banner) {
            return Err(ForgeError::config(format!(
                "generator.banner '{}' must be a // or /* */ comment",
                self.banner
            )));
        }
        for import in &self.imports {
            if !is_valid_qualified_name(import) {
                return Err(ForgeError::config(format!(
                    "generator.imports entry '{}' is not a valid namespace",
                    import
                )));
            }
        }
        if !is_valid_qualified_name(&self.tooltip_entry_point) {
            return Err(ForgeError::config(format!(
                "generator.tooltipEntryPoint '{}' is not a dotted C# name",
                self.tooltip_entry_point
            )));
        }
        if !(1..=16).contains(&self.indent_width) {
            return Err(ForgeError::config(format!(
                "generator.indentWidth must be between 1 and 16, got {}",
                self.indent_width
            )));
        }

        let mut names = HashSet::new();
        for member in self.members.all() {
            if !is_valid_identifier(&member.name) {
                return Err(ForgeError::config(format!(
                    "canonical member name '{}' is not a valid C# identifier",
                    member.name
                )));
            }
            if member.return_type.trim().is_empty() {
                return Err(ForgeError::config(format!(
                    "canonical member '{}' has an empty return type",
                    member.name
                )));
            }
            if !names.insert(member.name.as_str()) {
                return Err(ForgeError::config(format!(
                    "canonical member name '{}' is used twice",
                    member.name
                )));
            }
        }

        let mut fields = HashSet::new();
        for rule in &self.properties {
            if rule.field.is_empty() {
                return Err(ForgeError::config("property rule with an empty field name"));
            }
            if !fields.insert(rule.field.as_str()) {
                return Err(ForgeError::config(format!(
                    "property field '{}' is mapped twice",
                    rule.field
                )));
            }
            if !is_valid_qualified_name(&rule.target) {
                return Err(ForgeError::config(format!(
                    "property target '{}' for field '{}' is not a dotted C# name",
                    rule.target, rule.field
                )));
            }
        }
        Ok(())
    }
}

/// Empty, a closed block comment, or only `//` lines
fn is_comment_block(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return true;
    }
    if text.starts_with("/*") {
        return text.len() >= 4 && text[2..].find("*/") == Some(text.len() - 4);
    }
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .all(|line| line.starts_with("//"))
}

impl AppConfig {
    /// Load configuration from defaults, a TOML file and the environment
    ///
    /// Priority order: environment > TOML file > defaults. The TOML file is
    /// `explicit` when given (and must exist), otherwise `itemforge.toml` in
    /// the working directory if present.
    pub fn load(explicit: Option<&Path>) -> ForgeResult<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Toml},
            Figment,
        };

        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

        match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(ForgeError::config(format!(
                        "configuration file {} does not exist",
                        path.display()
                    )));
                }
                tracing::debug!(path = %path.display(), "Loading configuration file");
                figment = figment.merge(Toml::file(path));
            }
            None => {
                let path = Path::new(CONFIG_FILE_NAME);
                if path.is_file() {
                    tracing::debug!(path = %path.display(), "Loading configuration file");
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        // Keys keep their case so that camelCase fields can be addressed:
        // ITEMFORGE__generator__baseType=ModItem
        let figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(false));

        let config: AppConfig = figment
            .extract()
            .map_err(|e| ForgeError::config(format!("Failed to load configuration: {}", e)))?;

        config.validate()?;

        tracing::debug!(
            namespace = %config.generator.namespace,
            descriptors = %config.paths.descriptors.display(),
            output = %config.paths.output.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Check every constant the generator relies on
    pub fn validate(&self) -> ForgeResult<()> {
        self.generator.validate()?;

        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(ForgeError::config(format!(
                "logging.level '{}' is not one of trace, debug, info, warn, error",
                self.logging.level
            )));
        }
        Ok(())
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> ForgeResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ForgeError::config(format!("Failed to serialize configuration: {}", e)))
    }
}
