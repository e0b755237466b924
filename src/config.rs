//! Layered configuration for the resolver.
//!
//! Sources, later ones winning:
//! - Default values
//! - `.frameref/settings.toml`, found by walking up from the current directory
//! - Environment variables
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `FREF_` and use double
//! underscores to separate nested levels:
//! - `FREF_DEBUG=true` sets `debug`
//! - `FREF_TEMPLATES__TRANS_FUNCTION=t` sets `templates.trans_function`
//! - `FREF_CONTAINER__MAX_ALIAS_DEPTH=4` sets `container.max_alias_depth`

use crate::signature::{DEFAULT_ARGUMENT_COUNT, DEFAULT_DELIMITER, is_valid_delimiter};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".frameref";
const ENV_PREFIX: &str = "FREF_";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Global debug mode
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Framework support; when off no producer answers
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Path to the index snapshot
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    /// Workspace root directory (where .frameref is located)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,

    #[serde(default)]
    pub signatures: SignatureConfig,

    #[serde(default)]
    pub templates: TemplateConfig,

    #[serde(default)]
    pub container: ContainerConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SignatureConfig {
    /// Separates a call-site signature from its argument
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Call sites with any other argument count are not encoded
    #[serde(default = "default_expected_argument_count")]
    pub expected_argument_count: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TemplateConfig {
    /// Filter/function name of the translator
    #[serde(default = "default_trans_function")]
    pub trans_function: String,

    /// Domain used when a template names none
    #[serde(default = "default_domain")]
    pub default_domain: String,

    /// Tag setting the domain for the rest of a template
    #[serde(default = "default_domain_tag")]
    pub default_domain_tag: String,

    /// Functions taking a route name as first argument
    #[serde(default = "default_route_functions")]
    pub route_functions: Vec<String>,

    /// Tags whose string arguments name template files
    #[serde(default = "default_file_tags")]
    pub file_tags: Vec<String>,

    /// Functions taking a template file as first argument
    #[serde(default = "default_file_functions")]
    pub file_functions: Vec<String>,

    /// Both the block tag and the block function
    #[serde(default = "default_block_function")]
    pub block_function: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ContainerConfig {
    #[serde(default = "default_max_depth")]
    pub max_alias_depth: usize,

    /// How far up the class hierarchy to look for a constructor
    #[serde(default = "default_max_depth")]
    pub max_parent_depth: usize,
}

fn default_version() -> u32 {
    1
}
fn default_false() -> bool {
    false
}
fn default_true() -> bool {
    true
}
fn default_index_path() -> PathBuf {
    PathBuf::from(".frameref/index.json")
}
fn default_delimiter() -> char {
    DEFAULT_DELIMITER
}
fn default_expected_argument_count() -> usize {
    DEFAULT_ARGUMENT_COUNT
}
fn default_trans_function() -> String {
    "trans".to_string()
}
fn default_domain() -> String {
    "messages".to_string()
}
fn default_domain_tag() -> String {
    "trans_default_domain".to_string()
}
fn default_route_functions() -> Vec<String> {
    vec!["path".to_string(), "url".to_string()]
}
fn default_file_tags() -> Vec<String> {
    ["extends", "include", "embed", "import", "from", "use"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_file_functions() -> Vec<String> {
    vec!["include".to_string(), "source".to_string()]
}
fn default_block_function() -> String {
    "block".to_string()
}
fn default_max_depth() -> usize {
    crate::container::DEFAULT_MAX_ALIAS_DEPTH
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            debug: false,
            enabled: true,
            index_path: default_index_path(),
            workspace_root: None,
            signatures: SignatureConfig::default(),
            templates: TemplateConfig::default(),
            container: ContainerConfig::default(),
        }
    }
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            expected_argument_count: default_expected_argument_count(),
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            trans_function: default_trans_function(),
            default_domain: default_domain(),
            default_domain_tag: default_domain_tag(),
            route_functions: default_route_functions(),
            file_tags: default_file_tags(),
            file_functions: default_file_functions(),
            block_function: default_block_function(),
        }
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            max_alias_depth: default_max_depth(),
            max_parent_depth: default_max_depth(),
        }
    }
}

fn env_layer() -> Env {
    // FREF_TEMPLATES__TRANS_FUNCTION -> templates.trans_function
    Env::prefixed(ENV_PREFIX).map(|key| key.as_str().to_lowercase().replace("__", ".").into())
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));

        Self::load_from(config_path).map(|mut settings| {
            if settings.workspace_root.is_none() {
                settings.workspace_root = Self::workspace_root();
            }
            settings
        })
    }

    /// Load configuration from a specific file, still honoring the environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(env_layer())
            .extract::<Self>()
            .map_err(Box::new)?
            .validated()
    }

    /// Reject values the resolver cannot work with
    fn validated(self) -> Result<Self, Box<figment::Error>> {
        let delimiter = self.signatures.delimiter;
        if !is_valid_delimiter(delimiter) {
            return Err(Box::new(figment::Error::from(format!(
                "signatures.delimiter '{delimiter}' can occur inside a base signature"
            ))));
        }
        Ok(self)
    }

    /// Find `.frameref/settings.toml` from the current directory up to root
    fn find_workspace_config() -> Option<PathBuf> {
        Self::workspace_root().map(|root| root.join(CONFIG_DIR).join("settings.toml"))
    }

    /// Get the workspace root directory (where .frameref is located)
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::workspace_root_from(&current)
    }

    fn workspace_root_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|ancestor| ancestor.join(CONFIG_DIR).is_dir())
            .map(Path::to_path_buf)
    }

    /// Index path, anchored at the workspace root when relative
    pub fn resolved_index_path(&self) -> PathBuf {
        match &self.workspace_root {
            Some(root) if self.index_path.is_relative() => root.join(&self.index_path),
            _ => self.index_path.clone(),
        }
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file with helpful comments
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        Self::init_config_file_in(Path::new("."), force)
    }

    fn init_config_file_in(root: &Path, force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = root.join(CONFIG_DIR).join("settings.toml");

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let defaults = Settings::default();
        let template = format!(
            r#"# frameref configuration

# Version of the configuration schema
version = {version}

# Global debug mode
debug = false

# Framework support; set to false to switch every lookup off
enabled = true

# Index snapshot exported by the project indexer (relative to workspace root)
index_path = "{index_path}"

[signatures]
# Separates a call-site signature from its argument
delimiter = "{delimiter}"
# Only call sites with exactly this many arguments are encoded
expected_argument_count = {argument_count}

[templates]
trans_function = "{trans}"
default_domain = "{domain}"
default_domain_tag = "{domain_tag}"
route_functions = {route_functions:?}
file_tags = {file_tags:?}
file_functions = {file_functions:?}
block_function = "{block}"

[container]
# Alias hops followed before a service is given up on
max_alias_depth = {alias_depth}
# Parent classes searched for an inherited constructor
max_parent_depth = {parent_depth}
"#,
            version = defaults.version,
            index_path = defaults.index_path.display(),
            delimiter = defaults.signatures.delimiter,
            argument_count = defaults.signatures.expected_argument_count,
            trans = defaults.templates.trans_function,
            domain = defaults.templates.default_domain,
            domain_tag = defaults.templates.default_domain_tag,
            route_functions = defaults.templates.route_functions,
            file_tags = defaults.templates.file_tags,
            file_functions = defaults.templates.file_functions,
            block = defaults.templates.block_function,
            alias_depth = defaults.container.max_alias_depth,
            parent_depth = defaults.container.max_parent_depth,
        );

        std::fs::write(&config_path, template)?;

        Ok(config_path)
    }
}
