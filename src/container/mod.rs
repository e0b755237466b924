//! Service container facade
//!
//! Resolves the two framework namespaces every dialect leans on: services
//! (`@mailer` → implementing class) and parameters (`%locale%` → literal).
//! Keys are normalized here; when the index holds several definitions for one
//! key the first one in its merge order is used.

use crate::config::SignatureConfig;
use crate::index::{ClassInfo, ParameterDefinition, ProjectIndex, ServiceDefinition};
use crate::signature::{CallSite, decode_union, encode_with, resolve_literal, split_encoded};
use crate::symbol::normalize_fqn;
use crate::types::{ParameterKey, ServiceKey, trim_quote};
use indexmap::IndexSet;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, trace};

pub const DEFAULT_MAX_ALIAS_DEPTH: usize = 8;

static PARAMETER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^%[^%\s]+%$").expect("Invalid regex"));

/// `%name%` with a non-empty name free of `%` and whitespace
pub fn is_valid_parameter_name(text: &str) -> bool {
    PARAMETER_NAME.is_match(text)
}

/// Service id behind a reference marker.
///
/// `@id` and `@?id` give `id`. Escaped literals (`@@text`), expressions
/// (`@=expr`) and anything without the marker give `None`.
pub fn trim_special_syntax_service_name(text: &str) -> Option<&str> {
    let rest = trim_quote(text.trim()).strip_prefix('@')?;
    if rest.starts_with('@') || rest.starts_with('=') {
        return None;
    }
    let id = rest.strip_prefix('?').unwrap_or(rest).trim();
    if id.is_empty() { None } else { Some(id) }
}

/// Read-only view over the container namespaces of one index snapshot
#[derive(Clone, Copy)]
pub struct ContainerResolver<'a> {
    index: &'a dyn ProjectIndex,
    max_alias_depth: usize,
}

impl<'a> ContainerResolver<'a> {
    pub fn new(index: &'a dyn ProjectIndex) -> Self {
        Self {
            index,
            max_alias_depth: DEFAULT_MAX_ALIAS_DEPTH,
        }
    }

    pub fn with_max_alias_depth(mut self, depth: usize) -> Self {
        self.max_alias_depth = depth;
        self
    }

    /// Winning definition for a service id
    pub fn service(&self, id: &str) -> Option<ServiceDefinition> {
        let key = ServiceKey::new(id)?;
        let definition = self.index.lookup_services_by_key(key.as_str()).into_iter().next();
        if definition.is_none() {
            debug!("unknown service '{key}'");
        }
        definition
    }

    /// Class implementing a service, following aliases
    pub fn resolve_service(&self, id: &str) -> Option<String> {
        let mut current = self.service(id)?;

        for _ in 0..=self.max_alias_depth {
            if let Some(class) = current.class.as_deref().filter(|c| !c.trim().is_empty()) {
                return self.resolve_class_name(class);
            }

            if let Some(alias) = current.alias.as_deref() {
                current = self.service(alias)?;
                continue;
            }

            // Definitions without a class use their id as the class name
            if current.id.contains('\\') {
                return Some(normalize_fqn(&current.id).to_string());
            }

            debug!("service '{}' declares no class", current.id);
            return None;
        }

        debug!("alias chain for '{id}' exceeds {} hops", self.max_alias_depth);
        None
    }

    /// Winning definition for a parameter; `%` markers and quotes are optional
    pub fn parameter(&self, key: &str) -> Option<ParameterDefinition> {
        let key = ParameterKey::new(key)?;
        let definition = self
            .index
            .lookup_parameters_by_key(key.as_str())
            .into_iter()
            .next();
        if definition.is_none() {
            debug!("unknown parameter '{key}'");
        }
        definition
    }

    /// Literal value of a parameter
    pub fn resolve_parameter(&self, key: &str) -> Option<String> {
        let definition = self.parameter(key)?;
        if definition.value.is_none() {
            debug!("parameter '{}' has no scalar value", definition.key);
        }
        definition.value
    }

    /// Class name written in a definition, expanding a `%parameter%` value
    pub fn resolve_class_name(&self, raw: &str) -> Option<String> {
        let text = trim_quote(raw.trim());
        if text.is_empty() {
            return None;
        }

        if is_valid_parameter_name(text) {
            return self
                .resolve_parameter(text)
                .map(|class| normalize_fqn(&class).to_string());
        }

        Some(normalize_fqn(text).to_string())
    }

    /// Service classes an encoded call-site signature stands for.
    ///
    /// Each union branch has its argument turned back into a literal (looking
    /// deferred references up in the index) and used as a service id. Branches
    /// that do not resolve are dropped; the result keeps first-seen order.
    pub fn resolve_signature(&self, signature: &str, delimiter: char) -> Vec<String> {
        let mut classes = IndexSet::new();
        for branch in decode_union(signature).into_iter().filter(|b| !b.is_empty()) {
            let Some((base, parameter)) = split_encoded(branch, delimiter) else {
                trace!("'{branch}' carries no argument");
                continue;
            };
            let Some(id) = resolve_literal(self.index, parameter) else {
                continue;
            };
            match self.resolve_service(&id) {
                Some(class) => {
                    classes.insert(class);
                }
                None => debug!("{base}: '{id}' names no service class"),
            }
        }
        classes.into_iter().collect()
    }

    /// Encode `call` with the configured signature settings and resolve it
    pub fn resolve_call_site(&self, call: &CallSite, config: &SignatureConfig) -> Vec<String> {
        match encode_with(call, config.delimiter, config.expected_argument_count) {
            Some(signature) => self.resolve_signature(&signature, config.delimiter),
            None => Vec::new(),
        }
    }

    /// Class declaration behind a class name or class parameter
    pub fn resolved_class(&self, raw: &str) -> Option<ClassInfo> {
        let name = self.resolve_class_name(raw)?;
        let class = self.index.find_class(&name);
        if class.is_none() {
            debug!("class '{name}' is not indexed");
        }
        class
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryIndex;
    use crate::types::Location;

    fn service(id: &str, class: Option<&str>, alias: Option<&str>) -> ServiceDefinition {
        ServiceDefinition {
            id: id.to_string(),
            class: class.map(str::to_string),
            alias: alias.map(str::to_string),
            location: None,
        }
    }

    fn parameter(key: &str, value: Option<&str>) -> ParameterDefinition {
        ParameterDefinition {
            key: key.to_string(),
            value: value.map(str::to_string),
            location: None,
        }
    }

    #[test]
    fn test_parameter_name_validity() {
        assert!(is_valid_parameter_name("%locale%"));
        assert!(is_valid_parameter_name("%kernel.project_dir%"));
        assert!(!is_valid_parameter_name("%%"));
        assert!(!is_valid_parameter_name("%a b%"));
        assert!(!is_valid_parameter_name("%a%b%"));
        assert!(!is_valid_parameter_name("locale"));
    }

    #[test]
    fn test_trim_special_syntax() {
        assert_eq!(trim_special_syntax_service_name("@mailer"), Some("mailer"));
        assert_eq!(trim_special_syntax_service_name("'@?logger'"), Some("logger"));
        assert_eq!(trim_special_syntax_service_name("@@escaped"), None);
        assert_eq!(trim_special_syntax_service_name("@=service('x')"), None);
        assert_eq!(trim_special_syntax_service_name("mailer"), None);
        assert_eq!(trim_special_syntax_service_name("@"), None);
    }

    #[test]
    fn test_resolve_service_normalizes_key() {
        let index = MemoryIndex::new();
        index.insert_service(service("app.mailer", Some("App\\Mailer"), None));
        let container = ContainerResolver::new(&index);

        assert_eq!(container.resolve_service("'App.Mailer'").as_deref(), Some("App\\Mailer"));
        assert_eq!(container.resolve_service("@app.mailer").as_deref(), Some("App\\Mailer"));
        assert_eq!(container.resolve_service("app.unknown"), None);
    }

    #[test]
    fn test_resolve_service_follows_aliases_and_parameters() {
        let index = MemoryIndex::new();
        index.insert_parameter(parameter("app.mailer.class", Some("\\App\\SmtpMailer")));
        index.insert_service(service("app.mailer", Some("%app.mailer.class%"), None));
        index.insert_service(service("mailer", None, Some("app.mailer")));
        let container = ContainerResolver::new(&index);

        assert_eq!(container.resolve_service("mailer").as_deref(), Some("App\\SmtpMailer"));
    }

    #[test]
    fn test_alias_cycle_ends_without_answer() {
        let index = MemoryIndex::new();
        index.insert_service(service("a", None, Some("b")));
        index.insert_service(service("b", None, Some("a")));
        let container = ContainerResolver::new(&index).with_max_alias_depth(3);

        assert_eq!(container.resolve_service("a"), None);
    }

    #[test]
    fn test_id_as_class() {
        let index = MemoryIndex::new();
        index.insert_service(service("App\\Service\\Clock", None, None));
        index.insert_service(service("clock", None, None));
        let container = ContainerResolver::new(&index);

        assert_eq!(
            container.resolve_service("App\\Service\\Clock").as_deref(),
            Some("App\\Service\\Clock")
        );
        assert_eq!(container.resolve_service("clock"), None);
    }

    #[test]
    fn test_override_wins_deterministically() {
        let index = MemoryIndex::new();
        index.insert_service(service("app.mailer", Some("App\\Mailer"), None));
        index.insert_service(service("app.mailer", Some("App\\NullMailer"), None));
        let container = ContainerResolver::new(&index);

        for _ in 0..3 {
            assert_eq!(container.resolve_service("app.mailer").as_deref(), Some("App\\NullMailer"));
        }
    }

    #[test]
    fn test_resolve_parameter() {
        let index = MemoryIndex::new();
        index.insert_parameter(parameter("locale", Some("en")));
        index.insert_parameter(parameter("app.handlers", None));
        let container = ContainerResolver::new(&index);

        assert_eq!(container.resolve_parameter("%Locale%").as_deref(), Some("en"));
        assert_eq!(container.resolve_parameter("locale").as_deref(), Some("en"));
        assert_eq!(container.resolve_parameter("%app.handlers%"), None);
        assert_eq!(container.resolve_parameter("%missing%"), None);
    }

    #[test]
    fn test_resolved_class() {
        let index = MemoryIndex::new();
        index.insert_class(ClassInfo {
            fqn: "App\\Mailer".to_string(),
            location: Location::file("src/Mailer.php"),
            parent: None,
            constructor: None,
        });
        index.insert_parameter(parameter("mailer.class", Some("App\\Mailer")));
        let container = ContainerResolver::new(&index);

        assert!(container.resolved_class("\\App\\Mailer").is_some());
        assert!(container.resolved_class("'%mailer.class%'").is_some());
        assert!(container.resolved_class("App\\Missing").is_none());
        assert!(container.resolved_class("  ").is_none());
    }
}
