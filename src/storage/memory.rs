use crate::index::{
    ClassInfo, ParameterDefinition, ProjectIndex, Route, ServiceDefinition, TemplateFile,
};
use crate::symbol::{Declaration, normalize_fqn};
use crate::types::{ParameterKey, ServiceKey};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::warn;

/// In-memory `ProjectIndex` used by the CLI and by tests.
///
/// Service and parameter definitions inserted later override earlier ones:
/// lookups return the most recent definition first.
#[derive(Clone, Debug, Default)]
pub struct MemoryIndex {
    elements: Arc<DashMap<String, Vec<Declaration>>>,
    literals: Arc<DashMap<Declaration, String>>,
    services: Arc<DashMap<String, Vec<ServiceDefinition>>>,
    parameters: Arc<DashMap<String, Vec<ParameterDefinition>>>,
    classes: Arc<DashMap<String, ClassInfo>>,
    templates: Arc<DashMap<String, TemplateFile>>,
    routes: Arc<DashMap<String, Route>>,
    translations: Arc<DashMap<(String, String), Vec<Declaration>>>,
    domain_files: Arc<DashMap<String, Vec<Declaration>>>,
}

/// Counts per namespace, for status output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexStats {
    pub elements: usize,
    pub services: usize,
    pub parameters: usize,
    pub classes: usize,
    pub templates: usize,
    pub routes: usize,
    pub translations: usize,
}

fn class_key(fqn: &str) -> String {
    normalize_fqn(fqn).to_lowercase()
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class-level element and, optionally, its literal value.
    ///
    /// Returns `false` for declarations that have no index signature.
    pub fn insert_element(&self, element: Declaration, literal: Option<String>) -> bool {
        let Some(signature) = element.signature() else {
            warn!("ignoring {element}: only class-level elements carry signatures");
            return false;
        };

        if let Some(value) = literal {
            self.literals.insert(element.clone(), value);
        }

        let mut entry = self.elements.entry(signature).or_default();
        if !entry.contains(&element) {
            entry.push(element);
        }
        true
    }

    pub fn insert_service(&self, definition: ServiceDefinition) -> bool {
        let Some(key) = ServiceKey::new(&definition.id) else {
            warn!("ignoring service with empty id");
            return false;
        };
        self.services
            .entry(key.as_str().to_string())
            .or_default()
            .insert(0, definition);
        true
    }

    pub fn insert_parameter(&self, definition: ParameterDefinition) -> bool {
        let Some(key) = ParameterKey::new(&definition.key) else {
            warn!("ignoring parameter with empty key");
            return false;
        };
        self.parameters
            .entry(key.as_str().to_string())
            .or_default()
            .insert(0, definition);
        true
    }

    /// Register a class; its declaration becomes reachable by `#C` signature too
    pub fn insert_class(&self, class: ClassInfo) {
        self.insert_element(
            Declaration::Class {
                fqn: normalize_fqn(&class.fqn).to_string(),
                location: class.location.clone(),
            },
            None,
        );
        self.classes.insert(class_key(&class.fqn), class);
    }

    pub fn insert_template(&self, template: TemplateFile) {
        self.templates.insert(template.name.clone(), template);
    }

    pub fn insert_route(&self, route: Route) {
        self.routes.insert(route.name.clone(), route);
    }

    /// Register a catalog entry; anything but `TranslationEntry` is ignored
    pub fn insert_translation(&self, entry: Declaration) -> bool {
        let Declaration::TranslationEntry { domain, key, .. } = &entry else {
            return false;
        };
        self.translations
            .entry((domain.clone(), key.clone()))
            .or_default()
            .push(entry);
        true
    }

    /// Register a catalog file; anything but `TranslationDomain` is ignored
    pub fn insert_domain_file(&self, file: Declaration) -> bool {
        let Declaration::TranslationDomain { domain, .. } = &file else {
            return false;
        };
        self.domain_files
            .entry(domain.clone())
            .or_default()
            .push(file);
        true
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            elements: self.elements.iter().map(|e| e.value().len()).sum(),
            services: self.services.len(),
            parameters: self.parameters.len(),
            classes: self.classes.len(),
            templates: self.templates.len(),
            routes: self.routes.len(),
            translations: self.translations.iter().map(|e| e.value().len()).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stats() == IndexStats::default()
    }
}

impl ProjectIndex for MemoryIndex {
    fn lookup_by_signature(&self, signature: &str) -> Vec<Declaration> {
        self.elements
            .get(signature)
            .map(|elements| elements.clone())
            .unwrap_or_default()
    }

    fn literal_value_of(&self, element: &Declaration) -> Option<String> {
        self.literals.get(element).map(|value| value.clone())
    }

    fn lookup_services_by_key(&self, key: &str) -> Vec<ServiceDefinition> {
        self.services
            .get(key)
            .map(|defs| defs.clone())
            .unwrap_or_default()
    }

    fn lookup_parameters_by_key(&self, key: &str) -> Vec<ParameterDefinition> {
        self.parameters
            .get(key)
            .map(|defs| defs.clone())
            .unwrap_or_default()
    }

    fn find_class(&self, fqn: &str) -> Option<ClassInfo> {
        self.classes.get(&class_key(fqn)).map(|class| class.clone())
    }

    fn template_files(&self) -> Vec<TemplateFile> {
        let mut files: Vec<TemplateFile> =
            self.templates.iter().map(|t| t.value().clone()).collect();
        files.sort_by(|a, b| a.name.cmp(&b.name));
        files
    }

    fn template_file(&self, name: &str) -> Option<TemplateFile> {
        self.templates.get(name).map(|t| t.clone())
    }

    fn route(&self, name: &str) -> Option<Route> {
        self.routes.get(name).map(|r| r.clone())
    }

    fn translation_targets(&self, domain: &str, key: &str) -> Vec<Declaration> {
        self.translations
            .get(&(domain.to_string(), key.to_string()))
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    fn translation_domain_files(&self, domain: &str) -> Vec<Declaration> {
        self.domain_files
            .get(domain)
            .map(|files| files.clone())
            .unwrap_or_default()
    }
}
