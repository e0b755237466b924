//! Read interface of the project-wide index
//!
//! The index is owned by the surrounding platform: it is built and kept up to
//! date elsewhere and exposes a consistent snapshot for the duration of a
//! query. This module only fixes what the resolver reads from it.

use crate::symbol::Declaration;
use crate::types::Location;
use serde::{Deserialize, Serialize};

/// One definition of a container service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Id of the service this one is an alias of
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// One definition of a container parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub key: String,
    /// `None` when the value is not a scalar (arrays, expressions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// A constructor or method argument as declared in source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// What the resolver needs to know about a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub fqn: String,
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// `None` when the class declares no constructor of its own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constructor: Option<Vec<ArgumentInfo>>,
}

/// A `{% block %}` declared in a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub name: String,
    pub location: Location,
}

/// An indexed template file and the blocks it declares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFile {
    /// Logical name used in references, e.g. `base.html.twig`
    pub name: String,
    pub location: Location,
    #[serde(default)]
    pub blocks: Vec<BlockInfo>,
}

/// A named route from the routing table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub name: String,
    /// Controller target, usually `Class::method`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Read-only view of the project-wide index
///
/// Implementations must be safe for concurrent readers. Sequences are returned
/// in the index's own order; for services and parameters that order is the
/// merge order, most authoritative definition first.
pub trait ProjectIndex: Send + Sync {
    /// Elements whose globally-unique signature equals `signature`
    fn lookup_by_signature(&self, signature: &str) -> Vec<Declaration>;

    /// Literal value of a constant initializer or field default
    fn literal_value_of(&self, element: &Declaration) -> Option<String>;

    /// Service definitions under an already-normalized key
    fn lookup_services_by_key(&self, key: &str) -> Vec<ServiceDefinition>;

    /// Parameter definitions under an already-normalized key
    fn lookup_parameters_by_key(&self, key: &str) -> Vec<ParameterDefinition>;

    /// Class by fully-qualified name, leading `\` optional
    fn find_class(&self, fqn: &str) -> Option<ClassInfo>;

    fn template_files(&self) -> Vec<TemplateFile>;

    fn template_file(&self, name: &str) -> Option<TemplateFile>;

    fn route(&self, name: &str) -> Option<Route>;

    /// Catalog entries for `key` in `domain`
    fn translation_targets(&self, domain: &str, key: &str) -> Vec<Declaration>;

    /// Catalog files backing `domain`
    fn translation_domain_files(&self, domain: &str) -> Vec<Declaration>;
}
