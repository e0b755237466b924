//! Resolved declarations
//!
//! Every answer the resolver hands out is a `Declaration`: one variant per kind
//! of navigable thing, each carrying only what a consumer needs to jump to it.

use crate::types::Location;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A navigable declaration in one of the project's dialects
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Declaration {
    Class {
        fqn: String,
        location: Location,
    },
    Method {
        class: String,
        name: String,
        location: Location,
    },
    Field {
        class: String,
        name: String,
        location: Location,
    },
    Constant {
        class: String,
        name: String,
        location: Location,
    },
    TemplateBlock {
        name: String,
        template: String,
        location: Location,
    },
    TemplateFile {
        name: String,
        location: Location,
    },
    TranslationEntry {
        domain: String,
        key: String,
        location: Location,
    },
    TranslationDomain {
        domain: String,
        location: Location,
    },
    Parameter {
        key: String,
        location: Location,
    },
}

/// Drop the leading namespace separator so `\A\B` and `A\B` compare equal
pub fn normalize_fqn(fqn: &str) -> &str {
    fqn.trim().trim_start_matches('\\')
}

impl Declaration {
    pub fn location(&self) -> &Location {
        match self {
            Self::Class { location, .. }
            | Self::Method { location, .. }
            | Self::Field { location, .. }
            | Self::Constant { location, .. }
            | Self::TemplateBlock { location, .. }
            | Self::TemplateFile { location, .. }
            | Self::TranslationEntry { location, .. }
            | Self::TranslationDomain { location, .. }
            | Self::Parameter { location, .. } => location,
        }
    }

    /// Short label shown next to the location
    pub fn display_name(&self) -> String {
        match self {
            Self::Class { fqn, .. } => normalize_fqn(fqn).to_string(),
            Self::Method { class, name, .. } => format!("{}::{name}()", normalize_fqn(class)),
            Self::Field { class, name, .. } => format!("{}::${name}", normalize_fqn(class)),
            Self::Constant { class, name, .. } => format!("{}::{name}", normalize_fqn(class)),
            Self::TemplateBlock { name, template, .. } => format!("block {name} in {template}"),
            Self::TemplateFile { name, .. } => name.clone(),
            Self::TranslationEntry { domain, key, .. } => format!("{domain}:{key}"),
            Self::TranslationDomain { domain, .. } => domain.clone(),
            Self::Parameter { key, .. } => format!("%{key}%"),
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Class { .. } => "class",
            Self::Method { .. } => "method",
            Self::Field { .. } => "field",
            Self::Constant { .. } => "constant",
            Self::TemplateBlock { .. } => "block",
            Self::TemplateFile { .. } => "template",
            Self::TranslationEntry { .. } => "translation",
            Self::TranslationDomain { .. } => "domain",
            Self::Parameter { .. } => "parameter",
        }
    }

    /// Index signature of class-level elements, `None` for the other dialects
    pub fn signature(&self) -> Option<String> {
        use crate::signature::{
            class_signature, constant_signature, field_signature, method_signature,
        };

        match self {
            Self::Class { fqn, .. } => Some(class_signature(fqn)),
            Self::Method { class, name, .. } => Some(method_signature(class, name)),
            Self::Field { class, name, .. } => Some(field_signature(class, name)),
            Self::Constant { class, name, .. } => Some(constant_signature(class, name)),
            _ => None,
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} at {}",
            self.kind_label(),
            self.display_name(),
            self.location()
        )
    }
}

/// Insertion-ordered set of declarations, de-duplicated by identity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationSet {
    items: IndexSet<Declaration>,
}

impl DeclarationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when an identical declaration was already present
    pub fn insert(&mut self, declaration: Declaration) -> bool {
        self.items.insert(declaration)
    }

    pub fn into_vec(self) -> Vec<Declaration> {
        self.items.into_iter().collect()
    }
}

impl Extend<Declaration> for DeclarationSet {
    fn extend<I: IntoIterator<Item = Declaration>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl FromIterator<Declaration> for DeclarationSet {
    fn from_iter<I: IntoIterator<Item = Declaration>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
