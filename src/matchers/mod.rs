//! Token classification
//!
//! Every dialect contributes a few pure predicates over a token and its
//! immediate structure. They are evaluated in the fixed order of `MATCHERS`
//! and the first one that accepts decides the token's role. Predicates are
//! written to be mutually exclusive; `accepting_roles` exposes every
//! acceptor so tests can catch overlaps.

pub mod twig;
pub mod yaml;

use crate::config::{Settings, TemplateConfig};
use crate::syntax::{Dialect, Token};
use serde::Serialize;
use std::fmt;
use tracing::trace;

/// Syntactic role of a token, as far as cross-references are concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenRole {
    ClassNameValue,
    ServiceReferenceValue,
    ParameterReferenceValue,
    ServiceIdKey,
    TemplateBlockReference,
    TemplateFileReference,
    RouteNameReference,
    TranslationDomainArgument,
    TranslationKeyReference,
}

impl TokenRole {
    pub fn dialect(self) -> Dialect {
        match self {
            Self::ClassNameValue
            | Self::ServiceReferenceValue
            | Self::ParameterReferenceValue
            | Self::ServiceIdKey => Dialect::Config,
            Self::TemplateBlockReference
            | Self::TemplateFileReference
            | Self::RouteNameReference
            | Self::TranslationDomainArgument
            | Self::TranslationKeyReference => Dialect::Template,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClassNameValue => "class-name-value",
            Self::ServiceReferenceValue => "service-reference-value",
            Self::ParameterReferenceValue => "parameter-reference-value",
            Self::ServiceIdKey => "service-id-key",
            Self::TemplateBlockReference => "template-block-reference",
            Self::TemplateFileReference => "template-file-reference",
            Self::RouteNameReference => "route-name-reference",
            Self::TranslationDomainArgument => "translation-domain-argument",
            Self::TranslationKeyReference => "translation-key-reference",
        }
    }
}

impl fmt::Display for TokenRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names the template predicates look for
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'s> {
    pub templates: &'s TemplateConfig,
}

impl<'s> MatchContext<'s> {
    pub fn new(settings: &'s Settings) -> Self {
        Self {
            templates: &settings.templates,
        }
    }

    pub fn is_trans_function(&self, name: &str) -> bool {
        self.templates.trans_function == name
    }

    pub fn is_route_function(&self, name: &str) -> bool {
        self.templates.route_functions.iter().any(|f| f == name)
    }

    pub fn is_file_function(&self, name: &str) -> bool {
        self.templates.file_functions.iter().any(|f| f == name)
    }

    pub fn is_file_tag(&self, name: &str) -> bool {
        self.templates.file_tags.iter().any(|t| t == name)
    }

    pub fn is_block_function(&self, name: &str) -> bool {
        self.templates.block_function == name
    }

    pub fn is_default_domain_tag(&self, name: &str) -> bool {
        self.templates.default_domain_tag == name
    }
}

type Predicate = fn(Token<'_>, &MatchContext<'_>) -> bool;

/// Evaluation order; the first acceptor wins
static MATCHERS: &[(TokenRole, Predicate)] = &[
    (TokenRole::ClassNameValue, yaml::is_class_name_value),
    (TokenRole::ServiceReferenceValue, yaml::is_service_reference),
    (TokenRole::ParameterReferenceValue, yaml::is_parameter_reference),
    (TokenRole::ServiceIdKey, yaml::is_service_id_key),
    (TokenRole::TemplateBlockReference, twig::is_block_reference),
    (TokenRole::TemplateFileReference, twig::is_file_reference),
    (TokenRole::RouteNameReference, twig::is_route_name),
    (TokenRole::TranslationDomainArgument, twig::is_translation_domain),
    (TokenRole::TranslationKeyReference, twig::is_translation_key),
];

fn candidates(token: Token<'_>) -> impl Iterator<Item = &'static (TokenRole, Predicate)> {
    let dialect = token.document().dialect();
    MATCHERS.iter().filter(move |(role, _)| role.dialect() == dialect)
}

/// Role of `token`, or `None` when no matcher accepts it
pub fn classify(token: Token<'_>, ctx: &MatchContext<'_>) -> Option<TokenRole> {
    let role = candidates(token)
        .find(|(_, accepts)| accepts(token, ctx))
        .map(|(role, _)| *role);
    trace!("classified {token:?} as {role:?}");
    role
}

/// Every role whose matcher accepts `token`, in evaluation order
pub fn accepting_roles(token: Token<'_>, ctx: &MatchContext<'_>) -> Vec<TokenRole> {
    candidates(token)
        .filter(|(_, accepts)| accepts(token, ctx))
        .map(|(role, _)| *role)
        .collect()
}
