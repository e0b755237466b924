//! Go-to-declaration
//!
//! `None` means the token is not a reference this crate knows about, or that
//! its target does not exist. `Some(vec![])` is reserved for references that
//! exist but lead nowhere navigable, such as a route without a
//! `Class::method` controller. A block, domain or translation key that no
//! file declares is a missing target, so it gets `None` rather than an empty
//! list.

use super::Project;
use crate::container::trim_special_syntax_service_name;
use crate::index::ClassInfo;
use crate::matchers::{TokenRole, twig, yaml};
use crate::signature::{lookup_type_signature, method_signature};
use crate::symbol::{Declaration, DeclarationSet, normalize_fqn};
use crate::syntax::{Document, Token};
use crate::types::trim_quote;
use tracing::debug;

/// Targets of the token under `offset`
pub fn goto_at(project: &Project<'_>, document: &Document, offset: u32) -> Option<Vec<Declaration>> {
    let token = document.token_at(offset)?;
    goto_declaration(project, token)
}

/// Declarations `token` refers to
pub fn goto_declaration(project: &Project<'_>, token: Token<'_>) -> Option<Vec<Declaration>> {
    let role = project.classify(token)?;
    debug!("goto for {role} '{}'", token.text());

    let targets = match role {
        TokenRole::ClassNameValue => class_target(project, token.text()),
        TokenRole::ServiceReferenceValue => {
            trim_special_syntax_service_name(token.text()).and_then(|id| service_target(project, id))
        }
        TokenRole::ParameterReferenceValue => parameter_target(project, token.text()),
        TokenRole::ServiceIdKey => service_id_target(project, token),
        TokenRole::TemplateBlockReference => block_targets(project, token.text()),
        TokenRole::TemplateFileReference => file_target(project, token.text()),
        TokenRole::RouteNameReference => route_targets(project, token.text()),
        TokenRole::TranslationDomainArgument => domain_targets(project, token),
        TokenRole::TranslationKeyReference => key_targets(project, token),
    };

    if targets.is_none() {
        debug!("no target for {role} '{}'", token.text());
    }
    targets
}

fn class_declaration(class: ClassInfo) -> Declaration {
    Declaration::Class {
        fqn: normalize_fqn(&class.fqn).to_string(),
        location: class.location,
    }
}

fn class_target(project: &Project<'_>, raw: &str) -> Option<Vec<Declaration>> {
    let class = project.container().resolved_class(raw)?;
    Some(vec![class_declaration(class)])
}

fn service_target(project: &Project<'_>, raw: &str) -> Option<Vec<Declaration>> {
    let class = project.container().resolve_service(raw)?;
    class_target(project, &class)
}

fn parameter_target(project: &Project<'_>, raw: &str) -> Option<Vec<Declaration>> {
    let definition = project.container().parameter(raw)?;
    let location = definition.location?;
    Some(vec![Declaration::Parameter {
        key: definition.key,
        location,
    }])
}

fn service_id_target(project: &Project<'_>, key: Token<'_>) -> Option<Vec<Declaration>> {
    match yaml::sibling_class_value(key) {
        Some(class) => class_target(project, class.text()),
        None => service_target(project, trim_quote(key.text())),
    }
}

fn non_empty(targets: Vec<Declaration>) -> Option<Vec<Declaration>> {
    if targets.is_empty() { None } else { Some(targets) }
}

/// Every block of that name; inheritance may declare it in several templates.
/// `None` when no template declares it.
fn block_targets(project: &Project<'_>, name: &str) -> Option<Vec<Declaration>> {
    let targets = project
        .index()
        .template_files()
        .into_iter()
        .flat_map(|file| {
            let template = file.name;
            file.blocks
                .into_iter()
                .filter(move |block| block.name == name)
                .map(move |block| Declaration::TemplateBlock {
                    name: block.name,
                    template: template.clone(),
                    location: block.location,
                })
        })
        .collect();
    non_empty(targets)
}

fn file_target(project: &Project<'_>, name: &str) -> Option<Vec<Declaration>> {
    let file = project.index().template_file(name)?;
    Some(vec![Declaration::TemplateFile {
        name: file.name,
        location: file.location,
    }])
}

/// `Class::method` split at the last `::`, leading separator dropped
pub fn controller_method(controller: &str) -> Option<(&str, &str)> {
    let (class, method) = controller.trim().rsplit_once("::")?;
    let class = normalize_fqn(class);
    if class.is_empty() || method.is_empty() {
        return None;
    }
    Some((class, method))
}

fn route_targets(project: &Project<'_>, name: &str) -> Option<Vec<Declaration>> {
    let route = project.index().route(name)?;

    let Some((class, method)) = route.controller.as_deref().and_then(controller_method) else {
        debug!("route '{name}' has no Class::method controller");
        return Some(Vec::new());
    };

    Some(lookup_type_signature(project.index(), &method_signature(class, method)))
}

fn domain_targets(project: &Project<'_>, token: Token<'_>) -> Option<Vec<Declaration>> {
    let ctx = project.match_context();
    let owner = twig::domain_argument_owner(token, &ctx)?;
    if !(ctx.is_trans_function(owner) || ctx.is_default_domain_tag(owner)) {
        debug!("'{owner}' is not the translator, ignoring third argument");
        return None;
    }
    non_empty(project.index().translation_domain_files(token.text()))
}

fn key_targets(project: &Project<'_>, token: Token<'_>) -> Option<Vec<Declaration>> {
    let domain = twig::translation_domain(token, &project.match_context());
    let mut targets = DeclarationSet::new();
    targets.extend(project.index().translation_targets(&domain, token.text()));
    non_empty(targets.into_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_method() {
        assert_eq!(
            controller_method("\\App\\Controller\\HomeController::index"),
            Some(("App\\Controller\\HomeController", "index"))
        );
        assert_eq!(controller_method("a::b::c"), Some(("a::b", "c")));
        assert_eq!(controller_method("App\\Controller\\Invokable"), None);
        assert_eq!(controller_method("::index"), None);
        assert_eq!(controller_method("App\\Home::"), None);
    }
}
