//! Inline constructor overlays
//!
//! Best effort only: every path that cannot be resolved ends in no overlay.

use super::Project;
use crate::container::trim_special_syntax_service_name;
use crate::index::{ArgumentInfo, ClassInfo, ProjectIndex};
use crate::matchers::{TokenRole, yaml};
use crate::symbol::normalize_fqn;
use crate::syntax::{Document, Token};
use crate::types::{Span, trim_quote};
use serde::Serialize;
use std::fmt;
use tracing::{debug, trace};

/// Text shown next to a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overlay {
    pub text: String,
    /// Span of the token the overlay belongs to
    pub anchor: Span,
}

impl fmt::Display for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Overlay for the token under `offset`
pub fn caret_overlay(project: &Project<'_>, document: &Document, offset: u32) -> Option<Overlay> {
    let token = document.token_at(offset)?;
    overlay(project, token)
}

pub fn overlay(project: &Project<'_>, token: Token<'_>) -> Option<Overlay> {
    let text = match project.classify(token)? {
        TokenRole::ClassNameValue => class_overlay(project, token.text()),
        TokenRole::ServiceReferenceValue => trim_special_syntax_service_name(token.text())
            .and_then(|id| project.container().resolve_service(id)),
        TokenRole::ParameterReferenceValue => project.container().resolve_parameter(token.text()),
        TokenRole::ServiceIdKey => service_id_overlay(project, token),
        _ => None,
    }?;

    trace!("overlay '{text}' for '{}'", token.text());
    Some(Overlay {
        text,
        anchor: token.span(),
    })
}

fn class_overlay(project: &Project<'_>, raw: &str) -> Option<String> {
    let class = project.container().resolved_class(raw)?;
    Some(constructor_summary(
        project.index(),
        &class,
        project.settings().container.max_parent_depth,
    ))
}

fn service_id_overlay(project: &Project<'_>, key: Token<'_>) -> Option<String> {
    if let Some(class) = yaml::sibling_class_value(key) {
        return class_overlay(project, class.text());
    }
    let class = project.container().resolve_service(trim_quote(key.text()))?;
    class_overlay(project, &class)
}

/// `Mailer(TransportInterface $transport, string $sender = 'noreply')`.
///
/// Classes without a constructor of their own show the closest inherited
/// one; with none anywhere up to `max_parent_depth` the list is empty.
pub fn constructor_summary(index: &dyn ProjectIndex, class: &ClassInfo, max_parent_depth: usize) -> String {
    let arguments = inherited_constructor(index, class, max_parent_depth)
        .map(|arguments| {
            arguments
                .iter()
                .map(render_argument)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    format!("{}({arguments})", short_name(&class.fqn))
}

fn inherited_constructor(
    index: &dyn ProjectIndex,
    class: &ClassInfo,
    max_parent_depth: usize,
) -> Option<Vec<ArgumentInfo>> {
    if let Some(arguments) = &class.constructor {
        return Some(arguments.clone());
    }

    let mut parent = class.parent.clone();
    for _ in 0..max_parent_depth {
        let current = index.find_class(parent.as_deref()?)?;
        if let Some(arguments) = current.constructor {
            return Some(arguments);
        }
        parent = current.parent;
    }

    debug!("no constructor within {max_parent_depth} parents of {}", class.fqn);
    None
}

fn short_name(fqn: &str) -> &str {
    let fqn = normalize_fqn(fqn);
    fqn.rsplit('\\').next().unwrap_or(fqn)
}

fn render_argument(argument: &ArgumentInfo) -> String {
    let mut out = String::new();
    if let Some(type_hint) = argument.type_hint.as_deref().filter(|t| !t.is_empty()) {
        out.push_str(type_hint);
        out.push(' ');
    }
    if !argument.name.starts_with('$') {
        out.push('$');
    }
    out.push_str(&argument.name);
    if let Some(default) = &argument.default {
        out.push_str(" = ");
        out.push_str(default);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryIndex;
    use crate::types::Location;

    fn argument(name: &str, type_hint: Option<&str>, default: Option<&str>) -> ArgumentInfo {
        ArgumentInfo {
            name: name.to_string(),
            type_hint: type_hint.map(str::to_string),
            default: default.map(str::to_string),
        }
    }

    fn class(fqn: &str, parent: Option<&str>, constructor: Option<Vec<ArgumentInfo>>) -> ClassInfo {
        ClassInfo {
            fqn: fqn.to_string(),
            location: Location::file("src/X.php"),
            parent: parent.map(str::to_string),
            constructor,
        }
    }

    #[test]
    fn test_render_arguments() {
        let index = MemoryIndex::new();
        let mailer = class(
            "\\App\\Mailer",
            None,
            Some(vec![
                argument("transport", Some("TransportInterface"), None),
                argument("$sender", Some("string"), Some("'noreply'")),
                argument("options", None, None),
            ]),
        );

        assert_eq!(
            constructor_summary(&index, &mailer, 8),
            "Mailer(TransportInterface $transport, string $sender = 'noreply', $options)"
        );
    }

    #[test]
    fn test_inherited_constructor_is_bounded() {
        let index = MemoryIndex::new();
        index.insert_class(class("App\\Base", None, Some(vec![argument("clock", Some("Clock"), None)])));
        index.insert_class(class("App\\Middle", Some("App\\Base"), None));
        let leaf = class("App\\Leaf", Some("\\App\\Middle"), None);

        assert_eq!(constructor_summary(&index, &leaf, 8), "Leaf(Clock $clock)");
        assert_eq!(constructor_summary(&index, &leaf, 1), "Leaf()");
    }

    #[test]
    fn test_no_constructor_anywhere() {
        let index = MemoryIndex::new();
        let orphan = class("Orphan", Some("Missing\\Parent"), None);
        assert_eq!(constructor_summary(&index, &orphan, 8), "Orphan()");
    }
}
