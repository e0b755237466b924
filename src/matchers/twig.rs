//! Template dialect
//!
//! Call structure is recovered from the flat token run inside a `{{ }}` or
//! `{% %}` block: arguments are separated by commas at bracket depth zero and
//! the callee is the identifier right before the opening parenthesis. In the
//! filter form (`value|name(args)`) the filtered value counts as argument 0.

use super::MatchContext;
use crate::syntax::{NodeKind, Token};

/// A token standing alone as one argument of a call
#[derive(Debug, Clone, Copy)]
pub struct CallArgument<'a> {
    pub callee: Token<'a>,
    /// The call's opening parenthesis
    pub open: Token<'a>,
    /// Logical position, the filtered value of a filter call being 0
    pub position: usize,
    pub filter: bool,
}

fn is_open(token: &Token<'_>) -> bool {
    token.is_punct("(") || token.is_punct("[") || token.is_punct("{")
}

fn is_close(token: &Token<'_>) -> bool {
    token.is_punct(")") || token.is_punct("]") || token.is_punct("}")
}

/// Call that `token` is a complete argument of
pub fn enclosing_call(token: Token<'_>) -> Option<CallArgument<'_>> {
    let before = token.prev_significant()?;
    let after = token.next_significant()?;
    if !(before.is_punct("(") || before.is_punct(",")) {
        return None;
    }
    if !(after.is_punct(")") || after.is_punct(",")) {
        return None;
    }

    let mut depth = 0usize;
    let mut commas = 0usize;
    let mut cursor = token.prev_sibling();
    let open = loop {
        let current = cursor?;
        if is_close(&current) {
            depth += 1;
        } else if is_open(&current) {
            if depth == 0 {
                // Inside a hash or array literal rather than an argument list
                if !current.is_punct("(") {
                    return None;
                }
                break current;
            }
            depth -= 1;
        } else if depth == 0 && current.is_punct(",") {
            commas += 1;
        }
        cursor = current.prev_sibling();
    };

    let callee = open
        .prev_significant()
        .filter(|t| t.is(NodeKind::Identifier))?;
    let filter = callee
        .prev_significant()
        .is_some_and(|t| t.is_punct("|"));

    Some(CallArgument {
        callee,
        open,
        position: commas + usize::from(filter),
        filter,
    })
}

/// Arguments of the call opened by `open`, whitespace dropped
pub fn call_arguments(open: Token<'_>) -> Vec<Vec<Token<'_>>> {
    let mut arguments = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0usize;
    let mut cursor = open.next_sibling();

    while let Some(token) = cursor {
        if depth == 0 && token.is_punct(")") {
            break;
        }
        if is_open(&token) {
            depth += 1;
        } else if is_close(&token) {
            depth = depth.saturating_sub(1);
        }

        if depth == 0 && token.is_punct(",") {
            arguments.push(std::mem::take(&mut current));
        } else if !token.is_whitespace() {
            current.push(token);
        }
        cursor = token.next_sibling();
    }

    if !current.is_empty() || !arguments.is_empty() {
        arguments.push(current);
    }
    arguments
}

/// Identifier naming the tag of the `{% %}` block around `token`
fn tag_name<'a>(token: Token<'a>) -> Option<&'a str> {
    let block = token.parent().filter(|p| p.is(NodeKind::TagBlock))?;
    Some(block.text())
}

/// `token` is the first operand of its tag: `{% extends 'base.html.twig' %}`
fn is_tag_operand(token: Token<'_>, tag: &str) -> bool {
    token
        .prev_significant()
        .is_some_and(|t| t.is(NodeKind::Identifier) && t.text() == tag)
}

fn first_argument_of<'a>(token: Token<'a>, accept: impl Fn(&str) -> bool) -> bool {
    enclosing_call(token).is_some_and(|call| {
        call.position == 0 && !call.filter && accept(call.callee.text())
    })
}

/// `{% block body %}` or `block('body')`
pub fn is_block_reference(token: Token<'_>, ctx: &MatchContext<'_>) -> bool {
    match token.kind() {
        NodeKind::Identifier => tag_name(token).is_some_and(|tag| {
            ctx.is_block_function(tag) && is_tag_operand(token, tag)
        }),
        NodeKind::StringLiteral => first_argument_of(token, |name| ctx.is_block_function(name)),
        _ => false,
    }
}

/// `{% extends 'base.html.twig' %}` or `include('form.html.twig')`
pub fn is_file_reference(token: Token<'_>, ctx: &MatchContext<'_>) -> bool {
    if !token.is(NodeKind::StringLiteral) {
        return false;
    }
    let tagged = tag_name(token)
        .is_some_and(|tag| ctx.is_file_tag(tag) && is_tag_operand(token, tag));
    tagged || first_argument_of(token, |name| ctx.is_file_function(name))
}

/// `path('home')`
pub fn is_route_name(token: Token<'_>, ctx: &MatchContext<'_>) -> bool {
    token.is(NodeKind::StringLiteral) && first_argument_of(token, |name| ctx.is_route_function(name))
}

/// Domain argument of the translator (`trans('key', {}, 'admin')`, or
/// `'key'|trans({}, 'admin')`), or the operand of `{% trans_default_domain %}`
pub fn is_translation_domain(token: Token<'_>, ctx: &MatchContext<'_>) -> bool {
    if !token.is(NodeKind::StringLiteral) {
        return false;
    }
    if tag_name(token).is_some_and(|tag| ctx.is_default_domain_tag(tag) && is_tag_operand(token, tag)) {
        return true;
    }
    enclosing_call(token)
        .is_some_and(|call| call.position == 2 && ctx.is_trans_function(call.callee.text()))
}

/// `'key'|trans` or `trans('key')`
pub fn is_translation_key(token: Token<'_>, ctx: &MatchContext<'_>) -> bool {
    if !token.is(NodeKind::StringLiteral) {
        return false;
    }
    trans_filter_after(token, ctx).is_some()
        || first_argument_of(token, |name| ctx.is_trans_function(name))
}

/// The translator identifier in `'key'|trans`
fn trans_filter_after<'a>(token: Token<'a>, ctx: &MatchContext<'_>) -> Option<Token<'a>> {
    let pipe = token.next_significant().filter(|t| t.is_punct("|"))?;
    pipe.next_significant()
        .filter(|t| t.is(NodeKind::Identifier) && ctx.is_trans_function(t.text()))
}

/// The tag name of the domain-declaring tag, or callee of the call `token` is the third argument of
pub fn domain_argument_owner<'a>(token: Token<'a>, ctx: &MatchContext<'_>) -> Option<&'a str> {
    if let Some(tag) = tag_name(token).filter(|tag| ctx.is_default_domain_tag(tag)) {
        return Some(tag);
    }
    enclosing_call(token)
        .filter(|call| call.position == 2)
        .map(|call| call.callee.text())
}

fn string_argument<'a>(arguments: &[Vec<Token<'a>>], index: usize) -> Option<&'a str> {
    match arguments.get(index).map(Vec::as_slice) {
        Some([single]) if single.is(NodeKind::StringLiteral) => Some(single.text()),
        _ => None,
    }
}

/// Domain a translation key is looked up in.
///
/// The key's own call wins, then the closest `{% trans_default_domain %}`
/// before it, then the configured default.
pub fn translation_domain(key: Token<'_>, ctx: &MatchContext<'_>) -> String {
    if let Some(domain) = explicit_domain(key, ctx) {
        return domain.to_string();
    }

    let start = key.span().start;
    let document = key.document();
    let ambient = document
        .leaves()
        .into_iter()
        .filter(|t| t.is(NodeKind::StringLiteral) && t.span().end <= start)
        .filter(|t| {
            tag_name(*t).is_some_and(|tag| ctx.is_default_domain_tag(tag) && is_tag_operand(*t, tag))
        })
        .last();

    match ambient {
        Some(tag) => tag.text().to_string(),
        None => ctx.templates.default_domain.clone(),
    }
}

fn explicit_domain<'a>(key: Token<'a>, ctx: &MatchContext<'_>) -> Option<&'a str> {
    // 'key'|trans({}, 'domain')
    if let Some(filter) = trans_filter_after(key, ctx) {
        let open = filter.next_significant().filter(|t| t.is_punct("("))?;
        return string_argument(&call_arguments(open), 1);
    }

    // trans('key', {}, 'domain')
    let call = enclosing_call(key).filter(|call| ctx.is_trans_function(call.callee.text()))?;
    string_argument(&call_arguments(call.open), 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::syntax::{Dialect, Document, DocumentBuilder, NodeId};

    // {{ 'title'|trans({}, 'admin') }}
    fn filter_call() -> (Document, NodeId, NodeId) {
        let mut b = DocumentBuilder::new("templates/a.html.twig", Dialect::Template);
        b.open(NodeKind::PrintBlock, "");
        b.punct("{{");
        b.ws();
        let key = b.string("title");
        b.punct("|");
        b.ident("trans");
        b.punct("(");
        b.punct("{");
        b.punct("}");
        b.punct(",");
        b.ws();
        let domain = b.string("admin");
        b.punct(")");
        b.ws();
        b.punct("}}");
        b.close();
        (b.finish(), key, domain)
    }

    #[test]
    fn test_enclosing_call_in_filter_form() {
        let (doc, key, domain) = filter_call();

        let call = enclosing_call(doc.token(domain).unwrap()).unwrap();
        assert_eq!(call.callee.text(), "trans");
        assert!(call.filter);
        assert_eq!(call.position, 2);

        // The filtered value is not itself inside parentheses
        assert!(enclosing_call(doc.token(key).unwrap()).is_none());
    }

    #[test]
    fn test_call_arguments_respect_nesting() {
        let (doc, _, domain) = filter_call();
        let call = enclosing_call(doc.token(domain).unwrap()).unwrap();
        let arguments = call_arguments(call.open);

        assert_eq!(arguments.len(), 2);
        assert_eq!(arguments[0].len(), 2);
        assert_eq!(string_argument(&arguments, 1), Some("admin"));
        assert_eq!(string_argument(&arguments, 0), None);
    }

    #[test]
    fn test_explicit_domain_wins() {
        let settings = Settings::default();
        let ctx = MatchContext::new(&settings);
        let (doc, key, _) = filter_call();

        assert_eq!(translation_domain(doc.token(key).unwrap(), &ctx), "admin");
    }

    #[test]
    fn test_hash_values_are_not_arguments() {
        // {{ path('home', {'id': 'x'}) }}
        let mut b = DocumentBuilder::new("templates/a.html.twig", Dialect::Template);
        b.open(NodeKind::PrintBlock, "");
        b.punct("{{");
        b.ident("path");
        b.punct("(");
        b.string("home");
        b.punct(",");
        b.punct("{");
        b.string("id");
        b.punct(":");
        let inner = b.string("x");
        b.punct("}");
        b.punct(")");
        b.punct("}}");
        b.close();
        let doc = b.finish();

        assert!(enclosing_call(doc.token(inner).unwrap()).is_none());
        let home = doc.find(NodeKind::StringLiteral, "home").unwrap();
        let call = enclosing_call(home).unwrap();
        assert_eq!(call.position, 0);
        assert!(!call.filter);
    }
}
