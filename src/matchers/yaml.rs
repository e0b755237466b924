//! Config dialect (service definitions)

use super::MatchContext;
use crate::container::{is_valid_parameter_name, trim_special_syntax_service_name};
use crate::syntax::{NodeKind, Token};
use crate::types::trim_quote;

const CLASS_KEY: &str = "class";
const SERVICES_KEY: &str = "services";

/// Key of the `key: value` pair a scalar is the value of
pub fn value_key<'a>(token: Token<'a>) -> Option<&'a str> {
    let pair = token.parent().filter(|p| p.is(NodeKind::KeyValue))?;
    Some(trim_quote(pair.text()))
}

fn unquoted<'a>(token: Token<'a>) -> &'a str {
    trim_quote(token.text().trim())
}

fn is_class_value(token: Token<'_>) -> bool {
    value_key(token) == Some(CLASS_KEY)
}

/// `class: App\Mailer`
pub fn is_class_name_value(token: Token<'_>, _ctx: &MatchContext<'_>) -> bool {
    if !token.is(NodeKind::Scalar) || !is_class_value(token) {
        return false;
    }
    let value = unquoted(token);
    !value.is_empty() && !value.contains('\n')
}

/// `@mailer` or `@?logger` anywhere but a class value
pub fn is_service_reference(token: Token<'_>, _ctx: &MatchContext<'_>) -> bool {
    token.is(NodeKind::Scalar)
        && !is_class_value(token)
        && trim_special_syntax_service_name(token.text()).is_some()
}

/// `%locale%` anywhere but a class value
pub fn is_parameter_reference(token: Token<'_>, _ctx: &MatchContext<'_>) -> bool {
    token.is(NodeKind::Scalar) && !is_class_value(token) && is_valid_parameter_name(unquoted(token))
}

/// Id key of an entry directly below `services:`; `_defaults` and friends excluded
pub fn is_service_id_key(token: Token<'_>, _ctx: &MatchContext<'_>) -> bool {
    if !token.is(NodeKind::Key) {
        return false;
    }
    let id = unquoted(token);
    if id.is_empty() || id.starts_with('_') {
        return false;
    }
    service_definition_of(token).is_some()
}

/// The `id: ...` pair owning a service id key
fn service_definition_of(key: Token<'_>) -> Option<Token<'_>> {
    let definition = key.parent().filter(|p| p.is(NodeKind::KeyValue))?;
    let services = definition
        .parent()
        .filter(|p| p.is(NodeKind::Mapping))?
        .parent()
        .filter(|p| p.is(NodeKind::KeyValue))?;
    if trim_quote(services.text()) == SERVICES_KEY {
        Some(definition)
    } else {
        None
    }
}

/// Value token of the `class:` key declared in the same definition as `key`
pub fn sibling_class_value(key: Token<'_>) -> Option<Token<'_>> {
    let definition = service_definition_of(key)?;
    definition
        .children()
        .filter(|child| child.is(NodeKind::Mapping))
        .flat_map(|body| body.children())
        .find(|pair| pair.is(NodeKind::KeyValue) && trim_quote(pair.text()) == CLASS_KEY)?
        .children()
        .find(|value| value.is(NodeKind::Scalar))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::matchers::{TokenRole, accepting_roles};
    use crate::syntax::{Dialect, Document, DocumentBuilder, NodeId};

    struct Fixture {
        doc: Document,
        id_key: NodeId,
        defaults_key: NodeId,
        class: NodeId,
        argument: NodeId,
        parameter: NodeId,
        escaped: NodeId,
    }

    // services:
    //   _defaults: { autowire: true }
    //   app.mailer:
    //     class: App\Mailer
    //     arguments: ['@mailer.transport', '%mailer.sender%', '@@raw']
    fn services_yaml() -> Fixture {
        let mut b = DocumentBuilder::new("config/services.yaml", Dialect::Config);
        b.key_value("services");
        b.open(NodeKind::Mapping, "");

        let defaults = b.key_value("_defaults");
        b.open(NodeKind::Mapping, "");
        b.scalar_entry("autowire", "true");
        b.close().close();

        let definition = b.key_value("app.mailer");
        b.open(NodeKind::Mapping, "");
        let class = b.scalar_entry("class", "App\\Mailer");
        b.key_value("arguments");
        b.open(NodeKind::Sequence, "");
        let argument = b.scalar("'@mailer.transport'");
        let parameter = b.scalar("'%mailer.sender%'");
        let escaped = b.scalar("'@@raw'");
        b.close().close();
        b.close().close();

        let doc = b.finish();
        let first_child = |pair: NodeId| doc.token(pair).unwrap().children().next().unwrap().id();
        let id_key = first_child(definition);
        let defaults_key = first_child(defaults);

        Fixture {
            id_key,
            defaults_key,
            class,
            argument,
            parameter,
            escaped,
            doc,
        }
    }

    fn roles(doc: &Document, id: NodeId) -> Vec<TokenRole> {
        let settings = Settings::default();
        accepting_roles(doc.token(id).unwrap(), &crate::matchers::MatchContext::new(&settings))
    }

    #[test]
    fn test_each_token_has_exactly_one_role() {
        let f = services_yaml();
        assert_eq!(roles(&f.doc, f.class), vec![TokenRole::ClassNameValue]);
        assert_eq!(roles(&f.doc, f.argument), vec![TokenRole::ServiceReferenceValue]);
        assert_eq!(roles(&f.doc, f.parameter), vec![TokenRole::ParameterReferenceValue]);
        assert_eq!(roles(&f.doc, f.id_key), vec![TokenRole::ServiceIdKey]);
    }

    #[test]
    fn test_non_references() {
        let f = services_yaml();
        assert!(roles(&f.doc, f.escaped).is_empty());
        assert!(roles(&f.doc, f.defaults_key).is_empty());

        let services_key = f.doc.find(NodeKind::Key, "services").unwrap();
        assert!(roles(&f.doc, services_key.id()).is_empty());
    }

    #[test]
    fn test_sibling_class_value() {
        let f = services_yaml();
        let key = f.doc.token(f.id_key).unwrap();
        let class = sibling_class_value(key).unwrap();
        assert_eq!(class.id(), f.class);
        assert_eq!(class.text(), "App\\Mailer");

        let defaults = f.doc.token(f.defaults_key).unwrap();
        assert!(sibling_class_value(defaults).is_none());
    }

    #[test]
    fn test_value_key() {
        let f = services_yaml();
        assert_eq!(value_key(f.doc.token(f.class).unwrap()), Some("class"));
        assert_eq!(value_key(f.doc.token(f.argument).unwrap()), None);
    }
}
