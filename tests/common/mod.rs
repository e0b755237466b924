#![allow(dead_code)]

use frameref::syntax::{Dialect, Document, DocumentBuilder, NodeId, NodeKind};
use frameref::{MemoryIndex, Settings};
use std::path::PathBuf;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// The project index shared by the scenario tests
pub fn fixture_index() -> MemoryIndex {
    MemoryIndex::load(&fixture_path("project_index.json")).expect("Failed to load fixture index")
}

pub fn settings() -> Settings {
    Settings::default()
}

/// Tokens of interest in `services_yaml`
pub struct ServicesYaml {
    pub doc: Document,
    pub mailer_key: NodeId,
    pub mailer_class: NodeId,
    pub transport_ref: NodeId,
    pub sender_param: NodeId,
    pub transport_key: NodeId,
    pub transport_class: NodeId,
    pub clock_key: NodeId,
    pub newsletter_key: NodeId,
    pub mailer_alias_ref: NodeId,
    pub optional_logger_ref: NodeId,
    pub escaped: NodeId,
}

fn key_of(doc: &Document, pair: NodeId) -> NodeId {
    doc.token(pair)
        .and_then(|t| t.children().find(|c| c.is(NodeKind::Key)))
        .map(|t| t.id())
        .expect("pair without key")
}

/// parameters:
///   locale: en
/// services:
///   _defaults:
///     autowire: true
///   app.mailer:
///     class: App\Mailer\Mailer
///     arguments: ['@app.mailer.transport', '%mailer.sender%']
///   app.mailer.transport:
///     class: '%mailer.transport.class%'
///   App\Clock: ~
///   app.newsletter:
///     arguments: ['@mailer', '@?app.logger', '@@not_a_service']
pub fn services_yaml() -> ServicesYaml {
    let mut b = DocumentBuilder::new("config/services.yaml", Dialect::Config);

    b.key_value("parameters");
    b.open(NodeKind::Mapping, "");
    b.scalar_entry("locale", "en");
    b.close().close();

    b.key_value("services");
    b.open(NodeKind::Mapping, "");

    b.key_value("_defaults");
    b.open(NodeKind::Mapping, "");
    b.scalar_entry("autowire", "true");
    b.close().close();

    let mailer = b.key_value("app.mailer");
    b.open(NodeKind::Mapping, "");
    let mailer_class = b.scalar_entry("class", "App\\Mailer\\Mailer");
    b.key_value("arguments");
    b.open(NodeKind::Sequence, "");
    let transport_ref = b.scalar("'@app.mailer.transport'");
    let sender_param = b.scalar("'%mailer.sender%'");
    b.close().close();
    b.close().close();

    let transport = b.key_value("app.mailer.transport");
    b.open(NodeKind::Mapping, "");
    let transport_class = b.scalar_entry("class", "'%mailer.transport.class%'");
    b.close().close();

    let clock = b.key_value("App\\Clock");
    b.scalar("~");
    b.close();

    let newsletter = b.key_value("app.newsletter");
    b.open(NodeKind::Mapping, "");
    b.key_value("arguments");
    b.open(NodeKind::Sequence, "");
    let mailer_alias_ref = b.scalar("'@mailer'");
    let optional_logger_ref = b.scalar("'@?app.logger'");
    let escaped = b.scalar("'@@not_a_service'");
    b.close().close();
    b.close().close();

    let doc = b.finish();
    ServicesYaml {
        mailer_key: key_of(&doc, mailer),
        transport_key: key_of(&doc, transport),
        clock_key: key_of(&doc, clock),
        newsletter_key: key_of(&doc, newsletter),
        mailer_class,
        transport_ref,
        sender_param,
        transport_class,
        mailer_alias_ref,
        optional_logger_ref,
        escaped,
        doc,
    }
}

/// A template built token by token
pub fn twig(path: &str, build: impl FnOnce(&mut DocumentBuilder)) -> Document {
    let mut b = DocumentBuilder::new(path, Dialect::Template);
    build(&mut b);
    b.finish()
}

/// `{{ ... }}`
pub fn print_block(b: &mut DocumentBuilder, body: impl FnOnce(&mut DocumentBuilder)) {
    b.open(NodeKind::PrintBlock, "");
    b.punct("{{");
    b.ws();
    body(b);
    b.ws();
    b.punct("}}");
    b.close();
}

/// `{% name ... %}`
pub fn tag_block(b: &mut DocumentBuilder, name: &str, body: impl FnOnce(&mut DocumentBuilder)) {
    b.open(NodeKind::TagBlock, name);
    b.punct("{%");
    b.ws();
    b.ident(name);
    b.ws();
    body(b);
    b.ws();
    b.punct("%}");
    b.close();
}

/// `name(arg, arg, ...)` where every argument is a string
pub fn call(b: &mut DocumentBuilder, name: &str, arguments: &[&str]) -> Vec<NodeId> {
    b.ident(name);
    b.punct("(");
    let mut ids = Vec::new();
    for (i, argument) in arguments.iter().enumerate() {
        if i > 0 {
            b.punct(",");
            b.ws();
        }
        ids.push(b.string(argument));
    }
    b.punct(")");
    ids
}

/// Plain text between blocks
pub fn text(b: &mut DocumentBuilder, content: &str) {
    b.leaf(NodeKind::Text, content);
}
