//! Syntax trees handed over by the dialect parsers
//!
//! Parsing itself happens elsewhere. A `Document` is the arena the parser
//! fills in: every node knows its kind, text, byte span, parent and children.
//! `Token` is a cheap borrowed cursor into it; the resolver only ever reads.

mod builder;

pub use builder::DocumentBuilder;

use crate::error::{ErrorContext, IndexError, IndexResult};
use crate::types::Span;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Source dialect of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// Service/container definitions (YAML)
    Config,
    /// Templates (Twig)
    Template,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Document,

    // Config dialect
    Mapping,
    Sequence,
    /// `key: value`; the node text holds the key
    KeyValue,
    Key,
    /// Scalar value, raw text including quotes
    Scalar,

    // Template dialect
    /// `{{ ... }}`
    PrintBlock,
    /// `{% ... %}`; the node text holds the tag name
    TagBlock,
    Identifier,
    /// String contents without quotes
    StringLiteral,
    Punct,
    Text,

    Whitespace,
}

impl NodeKind {
    pub fn is_leaf(self) -> bool {
        matches!(
            self,
            Self::Key
                | Self::Scalar
                | Self::Identifier
                | Self::StringLiteral
                | Self::Punct
                | Self::Text
                | Self::Whitespace
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    #[serde(default)]
    pub text: String,
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeId>,
}

/// A parsed document; node 0 is the root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    path: PathBuf,
    dialect: Dialect,
    nodes: Vec<Node>,
}

impl Document {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<Token<'_>> {
        self.token(NodeId(0))
    }

    pub fn token(&self, id: NodeId) -> Option<Token<'_>> {
        self.nodes.get(id.index()).map(|_| Token { doc: self, id })
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Leaf under a caret offset (`start <= offset < end`)
    pub fn token_at(&self, offset: u32) -> Option<Token<'_>> {
        let mut current = self.root()?;
        loop {
            let next = current
                .children()
                .find(|child| child.span().contains(offset));
            match next {
                Some(child) => current = child,
                None => break,
            }
        }
        if current.kind().is_leaf() {
            Some(current)
        } else {
            None
        }
    }

    /// Like `token_at`, as an error for callers at the outer edge
    pub fn require_token_at(&self, offset: u32) -> IndexResult<Token<'_>> {
        self.token_at(offset).ok_or_else(|| IndexError::TokenNotFound {
            path: self.path.clone(),
            offset,
        })
    }

    /// Leaves in document order
    pub fn leaves(&self) -> Vec<Token<'_>> {
        let mut out = Vec::new();
        if let Some(root) = self.root() {
            collect_leaves(root, &mut out);
        }
        out
    }

    /// First leaf of `kind` whose text is `text`
    pub fn find(&self, kind: NodeKind, text: &str) -> Option<Token<'_>> {
        self.leaves()
            .into_iter()
            .find(|t| t.kind() == kind && t.text() == text)
    }

    pub fn from_json(json: &str, origin: &Path) -> IndexResult<Self> {
        let document: Self = serde_json::from_str(json).with_path(origin)?;
        document
            .validate()
            .map_err(|reason| IndexError::MalformedData {
                path: origin.to_path_buf(),
                reason,
            })?;
        Ok(document)
    }

    /// Load a serialized syntax tree
    pub fn load(path: &Path) -> IndexResult<Self> {
        let json = fs::read_to_string(path).map_err(|e| IndexError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&json, path)
    }

    /// Links must stay inside the arena and agree in both directions
    fn validate(&self) -> Result<(), String> {
        let Some(root) = self.nodes.first() else {
            return Err("document has no nodes".to_string());
        };
        if root.parent.is_some() {
            return Err("root node must not have a parent".to_string());
        }

        let count = self.nodes.len();
        for (i, node) in self.nodes.iter().enumerate() {
            for child in &node.children {
                if child.index() >= count {
                    return Err(format!("node {i} has out-of-range child {}", child.0));
                }
                if self.nodes[child.index()].parent != Some(NodeId(i as u32)) {
                    return Err(format!("node {} does not point back to parent {i}", child.0));
                }
            }
            if i > 0 && node.parent.is_none() {
                return Err(format!("node {i} is detached"));
            }
        }
        Ok(())
    }
}

fn collect_leaves<'a>(token: Token<'a>, out: &mut Vec<Token<'a>>) {
    if token.kind().is_leaf() {
        out.push(token);
        return;
    }
    for child in token.children() {
        collect_leaves(child, out);
    }
}

/// Borrowed cursor on one node of a document
#[derive(Clone, Copy)]
pub struct Token<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> Token<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn kind(&self) -> NodeKind {
        self.doc.node(self.id).kind
    }

    pub fn text(&self) -> &'a str {
        &self.doc.node(self.id).text
    }

    pub fn span(&self) -> Span {
        self.doc.node(self.id).span
    }

    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind() == kind
    }

    pub fn is_whitespace(&self) -> bool {
        self.is(NodeKind::Whitespace)
    }

    /// Punctuation token with exactly this text
    pub fn is_punct(&self, text: &str) -> bool {
        self.is(NodeKind::Punct) && self.text() == text
    }

    pub fn parent(&self) -> Option<Token<'a>> {
        self.doc
            .node(self.id)
            .parent
            .map(|id| Token { doc: self.doc, id })
    }

    pub fn children(self) -> impl Iterator<Item = Token<'a>> {
        let doc = self.doc;
        doc.node(self.id)
            .children
            .iter()
            .map(move |&id| Token { doc, id })
    }

    pub fn ancestors(self) -> impl Iterator<Item = Token<'a>> {
        std::iter::successors(self.parent(), |t| t.parent())
    }

    fn sibling(&self, delta: isize) -> Option<Token<'a>> {
        let parent = self.parent()?;
        let siblings = &self.doc.node(parent.id).children;
        let position = siblings.iter().position(|&id| id == self.id)?;
        let target = position.checked_add_signed(delta)?;
        siblings.get(target).map(|&id| Token { doc: self.doc, id })
    }

    pub fn prev_sibling(&self) -> Option<Token<'a>> {
        self.sibling(-1)
    }

    pub fn next_sibling(&self) -> Option<Token<'a>> {
        self.sibling(1)
    }

    /// Previous sibling, skipping whitespace
    pub fn prev_significant(&self) -> Option<Token<'a>> {
        std::iter::successors(self.prev_sibling(), |t| t.prev_sibling())
            .find(|t| !t.is_whitespace())
    }

    /// Next sibling, skipping whitespace
    pub fn next_significant(&self) -> Option<Token<'a>> {
        std::iter::successors(self.next_sibling(), |t| t.next_sibling())
            .find(|t| !t.is_whitespace())
    }

    /// First non-whitespace child
    pub fn first_significant_child(&self) -> Option<Token<'a>> {
        self.children().find(|t| !t.is_whitespace())
    }
}

impl PartialEq for Token<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for Token<'_> {}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("id", &self.id.0)
            .field("kind", &self.kind())
            .field("text", &self.text())
            .finish()
    }
}
