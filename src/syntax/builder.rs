use super::{Dialect, Document, Node, NodeId, NodeKind};
use crate::types::Span;
use std::path::PathBuf;

/// Incremental construction of a `Document`, in source order.
///
/// Offsets advance with the text of every leaf. Quotes around template
/// strings and the `: ` after config keys are not tokens of their own but still
/// take up offset space.
#[derive(Debug)]
pub struct DocumentBuilder {
    path: PathBuf,
    dialect: Dialect,
    nodes: Vec<Node>,
    stack: Vec<NodeId>,
    offset: u32,
}

impl DocumentBuilder {
    pub fn new(path: impl Into<PathBuf>, dialect: Dialect) -> Self {
        let root = Node {
            kind: NodeKind::Document,
            text: String::new(),
            span: Span::default(),
            parent: None,
            children: Vec::new(),
        };
        Self {
            path: path.into(),
            dialect,
            nodes: vec![root],
            stack: vec![NodeId(0)],
            offset: 0,
        }
    }

    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(NodeId(0))
    }

    fn push(&mut self, kind: NodeKind, text: &str, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let parent = self.current();
        self.nodes.push(Node {
            kind,
            text: text.to_string(),
            span,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0 as usize].children.push(id);
        id
    }

    /// Start a composite node; everything added until `close` nests inside it
    pub fn open(&mut self, kind: NodeKind, label: &str) -> NodeId {
        let id = self.push(kind, label, Span::new(self.offset, self.offset));
        self.stack.push(id);
        id
    }

    /// Finish the innermost open composite node
    pub fn close(&mut self) -> &mut Self {
        if self.stack.len() > 1 {
            if let Some(id) = self.stack.pop() {
                self.nodes[id.0 as usize].span.end = self.offset;
            }
        }
        self
    }

    pub fn leaf(&mut self, kind: NodeKind, text: &str) -> NodeId {
        let start = self.offset;
        self.offset += text.len() as u32;
        self.push(kind, text, Span::new(start, self.offset))
    }

    /// Skip source bytes that produce no token
    pub fn advance(&mut self, bytes: u32) -> &mut Self {
        self.offset += bytes;
        self
    }

    pub fn ident(&mut self, text: &str) -> NodeId {
        self.leaf(NodeKind::Identifier, text)
    }

    pub fn punct(&mut self, text: &str) -> NodeId {
        self.leaf(NodeKind::Punct, text)
    }

    pub fn ws(&mut self) -> NodeId {
        self.leaf(NodeKind::Whitespace, " ")
    }

    /// Quoted template string; the token holds the contents only
    pub fn string(&mut self, contents: &str) -> NodeId {
        self.advance(1);
        let id = self.leaf(NodeKind::StringLiteral, contents);
        self.advance(1);
        id
    }

    /// Open a `key: value` pair; the caller adds the value and closes it
    pub fn key_value(&mut self, key: &str) -> NodeId {
        let id = self.open(NodeKind::KeyValue, key);
        self.leaf(NodeKind::Key, key);
        self.advance(2);
        id
    }

    /// Config scalar, raw text including any quotes
    pub fn scalar(&mut self, raw: &str) -> NodeId {
        self.leaf(NodeKind::Scalar, raw)
    }

    /// `key: scalar` as one closed pair, returning the scalar
    pub fn scalar_entry(&mut self, key: &str, raw: &str) -> NodeId {
        self.key_value(key);
        let value = self.scalar(raw);
        self.advance(1);
        self.close();
        value
    }

    pub fn finish(mut self) -> Document {
        while self.stack.len() > 1 {
            self.close();
        }
        self.nodes[0].span = Span::new(0, self.offset);
        Document {
            path: self.path,
            dialect: self.dialect,
            nodes: self.nodes,
        }
    }
}
