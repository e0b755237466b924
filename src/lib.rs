//! Cross-dialect reference resolution for framework projects.
//!
//! Service configuration, templates, routes and translation catalogs all point
//! into the class space of the application and into each other. Given a token
//! in any of those dialects, this crate works out what it refers to
//! (`producers::goto_declaration`) and how constructing it looks
//! (`producers::overlay`), reading from a project index it does not own.

pub mod config;
pub mod container;
pub mod error;
pub mod index;
pub mod io;
pub mod matchers;
pub mod producers;
pub mod signature;
pub mod storage;
pub mod symbol;
pub mod syntax;
pub mod types;

// Explicit exports for better API clarity
pub use config::Settings;
pub use container::ContainerResolver;
pub use error::{IndexError, IndexResult, Resolution, ResolveMiss};
pub use index::ProjectIndex;
pub use matchers::{MatchContext, TokenRole, classify};
pub use producers::{Overlay, Project, goto_declaration, overlay};
pub use signature::{CallSite, decode_union, encode, resolve_literal};
pub use storage::{IndexSnapshot, MemoryIndex};
pub use symbol::{Declaration, DeclarationSet};
pub use syntax::{Dialect, Document, Token};
pub use types::{Location, ParameterKey, Range, ServiceKey, Span};
