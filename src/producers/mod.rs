//! Contextual producers: answers built on top of a classified token
//!
//! Both producers take a token plus a `Project` handle and never fail: a
//! token they cannot say anything about simply gets no answer.

pub mod goto;
pub mod overlay;

pub use goto::{goto_at, goto_declaration};
pub use overlay::{Overlay, caret_overlay, constructor_summary, overlay};

use crate::config::Settings;
use crate::container::ContainerResolver;
use crate::index::ProjectIndex;
use crate::matchers::{self, MatchContext, TokenRole};
use crate::syntax::Token;

/// Everything a query reads besides the token itself
#[derive(Clone, Copy)]
pub struct Project<'a> {
    index: &'a dyn ProjectIndex,
    settings: &'a Settings,
}

impl<'a> Project<'a> {
    pub fn new(index: &'a dyn ProjectIndex, settings: &'a Settings) -> Self {
        Self { index, settings }
    }

    pub fn index(&self) -> &'a dyn ProjectIndex {
        self.index
    }

    pub fn settings(&self) -> &'a Settings {
        self.settings
    }

    pub fn container(&self) -> ContainerResolver<'a> {
        ContainerResolver::new(self.index)
            .with_max_alias_depth(self.settings.container.max_alias_depth)
    }

    pub fn match_context(&self) -> MatchContext<'a> {
        MatchContext::new(self.settings)
    }

    /// Role of `token`, `None` as well when framework support is switched off
    pub fn classify(&self, token: Token<'_>) -> Option<TokenRole> {
        if !self.settings.enabled {
            return None;
        }
        matchers::classify(token, &self.match_context())
    }
}
