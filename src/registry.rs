//! Side table of handler directives.
//!
//! Populated at startup, either in code or from a JSON document, and consulted by handler identity on every
//! invocation.
//!
//! ```
//! use cache_aside::prelude::*;
//!
//! let table = DirectiveTable::new()
//!     .with_cache("user.get", directive!(["user"], ["id"]))?
//!     .with_invalidation("user.update", directive!(["user"], ["id"]))?;
//!
//! assert!(table.cache_directive(&"user.get".into()).is_some());
//! # Ok::<(), cache_aside::Error>(())
//! ```

use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Error;
use crate::error::Result;
use crate::traits::DirectiveRegistry;
use crate::types::Directive;
use crate::types::DirectiveKind;
use crate::types::HandlerId;

/// Directives declared for a single handler.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HandlerDirectives {
    pub cache:      Option<Arc<Directive>>,
    pub invalidate: Option<Arc<Directive>>,
}

impl HandlerDirectives {
    fn slot_mut(&mut self, kind: DirectiveKind) -> &mut Option<Arc<Directive>> {
        match kind {
            DirectiveKind::Cache => &mut self.cache,
            DirectiveKind::Invalidate => &mut self.invalidate,
        }
    }
}

// Entry of a JSON directive table document.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TableEntry {
    handler:    HandlerId,
    #[serde(default)]
    cache:      Option<Directive>,
    #[serde(default)]
    invalidate: Option<Directive>,
}

#[derive(Debug, Default)]
pub struct DirectiveTable {
    entries: RwLock<HashMap<HandlerId, HandlerDirectives>>,
}

impl DirectiveTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table from a JSON array of `{"handler": ..., "cache": {...}, "invalidate": {...}}` objects.
    ///
    /// ```
    /// use cache_aside::prelude::*;
    ///
    /// let table = DirectiveTable::from_json(
    ///     r#"[
    ///         {"handler": "user.get", "cache": {"key_parts": ["user"], "arg_names": ["id"]}},
    ///         {"handler": "user.update", "invalidate": {"key_parts": ["user"], "arg_names": ["id"]}}
    ///     ]"#,
    /// )?;
    /// assert_eq!(table.len(), 2);
    /// # Ok::<(), cache_aside::Error>(())
    /// ```
    pub fn from_json(document: &str) -> Result<Self> {
        let entries: Vec<TableEntry> = serde_json::from_str(document)?;
        let table = Self::new();

        for entry in entries {
            if let Some(directive) = entry.cache {
                table.register(entry.handler.clone(), DirectiveKind::Cache, directive)?;
            }
            if let Some(directive) = entry.invalidate {
                table.register(entry.handler, DirectiveKind::Invalidate, directive)?;
            }
        }

        Ok(table)
    }

    /// Declare a directive for a handler. A second directive of the same kind for the same handler is rejected.
    pub fn register(&self, handler: impl Into<HandlerId>, kind: DirectiveKind, directive: Directive) -> Result<()> {
        let handler = handler.into();
        let mut entries = self.entries.write();
        let slot = entries.entry(handler.clone()).or_default().slot_mut(kind);

        if slot.is_some() {
            return Err(Error::DuplicateDirective { handler, kind });
        }

        log::debug!("Registered {kind} directive for '{handler}': {directive:?}");
        *slot = Some(Arc::new(directive));
        Ok(())
    }

    #[inline]
    pub fn register_cache(&self, handler: impl Into<HandlerId>, directive: Directive) -> Result<()> {
        self.register(handler, DirectiveKind::Cache, directive)
    }

    #[inline]
    pub fn register_invalidation(&self, handler: impl Into<HandlerId>, directive: Directive) -> Result<()> {
        self.register(handler, DirectiveKind::Invalidate, directive)
    }

    pub fn with_cache(self, handler: impl Into<HandlerId>, directive: Directive) -> Result<Self> {
        self.register_cache(handler, directive)?;
        Ok(self)
    }

    pub fn with_invalidation(self, handler: impl Into<HandlerId>, directive: Directive) -> Result<Self> {
        self.register_invalidation(handler, directive)?;
        Ok(self)
    }

    pub fn directives(&self, handler: &HandlerId) -> Option<HandlerDirectives> {
        self.entries.read().get(handler).cloned()
    }

    pub fn handlers(&self) -> Vec<HandlerId> {
        self.entries.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl DirectiveRegistry for DirectiveTable {
    fn cache_directive(&self, handler: &HandlerId) -> Option<Arc<Directive>> {
        self.entries.read().get(handler).and_then(|d| d.cache.clone())
    }

    fn invalidation_directive(&self, handler: &HandlerId) -> Option<Arc<Directive>> {
        self.entries.read().get(handler).and_then(|d| d.invalidate.clone())
    }
}
