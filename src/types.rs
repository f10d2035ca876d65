use serde::{Deserialize, Serialize};
use std::{
    borrow::Borrow,
    fmt::{self, Debug, Display},
    sync::Arc,
};

/// Named arguments of an invocation, as delivered by a structured query transport.
pub type Arguments = serde_json::Map<String, serde_json::Value>;

/// Identity of a handler. Directives are registered and looked up by it.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerId(Arc<str>);

impl HandlerId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for HandlerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for HandlerId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl From<&HandlerId> for HandlerId {
    fn from(id: &HandlerId) -> Self {
        id.clone()
    }
}

impl Borrow<str> for HandlerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for HandlerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Debug for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandlerId").field(&&*self.0).finish()
    }
}

/// What a directive does to the cache entry its key points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectiveKind {
    /// Serve from the cache when possible, populate it otherwise.
    Cache,
    /// Drop the entry before the handler runs.
    Invalidate,
}

impl Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cache => "cache",
            Self::Invalidate => "invalidation",
        })
    }
}

/// Static description of how to derive a cache key for a handler.
///
/// `key_parts` form the fixed prefix of the key. When `arg_names` is set the values of the named invocation
/// arguments, in the declared order, are appended as one more segment.
///
/// ```
/// use cache_aside::prelude::*;
///
/// let by_user = Directive::new(["user"]).with_args(["id"]);
/// assert_eq!(by_user, directive!(["user"], ["id"]));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Directive {
    key_parts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    arg_names: Option<Vec<String>>,
}

impl Directive {
    pub fn new<P, S>(key_parts: P) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key_parts: key_parts.into_iter().map(Into::into).collect(),
            arg_names: None,
        }
    }

    pub fn with_args<A, S>(mut self, arg_names: A) -> Self
    where
        A: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arg_names = Some(arg_names.into_iter().map(Into::into).collect());
        self
    }

    #[inline]
    pub fn key_parts(&self) -> &[String] {
        &self.key_parts
    }

    #[inline]
    pub fn arg_names(&self) -> Option<&[String]> {
        self.arg_names.as_deref()
    }

    /// True if the key depends on invocation arguments.
    #[inline]
    pub fn is_parameterized(&self) -> bool {
        self.arg_names.is_some()
    }
}

/// Why an invocation went straight to its handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bypass {
    /// The interceptor is switched off.
    Disabled,
    /// No cache directive is declared for the handler.
    NoDirective,
    /// The directive needs named arguments but the invocation carries none.
    Unresolvable,
}

impl Display for Bypass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disabled => "interceptor disabled",
            Self::NoDirective => "no cache directive",
            Self::Unresolvable => "key unresolvable",
        })
    }
}

/// The decision the interceptor takes for an invocation, before anything is executed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Plan {
    /// Delete the entry under the key, if any, then run the handler.
    Invalidate(Option<String>),
    /// Look the key up; run and store on a miss.
    Lookup(String),
    /// Run the handler without touching the cache.
    Bypass(Bypass),
}

/// What actually happened during an intercepted invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Hit(String),
    Miss(String),
    Invalidated(Option<String>),
    Bypassed(Bypass),
}

impl Outcome {
    /// True if the handler was executed.
    pub fn proceeded(&self) -> bool {
        !matches!(self, Self::Hit(_))
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Hit(k) | Self::Miss(k) => Some(k),
            Self::Invalidated(k) => k.as_deref(),
            Self::Bypassed(_) => None,
        }
    }
}

/// Store operation, used to report store failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    Set,
    Delete,
}

impl Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Set => "SET",
            Self::Delete => "DELETE",
        })
    }
}
