use serde_json::Value;

use crate::traits::Invocation;
use crate::types::Arguments;
use crate::types::HandlerId;

/// A plain [`Invocation`]: handler identity plus, for structured query transports, the named arguments.
///
/// ```
/// use cache_aside::prelude::*;
///
/// let call = Call::query("user.get").arg("id", "42");
/// assert_eq!(call.named_args().unwrap()["id"], "42");
///
/// let opaque = Call::opaque("user.get");
/// assert!(opaque.named_args().is_none());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    handler: HandlerId,
    args:    Option<Arguments>,
}

impl Call {
    /// Invocation over a structured query transport, starting with no arguments.
    pub fn query(handler: impl Into<HandlerId>) -> Self {
        Self {
            handler: handler.into(),
            args:    Some(Arguments::new()),
        }
    }

    pub fn with_args(handler: impl Into<HandlerId>, args: Arguments) -> Self {
        Self {
            handler: handler.into(),
            args:    Some(args),
        }
    }

    /// Invocation over a transport that doesn't deliver named arguments.
    pub fn opaque(handler: impl Into<HandlerId>) -> Self {
        Self {
            handler: handler.into(),
            args:    None,
        }
    }

    /// Add a named argument. Turns an opaque call into a structured one.
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args
            .get_or_insert_with(Arguments::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn is_structured(&self) -> bool {
        self.args.is_some()
    }
}

impl Invocation for Call {
    #[inline]
    fn handler(&self) -> &HandlerId {
        &self.handler
    }

    #[inline]
    fn named_args(&self) -> Option<&Arguments> {
        self.args.as_ref()
    }
}
