use async_trait::async_trait;
use std::fmt::Debug;
use std::fmt::Display;
use std::sync::Arc;

use crate::types::Arguments;
use crate::types::Bypass;
use crate::types::Directive;
use crate::types::DirectiveKind;
use crate::types::HandlerId;
use crate::types::StoreOp;

/// Key-value storage the interceptor reads from and writes to.
///
/// Serialization, expiry and memory bounds are all the store's own business. The interceptor never propagates
/// store errors; they are logged and reported to the [`Observer`].
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    type Value: Clone + Send + Sync + 'static;
    type Error: Display + Debug + Send + Sync + 'static;

    async fn get(&self, key: &str) -> Result<Option<Self::Value>, Self::Error>;
    async fn set(&self, key: &str, value: Self::Value) -> Result<(), Self::Error>;
    async fn delete(&self, key: &str) -> Result<(), Self::Error>;
}

/// Source of the directives declared for handlers.
///
/// A handler has at most one directive of each kind.
pub trait DirectiveRegistry: Send + Sync + 'static {
    fn cache_directive(&self, handler: &HandlerId) -> Option<Arc<Directive>>;
    fn invalidation_directive(&self, handler: &HandlerId) -> Option<Arc<Directive>>;
}

/// The invocation being intercepted.
pub trait Invocation: Send + Sync {
    fn handler(&self) -> &HandlerId;

    /// Named arguments of the invocation, or `None` if its transport can't provide them.
    fn named_args(&self) -> Option<&Arguments>;
}

/// A handler in the form of a command object. See [`CacheAsideInterceptor::call()`](crate::CacheAsideInterceptor::call).
#[async_trait]
pub trait Handler<I>: Send + Sync
where
    I: Invocation + ?Sized,
{
    type Value: Send;
    type Error: Send;

    async fn handle(&self, invocation: &I) -> Result<Self::Value, Self::Error>;
}

// Diagnostic sink. Nothing reported here can change what the interceptor does.
#[async_trait]
pub trait Observer: Send + Sync + 'static {
    async fn on_directive(&self, _handler: &HandlerId, _kind: DirectiveKind, _directive: &Directive) {}
    async fn on_hit(&self, _handler: &HandlerId, _key: &str) {}
    async fn on_miss(&self, _handler: &HandlerId, _key: &str) {}
    async fn on_invalidate(&self, _handler: &HandlerId, _key: &str) {}
    async fn on_bypass(&self, _handler: &HandlerId, _reason: Bypass) {}
    async fn on_store_error(&self, _op: StoreOp, _key: &str, _message: &str) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl Observer for NullObserver {}
