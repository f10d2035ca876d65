use fieldx::fxstruct;
use std::future::Future;
use std::sync::Arc;
use tracing::instrument;

use crate::key_resolver::CacheKeyResolver;
use crate::traits::DirectiveRegistry;
use crate::traits::Handler;
use crate::traits::Invocation;
use crate::traits::KeyValueStore;
use crate::traits::NullObserver;
use crate::traits::Observer;
use crate::truthy::Truthy;
use crate::types::Bypass;
use crate::types::Directive;
use crate::types::DirectiveKind;
use crate::types::HandlerId;
use crate::types::Outcome;
use crate::types::Plan;
use crate::types::StoreOp;

/// Read-through, write-through and invalidate around a handler.
///
/// For every invocation the interceptor consults the registry for the handler's directives and then, strictly in
/// this order:
///
/// 1. If there is an invalidation directive, deletes the entry under its key, when the key can be resolved, and
///    runs the handler.
/// 2. Without a cache directive, runs the handler.
/// 3. If the cache key can't be resolved, runs the handler.
/// 4. Otherwise returns the stored value on a hit. On a miss it runs the handler, stores the result, and returns it.
///    A stored value that is not [truthy](Truthy) is a miss.
///
/// Store failures never reach the caller: a failed read is a miss, failed writes and deletes are only logged.
/// Handler errors are returned as is and are never stored.
///
/// ```ignore
/// let table = DirectiveTable::new()
///     .with_cache("user.get", directive!(["user"], ["id"]))?
///     .with_invalidation("user.update", directive!(["user"], ["id"]))?;
///
/// let interceptor = CacheAsideInterceptor::builder()
///     .store(MokaStore::<serde_json::Value>::builder().build()?)
///     .registry(table)
///     .name("graphql")
///     .build()?;
///
/// let call = Call::query("user.get").arg("id", "42");
/// let user = interceptor.intercept(&call, || async { fetch_user("42").await }).await?;
/// ```
///
/// Concurrent invocations resolving to the same key are not coordinated: all of them may miss and compute, and the
/// last write wins.
#[fxstruct(
    sync,
    no_new,
    default(off),
    builder(
        doc(
            "Builder object of [`CacheAsideInterceptor`].",
            "",
            "See [`CacheAsideInterceptor::builder()`] method."
        ),
        method_doc("Implement builder pattern for [`CacheAsideInterceptor`]."),
    )
)]
pub struct CacheAsideInterceptor<S, R>
where
    S: KeyValueStore,
    R: DirectiveRegistry,
{
    #[fieldx(builder(vis(pub), required, into), get(clone))]
    store: Arc<S>,

    #[fieldx(builder(vis(pub), required, into), get(clone))]
    registry: Arc<R>,

    /// Interceptor name. Tags log messages and tracing spans.
    #[fieldx(get(copy), default("cache-aside"))]
    name: &'static str,

    /// When off, the cache is neither read nor written. Invalidation directives are still honored so that nothing
    /// stale survives re-enabling.
    #[fieldx(lock, get(copy), set, default(true))]
    enabled: bool,

    #[fieldx(get, default(CacheKeyResolver::default()))]
    resolver: CacheKeyResolver,

    #[fieldx(get(clone), default(Arc::new(NullObserver) as Arc<dyn Observer>))]
    observer: Arc<dyn Observer>,
}

impl<S, R> CacheAsideInterceptor<S, R>
where
    S: KeyValueStore,
    S::Value: Truthy,
    R: DirectiveRegistry,
{
    // Invalidation takes precedence; the cache directive isn't even looked at when there is one.
    fn evaluate<I>(&self, invocation: &I) -> (Plan, Option<(DirectiveKind, Arc<Directive>)>)
    where
        I: Invocation + ?Sized,
    {
        let handler = invocation.handler();
        let registry = self.registry();

        if let Some(directive) = registry.invalidation_directive(handler) {
            let key = self.resolver().resolve_for(&directive, invocation);
            return (Plan::Invalidate(key), Some((DirectiveKind::Invalidate, directive)));
        }

        if !self.enabled() {
            return (Plan::Bypass(Bypass::Disabled), None);
        }

        let Some(directive) = registry.cache_directive(handler)
        else {
            return (Plan::Bypass(Bypass::NoDirective), None);
        };

        let plan = match self.resolver().resolve_for(&directive, invocation) {
            Some(key) => Plan::Lookup(key),
            None => Plan::Bypass(Bypass::Unresolvable),
        };

        (plan, Some((DirectiveKind::Cache, directive)))
    }

    /// Tell what [`intercept()`](Self::intercept) would do with the invocation without doing it.
    pub fn plan<I>(&self, invocation: &I) -> Plan
    where
        I: Invocation + ?Sized,
    {
        self.evaluate(invocation).0
    }

    /// Run `proceed` under the cache-aside policy declared for the invocation's handler.
    pub async fn intercept<I, F, Fut, E>(&self, invocation: &I, proceed: F) -> Result<S::Value, E>
    where
        I: Invocation + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<S::Value, E>>,
    {
        self.intercept_with_outcome(invocation, proceed)
            .await
            .map(|(value, _)| value)
    }

    /// Same as [`intercept()`](Self::intercept) but also reports what has been done.
    #[instrument(
        level = "debug",
        skip_all,
        fields(interceptor = self.name(), handler = %invocation.handler())
    )]
    pub async fn intercept_with_outcome<I, F, Fut, E>(
        &self,
        invocation: &I,
        proceed: F,
    ) -> Result<(S::Value, Outcome), E>
    where
        I: Invocation + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<S::Value, E>>,
    {
        let handler = invocation.handler();
        let observer = self.observer();
        let (plan, directive) = self.evaluate(invocation);

        if let Some((kind, directive)) = directive {
            log::debug!("[{}] {kind} directive of '{handler}': {directive:?}", self.name());
            observer.on_directive(handler, kind, &directive).await;
        }

        Ok(match plan {
            Plan::Invalidate(key) => {
                if let Some(ref key) = key {
                    self.delete_entry(handler, key).await;
                }
                (proceed().await?, Outcome::Invalidated(key))
            }
            Plan::Bypass(reason) => {
                log::debug!("[{}] '{handler}' bypasses the cache: {reason}", self.name());
                observer.on_bypass(handler, reason).await;
                (proceed().await?, Outcome::Bypassed(reason))
            }
            Plan::Lookup(key) => {
                if let Some(value) = self.read_entry(&key).await {
                    log::debug!("[{}] cache hit: {key}", self.name());
                    observer.on_hit(handler, &key).await;
                    (value, Outcome::Hit(key))
                }
                else {
                    log::debug!("[{}] cache miss: {key}", self.name());
                    observer.on_miss(handler, &key).await;
                    let value = proceed().await?;
                    self.write_entry(&key, value.clone()).await;
                    (value, Outcome::Miss(key))
                }
            }
        })
    }

    /// Dispatch a command-object handler through the interceptor.
    pub async fn call<I, H>(&self, handler: &H, invocation: &I) -> Result<S::Value, H::Error>
    where
        I: Invocation + ?Sized,
        H: Handler<I, Value = S::Value> + ?Sized,
    {
        self.intercept(invocation, || handler.handle(invocation)).await
    }

    async fn read_entry(&self, key: &str) -> Option<S::Value> {
        match self.store().get(key).await {
            Ok(Some(value)) if !value.is_truthy() => {
                log::debug!("[{}] falsy value under {key}", self.name());
                None
            }
            Ok(value) => value,
            Err(err) => {
                self.store_failed(StoreOp::Get, key, &err).await;
                None
            }
        }
    }

    async fn write_entry(&self, key: &str, value: S::Value) {
        if let Err(err) = self.store().set(key, value).await {
            self.store_failed(StoreOp::Set, key, &err).await;
        }
    }

    async fn delete_entry(&self, handler: &HandlerId, key: &str) {
        log::debug!("[{}] invalidating {key}", self.name());
        match self.store().delete(key).await {
            Ok(()) => self.observer().on_invalidate(handler, key).await,
            Err(err) => self.store_failed(StoreOp::Delete, key, &err).await,
        }
    }

    async fn store_failed(&self, op: StoreOp, key: &str, err: &S::Error) {
        let message = err.to_string();
        log::warn!("[{}] {op}({key}) failed: {message}", self.name());
        self.observer().on_store_error(op, key, &message).await;
    }
}
