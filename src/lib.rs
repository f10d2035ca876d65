//! # cache-aside
//!
//! Cache-aside interception for RPC and query handlers.
//!
//! Put a [`CacheAsideInterceptor`] between the serving layer and the code fetching the data and it decides, for
//! every invocation, whether to answer from the cache, to run the handler and store what it returns, or to drop an
//! entry because the handler is about to change what it represents.
//!
//! # The Basics
//!
//! Handlers don't know anything about caching. Instead, a [directive](types::Directive) is declared for a handler
//! identity in a side table, usually at startup:
//!
//! - a _cache_ directive makes the interceptor serve the handler's results from the cache;
//! - an _invalidation_ directive makes it delete an entry before the handler runs. It wins if both are declared.
//!
//! A directive describes how to build the entry key: a static list of key parts and, optionally, the names of the
//! invocation arguments whose values specialize the key. `directive!(["user"], ["id"])` invoked with `id = "42"`
//! yields `user:42`. See [`key_resolver`] for the precise rules.
//!
//! The crate makes no assumptions about the transport. An [`Invocation`](traits::Invocation) either has named
//! arguments or it doesn't; when a directive needs them and there are none, the interceptor steps aside and the
//! handler runs uncached.
//!
//! Cached values must implement [`Truthy`](truthy::Truthy). A stored value that is falsy, like JSON `0` or `null`,
//! counts as a miss and the handler runs again.
//!
//! # Storage
//!
//! Anything implementing [`KeyValueStore`](traits::KeyValueStore) can back the interceptor. The crate bundles
//! [`MokaStore`](store::MokaStore), an in-process store over [moka](https://crates.io/crates/moka). Eviction and
//! expiry are the store's concern; the interceptor only gets, sets, and deletes. Store failures are logged and never
//! surface to the caller – the worst a broken store can do is turn every lookup into a miss.
//!
//! # Concurrency
//!
//! There is no coordination between invocations. Two concurrent misses for the same key both run the handler and
//! both store the result; the last write wins. If that is not acceptable, the store must take care of it.

pub mod error;
pub mod interceptor;
pub mod invocation;
pub mod key_resolver;
pub mod registry;
pub mod stats;
pub mod store;
pub mod traits;
pub mod truthy;
pub mod types;

#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use error::Result;
#[doc(inline)]
pub use interceptor::CacheAsideInterceptor;
#[doc(inline)]
pub use key_resolver::CacheKeyResolver;

pub mod prelude {
    pub use crate::directive;
    pub use crate::interceptor::CacheAsideInterceptor;
    pub use crate::invocation::Call;
    pub use crate::key_resolver::CacheKeyResolver;
    pub use crate::registry::DirectiveTable;
    pub use crate::stats::CacheStats;
    pub use crate::stats::StatsObserver;
    pub use crate::store::MokaStore;
    pub use crate::traits::*;
    pub use crate::truthy::Truthy;
    pub use crate::types::*;
}

/// Declare a [`Directive`](types::Directive).
///
/// ```
/// use cache_aside::prelude::*;
///
/// let features = directive!(["workspace", "features"]);
/// assert!(!features.is_parameterized());
///
/// let blob = directive!(["blob"], ["workspace", "id"]);
/// assert_eq!(blob.arg_names().unwrap(), ["workspace", "id"]);
/// ```
#[macro_export]
macro_rules! directive {
    ([$($part:expr),* $(,)?]) => {{
        let key_parts: ::std::vec::Vec<::std::string::String> = ::std::vec![$(::std::string::String::from($part)),*];
        $crate::types::Directive::new(key_parts)
    }};
    ([$($part:expr),* $(,)?], [$($arg:expr),* $(,)?]) => {{
        let arg_names: ::std::vec::Vec<::std::string::String> = ::std::vec![$(::std::string::String::from($arg)),*];
        $crate::directive!([$($part),*]).with_args(arg_names)
    }};
}
