//! Cache key derivation.
//!
//! A key is the directive's `key_parts` joined with the delimiter. Parameterized directives append one more
//! segment made of the values of the named arguments, in the declared order, again joined with the delimiter.
//! Arguments whose value is falsy – `null`, `false`, `0`, or an empty string – are left out as if they were never
//! passed. When none survive the key falls back to the static one, shared by every invocation of the handler.
//! Note that this makes `id = 0` and a missing `id` indistinguishable.

use serde_json::Value;
use std::borrow::Cow;

use crate::traits::Invocation;
use crate::truthy::Truthy;
use crate::types::Arguments;
use crate::types::Directive;

pub const KEY_DELIMITER: &str = ":";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheKeyResolver {
    delimiter: Cow<'static, str>,
}

impl Default for CacheKeyResolver {
    fn default() -> Self {
        Self {
            delimiter: Cow::Borrowed(KEY_DELIMITER),
        }
    }
}

impl CacheKeyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(delimiter: impl Into<Cow<'static, str>>) -> Self {
        Self {
            delimiter: delimiter.into(),
        }
    }

    #[inline]
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Key shared by all invocations of a handler, regardless of their arguments.
    pub fn static_key(&self, directive: &Directive) -> String {
        directive.key_parts().join(self.delimiter())
    }

    /// Produce the key for an invocation or `None` if it can't be cached.
    #[inline]
    pub fn resolve_for<I>(&self, directive: &Directive, invocation: &I) -> Option<String>
    where
        I: Invocation + ?Sized,
    {
        self.resolve(directive, invocation.named_args())
    }

    /// `args` is `None` when the invocation's transport doesn't deliver named arguments. In this case only
    /// directives without argument names are resolvable.
    pub fn resolve(&self, directive: &Directive, args: Option<&Arguments>) -> Option<String> {
        let Some(arg_names) = directive.arg_names()
        else {
            return Some(self.static_key(directive));
        };

        let args = args?;

        let suffix = arg_names
            .iter()
            .filter_map(|name| args.get(name).and_then(key_segment))
            .collect::<Vec<_>>()
            .join(self.delimiter());

        Some(if suffix.is_empty() {
            self.static_key(directive)
        }
        else {
            directive
                .key_parts()
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(suffix.as_str()))
                .collect::<Vec<_>>()
                .join(self.delimiter())
        })
    }
}

// Render an argument value as a key segment; falsy values produce nothing.
fn key_segment(value: &Value) -> Option<Cow<'_, str>> {
    if !value.is_truthy() {
        return None;
    }
    Some(match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Number(n) => Cow::Owned(n.to_string()),
        _ => Cow::Owned(value.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Arguments {
        match value {
            Value::Object(map) => map,
            _ => panic!("arguments must be an object"),
        }
    }

    #[test]
    fn static_directive_ignores_arguments() {
        let resolver = CacheKeyResolver::default();
        let directive = Directive::new(["workspace", "list"]);

        assert_eq!(resolver.resolve(&directive, None).as_deref(), Some("workspace:list"));
        assert_eq!(
            resolver
                .resolve(&directive, Some(&args(json!({"id": "1"}))))
                .as_deref(),
            Some("workspace:list")
        );
    }

    #[test]
    fn arguments_are_appended_in_declared_order() {
        let resolver = CacheKeyResolver::default();
        let a = args(json!({"a": "x", "b": "y"}));

        let ab = Directive::new(["k"]).with_args(["a", "b"]);
        let ba = Directive::new(["k"]).with_args(["b", "a"]);

        assert_eq!(resolver.resolve(&ab, Some(&a)).as_deref(), Some("k:x:y"));
        assert_eq!(resolver.resolve(&ba, Some(&a)).as_deref(), Some("k:y:x"));
    }

    #[test]
    fn falsy_arguments_are_dropped() {
        let resolver = CacheKeyResolver::default();
        let directive = Directive::new(["k"]).with_args(["a", "b"]);

        for b in [json!(""), json!(0), json!(0.0), json!(false), json!(null)] {
            let a = args(json!({"a": "x", "b": b.clone()}));
            assert_eq!(resolver.resolve(&directive, Some(&a)).as_deref(), Some("k:x"), "b = {b}");
        }

        let a = args(json!({"a": "x"}));
        assert_eq!(resolver.resolve(&directive, Some(&a)).as_deref(), Some("k:x"));
    }

    #[test]
    fn all_falsy_degrades_to_static_key() {
        let resolver = CacheKeyResolver::default();
        let directive = Directive::new(["user", "profile"]).with_args(["id"]);

        assert_eq!(
            resolver.resolve(&directive, Some(&args(json!({"id": 0})))).as_deref(),
            Some("user:profile")
        );
        assert_eq!(
            resolver.resolve(&directive, Some(&Arguments::new())).as_deref(),
            Some("user:profile")
        );
    }

    #[test]
    fn missing_structured_arguments_is_unresolvable() {
        let resolver = CacheKeyResolver::default();
        let directive = Directive::new(["user"]).with_args(["id"]);
        assert_eq!(resolver.resolve(&directive, None), None);

        // Even an empty name list requires structured arguments.
        let directive = Directive::new(["user"]).with_args(Vec::<String>::new());
        assert_eq!(resolver.resolve(&directive, None), None);
    }

    #[test]
    fn value_rendering() {
        let resolver = CacheKeyResolver::default();
        let directive = Directive::new(["q"]).with_args(["n", "f", "t", "l"]);
        let a = args(json!({"n": 42, "f": -1.5, "t": true, "l": [1, 2]}));

        assert_eq!(resolver.resolve(&directive, Some(&a)).as_deref(), Some("q:42:-1.5:true:[1,2]"));
    }

    // Numbers keep their JSON form, so a float with a zero fraction is not the integer. Empty containers are truthy
    // and render as themselves.
    #[test]
    fn float_and_empty_container_rendering() {
        let resolver = CacheKeyResolver::default();
        let directive = Directive::new(["k"]).with_args(["v"]);

        let key = |v: Value| resolver.resolve(&directive, Some(&args(json!({ "v": v }))));

        assert_eq!(key(json!(1.0)).as_deref(), Some("k:1.0"));
        assert_eq!(key(json!(1)).as_deref(), Some("k:1"));
        assert_ne!(key(json!(1.0)), key(json!(1)));
        assert_eq!(key(json!([])).as_deref(), Some("k:[]"));
        assert_eq!(key(json!({})).as_deref(), Some("k:{}"));
        assert_eq!(key(json!(0.0)).as_deref(), Some("k"));
    }

    #[test]
    fn custom_delimiter() {
        let resolver = CacheKeyResolver::with_delimiter("/");
        let directive = Directive::new(["doc", "blob"]).with_args(["ws", "id"]);
        let a = args(json!({"ws": "w1", "id": "b7"}));

        assert_eq!(resolver.resolve(&directive, Some(&a)).as_deref(), Some("doc/blob/w1/b7"));
        assert_eq!(resolver.delimiter(), "/");
    }
}
