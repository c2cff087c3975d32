//! Property interpolation for strings
//!
//! This module resolves `${name}` references against a [`PropertyStore`].
//! Values are resolved recursively, innermost reference first, and a name that
//! shows up again while it is still being resolved is reported as a cycle.

use crate::error::{PropertyError, PropertyResult};
use crate::properties::PropertyStore;
use regex::Regex;
use std::sync::LazyLock;

/// Maximum number of names being resolved at once
pub const MAX_RESOLUTION_DEPTH: usize = 256;

/// Maximum number of substitutions performed by a single filter call
pub const MAX_SUBSTITUTIONS: usize = 10_000;

/// Matches `${name}` where the name contains no braces, so nested references
/// are resolved from the inside out.
static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^{}]+)\}").expect("reference pattern is valid"));

/// Check whether a string contains any `${...}` reference
pub fn has_references(s: &str) -> bool {
    REFERENCE.is_match(s)
}

/// Resolution state for one filter call
///
/// `active` holds the names currently being resolved, outermost first.
pub(crate) struct Resolver<'s> {
    store: &'s PropertyStore,
    active: Vec<String>,
    substitutions: usize,
}

impl<'s> Resolver<'s> {
    pub(crate) fn new(store: &'s PropertyStore) -> Self {
        Resolver {
            store,
            active: Vec::new(),
            substitutions: 0,
        }
    }

    /// Replace every reference in `input` with its fully resolved value
    pub(crate) fn resolve_str(&mut self, input: &str) -> PropertyResult<String> {
        let mut current = input.to_string();

        while let Some(found) = REFERENCE.find(&current) {
            let range = found.range();
            // strip the surrounding "${" and "}"
            let name = current[range.start + 2..range.end - 1].to_string();

            self.substitutions += 1;
            if self.substitutions > MAX_SUBSTITUTIONS {
                return Err(PropertyError::TooDeep(MAX_SUBSTITUTIONS));
            }

            let value = self.resolve_name(&name)?;
            current.replace_range(range, &value);
        }

        Ok(current)
    }

    /// Resolve a single property name to its fully interpolated value
    pub(crate) fn resolve_name(&mut self, name: &str) -> PropertyResult<String> {
        if let Some(pos) = self.active.iter().position(|n| n == name) {
            let mut chain: Vec<&str> = self.active[pos..].iter().map(String::as_str).collect();
            chain.push(name);
            return Err(PropertyError::Cycle {
                name: name.to_string(),
                chain: chain.join(" -> "),
            });
        }

        if self.active.len() >= MAX_RESOLUTION_DEPTH {
            return Err(PropertyError::TooDeep(MAX_RESOLUTION_DEPTH));
        }

        let store = self.store;
        let raw = store
            .get(name)
            .ok_or_else(|| PropertyError::Unknown(name.to_string()))?;

        self.active.push(name.to_string());
        let result = self.resolve_str(raw);
        self.active.pop();

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(pairs: &[(&str, &str)]) -> PropertyStore {
        let mut store = PropertyStore::new();
        for (k, v) in pairs {
            store.set(*k, *v);
        }
        store
    }

    #[test]
    fn test_plain_string_unchanged() {
        let props = store(&[("a", "1")]);
        let input = "no references here, not even $a or {a}";
        assert_eq!(props.filter(input).unwrap(), input);
    }

    #[test]
    fn test_dotted_name() {
        let props = store(&[("one.two", "three")]);
        assert_eq!(props.filter("${one.two}").unwrap(), "three");
    }

    #[test]
    fn test_multiple_references() {
        let props = store(&[("first", "John"), ("last", "Doe")]);
        assert_eq!(props.filter("${first} ${last}!").unwrap(), "John Doe!");
    }

    #[test]
    fn test_nested_value() {
        let props = store(&[("a", "${b}"), ("b", "x")]);
        assert_eq!(props.filter("${a}").unwrap(), "x");
    }

    #[test]
    fn test_deep_chain() {
        let mut props = PropertyStore::new();
        for i in 0..100 {
            props.set(format!("p{}", i), format!("${{p{}}}", i + 1));
        }
        props.set("p100", "bottom");
        assert_eq!(props.filter("${p0}").unwrap(), "bottom");
    }

    #[test]
    fn test_composed_name() {
        let props = store(&[("env", "prod"), ("url.prod", "https://example.com")]);
        assert_eq!(props.filter("${url.${env}}").unwrap(), "https://example.com");
    }

    #[test]
    fn test_repeated_reference_is_not_a_cycle() {
        let props = store(&[("x", "${y}-${y}"), ("y", "z")]);
        assert_eq!(props.filter("${x}/${x}").unwrap(), "z-z/z-z");
    }

    #[test]
    fn test_two_property_cycle() {
        let props = store(&[("a", "${b}"), ("b", "${a}")]);
        let err = props.filter("${a}").unwrap_err();
        match err {
            PropertyError::Cycle { name, chain } => {
                assert_eq!(name, "a");
                assert_eq!(chain, "a -> b -> a");
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_reference() {
        let props = store(&[("a", "prefix ${a}")]);
        assert!(matches!(
            props.filter("${a}"),
            Err(PropertyError::Cycle { .. })
        ));
    }

    #[test]
    fn test_unknown_property() {
        let props = store(&[("a", "${missing}")]);
        assert_eq!(
            props.filter("value: ${a}"),
            Err(PropertyError::Unknown("missing".to_string()))
        );
    }

    #[test]
    fn test_empty_name_left_literal() {
        let props = PropertyStore::new();
        assert_eq!(props.filter("Value: ${}").unwrap(), "Value: ${}");
    }

    #[test]
    fn test_has_references() {
        assert!(has_references("a ${b} c"));
        assert!(!has_references("a $b {c}"));
    }

    #[test]
    fn test_long_reference_chain_is_capped() {
        let mut props = PropertyStore::new();
        for i in 0..300 {
            props.set(format!("p{}", i), format!("${{p{}}}", i + 1));
        }
        props.set("p300", "end");

        assert_eq!(
            props.filter("${p0}"),
            Err(PropertyError::TooDeep(MAX_RESOLUTION_DEPTH))
        );
        assert_eq!(props.filter("${p100}").unwrap(), "end");
    }

    #[test]
    fn test_substitution_count_is_capped() {
        let mut props = PropertyStore::new();
        props.set("x0", "a");
        for i in 1..=14 {
            props.set(format!("x{}", i), format!("${{x{0}}}${{x{0}}}", i - 1));
        }

        assert_eq!(props.filter("${x5}").unwrap(), "a".repeat(32));
        assert_eq!(
            props.filter("${x14}"),
            Err(PropertyError::TooDeep(MAX_SUBSTITUTIONS))
        );
    }
}
