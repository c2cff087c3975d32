//! Guard evaluation for targets
//!
//! A target's `if` properties must all be truthy and its `unless` properties
//! must all be falsy for its tasks to run.

use crate::error::PropertyResult;
use crate::properties::PropertyStore;

/// Outcome of evaluating a target's guards
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// All guards passed
    Run,
    /// An `if` property was unset or empty
    SkipIf(String),
    /// An `unless` property was set
    SkipUnless(String),
}

/// Evaluate `if` guards (all must be truthy - AND logic)
pub fn first_falsy(names: &[String], props: &PropertyStore) -> PropertyResult<Option<String>> {
    for name in names {
        if !props.is_truthy(name)? {
            return Ok(Some(name.clone()));
        }
    }
    Ok(None)
}

/// Evaluate `unless` guards (any truthy one skips)
pub fn first_truthy(names: &[String], props: &PropertyStore) -> PropertyResult<Option<String>> {
    for name in names {
        if props.is_truthy(name)? {
            return Ok(Some(name.clone()));
        }
    }
    Ok(None)
}

/// Evaluate both guard lists against the current property state
pub fn evaluate(
    if_props: &[String],
    unless_props: &[String],
    props: &PropertyStore,
) -> PropertyResult<GuardOutcome> {
    if let Some(name) = first_falsy(if_props, props)? {
        return Ok(GuardOutcome::SkipIf(name));
    }
    if let Some(name) = first_truthy(unless_props, props)? {
        return Ok(GuardOutcome::SkipUnless(name));
    }
    Ok(GuardOutcome::Run)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_guards_runs() {
        let props = PropertyStore::new();
        assert_eq!(evaluate(&[], &[], &props).unwrap(), GuardOutcome::Run);
    }

    #[test]
    fn test_if_requires_every_property() {
        let mut props = PropertyStore::new();
        props.set("a", "1");

        assert_eq!(
            evaluate(&names(&["a", "b"]), &[], &props).unwrap(),
            GuardOutcome::SkipIf("b".to_string())
        );

        props.set("b", "1");
        assert_eq!(
            evaluate(&names(&["a", "b"]), &[], &props).unwrap(),
            GuardOutcome::Run
        );
    }

    #[test]
    fn test_unless_skips_on_any_truthy() {
        let mut props = PropertyStore::new();
        props.set("skip", "");
        assert_eq!(
            evaluate(&[], &names(&["skip", "other"]), &props).unwrap(),
            GuardOutcome::Run
        );

        props.set("other", "yes");
        assert_eq!(
            evaluate(&[], &names(&["skip", "other"]), &props).unwrap(),
            GuardOutcome::SkipUnless("other".to_string())
        );
    }

    #[test]
    fn test_if_checked_before_unless() {
        let mut props = PropertyStore::new();
        props.set("u", "yes");
        assert_eq!(
            evaluate(&names(&["i"]), &names(&["u"]), &props).unwrap(),
            GuardOutcome::SkipIf("i".to_string())
        );
    }
}
