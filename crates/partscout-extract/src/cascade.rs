//! Ordered first-match-wins rule lists.

/// One named extraction step.
///
/// `C` is the shared context the rule reads from (compiled patterns, a
/// parsed document, ...). Rules are plain function pointers so a cascade can
/// live in a `const` slice.
pub struct Rule<C: 'static, T> {
    pub name: &'static str,
    pub apply: fn(&C, &str) -> Option<T>,
}

/// The value produced by a cascade, tagged with the rule that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Matched<T> {
    pub rule: &'static str,
    pub value: T,
}

/// Evaluates `rules` in order and returns the first hit.
///
/// Rules after the first hit are never called.
pub fn first_match<C, T>(rules: &[Rule<C, T>], ctx: &C, text: &str) -> Option<Matched<T>> {
    rules.iter().find_map(|rule| {
        (rule.apply)(ctx, text).map(|value| {
            tracing::trace!(rule = rule.name, "extraction rule matched");
            Matched {
                rule: rule.name,
                value,
            }
        })
    })
}
