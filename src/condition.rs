use crate::schema::VisibilityCondition;
use crate::value::RawInputMap;

/// Evaluates a single visibility condition against the known field values.
///
/// The referenced value must be one of `matches_any_of`, with the result flipped when
/// the condition is negated. A missing or blank referenced value never satisfies the
/// condition, negated or not.
pub fn evaluate(condition: &VisibilityCondition, values: &RawInputMap) -> bool {
    let Some(literal) = values
        .get(&condition.on_field)
        .filter(|v| !v.is_blank())
        .and_then(|v| v.as_literal())
    else {
        return false;
    };

    let matched = condition
        .matches_any_of
        .iter()
        .any(|expected| literal.matches(expected));
    matched ^ condition.negate
}
