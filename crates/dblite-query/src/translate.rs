//! Translation of [`Criteria`] into a parameterized SQL fragment.
//!
//! The output is meant to be spliced after a `WHERE` keyword and executed
//! with positional binding. Operand values only ever appear in the parameter
//! list; the fragment contains validated identifiers, SQL keywords and `?`
//! placeholders.

use tracing::{debug, trace};

use crate::criteria::{build_criteria, Criteria, Criterion, Filter, Operator};
use crate::error::{Error, Result};
use crate::value::Value;

/// Separator between top-level segments.
const AND_SEPARATOR: &str = " AND ";

/// A SQL fragment paired with the values bound to its placeholders.
///
/// `parameters()[i]` binds to the `i`-th `?` of `fragment()`, reading left to
/// right. The fragment carries no leading `WHERE` and no terminator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Translation {
    fragment: String,
    parameters: Vec<Value>,
}

impl Translation {
    /// The boolean expression, e.g. `name = ? AND age >= ?`.
    #[must_use]
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Bound values in placeholder order.
    #[must_use]
    pub fn parameters(&self) -> &[Value] {
        &self.parameters
    }

    /// Returns `true` when the translation places no restriction.
    ///
    /// Callers must omit the `WHERE` keyword entirely in that case.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragment.is_empty()
    }

    /// Number of `?` placeholders in the fragment.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.fragment.matches('?').count()
    }

    /// Split into fragment and parameters.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.fragment, self.parameters)
    }
}

/// Translate validated criteria into a fragment and its parameters.
///
/// Segments appear in insertion order and are joined with ` AND `. Empty
/// criteria produce an empty fragment with no parameters.
///
/// # Errors
///
/// - [`Error::InvalidCriteria`] if a membership set or group is empty
/// - [`Error::UnsupportedOperator`] if an operator reaches a rendering path
///   that cannot express it
pub fn translate(criteria: &Criteria) -> Result<Translation> {
    let mut parameters = Vec::new();
    let fragment = render_conjunction(criteria, &mut parameters)?;

    debug!(%fragment, "Translated criteria");
    trace!(parameters = parameters.len(), "Bound criteria parameters");

    Ok(Translation {
        fragment,
        parameters,
    })
}

/// Build criteria from `input` and translate them in one step.
///
/// # Errors
///
/// Returns any error from [`build_criteria`] or [`translate`].
pub fn translate_filter(input: Filter) -> Result<Translation> {
    translate(&build_criteria(input)?)
}

fn render_conjunction(criteria: &Criteria, parameters: &mut Vec<Value>) -> Result<String> {
    let segments = criteria
        .iter()
        .map(|criterion| render_criterion(criterion, parameters))
        .collect::<Result<Vec<_>>>()?;
    Ok(segments.join(AND_SEPARATOR))
}

fn render_criterion(criterion: &Criterion, parameters: &mut Vec<Value>) -> Result<String> {
    match criterion {
        Criterion::Condition { field, operator } => {
            render_condition(field.sql_name(), operator, parameters)
        }
        Criterion::Group { junction, branches } => {
            if branches.is_empty() {
                return Err(Error::invalid(format!(
                    "group '{}' has no branches",
                    junction.keyword()
                )));
            }

            let mut parts = Vec::with_capacity(branches.len());
            for branch in branches {
                if branch.is_empty() {
                    return Err(Error::invalid(format!(
                        "group '{}' has an empty branch",
                        junction.keyword()
                    )));
                }
                let rendered = render_conjunction(branch, parameters)?;
                if branch.len() > 1 {
                    parts.push(format!("({rendered})"));
                } else {
                    parts.push(rendered);
                }
            }

            let separator = format!(" {} ", junction.keyword());
            Ok(format!("({})", parts.join(&separator)))
        }
    }
}

fn render_condition(column: &str, operator: &Operator, parameters: &mut Vec<Value>) -> Result<String> {
    match operator {
        Operator::Eq(value)
        | Operator::Ne(value)
        | Operator::Gt(value)
        | Operator::Gte(value)
        | Operator::Lt(value)
        | Operator::Lte(value) => {
            let symbol = comparison_symbol(operator)?;
            parameters.push(value.clone());
            Ok(format!("{column} {symbol} ?"))
        }
        Operator::In(values) | Operator::NotIn(values) => {
            if values.is_empty() {
                return Err(Error::invalid(format!(
                    "operator '{}' on '{column}' has an empty set",
                    operator.key()
                )));
            }
            let keyword = membership_keyword(operator)?;
            let placeholders = vec!["?"; values.len()].join(", ");
            parameters.extend(values.iter().cloned());
            Ok(format!("{column} {keyword} ({placeholders})"))
        }
        Operator::Null(true) => Ok(format!("{column} IS NULL")),
        Operator::Null(false) => Ok(format!("{column} IS NOT NULL")),
    }
}

fn comparison_symbol(operator: &Operator) -> Result<&'static str> {
    match operator {
        Operator::Eq(_) => Ok("="),
        Operator::Ne(_) => Ok("<>"),
        Operator::Gt(_) => Ok(">"),
        Operator::Gte(_) => Ok(">="),
        Operator::Lt(_) => Ok("<"),
        Operator::Lte(_) => Ok("<="),
        Operator::In(_) | Operator::NotIn(_) | Operator::Null(_) => Err(
            Error::UnsupportedOperator(format!("'{}' is not a scalar comparison", operator.key())),
        ),
    }
}

fn membership_keyword(operator: &Operator) -> Result<&'static str> {
    match operator {
        Operator::In(_) => Ok("IN"),
        Operator::NotIn(_) => Ok("NOT IN"),
        other => Err(Error::UnsupportedOperator(format!(
            "'{}' is not a membership test",
            other.key()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn translate_json(input: serde_json::Value) -> Translation {
        translate_filter(Filter::try_from(input).unwrap()).unwrap()
    }

    #[rstest]
    #[case(json!({"a": {"equals": 1}}), "a = ?")]
    #[case(json!({"a": {"not-equals": 1}}), "a <> ?")]
    #[case(json!({"a": {"greater-than": 1}}), "a > ?")]
    #[case(json!({"a": {"greater-or-equal": 1}}), "a >= ?")]
    #[case(json!({"a": {"less-than": 1}}), "a < ?")]
    #[case(json!({"a": {"less-or-equal": 1}}), "a <= ?")]
    #[case(json!({"a": {"in-set": [1, 2]}}), "a IN (?, ?)")]
    #[case(json!({"a": {"not-in-set": [1]}}), "a NOT IN (?)")]
    #[case(json!({"a": {"is-null": true}}), "a IS NULL")]
    #[case(json!({"a": {"is-null": false}}), "a IS NOT NULL")]
    fn each_operator_renders(#[case] input: serde_json::Value, #[case] expected: &str) {
        assert_eq!(translate_json(input).fragment(), expected);
    }

    #[test]
    fn null_test_binds_nothing() {
        let translation = translate_json(json!({"deleted_at": null}));
        assert_eq!(translation.fragment(), "deleted_at IS NULL");
        assert!(translation.parameters().is_empty());
    }

    #[test]
    fn identity_renders_as_rowid() {
        let translation = translate_filter(Filter::Identity(7)).unwrap();
        assert_eq!(translation.fragment(), "rowid = ?");
        assert_eq!(translation.parameters(), [Value::Integer(7)]);
    }

    #[test]
    fn or_group_is_parenthesized() {
        let translation = translate_json(json!({
            "kind": "book",
            "$or": [{"price": {"less-than": 10}}, {"stock": {"greater-than": 0}, "featured": true}]
        }));
        assert_eq!(
            translation.fragment(),
            "kind = ? AND (price < ? OR (stock > ? AND featured = ?))"
        );
        assert_eq!(
            translation.parameters(),
            [
                Value::from("book"),
                Value::Integer(10),
                Value::Integer(0),
                Value::Boolean(true),
            ]
        );
    }

    #[test]
    fn nested_groups_compose() {
        let translation = translate_json(json!({
            "$and": [{"$or": [{"a": 1}, {"b": 2}]}, {"c": {"in-set": [3, 4]}}]
        }));
        assert_eq!(translation.fragment(), "((a = ? OR b = ?) AND c IN (?, ?))");
        assert_eq!(translation.placeholder_count(), translation.parameters().len());
    }

    #[test]
    fn scalar_symbol_rejects_membership() {
        let err = comparison_symbol(&Operator::In(vec![Value::Integer(1)])).unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperator(_)));
    }

    #[test]
    fn membership_keyword_rejects_scalar() {
        let err = membership_keyword(&Operator::Gt(Value::Integer(1))).unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperator(_)));
    }

    #[test]
    fn into_parts_returns_both_halves() {
        let (fragment, parameters) = translate_json(json!({"a": 1})).into_parts();
        assert_eq!(fragment, "a = ?");
        assert_eq!(parameters, [Value::Integer(1)]);
    }
}
