/// Condition evaluation for WHERE clauses and JOIN conditions
///
/// Evaluates a predicate expression against one row (or one merged row during
/// a join). Supports: =, !=/<>, <, <=, >, >=, IS, IS NOT, AND, OR, LIKE,
/// NOT LIKE. Any other operator fails closed: the row is excluded, no error.

use std::cmp::Ordering;

use tracing::warn;

use super::like::LikeMatcher;
use crate::parser::{BinaryOp, Expr};
use crate::types::{Row, Value};

pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Evaluate an optional predicate; no predicate matches every row
    pub fn evaluate(expr: Option<&Expr>, row: &Row, namespaced: bool) -> bool {
        expr.is_none_or(|expr| Self::matches(expr, row, namespaced))
    }

    /// Evaluate a predicate expression to a boolean
    pub fn matches(expr: &Expr, row: &Row, namespaced: bool) -> bool {
        match expr {
            Expr::Binary { op, left, right } => Self::evaluate_binary(op, left, right, row, namespaced),
            // Aggregates only make sense in a projection
            Expr::Aggregate { .. } => false,
            Expr::Column(_) | Expr::Literal(_) => Self::value_of(expr, row, namespaced).is_truthy(),
        }
    }

    /// Resolve an expression to a scalar value
    pub fn value_of(expr: &Expr, row: &Row, namespaced: bool) -> Value {
        match expr {
            Expr::Column(column) => row.get(&column.key(namespaced)),
            Expr::Literal(value) => value.clone(),
            Expr::Binary { .. } => Value::Boolean(Self::matches(expr, row, namespaced)),
            Expr::Aggregate { .. } => Value::Null,
        }
    }

    fn evaluate_binary(op: &BinaryOp, left: &Expr, right: &Expr, row: &Row, namespaced: bool) -> bool {
        match op {
            BinaryOp::And => {
                Self::matches(left, row, namespaced) && Self::matches(right, row, namespaced)
            }
            BinaryOp::Or => {
                Self::matches(left, row, namespaced) || Self::matches(right, row, namespaced)
            }
            BinaryOp::Like | BinaryOp::NotLike => {
                let value = Self::value_of(left, row, namespaced);
                let pattern = Self::value_of(right, row, namespaced);
                Self::match_like(&value, &pattern, matches!(op, BinaryOp::NotLike))
            }
            BinaryOp::Unsupported(symbol) => {
                warn!(operator = %symbol, "unsupported operator in predicate, row excluded");
                false
            }
            comparison => {
                let l = Self::value_of(left, row, namespaced);
                let r = Self::value_of(right, row, namespaced);
                Self::compare(comparison, &l, &r)
            }
        }
    }

    fn compare(op: &BinaryOp, left: &Value, right: &Value) -> bool {
        match op {
            BinaryOp::Eq => left.loose_eq(right),
            BinaryOp::NotEq => !left.loose_eq(right),
            BinaryOp::Is => left.strict_eq(right),
            BinaryOp::IsNot => !left.strict_eq(right),
            BinaryOp::Lt => left.compare(right) == Some(Ordering::Less),
            BinaryOp::LtEq => matches!(left.compare(right), Some(Ordering::Less | Ordering::Equal)),
            BinaryOp::Gt => left.compare(right) == Some(Ordering::Greater),
            BinaryOp::GtEq => {
                matches!(left.compare(right), Some(Ordering::Greater | Ordering::Equal))
            }
            _ => false,
        }
    }

    /// NULL never matches a pattern, negated or not
    fn match_like(value: &Value, pattern: &Value, negated: bool) -> bool {
        if value.is_null() || pattern.is_null() {
            return false;
        }

        match LikeMatcher::cached(&pattern.text()) {
            Ok(matcher) => matcher.test(&value.text()) != negated,
            Err(e) => {
                warn!(pattern = %pattern, error = %e, "invalid LIKE pattern, row excluded");
                false
            }
        }
    }
}
