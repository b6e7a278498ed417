/// Multi-table JOIN execution
///
/// Sources are reduced left to right with a nested loop. Every column of a
/// joined row is namespaced as `table.column`. Outer joins keep unmatched rows
/// with only their own columns; the other side is absent, not NULL-filled.

use tracing::debug;

use super::conditions::ConditionEvaluator;
use crate::parser::{Expr, JoinType};
use crate::types::{DatabaseError, Row};

/// Rows of one FROM/JOIN source as fetched from the store
#[derive(Debug, Clone)]
pub struct JoinInput {
    pub table: String,
    pub join: Option<JoinType>,
    pub condition: Option<Expr>,
    pub rows: Vec<Row>,
}

pub struct JoinPlanner;

impl JoinPlanner {
    /// Merge all sources into one namespaced row set
    pub fn plan(inputs: Vec<JoinInput>) -> Result<Vec<Row>, DatabaseError> {
        let mut inputs = inputs.into_iter();
        let Some(first) = inputs.next() else {
            return Ok(Vec::new());
        };

        let mut accumulator: Vec<Row> = first
            .rows
            .iter()
            .map(|row| row.namespaced(&first.table))
            .collect();

        for input in inputs {
            let join = input
                .join
                .ok_or_else(|| DatabaseError::MissingJoinClause(input.table.clone()))?;
            let right: Vec<Row> = input
                .rows
                .iter()
                .map(|row| row.namespaced(&input.table))
                .collect();

            accumulator = Self::join_step(accumulator, &right, join, input.condition.as_ref());
            debug!(table = %input.table, ?join, rows = accumulator.len(), "join step");
        }

        Ok(accumulator)
    }

    fn join_step(left: Vec<Row>, right: &[Row], join: JoinType, condition: Option<&Expr>) -> Vec<Row> {
        let mut left_used = vec![false; left.len()];
        let mut right_used = vec![false; right.len()];
        let mut result = Vec::new();

        for (li, l) in left.iter().enumerate() {
            for (ri, r) in right.iter().enumerate() {
                let merged = l.merged(r);
                if ConditionEvaluator::evaluate(condition, &merged, true) {
                    left_used[li] = true;
                    right_used[ri] = true;
                    result.push(merged);
                }
            }
        }

        if join.keeps_left() {
            result.extend(
                left.into_iter()
                    .zip(&left_used)
                    .filter(|(_, used)| !**used)
                    .map(|(row, _)| row),
            );
        }

        if join.keeps_right() {
            result.extend(
                right
                    .iter()
                    .zip(&right_used)
                    .filter(|(_, used)| !**used)
                    .map(|(row, _)| row.clone()),
            );
        }

        result
    }
}
