/// Query (SELECT) operations over one row set
///
/// Pipeline: WHERE filter, ORDER BY, projection (with GROUP BY/aggregates),
/// then LIMIT/OFFSET. The row set is either one table or a join result.

use std::cmp::Ordering;

use tracing::debug;

use super::conditions::ConditionEvaluator;
use super::projection::RowProjector;
use crate::parser::{ColumnRef, Expr, Limit, OrderByItem, Select, SortOrder};
use crate::types::{DatabaseError, Row};

pub struct SelectExecutor;

impl SelectExecutor {
    pub fn select(select: &Select, rows: Vec<Row>, namespaced: bool) -> Result<Vec<Row>, DatabaseError> {
        let sort_keys = select
            .order_by
            .as_deref()
            .map(Self::sort_keys)
            .transpose()?;
        let window = select.limit.map(Self::window).transpose()?;

        let mut rows: Vec<Row> = rows
            .into_iter()
            .filter(|row| ConditionEvaluator::evaluate(select.predicate.as_ref(), row, namespaced))
            .collect();
        debug!(matched = rows.len(), "rows after WHERE");

        if let Some(keys) = &sort_keys {
            rows.sort_by(|a, b| Self::compare_rows(keys, a, b, namespaced));
        }

        let rows = RowProjector::project(&select.projection, select.group_by.as_deref(), rows, namespaced);

        Ok(match window {
            Some((offset, count)) => rows.into_iter().skip(offset).take(count).collect(),
            None => rows,
        })
    }

    /// ORDER BY entries must all be plain column references
    fn sort_keys(items: &[OrderByItem]) -> Result<Vec<(&ColumnRef, SortOrder)>, DatabaseError> {
        items
            .iter()
            .map(|item| match &item.expr {
                Expr::Column(column) => Ok((column, item.order)),
                other => Err(DatabaseError::UnorderableExpression(other.to_string())),
            })
            .collect()
    }

    fn window(limit: Limit) -> Result<(usize, usize), DatabaseError> {
        match (limit.offset, limit.count) {
            (Some(offset), Some(count)) => Ok((offset, count)),
            _ => Err(DatabaseError::MalformedLimit),
        }
    }

    /// First differing key decides; ties fall through to the next key
    fn compare_rows(keys: &[(&ColumnRef, SortOrder)], a: &Row, b: &Row, namespaced: bool) -> Ordering {
        for (column, order) in keys {
            let key = column.key(namespaced);
            let ordering = a.get(&key).sort_cmp(&b.get(&key));
            if ordering != Ordering::Equal {
                return match order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                };
            }
        }
        Ordering::Equal
    }
}
