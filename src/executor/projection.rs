/// Projection of filtered rows into output rows
///
/// Plain column lists map rows one to one. As soon as one item is an
/// aggregate (SUM/COUNT) the rows are grouped and each group yields one row.

use super::conditions::ConditionEvaluator;
use crate::parser::{AggregateFunction, ColumnRef, Expr, Projection, SelectItem};
use crate::types::{Row, Value};

pub struct RowProjector;

impl RowProjector {
    pub fn project(
        projection: &Projection,
        group_by: Option<&[ColumnRef]>,
        rows: Vec<Row>,
        namespaced: bool,
    ) -> Vec<Row> {
        let items = match projection {
            Projection::Wildcard => return rows,
            Projection::Columns(items) => items,
        };

        if items.iter().any(|item| item.expr.is_aggregate()) {
            Self::aggregate(items, group_by, &rows, namespaced)
        } else {
            rows.iter()
                .map(|row| Self::project_row(items, row, namespaced))
                .collect()
        }
    }

    fn project_row(items: &[SelectItem], row: &Row, namespaced: bool) -> Row {
        items
            .iter()
            .map(|item| (item.output_name(), ConditionEvaluator::value_of(&item.expr, row, namespaced)))
            .collect()
    }

    fn aggregate(
        items: &[SelectItem],
        group_by: Option<&[ColumnRef]>,
        rows: &[Row],
        namespaced: bool,
    ) -> Vec<Row> {
        let mut groups: Vec<Group> = Vec::new();

        // Without GROUP BY there is always exactly one group, even over no rows
        if group_by.is_none() {
            groups.push(Group::new(Vec::new(), items.len()));
        }

        for row in rows {
            let key: Vec<Value> = group_by
                .unwrap_or_default()
                .iter()
                .map(|column| row.get(&column.key(namespaced)))
                .collect();

            let index = match groups.iter().position(|group| group.has_key(&key)) {
                Some(index) => index,
                None => {
                    groups.push(Group::new(key, items.len()));
                    groups.len() - 1
                }
            };
            groups[index].accumulate(items, row, namespaced);
        }

        groups
            .into_iter()
            .map(|group| group.finish(items, namespaced))
            .collect()
    }
}

struct Group {
    key: Vec<Value>,
    last: Row,
    count: i64,
    sums: Vec<Sum>,
}

impl Group {
    fn new(key: Vec<Value>, width: usize) -> Self {
        Self {
            key,
            last: Row::new(),
            count: 0,
            sums: vec![Sum::Integer(0); width],
        }
    }

    fn has_key(&self, key: &[Value]) -> bool {
        self.key.len() == key.len() && self.key.iter().zip(key).all(|(a, b)| a.loose_eq(b))
    }

    fn accumulate(&mut self, items: &[SelectItem], row: &Row, namespaced: bool) {
        self.count += 1;
        for (sum, item) in self.sums.iter_mut().zip(items) {
            if let Expr::Aggregate { func: AggregateFunction::Sum, arg } = &item.expr {
                *sum = sum.add(&row.get(&arg.key(namespaced)));
            }
        }
        // Last write wins for plain columns
        self.last = row.clone();
    }

    fn finish(self, items: &[SelectItem], namespaced: bool) -> Row {
        items
            .iter()
            .zip(self.sums)
            .map(|(item, sum)| {
                let value = match &item.expr {
                    Expr::Aggregate { func: AggregateFunction::Sum, .. } => sum.into(),
                    Expr::Aggregate { func: AggregateFunction::Count, .. } => Value::Integer(self.count),
                    expr => ConditionEvaluator::value_of(expr, &self.last, namespaced),
                };
                (item.output_name(), value)
            })
            .collect()
    }
}

/// Running SUM; stays integral until it overflows or meets a real
#[derive(Debug, Clone, Copy, PartialEq)]
enum Sum {
    Integer(i64),
    Real(f64),
}

impl Sum {
    fn add(self, value: &Value) -> Self {
        let addend = match value {
            Value::Integer(i) => Self::Integer(*i),
            Value::Real(r) => Self::Real(*r),
            Value::Text(text) => match (text.trim().parse::<i64>(), text.trim().parse::<f64>()) {
                (Ok(i), _) => Self::Integer(i),
                (_, Ok(r)) => Self::Real(r),
                _ => return self,
            },
            Value::Null | Value::Boolean(_) => return self,
        };

        match (self, addend) {
            (Self::Integer(a), Self::Integer(b)) => a
                .checked_add(b)
                .map_or_else(|| Self::Real(a as f64 + b as f64), Self::Integer),
            (a, b) => Self::Real(a.as_f64() + b.as_f64()),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Self::Integer(i) => i as f64,
            Self::Real(r) => r,
        }
    }
}

impl From<Sum> for Value {
    fn from(sum: Sum) -> Self {
        match sum {
            Sum::Integer(i) => Self::Integer(i),
            Sum::Real(r) => Self::Real(r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    fn sum(column: &str) -> SelectItem {
        SelectItem::new(Expr::Aggregate {
            func: AggregateFunction::Sum,
            arg: ColumnRef::new(column),
        })
    }

    fn count(column: &str) -> SelectItem {
        SelectItem::new(Expr::Aggregate {
            func: AggregateFunction::Count,
            arg: ColumnRef::new(column),
        })
    }

    fn rows() -> Vec<Row> {
        vec![
            row! { "region" => "West", "name" => "Utah", "pop" => 5 },
            row! { "region" => "East", "name" => "Ohio", "pop" => 3 },
            row! { "region" => "West", "name" => "Idaho", "pop" => 2 },
        ]
    }

    #[test]
    fn test_wildcard_passes_rows_through() {
        let projected = RowProjector::project(&Projection::Wildcard, None, rows(), false);
        assert_eq!(projected, rows());
    }

    #[test]
    fn test_column_list_with_alias() {
        let projection = Projection::Columns(vec![
            SelectItem::new(Expr::column("name")),
            SelectItem::aliased(Expr::column("pop"), "population"),
            SelectItem::new(Expr::column("missing")),
        ]);
        let projected = RowProjector::project(&projection, None, rows(), false);
        assert_eq!(projected.len(), 3);
        assert_eq!(
            projected[0],
            row! { "name" => "Utah", "population" => 5, "missing" => Value::Null }
        );
    }

    #[test]
    fn test_qualified_column_keeps_table_prefix_in_name() {
        let projection = Projection::Columns(vec![SelectItem::new(Expr::qualified("states", "name"))]);
        let input = vec![row! { "states.name" => "Utah", "capitals.name" => "Salt Lake City" }];
        let projected = RowProjector::project(&projection, None, input, true);
        assert_eq!(projected, vec![row! { "states.name" => "Utah" }]);
    }

    #[test]
    fn test_sum_and_count_without_group_by() {
        let projection = Projection::Columns(vec![sum("pop"), count("*")]);
        let projected = RowProjector::project(&projection, None, rows(), false);
        assert_eq!(projected, vec![row! { "SUM(pop)" => 10, "COUNT(*)" => 3 }]);
    }

    #[test]
    fn test_aggregates_over_no_rows_are_zero() {
        let projection = Projection::Columns(vec![sum("pop"), count("pop")]);
        let projected = RowProjector::project(&projection, None, Vec::new(), false);
        assert_eq!(projected, vec![row! { "SUM(pop)" => 0, "COUNT(pop)" => 0 }]);
    }

    #[test]
    fn test_group_by_with_no_rows_yields_no_groups() {
        let projection = Projection::Columns(vec![count("*")]);
        let group_by = [ColumnRef::new("region")];
        let projected = RowProjector::project(&projection, Some(&group_by), Vec::new(), false);
        assert!(projected.is_empty());
    }

    #[test]
    fn test_group_by_keeps_first_seen_order_and_last_value() {
        let projection = Projection::Columns(vec![
            SelectItem::new(Expr::column("region")),
            SelectItem::new(Expr::column("name")),
            sum("pop"),
            count("pop"),
        ]);
        let group_by = [ColumnRef::new("region")];
        let projected = RowProjector::project(&projection, Some(&group_by), rows(), false);
        assert_eq!(
            projected,
            vec![
                row! { "region" => "West", "name" => "Idaho", "SUM(pop)" => 7, "COUNT(pop)" => 2 },
                row! { "region" => "East", "name" => "Ohio", "SUM(pop)" => 3, "COUNT(pop)" => 1 },
            ]
        );
    }

    #[test]
    fn test_count_ignores_column_value() {
        let input = vec![row! { "x" => Value::Null }, row! {}];
        let projection = Projection::Columns(vec![count("x")]);
        let projected = RowProjector::project(&projection, None, input, false);
        assert_eq!(projected[0].get("COUNT(x)"), Value::Integer(2));
    }

    #[test]
    fn test_sum_coercion() {
        let input = vec![
            row! { "v" => 1 },
            row! { "v" => "2" },
            row! { "v" => "n/a" },
            row! { "v" => Value::Null },
            row! { "v" => 0.5 },
        ];
        let projection = Projection::Columns(vec![sum("v")]);
        let projected = RowProjector::project(&projection, None, input, false);
        assert_eq!(projected[0].get("SUM(v)"), Value::Real(3.5));
    }

    #[test]
    fn test_sum_promotes_to_real_on_overflow() {
        let total = Sum::Integer(i64::MAX).add(&Value::Integer(1));
        assert!(matches!(total, Sum::Real(_)));
    }
}
