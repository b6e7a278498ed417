// Module declarations
mod statement;
mod common;
mod ddl;
mod dml;
mod queries;

pub use statement::{
    AggregateFunction, BinaryOp, ColumnRef, Delete, Expr, Insert, JoinType, Limit, OrderByItem,
    Projection, Select, SelectItem, SortOrder, Source, Statement, Update,
};

use crate::types::DatabaseError;
use nom::branch::alt;

/// Parse one SQL statement into its tree; a trailing `;` is ignored
pub fn parse_statement(input: &str) -> Result<Statement, DatabaseError> {
    let input = input.trim();
    let input = input.trim_end_matches(';');

    let result = alt((
        queries::select,
        dml::insert,
        dml::update,
        dml::delete,
        ddl::create_table,
        ddl::drop_table,
        ddl::other,
    ))(input);

    match result {
        Ok((remaining, stmt)) => {
            if remaining.trim().is_empty() {
                Ok(stmt)
            } else {
                Err(DatabaseError::Parse(format!(
                    "Unexpected input after statement: {}",
                    snippet(remaining)
                )))
            }
        }
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(DatabaseError::Parse(format!(
            "near '{}' in '{input}'",
            snippet(e.input)
        ))),
        Err(nom::Err::Incomplete(_)) => {
            Err(DatabaseError::Parse("Incomplete statement".to_string()))
        }
    }
}

fn snippet(text: &str) -> String {
    text.trim().chars().take(24).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn select(sql: &str) -> Select {
        match parse_statement(sql).unwrap() {
            Statement::Select(select) => select,
            other => panic!("Expected SELECT, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_select_star() {
        let stmt = select("SELECT * FROM states");
        assert_eq!(stmt, Select::all_from("states"));
    }

    #[test]
    fn test_parse_select_with_where() {
        let stmt = select("SELECT * FROM states WHERE State = 'South Dakota';");
        assert_eq!(
            stmt.predicate,
            Some(Expr::column("State").equals(Expr::literal("South Dakota")))
        );
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let stmt = select("SELECT * FROM t WHERE a = 1 OR b = 2 AND c = 3");
        let expected = Expr::column("a").equals(Expr::literal(1)).or(Expr::column("b")
            .equals(Expr::literal(2))
            .and(Expr::column("c").equals(Expr::literal(3))));
        assert_eq!(stmt.predicate, Some(expected));
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let stmt = select("SELECT * FROM t WHERE (a = 1 OR b = 2) AND c = 3");
        match stmt.predicate {
            Some(Expr::Binary { op: BinaryOp::And, left, .. }) => {
                assert!(matches!(*left, Expr::Binary { op: BinaryOp::Or, .. }));
            }
            other => panic!("Expected AND at the root, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_comparison_operators() {
        for (sql, op) in [
            ("a <> 1", BinaryOp::NotEq),
            ("a != 1", BinaryOp::NotEq),
            ("a >= 1", BinaryOp::GtEq),
            ("a <= 1", BinaryOp::LtEq),
            ("a IS NULL", BinaryOp::Is),
            ("a IS NOT NULL", BinaryOp::IsNot),
            ("a LIKE 'x%'", BinaryOp::Like),
            ("a NOT LIKE 'x%'", BinaryOp::NotLike),
        ] {
            let stmt = select(&format!("SELECT * FROM t WHERE {sql}"));
            match stmt.predicate {
                Some(Expr::Binary { op: parsed, .. }) => assert_eq!(parsed, op, "{sql}"),
                other => panic!("Expected binary predicate for {sql}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_arithmetic_is_parsed_as_unsupported() {
        let stmt = select("SELECT * FROM t WHERE a + 1 = 2");
        match stmt.predicate {
            Some(Expr::Binary { op: BinaryOp::Eq, left, .. }) => {
                assert!(matches!(*left, Expr::Binary { op: BinaryOp::Unsupported(_), .. }));
            }
            other => panic!("Expected comparison, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_order_by_and_limit() {
        let stmt = select("SELECT * FROM states ORDER BY Ranking DESC LIMIT 5");
        assert_eq!(
            stmt.order_by,
            Some(vec![OrderByItem {
                expr: Expr::column("Ranking"),
                order: SortOrder::Desc,
            }])
        );
        assert_eq!(stmt.limit, Some(Limit::new(0, 5)));
    }

    #[test]
    fn test_parse_limit_forms() {
        assert_eq!(select("SELECT * FROM t LIMIT 10, 5").limit, Some(Limit::new(10, 5)));
        assert_eq!(select("SELECT * FROM t LIMIT 5 OFFSET 10").limit, Some(Limit::new(10, 5)));
    }

    #[test]
    fn test_parse_aggregates_and_aliases() {
        let stmt = select("SELECT State, SUM(Population) AS total, COUNT(*) FROM states GROUP BY State");
        let Projection::Columns(items) = stmt.projection else {
            panic!("Expected column list");
        };
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].output_name(), "total");
        assert_eq!(items[2].output_name(), "COUNT(*)");
        assert_eq!(stmt.group_by, Some(vec![ColumnRef::new("State")]));
    }

    #[test]
    fn test_parse_joins() {
        let stmt = select(
            "SELECT states.State, cities.City FROM states \
             INNER JOIN cities ON states.State = cities.State \
             LEFT OUTER JOIN capitals ON capitals.State = states.State",
        );
        assert_eq!(stmt.sources.len(), 3);
        assert_eq!(stmt.sources[0], Source::table("states"));
        assert_eq!(
            stmt.sources[1],
            Source::joined(
                "cities",
                JoinType::Inner,
                Some(Expr::qualified("states", "State").equals(Expr::qualified("cities", "State")))
            )
        );
        assert_eq!(
            stmt.sources[2],
            Source::joined(
                "capitals",
                JoinType::Left,
                Some(Expr::qualified("capitals", "State").equals(Expr::qualified("states", "State")))
            )
        );
    }

    #[test]
    fn test_parse_join_without_on() {
        let stmt = select("SELECT * FROM a JOIN b");
        assert_eq!(stmt.sources, vec![Source::table("a"), Source::joined("b", JoinType::Inner, None)]);
    }

    #[test]
    fn test_comma_sources_have_no_join() {
        let stmt = select("SELECT * FROM a, b");
        assert_eq!(stmt.sources, vec![Source::table("a"), Source::table("b")]);
    }

    #[test]
    fn test_parse_insert_multiple_rows() {
        let stmt = parse_statement("INSERT INTO states (State, Ranking) VALUES ('Ohio', 7), ('Iowa', 30)").unwrap();
        assert_eq!(
            stmt,
            Statement::Insert(Insert {
                table: "states".to_string(),
                columns: vec!["State".to_string(), "Ranking".to_string()],
                rows: vec![
                    vec![Value::from("Ohio"), Value::Integer(7)],
                    vec![Value::from("Iowa"), Value::Integer(30)],
                ],
            })
        );
    }

    #[test]
    fn test_parse_update() {
        let stmt = parse_statement("UPDATE states SET Ranking = 1, Capital = NULL WHERE State = 'Ohio'").unwrap();
        let Statement::Update(update) = stmt else {
            panic!("Expected UPDATE");
        };
        assert_eq!(update.table, "states");
        assert_eq!(
            update.assignments,
            vec![("Ranking".to_string(), Value::Integer(1)), ("Capital".to_string(), Value::Null)]
        );
        assert!(update.predicate.is_some());
    }

    #[test]
    fn test_parse_delete() {
        let stmt = parse_statement("DELETE FROM states").unwrap();
        assert_eq!(
            stmt,
            Statement::Delete(Delete {
                table: "states".to_string(),
                predicate: None,
            })
        );
    }

    #[test]
    fn test_parse_ddl() {
        assert_eq!(
            parse_statement("CREATE TABLE IF NOT EXISTS users (id INTEGER, name TEXT)").unwrap(),
            Statement::CreateTable { name: "users".to_string() }
        );
        assert_eq!(
            parse_statement("DROP TABLE users").unwrap(),
            Statement::DropTable { name: "users".to_string() }
        );
    }

    #[test]
    fn test_parse_passthrough_statements() {
        let stmt = parse_statement("BEGIN TRANSACTION").unwrap();
        assert_eq!(stmt.kind(), "begin");
        assert!(matches!(stmt, Statement::Other { ref text, .. } if text == "BEGIN TRANSACTION"));
        assert_eq!(parse_statement("show tables").unwrap().kind(), "show");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_statement("SELEC * FROM t"), Err(DatabaseError::Parse(_))));
        assert!(matches!(
            parse_statement("SELECT * FROM t WHERE"),
            Err(DatabaseError::Parse(_))
        ));
    }
}
