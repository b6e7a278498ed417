use super::common::{identifier, keyword, value, ws};
use super::queries::where_clause;
use super::statement::{Delete, Insert, Statement, Update};
use nom::{
    character::complete::char,
    multi::separated_list1,
    sequence::{delimited, pair, tuple},
    IResult,
};

// INSERT INTO t (a, b) VALUES (1, 2), (3, 4)
pub fn insert(input: &str) -> IResult<&str, Statement> {
    let (input, _) = pair(ws(keyword("INSERT")), ws(keyword("INTO")))(input)?;
    let (input, table) = ws(identifier)(input)?;
    let (input, columns) = delimited(
        ws(char('(')),
        separated_list1(ws(char(',')), ws(identifier)),
        ws(char(')')),
    )(input)?;
    let (input, _) = ws(keyword("VALUES"))(input)?;
    let (input, rows) = separated_list1(
        ws(char(',')),
        delimited(
            ws(char('(')),
            separated_list1(ws(char(',')), ws(value)),
            ws(char(')')),
        ),
    )(input)?;

    Ok((
        input,
        Statement::Insert(Insert {
            table,
            columns,
            rows,
        }),
    ))
}

pub fn update(input: &str) -> IResult<&str, Statement> {
    let (input, _) = ws(keyword("UPDATE"))(input)?;
    let (input, table) = ws(identifier)(input)?;
    let (input, _) = ws(keyword("SET"))(input)?;
    let (input, assignments) = separated_list1(
        ws(char(',')),
        tuple((ws(identifier), ws(char('=')), ws(value))),
    )(input)?;
    let assignments = assignments
        .into_iter()
        .map(|(column, _, value)| (column, value))
        .collect();
    let (input, predicate) = where_clause(input)?;

    Ok((
        input,
        Statement::Update(Update {
            table,
            assignments,
            predicate,
        }),
    ))
}

pub fn delete(input: &str) -> IResult<&str, Statement> {
    let (input, _) = pair(ws(keyword("DELETE")), ws(keyword("FROM")))(input)?;
    let (input, table) = ws(identifier)(input)?;
    let (input, predicate) = where_clause(input)?;

    Ok((input, Statement::Delete(Delete { table, predicate })))
}
