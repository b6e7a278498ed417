use super::common::{column_ref, identifier, keyword, unsigned, value, ws};
use super::statement::{
    AggregateFunction, BinaryOp, ColumnRef, Expr, JoinType, Limit, OrderByItem, Projection,
    Select, SelectItem, SortOrder, Source, Statement,
};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, one_of},
    combinator::{map, opt},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

// ( expr ) | aggregate | literal | column
fn primary(input: &str) -> IResult<&str, Expr> {
    ws(alt((
        delimited(char('('), expression, char(')')),
        aggregate,
        map(value, Expr::Literal),
        map(column_ref, Expr::Column),
    )))(input)
}

// Arithmetic is recognised so the predicate fails closed instead of failing to parse
fn arithmetic(input: &str) -> IResult<&str, Expr> {
    let (input, first) = primary(input)?;
    let (input, rest) = many0(pair(
        ws(alt((
            map(tag("||"), |s: &str| s.to_string()),
            map(one_of("+-*/%"), |c: char| c.to_string()),
        ))),
        primary,
    ))(input)?;

    Ok((
        input,
        rest.into_iter().fold(first, |left, (op, right)| {
            Expr::binary(BinaryOp::Unsupported(op), left, right)
        }),
    ))
}

fn comparison_operator(input: &str) -> IResult<&str, BinaryOp> {
    ws(alt((
        map(tag(">="), |_| BinaryOp::GtEq),
        map(tag("<="), |_| BinaryOp::LtEq),
        map(tag("<>"), |_| BinaryOp::NotEq),
        map(tag("!="), |_| BinaryOp::NotEq),
        map(tag("="), |_| BinaryOp::Eq),
        map(tag(">"), |_| BinaryOp::Gt),
        map(tag("<"), |_| BinaryOp::Lt),
        map(pair(ws(keyword("IS")), keyword("NOT")), |_| BinaryOp::IsNot),
        map(keyword("IS"), |_| BinaryOp::Is),
        map(pair(ws(keyword("NOT")), keyword("LIKE")), |_| BinaryOp::NotLike),
        map(keyword("LIKE"), |_| BinaryOp::Like),
    )))(input)
}

fn comparison(input: &str) -> IResult<&str, Expr> {
    let (input, left) = arithmetic(input)?;
    let (input, rest) = opt(pair(comparison_operator, arithmetic))(input)?;

    match rest {
        Some((op, right)) => Ok((input, Expr::binary(op, left, right))),
        None => Ok((input, left)),
    }
}

// AND binds tighter than OR; both fold left-associatively
fn conjunction(input: &str) -> IResult<&str, Expr> {
    let (input, first) = comparison(input)?;
    let (input, rest) = many0(preceded(ws(keyword("AND")), comparison))(input)?;
    Ok((input, rest.into_iter().fold(first, Expr::and)))
}

pub fn expression(input: &str) -> IResult<&str, Expr> {
    let (input, first) = conjunction(input)?;
    let (input, rest) = many0(preceded(ws(keyword("OR")), conjunction))(input)?;
    Ok((input, rest.into_iter().fold(first, Expr::or)))
}

// SUM(col), COUNT(col), COUNT(*)
fn aggregate(input: &str) -> IResult<&str, Expr> {
    let (input, func) = alt((
        map(keyword("SUM"), |_| AggregateFunction::Sum),
        map(keyword("COUNT"), |_| AggregateFunction::Count),
    ))(input)?;
    let (input, arg) = delimited(
        ws(char('(')),
        ws(alt((map(char('*'), |_| ColumnRef::new("*")), column_ref))),
        char(')'),
    )(input)?;

    Ok((input, Expr::Aggregate { func, arg }))
}

fn select_item(input: &str) -> IResult<&str, SelectItem> {
    map(
        pair(expression, opt(preceded(opt(ws(keyword("AS"))), ws(identifier)))),
        |(expr, alias)| SelectItem { expr, alias },
    )(input)
}

fn projection(input: &str) -> IResult<&str, Projection> {
    alt((
        map(ws(char('*')), |_| Projection::Wildcard),
        map(separated_list1(ws(char(',')), select_item), Projection::Columns),
    ))(input)
}

fn join_type(input: &str) -> IResult<&str, JoinType> {
    let outer = || opt(ws(keyword("OUTER")));
    let (input, join_type) = alt((
        map(ws(keyword("INNER")), |_| JoinType::Inner),
        map(pair(ws(keyword("LEFT")), outer()), |_| JoinType::Left),
        map(pair(ws(keyword("RIGHT")), outer()), |_| JoinType::Right),
        map(pair(ws(keyword("FULL")), outer()), |_| JoinType::Full),
        map(multispace_only, |_| JoinType::Inner),
    ))(input)?;
    let (input, _) = ws(keyword("JOIN"))(input)?;
    Ok((input, join_type))
}

// Bare `JOIN` defaults to INNER
fn multispace_only(input: &str) -> IResult<&str, ()> {
    map(nom::character::complete::multispace0, |_| ())(input)
}

// [INNER|LEFT|RIGHT|FULL [OUTER]] JOIN table [ON expr]
fn join_clause(input: &str) -> IResult<&str, Source> {
    map(
        tuple((
            join_type,
            ws(identifier),
            opt(preceded(ws(keyword("ON")), expression)),
        )),
        |(join, table, condition)| Source::joined(table, join, condition),
    )(input)
}

// FROM a [, b ...] [JOIN ...]*
fn sources(input: &str) -> IResult<&str, Vec<Source>> {
    let (input, _) = ws(keyword("FROM"))(input)?;
    let (input, tables) = separated_list1(ws(char(',')), ws(identifier))(input)?;
    let (input, joins) = many0(join_clause)(input)?;

    let mut sources: Vec<Source> = tables.into_iter().map(Source::table).collect();
    sources.extend(joins);
    Ok((input, sources))
}

pub fn where_clause(input: &str) -> IResult<&str, Option<Expr>> {
    opt(preceded(ws(keyword("WHERE")), expression))(input)
}

fn group_by(input: &str) -> IResult<&str, Option<Vec<ColumnRef>>> {
    opt(preceded(
        pair(ws(keyword("GROUP")), ws(keyword("BY"))),
        separated_list1(ws(char(',')), ws(column_ref)),
    ))(input)
}

fn order_by(input: &str) -> IResult<&str, Option<Vec<OrderByItem>>> {
    let item = map(
        pair(
            expression,
            opt(alt((
                map(ws(keyword("ASC")), |_| SortOrder::Asc),
                map(ws(keyword("DESC")), |_| SortOrder::Desc),
            ))),
        ),
        |(expr, order)| OrderByItem {
            expr,
            order: order.unwrap_or(SortOrder::Asc),
        },
    );

    opt(preceded(
        pair(ws(keyword("ORDER")), ws(keyword("BY"))),
        separated_list1(ws(char(',')), item),
    ))(input)
}

// LIMIT n | LIMIT offset, n | LIMIT n OFFSET offset
fn limit(input: &str) -> IResult<&str, Option<Limit>> {
    opt(map(
        tuple((
            preceded(ws(keyword("LIMIT")), ws(unsigned)),
            opt(preceded(ws(char(',')), ws(unsigned))),
            opt(preceded(ws(keyword("OFFSET")), ws(unsigned))),
        )),
        |(first, second, offset)| match (second, offset) {
            (Some(count), _) => Limit::new(first, count),
            (None, Some(offset)) => Limit::new(offset, first),
            (None, None) => Limit::new(0, first),
        },
    ))(input)
}

pub fn select(input: &str) -> IResult<&str, Statement> {
    let (input, _) = ws(keyword("SELECT"))(input)?;
    let (input, projection) = projection(input)?;
    let (input, sources) = sources(input)?;
    let (input, predicate) = where_clause(input)?;
    let (input, group_by) = group_by(input)?;
    let (input, order_by) = order_by(input)?;
    let (input, limit) = limit(input)?;

    Ok((
        input,
        Statement::Select(Select {
            sources,
            predicate,
            projection,
            group_by,
            order_by,
            limit,
        }),
    ))
}
