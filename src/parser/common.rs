use crate::types::Value;
use super::statement::ColumnRef;
use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while, take_while1},
    character::complete::{alpha1, char, digit1, multispace0, none_of, satisfy},
    combinator::{map, map_res, not, opt, recognize, verify},
    multi::many0,
    sequence::{delimited, pair, terminated, tuple},
    IResult,
};

/// Words that never parse as bare identifiers
const RESERVED: &[&str] = &[
    "SELECT", "FROM", "WHERE", "JOIN", "INNER", "LEFT", "RIGHT", "FULL", "OUTER", "ON", "GROUP",
    "ORDER", "BY", "LIMIT", "OFFSET", "AS", "AND", "OR", "NOT", "LIKE", "IS", "NULL", "TRUE",
    "FALSE", "ASC", "DESC", "VALUES", "SET", "INTO",
];

pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Case-insensitive keyword that must end on a word boundary (`OR` != `ORDER`)
pub fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag_no_case(word), not(satisfy(is_identifier_char)))
}

fn bare_identifier(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            alt((alpha1, tag("_"))),
            take_while(is_identifier_char),
        )),
        |s: &str| s.to_string(),
    )(input)
}

// `quoted name` for keys with spaces or reserved words
fn quoted_identifier(input: &str) -> IResult<&str, String> {
    map(
        delimited(char('`'), take_while1(|c| c != '`'), char('`')),
        |s: &str| s.to_string(),
    )(input)
}

pub fn identifier(input: &str) -> IResult<&str, String> {
    alt((
        quoted_identifier,
        verify(bare_identifier, |s: &String| {
            let upper = s.to_uppercase();
            !RESERVED.contains(&upper.as_str())
        }),
    ))(input)
}

/// `column` or `table.column`
pub fn column_ref(input: &str) -> IResult<&str, ColumnRef> {
    map(
        pair(identifier, opt(nom::sequence::preceded(char('.'), identifier))),
        |(first, second)| match second {
            Some(column) => ColumnRef::qualified(first, column),
            None => ColumnRef::new(first),
        },
    )(input)
}

/// Single-quoted string; `''` inside the quotes is an escaped quote
pub fn string_literal(input: &str) -> IResult<&str, String> {
    alt((
        quoted_with('\''),
        quoted_with('"'),
    ))(input)
}

fn quoted_with<'a>(quote: char) -> impl FnMut(&'a str) -> IResult<&'a str, String> {
    let doubled: &'static str = if quote == '\'' { "''" } else { "\"\"" };
    let stop: &'static str = if quote == '\'' { "'" } else { "\"" };
    map(
        delimited(
            char(quote),
            many0(alt((map(tag(doubled), move |_| quote), none_of(stop)))),
            char(quote),
        ),
        |chars: Vec<char>| chars.into_iter().collect(),
    )
}

pub fn number(input: &str) -> IResult<&str, Value> {
    alt((
        map_res(
            recognize(tuple((opt(char('-')), digit1, char('.'), digit1))),
            |s: &str| s.parse::<f64>().map(Value::Real),
        ),
        map_res(
            recognize(pair(opt(char('-')), digit1)),
            |s: &str| s.parse::<i64>().map(Value::Integer),
        ),
    ))(input)
}

pub fn unsigned(input: &str) -> IResult<&str, usize> {
    map_res(digit1, |s: &str| s.parse::<usize>())(input)
}

pub fn value(input: &str) -> IResult<&str, Value> {
    alt((
        map(keyword("NULL"), |_| Value::Null),
        map(keyword("TRUE"), |_| Value::Boolean(true)),
        map(keyword("FALSE"), |_| Value::Boolean(false)),
        map(string_literal, Value::Text),
        number,
    ))(input)
}
