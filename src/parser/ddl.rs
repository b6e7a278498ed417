use super::common::{identifier, keyword, ws};
use super::statement::Statement;
use nom::{
    branch::alt,
    combinator::opt,
    sequence::tuple,
    IResult,
};

// Column definitions are accepted but ignored; the store is schemaless
pub fn create_table(input: &str) -> IResult<&str, Statement> {
    let (input, _) = tuple((ws(keyword("CREATE")), ws(keyword("TABLE"))))(input)?;
    let (input, _) = opt(tuple((
        ws(keyword("IF")),
        ws(keyword("NOT")),
        ws(keyword("EXISTS")),
    )))(input)?;
    let (_, name) = ws(identifier)(input)?;

    // Whatever follows the name is consumed
    Ok(("", Statement::CreateTable { name }))
}

pub fn drop_table(input: &str) -> IResult<&str, Statement> {
    let (input, _) = tuple((ws(keyword("DROP")), ws(keyword("TABLE"))))(input)?;
    let (input, _) = opt(tuple((ws(keyword("IF")), ws(keyword("EXISTS")))))(input)?;
    let (input, name) = ws(identifier)(input)?;

    Ok((input, Statement::DropTable { name }))
}

// Transaction control, SHOW, EXPLAIN, SET... are recognised and handed back untouched
pub fn other(input: &str) -> IResult<&str, Statement> {
    let text = input.trim().to_string();
    let (_, verb) = ws(alt((
        keyword("BEGIN"),
        keyword("START"),
        keyword("COMMIT"),
        keyword("ROLLBACK"),
        keyword("SHOW"),
        keyword("EXPLAIN"),
        keyword("DESCRIBE"),
        keyword("SET"),
        keyword("USE"),
        keyword("ALTER"),
        keyword("CREATE"),
        keyword("DROP"),
        keyword("TRUNCATE"),
    )))(input)?;

    Ok((
        "",
        Statement::Other {
            verb: verb.to_lowercase(),
            text,
        },
    ))
}
