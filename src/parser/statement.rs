use crate::types::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(Select),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
    CreateTable {
        name: String,
    },
    DropTable {
        name: String,
    },
    /// Recognised verb the engine does not execute (BEGIN, SHOW, ...)
    Other {
        verb: String,
        text: String,
    },
}

impl Statement {
    pub fn kind(&self) -> &str {
        match self {
            Self::Select(_) => "select",
            Self::Insert(_) => "insert",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
            Self::CreateTable { .. } => "create",
            Self::DropTable { .. } => "drop",
            Self::Other { verb, .. } => verb.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub sources: Vec<Source>,
    pub predicate: Option<Expr>,
    pub projection: Projection,
    pub group_by: Option<Vec<ColumnRef>>,
    pub order_by: Option<Vec<OrderByItem>>,
    pub limit: Option<Limit>,
}

impl Select {
    /// `SELECT * FROM table` with no clauses
    pub fn all_from(table: impl Into<String>) -> Self {
        Self {
            sources: vec![Source::table(table)],
            predicate: None,
            projection: Projection::Wildcard,
            group_by: None,
            order_by: None,
            limit: None,
        }
    }
}

/// One entry of the FROM/JOIN chain
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub table: String,
    pub join: Option<JoinType>,
    pub condition: Option<Expr>,
}

impl Source {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            join: None,
            condition: None,
        }
    }

    /// A JOIN entry; `condition` is `None` for a join written without ON
    pub fn joined(table: impl Into<String>, join: JoinType, condition: Option<Expr>) -> Self {
        Self {
            table: table.into(),
            join: Some(join),
            condition,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    /// Unmatched rows of the accumulated (left) side are kept
    pub const fn keeps_left(self) -> bool {
        matches!(self, Self::Left | Self::Full)
    }

    /// Unmatched rows of the joined (right) side are kept
    pub const fn keeps_right(self) -> bool {
        matches!(self, Self::Right | Self::Full)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Wildcard,
    Columns(Vec<SelectItem>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectItem {
    pub fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    pub fn aliased(expr: Expr, alias: impl Into<String>) -> Self {
        Self {
            expr,
            alias: Some(alias.into()),
        }
    }

    /// Key the projected value is stored under
    pub fn output_name(&self) -> String {
        self.alias.clone().unwrap_or_else(|| self.expr.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub column: String,
}

impl ColumnRef {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            table: None,
            column: column.into(),
        }
    }

    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            column: column.into(),
        }
    }

    /// Key of this column in a row; joined rows use `table.column`
    pub fn key(&self, namespaced: bool) -> String {
        match (&self.table, namespaced) {
            (Some(table), true) => format!("{table}.{}", self.column),
            _ => self.column.clone(),
        }
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{table}.{}", self.column),
            None => write!(f, "{}", self.column),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(ColumnRef),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Aggregate {
        func: AggregateFunction,
        arg: ColumnRef,
    },
    Literal(Value),
}

impl Expr {
    pub fn column(column: impl Into<String>) -> Self {
        Self::Column(ColumnRef::new(column))
    }

    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::Column(ColumnRef::qualified(table, column))
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    pub fn binary(op: BinaryOp, left: Self, right: Self) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(self, other: Self) -> Self {
        Self::binary(BinaryOp::And, self, other)
    }

    pub fn or(self, other: Self) -> Self {
        Self::binary(BinaryOp::Or, self, other)
    }

    pub fn equals(self, other: Self) -> Self {
        Self::binary(BinaryOp::Eq, self, other)
    }

    pub const fn is_aggregate(&self) -> bool {
        matches!(self, Self::Aggregate { .. })
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Column(column) => write!(f, "{column}"),
            Self::Binary { op, left, right } => write!(f, "{left} {op} {right}"),
            Self::Aggregate { func, arg } => write!(f, "{func}({arg})"),
            Self::Literal(value) => write!(f, "{}", value.to_sql()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Is,
    IsNot,
    And,
    Or,
    Like,
    NotLike,
    /// Parsed but never evaluated; predicates using it fail closed
    Unsupported(String),
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Is => "IS",
            Self::IsNot => "IS NOT",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::Unsupported(op) => op,
        };
        write!(f, "{symbol}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Sum,
    Count,
}

impl std::fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sum => write!(f, "SUM"),
            Self::Count => write!(f, "COUNT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expr: Expr,
    pub order: SortOrder,
}

/// LIMIT as handed over by the parser; both parts are required at execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub offset: Option<usize>,
    pub count: Option<usize>,
}

impl Limit {
    pub const fn new(offset: usize, count: usize) -> Self {
        Self {
            offset: Some(offset),
            count: Some(count),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: String,
    pub assignments: Vec<(String, Value)>,
    pub predicate: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: String,
    pub predicate: Option<Expr>,
}
