//! Filter token parsing.
//!
//! Each query-string `key=value` pair is turned into either a plan modifier
//! (`select`, `limit`, `offset`, `order`), a typed [`Predicate`], or
//! [`Parsed::Skip`]. Values take the form `[operator.]literal`:
//!
//! ```text
//! name=Canada                 name = 'Canada'
//! population=gte.1000000      population >= '1000000'
//! name=like.%22united*%22     name LIKE 'united%'
//! iso=in.(%22CAN%22,%22USA%22) iso IN ('CAN', 'USA')
//! deleted_at=is.null          deleted_at IS NULL
//! ```
//!
//! Predicates never check that their column exists. An unknown column is
//! reported by the store when the plan runs.

use std::fmt;

use serde_json::Value as JsonValue;

use crate::decode::percent_decode;
use crate::dialect::SqliteDialect;
use crate::error::FilterError;
use crate::plan::{OrderBy, OrderDirection};
use crate::schema::TableSchema;
use crate::value::{SqlValue, ValueKind};

/// Reserved key: projection list.
pub const SELECT_KEY: &str = "select";
/// Reserved key: page size.
pub const LIMIT_KEY: &str = "limit";
/// Reserved key: page start.
pub const OFFSET_KEY: &str = "offset";
/// Reserved key: ordering.
pub const ORDER_KEY: &str = "order";
/// Reserved key for creates: column projection of the payload.
pub const COLUMNS_KEY: &str = "columns";

/// Keys that are plan modifiers rather than predicates in read plans.
pub const RESERVED_KEYS: [&str; 4] = [SELECT_KEY, LIMIT_KEY, OFFSET_KEY, ORDER_KEY];

/// Comparison operators of the filter grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Equal (=)
    Eq,
    /// Not equal (!=)
    Neq,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Gte,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Lte,
    /// Pattern match (LIKE)
    Like,
    /// Set membership (IN)
    In,
    /// Identity (IS), used for null and booleans
    Is,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::Neq => write!(f, "!="),
            Self::Gt => write!(f, ">"),
            Self::Gte => write!(f, ">="),
            Self::Lt => write!(f, "<"),
            Self::Lte => write!(f, "<="),
            Self::Like => write!(f, "LIKE"),
            Self::In => write!(f, "IN"),
            Self::Is => write!(f, "IS"),
        }
    }
}

/// Operator tokens, in detection order.
enum Token {
    Compare(Operator),
    Or,
}

static OPERATOR_TOKENS: [(&str, Token); 10] = [
    ("eq.", Token::Compare(Operator::Eq)),
    ("neq.", Token::Compare(Operator::Neq)),
    ("gt.", Token::Compare(Operator::Gt)),
    ("gte.", Token::Compare(Operator::Gte)),
    ("lt.", Token::Compare(Operator::Lt)),
    ("lte.", Token::Compare(Operator::Lte)),
    ("like.", Token::Compare(Operator::Like)),
    ("in.", Token::Compare(Operator::In)),
    ("is.", Token::Compare(Operator::Is)),
    ("or.", Token::Or),
];

/// Splits a raw value into its operator token and the remaining literal.
fn split_operator(raw: &str) -> Option<(&'static Token, &str)> {
    OPERATOR_TOKENS
        .iter()
        .find_map(|(prefix, token)| raw.strip_prefix(prefix).map(|rest| (token, rest)))
}

/// The value side of a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateValue {
    /// A single literal.
    Scalar(SqlValue),
    /// The elements of an `in.` list.
    List(Vec<SqlValue>),
}

/// A typed, column-scoped filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Column the filter applies to.
    pub column: String,
    /// Comparison operator.
    pub operator: Operator,
    /// Literal(s) to compare against.
    pub value: PredicateValue,
}

impl Predicate {
    /// Creates a predicate with a scalar value.
    pub fn scalar(column: impl Into<String>, operator: Operator, value: SqlValue) -> Self {
        Self {
            column: column.into(),
            operator,
            value: PredicateValue::Scalar(value),
        }
    }

    /// Creates an `IN` predicate.
    pub fn list(column: impl Into<String>, values: Vec<SqlValue>) -> Self {
        Self {
            column: column.into(),
            operator: Operator::In,
            value: PredicateValue::List(values),
        }
    }

    /// Returns the grammar-level kind of the value.
    #[must_use]
    pub const fn value_kind(&self) -> ValueKind {
        match &self.value {
            PredicateValue::Scalar(v) => v.kind(),
            PredicateValue::List(_) => ValueKind::List,
        }
    }

    /// Renders the predicate as a SQL fragment with its bound parameters.
    #[must_use]
    pub fn to_sql(&self, dialect: &SqliteDialect) -> (String, Vec<SqlValue>) {
        let column = dialect.quote_identifier(&self.column);
        match &self.value {
            PredicateValue::List(values) => {
                let placeholders: Vec<&str> =
                    values.iter().map(|_| SqlValue::placeholder()).collect();
                (
                    format!("{column} IN ({})", placeholders.join(", ")),
                    values.clone(),
                )
            }
            PredicateValue::Scalar(value) => {
                (format!("{column} {} ?", self.operator), vec![value.clone()])
            }
        }
    }
}

/// A reserved-key instruction for the plan builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanModifier {
    /// Restrict the result to these columns.
    Select(Vec<String>),
    /// Page size.
    Limit(i64),
    /// Page start.
    Offset(i64),
    /// Ordering, most significant first.
    Order(Vec<OrderBy>),
}

/// Outcome of parsing one query-string pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    /// A reserved key.
    Modifier(PlanModifier),
    /// A filter.
    Predicate(Predicate),
    /// The pair does not contribute to the plan.
    Skip,
}

/// Which plan a pair is parsed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Reserved keys are modifiers; filters on binary columns are dropped.
    Read,
    /// Every key is a filter.
    Delete,
}

/// Parses query-string pairs against one table.
#[derive(Debug, Clone, Copy)]
pub struct FilterParser<'a> {
    table: &'a TableSchema,
    mode: FilterMode,
}

impl<'a> FilterParser<'a> {
    /// Creates a parser for the given table and plan kind.
    #[must_use]
    pub const fn new(table: &'a TableSchema, mode: FilterMode) -> Self {
        Self { table, mode }
    }

    /// Parses one `key=value` pair.
    ///
    /// # Errors
    ///
    /// Returns a [`FilterError`] when the value does not follow the grammar.
    pub fn parse(&self, key: &str, raw: &str) -> Result<Parsed, FilterError> {
        if self.mode == FilterMode::Read {
            if RESERVED_KEYS.contains(&key) {
                return parse_modifier(key, raw).map(Parsed::Modifier);
            }
            if self.table.is_blob_column(key) {
                return Ok(Parsed::Skip);
            }
        }
        parse_predicate(key, raw).map(Parsed::Predicate)
    }
}

fn parse_modifier(key: &str, raw: &str) -> Result<PlanModifier, FilterError> {
    match key {
        SELECT_KEY => Ok(PlanModifier::Select(split_list(raw))),
        LIMIT_KEY => parse_integer(key, raw).map(PlanModifier::Limit),
        OFFSET_KEY => parse_integer(key, raw).map(PlanModifier::Offset),
        _ => parse_order(raw).map(PlanModifier::Order),
    }
}

/// Splits a comma-separated list, dropping empty entries.
#[must_use]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_integer(key: &str, raw: &str) -> Result<i64, FilterError> {
    raw.trim()
        .parse()
        .map_err(|_| FilterError::InvalidInteger {
            key: key.to_string(),
            value: raw.to_string(),
        })
}

fn parse_order(raw: &str) -> Result<Vec<OrderBy>, FilterError> {
    split_list(raw)
        .into_iter()
        .map(|entry| match entry.split_once('.') {
            None => Ok(OrderBy::asc(entry)),
            Some((column, direction)) => {
                let direction = OrderDirection::parse(direction)?;
                Ok(OrderBy::new(column, direction))
            }
        })
        .collect()
}

fn parse_predicate(key: &str, raw: &str) -> Result<Predicate, FilterError> {
    let Some((token, rest)) = split_operator(raw) else {
        return Ok(Predicate::scalar(key, Operator::Eq, text(raw)));
    };

    match token {
        Token::Or => Err(FilterError::UnsupportedOr),
        Token::Compare(Operator::Like) => {
            let pattern = percent_decode(rest).replace('*', "%").replace('"', "");
            Ok(Predicate::scalar(key, Operator::Like, text(&pattern)))
        }
        Token::Compare(Operator::In) => parse_in_list(rest).map(|values| Predicate::list(key, values)),
        Token::Compare(Operator::Is) => Ok(Predicate::scalar(key, Operator::Is, parse_is(rest))),
        Token::Compare(op) => Ok(Predicate::scalar(key, *op, text(rest))),
    }
}

fn text(s: &str) -> SqlValue {
    SqlValue::Text(s.to_string())
}

fn parse_is(rest: &str) -> SqlValue {
    match rest.to_ascii_lowercase().as_str() {
        "null" => SqlValue::Null,
        "true" => SqlValue::Bool(true),
        "false" => SqlValue::Bool(false),
        _ => text(rest),
    }
}

/// Parses `(v1,v2,...)` where each element is a JSON literal.
fn parse_in_list(rest: &str) -> Result<Vec<SqlValue>, FilterError> {
    let decoded = percent_decode(rest);
    let inner = decoded
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| FilterError::MalformedList(format!("expected (...), got {decoded}")))?;

    let elements: Vec<JsonValue> = serde_json::from_str(&format!("[{inner}]"))
        .map_err(|e| FilterError::MalformedList(e.to_string()))?;

    elements
        .iter()
        .map(|element| match element {
            JsonValue::Array(_) | JsonValue::Object(_) => Err(FilterError::MalformedList(
                format!("nested value {element} is not allowed"),
            )),
            scalar => Ok(SqlValue::from_json(scalar)),
        })
        .collect()
}
