//! Query plans and their SQL rendering.
//!
//! A [`QueryPlan`] is a backend-neutral description of one read or delete:
//! the table, AND-combined predicates, projection, ordering and paging.
//! [`PlanBuilder`] fills a plan from query-string pairs in key order.

use crate::dialect::SqliteDialect;
use crate::error::FilterError;
use crate::filter::{FilterMode, FilterParser, Parsed, PlanModifier, Predicate};
use crate::query::QueryParams;
use crate::schema::TableSchema;
use crate::value::SqlValue;

/// Page size of a read plan when `limit` is not given.
pub const DEFAULT_LIMIT: i64 = 10;
/// Page start of a read plan when `offset` is not given.
pub const DEFAULT_OFFSET: i64 = 0;

/// Order direction for sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    /// Ascending order (ASC)
    Asc,
    /// Descending order (DESC)
    Desc,
}

impl OrderDirection {
    /// Parses `asc` or `desc`, case-insensitively. Empty means ascending.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidDirection`] for anything else.
    pub fn parse(s: &str) -> Result<Self, FilterError> {
        match s.to_ascii_lowercase().as_str() {
            "" | "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(FilterError::InvalidDirection(s.to_string())),
        }
    }

    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// An ordering specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Column to order by
    pub column: String,
    /// Order direction
    pub direction: OrderDirection,
}

impl OrderBy {
    /// Creates an order specification.
    pub fn new(column: impl Into<String>, direction: OrderDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    /// Creates a new ascending order specification.
    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, OrderDirection::Asc)
    }

    /// Creates a new descending order specification.
    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, OrderDirection::Desc)
    }

    /// Returns the SQL representation.
    #[must_use]
    pub fn to_sql(&self, dialect: &SqliteDialect) -> String {
        format!(
            "{} {}",
            dialect.quote_identifier(&self.column),
            self.direction.as_sql()
        )
    }
}

/// A compiled read or delete.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// Target table.
    pub table: String,
    /// Filters, AND-combined in order.
    pub predicates: Vec<Predicate>,
    /// Selected columns; `None` selects every column.
    pub projection: Option<Vec<String>>,
    /// Ordering, most significant first.
    pub order: Vec<OrderBy>,
    /// Page size.
    pub limit: Option<i64>,
    /// Page start.
    pub offset: Option<i64>,
}

impl QueryPlan {
    /// Creates an unrestricted plan without paging.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            predicates: Vec::new(),
            projection: None,
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Creates a read plan with the default page.
    pub fn for_read(table: impl Into<String>) -> Self {
        Self::new(table)
            .limit(DEFAULT_LIMIT)
            .offset(DEFAULT_OFFSET)
    }

    /// Creates a delete plan. Delete plans are never paged.
    pub fn for_delete(table: impl Into<String>) -> Self {
        Self::new(table)
    }

    /// Adds a filter.
    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Restricts the selected columns. An empty list selects every column.
    #[must_use]
    pub fn select(self, columns: Vec<String>) -> Self {
        self.apply(PlanModifier::Select(columns))
    }

    /// Replaces the ordering.
    #[must_use]
    pub fn order_by(mut self, order: Vec<OrderBy>) -> Self {
        self.order = order;
        self
    }

    /// Sets the page size.
    #[must_use]
    pub fn limit(mut self, n: i64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Sets the page start.
    #[must_use]
    pub fn offset(mut self, n: i64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Applies a reserved-key modifier.
    #[must_use]
    pub fn apply(mut self, modifier: PlanModifier) -> Self {
        self.set(modifier);
        self
    }

    fn set(&mut self, modifier: PlanModifier) {
        match modifier {
            PlanModifier::Select(columns) => {
                self.projection = Some(columns).filter(|c| !c.is_empty());
            }
            PlanModifier::Limit(n) => self.limit = Some(n),
            PlanModifier::Offset(n) => self.offset = Some(n),
            PlanModifier::Order(order) => self.order = order,
        }
    }

    /// Builds the SELECT statement.
    #[must_use]
    pub fn build_select(&self) -> (String, Vec<SqlValue>) {
        let dialect = SqliteDialect::new();
        let mut params = Vec::new();

        let columns = match &self.projection {
            Some(cols) => dialect.quote_list(cols),
            None => String::from("*"),
        };
        let mut sql = format!(
            "SELECT {columns} FROM {}",
            dialect.quote_identifier(&self.table)
        );

        let where_clause = self.build_where_clause(&dialect, &mut params);
        if !where_clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clause);
        }

        if !self.order.is_empty() {
            let order: Vec<String> = self.order.iter().map(|o| o.to_sql(&dialect)).collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }

        // SQLite only accepts OFFSET after LIMIT; -1 means unbounded.
        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
            (None, None) => {}
        }

        (sql, params)
    }

    /// Builds the DELETE statement.
    #[must_use]
    pub fn build_delete(&self) -> (String, Vec<SqlValue>) {
        let dialect = SqliteDialect::new();
        let mut params = Vec::new();

        let mut sql = format!("DELETE FROM {}", dialect.quote_identifier(&self.table));

        let where_clause = self.build_where_clause(&dialect, &mut params);
        if !where_clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clause);
        }

        (sql, params)
    }

    fn build_where_clause(&self, dialect: &SqliteDialect, params: &mut Vec<SqlValue>) -> String {
        let mut conditions = Vec::new();
        for predicate in &self.predicates {
            let (sql, predicate_params) = predicate.to_sql(dialect);
            conditions.push(sql);
            params.extend(predicate_params);
        }
        conditions.join(" AND ")
    }
}

/// Accumulates query-string pairs into a [`QueryPlan`].
#[derive(Debug, Clone)]
pub struct PlanBuilder<'a> {
    parser: FilterParser<'a>,
    plan: QueryPlan,
}

impl<'a> PlanBuilder<'a> {
    /// Starts a read plan: reserved keys are modifiers, default paging applies.
    #[must_use]
    pub fn read(table: &'a TableSchema) -> Self {
        Self {
            parser: FilterParser::new(table, FilterMode::Read),
            plan: QueryPlan::for_read(table.name.as_str()),
        }
    }

    /// Starts a delete plan: every key is a filter, no paging.
    #[must_use]
    pub fn delete(table: &'a TableSchema) -> Self {
        Self {
            parser: FilterParser::new(table, FilterMode::Delete),
            plan: QueryPlan::for_delete(table.name.as_str()),
        }
    }

    /// Parses one pair and folds it into the plan.
    ///
    /// # Errors
    ///
    /// Returns a [`FilterError`] when the value does not follow the grammar.
    pub fn push(&mut self, key: &str, raw: &str) -> Result<(), FilterError> {
        match self.parser.parse(key, raw)? {
            Parsed::Modifier(modifier) => self.plan.set(modifier),
            Parsed::Predicate(predicate) => self.plan.predicates.push(predicate),
            Parsed::Skip => {}
        }
        Ok(())
    }

    /// Folds every pair of a query string, in order.
    ///
    /// # Errors
    ///
    /// Returns the first [`FilterError`] encountered.
    pub fn extend(mut self, query: &QueryParams) -> Result<Self, FilterError> {
        for (key, value) in query.iter() {
            self.push(key, value)?;
        }
        Ok(self)
    }

    /// Returns the finished plan.
    #[must_use]
    pub fn build(self) -> QueryPlan {
        self.plan
    }
}
