//! SQLite dialect details used when rendering statements.

/// SQLite dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns the name of the dialect.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        "sqlite"
    }

    /// Returns the identifier quote character.
    ///
    /// Backticks, unlike double quotes, are never reinterpreted by SQLite as
    /// a string literal when the identifier does not resolve, so a misspelled
    /// column always fails with "no such column".
    #[must_use]
    pub const fn identifier_quote(&self) -> char {
        '`'
    }

    /// Quotes an identifier, doubling any embedded quote character.
    #[must_use]
    pub fn quote_identifier(&self, name: &str) -> String {
        let quote = self.identifier_quote();
        let escaped = name.replace(quote, &format!("{quote}{quote}"));
        format!("{quote}{escaped}{quote}")
    }

    /// Quotes and joins a list of identifiers with `, `.
    #[must_use]
    pub fn quote_list<S: AsRef<str>>(&self, names: &[S]) -> String {
        names
            .iter()
            .map(|n| self.quote_identifier(n.as_ref()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
