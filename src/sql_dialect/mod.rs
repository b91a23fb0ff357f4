//! Backend profiles for pattern-match predicates: comparison operator per
//! case-sensitivity class, term wrapping per match mode, client-side
//! escaping/case folding, and the strategy for multi-term values.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter_spec::{CaseSensitivity, MatchMode};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DialectError {
    #[error(
        "Unknown SQL dialect `{name}` (expected one of: generic, sqlite, postgres, mysql, sqlserver, oracle)"
    )]
    Unknown { name: String },
}

/// How a collection of pattern terms becomes SQL. Both strategies are
/// logically identical: the value matches when ANY term matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiTermStrategy {
    /// One native set-membership predicate: `col LIKE ANY (ARRAY[?])`
    ArrayAny,
    /// A disjunction of per-term predicates chained through `Relation::or`
    OrChain,
}

/// The five built-in backend profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// Plain `LIKE` both ways; covers SQLite and anything unexotic
    Generic,
    Postgres,
    Mysql,
    Sqlserver,
    Oracle,
}

impl Dialect {
    /// Parse a configured dialect identifier. An unknown name fails the
    /// pipeline's construction; it is never deferred to query time.
    pub fn parse(name: &str) -> Result<Self, DialectError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "generic" | "sqlite" => Ok(Dialect::Generic),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" => Ok(Dialect::Mysql),
            "sqlserver" | "mssql" => Ok(Dialect::Sqlserver),
            "oracle" => Ok(Dialect::Oracle),
            other => Err(DialectError::Unknown {
                name: other.to_string(),
            }),
        }
    }
}

/// A backend profile. The built-in [`Dialect`] variants implement this;
/// callers with an unlisted engine can supply their own.
pub trait DialectAdapter: Send + Sync {
    /// The comparison operator for the requested sensitivity class.
    fn like_operator(&self, case: CaseSensitivity) -> &'static str;

    /// How collections of terms are expressed.
    fn multi_term_strategy(&self) -> MultiTermStrategy;

    /// Whether LIKE metacharacters in runtime terms are escaped before
    /// binding.
    fn escapes_terms(&self) -> bool;

    /// The trailing fragment declaring the escape character, when terms
    /// are escaped.
    fn escape_clause(&self) -> Option<&'static str> {
        self.escapes_terms().then_some(" ESCAPE '\\'")
    }

    /// Whether case-insensitivity is emulated by uppercasing the column
    /// and the term.
    fn uppercases(&self, case: CaseSensitivity) -> bool;

    /// Wrap one raw term into a match pattern for `mode`, applying the
    /// profile's escaping and case folding. Circumfix wildcards both
    /// sides; prefix matches column values starting with the term;
    /// suffix matches values ending with it.
    fn prepare_term(&self, term: &str, mode: MatchMode, case: CaseSensitivity) -> String {
        let escaped = if self.escapes_terms() {
            escape_like(term)
        } else {
            term.to_string()
        };
        let folded = if self.uppercases(case) {
            escaped.to_uppercase()
        } else {
            escaped
        };
        match mode {
            MatchMode::Circumfix => format!("%{}%", folded),
            MatchMode::Prefix => format!("{}%", folded),
            MatchMode::Suffix => format!("%{}", folded),
        }
    }

    /// Render the column side of the comparison, uppercased when the
    /// profile emulates case-insensitivity that way.
    fn column_expr(&self, column: &str, case: CaseSensitivity) -> String {
        if self.uppercases(case) {
            format!("UPPER({})", column)
        } else {
            column.to_string()
        }
    }
}

impl DialectAdapter for Dialect {
    fn like_operator(&self, case: CaseSensitivity) -> &'static str {
        match (self, case) {
            (Dialect::Postgres, CaseSensitivity::Insensitive) => "ILIKE",
            (Dialect::Mysql, CaseSensitivity::Sensitive) => "LIKE BINARY",
            // Generic has no insensitive operator to offer; sqlserver and
            // oracle stay on LIKE and handle sensitivity elsewhere.
            _ => "LIKE",
        }
    }

    fn multi_term_strategy(&self) -> MultiTermStrategy {
        match self {
            Dialect::Postgres => MultiTermStrategy::ArrayAny,
            _ => MultiTermStrategy::OrChain,
        }
    }

    fn escapes_terms(&self) -> bool {
        matches!(self, Dialect::Sqlserver | Dialect::Oracle)
    }

    fn uppercases(&self, case: CaseSensitivity) -> bool {
        matches!(self, Dialect::Oracle) && case == CaseSensitivity::Insensitive
    }
}

/// Escape the LIKE metacharacters `%`, `_`, `[` and `\` with a backslash.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '[' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
