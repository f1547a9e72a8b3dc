//! # Data Access Module
//!
//! Filter declarations and query building for table-backed records.
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

pub mod query_model;

pub use query_model::QueryModel;
pub use query_model::QueryModelDao;

/// Errors raised by data access objects.
#[derive(Error, Debug)]
pub enum DaoError {
    #[error("Database operation failed: {0}")]
    Database(#[from] duckdb::Error),
}

/// How a filter value is compared against a column.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FilterKind {
    /// Exact equality
    Equal,
    /// Substring match
    Like,
}

/// Declares which record properties can be filtered, and how.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterFields(BTreeMap<String, FilterKind>);

impl FilterFields {
    pub fn kind(&self, property: &str) -> Option<FilterKind> {
        self.0.get(property).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, FilterKind)> {
        self.0.iter().map(|(property, kind)| (property.as_str(), *kind))
    }
}

impl<S: Into<String>> FromIterator<(S, FilterKind)> for FilterFields {
    fn from_iter<I: IntoIterator<Item = (S, FilterKind)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(property, kind)| (property.into(), kind)).collect())
    }
}

/// A `WHERE` clause body with its positional parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterClause {
    /// Conditions joined with `AND`; empty when nothing filters
    pub sql: String,
    pub params: Vec<String>,
}

impl FilterClause {
    /// Renders ` WHERE ...`, or nothing when there are no conditions.
    pub fn to_where(&self) -> String {
        if self.sql.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.sql)
        }
    }
}

/// Builds filter conditions from property/value criteria.
///
/// Blank values are ignored, as are properties the declaration or the column
/// mapping does not know.
pub fn build_filter<F>(fields: &FilterFields, column_of: F, criteria: &BTreeMap<String, String>) -> FilterClause
where
    F: Fn(&str) -> Option<&'static str>,
{
    let mut conditions = Vec::new();
    let mut params = Vec::new();
    for (property, value) in criteria {
        if value.trim().is_empty() {
            continue;
        }
        let Some((kind, column)) = fields.kind(property).zip(column_of(property)) else {
            warn!(property = %property, "ignoring undeclared filter property");
            continue;
        };
        match kind {
            FilterKind::Equal => {
                conditions.push(format!("{column} = ?"));
                params.push(value.to_owned());
            }
            FilterKind::Like => {
                conditions.push(format!("CAST({column} AS VARCHAR) LIKE ?"));
                params.push(format!("%{value}%"));
            }
        }
    }
    FilterClause {
        sql: conditions.join(" AND "),
        params,
    }
}
