//! Collaborator seams between the resolver and the embedding ORM.
//!
//! The resolver drives queries through [`RelationQuery`] and obtains fresh
//! builders through [`PreloadSource`]. It never sees SQL: the query builder
//! and SQL generation layer live behind these traits, so an in-memory store
//! is as valid an implementation as the shipped `sea-query` one.

use std::sync::Arc;

use sea_query::{DynIden, Value, Values};

use crate::error::{PreloadError, QueryError};
use crate::model::ModelAccess;
use crate::relation::def::JoinTable;
use crate::relation::identity::Identity;

/// Opaque nested-preload payload.
///
/// A hydrator runs over the materialized related rows before `find` returns
/// them, so they arrive with their own associations already populated. The
/// usual implementation captures a nested relation plus its source and calls
/// [`crate::relation::eager::preload`] recursively.
pub type Hydrator<T> = Arc<dyn Fn(&mut Vec<T>) -> Result<(), PreloadError>>;

/// A composable query over one entity or join table.
///
/// Implementations must support equality filters, set-membership predicates
/// over one or more columns paired positionally with value tuples, chainable
/// nested-preload declarations, and materialization of the result set.
pub trait RelationQuery: Sized {
    /// The materialized row type.
    type Item;
    /// Inline positional filter arguments accepted by [`Self::find`].
    type Filter;

    /// Constrain `column = value`.
    fn filter_eq(self, column: &DynIden, value: Value) -> Self;

    /// Constrain `columns` to the given value tuples (an IN predicate; each
    /// tuple pairs positionally with the identity's columns).
    fn filter_in(self, columns: &Identity, tuples: Vec<Vec<Value>>) -> Self;

    /// Chain a nested preload under `path` onto this query.
    fn preload(self, path: &str, hydrator: &Hydrator<Self::Item>) -> Self;

    /// Execute and materialize, applying `inline` filters positionally.
    fn find(self, inline: Vec<Self::Filter>) -> Result<Vec<Self::Item>, QueryError>;
}

/// Hands the resolver fresh query builders for one relationship.
pub trait PreloadSource {
    /// The related entity type resolved by this source.
    type Related;
    type Query: RelationQuery<Item = Self::Related>;
    /// Row type of the join table, for many-to-many relationships.
    type JoinRow: ModelAccess;
    type JoinQuery: RelationQuery<Item = Self::JoinRow>;

    /// A fresh query over the related entity's table.
    fn related(&self) -> Self::Query;

    /// A fresh query over the given join table.
    fn join_rows(&self, join_table: &JoinTable) -> Self::JoinQuery;
}

/// Executes rendered SQL against a store, yielding backend rows.
///
/// The row type is abstract: a driver adapter exposes whatever its client
/// library returns and pairs it with [`FromRow`] implementations.
pub trait Executor {
    type Row;

    /// Run a query and return every row.
    fn query_all(&self, sql: &str, params: &Values) -> Result<Vec<Self::Row>, QueryError>;
}

/// Materializes a model from one backend row.
pub trait FromRow<Row>: Sized {
    fn from_row(row: &Row) -> Result<Self, QueryError>;
}

/// Join-row placeholder for sources that only serve simple relationships.
///
/// `PreloadSource` implementations must name some join-row type even when no
/// relationship they serve uses a join table; this one carries no columns.
#[derive(Debug, Clone)]
pub struct NoJoinRow;

impl ModelAccess for NoJoinRow {
    fn value_of(&self, _column: &DynIden) -> Option<Value> {
        None
    }
}

impl<Row> FromRow<Row> for NoJoinRow {
    fn from_row(_row: &Row) -> Result<Self, QueryError> {
        Ok(NoJoinRow)
    }
}
