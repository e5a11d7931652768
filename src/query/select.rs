//! `sea-query`-backed reference implementation of the query seams.
//!
//! [`SqlQuery`] renders the filters declared through [`RelationQuery`] into a
//! Postgres `SELECT` and runs it on an [`Executor`]; [`SqlSource`] hands the
//! resolver fresh builders for the related table and the join table. Driver
//! adapters only need to implement `Executor` for their client library and
//! `FromRow` for their models.

use std::marker::PhantomData;
use std::sync::Arc;

use log::debug;
use sea_query::{
    Condition, DynIden, Expr, ExprTrait, PostgresQueryBuilder, SelectStatement, TableName,
    TableRef, Value, Values,
};

use crate::error::QueryError;
use crate::model::ModelAccess;
use crate::query::traits::{Executor, FromRow, Hydrator, PreloadSource, RelationQuery};
use crate::relation::def::JoinTable;
use crate::relation::identity::Identity;

/// Membership predicate over one or more columns.
///
/// Single-column identities render as `col IN (...)`; composite identities
/// render as an OR of per-tuple AND-equality groups, pairing each column
/// with its tuple position.
pub(crate) fn membership_condition(columns: &Identity, tuples: &[Vec<Value>]) -> Condition {
    match columns {
        Identity::Unary(column) => {
            let values: Vec<Value> = tuples.iter().map(|tuple| tuple[0].clone()).collect();
            Condition::all().add(Expr::col(column.clone()).is_in(values))
        }
        _ => {
            let mut any = Condition::any();
            for tuple in tuples {
                let mut all = Condition::all();
                for (column, value) in columns.iter().zip(tuple.iter()) {
                    all = all.add(Expr::col(column.clone()).eq(value.clone()));
                }
                any = any.add(all);
            }
            any
        }
    }
}

/// A `SELECT` over one table, executed on a borrowed [`Executor`].
pub struct SqlQuery<'e, E: Executor, T> {
    executor: &'e E,
    stmt: SelectStatement,
    hydrators: Vec<Hydrator<T>>,
    _marker: PhantomData<T>,
}

impl<'e, E: Executor, T> SqlQuery<'e, E, T> {
    pub fn new(executor: &'e E, table: DynIden) -> Self {
        let mut stmt = SelectStatement::default();
        stmt.column(sea_query::Asterisk)
            .from(TableRef::Table(TableName(None, table), None));
        Self {
            executor,
            stmt,
            hydrators: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Render the statement for Postgres. Exposed for inspection; `find`
    /// uses the same rendering.
    pub fn build_sql(&self) -> (String, Values) {
        self.stmt.build(PostgresQueryBuilder)
    }
}

impl<'e, E, T> RelationQuery for SqlQuery<'e, E, T>
where
    E: Executor,
    T: FromRow<E::Row>,
{
    type Item = T;
    type Filter = Condition;

    fn filter_eq(mut self, column: &DynIden, value: Value) -> Self {
        self.stmt.cond_where(Expr::col(column.clone()).eq(value));
        self
    }

    fn filter_in(mut self, columns: &Identity, tuples: Vec<Vec<Value>>) -> Self {
        self.stmt.cond_where(membership_condition(columns, &tuples));
        self
    }

    fn preload(mut self, _path: &str, hydrator: &Hydrator<T>) -> Self {
        self.hydrators.push(Arc::clone(hydrator));
        self
    }

    fn find(self, inline: Vec<Condition>) -> Result<Vec<T>, QueryError> {
        let mut stmt = self.stmt;
        for condition in inline {
            stmt.cond_where(condition);
        }
        let (sql, params) = stmt.build(PostgresQueryBuilder);
        debug!("relation query: {sql}");
        let rows = self.executor.query_all(&sql, &params)?;
        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            items.push(T::from_row(row)?);
        }
        for hydrator in &self.hydrators {
            hydrator(&mut items).map_err(|err| QueryError::Nested(Box::new(err)))?;
        }
        Ok(items)
    }
}

/// [`PreloadSource`] serving one relationship from SQL tables.
///
/// `R` is the related model, `J` the join-row model (use
/// [`crate::query::traits::NoJoinRow`] when the relationship has no join
/// table).
pub struct SqlSource<'e, E, R, J> {
    executor: &'e E,
    table: DynIden,
    _marker: PhantomData<(R, J)>,
}

impl<'e, E, R, J> SqlSource<'e, E, R, J> {
    /// A source fetching related rows from `table`.
    pub fn new(executor: &'e E, table: impl Into<DynIden>) -> Self {
        Self {
            executor,
            table: table.into(),
            _marker: PhantomData,
        }
    }
}

impl<'e, E, R, J> PreloadSource for SqlSource<'e, E, R, J>
where
    E: Executor,
    R: ModelAccess + FromRow<E::Row>,
    J: ModelAccess + FromRow<E::Row>,
{
    type Related = R;
    type Query = SqlQuery<'e, E, R>;
    type JoinRow = J;
    type JoinQuery = SqlQuery<'e, E, J>;

    fn related(&self) -> Self::Query {
        SqlQuery::new(self.executor, self.table.clone())
    }

    fn join_rows(&self, join_table: &JoinTable) -> Self::JoinQuery {
        SqlQuery::new(self.executor, join_table.table.clone())
    }
}
