//! The association resolver.
//!
//! [`preload`] resolves one declared relationship for a set of already-loaded
//! owner records: it collects the owners' key tuples into an identity map,
//! issues one secondary query for the related rows (plus one join-table query
//! for many-to-many kinds), and fans the results back onto the owners through
//! the relation's slot accessor.
//!
//! # Strategy
//!
//! 1. Classify the relation's references into join-key columns, fixed
//!    filters, and the owner-side fields the identity map is keyed by.
//! 2. Many-to-many only: fetch the join rows and re-key the owner map by the
//!    join rows' related-side columns, unioning owner buckets (fan-out).
//! 3. Thread nested preloads and caller conditions onto the relation query,
//!    constrain it with an IN predicate over the collected key tuples, fetch.
//! 4. Reset the relationship field on every owner, then assign each result
//!    row to every owner in its identity-map bucket, in result-set order.
//!
//! An owner set without key values resolves successfully without touching
//! the store; a fetched row without an identity-map match is a fatal
//! integrity error. The asymmetry is deliberate: "nothing to join" is a
//! normal outcome, a dangling foreign key is corrupt data.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use sea_query::{DynIden, Value};

use crate::error::{FieldError, PreloadError};
use crate::key::{distinct_value_tuples, value_tuple, TupleKey};
use crate::model::ModelAccess;
use crate::query::traits::{Hydrator, PreloadSource, RelationQuery};
use crate::relation::def::{Reference, Relation};
use crate::relation::identity::Identity;

/// The owner result set a resolution decorates: a single instance or a
/// sequence of instances. Every element gets its relationship field reset
/// and repopulated.
#[derive(Debug)]
pub enum Owners<'a, O> {
    Instance(&'a mut O),
    Sequence(&'a mut [O]),
}

impl<'a, O> Owners<'a, O> {
    pub fn len(&self) -> usize {
        match self {
            Self::Instance(_) => 1,
            Self::Sequence(owners) => owners.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn iter(&self) -> std::slice::Iter<'_, O> {
        match self {
            Self::Instance(owner) => std::slice::from_ref(&**owner).iter(),
            Self::Sequence(owners) => owners.iter(),
        }
    }

    fn get_mut(&mut self, index: usize) -> &mut O {
        match self {
            Self::Instance(owner) => {
                debug_assert_eq!(index, 0);
                owner
            }
            Self::Sequence(owners) => &mut owners[index],
        }
    }
}

/// One caller-supplied condition on the relation query: either an inline
/// positional filter handed to `find`, or a callback applied to the builder.
pub enum Scope<Q: RelationQuery> {
    Filter(Q::Filter),
    Apply(Box<dyn FnOnce(Q) -> Q>),
}

impl<Q: RelationQuery> Scope<Q> {
    pub fn filter(filter: Q::Filter) -> Self {
        Self::Filter(filter)
    }

    pub fn apply(f: impl FnOnce(Q) -> Q + 'static) -> Self {
        Self::Apply(Box::new(f))
    }
}

/// Resolve one relationship onto `owners`.
///
/// `conds` are extra constraints on the relation query. `nested` maps
/// nested-preload paths to hydrators which the query implementation runs
/// over the related rows before they are assigned, so they arrive with their
/// own associations populated (recursive fan-out; callers must avoid preload
/// cycles).
///
/// Field-assignment failures are collected and reported together after the
/// pass completes; query failures and identity-map misses abort immediately.
pub fn preload<O, S>(
    mut owners: Owners<'_, O>,
    rel: &Relation<O, S::Related>,
    source: &S,
    conds: Vec<Scope<S::Query>>,
    nested: &BTreeMap<String, Hydrator<S::Related>>,
) -> Result<(), PreloadError>
where
    O: ModelAccess,
    S: PreloadSource,
    S::Related: ModelAccess,
{
    // Reference classification, in declaration order.
    let mut rel_key_columns: Vec<DynIden> = Vec::new(); // IN-matched on the relation query
    let mut rel_key_fields: Vec<DynIden> = Vec::new(); // read back from result rows
    let mut owner_key_fields: Vec<DynIden> = Vec::new(); // read from the owner set
    let mut fixed_filters: Vec<(DynIden, Value)> = Vec::new();

    let identity_map: HashMap<TupleKey, Vec<usize>>;
    let join_tuples: Vec<Vec<Value>>;

    if let Some(join_table) = &rel.join_table {
        // Under a join table both foreign-key sides live on the join rows.
        let mut join_owner_columns: Vec<DynIden> = Vec::new();
        let mut join_rel_fields: Vec<DynIden> = Vec::new();

        for reference in &rel.references {
            match reference {
                Reference::OwnerKeyed {
                    primary_key,
                    foreign_key,
                } => {
                    join_owner_columns.push(foreign_key.clone());
                    owner_key_fields.push(primary_key.clone());
                }
                Reference::Fixed { column, value } => {
                    fixed_filters.push((column.clone(), value.clone()));
                }
                Reference::RelatedKeyed {
                    foreign_key,
                    primary_key,
                } => {
                    join_rel_fields.push(foreign_key.clone());
                    rel_key_columns.push(primary_key.clone());
                    rel_key_fields.push(primary_key.clone());
                }
            }
        }

        let (owner_map, owner_tuples) = owner_identity_map(&owners, &owner_key_fields);
        if owner_tuples.is_empty() {
            debug!("preload: owner set has no join key values, nothing to resolve");
            return Ok(());
        }

        let mut join_query = source.join_rows(join_table);
        for (column, value) in &fixed_filters {
            join_query = join_query.filter_eq(column, value.clone());
        }
        join_query = join_query.filter_in(
            &Identity::from_columns(join_owner_columns.clone()),
            owner_tuples,
        );
        let join_rows = join_query.find(Vec::new()).map_err(PreloadError::Query)?;

        // Re-key the owner map by the join rows' related-side columns. One
        // related tuple collects every owner bucket reached through any join
        // row sharing it; join rows with dangling owner keys bridge nothing
        // but still contribute their related tuple to the query below.
        let mut bridged: HashMap<TupleKey, Vec<usize>> = HashMap::new();
        for row in &join_rows {
            let Some(owner_key) = TupleKey::of(row, &join_owner_columns) else {
                continue;
            };
            let Some(bucket) = owner_map.get(&owner_key) else {
                continue;
            };
            if let Some(related_key) = TupleKey::of(row, &join_rel_fields) {
                bridged
                    .entry(related_key)
                    .or_default()
                    .extend_from_slice(bucket);
            }
        }
        identity_map = bridged;
        join_tuples = distinct_value_tuples(&join_rows, &join_rel_fields);
    } else {
        for reference in &rel.references {
            match reference {
                Reference::OwnerKeyed {
                    primary_key,
                    foreign_key,
                } => {
                    rel_key_columns.push(foreign_key.clone());
                    rel_key_fields.push(foreign_key.clone());
                    owner_key_fields.push(primary_key.clone());
                }
                Reference::Fixed { column, value } => {
                    fixed_filters.push((column.clone(), value.clone()));
                }
                Reference::RelatedKeyed {
                    foreign_key,
                    primary_key,
                } => {
                    rel_key_columns.push(primary_key.clone());
                    rel_key_fields.push(primary_key.clone());
                    owner_key_fields.push(foreign_key.clone());
                }
            }
        }

        let (map, tuples) = owner_identity_map(&owners, &owner_key_fields);
        if tuples.is_empty() {
            debug!("preload: owner set has no key values, nothing to resolve");
            return Ok(());
        }
        identity_map = map;
        join_tuples = tuples;
    }

    let mut query = source.related();
    for (path, hydrator) in nested {
        query = query.preload(path, hydrator);
    }
    for (column, value) in &fixed_filters {
        query = query.filter_eq(column, value.clone());
    }

    let related = if join_tuples.is_empty() {
        // Nothing to match (e.g. a join table with no rows for these
        // owners): skip the query, the relationship fields still get reset.
        debug!("preload: no join values, skipping the relation query");
        Vec::new()
    } else {
        let mut inline = Vec::new();
        for cond in conds {
            match cond {
                Scope::Apply(apply) => query = apply(query),
                Scope::Filter(filter) => inline.push(filter),
            }
        }
        query = query.filter_in(&Identity::from_columns(rel_key_columns), join_tuples);
        query.find(inline).map_err(PreloadError::Query)?
    };

    let mut field_errors: Vec<FieldError> = Vec::new();

    // Reset stale relationship values before assigning the fresh result set,
    // so owners reused across resolutions never keep a previous pass's rows.
    for index in 0..owners.len() {
        if let Err(err) = rel.slot().clear(owners.get_mut(index)) {
            field_errors.push(err);
        }
    }

    for row in related {
        let bucket = TupleKey::of(&row, &rel_key_fields)
            .and_then(|key| identity_map.get(&key))
            .ok_or_else(|| PreloadError::integrity(&row))?;
        for &index in bucket {
            if let Err(err) = rel.slot().place(owners.get_mut(index), row.clone()) {
                field_errors.push(err);
            }
        }
    }

    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(PreloadError::Assignment(field_errors))
    }
}

/// Identity map over the owner set, keyed by `fields`, together with the
/// distinct key-value tuples in first-seen order. Owners with missing or
/// NULL key fields are left out.
fn owner_identity_map<O: ModelAccess>(
    owners: &Owners<'_, O>,
    fields: &[DynIden],
) -> (HashMap<TupleKey, Vec<usize>>, Vec<Vec<Value>>) {
    let mut map: HashMap<TupleKey, Vec<usize>> = HashMap::new();
    let mut tuples = Vec::new();
    if fields.is_empty() {
        return (map, tuples);
    }
    for (index, owner) in owners.iter().enumerate() {
        if let Some((key, values)) = value_tuple(owner, fields) {
            let bucket = map.entry(key).or_default();
            if bucket.is_empty() {
                tuples.push(values);
            }
            bucket.push(index);
        }
    }
    (map, tuples)
}
