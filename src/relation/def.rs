//! Relationship descriptors.
//!
//! A [`Relation`] describes one association between an owner type `O` and a
//! related type `R`: its kind, the column pairings that join the two sides,
//! the join table for many-to-many kinds, and the accessor used to write the
//! resolved rows back onto owner instances.
//!
//! Accessors are resolved once, when the descriptor is built, so the per-row
//! assignment loop dispatches through a plain enum instead of inspecting the
//! owner type repeatedly.

use std::fmt;
use std::sync::Arc;

use sea_query::{DynIden, Value};

use crate::error::FieldError;

/// The four association kinds the resolver understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// The owner holds the foreign key of a single related row.
    BelongsTo,
    /// A single related row holds the owner's key.
    HasOne,
    /// Many related rows hold the owner's key.
    HasMany,
    /// Owner and related rows are linked through a join table.
    ManyToMany,
}

impl RelationKind {
    /// Whether the relationship field holds a collection.
    pub fn is_collection(self) -> bool {
        matches!(self, Self::HasMany | Self::ManyToMany)
    }
}

/// One column-pairing rule within a relationship.
///
/// References are classified by direction, not by relationship kind: the
/// same `OwnerKeyed`/`RelatedKeyed` split covers both has-many (owner key on
/// the related side) and belongs-to (foreign key on the owner side). Under a
/// join table, the foreign-key columns of both variants live on the join
/// table instead.
#[derive(Debug, Clone)]
pub enum Reference {
    /// The owner's primary-key column joins `foreign_key` on the related
    /// side (or on the join table).
    OwnerKeyed {
        primary_key: DynIden,
        foreign_key: DynIden,
    },
    /// The related side's `primary_key` column joins `foreign_key` on the
    /// owner (or, under a join table, on the join table).
    RelatedKeyed {
        foreign_key: DynIden,
        primary_key: DynIden,
    },
    /// A constant equality filter on the relation query; not a join column.
    Fixed { column: DynIden, value: Value },
}

impl Reference {
    pub fn owner_keyed(primary_key: impl Into<DynIden>, foreign_key: impl Into<DynIden>) -> Self {
        Self::OwnerKeyed {
            primary_key: primary_key.into(),
            foreign_key: foreign_key.into(),
        }
    }

    pub fn related_keyed(foreign_key: impl Into<DynIden>, primary_key: impl Into<DynIden>) -> Self {
        Self::RelatedKeyed {
            foreign_key: foreign_key.into(),
            primary_key: primary_key.into(),
        }
    }

    pub fn fixed(column: impl Into<DynIden>, value: impl Into<Value>) -> Self {
        Self::Fixed {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// The intermediate table of a many-to-many relationship.
#[derive(Debug, Clone)]
pub struct JoinTable {
    pub table: DynIden,
}

impl JoinTable {
    pub fn new(table: impl Into<DynIden>) -> Self {
        Self {
            table: table.into(),
        }
    }
}

type ClearFn<O> = Arc<dyn Fn(&mut O) -> Result<(), FieldError> + Send + Sync>;
type PlaceFn<O, R> = Arc<dyn Fn(&mut O, R) -> Result<(), FieldError> + Send + Sync>;

/// The relationship-field accessor: how resolved rows land on an owner.
///
/// `Single` overwrites the field; `Collection` appends to it. `clear` resets
/// the field to its zero value (`None`) or to a fresh empty collection
/// before a resolution assigns anything.
pub enum RelationSlot<O, R> {
    Single {
        clear: ClearFn<O>,
        assign: PlaceFn<O, R>,
    },
    Collection {
        clear: ClearFn<O>,
        append: PlaceFn<O, R>,
    },
}

impl<O, R> RelationSlot<O, R> {
    /// A single-valued slot from custom, fallible closures.
    pub fn single(
        clear: impl Fn(&mut O) -> Result<(), FieldError> + Send + Sync + 'static,
        assign: impl Fn(&mut O, R) -> Result<(), FieldError> + Send + Sync + 'static,
    ) -> Self {
        Self::Single {
            clear: Arc::new(clear),
            assign: Arc::new(assign),
        }
    }

    /// A collection slot from custom, fallible closures.
    pub fn collection(
        clear: impl Fn(&mut O) -> Result<(), FieldError> + Send + Sync + 'static,
        append: impl Fn(&mut O, R) -> Result<(), FieldError> + Send + Sync + 'static,
    ) -> Self {
        Self::Collection {
            clear: Arc::new(clear),
            append: Arc::new(append),
        }
    }

    /// A single-valued slot over an `Option<R>` field.
    pub fn option_field(
        field: impl Fn(&mut O) -> &mut Option<R> + Send + Sync + 'static,
    ) -> Self {
        let field = Arc::new(field);
        let clear_field = Arc::clone(&field);
        Self::Single {
            clear: Arc::new(move |owner| {
                *clear_field(owner) = None;
                Ok(())
            }),
            assign: Arc::new(move |owner, row| {
                *field(owner) = Some(row);
                Ok(())
            }),
        }
    }

    /// A collection slot over a `Vec<R>` field.
    pub fn vec_field(field: impl Fn(&mut O) -> &mut Vec<R> + Send + Sync + 'static) -> Self {
        let field = Arc::new(field);
        let clear_field = Arc::clone(&field);
        Self::Collection {
            clear: Arc::new(move |owner| {
                *clear_field(owner) = Vec::new();
                Ok(())
            }),
            append: Arc::new(move |owner, row| {
                field(owner).push(row);
                Ok(())
            }),
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection { .. })
    }

    pub(crate) fn clear(&self, owner: &mut O) -> Result<(), FieldError> {
        match self {
            Self::Single { clear, .. } | Self::Collection { clear, .. } => clear(owner),
        }
    }

    pub(crate) fn place(&self, owner: &mut O, row: R) -> Result<(), FieldError> {
        match self {
            Self::Single { assign, .. } => assign(owner, row),
            Self::Collection { append, .. } => append(owner, row),
        }
    }
}

impl<O, R> Clone for RelationSlot<O, R> {
    fn clone(&self) -> Self {
        match self {
            Self::Single { clear, assign } => Self::Single {
                clear: Arc::clone(clear),
                assign: Arc::clone(assign),
            },
            Self::Collection { clear, append } => Self::Collection {
                clear: Arc::clone(clear),
                append: Arc::clone(append),
            },
        }
    }
}

// Closures have no useful Debug output; report the variant only.
impl<O, R> fmt::Debug for RelationSlot<O, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single { .. } => f.write_str("RelationSlot::Single"),
            Self::Collection { .. } => f.write_str("RelationSlot::Collection"),
        }
    }
}

/// One declared relationship between owner type `O` and related type `R`.
#[derive(Clone)]
pub struct Relation<O, R> {
    pub kind: RelationKind,
    /// Column pairings, in declaration order.
    pub references: Vec<Reference>,
    /// Present exactly for [`RelationKind::ManyToMany`].
    pub join_table: Option<JoinTable>,
    slot: RelationSlot<O, R>,
}

impl<O, R> Relation<O, R> {
    /// A belongs-to relationship writing into an `Option<R>` field.
    pub fn belongs_to(
        references: Vec<Reference>,
        field: impl Fn(&mut O) -> &mut Option<R> + Send + Sync + 'static,
    ) -> Self {
        Self::with_slot(
            RelationKind::BelongsTo,
            references,
            None,
            RelationSlot::option_field(field),
        )
    }

    /// A has-one relationship writing into an `Option<R>` field.
    pub fn has_one(
        references: Vec<Reference>,
        field: impl Fn(&mut O) -> &mut Option<R> + Send + Sync + 'static,
    ) -> Self {
        Self::with_slot(
            RelationKind::HasOne,
            references,
            None,
            RelationSlot::option_field(field),
        )
    }

    /// A has-many relationship appending into a `Vec<R>` field.
    pub fn has_many(
        references: Vec<Reference>,
        field: impl Fn(&mut O) -> &mut Vec<R> + Send + Sync + 'static,
    ) -> Self {
        Self::with_slot(
            RelationKind::HasMany,
            references,
            None,
            RelationSlot::vec_field(field),
        )
    }

    /// A many-to-many relationship bridged through `join_table`, appending
    /// into a `Vec<R>` field.
    pub fn many_to_many(
        references: Vec<Reference>,
        join_table: JoinTable,
        field: impl Fn(&mut O) -> &mut Vec<R> + Send + Sync + 'static,
    ) -> Self {
        Self::with_slot(
            RelationKind::ManyToMany,
            references,
            Some(join_table),
            RelationSlot::vec_field(field),
        )
    }

    /// Build a relationship with a custom slot, for fields that are not a
    /// plain `Option<R>` or `Vec<R>` (boxed values, trait setters, …).
    ///
    /// # Panics
    ///
    /// Panics when the slot shape disagrees with the kind, or when the join
    /// table is present on a kind other than many-to-many (or missing on
    /// many-to-many).
    pub fn with_slot(
        kind: RelationKind,
        references: Vec<Reference>,
        join_table: Option<JoinTable>,
        slot: RelationSlot<O, R>,
    ) -> Self {
        assert_eq!(
            kind.is_collection(),
            slot.is_collection(),
            "relation kind and slot shape must agree"
        );
        assert_eq!(
            kind == RelationKind::ManyToMany,
            join_table.is_some(),
            "join table is required for many-to-many and only for many-to-many"
        );
        Self {
            kind,
            references,
            join_table,
            slot,
        }
    }

    pub(crate) fn slot(&self) -> &RelationSlot<O, R> {
        &self.slot
    }
}

impl<O, R> fmt::Debug for Relation<O, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relation")
            .field("kind", &self.kind)
            .field("references", &self.references)
            .field("join_table", &self.join_table)
            .field("slot", &self.slot)
            .finish()
    }
}
