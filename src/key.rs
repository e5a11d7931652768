//! Structural composite keys for the identity map.
//!
//! Key tuples are compared and hashed by value, part by part. This keeps the
//! map injective over distinct tuples of the same arity — there is no string
//! concatenation and therefore no separator that a value could collide with.

use std::collections::HashSet;

use sea_query::{DynIden, Value};

use crate::model::ModelAccess;

/// One normalized component of a [`TupleKey`].
///
/// Integer widths and signedness are collapsed into a single variant so that
/// a key read from an `INT` column matches the same value read back from a
/// `BIGINT` join column. Types that are unusual as key columns (floats, and
/// any value variants enabled by downstream feature flags) fall back to
/// their rendered form, which is still compared structurally per part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPart {
    Bool(bool),
    Int(i128),
    Str(String),
    Bytes(Vec<u8>),
    Text(String),
}

impl KeyPart {
    /// Normalize a column value into a key part. `None` means the value is
    /// absent (a typed NULL): rows with absent key parts never enter the
    /// identity map.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(Some(b)) => Some(Self::Bool(*b)),
            Value::TinyInt(Some(i)) => Some(Self::Int(i128::from(*i))),
            Value::SmallInt(Some(i)) => Some(Self::Int(i128::from(*i))),
            Value::Int(Some(i)) => Some(Self::Int(i128::from(*i))),
            Value::BigInt(Some(i)) => Some(Self::Int(i128::from(*i))),
            Value::TinyUnsigned(Some(u)) => Some(Self::Int(i128::from(*u))),
            Value::SmallUnsigned(Some(u)) => Some(Self::Int(i128::from(*u))),
            Value::Unsigned(Some(u)) => Some(Self::Int(i128::from(*u))),
            Value::BigUnsigned(Some(u)) => Some(Self::Int(i128::from(*u))),
            Value::String(Some(s)) => Some(Self::Str(s.clone())),
            Value::Char(Some(c)) => Some(Self::Str(c.to_string())),
            Value::Bytes(Some(b)) => Some(Self::Bytes(b.clone())),
            Value::Float(Some(v)) => Some(Self::Text(v.to_string())),
            Value::Double(Some(v)) => Some(Self::Text(v.to_string())),
            Value::Bool(None)
            | Value::TinyInt(None)
            | Value::SmallInt(None)
            | Value::Int(None)
            | Value::BigInt(None)
            | Value::TinyUnsigned(None)
            | Value::SmallUnsigned(None)
            | Value::Unsigned(None)
            | Value::BigUnsigned(None)
            | Value::Float(None)
            | Value::Double(None)
            | Value::String(None)
            | Value::Char(None)
            | Value::Bytes(None) => None,
            #[allow(unreachable_patterns)]
            other => Some(Self::Text(format!("{other:?}"))),
        }
    }
}

/// An ordered tuple of key parts with value-based equality and hashing.
///
/// ```
/// use sea_query::Value;
/// use stevedore::TupleKey;
///
/// let a = TupleKey::from_values(&[Value::from("a|b"), Value::from("c")]).unwrap();
/// let b = TupleKey::from_values(&[Value::from("a"), Value::from("b|c")]).unwrap();
/// assert_ne!(a, b);
///
/// // Integer width does not matter.
/// let narrow = TupleKey::from_values(&[Value::Int(Some(5))]).unwrap();
/// let wide = TupleKey::from_values(&[Value::BigInt(Some(5))]).unwrap();
/// assert_eq!(narrow, wide);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TupleKey(Vec<KeyPart>);

impl TupleKey {
    /// Build a key from raw column values. `None` if any value is absent.
    pub fn from_values<'a, I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut parts = Vec::new();
        for value in values {
            parts.push(KeyPart::from_value(value)?);
        }
        Some(Self(parts))
    }

    /// Read `fields` off a model instance and build the key. `None` if any
    /// field is missing or NULL.
    pub fn of<M: ModelAccess>(model: &M, fields: &[DynIden]) -> Option<Self> {
        let mut parts = Vec::with_capacity(fields.len());
        for field in fields {
            let value = model.value_of(field)?;
            parts.push(KeyPart::from_value(&value)?);
        }
        Some(Self(parts))
    }

    pub fn arity(&self) -> usize {
        self.0.len()
    }
}

/// Read `fields` off a model instance, returning both the normalized key and
/// the raw values (the raw tuple feeds the IN predicate of the follow-up
/// query). `None` if any field is missing or NULL.
pub(crate) fn value_tuple<M: ModelAccess>(
    model: &M,
    fields: &[DynIden],
) -> Option<(TupleKey, Vec<Value>)> {
    let mut parts = Vec::with_capacity(fields.len());
    let mut values = Vec::with_capacity(fields.len());
    for field in fields {
        let value = model.value_of(field)?;
        parts.push(KeyPart::from_value(&value)?);
        values.push(value);
    }
    Some((TupleKey(parts), values))
}

/// The distinct key-value tuples present in `rows`, in first-seen order.
/// Rows with missing or NULL key fields contribute nothing.
pub(crate) fn distinct_value_tuples<M: ModelAccess>(
    rows: &[M],
    fields: &[DynIden],
) -> Vec<Vec<Value>> {
    if fields.is_empty() {
        return Vec::new();
    }
    let mut seen = HashSet::new();
    let mut tuples = Vec::new();
    for row in rows {
        if let Some((key, values)) = value_tuple(row, fields) {
            if seen.insert(key) {
                tuples.push(values);
            }
        }
    }
    tuples
}
