//! Dynamic column access for model instances.
//!
//! The resolver never knows the concrete shape of the records it joins; it
//! reads key columns through this trait. Implementations are usually
//! generated by the embedding ORM alongside its entity definitions.

use sea_query::{DynIden, Value};

/// Column-value extraction on a model instance.
///
/// `value_of` returns the value stored under a column, or `None` when the
/// instance carries no value for it — either because the column does not
/// exist on this type or because the field is unset. Typed NULLs (for
/// example `Value::Int(None)`) count as present here; key construction in
/// [`crate::key::TupleKey`] treats them as missing.
pub trait ModelAccess: Clone + Send + std::fmt::Debug {
    /// The value stored under `column`, or the no-value indicator.
    fn value_of(&self, column: &DynIden) -> Option<Value>;
}
