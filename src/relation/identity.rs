//! Single and composite column lists.
//!
//! A relationship key may span one or more columns. `Identity` carries that
//! ordered column list; the common arities get their own variants so the
//! usual single-column case stays allocation-light.

use sea_query::DynIden;

/// An ordered, non-empty list of column identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// Single column.
    Unary(DynIden),
    /// Two-column composite key.
    Binary(DynIden, DynIden),
    /// Three-column composite key.
    Ternary(DynIden, DynIden, DynIden),
    /// Four or more columns.
    Many(Vec<DynIden>),
}

impl Identity {
    /// Build an identity from a column list collected at runtime.
    ///
    /// # Panics
    ///
    /// Panics if `columns` is empty — a key with no columns cannot join
    /// anything.
    pub fn from_columns(columns: Vec<DynIden>) -> Self {
        let mut columns = columns.into_iter();
        match (columns.next(), columns.next(), columns.next()) {
            (Some(a), None, _) => Self::Unary(a),
            (Some(a), Some(b), None) => Self::Binary(a, b),
            (Some(a), Some(b), Some(c)) if columns.len() == 0 => Self::Ternary(a, b, c),
            (Some(a), Some(b), Some(c)) => {
                let mut rest = vec![a, b, c];
                rest.extend(columns);
                Self::Many(rest)
            }
            (None, _, _) => panic!("identity requires at least one column"),
        }
    }

    /// Number of columns.
    pub fn arity(&self) -> usize {
        match self {
            Self::Unary(_) => 1,
            Self::Binary(_, _) => 2,
            Self::Ternary(_, _, _) => 3,
            Self::Many(columns) => columns.len(),
        }
    }

    /// Iterate the columns in declaration order.
    pub fn iter(&self) -> IdentityIter<'_> {
        IdentityIter {
            identity: self,
            index: 0,
        }
    }
}

/// Borrowed iterator over the columns of an [`Identity`].
#[derive(Debug)]
pub struct IdentityIter<'a> {
    identity: &'a Identity,
    index: usize,
}

impl<'a> Iterator for IdentityIter<'a> {
    type Item = &'a DynIden;

    fn next(&mut self) -> Option<Self::Item> {
        let column = match self.identity {
            Identity::Unary(a) => match self.index {
                0 => Some(a),
                _ => None,
            },
            Identity::Binary(a, b) => match self.index {
                0 => Some(a),
                1 => Some(b),
                _ => None,
            },
            Identity::Ternary(a, b, c) => match self.index {
                0 => Some(a),
                1 => Some(b),
                2 => Some(c),
                _ => None,
            },
            Identity::Many(columns) => columns.get(self.index),
        };
        if column.is_some() {
            self.index += 1;
        }
        column
    }
}
