//! Relationship descriptors and the association resolver.
//!
//! - **Def**: relationship metadata (`Relation`, `Reference`, `JoinTable`,
//!   `RelationKind`) and the slot accessors that write resolved rows back
//!   onto owners.
//! - **Identity**: single and composite column lists.
//! - **Eager**: the resolver itself (`preload`), plus the owner-set view and
//!   caller-condition types.

pub mod def;
#[doc(inline)]
pub use def::{JoinTable, Reference, Relation, RelationKind, RelationSlot};

pub mod identity;
#[doc(inline)]
pub use identity::{Identity, IdentityIter};

pub mod eager;
#[doc(inline)]
pub use eager::{preload, Owners, Scope};
