//! # Stevedore
//!
//! Association preloading (eager loading) for ORM-style data access: given a
//! set of already-loaded owner records, resolve one declared relationship —
//! belongs-to, has-one, has-many or many-to-many — with a single secondary
//! query and stitch the results back onto the owners through an identity map
//! keyed by foreign-key/primary-key value tuples.
//!
//! The surrounding ORM stays pluggable: queries run behind the
//! [`RelationQuery`]/[`PreloadSource`] seams, and a `sea-query`-backed
//! implementation ([`SqlQuery`]/[`SqlSource`]) is included for SQL stores.
//!
//! ```
//! use std::collections::BTreeMap;
//! use sea_query::{DynIden, Value};
//! use stevedore::{
//!     preload, Hydrator, Identity, ModelAccess, Owners, PreloadSource, QueryError,
//!     Reference, Relation, RelationQuery, JoinTable, TupleKey,
//! };
//!
//! #[derive(Debug, Clone)]
//! struct User { id: i32, posts: Vec<Post> }
//! #[derive(Debug, Clone)]
//! struct Post { user_id: i32, title: String }
//!
//! impl ModelAccess for User {
//!     fn value_of(&self, column: &DynIden) -> Option<Value> {
//!         match column.to_string().as_str() {
//!             "id" => Some(Value::Int(Some(self.id))),
//!             _ => None,
//!         }
//!     }
//! }
//! impl ModelAccess for Post {
//!     fn value_of(&self, column: &DynIden) -> Option<Value> {
//!         match column.to_string().as_str() {
//!             "user_id" => Some(Value::Int(Some(self.user_id))),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! // A toy in-memory store standing in for the real query builder.
//! #[derive(Clone)]
//! struct MemQuery<T: Clone>(Vec<T>);
//! impl<T: ModelAccess> RelationQuery for MemQuery<T> {
//!     type Item = T;
//!     type Filter = ();
//!     fn filter_eq(mut self, column: &DynIden, value: Value) -> Self {
//!         self.0.retain(|row| row.value_of(column) == Some(value.clone()));
//!         self
//!     }
//!     fn filter_in(mut self, columns: &Identity, tuples: Vec<Vec<Value>>) -> Self {
//!         let columns: Vec<DynIden> = columns.iter().cloned().collect();
//!         let keys: Vec<TupleKey> = tuples
//!             .iter()
//!             .filter_map(|tuple| TupleKey::from_values(tuple.iter()))
//!             .collect();
//!         self.0.retain(|row| {
//!             TupleKey::of(row, &columns).is_some_and(|key| keys.contains(&key))
//!         });
//!         self
//!     }
//!     fn preload(self, _path: &str, _hydrator: &Hydrator<T>) -> Self { self }
//!     fn find(self, _inline: Vec<()>) -> Result<Vec<T>, QueryError> { Ok(self.0) }
//! }
//!
//! struct MemSource { posts: Vec<Post> }
//! impl PreloadSource for MemSource {
//!     type Related = Post;
//!     type Query = MemQuery<Post>;
//!     type JoinRow = Post; // unused: no join table in this relationship
//!     type JoinQuery = MemQuery<Post>;
//!     fn related(&self) -> MemQuery<Post> { MemQuery(self.posts.clone()) }
//!     fn join_rows(&self, _join_table: &JoinTable) -> MemQuery<Post> { MemQuery(Vec::new()) }
//! }
//!
//! let mut users = vec![User { id: 1, posts: Vec::new() }, User { id: 2, posts: Vec::new() }];
//! let source = MemSource {
//!     posts: vec![
//!         Post { user_id: 1, title: "a".into() },
//!         Post { user_id: 2, title: "b".into() },
//!     ],
//! };
//! let rel = Relation::has_many(
//!     vec![Reference::owner_keyed("id", "user_id")],
//!     |user: &mut User| &mut user.posts,
//! );
//! preload(Owners::Sequence(&mut users), &rel, &source, Vec::new(), &BTreeMap::new()).unwrap();
//! assert_eq!(users[0].posts[0].title, "a");
//! assert_eq!(users[1].posts[0].title, "b");
//! ```

pub mod dal;
pub mod error;
pub mod key;
pub mod model;
pub mod query;
pub mod relation;

pub use dal::Dal;
pub use error::{FieldError, PreloadError, QueryError};
pub use key::{KeyPart, TupleKey};
pub use model::ModelAccess;
pub use query::{
    Executor, FromRow, Hydrator, NoJoinRow, PreloadSource, RelationQuery, SqlQuery, SqlSource,
};
pub use relation::{
    preload, Identity, JoinTable, Owners, Reference, Relation, RelationKind, RelationSlot, Scope,
};
