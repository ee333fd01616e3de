//! Full-text search statements: term sanitization, statement building and
//! rank-preserving rehydration.

pub mod query_builder;
pub mod rehydrate;
pub mod sanitize;

pub use query_builder::{BindValue, QueryBuilder, Statement, MAX_REFETCH_IDS, SCORE_COLUMN};
pub use rehydrate::{hits_from_rows, rehydrate};
pub use sanitize::{sanitize, TokenSet, WILDCARD};
