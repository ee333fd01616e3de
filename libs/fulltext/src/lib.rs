//! Quarry full-text search layer
//!
//! Ranked search over MySQL FULLTEXT indexes for any number of entity kinds:
//! - Untrusted search text is sanitized into boolean-mode prefix tokens
//! - Every value reaches the store as a bound parameter
//! - Relevance order survives the second, full-record fetch
//! - One generic service, parameterized per entity by a `TargetConfig`

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;

pub use self::config::Config;
pub use db::{MySqlExecutor, StatementExecutor};
pub use error::{Error, Result};
pub use models::{
    RankedHit, Record, RecordId, SearchRequest, SearchResult, TargetConfig, TargetRegistry,
};
pub use services::SearchService;
