//! Statement execution against the store.

use async_trait::async_trait;
use sqlx::mysql::MySqlArguments;
use sqlx::query::Query;
use sqlx::{MySql, MySqlPool};

use crate::db::rows::decode_row;
use crate::db::search::query_builder::{BindValue, Statement};
use crate::models::Record;
use crate::{Error, Result};

/// Runs a rendered statement and returns its rows in store order.
///
/// Implementations pass failures through untouched and never retry.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    async fn execute(&self, statement: &Statement) -> Result<Vec<Record>>;
}

/// Executor backed by a MySQL connection pool.
///
/// A connection is acquired per statement and returned to the pool when it
/// drops, on success and on error alike.
#[derive(Debug, Clone)]
pub struct MySqlExecutor {
    pool: MySqlPool,
}

impl MySqlExecutor {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatementExecutor for MySqlExecutor {
    #[tracing::instrument(
        name = "fulltext.execute",
        skip_all,
        fields(binds = statement.binds().len())
    )]
    async fn execute(&self, statement: &Statement) -> Result<Vec<Record>> {
        tracing::debug!(sql = statement.sql(), "Executing statement");

        let mut conn = self.pool.acquire().await.map_err(Error::Store)?;

        let rows = bind_all(sqlx::query(statement.sql()), statement.binds())
            .fetch_all(&mut *conn)
            .await
            .map_err(Error::Store)?;

        tracing::debug!(rows = rows.len(), "Statement returned");
        rows.iter().map(decode_row).collect()
    }
}

fn bind_all<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    binds: &'q [BindValue],
) -> Query<'q, MySql, MySqlArguments> {
    for value in binds {
        query = match value {
            BindValue::Text(v) => query.bind(v.as_str()),
            BindValue::Int(v) => query.bind(*v),
        };
    }
    query
}
