//! Rank-preserving rehydration of search hits into full records.

use std::collections::HashMap;

use crate::db::executor::StatementExecutor;
use crate::db::search::query_builder::{QueryBuilder, SCORE_COLUMN};
use crate::models::{RankedHit, Record, RecordId, TargetConfig};
use crate::{Error, Result};

/// Read `(id, score)` pairs out of ranked-search rows, keeping row order.
pub fn hits_from_rows(rows: &[Record], target: &TargetConfig) -> Result<Vec<RankedHit>> {
    rows.iter()
        .map(|row| {
            let id = record_id(row, target)?;
            let score = row
                .get(SCORE_COLUMN)
                .and_then(|v| v.as_f64())
                .ok_or_else(|| {
                    Error::RowShape(format!(
                        "ranked row for '{}' has no numeric '{}' column",
                        target.table(),
                        SCORE_COLUMN
                    ))
                })?;
            Ok(RankedHit { id, score })
        })
        .collect()
}

/// Fetch the full records for `hits` and return them in hit order.
///
/// Duplicate hits produce duplicate records. Hits whose record is gone by the
/// time of the refetch are dropped. Large hit lists are refetched in several
/// statements; any failing batch fails the whole call.
pub async fn rehydrate<E>(
    executor: &E,
    hits: &[RankedHit],
    target: &TargetConfig,
) -> Result<Vec<Record>>
where
    E: StatementExecutor + ?Sized,
{
    let ids: Vec<RecordId> = hits.iter().map(|hit| hit.id.clone()).collect();
    let batches = QueryBuilder::new(target).refetch_batches(&ids);
    if batches.len() > 1 {
        tracing::debug!(hits = ids.len(), batches = batches.len(), "Refetching in batches");
    }

    let mut by_id: HashMap<RecordId, Record> = HashMap::with_capacity(ids.len());
    for statement in &batches {
        for row in executor.execute(statement).await? {
            by_id.insert(record_id(&row, target)?, row);
        }
    }

    let records: Vec<Record> = ids.iter().filter_map(|id| by_id.get(id).cloned()).collect();
    if records.len() < ids.len() {
        tracing::debug!(
            table = target.table(),
            hits = ids.len(),
            records = records.len(),
            "Some hits vanished before refetch"
        );
    }
    Ok(records)
}

fn record_id(row: &Record, target: &TargetConfig) -> Result<RecordId> {
    row.get(target.id_column())
        .and_then(RecordId::from_json)
        .ok_or_else(|| {
            Error::RowShape(format!(
                "row from '{}' has no usable '{}' identifier",
                target.table(),
                target.id_column()
            ))
        })
}
