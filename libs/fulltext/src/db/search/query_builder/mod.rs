//! SQL statement builder for ranked full-text search.
//!
//! Renders three statements for a `TargetConfig`:
//! - the ranked search (`MATCH ... AGAINST ... IN BOOLEAN MODE`, score descending)
//! - the rank-preserving refetch (`IN (...)` ordered by `FIELD(...)`)
//! - the unranked listing used when the term sanitizes to nothing
//!
//! Every literal is a bound parameter. Table and column names come from the
//! validated target configuration.

use std::collections::HashSet;

use crate::db::search::sanitize::TokenSet;
use crate::models::{RecordId, TargetConfig};

mod bind;

use bind::{push, push_list};

/// Alias of the computed relevance column in ranked results.
pub const SCORE_COLUMN: &str = "score";

/// MySQL allows 65,535 placeholders per prepared statement; a refetch binds
/// each id twice.
pub const MAX_REFETCH_IDS: usize = 32_767;

/// Bind values for `sqlx` queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Text(String),
    Int(i64),
}

impl From<&RecordId> for BindValue {
    fn from(id: &RecordId) -> Self {
        match id {
            RecordId::Int(n) => BindValue::Int(*n),
            RecordId::Text(s) => BindValue::Text(s.clone()),
        }
    }
}

/// A rendered statement and the values to bind, in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sql: String,
    binds: Vec<BindValue>,
}

impl Statement {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn binds(&self) -> &[BindValue] {
        &self.binds
    }
}

/// Builds statements for a single search target.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder<'a> {
    target: &'a TargetConfig,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(target: &'a TargetConfig) -> Self {
        Self { target }
    }

    /// Identifier and relevance of every matching row, best first.
    ///
    /// The term is bound twice: once for the score, once for the `WHERE`
    /// filter. Matching is decided by the filter, not by the score, since a
    /// term present in every row scores zero.
    pub fn ranked_search(&self, tokens: &TokenSet, scope: Option<&RecordId>) -> Statement {
        let mut binds = Vec::new();
        let term = BindValue::Text(tokens.to_boolean_query());

        let score_expr = self.match_expr(&mut binds, &term);
        let mut sql = format!(
            "SELECT {id}, {score_expr} AS {score} FROM {table}",
            id = self.target.quoted_id_column(),
            score = SCORE_COLUMN,
            table = self.target.quoted_table(),
        );

        let mut predicates = vec![self.match_expr(&mut binds, &term)];
        predicates.extend(self.scope_predicate(&mut binds, scope));
        push_where(&mut sql, &predicates);
        sql.push_str(&format!(" ORDER BY {} DESC", SCORE_COLUMN));
        self.push_limit(&mut sql, &mut binds);

        Statement { sql, binds }
    }

    /// Full records for `ids`, returned in exactly the order of `ids`.
    ///
    /// Returns `None` for an empty list: `IN ()` is not valid SQL. The list
    /// must hold at most [`MAX_REFETCH_IDS`] ids; use [`Self::refetch_batches`]
    /// for arbitrary hit counts.
    pub fn refetch(&self, ids: &[RecordId]) -> Option<Statement> {
        if ids.is_empty() {
            return None;
        }
        debug_assert!(ids.len() <= MAX_REFETCH_IDS);

        let values: Vec<BindValue> = ids.iter().map(BindValue::from).collect();
        let mut binds = Vec::with_capacity(values.len() * 2);
        let id = self.target.quoted_id_column();

        let membership = push_list(&mut binds, &values);
        let ordering = push_list(&mut binds, &values);
        let sql = format!(
            "SELECT {cols} FROM {table} WHERE {id} IN ({membership}) \
             ORDER BY FIELD({id}, {ordering})",
            cols = self.target.select_list(),
            table = self.target.quoted_table(),
        );

        Some(Statement { sql, binds })
    }

    /// Refetch statements covering `ids`, each within the placeholder limit.
    ///
    /// Repeated ids are fetched once. Batches follow first-occurrence order.
    pub fn refetch_batches(&self, ids: &[RecordId]) -> Vec<Statement> {
        let mut seen = HashSet::with_capacity(ids.len());
        let unique: Vec<RecordId> = ids.iter().filter(|id| seen.insert(*id)).cloned().collect();

        unique
            .chunks(MAX_REFETCH_IDS)
            .filter_map(|chunk| self.refetch(chunk))
            .collect()
    }

    /// Every record of the target (optionally scoped), in store-default order.
    pub fn listing(&self, scope: Option<&RecordId>) -> Statement {
        let mut binds = Vec::new();
        let mut sql = format!(
            "SELECT {} FROM {}",
            self.target.select_list(),
            self.target.quoted_table()
        );
        let predicates: Vec<String> = self.scope_predicate(&mut binds, scope).into_iter().collect();
        push_where(&mut sql, &predicates);
        self.push_limit(&mut sql, &mut binds);

        Statement { sql, binds }
    }

    fn match_expr(&self, binds: &mut Vec<BindValue>, term: &BindValue) -> String {
        format!(
            "MATCH({}) AGAINST ({} IN BOOLEAN MODE)",
            self.target.match_columns(),
            push(binds, term.clone())
        )
    }

    fn scope_predicate(
        &self,
        binds: &mut Vec<BindValue>,
        scope: Option<&RecordId>,
    ) -> Option<String> {
        let scope = scope?;
        match self.target.quoted_scope_column() {
            Some(column) => Some(format!("{} = {}", column, push(binds, BindValue::from(scope)))),
            None => {
                tracing::warn!(
                    table = self.target.table(),
                    "Scope given for a target without a scope column; ignoring it"
                );
                None
            }
        }
    }

    fn push_limit(&self, sql: &mut String, binds: &mut Vec<BindValue>) {
        if let Some(limit) = self.target.max_results() {
            sql.push_str(&format!(
                " LIMIT {}",
                push(binds, BindValue::Int(i64::from(limit)))
            ));
        }
    }
}

fn push_where(sql: &mut String, predicates: &[String]) {
    if !predicates.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&predicates.join(" AND "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::search::sanitize::sanitize;

    fn articles() -> TargetConfig {
        TargetConfig::new("articles", "id", ["title", "body"])
            .unwrap()
            .with_scope_column("author_id")
            .unwrap()
    }

    #[test]
    fn ranked_search_filters_on_match_not_score() {
        let target = articles();
        let stmt = QueryBuilder::new(&target).ranked_search(&sanitize(Some("rust async")), None);

        assert_eq!(
            stmt.sql(),
            "SELECT `id`, MATCH(`title`, `body`) AGAINST (? IN BOOLEAN MODE) AS score \
             FROM `articles` WHERE MATCH(`title`, `body`) AGAINST (? IN BOOLEAN MODE) \
             ORDER BY score DESC"
        );
        assert!(!stmt.sql().contains("HAVING"));
        let term = BindValue::Text("rust* async*".into());
        assert_eq!(stmt.binds(), [term.clone(), term]);
    }

    #[test]
    fn ranked_search_binds_scope() {
        let target = articles();
        let stmt = QueryBuilder::new(&target)
            .ranked_search(&sanitize(Some("rust")), Some(&RecordId::Int(7)));

        assert!(stmt
            .sql()
            .contains("AGAINST (? IN BOOLEAN MODE) AND `author_id` = ? ORDER BY"));
        assert_eq!(
            stmt.binds(),
            [
                BindValue::Text("rust*".into()),
                BindValue::Text("rust*".into()),
                BindValue::Int(7)
            ]
        );
    }

    #[test]
    fn scope_without_scope_column_is_ignored() {
        let target = TargetConfig::new("tags", "id", ["name"]).unwrap();
        let stmt =
            QueryBuilder::new(&target).ranked_search(&sanitize(Some("x")), Some(&RecordId::Int(1)));
        assert!(!stmt.sql().contains("AND"));
        assert_eq!(stmt.binds().len(), 2);
    }

    #[test]
    fn limit_is_bound() {
        let target = articles().with_max_results(25).unwrap();
        let builder = QueryBuilder::new(&target);

        let ranked = builder.ranked_search(&sanitize(Some("x")), None);
        assert!(ranked.sql().ends_with("ORDER BY score DESC LIMIT ?"));
        assert_eq!(ranked.binds().last(), Some(&BindValue::Int(25)));

        let listing = builder.listing(None);
        assert_eq!(listing.sql(), "SELECT * FROM `articles` LIMIT ?");
        assert_eq!(listing.binds(), [BindValue::Int(25)]);
    }

    #[test]
    fn refetch_orders_by_the_given_ids() {
        let target = articles().with_output_columns(["title"]).unwrap();
        let ids = [RecordId::Int(5), RecordId::Int(2), RecordId::Int(9)];
        let stmt = QueryBuilder::new(&target).refetch(&ids).unwrap();

        assert_eq!(
            stmt.sql(),
            "SELECT `title`, `id` FROM `articles` WHERE `id` IN (?, ?, ?) \
             ORDER BY FIELD(`id`, ?, ?, ?)"
        );
        let expected: Vec<BindValue> = [5, 2, 9, 5, 2, 9].into_iter().map(BindValue::Int).collect();
        assert_eq!(stmt.binds(), expected.as_slice());
    }

    #[test]
    fn refetch_keeps_duplicates_and_text_ids() {
        let target = articles();
        let ids = [RecordId::from("b"), RecordId::from("a"), RecordId::from("b")];
        let stmt = QueryBuilder::new(&target).refetch(&ids).unwrap();
        assert_eq!(stmt.binds().len(), 6);
        assert_eq!(stmt.binds()[3], BindValue::Text("b".into()));
    }

    #[test]
    fn refetch_of_nothing_is_no_statement() {
        let target = articles();
        assert_eq!(QueryBuilder::new(&target).refetch(&[]), None);
    }

    #[test]
    fn refetch_batches_stay_under_the_placeholder_limit() {
        let target = articles();
        let ids: Vec<RecordId> = (0..40_000).map(RecordId::Int).collect();
        let batches = QueryBuilder::new(&target).refetch_batches(&ids);

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].binds().len(), MAX_REFETCH_IDS * 2);
        assert_eq!(batches[1].binds().len(), (40_000 - MAX_REFETCH_IDS) * 2);
        assert!(batches.iter().all(|b| b.binds().len() <= 65_535));
        assert_eq!(batches[1].binds()[0], BindValue::Int(MAX_REFETCH_IDS as i64));
    }

    #[test]
    fn refetch_batches_fetch_repeated_ids_once() {
        let target = articles();
        let ids = [RecordId::Int(3), RecordId::Int(8), RecordId::Int(3)];
        let batches = QueryBuilder::new(&target).refetch_batches(&ids);

        assert_eq!(batches.len(), 1);
        assert_eq!(
            batches[0].binds(),
            [3, 8, 3, 8].map(BindValue::Int).as_slice()
        );
        assert!(QueryBuilder::new(&target).refetch_batches(&[]).is_empty());
    }

    #[test]
    fn listing_applies_scope() {
        let target = articles();
        let stmt = QueryBuilder::new(&target).listing(Some(&RecordId::from("u-1")));
        assert_eq!(stmt.sql(), "SELECT * FROM `articles` WHERE `author_id` = ?");
        assert_eq!(stmt.binds(), [BindValue::Text("u-1".into())]);
    }

    #[test]
    fn hostile_terms_do_not_change_statement_shape() {
        let target = articles();
        let builder = QueryBuilder::new(&target);
        let benign = builder.ranked_search(&sanitize(Some("drop table")), None);
        let hostile = builder.ranked_search(&sanitize(Some("'; DROP TABLE `articles`; --")), None);

        assert_eq!(benign.sql(), hostile.sql());
        assert_eq!(
            hostile.binds(),
            [
                BindValue::Text("DROP* TABLE* articles*".into()),
                BindValue::Text("DROP* TABLE* articles*".into())
            ]
        );
    }
}
