#![allow(dead_code)]

use async_trait::async_trait;
use quarry_fulltext::db::search::Statement;
use quarry_fulltext::{Error, Record, Result, StatementExecutor, TargetConfig, TargetRegistry};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Executor that replays scripted responses and records every statement.
#[derive(Default)]
pub struct ScriptedExecutor {
    responses: Mutex<VecDeque<Result<Vec<Record>>>>,
    executed: Mutex<Vec<Statement>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the rows returned by the next statement.
    pub fn respond(self, rows: Vec<Value>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(rows.into_iter().map(record).collect()));
        self
    }

    /// Queue a store failure for the next statement.
    pub fn fail(self, err: sqlx::Error) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(Error::Store(err)));
        self
    }

    pub fn executed(&self) -> Vec<Statement> {
        self.executed.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl StatementExecutor for ScriptedExecutor {
    async fn execute(&self, statement: &Statement) -> Result<Vec<Record>> {
        self.executed.lock().unwrap().push(statement.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected statement: {}", statement.sql()))
    }
}

pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

pub fn ids(records: &[Record], column: &str) -> Vec<Value> {
    records.iter().map(|r| r[column].clone()).collect()
}

pub fn articles() -> TargetConfig {
    TargetConfig::new("articles", "id", ["title", "body"])
        .unwrap()
        .with_scope_column("author_id")
        .unwrap()
}

pub fn products() -> TargetConfig {
    TargetConfig::new("products", "sku", ["name", "description"])
        .unwrap()
        .with_output_columns(["sku", "name", "price"])
        .unwrap()
}

pub fn registry() -> TargetRegistry {
    TargetRegistry::new()
        .register("article", articles())
        .register("product", products())
}
