//! 内存版远端表（InMemoryBackend）
//!
//! 模拟托管服务的行为：插入时生成 UUID 主键与 `created_at`，
//! 更新/删除不存在的行返回错误；支持按表与操作注入一次性失败。
//!
use super::{RemoteError, RemoteResult, RemoteTable};
use crate::coerce::Row;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// 可注入失败的操作种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
}

#[derive(Default)]
struct Tables {
    rows: HashMap<String, Vec<Row>>,
    faults: Vec<(String, Operation, RemoteError)>,
}

#[derive(Default)]
pub struct InMemoryBackend {
    inner: Mutex<Tables>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 预置表数据（追加，非 JSON 对象会被忽略）
    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Value>) {
        let mut g = self.lock();
        let entry = g.rows.entry(table.to_string()).or_default();
        entry.extend(rows.into_iter().filter_map(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        }));
    }

    /// 令下一次对 `table` 的 `op` 操作以 `error` 失败
    pub fn fail_next(&self, table: &str, op: Operation, error: RemoteError) {
        self.lock().faults.push((table.to_string(), op, error));
    }

    /// 当前表内容快照
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.lock().rows.get(table).cloned().unwrap_or_default()
    }

    fn take_fault(g: &mut Tables, table: &str, op: Operation) -> RemoteResult<()> {
        match g.faults.iter().position(|(t, o, _)| t == table && *o == op) {
            Some(pos) => Err(g.faults.remove(pos).2),
            None => Ok(()),
        }
    }
}

/// 标量键的文本形式；后端对 `2` 与 `"2"` 一视同仁
fn key_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn id_of(row: &Row) -> Option<String> {
    row.get("id").and_then(key_text)
}

fn column_matches(row: &Row, column: &str, value: &Value) -> bool {
    let Some(cell) = row.get(column) else {
        return false;
    };
    match (key_text(cell), key_text(value)) {
        (Some(a), Some(b)) => a == b,
        _ => cell == value,
    }
}

fn not_found(table: &str, id: &str) -> RemoteError {
    RemoteError::with_code("PGRST116", format!("no row in {table} with id {id}"))
}

#[async_trait]
impl RemoteTable for InMemoryBackend {
    async fn select_all(&self, table: &str) -> RemoteResult<Vec<Row>> {
        let mut g = self.lock();
        Self::take_fault(&mut g, table, Operation::Select)?;
        Ok(g.rows.get(table).cloned().unwrap_or_default())
    }

    async fn select_eq(&self, table: &str, column: &str, value: &Value) -> RemoteResult<Vec<Row>> {
        let mut g = self.lock();
        Self::take_fault(&mut g, table, Operation::Select)?;
        Ok(g.rows
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| column_matches(r, column, value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, table: &str, mut row: Row) -> RemoteResult<Row> {
        let mut g = self.lock();
        Self::take_fault(&mut g, table, Operation::Insert)?;

        let id = match id_of(&row) {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().to_string();
                row.insert("id".into(), Value::String(id.clone()));
                id
            }
        };
        if !row.get("created_at").is_some_and(|v| !v.is_null()) {
            row.insert("created_at".into(), Value::String(Utc::now().to_rfc3339()));
        }

        let rows = g.rows.entry(table.to_string()).or_default();
        if rows.iter().any(|r| id_of(r).as_deref() == Some(id.as_str())) {
            return Err(RemoteError::with_code(
                "23505",
                format!("duplicate key value violates unique constraint on {table}.id"),
            ));
        }
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: &str, id: &str, patch: Row) -> RemoteResult<Row> {
        let mut g = self.lock();
        Self::take_fault(&mut g, table, Operation::Update)?;

        let row = g
            .rows
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|r| id_of(r).as_deref() == Some(id)))
            .ok_or_else(|| not_found(table, id))?;
        for (k, v) in patch {
            if k != "id" {
                row.insert(k, v);
            }
        }
        Ok(row.clone())
    }

    async fn delete(&self, table: &str, id: &str) -> RemoteResult<()> {
        let mut g = self.lock();
        Self::take_fault(&mut g, table, Operation::Delete)?;

        let rows = g.rows.get_mut(table).ok_or_else(|| not_found(table, id))?;
        let before = rows.len();
        rows.retain(|r| id_of(r).as_deref() != Some(id));
        if rows.len() == before {
            return Err(not_found(table, id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Row {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn insert_generates_id_and_rejects_duplicates() {
        let backend = InMemoryBackend::new();
        let row = backend.insert("t", obj(json!({"name": "a"}))).await.unwrap();
        let id = row["id"].as_str().unwrap().to_string();
        assert!(Uuid::parse_str(&id).is_ok());
        assert!(row.contains_key("created_at"));

        let err = backend
            .insert("t", obj(json!({"id": id, "name": "b"})))
            .await
            .unwrap_err();
        assert_eq!(err.code.as_deref(), Some("23505"));
        assert_eq!(backend.rows("t").len(), 1);
    }

    #[tokio::test]
    async fn update_merges_and_keeps_id() {
        let backend = InMemoryBackend::new();
        backend.seed("t", [json!({"id": "1", "name": "a", "n": 1})]);
        let row = backend
            .update("t", "1", obj(json!({"id": "9", "name": "b"})))
            .await
            .unwrap();
        assert_eq!(row, obj(json!({"id": "1", "name": "b", "n": 1})));

        let err = backend.update("t", "2", Row::new()).await.unwrap_err();
        assert_eq!(err.code.as_deref(), Some("PGRST116"));
    }

    #[tokio::test]
    async fn injected_fault_fires_once_for_matching_operation() {
        let backend = InMemoryBackend::new();
        backend.seed("t", [json!({"id": "1"})]);
        backend.fail_next("t", Operation::Delete, RemoteError::new("boom"));

        assert!(backend.select_all("t").await.is_ok());
        assert_eq!(
            backend.delete("t", "1").await.unwrap_err(),
            RemoteError::new("boom")
        );
        assert!(backend.delete("t", "1").await.is_ok());
        assert!(backend.delete("t", "1").await.is_err());
    }

    #[tokio::test]
    async fn select_eq_filters_by_column() {
        let backend = InMemoryBackend::new();
        backend.seed(
            "orgs",
            [
                json!({"id": "a", "plan": "2"}),
                json!({"id": "b", "plan": "3"}),
                json!({"id": "c", "plan": "2"}),
            ],
        );
        let rows = backend.select_eq("orgs", "plan", &json!("2")).await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn select_eq_treats_numeric_and_text_keys_alike() {
        let backend = InMemoryBackend::new();
        backend.seed(
            "orgs",
            [
                json!({"id": 1, "plan": 2}),
                json!({"id": "2", "plan": "2"}),
                json!({"id": 3, "plan": null}),
            ],
        );
        let by_text = backend.select_eq("orgs", "plan", &json!("2")).await.unwrap();
        let by_number = backend.select_eq("orgs", "plan", &json!(2)).await.unwrap();
        assert_eq!(by_text.len(), 2);
        assert_eq!(by_text, by_number);

        let by_id = backend.select_eq("orgs", "id", &json!("1")).await.unwrap();
        assert_eq!(by_id.len(), 1);
        let unset = backend.select_eq("orgs", "plan", &Value::Null).await.unwrap();
        assert_eq!(unset.len(), 1);
    }
}
