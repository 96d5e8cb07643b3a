//! 远端协作方（托管 Postgres 服务）端口
//!
//! 领域层只依赖“请求 → 成功行 / 结构化错误”的最小接口，
//! 传输、鉴权与重试均由具体实现负责。本模块另提供内存实现，用于测试与演示。
//!
mod inmemory;

pub use inmemory::{InMemoryBackend, Operation};

use crate::coerce::Row;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// 协作方返回的结构化错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}{}", .code.as_ref().map(|c| format!(" (code={c})")).unwrap_or_default())]
pub struct RemoteError {
    pub code: Option<String>,
    pub message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// 表级读写接口
#[async_trait]
pub trait RemoteTable: Send + Sync {
    /// 读取整张表
    async fn select_all(&self, table: &str) -> RemoteResult<Vec<Row>>;

    /// 按列等值过滤
    async fn select_eq(&self, table: &str, column: &str, value: &Value) -> RemoteResult<Vec<Row>>;

    /// 插入一行并返回写入后的行（含服务端生成的字段）
    async fn insert(&self, table: &str, row: Row) -> RemoteResult<Row>;

    /// 按 id 部分更新并返回更新后的整行
    async fn update(&self, table: &str, id: &str, patch: Row) -> RemoteResult<Row>;

    /// 按 id 删除
    async fn delete(&self, table: &str, id: &str) -> RemoteResult<()>;
}

#[async_trait]
impl<T> RemoteTable for Arc<T>
where
    T: RemoteTable + ?Sized,
{
    async fn select_all(&self, table: &str) -> RemoteResult<Vec<Row>> {
        (**self).select_all(table).await
    }

    async fn select_eq(&self, table: &str, column: &str, value: &Value) -> RemoteResult<Vec<Row>> {
        (**self).select_eq(table, column, value).await
    }

    async fn insert(&self, table: &str, row: Row) -> RemoteResult<Row> {
        (**self).insert(table, row).await
    }

    async fn update(&self, table: &str, id: &str, patch: Row) -> RemoteResult<Row> {
        (**self).update(table, id, patch).await
    }

    async fn delete(&self, table: &str, id: &str) -> RemoteResult<()> {
        (**self).delete(table, id).await
    }
}
