use crate::error::{DomainError, DomainResult};
use crate::remote::RemoteTable;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// 删除前置检查；返回 `Precondition` 错误时删除不会被执行
#[async_trait]
pub trait DeleteGuard: Send + Sync {
    async fn check(&self, id: &str) -> DomainResult<()>;
}

/// 仍被其他表引用时拒绝删除（如仍有组织使用的套餐）
pub struct ReferenceGuard {
    remote: Arc<dyn RemoteTable>,
    table: &'static str,
    column: &'static str,
}

impl ReferenceGuard {
    pub fn new(remote: Arc<dyn RemoteTable>, table: &'static str, column: &'static str) -> Self {
        Self {
            remote,
            table,
            column,
        }
    }
}

#[async_trait]
impl DeleteGuard for ReferenceGuard {
    async fn check(&self, id: &str) -> DomainResult<()> {
        let refs = self
            .remote
            .select_eq(self.table, self.column, &Value::String(id.to_string()))
            .await?;
        if refs.is_empty() {
            return Ok(());
        }
        Err(DomainError::Precondition {
            reason: format!(
                "{id} is still referenced by {} row(s) in {}",
                refs.len(),
                self.table
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::InMemoryBackend;
    use serde_json::json;

    #[tokio::test]
    async fn blocks_only_referenced_ids() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.seed(
            "organizations",
            [json!({"id": "o-1", "subscription_plan_id": "2"})],
        );
        let guard = ReferenceGuard::new(backend, "organizations", "subscription_plan_id");

        assert!(guard.check("3").await.is_ok());
        let err = guard.check("2").await.unwrap_err();
        assert!(matches!(err, DomainError::Precondition { .. }));
        assert!(err.to_string().contains("1 row(s) in organizations"));
    }
}
