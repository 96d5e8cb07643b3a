use super::DomainService;
use crate::coerce::FromRow;
use crate::domain_event::Event;
use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::eventing::EventBus;
use crate::mirror::CollectionLoader;
use crate::model::{ActivityLog, NewActivity};
use crate::remote::RemoteTable;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// 记录后台操作并发布 `activity-logged`
#[derive(Clone)]
pub struct ActivityLogger {
    remote: Arc<dyn RemoteTable>,
    bus: Arc<dyn EventBus>,
}

impl ActivityLogger {
    pub fn new(remote: Arc<dyn RemoteTable>, bus: Arc<dyn EventBus>) -> Self {
        Self { remote, bus }
    }

    /// 最近的活动，按时间倒序
    pub async fn recent(&self, limit: usize) -> DomainResult<Vec<ActivityLog>> {
        let rows = self.remote.select_all(ActivityLog::TABLE).await?;
        let mut logs: Vec<ActivityLog> = rows
            .iter()
            .filter_map(|row| {
                ActivityLog::from_row(row)
                    .inspect_err(|err| warn!(error = %err, "skipping malformed activity row"))
                    .ok()
            })
            .collect();
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        logs.truncate(limit);
        Ok(logs)
    }
}

#[async_trait]
impl DomainService for ActivityLogger {
    type Input = NewActivity;
    type Output = ActivityLog;
    type Error = DomainError;

    async fn execute(&self, input: NewActivity) -> Result<ActivityLog, DomainError> {
        let row = match serde_json::to_value(&input)? {
            Value::Object(map) => map,
            _ => return Err(DomainError::invalid_value("activity must serialize to an object")),
        };
        let inserted = self.remote.insert(ActivityLog::TABLE, row).await?;
        let log = ActivityLog::from_row(&inserted)?;
        debug!(action = %log.action, entity_type = %log.entity_type, "activity recorded");

        self.bus.emit(Event::ActivityLogged(log.clone()));
        Ok(log)
    }
}

#[async_trait]
impl CollectionLoader<ActivityLog> for ActivityLogger {
    async fn load(&self) -> DomainResult<Vec<ActivityLog>> {
        self.recent(usize::MAX).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_event::EventKind;
    use crate::eventing::InMemoryEventBus;
    use crate::remote::{InMemoryBackend, Operation, RemoteError};
    use futures_util::{FutureExt, StreamExt};
    use serde_json::json;

    #[tokio::test]
    async fn execute_records_and_emits() {
        let backend = Arc::new(InMemoryBackend::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let mut stream = bus.on(EventKind::ActivityLogged);
        let logger = ActivityLogger::new(backend.clone(), bus.clone());

        let log = logger
            .execute(
                NewActivity::builder()
                    .actor_id("admin-1")
                    .action("delete")
                    .entity_type("subscription-plan")
                    .entity_id("2")
                    .details(json!({"name": "Standard"}))
                    .build(),
            )
            .await
            .unwrap();

        assert_eq!(log.actor_id.as_deref(), Some("admin-1"));
        assert_eq!(log.details["name"], "Standard");
        assert_eq!(stream.next().await, Some(Event::ActivityLogged(log)));
        assert_eq!(backend.rows(ActivityLog::TABLE).len(), 1);
    }

    #[tokio::test]
    async fn failed_insert_is_not_announced() {
        let backend = Arc::new(InMemoryBackend::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let mut stream = bus.on(EventKind::ActivityLogged);
        backend.fail_next(
            ActivityLog::TABLE,
            Operation::Insert,
            RemoteError::new("offline"),
        );
        let logger = ActivityLogger::new(backend, bus.clone());

        let input = NewActivity::builder().action("create").entity_type("user").build();
        assert!(logger.execute(input).await.is_err());
        assert!(stream.next().now_or_never().is_none());
    }

    #[tokio::test]
    async fn recent_is_newest_first_and_limited() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.seed(
            ActivityLog::TABLE,
            [
                json!({"id": "a", "action": "create", "entity_type": "user", "created_at": "2024-01-01T00:00:00Z"}),
                json!({"id": "b", "action": "update", "entity_type": "user", "created_at": "2024-03-01T00:00:00Z"}),
                json!({"id": "c", "action": "delete", "entity_type": "user", "created_at": "2024-02-01T00:00:00Z"}),
            ],
        );
        let logger = ActivityLogger::new(backend, Arc::new(InMemoryEventBus::new()));

        let ids: Vec<String> = logger
            .recent(2)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec!["b", "c"]);
    }
}
