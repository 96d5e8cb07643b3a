//! 实体写命令与处理器
//!
//! `CreateEntity` / `UpdateEntity` / `DeleteEntity` 对所有可写实体通用，
//! 由 `EntityCommandHandler` 调用领域服务完成写入；写入成功后（可选）记录一条活动日志。
//! 活动日志写入失败只记录警告，不影响命令结果。
//!
use crate::{command::Command, command_handler::CommandHandler, context::AppContext, error::AppError};
use async_trait::async_trait;
use serde_json::{Value, json};
use signage_domain::entity::Entity;
use signage_domain::model::{NewActivity, Persist};
use signage_domain::service::{ActivityLogger, DomainService, EntityService};
use tracing::warn;

pub struct CreateEntity<E: Persist> {
    pub draft: E::Draft,
}

impl<E: Persist> CreateEntity<E> {
    pub fn new(draft: E::Draft) -> Self {
        Self { draft }
    }
}

impl<E: Persist> Command for CreateEntity<E> {
    const NAME: &'static str = "create-entity";
    type Output = E;
}

pub struct UpdateEntity<E: Persist> {
    pub id: E::Id,
    pub patch: E::Patch,
}

impl<E: Persist> UpdateEntity<E> {
    pub fn new(id: impl Into<E::Id>, patch: E::Patch) -> Self {
        Self {
            id: id.into(),
            patch,
        }
    }
}

impl<E: Persist> Command for UpdateEntity<E> {
    const NAME: &'static str = "update-entity";
    type Output = E;
}

pub struct DeleteEntity<E: Persist> {
    pub id: E::Id,
}

impl<E: Persist> DeleteEntity<E> {
    pub fn new(id: impl Into<E::Id>) -> Self {
        Self { id: id.into() }
    }
}

impl<E: Persist> Command for DeleteEntity<E> {
    const NAME: &'static str = "delete-entity";
    type Output = ();
}

/// 执行实体写命令，并按需记录活动日志
pub struct EntityCommandHandler<E: Persist> {
    service: EntityService<E>,
    audit: Option<ActivityLogger>,
}

impl<E: Persist> EntityCommandHandler<E> {
    pub fn new(service: EntityService<E>, audit: Option<ActivityLogger>) -> Self {
        Self { service, audit }
    }

    async fn record(&self, ctx: &AppContext, action: &str, id: &E::Id, changes: Value) {
        let Some(logger) = &self.audit else {
            return;
        };
        let entry = NewActivity::builder()
            .maybe_actor_id(ctx.actor_id().map(str::to_string))
            .action(action)
            .entity_type(E::TYPE)
            .entity_id(id.to_string())
            .details(json!({
                "correlation_id": ctx.biz.correlation_id(),
                "changes": changes,
            }))
            .build();
        if let Err(err) = logger.execute(entry).await {
            warn!(entity = E::TYPE, %id, action, error = %err, "activity log failed");
        }
    }
}

#[async_trait]
impl<E: Persist> CommandHandler<CreateEntity<E>> for EntityCommandHandler<E> {
    async fn handle(&self, ctx: &AppContext, cmd: CreateEntity<E>) -> Result<E, AppError> {
        let changes = serde_json::to_value(&cmd.draft).unwrap_or_default();
        let entity = self.service.create(cmd.draft).await?;
        self.record(ctx, "create", entity.id(), changes).await;
        Ok(entity)
    }
}

#[async_trait]
impl<E: Persist> CommandHandler<UpdateEntity<E>> for EntityCommandHandler<E> {
    async fn handle(&self, ctx: &AppContext, cmd: UpdateEntity<E>) -> Result<E, AppError> {
        let changes = serde_json::to_value(&cmd.patch).unwrap_or_default();
        let entity = self.service.update(&cmd.id, cmd.patch).await?;
        self.record(ctx, "update", entity.id(), changes).await;
        Ok(entity)
    }
}

#[async_trait]
impl<E: Persist> CommandHandler<DeleteEntity<E>> for EntityCommandHandler<E> {
    async fn handle(&self, ctx: &AppContext, cmd: DeleteEntity<E>) -> Result<(), AppError> {
        self.service.delete(&cmd.id).await?;
        self.record(ctx, "delete", &cmd.id, Value::Null).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{FutureExt, StreamExt};
    use signage_domain::domain_event::{Event, EventKind};
    use signage_domain::eventing::{EventBus, InMemoryEventBus};
    use signage_domain::model::{ActivityLog, Organization, OrganizationDraft, OrganizationPatch};
    use signage_domain::remote::{InMemoryBackend, Operation, RemoteError};
    use std::sync::Arc;

    fn handler(
        backend: &Arc<InMemoryBackend>,
        bus: &Arc<InMemoryEventBus>,
        audit: bool,
    ) -> EntityCommandHandler<Organization> {
        let service = EntityService::new(backend.clone(), bus.clone());
        let logger = audit.then(|| ActivityLogger::new(backend.clone(), bus.clone()));
        EntityCommandHandler::new(service, logger)
    }

    #[tokio::test]
    async fn create_records_activity_for_actor() {
        let backend = Arc::new(InMemoryBackend::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let h = handler(&backend, &bus, true);
        let ctx = AppContext::for_actor("admin-1");

        let draft = OrganizationDraft::builder()
            .name("Acme Retail")
            .slug("acme-retail")
            .build();
        let org = h.handle(&ctx, CreateEntity::<Organization>::new(draft)).await.unwrap();

        let logs = backend.rows(ActivityLog::TABLE);
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0]["actor_id"], json!("admin-1"));
        assert_eq!(logs[0]["action"], json!("create"));
        assert_eq!(logs[0]["entity_type"], json!("organization"));
        assert_eq!(logs[0]["entity_id"], json!(org.id));
        assert_eq!(logs[0]["details"]["changes"]["name"], json!("Acme Retail"));
    }

    #[tokio::test]
    async fn audit_failure_does_not_fail_the_command() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.seed(Organization::TABLE, [json!({"id": "o-1", "name": "Acme"})]);
        backend.fail_next(
            ActivityLog::TABLE,
            Operation::Insert,
            RemoteError::new("audit table offline"),
        );
        let bus = Arc::new(InMemoryEventBus::new());
        let mut updates = bus.on(EventKind::OrganizationUpdated);
        let h = handler(&backend, &bus, true);

        let patch = OrganizationPatch::builder().name("Acme Inc").build();
        let org = h
            .handle(&AppContext::default(), UpdateEntity::<Organization>::new("o-1", patch))
            .await
            .unwrap();
        assert_eq!(org.name, "Acme Inc");
        assert!(backend.rows(ActivityLog::TABLE).is_empty());
        assert_eq!(updates.next().await, Some(Event::OrganizationUpdated(org)));
    }

    #[tokio::test]
    async fn failed_delete_is_neither_audited_nor_announced() {
        let backend = Arc::new(InMemoryBackend::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let mut deletes = bus.on(EventKind::OrganizationDeleted);
        let h = handler(&backend, &bus, true);

        let err = h
            .handle(&AppContext::default(), DeleteEntity::<Organization>::new("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Domain(_)));
        assert!(backend.rows(ActivityLog::TABLE).is_empty());
        assert!(deletes.next().now_or_never().is_none());
    }

    #[tokio::test]
    async fn audit_can_be_disabled() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.seed(Organization::TABLE, [json!({"id": "o-1", "name": "Acme"})]);
        let bus = Arc::new(InMemoryEventBus::new());
        let h = handler(&backend, &bus, false);

        h.handle(&AppContext::default(), DeleteEntity::<Organization>::new("o-1"))
            .await
            .unwrap();
        assert!(backend.rows(ActivityLog::TABLE).is_empty());
        assert!(backend.rows(Organization::TABLE).is_empty());
    }
}
