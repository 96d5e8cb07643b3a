//! 通用实体服务（EntityService）
//!
//! 对任意可写实体提供 list/find/create/update/delete：
//! 远端写入 → 行归一化 → 成功后发布 `<entity>-added/updated/deleted`。
//! 远端失败、归一化失败或前置条件失败都不会发布事件。
//!
use super::guard::DeleteGuard;
use crate::coerce::Row;
use crate::domain_event::{Change, Event};
use crate::error::{DomainError, DomainResult};
use crate::eventing::EventBus;
use crate::mirror::CollectionLoader;
use crate::model::Persist;
use crate::remote::RemoteTable;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct EntityService<E: Persist> {
    remote: Arc<dyn RemoteTable>,
    bus: Arc<dyn EventBus>,
    guard: Option<Arc<dyn DeleteGuard>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Persist> Clone for EntityService<E> {
    fn clone(&self) -> Self {
        Self {
            remote: self.remote.clone(),
            bus: self.bus.clone(),
            guard: self.guard.clone(),
            _entity: PhantomData,
        }
    }
}

/// 将写入数据序列化为一行；非对象形态视为无效输入
fn to_row<T: Serialize>(value: &T) -> DomainResult<Row> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(DomainError::invalid_value(format!(
            "write payload must be an object, got {other}"
        ))),
    }
}

impl<E: Persist> EntityService<E> {
    pub fn new(remote: Arc<dyn RemoteTable>, bus: Arc<dyn EventBus>) -> Self {
        Self {
            remote,
            bus,
            guard: None,
            _entity: PhantomData,
        }
    }

    /// 安装删除前置检查
    pub fn with_guard(mut self, guard: Arc<dyn DeleteGuard>) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn bus(&self) -> &Arc<dyn EventBus> {
        &self.bus
    }

    fn publish(&self, change: Change<E>) {
        let event = E::into_event(change);
        let notified = self.bus.emit(event);
        debug!(entity = E::TYPE, notified, "change published");
    }

    /// 读取全部记录；无法归一化的行被跳过
    pub async fn list(&self) -> DomainResult<Vec<E>> {
        let rows = self.remote.select_all(E::TABLE).await?;
        let total = rows.len();
        let mut items: Vec<E> = rows
            .iter()
            .filter_map(|row| match E::from_row(row) {
                Ok(item) => Some(item),
                Err(err) => {
                    warn!(entity = E::TYPE, error = %err, "skipping malformed row");
                    None
                }
            })
            .collect();
        if let Some(order) = E::ORDER {
            items.sort_by(order);
        }
        debug!(entity = E::TYPE, total, loaded = items.len(), "list");
        Ok(items)
    }

    pub async fn find(&self, id: &E::Id) -> DomainResult<E> {
        let rows = self
            .remote
            .select_eq(E::TABLE, "id", &Value::String(id.to_string()))
            .await?;
        let row = rows.first().ok_or_else(|| DomainError::NotFound {
            reason: format!("{} {id}", E::TYPE),
        })?;
        E::from_row(row)
    }

    pub async fn create(&self, draft: E::Draft) -> DomainResult<E> {
        let row = to_row(&draft)?;
        let inserted = self.remote.insert(E::TABLE, row).await?;
        let entity = E::from_row(&inserted)?;
        info!(entity = E::TYPE, id = %entity.id(), "created");

        self.publish(Change::Added(entity.clone()));
        Ok(entity)
    }

    pub async fn update(&self, id: &E::Id, patch: E::Patch) -> DomainResult<E> {
        let row = to_row(&patch)?;
        let updated = self.remote.update(E::TABLE, &id.to_string(), row).await?;
        let entity = E::from_row(&updated)?;
        info!(entity = E::TYPE, id = %entity.id(), "updated");

        self.publish(Change::Updated(entity.clone()));
        Ok(entity)
    }

    pub async fn delete(&self, id: &E::Id) -> DomainResult<()> {
        let key = id.to_string();
        if let Some(guard) = &self.guard {
            guard.check(&key).await?;
        }
        self.remote.delete(E::TABLE, &key).await?;
        info!(entity = E::TYPE, id = %key, "deleted");

        self.publish(Change::Deleted(id.clone()));
        Ok(())
    }

    /// 通知所有镜像其副本可能已过期；没有失效通知的实体返回 `false`
    pub fn invalidate(&self) -> bool {
        match E::INVALIDATED_BY.and_then(Event::notification) {
            Some(event) => {
                info!(entity = E::TYPE, "invalidated");
                self.bus.emit(event);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl<E: Persist> CollectionLoader<E> for EntityService<E> {
    async fn load(&self) -> DomainResult<Vec<E>> {
        self.list().await
    }
}
