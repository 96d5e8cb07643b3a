//! 只读查询与处理器
//!
use crate::{context::AppContext, error::AppError, query::Query, query_handler::QueryHandler};
use async_trait::async_trait;
use serde::Serialize;
use signage_domain::model::{ActivityLog, Persist};
use signage_domain::service::{ActivityLogger, EntityService};
use std::marker::PhantomData;

/// 列出某类实体的全部记录
pub struct ListEntities<E>(PhantomData<fn() -> E>);

impl<E> ListEntities<E> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E> Default for ListEntities<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Persist + Serialize> Query for ListEntities<E> {
    const NAME: &'static str = "list-entities";
    type Dto = Vec<E>;
}

/// 按标识读取单条记录
pub struct FindEntity<E: Persist> {
    pub id: E::Id,
}

impl<E: Persist> FindEntity<E> {
    pub fn new(id: impl Into<E::Id>) -> Self {
        Self { id: id.into() }
    }
}

impl<E: Persist + Serialize> Query for FindEntity<E> {
    const NAME: &'static str = "find-entity";
    type Dto = E;
}

/// 最近的活动日志（新的在前）
pub struct RecentActivity {
    pub limit: usize,
}

impl Query for RecentActivity {
    const NAME: &'static str = "recent-activity";
    type Dto = Vec<ActivityLog>;
}

pub struct EntityQueryHandler<E: Persist> {
    service: EntityService<E>,
}

impl<E: Persist> EntityQueryHandler<E> {
    pub fn new(service: EntityService<E>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<E: Persist + Serialize> QueryHandler<ListEntities<E>> for EntityQueryHandler<E> {
    async fn handle(&self, _ctx: &AppContext, _q: ListEntities<E>) -> Result<Vec<E>, AppError> {
        Ok(self.service.list().await?)
    }
}

#[async_trait]
impl<E: Persist + Serialize> QueryHandler<FindEntity<E>> for EntityQueryHandler<E> {
    async fn handle(&self, _ctx: &AppContext, q: FindEntity<E>) -> Result<E, AppError> {
        Ok(self.service.find(&q.id).await?)
    }
}

pub struct ActivityQueryHandler {
    logger: ActivityLogger,
}

impl ActivityQueryHandler {
    pub fn new(logger: ActivityLogger) -> Self {
        Self { logger }
    }
}

#[async_trait]
impl QueryHandler<RecentActivity> for ActivityQueryHandler {
    async fn handle(&self, _ctx: &AppContext, q: RecentActivity) -> Result<Vec<ActivityLog>, AppError> {
        Ok(self.logger.recent(q.limit).await?)
    }
}
