use crate::error::DomainResult;
use async_trait::async_trait;

/// 镜像加载/刷新时的数据来源
#[async_trait]
pub trait CollectionLoader<E>: Send + Sync {
    async fn load(&self) -> DomainResult<Vec<E>>;
}
