//! 领域服务（Domain Service）
//!
//! 每个服务先完成一次远端写入，把返回的行归一化为实体，
//! 只有在整个过程成功后才发布对应的事件；任何失败都原样返回给调用方，不产生事件。
//!
mod activity;
mod entity_service;
mod guard;

pub use activity::ActivityLogger;
pub use entity_service::EntityService;
pub use guard::{DeleteGuard, ReferenceGuard};

use async_trait::async_trait;

/// 领域服务：以输入/输出/错误描述的一次异步业务操作
#[async_trait]
pub trait DomainService: Send + Sync {
    type Input;
    type Output;
    type Error;

    async fn execute(&self, input: Self::Input) -> Result<Self::Output, Self::Error>;
}
