//! 后台管理的实体模型
//!
//! 每个实体都实现 `Entity`（标识）、`FromRow`（行数据归一化）与 `Publish`
//! （增/改/删事件映射）；可写实体另外实现 `Persist`，声明写入数据的形态。

mod activity;
mod billing;
mod organization;
mod plan;
mod user;

pub use activity::{ActivityLog, NewActivity};
pub use billing::{BillingDraft, BillingPatch, BillingRecord, BillingStatus};
pub use organization::{Organization, OrganizationDraft, OrganizationPatch, OrganizationStatus};
pub use plan::{BillingCycle, PlanDraft, PlanPatch, SubscriptionPlan};
pub use user::{UserDraft, UserPatch, UserProfile, UserRole};

use crate::coerce::FromRow;
use crate::domain_event::Publish;
use serde::Serialize;
use std::cmp::Ordering;

/// 可通过领域服务写入的实体
pub trait Persist: Publish + FromRow {
    /// 新建时的写入数据
    type Draft: Serialize + Send + Sync + 'static;
    /// 部分更新的写入数据
    type Patch: Serialize + Send + Sync + 'static;

    /// 镜像中的排序规则；`None` 表示保持插入顺序
    const ORDER: Option<fn(&Self, &Self) -> Ordering> = None;
}
