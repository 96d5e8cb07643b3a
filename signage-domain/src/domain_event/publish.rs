use super::{Event, EventKind, Removed};
use crate::entity::Entity;
use crate::model::{BillingRecord, Organization, SubscriptionPlan, UserProfile};

/// 一次已确认的实体变更
#[derive(Debug, Clone, PartialEq)]
pub enum Change<E: Entity> {
    Added(E),
    Updated(E),
    Deleted(E::Id),
}

impl<E: Entity> Change<E> {
    /// 变更涉及的实体标识
    pub fn id(&self) -> &E::Id {
        match self {
            Change::Added(e) | Change::Updated(e) => e.id(),
            Change::Deleted(id) => id,
        }
    }
}

/// 实体与其增/改/删事件之间的双向映射
pub trait Publish: Entity {
    /// 本实体对应的 `[added, updated, deleted]` 事件种类
    const KINDS: [EventKind; 3];

    /// 使本实体镜像整体失效的通知事件
    const INVALIDATED_BY: Option<EventKind> = None;

    /// 将变更转换为可发布的事件
    fn into_event(change: Change<Self>) -> Event;

    /// 从事件中提取本实体的变更；不属于本实体的事件返回 `None`
    fn change_of(event: &Event) -> Option<Change<Self>>;
}

macro_rules! impl_publish {
    ($entity:ty, $added:ident, $updated:ident, $deleted:ident $(, invalidated_by = $inv:ident)?) => {
        impl Publish for $entity {
            const KINDS: [EventKind; 3] = [
                EventKind::$added,
                EventKind::$updated,
                EventKind::$deleted,
            ];
            $(const INVALIDATED_BY: Option<EventKind> = Some(EventKind::$inv);)?

            fn into_event(change: Change<Self>) -> Event {
                match change {
                    Change::Added(e) => Event::$added(e),
                    Change::Updated(e) => Event::$updated(e),
                    Change::Deleted(id) => Event::$deleted(Removed::new(id)),
                }
            }

            fn change_of(event: &Event) -> Option<Change<Self>> {
                match event {
                    Event::$added(e) => Some(Change::Added(e.clone())),
                    Event::$updated(e) => Some(Change::Updated(e.clone())),
                    Event::$deleted(r) => r.id.parse().ok().map(Change::Deleted),
                    _ => None,
                }
            }
        }
    };
}

impl_publish!(
    SubscriptionPlan,
    SubscriptionPlanAdded,
    SubscriptionPlanUpdated,
    SubscriptionPlanDeleted,
    invalidated_by = PlansInvalidated
);
impl_publish!(
    Organization,
    OrganizationAdded,
    OrganizationUpdated,
    OrganizationDeleted
);
impl_publish!(UserProfile, UserAdded, UserUpdated, UserDeleted);
impl_publish!(
    BillingRecord,
    BillingRecordAdded,
    BillingRecordUpdated,
    BillingRecordDeleted
);
