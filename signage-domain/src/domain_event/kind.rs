use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// 事件种类：不携带载荷的路由键，与事件类型字符串一一对应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    SubscriptionPlanAdded,
    SubscriptionPlanUpdated,
    SubscriptionPlanDeleted,
    OrganizationAdded,
    OrganizationUpdated,
    OrganizationDeleted,
    UserAdded,
    UserUpdated,
    UserDeleted,
    BillingRecordAdded,
    BillingRecordUpdated,
    BillingRecordDeleted,
    ActivityLogged,
    PlansInvalidated,
}

impl EventKind {
    pub const ALL: [EventKind; 14] = [
        EventKind::SubscriptionPlanAdded,
        EventKind::SubscriptionPlanUpdated,
        EventKind::SubscriptionPlanDeleted,
        EventKind::OrganizationAdded,
        EventKind::OrganizationUpdated,
        EventKind::OrganizationDeleted,
        EventKind::UserAdded,
        EventKind::UserUpdated,
        EventKind::UserDeleted,
        EventKind::BillingRecordAdded,
        EventKind::BillingRecordUpdated,
        EventKind::BillingRecordDeleted,
        EventKind::ActivityLogged,
        EventKind::PlansInvalidated,
    ];

    /// 事件类型字符串（形如 `subscription-plan-updated`）
    pub const fn as_str(&self) -> &'static str {
        match self {
            EventKind::SubscriptionPlanAdded => "subscription-plan-added",
            EventKind::SubscriptionPlanUpdated => "subscription-plan-updated",
            EventKind::SubscriptionPlanDeleted => "subscription-plan-deleted",
            EventKind::OrganizationAdded => "organization-added",
            EventKind::OrganizationUpdated => "organization-updated",
            EventKind::OrganizationDeleted => "organization-deleted",
            EventKind::UserAdded => "user-added",
            EventKind::UserUpdated => "user-updated",
            EventKind::UserDeleted => "user-deleted",
            EventKind::BillingRecordAdded => "billing-record-added",
            EventKind::BillingRecordUpdated => "billing-record-updated",
            EventKind::BillingRecordDeleted => "billing-record-deleted",
            EventKind::ActivityLogged => "activity-logged",
            EventKind::PlansInvalidated => "plans-invalidated",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| DomainError::UnknownEventType(s.to_string()))
    }
}
