use super::EventKind;
use crate::model::{ActivityLog, BillingRecord, Organization, SubscriptionPlan, UserProfile};
use serde::{Deserialize, Serialize};

/// 删除事件的载荷：仅携带被删除实体的标识
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Removed {
    pub id: String,
}

impl Removed {
    pub fn new(id: impl ToString) -> Self {
        Self { id: id.to_string() }
    }
}

/// 领域事件：每个变体对应一种事件类型，并携带强类型载荷
///
/// 序列化形态为 `{"type": "...", "payload": ...}`，通知类事件没有 `payload`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum Event {
    SubscriptionPlanAdded(SubscriptionPlan),
    SubscriptionPlanUpdated(SubscriptionPlan),
    SubscriptionPlanDeleted(Removed),
    OrganizationAdded(Organization),
    OrganizationUpdated(Organization),
    OrganizationDeleted(Removed),
    UserAdded(UserProfile),
    UserUpdated(UserProfile),
    UserDeleted(Removed),
    BillingRecordAdded(BillingRecord),
    BillingRecordUpdated(BillingRecord),
    BillingRecordDeleted(Removed),
    ActivityLogged(ActivityLog),
    PlansInvalidated,
}

impl Event {
    /// 事件种类（路由键），构造后不可变
    pub fn kind(&self) -> EventKind {
        match self {
            Event::SubscriptionPlanAdded(_) => EventKind::SubscriptionPlanAdded,
            Event::SubscriptionPlanUpdated(_) => EventKind::SubscriptionPlanUpdated,
            Event::SubscriptionPlanDeleted(_) => EventKind::SubscriptionPlanDeleted,
            Event::OrganizationAdded(_) => EventKind::OrganizationAdded,
            Event::OrganizationUpdated(_) => EventKind::OrganizationUpdated,
            Event::OrganizationDeleted(_) => EventKind::OrganizationDeleted,
            Event::UserAdded(_) => EventKind::UserAdded,
            Event::UserUpdated(_) => EventKind::UserUpdated,
            Event::UserDeleted(_) => EventKind::UserDeleted,
            Event::BillingRecordAdded(_) => EventKind::BillingRecordAdded,
            Event::BillingRecordUpdated(_) => EventKind::BillingRecordUpdated,
            Event::BillingRecordDeleted(_) => EventKind::BillingRecordDeleted,
            Event::ActivityLogged(_) => EventKind::ActivityLogged,
            Event::PlansInvalidated => EventKind::PlansInvalidated,
        }
    }

    /// 事件类型字符串
    pub fn event_type(&self) -> &'static str {
        self.kind().as_str()
    }

    /// 是否为不带载荷的通知事件
    pub fn is_notification(&self) -> bool {
        matches!(self, Event::PlansInvalidated)
    }

    /// 由种类构造通知事件；带载荷的种类返回 `None`
    pub fn notification(kind: EventKind) -> Option<Event> {
        match kind {
            EventKind::PlansInvalidated => Some(Event::PlansInvalidated),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BillingCycle, SubscriptionPlan};
    use crate::value_object::Price;
    use serde_json::json;

    #[test]
    fn wire_shape_is_type_and_payload() {
        let ev = Event::SubscriptionPlanDeleted(Removed::new("2"));
        assert_eq!(
            serde_json::to_value(&ev).unwrap(),
            json!({"type": "subscription-plan-deleted", "payload": {"id": "2"}})
        );

        let note = serde_json::to_value(Event::PlansInvalidated).unwrap();
        assert_eq!(note, json!({"type": "plans-invalidated"}));
    }

    #[test]
    fn kind_matches_serialized_type_tag() {
        let plan = SubscriptionPlan {
            id: "2".into(),
            name: "Standard".into(),
            description: None,
            price: Price::new(29.99).unwrap(),
            billing_cycle: BillingCycle::Monthly,
            max_screens: 10,
            features: vec!["Analytics".into()],
            is_active: true,
            is_popular: false,
        };
        let ev = Event::SubscriptionPlanUpdated(plan);
        let value = serde_json::to_value(&ev).unwrap();
        assert_eq!(value["type"], ev.event_type());
        assert!(!ev.is_notification());

        let back: Event = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(back, ev);

        let mut tampered = value;
        tampered["payload"]["price"] = json!(-1.0);
        assert!(serde_json::from_value::<Event>(tampered).is_err());
    }
}
