use crate::domain_event::Change;
use crate::model::Persist;

/// 集合的本地副本，按事件逐条对账
///
/// - added：标识已存在则忽略，否则追加；配置了排序时插入后稳定重排；
/// - updated：找到则替换，否则忽略；配置了排序时替换后同样重排；
/// - deleted：存在则移除，否则忽略。
///
/// 每次实际变化都会递增 `revision`。
#[derive(Debug, Clone)]
pub struct Mirror<E: Persist> {
    items: Vec<E>,
    revision: u64,
}

impl<E: Persist> Default for Mirror<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            revision: 0,
        }
    }
}

impl<E: Persist> Mirror<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<E>) -> Self {
        let mut mirror = Self::new();
        mirror.replace(items);
        mirror
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: &E::Id) -> Option<&E> {
        self.items.iter().find(|e| e.id() == id)
    }

    fn position(&self, id: &E::Id) -> Option<usize> {
        self.items.iter().position(|e| e.id() == id)
    }

    fn sort(&mut self) {
        if let Some(order) = E::ORDER {
            self.items.sort_by(order);
        }
    }

    /// 整体替换（加载/刷新）
    pub fn replace(&mut self, items: Vec<E>) {
        self.items = items;
        self.sort();
        self.revision += 1;
    }

    pub fn clear(&mut self) {
        if !self.items.is_empty() {
            self.items.clear();
            self.revision += 1;
        }
    }

    /// 应用一次变更，返回集合是否发生变化
    pub fn apply(&mut self, change: Change<E>) -> bool {
        let changed = match change {
            Change::Added(item) => {
                if self.position(item.id()).is_some() {
                    false
                } else {
                    self.items.push(item);
                    self.sort();
                    true
                }
            }
            Change::Updated(item) => match self.position(item.id()) {
                Some(pos) if self.items[pos] != item => {
                    self.items[pos] = item;
                    self.sort();
                    true
                }
                _ => false,
            },
            Change::Deleted(id) => match self.position(&id) {
                Some(pos) => {
                    self.items.remove(pos);
                    true
                }
                None => false,
            },
        };
        if changed {
            self.revision += 1;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Organization, OrganizationStatus, SubscriptionPlan};
    use crate::value_object::Price;
    use chrono::Utc;

    fn plan(id: &str, name: &str, price: f64) -> SubscriptionPlan {
        SubscriptionPlan {
            id: id.into(),
            name: name.into(),
            description: None,
            price: Price::new(price).unwrap(),
            billing_cycle: Default::default(),
            max_screens: 1,
            features: vec![],
            is_active: true,
            is_popular: false,
        }
    }

    fn org(id: &str) -> Organization {
        Organization {
            id: id.into(),
            name: format!("Org {id}"),
            slug: format!("org-{id}"),
            subscription_plan_id: None,
            status: OrganizationStatus::Active,
            created_at: Utc::now(),
        }
    }

    fn ids<E: Persist<Id = String>>(m: &Mirror<E>) -> Vec<&str> {
        m.items().iter().map(|e| e.id().as_str()).collect()
    }

    #[test]
    fn add_is_idempotent_and_sorted_by_price() {
        let mut m = Mirror::with_items(vec![plan("1", "Free", 0.0), plan("3", "Pro", 99.0)]);
        let rev = m.revision();

        assert!(m.apply(Change::Added(plan("2", "Standard", 29.99))));
        assert_eq!(ids(&m), vec!["1", "2", "3"]);

        assert!(!m.apply(Change::Added(plan("2", "Renamed", 5.0))));
        assert_eq!(m.len(), 3);
        assert_eq!(m.get(&"2".to_string()).unwrap().name, "Standard");
        assert_eq!(m.revision(), rev + 1);
    }

    #[test]
    fn unordered_entities_append() {
        let mut m = Mirror::with_items(vec![org("b")]);
        m.apply(Change::Added(org("a")));
        assert_eq!(ids(&m), vec!["b", "a"]);
    }

    #[test]
    fn update_replaces_in_place_or_misses() {
        let mut m = Mirror::with_items(vec![org("a"), org("b")]);
        let mut renamed = org("a");
        renamed.name = "Acme".into();

        assert!(m.apply(Change::Updated(renamed.clone())));
        assert_eq!(m.items()[0], renamed);
        assert_eq!(ids(&m), vec!["a", "b"]);

        let rev = m.revision();
        assert!(!m.apply(Change::Updated(org("z"))));
        assert!(!m.apply(Change::Updated(renamed)));
        assert_eq!(m.revision(), rev);
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn price_change_keeps_plans_in_price_order() {
        let mut m = Mirror::with_items(vec![
            plan("1", "Free", 0.0),
            plan("2", "Standard", 29.99),
            plan("3", "Pro", 99.0),
        ]);

        assert!(m.apply(Change::Updated(plan("2", "Standard", 149.0))));
        assert_eq!(ids(&m), vec!["1", "3", "2"]);

        assert!(m.apply(Change::Updated(plan("3", "Pro", 0.5))));
        assert_eq!(ids(&m), vec!["1", "3", "2"]);

        assert!(m.apply(Change::Updated(plan("1", "Free", 10.0))));
        assert_eq!(ids(&m), vec!["3", "1", "2"]);
    }

    #[test]
    fn delete_removes_or_misses() {
        let mut m = Mirror::with_items(vec![org("a"), org("b")]);
        assert!(m.apply(Change::Deleted("a".into())));
        assert!(!m.apply(Change::Deleted("a".into())));
        assert_eq!(ids(&m), vec!["b"]);
    }
}
