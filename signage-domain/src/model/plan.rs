use super::Persist;
use crate::coerce::{FromRow, Row, RowReader};
use crate::entity::Entity;
use crate::error::DomainResult;
use crate::value_object::Price;
use bon::Builder;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// 计费周期
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycle {
    #[default]
    Monthly,
    #[serde(alias = "annual")]
    Yearly,
}

/// 订阅套餐
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub billing_cycle: BillingCycle,
    /// 套餐允许的最大屏幕数
    pub max_screens: u32,
    pub features: Vec<String>,
    pub is_active: bool,
    pub is_popular: bool,
}

impl Entity for SubscriptionPlan {
    const TYPE: &'static str = "subscription-plan";
    const TABLE: &'static str = "subscription_plans";
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl FromRow for SubscriptionPlan {
    fn from_row(row: &Row) -> DomainResult<Self> {
        let r = RowReader::new(Self::TYPE, row);
        Ok(Self {
            id: r.string("id")?,
            name: r.string("name")?,
            description: r.opt_string("description")?,
            price: r.price("price")?,
            billing_cycle: r.variant("billing_cycle")?,
            max_screens: r.count("max_screens", 1)?,
            features: r.list("features")?,
            is_active: r.flag("is_active", true)?,
            is_popular: r.flag("is_popular", false)?,
        })
    }
}

/// 按价格升序，同价按名称
fn by_price(a: &SubscriptionPlan, b: &SubscriptionPlan) -> Ordering {
    a.price
        .cmp_value(&b.price)
        .then_with(|| a.name.cmp(&b.name))
}

impl Persist for SubscriptionPlan {
    type Draft = PlanDraft;
    type Patch = PlanPatch;

    const ORDER: Option<fn(&Self, &Self) -> Ordering> = Some(by_price);
}

/// 新建套餐的写入数据
#[derive(Debug, Clone, Builder, Serialize)]
pub struct PlanDraft {
    #[builder(into)]
    pub name: String,
    #[builder(into)]
    pub description: Option<String>,
    pub price: f64,
    #[builder(default)]
    pub billing_cycle: BillingCycle,
    #[builder(default = 1)]
    pub max_screens: u32,
    #[builder(default)]
    pub features: Vec<String>,
    #[builder(default = true)]
    pub is_active: bool,
    #[builder(default)]
    pub is_popular: bool,
}

/// 套餐的部分更新，未设置的字段不会写入
#[derive(Debug, Clone, Default, Builder, Serialize)]
pub struct PlanPatch {
    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_cycle: Option<BillingCycle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_screens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_popular: Option<bool>,
}
