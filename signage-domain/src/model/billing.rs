use super::Persist;
use crate::coerce::{FromRow, Row, RowReader};
use crate::entity::Entity;
use crate::error::DomainResult;
use crate::value_object::Price;
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingStatus {
    Paid,
    #[default]
    Pending,
    Failed,
    Refunded,
}

/// 账单记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingRecord {
    pub id: String,
    pub organization_id: String,
    pub amount: Price,
    pub status: BillingStatus,
    pub description: Option<String>,
    pub issued_at: DateTime<Utc>,
}

impl Entity for BillingRecord {
    const TYPE: &'static str = "billing-record";
    const TABLE: &'static str = "billing_records";
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl FromRow for BillingRecord {
    fn from_row(row: &Row) -> DomainResult<Self> {
        let r = RowReader::new(Self::TYPE, row);
        // 旧表使用 created_at 作为开票时间
        let issued_at = if row.get("issued_at").is_some_and(|v| !v.is_null()) {
            r.timestamp("issued_at")?
        } else {
            r.timestamp("created_at")?
        };
        Ok(Self {
            id: r.string("id")?,
            organization_id: r.string("organization_id")?,
            amount: r.price("amount")?,
            status: r.variant("status")?,
            description: r.opt_string("description")?,
            issued_at,
        })
    }
}

/// 最新的账单排在前面
fn newest_first(a: &BillingRecord, b: &BillingRecord) -> Ordering {
    b.issued_at.cmp(&a.issued_at)
}

impl Persist for BillingRecord {
    type Draft = BillingDraft;
    type Patch = BillingPatch;

    const ORDER: Option<fn(&Self, &Self) -> Ordering> = Some(newest_first);
}

#[derive(Debug, Clone, Builder, Serialize)]
pub struct BillingDraft {
    #[builder(into)]
    pub organization_id: String,
    pub amount: f64,
    #[builder(default)]
    pub status: BillingStatus,
    #[builder(into)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Builder, Serialize)]
pub struct BillingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BillingStatus>,
    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
