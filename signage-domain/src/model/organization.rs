use super::Persist;
use crate::coerce::{FromRow, Row, RowReader};
use crate::entity::Entity;
use crate::error::DomainResult;
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationStatus {
    #[default]
    Active,
    Trial,
    Suspended,
}

/// 租户组织
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub subscription_plan_id: Option<String>,
    pub status: OrganizationStatus,
    pub created_at: DateTime<Utc>,
}

impl Entity for Organization {
    const TYPE: &'static str = "organization";
    const TABLE: &'static str = "organizations";
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl FromRow for Organization {
    fn from_row(row: &Row) -> DomainResult<Self> {
        let r = RowReader::new(Self::TYPE, row);
        let name = r.string("name")?;
        // 老数据可能没有 slug，按名称推导
        let slug = match r.opt_string("slug")? {
            Some(slug) => slug,
            None => slugify(&name),
        };
        Ok(Self {
            id: r.string("id")?,
            name,
            slug,
            subscription_plan_id: r.opt_string("subscription_plan_id")?,
            status: r.variant("status")?,
            created_at: r.timestamp("created_at")?,
        })
    }
}

impl Persist for Organization {
    type Draft = OrganizationDraft;
    type Patch = OrganizationPatch;
}

fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Debug, Clone, Builder, Serialize)]
pub struct OrganizationDraft {
    #[builder(into)]
    pub name: String,
    #[builder(into)]
    pub slug: String,
    #[builder(into)]
    pub subscription_plan_id: Option<String>,
    #[builder(default)]
    pub status: OrganizationStatus,
}

#[derive(Debug, Clone, Default, Builder, Serialize)]
pub struct OrganizationPatch {
    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_plan_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrganizationStatus>,
}
