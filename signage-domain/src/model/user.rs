use super::Persist;
use crate::coerce::{FromRow, Row, RowReader};
use crate::entity::Entity;
use crate::error::DomainResult;
use bon::Builder;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    SuperAdmin,
    Admin,
    #[default]
    Member,
}

/// 用户资料（`profiles` 表）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub organization_id: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
}

impl Entity for UserProfile {
    const TYPE: &'static str = "user";
    const TABLE: &'static str = "profiles";
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl FromRow for UserProfile {
    fn from_row(row: &Row) -> DomainResult<Self> {
        let r = RowReader::new(Self::TYPE, row);
        Ok(Self {
            id: r.string("id")?,
            email: r.string("email")?,
            full_name: r.opt_string("full_name")?,
            organization_id: r.opt_string("organization_id")?,
            role: r.variant("role")?,
            is_active: r.flag("is_active", true)?,
        })
    }
}

impl Persist for UserProfile {
    type Draft = UserDraft;
    type Patch = UserPatch;
}

#[derive(Debug, Clone, Builder, Serialize)]
pub struct UserDraft {
    #[builder(into)]
    pub email: String,
    #[builder(into)]
    pub full_name: Option<String>,
    #[builder(into)]
    pub organization_id: Option<String>,
    #[builder(default)]
    pub role: UserRole,
}

#[derive(Debug, Clone, Default, Builder, Serialize)]
pub struct UserPatch {
    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
