use crate::coerce::{FromRow, Row, RowReader};
use crate::entity::Entity;
use crate::error::DomainResult;
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 活动日志（后台操作审计）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: String,
    pub actor_id: Option<String>,
    /// 操作名称，如 `create`、`update`、`delete`
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub details: Value,
    pub created_at: DateTime<Utc>,
}

impl Entity for ActivityLog {
    const TYPE: &'static str = "activity-log";
    const TABLE: &'static str = "activity_logs";
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl FromRow for ActivityLog {
    fn from_row(row: &Row) -> DomainResult<Self> {
        let r = RowReader::new(Self::TYPE, row);
        Ok(Self {
            id: r.string("id")?,
            actor_id: r.opt_string("actor_id")?,
            action: r.string("action")?,
            entity_type: r.string("entity_type")?,
            entity_id: r.opt_string("entity_id")?,
            details: r.json("details"),
            created_at: r.timestamp("created_at")?,
        })
    }
}

/// 待写入的活动记录
#[derive(Debug, Clone, Builder, Serialize)]
pub struct NewActivity {
    #[builder(into)]
    pub actor_id: Option<String>,
    #[builder(into)]
    pub action: String,
    #[builder(into)]
    pub entity_type: String,
    #[builder(into)]
    pub entity_id: Option<String>,
    #[builder(default)]
    pub details: Value,
}
