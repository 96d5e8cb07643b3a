use bon::Builder;
use serde::{Deserialize, Serialize};

/// 业务上下文信息：标识一次后台操作的执行者
#[derive(Builder, Default, Debug, Clone, Serialize, Deserialize)]
pub struct BusinessContext {
    /// 关联ID
    correlation_id: Option<String>,
    /// 触发操作的管理员ID
    actor_id: Option<String>,
    /// 触发操作的管理员邮箱
    actor_email: Option<String>,
}

impl BusinessContext {
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn actor_id(&self) -> Option<&str> {
        self.actor_id.as_deref()
    }

    pub fn actor_email(&self) -> Option<&str> {
        self.actor_email.as_deref()
    }
}
