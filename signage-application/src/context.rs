use signage_domain::domain_event::BusinessContext;

/// 一次命令或查询的调用方信息
///
/// `biz` 记录关联 ID 与执行操作的管理员，写入活动日志时使用；
/// `idempotency_key` 由上层用于识别重复提交，控制台本身不做判断。
///
/// ```rust
/// use signage_application::context::AppContext;
/// use signage_domain::domain_event::BusinessContext;
///
/// let ctx = AppContext {
///     biz: BusinessContext::builder()
///         .correlation_id("req-7".to_string())
///         .actor_id("admin-1".to_string())
///         .actor_email("ops@example.com".to_string())
///         .build(),
///     idempotency_key: None,
/// };
/// assert_eq!(ctx.actor_id(), Some("admin-1"));
/// assert_eq!(AppContext::for_actor("admin-2").actor_id(), Some("admin-2"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct AppContext {
    pub biz: BusinessContext,
    pub idempotency_key: Option<String>,
}

impl AppContext {
    /// 以管理员身份构造上下文
    pub fn for_actor(actor_id: impl Into<String>) -> Self {
        Self {
            biz: BusinessContext::builder().actor_id(actor_id.into()).build(),
            idempotency_key: None,
        }
    }

    pub fn actor_id(&self) -> Option<&str> {
        self.biz.actor_id()
    }
}
