//! 事件处理器（EventHandler）
//!
//! 定义消费某类/多类/全部事件的处理逻辑与元信息（名称、订阅类型）。
//! 处理器在 `emit` 调用线程上同步执行，应当快速返回。
//!
use crate::domain_event::{Event, EventKind};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandledEventType {
    One(EventKind),
    Many(Vec<EventKind>),
    All,
}

impl HandledEventType {
    pub fn matches(&self, kind: EventKind) -> bool {
        match self {
            HandledEventType::One(k) => *k == kind,
            HandledEventType::Many(ks) => ks.contains(&kind),
            HandledEventType::All => true,
        }
    }
}

/// 事件处理器：处理某一类型的事件
pub trait EventHandler: Send + Sync {
    /// 处理器名称（用于日志与诊断）
    fn handler_name(&self) -> &str;
    /// 返回该处理器订阅的事件类型
    fn handled_event_type(&self) -> HandledEventType;
    /// 处理事件；返回的错误只会被记录，不会影响其他订阅者
    fn handle(&self, event: &Event) -> anyhow::Result<()>;
}

/// 以闭包实现的处理器
pub struct FnHandler<F> {
    name: String,
    types: HandledEventType,
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&Event) -> anyhow::Result<()> + Send + Sync,
{
    pub fn new(name: impl Into<String>, types: HandledEventType, f: F) -> Self {
        Self {
            name: name.into(),
            types,
            f,
        }
    }
}

impl<F> EventHandler for FnHandler<F>
where
    F: Fn(&Event) -> anyhow::Result<()> + Send + Sync,
{
    fn handler_name(&self) -> &str {
        &self.name
    }

    fn handled_event_type(&self) -> HandledEventType {
        self.types.clone()
    }

    fn handle(&self, event: &Event) -> anyhow::Result<()> {
        (self.f)(event)
    }
}
