//! 事件总线（EventBus）协议
//!
//! 定义进程内事件发布与订阅的统一抽象。总线由组合根显式创建并注入
//! 各生产者与消费者；分发是同步的，`emit` 返回前所有匹配的订阅者都已被调用。
//!
use super::{EventHandler, EventStream, Subscription};
use crate::domain_event::{Event, EventKind};
use crate::error::DomainResult as Result;
use std::sync::Arc;

/// 事件总线：负责分发事件与登记订阅
pub trait EventBus: Send + Sync {
    /// 按登记顺序同步通知所有匹配的订阅者，返回被通知的订阅数
    fn emit(&self, event: Event) -> usize;

    /// 登记处理器，返回的句柄被取消或丢弃时注销
    fn subscribe(&self, handler: Arc<dyn EventHandler>) -> Subscription;

    /// 返回只包含 `kind` 类型事件的独立事件流
    fn on(&self, kind: EventKind) -> EventStream;

    /// 当前匹配 `kind` 的订阅数
    fn subscriber_count(&self, kind: EventKind) -> usize;

    /// 以事件类型字符串订阅（如 `subscription-plan-updated`）
    fn on_type(&self, event_type: &str) -> Result<EventStream> {
        Ok(self.on(event_type.parse()?))
    }
}
