//! 订阅句柄与事件流
//!
//! `Subscription` 在 `cancel` 或被丢弃时立即注销对应的登记；
//! `EventStream` 持有自己的订阅，按发布顺序产出单一类型的事件。
//!
use crate::domain_event::{Event, EventKind};
use futures_core::Stream;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio_stream::wrappers::UnboundedReceiverStream;

pub type SubscriptionId = u64;

/// 订阅句柄：丢弃即取消
#[must_use = "dropping a Subscription cancels it immediately"]
pub struct Subscription {
    id: SubscriptionId,
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(id: SubscriptionId, cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            id,
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    /// 取消订阅；重复调用无副作用
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// 单一事件类型的订阅流
///
/// 流不会自行结束；`cancel` 之后先产出已缓冲的事件，然后结束。
#[must_use = "streams do nothing unless polled"]
pub struct EventStream {
    kind: EventKind,
    rx: UnboundedReceiverStream<Event>,
    subscription: Subscription,
}

impl EventStream {
    pub(crate) fn new(
        kind: EventKind,
        rx: UnboundedReceiverStream<Event>,
        subscription: Subscription,
    ) -> Self {
        Self {
            kind,
            rx,
            subscription,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_active()
    }

    pub fn cancel(&mut self) {
        self.subscription.cancel();
    }
}

impl Stream for EventStream {
    type Item = Event;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx).poll_next(cx)
    }
}
