//! 内存版事件总线（InMemoryEventBus）
//!
//! 进程内、同步分发的事件总线，满足 `EventBus` 协议：
//! - `emit`：在调用线程上按登记顺序逐个调用匹配的处理器；
//! - 每个处理器在独立的失败边界内执行，错误或 panic 只记录日志，不影响后续订阅者；
//! - 分发期间不持有登记表的锁，处理器可以重入地 `emit` 或取消订阅；
//! - 事件不排队、不持久化，登记之前发布的事件不会被补发。
//!
use super::handler::HandledEventType;
use super::subscription::SubscriptionId;
use super::{EventBus, EventHandler, EventStream, Subscription};
use crate::domain_event::{Event, EventKind};
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, trace, warn};

/// 简单的内存事件总线实现；克隆得到的句柄共享同一登记表
#[derive(Clone, Default)]
pub struct InMemoryEventBus {
    registry: Arc<Mutex<HandlerRegistry>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_registered(&self, id: SubscriptionId) -> bool {
        lock(&self.registry).entries.contains_key(&id)
    }
}

fn lock(registry: &Mutex<HandlerRegistry>) -> MutexGuard<'_, HandlerRegistry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl EventBus for InMemoryEventBus {
    fn emit(&self, event: Event) -> usize {
        let kind = event.kind();
        let targets = lock(&self.registry).matching(kind);
        debug!(event_type = %kind, subscribers = targets.len(), "emit");

        let mut notified = 0;
        for (id, handler) in targets {
            // 前序处理器可能已取消该订阅
            if !self.is_registered(id) {
                trace!(subscription = id, "skip cancelled subscription");
                continue;
            }
            notified += 1;

            match catch_unwind(AssertUnwindSafe(|| handler.handle(&event))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(
                    handler = handler.handler_name(),
                    event_type = %kind,
                    error = %err,
                    "event handler failed"
                ),
                Err(payload) => warn!(
                    handler = handler.handler_name(),
                    event_type = %kind,
                    panic = %panic_message(payload.as_ref()),
                    "event handler panicked"
                ),
            }
        }
        notified
    }

    fn subscribe(&self, handler: Arc<dyn EventHandler>) -> Subscription {
        let name = handler.handler_name().to_string();
        let types = handler.handled_event_type();
        debug!(handler = %name, types = ?types, "subscribe");

        let id = lock(&self.registry).insert(types, handler);
        let registry = Arc::downgrade(&self.registry);

        Subscription::new(id, move || {
            if let Some(registry) = registry.upgrade() {
                if lock(&registry).entries.remove(&id).is_some() {
                    debug!(handler = %name, subscription = id, "unsubscribe");
                }
            }
        })
    }

    fn on(&self, kind: EventKind) -> EventStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = self.subscribe(Arc::new(ChannelHandler {
            name: format!("stream:{kind}"),
            kind,
            tx,
        }));
        EventStream::new(kind, UnboundedReceiverStream::new(rx), subscription)
    }

    fn subscriber_count(&self, kind: EventKind) -> usize {
        lock(&self.registry)
            .entries
            .values()
            .filter(|r| r.types.matches(kind))
            .count()
    }
}

/// 登记表：按订阅 id（单调递增）排序，遍历顺序即登记顺序
#[derive(Default)]
struct HandlerRegistry {
    next_id: SubscriptionId,
    entries: BTreeMap<SubscriptionId, Registration>,
}

struct Registration {
    types: HandledEventType,
    handler: Arc<dyn EventHandler>,
}

impl HandlerRegistry {
    fn insert(&mut self, types: HandledEventType, handler: Arc<dyn EventHandler>) -> SubscriptionId {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.insert(id, Registration { types, handler });
        id
    }

    fn matching(&self, kind: EventKind) -> Vec<(SubscriptionId, Arc<dyn EventHandler>)> {
        self.entries
            .iter()
            .filter(|(_, r)| r.types.matches(kind))
            .map(|(id, r)| (*id, r.handler.clone()))
            .collect()
    }
}

/// `on` 使用的处理器：把事件转发到流的接收端
struct ChannelHandler {
    name: String,
    kind: EventKind,
    tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler for ChannelHandler {
    fn handler_name(&self) -> &str {
        &self.name
    }

    fn handled_event_type(&self) -> HandledEventType {
        HandledEventType::One(self.kind)
    }

    fn handle(&self, event: &Event) -> anyhow::Result<()> {
        // 接收端已被丢弃时订阅也会随之注销，这里忽略发送失败
        let _ = self.tx.send(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_event::Removed;
    use crate::eventing::FnHandler;
    use futures_util::{FutureExt, StreamExt};
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Log = Arc<Mutex<Vec<(String, Event)>>>;

    fn spy(name: &str, types: HandledEventType, log: &Log) -> Arc<dyn EventHandler> {
        let log = log.clone();
        let tag = name.to_string();
        Arc::new(FnHandler::new(name, types, move |ev: &Event| {
            log.lock().unwrap().push((tag.clone(), ev.clone()));
            Ok(())
        }))
    }

    fn deleted(id: &str) -> Event {
        Event::SubscriptionPlanDeleted(Removed::new(id))
    }

    fn names(log: &Log) -> Vec<String> {
        log.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }

    #[test]
    fn fan_out_reaches_every_subscriber_in_registration_order() {
        for n in [0usize, 1, 3] {
            let bus = InMemoryEventBus::new();
            let log: Log = Arc::default();
            let _subs: Vec<Subscription> = (0..n)
                .map(|i| {
                    bus.subscribe(spy(
                        &format!("h{i}"),
                        HandledEventType::One(EventKind::SubscriptionPlanDeleted),
                        &log,
                    ))
                })
                .collect();

            let ev = deleted("1");
            assert_eq!(bus.emit(ev.clone()), n);

            let seen = log.lock().unwrap().clone();
            assert_eq!(seen.len(), n);
            for (i, (name, got)) in seen.iter().enumerate() {
                assert_eq!(name, &format!("h{i}"));
                assert_eq!(got, &ev);
            }
        }
    }

    #[test]
    fn other_types_are_never_delivered() {
        let bus = InMemoryEventBus::new();
        let log: Log = Arc::default();
        let _a = bus.subscribe(spy(
            "plans",
            HandledEventType::One(EventKind::SubscriptionPlanDeleted),
            &log,
        ));
        let _b = bus.subscribe(spy(
            "orgs",
            HandledEventType::Many(vec![
                EventKind::OrganizationDeleted,
                EventKind::OrganizationAdded,
            ]),
            &log,
        ));
        let _c = bus.subscribe(spy("all", HandledEventType::All, &log));

        bus.emit(Event::OrganizationDeleted(Removed::new("o-1")));
        assert_eq!(names(&log), vec!["orgs", "all"]);
    }

    #[test]
    fn order_is_preserved_per_subscriber() {
        let bus = InMemoryEventBus::new();
        let log: Log = Arc::default();
        let _s = bus.subscribe(spy("h", HandledEventType::All, &log));

        bus.emit(deleted("1"));
        bus.emit(deleted("2"));
        bus.emit(deleted("3"));

        let ids: Vec<Event> = log.lock().unwrap().iter().map(|(_, e)| e.clone()).collect();
        assert_eq!(ids, vec![deleted("1"), deleted("2"), deleted("3")]);
    }

    #[test]
    fn cancelled_subscription_stops_receiving() {
        let bus = InMemoryEventBus::new();
        let log: Log = Arc::default();
        let mut a = bus.subscribe(spy("a", HandledEventType::All, &log));
        let _b = bus.subscribe(spy("b", HandledEventType::All, &log));

        a.cancel();
        a.cancel();
        assert!(!a.is_active());

        bus.emit(deleted("1"));
        bus.emit(Event::PlansInvalidated);
        assert_eq!(names(&log), vec!["b", "b"]);
        assert_eq!(bus.subscriber_count(EventKind::PlansInvalidated), 1);
    }

    #[test]
    fn dropping_subscription_unregisters() {
        let bus = InMemoryEventBus::new();
        let log: Log = Arc::default();
        {
            let _s = bus.subscribe(spy("a", HandledEventType::All, &log));
            assert_eq!(bus.subscriber_count(EventKind::UserAdded), 1);
        }
        assert_eq!(bus.subscriber_count(EventKind::UserAdded), 0);
        assert_eq!(bus.emit(deleted("1")), 0);
    }

    #[test]
    fn failing_or_panicking_handler_does_not_block_others() {
        let bus = InMemoryEventBus::new();
        let log: Log = Arc::default();
        let _e = bus.subscribe(Arc::new(FnHandler::new(
            "errs",
            HandledEventType::All,
            |_: &Event| anyhow::bail!("bad payload"),
        )));
        let _p = bus.subscribe(Arc::new(FnHandler::new(
            "panics",
            HandledEventType::All,
            |_: &Event| -> anyhow::Result<()> { panic!("boom") },
        )));
        let _ok = bus.subscribe(spy("ok", HandledEventType::All, &log));

        assert_eq!(bus.emit(deleted("1")), 3);
        assert_eq!(names(&log), vec!["ok"]);
    }

    #[test]
    fn handler_may_cancel_a_later_subscription_mid_dispatch() {
        let bus = InMemoryEventBus::new();
        let log: Log = Arc::default();
        let victim: Arc<Mutex<Option<Subscription>>> = Arc::default();

        let v = victim.clone();
        let _first = bus.subscribe(Arc::new(FnHandler::new(
            "canceller",
            HandledEventType::All,
            move |_: &Event| {
                if let Some(mut s) = v.lock().unwrap().take() {
                    s.cancel();
                }
                Ok(())
            },
        )));
        *victim.lock().unwrap() = Some(bus.subscribe(spy("victim", HandledEventType::All, &log)));

        assert_eq!(bus.emit(deleted("1")), 1);
        assert!(names(&log).is_empty());
    }

    #[test]
    fn handler_may_emit_reentrantly() {
        let bus = InMemoryEventBus::new();
        let count = Arc::new(AtomicUsize::new(0));

        let inner_bus = bus.clone();
        let _relay = bus.subscribe(Arc::new(FnHandler::new(
            "relay",
            HandledEventType::One(EventKind::SubscriptionPlanDeleted),
            move |_: &Event| {
                inner_bus.emit(Event::PlansInvalidated);
                Ok(())
            },
        )));
        let c = count.clone();
        let _sink = bus.subscribe(Arc::new(FnHandler::new(
            "sink",
            HandledEventType::One(EventKind::PlansInvalidated),
            move |_: &Event| {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        )));

        bus.emit(deleted("1"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stream_yields_matching_events_in_order_until_cancelled() {
        let bus = InMemoryEventBus::new();
        let mut stream = bus.on(EventKind::SubscriptionPlanDeleted);
        let mut other = bus.on(EventKind::SubscriptionPlanDeleted);
        assert_eq!(stream.kind(), EventKind::SubscriptionPlanDeleted);

        bus.emit(deleted("1"));
        bus.emit(Event::PlansInvalidated);
        bus.emit(deleted("2"));

        assert_eq!(stream.next().await, Some(deleted("1")));
        assert_eq!(stream.next().await, Some(deleted("2")));
        assert!(stream.next().now_or_never().is_none());

        // 取消一个流不影响另一个
        stream.cancel();
        assert_eq!(stream.next().await, None);
        bus.emit(deleted("3"));
        assert_eq!(other.next().await, Some(deleted("1")));
        assert_eq!(other.next().await, Some(deleted("2")));
        assert_eq!(other.next().await, Some(deleted("3")));
        assert!(other.is_active());
    }

    #[tokio::test]
    async fn stream_by_type_string() {
        let bus = InMemoryEventBus::new();
        let mut stream = bus.on_type("plans-invalidated").unwrap();
        bus.emit(Event::PlansInvalidated);
        assert_eq!(stream.next().await, Some(Event::PlansInvalidated));

        assert!(bus.on_type("plan-renamed").is_err());
    }
}
