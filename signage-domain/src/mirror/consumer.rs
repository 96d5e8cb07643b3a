//! 镜像消费者（MirrorConsumer）
//!
//! 挂载时先订阅、再加载；加载期间收到的事件被缓存，加载完成后叠加在结果之上，
//! 保证加载与事件之间不丢失变更。之后每个事件都在 `emit` 的调用线程上同步对账。
//!
//! 变化通过 `tokio::sync::watch` 通知：每次有效对账、重新加载或过期标记都会发布新的版本号。
//!
use super::{CollectionLoader, Mirror, MirrorState};
use crate::domain_event::{Change, Event};
use crate::error::{DomainError, DomainResult};
use crate::eventing::{EventBus, EventHandler, HandledEventType, Subscription};
use crate::model::Persist;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

struct Inner<E: Persist> {
    phase: MirrorState,
    mirror: Mirror<E>,
    pending: Vec<Change<E>>,
    stale: bool,
    error: Option<String>,
}

struct Shared<E: Persist> {
    inner: Mutex<Inner<E>>,
    changes: watch::Sender<u64>,
}

impl<E: Persist> Shared<E> {
    fn lock(&self) -> MutexGuard<'_, Inner<E>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.changes.send_modify(|v| *v += 1);
    }

    /// 结束一次加载：写入结果、回放缓存的事件并回到 Ready
    fn settle(&self, loaded: &DomainResult<Vec<E>>, keep_on_error: bool) {
        let mut inner = self.lock();
        match loaded {
            Ok(items) => {
                inner.mirror.replace(items.clone());
                inner.stale = false;
                inner.error = None;
            }
            Err(err) => {
                if !keep_on_error {
                    inner.mirror.clear();
                }
                inner.error = Some(err.to_string());
            }
        }
        let pending = std::mem::take(&mut inner.pending);
        let replayed = pending.len();
        for change in pending {
            inner.mirror.apply(change);
        }
        inner.phase = MirrorState::Ready;
        if replayed > 0 {
            debug!(entity = E::TYPE, replayed, "replayed buffered changes");
        }
        drop(inner);
        self.notify();
    }
}

/// 订阅某一实体增/改/删事件并维护本地副本的消费者
pub struct MirrorConsumer<E: Persist> {
    name: String,
    bus: Arc<dyn EventBus>,
    shared: Arc<Shared<E>>,
    subscription: Option<Subscription>,
}

impl<E: Persist> MirrorConsumer<E> {
    pub fn new(name: impl Into<String>, bus: Arc<dyn EventBus>) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            name: name.into(),
            bus,
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    phase: MirrorState::Unmounted,
                    mirror: Mirror::new(),
                    pending: Vec::new(),
                    stale: false,
                    error: None,
                }),
                changes,
            }),
            subscription: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 订阅并加载；加载失败时进入 Ready、集合为空并记录错误，不会重试
    pub async fn mount(&mut self, loader: &dyn CollectionLoader<E>) {
        if self.state().is_mounted() {
            debug!(mirror = %self.name, "already mounted");
            return;
        }
        {
            let mut inner = self.shared.lock();
            inner.phase = MirrorState::Loading;
            inner.mirror.clear();
            inner.pending.clear();
            inner.stale = false;
            inner.error = None;
        }
        self.shared.notify();

        self.subscription = Some(self.bus.subscribe(Arc::new(MirrorHandler {
            name: format!("mirror:{}", self.name),
            shared: self.shared.clone(),
        })));

        let loaded = loader.load().await;
        if let Err(err) = &loaded {
            warn!(mirror = %self.name, error = %err, "initial load failed");
        }
        self.shared.settle(&loaded, false);
        info!(mirror = %self.name, items = self.len(), "mounted");
    }

    /// 取消订阅并丢弃本地副本
    pub fn unmount(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
        }
        {
            let mut inner = self.shared.lock();
            if !inner.phase.is_mounted() {
                return;
            }
            inner.phase = MirrorState::Unmounted;
            inner.mirror.clear();
            inner.pending.clear();
            inner.stale = false;
        }
        self.shared.notify();
        info!(mirror = %self.name, "unmounted");
    }

    /// 手动重新加载；成功时清除过期与错误标记，失败时保留现有副本
    ///
    /// 返回 `Ok(false)` 表示已有加载在进行，本次调用没有拉取数据。
    pub async fn refresh(&self, loader: &dyn CollectionLoader<E>) -> DomainResult<bool> {
        {
            let mut inner = self.shared.lock();
            let phase = inner.phase;
            match phase {
                MirrorState::Ready => inner.phase = MirrorState::Reconciling,
                MirrorState::Unmounted => {
                    return Err(DomainError::invalid_value(format!(
                        "mirror {} is not mounted",
                        self.name
                    )));
                }
                _ => {
                    debug!(mirror = %self.name, %phase, "refresh skipped");
                    return Ok(false);
                }
            }
        }
        self.shared.notify();

        let loaded = loader.load().await;
        self.shared.settle(&loaded, true);
        match loaded {
            Ok(_) => {
                info!(mirror = %self.name, items = self.len(), "refreshed");
                Ok(true)
            }
            Err(err) => {
                warn!(mirror = %self.name, error = %err, "refresh failed");
                Err(err)
            }
        }
    }

    pub fn state(&self) -> MirrorState {
        self.shared.lock().phase
    }

    pub fn items(&self) -> Vec<E> {
        self.shared.lock().mirror.items().to_vec()
    }

    pub fn get(&self, id: &E::Id) -> Option<E> {
        self.shared.lock().mirror.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.shared.lock().mirror.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 集合本身的修订号
    pub fn revision(&self) -> u64 {
        self.shared.lock().mirror.revision()
    }

    /// 是否收到过失效通知且尚未刷新
    pub fn is_stale(&self) -> bool {
        self.shared.lock().stale
    }

    /// 最近一次加载失败的原因
    pub fn last_error(&self) -> Option<String> {
        self.shared.lock().error.clone()
    }

    /// 变化通知
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.shared.changes.subscribe()
    }
}

struct MirrorHandler<E: Persist> {
    name: String,
    shared: Arc<Shared<E>>,
}

impl<E: Persist> EventHandler for MirrorHandler<E> {
    fn handler_name(&self) -> &str {
        &self.name
    }

    fn handled_event_type(&self) -> HandledEventType {
        let mut kinds = E::KINDS.to_vec();
        kinds.extend(E::INVALIDATED_BY);
        HandledEventType::Many(kinds)
    }

    fn handle(&self, event: &Event) -> anyhow::Result<()> {
        if E::INVALIDATED_BY == Some(event.kind()) {
            let mut inner = self.shared.lock();
            if inner.stale || !inner.phase.is_mounted() {
                return Ok(());
            }
            inner.stale = true;
            drop(inner);
            debug!(handler = %self.name, "marked stale");
            self.shared.notify();
            return Ok(());
        }

        let Some(change) = E::change_of(event) else {
            debug!(handler = %self.name, event_type = event.event_type(), "ignoring foreign payload");
            return Ok(());
        };

        let mut inner = self.shared.lock();
        let phase = inner.phase;
        match phase {
            MirrorState::Unmounted => {}
            MirrorState::Loading | MirrorState::Reconciling => inner.pending.push(change),
            MirrorState::Ready => {
                let id = change.id().to_string();
                if inner.mirror.apply(change) {
                    drop(inner);
                    trace!(handler = %self.name, event_type = event.event_type(), %id, "applied");
                    self.shared.notify();
                } else {
                    trace!(handler = %self.name, event_type = event.event_type(), %id, "no-op");
                }
            }
        }
        Ok(())
    }
}
