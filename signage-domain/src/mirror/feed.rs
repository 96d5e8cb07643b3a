use super::CollectionLoader;
use crate::domain_event::{Event, EventKind};
use crate::eventing::{EventBus, EventHandler, HandledEventType, Subscription};
use crate::model::ActivityLog;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Default)]
struct FeedEntries {
    limit: usize,
    entries: Vec<ActivityLog>,
    error: Option<String>,
}

impl FeedEntries {
    /// 合并并保持“按时间倒序、去重、最多 limit 条”
    fn merge(&mut self, logs: impl IntoIterator<Item = ActivityLog>) -> bool {
        let before = self.entries.len();
        let mut added = false;
        for log in logs {
            if !self.entries.iter().any(|e| e.id == log.id) {
                self.entries.push(log);
                added = true;
            }
        }
        self.entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.entries.truncate(self.limit);
        added || self.entries.len() != before
    }
}

/// 最近活动列表：订阅 `activity-logged`，保留最新的 N 条
pub struct ActivityFeed {
    bus: Arc<dyn EventBus>,
    shared: Arc<Mutex<FeedEntries>>,
    changes: Arc<watch::Sender<u64>>,
    subscription: Option<Subscription>,
}

fn lock(shared: &Mutex<FeedEntries>) -> MutexGuard<'_, FeedEntries> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ActivityFeed {
    pub fn new(bus: Arc<dyn EventBus>, limit: usize) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            bus,
            shared: Arc::new(Mutex::new(FeedEntries {
                limit,
                ..Default::default()
            })),
            changes: Arc::new(changes),
            subscription: None,
        }
    }

    pub async fn mount(&mut self, loader: &dyn CollectionLoader<ActivityLog>) {
        if self.subscription.is_some() {
            return;
        }
        self.subscription = Some(self.bus.subscribe(Arc::new(FeedHandler {
            shared: self.shared.clone(),
            changes: self.changes.clone(),
        })));

        let loaded = loader.load().await;
        {
            let mut g = lock(&self.shared);
            match loaded {
                Ok(logs) => {
                    g.merge(logs);
                    g.error = None;
                }
                Err(err) => {
                    warn!(error = %err, "activity feed load failed");
                    g.error = Some(err.to_string());
                }
            }
        }
        self.changes.send_modify(|v| *v += 1);
        info!(entries = self.len(), "activity feed mounted");
    }

    pub fn unmount(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
            lock(&self.shared).entries.clear();
            self.changes.send_modify(|v| *v += 1);
            info!("activity feed unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// 最新的在前
    pub fn entries(&self) -> Vec<ActivityLog> {
        lock(&self.shared).entries.clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.shared).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last_error(&self) -> Option<String> {
        lock(&self.shared).error.clone()
    }

    pub fn changes(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }
}

struct FeedHandler {
    shared: Arc<Mutex<FeedEntries>>,
    changes: Arc<watch::Sender<u64>>,
}

impl EventHandler for FeedHandler {
    fn handler_name(&self) -> &str {
        "activity-feed"
    }

    fn handled_event_type(&self) -> HandledEventType {
        HandledEventType::One(EventKind::ActivityLogged)
    }

    fn handle(&self, event: &Event) -> anyhow::Result<()> {
        let Event::ActivityLogged(log) = event else {
            return Ok(());
        };
        let changed = lock(&self.shared).merge([log.clone()]);
        if changed {
            self.changes.send_modify(|v| *v += 1);
        }
        Ok(())
    }
}
