use serde::Serialize;
use std::fmt;

/// 镜像消费者的生命周期
///
/// `Unmounted → Loading → Ready ⇄ Reconciling → Unmounted`
///
/// 单个事件的对账在 `emit` 线程上持锁同步完成，不会停留在可观察的中间状态；
/// 因此 `Reconciling` 只表示整个集合正在手动刷新。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MirrorState {
    #[default]
    Unmounted,
    /// 首次加载中，期间收到的事件被缓存
    Loading,
    Ready,
    /// 手动刷新中，期间收到的事件被缓存
    Reconciling,
}

impl MirrorState {
    pub fn is_mounted(self) -> bool {
        self != MirrorState::Unmounted
    }

    /// 是否正在等待远端数据
    pub fn is_fetching(self) -> bool {
        matches!(self, MirrorState::Loading | MirrorState::Reconciling)
    }
}

impl fmt::Display for MirrorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MirrorState::Unmounted => "unmounted",
            MirrorState::Loading => "loading",
            MirrorState::Ready => "ready",
            MirrorState::Reconciling => "reconciling",
        };
        f.write_str(s)
    }
}
