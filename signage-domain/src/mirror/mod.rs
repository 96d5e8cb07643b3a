//! 对账消费者（mirror）
//!
//! 视图组件持有集合的私有副本：挂载时加载一次，之后只依靠事件逐条对账，
//! 卸载时取消订阅。事件不会重放，副本是尽力而为的。
//!
mod collection;
mod consumer;
mod feed;
mod loader;
mod state;

pub use collection::Mirror;
pub use consumer::MirrorConsumer;
pub use feed::ActivityFeed;
pub use loader::CollectionLoader;
pub use state::MirrorState;
