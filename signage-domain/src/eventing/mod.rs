//! 事件子系统（eventing）
//!
//! 提供事件发布/订阅的基础抽象与进程内实现：
//! - `EventBus`：统一发布/订阅接口；
//! - `EventHandler`：对事件进行同步消费处理；
//! - `Subscription` / `EventStream`：可取消的订阅句柄与按类型过滤的事件流；
//! - `InMemoryEventBus`：同步分发、按订阅者隔离失败的内存实现。
//!
pub mod bus;
pub mod bus_inmemory;
pub mod handler;
pub mod subscription;

pub use bus::EventBus;
pub use bus_inmemory::InMemoryEventBus;
pub use handler::{EventHandler, FnHandler, HandledEventType};
pub use subscription::{EventStream, Subscription, SubscriptionId};
