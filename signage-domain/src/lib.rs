//! 数字标牌后台管理的领域层（signage-domain）
//!
//! 提供后台管理控制台的核心构件：
//! - 实体模型（`model`）与行数据归一化（`coerce`）
//! - 强类型事件（`domain_event`）与同步进程内事件总线（`eventing`）
//! - 托管后端的端口与内存实现（`remote`）
//! - 写入后仅在成功时发布事件的领域服务（`service`）
//! - 订阅事件并维护本地副本的镜像消费者（`mirror`）
//!
//! 典型用法：
//! 1. 创建一个 `InMemoryEventBus` 并以 `Arc<dyn EventBus>` 注入各组件；
//! 2. 以 `RemoteTable` 实现构建 `EntityService`；
//! 3. 为需要本地副本的视图挂载 `MirrorConsumer`，服务写入成功后镜像自动对账。
//!
pub mod coerce;
pub mod domain_event;
pub mod entity;
pub mod error;
pub mod eventing;
pub mod mirror;
pub mod model;
pub mod remote;
pub mod service;
pub mod value_object;
