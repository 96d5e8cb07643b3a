//! 数字标牌后台管理的应用层（signage-application）
//!
//! - 命令/查询及其总线（`command*`、`query*`、`inmemory_*`）
//! - 通用实体命令与查询（`commands`、`queries`）
//! - 运行配置（`config`）与日志初始化（`logging`）
//! - 组合根 `AdminConsole`（`console`）
//!
pub mod command;
pub mod command_bus;
pub mod command_handler;
pub mod commands;
pub mod config;
pub mod console;
pub mod context;
pub mod dto;
pub mod error;
pub mod inmemory_command_bus;
pub mod inmemory_query_bus;
pub mod logging;
pub mod queries;
pub mod query;
pub mod query_bus;
pub mod query_handler;

pub use console::AdminConsole;
pub use inmemory_command_bus::InMemoryCommandBus;
pub use inmemory_query_bus::InMemoryQueryBus;
