//! 领域事件（Domain Event）
//!
//! 定义在事件总线上流转的封闭事件集合（`Event`）、其路由键（`EventKind`），
//! 以及实体与增/改/删事件之间的映射（`Publish`、`Change`）。

mod business_context;
mod event;
mod kind;
mod publish;

pub use business_context::BusinessContext;
pub use event::{Event, Removed};
pub use kind::EventKind;
pub use publish::{Change, Publish};
