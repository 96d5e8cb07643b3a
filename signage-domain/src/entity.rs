//! 实体（Entity）基础抽象
//!
//! 为后端表中的每一类记录提供统一的类型名、表名与标识（Id）能力。
//!
use std::{fmt, hash::Hash, str::FromStr};

/// 具备唯一标识的实体抽象
pub trait Entity: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// 实体类型名（同时作为事件类型前缀，如 `subscription-plan`）
    const TYPE: &'static str;

    /// 后端表名
    const TABLE: &'static str;

    /// 实体标识类型，要求可解析、可显示与可比较
    type Id: FromStr + Clone + Eq + Hash + fmt::Display + fmt::Debug + Send + Sync + 'static;

    /// 获取实体标识
    fn id(&self) -> &Self::Id;
}
