use crate::dto::Dto;

/// 应用层查询（Query）
///
/// 表达只读意图，不改变后端数据，也不发布事件。
pub trait Query: Send + Sync + 'static {
    /// 查询的稳定名称（建议常量字符串，不随重构变化）
    const NAME: &'static str;

    /// 查询返回的数据
    type Dto: Dto;
}
