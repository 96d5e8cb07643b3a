/// 应用层命令（Command）
///
/// 表达“意图”的写操作请求，会修改后端数据并在成功后发布事件。
/// - `Output` 为写入后的结果（如归一化后的实体）；
/// - 建议保持语义化的“动宾结构”命名，如 `CreateEntity`、`DeleteEntity`。
///
/// 关联常量：
/// - `NAME`：命令的稳定名称，用于日志与诊断。避免依赖 `type_name::<T>()`。
pub trait Command: Send + Sync + 'static {
    /// 命令的稳定名称（建议常量字符串，不随重构变化）
    const NAME: &'static str;

    /// 命令执行成功后的返回值
    type Output: Send + 'static;
}
