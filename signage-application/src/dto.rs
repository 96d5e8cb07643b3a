use serde::Serialize;

/// 数据传输对象（DTO）
///
/// 查询结果的载体，要求可序列化以便直接交给界面层渲染。
pub trait Dto: Serialize + Send + Sync + 'static {}

impl<T> Dto for T where T: Serialize + Send + Sync + 'static {}
