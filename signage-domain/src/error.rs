//! 领域层统一错误定义
//!
//! 聚焦远端读写、前置条件、行数据归一化与事件处理等最小必要集合，
//! 便于应用层统一转换为 `DomainError`。
//!
use crate::remote::RemoteError;
use thiserror::Error;

/// 统一错误类型（领域层最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 序列化/归一化 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
    #[error("parse error: {reason}")]
    Parse { reason: String },
    #[error("coercion failed: entity={entity}, field={field}, reason={reason}")]
    Coercion {
        entity: &'static str,
        field: &'static str,
        reason: String,
    },

    // --- 远端协作方 ---
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),
    #[error("precondition failed: {reason}")]
    Precondition { reason: String },

    // --- 事件系统 ---
    #[error("unknown event type: {0}")]
    UnknownEventType(String),

    // --- 值与状态 ---
    #[error("invalid value: {reason}")]
    InvalidValue { reason: String },
    #[error("not found: {reason}")]
    NotFound { reason: String },
}

impl DomainError {
    pub fn coercion(entity: &'static str, field: &'static str, reason: impl Into<String>) -> Self {
        DomainError::Coercion {
            entity,
            field,
            reason: reason.into(),
        }
    }

    pub fn invalid_value(reason: impl Into<String>) -> Self {
        DomainError::InvalidValue {
            reason: reason.into(),
        }
    }

    /// 是否为远端协作方（或前置条件）造成的失败
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            DomainError::Remote(_) | DomainError::Precondition { .. }
        )
    }
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

impl From<chrono::ParseError> for DomainError {
    fn from(err: chrono::ParseError) -> Self {
        DomainError::Parse {
            reason: err.to_string(),
        }
    }
}
