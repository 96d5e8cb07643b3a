use signage_domain::error::DomainError;

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("domain: {0}")]
    Domain(#[from] DomainError),

    #[error("validation: {0}")]
    Validation(String),

    #[error("config: {0}")]
    Config(String),

    #[error("handler not found: {0}")]
    HandlerNotFound(&'static str),

    #[error("handler already registered: command={command}")]
    AlreadyRegisteredCommand { command: &'static str },

    #[error("handler already registered: query={query}")]
    AlreadyRegisteredQuery { query: &'static str },

    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}
