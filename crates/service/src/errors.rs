use thiserror::Error;

/// Failure reported by a store implementation; the message is kept for logs only.
#[derive(Debug, Error)]
#[error("store error: {0}")]
pub struct StoreError(pub String);

impl StoreError {
    pub fn new(msg: impl Into<String>) -> Self { Self(msg.into()) }
}

impl From<sea_orm::DbErr> for StoreError {
    fn from(e: sea_orm::DbErr) -> Self { Self(e.to_string()) }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("query failed: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// Caller-recoverable outcomes (bad input or missing row) as opposed to store failures
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServiceError::InvalidArgument(_) | ServiceError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_converts_and_keeps_cause() {
        let err: ServiceError = StoreError::new("connection reset").into();
        assert!(!err.is_client_error());
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn client_errors_are_flagged() {
        assert!(ServiceError::InvalidArgument("id".into()).is_client_error());
        assert!(ServiceError::not_found("service").is_client_error());
        assert_eq!(ServiceError::not_found("service").to_string(), "not found: service not found");
    }
}
