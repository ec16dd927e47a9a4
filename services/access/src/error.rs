use eventrax_errors::AppError;
use thiserror::Error;

use crate::domain::policy::{Decision, ErrorKind};

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("{kind}: {message}")]
    Denied { kind: ErrorKind, message: String },
}

impl AccessError {
    pub fn denied(kind: ErrorKind, message: impl Into<String>) -> Self {
        AccessError::Denied {
            kind,
            message: message.into(),
        }
    }

    /// 拒绝决策转为错误，允许决策返回 `None`
    pub fn from_decision(decision: &Decision) -> Option<Self> {
        if decision.allowed {
            return None;
        }
        let kind = decision.reason.unwrap_or(ErrorKind::InsufficientOwnership);
        let message = decision
            .message
            .clone()
            .unwrap_or_else(|| "Access denied".to_string());
        Some(AccessError::denied(kind, message))
    }
}

impl From<AccessError> for AppError {
    fn from(error: AccessError) -> Self {
        match error {
            AccessError::Denied { kind, message } => match kind {
                ErrorKind::Unauthenticated => AppError::Unauthenticated(message),
                ErrorKind::NotFound => AppError::NotFound(message),
                ErrorKind::ForbiddenStatus
                | ErrorKind::InsufficientOwnership
                | ErrorKind::RoleScopeViolation
                | ErrorKind::SelfModificationDenied
                | ErrorKind::AdminImmune => AppError::Forbidden(format!("{}: {}", kind, message)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denials_map_to_transport_status() {
        let cases = [
            (ErrorKind::Unauthenticated, 401),
            (ErrorKind::ForbiddenStatus, 403),
            (ErrorKind::InsufficientOwnership, 403),
            (ErrorKind::RoleScopeViolation, 403),
            (ErrorKind::SelfModificationDenied, 403),
            (ErrorKind::AdminImmune, 403),
            (ErrorKind::NotFound, 404),
        ];
        for (kind, status) in cases {
            let error: AppError = AccessError::denied(kind, "denied").into();
            assert_eq!(error.status_code(), status, "{}", kind);
        }
    }

    #[test]
    fn test_forbidden_message_keeps_reason() {
        let error: AppError = AccessError::denied(ErrorKind::AdminImmune, "nope").into();
        assert!(matches!(error, AppError::Forbidden(ref msg) if msg == "AdminImmune: nope"));
    }

    #[test]
    fn test_allowed_decision_is_not_an_error() {
        assert!(AccessError::from_decision(&Decision::allow()).is_none());
        let denied = Decision::deny(ErrorKind::NotFound, "Event not found");
        assert!(matches!(
            AccessError::from_decision(&denied),
            Some(AccessError::Denied {
                kind: ErrorKind::NotFound,
                ..
            })
        ));
    }
}
