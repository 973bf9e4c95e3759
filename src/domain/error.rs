//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

use super::status::InstallmentStatus;

/// Business-rule violations raised by the plan lifecycle engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Installment belongs to a different user (or to no user at all)
    #[error("This installment does not belong to you.")]
    InstallmentNotOwned,

    /// Installment is already paid
    #[error("This installment is already paid.")]
    InstallmentAlreadyPaid,

    /// Installment is in a state that cannot accept payment.
    /// Unreachable given the state machine, kept as a guard against
    /// rows mutated outside the engine.
    #[error("Installment in status {0} cannot be paid.")]
    InstallmentNotPayable(InstallmentStatus),

    /// Caller lacks the capability for this operation
    #[error("You do not have permission to perform this action.")]
    NotPermitted,
}

impl DomainError {
    /// Errors surfaced as validation-style 400s rather than denials.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InstallmentNotOwned
                | Self::InstallmentAlreadyPaid
                | Self::InstallmentNotPayable(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ownership_error_message() {
        let err = DomainError::InstallmentNotOwned;
        assert!(err.is_client_error());
        assert!(err.to_string().contains("does not belong to you"));
    }

    #[test]
    fn test_already_paid_message() {
        let err = DomainError::InstallmentAlreadyPaid;
        assert!(err.is_client_error());
        assert!(err.to_string().contains("already paid"));
    }

    #[test]
    fn test_not_permitted_is_not_client_error() {
        assert!(!DomainError::NotPermitted.is_client_error());
    }
}
