//! Status state machines
//!
//! Installment and plan statuses are stored as TEXT columns; the enums here
//! own the legal transitions so handlers and jobs never compare raw strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Installment status.
///
/// Transitions are monotonic along Pending -> Due -> Late; Paid is reachable
/// from any non-Paid state and terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallmentStatus {
    Pending,
    Due,
    Late,
    Paid,
}

impl InstallmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Due => "Due",
            Self::Late => "Late",
            Self::Paid => "Paid",
        }
    }

    /// An installment can be paid from any state except Paid.
    pub fn is_payable(&self) -> bool {
        matches!(self, Self::Pending | Self::Due | Self::Late)
    }
}

impl fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstallmentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Due" => Ok(Self::Due),
            "Late" => Ok(Self::Late),
            "Paid" => Ok(Self::Paid),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Payment plan status.
///
/// Active -> Paid happens exactly when all installments reach Paid; a plan
/// never returns to Active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanStatus {
    Active,
    Paid,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Paid => "Paid",
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(Self::Active),
            "Paid" => Ok(Self::Paid),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A status string in storage that no enum variant matches.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown status value: {0}")]
pub struct UnknownStatus(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_installment_status_round_trip() {
        for status in [
            InstallmentStatus::Pending,
            InstallmentStatus::Due,
            InstallmentStatus::Late,
            InstallmentStatus::Paid,
        ] {
            assert_eq!(status.as_str().parse::<InstallmentStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_paid_is_terminal() {
        assert!(!InstallmentStatus::Paid.is_payable());
        assert!(InstallmentStatus::Pending.is_payable());
        assert!(InstallmentStatus::Due.is_payable());
        assert!(InstallmentStatus::Late.is_payable());
    }

    #[test]
    fn test_unknown_status_rejected() {
        let result = "Cancelled".parse::<InstallmentStatus>();
        assert!(matches!(result, Err(UnknownStatus(_))));
    }

    #[test]
    fn test_plan_status_round_trip() {
        assert_eq!("Active".parse::<PlanStatus>().unwrap(), PlanStatus::Active);
        assert_eq!("Paid".parse::<PlanStatus>().unwrap(), PlanStatus::Paid);
        assert!("Done".parse::<PlanStatus>().is_err());
    }
}
