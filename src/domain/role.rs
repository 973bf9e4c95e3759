//! Roles and capabilities
//!
//! Authorization is resolved once per request into a `Capabilities` value;
//! handlers and queries branch on capabilities, never on the raw role.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User role as stored in the users table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Merchant,
    User,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Merchant => "merchant",
            Self::User => "user",
            Self::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "merchant" => Ok(Self::Merchant),
            "user" => Ok(Self::User),
            "staff" => Ok(Self::Staff),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

/// Which plans a caller may see in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanVisibility {
    /// Plans the caller created (merchants)
    CreatedByCaller,
    /// Plans assigned to the caller (users)
    AssignedToCaller,
    /// No plans (staff and anything else)
    None,
}

/// Resolved capabilities of an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub can_create_plans: bool,
    pub can_pay_installments: bool,
    /// May browse the directory of plan-eligible accounts
    pub can_list_users: bool,
    pub plan_visibility: PlanVisibility,
}

impl Capabilities {
    /// Resolve capabilities from a role.
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Merchant => Self {
                can_create_plans: true,
                can_pay_installments: false,
                can_list_users: true,
                plan_visibility: PlanVisibility::CreatedByCaller,
            },
            Role::User => Self {
                can_create_plans: false,
                can_pay_installments: true,
                can_list_users: false,
                plan_visibility: PlanVisibility::AssignedToCaller,
            },
            Role::Staff => Self {
                can_create_plans: false,
                can_pay_installments: false,
                can_list_users: true,
                plan_visibility: PlanVisibility::None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Merchant, Role::User, Role::Staff] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_merchant_capabilities() {
        let caps = Capabilities::for_role(Role::Merchant);
        assert!(caps.can_create_plans);
        assert!(!caps.can_pay_installments);
        assert!(caps.can_list_users);
        assert_eq!(caps.plan_visibility, PlanVisibility::CreatedByCaller);
    }

    #[test]
    fn test_user_capabilities() {
        let caps = Capabilities::for_role(Role::User);
        assert!(!caps.can_create_plans);
        assert!(caps.can_pay_installments);
        assert!(!caps.can_list_users);
        assert_eq!(caps.plan_visibility, PlanVisibility::AssignedToCaller);
    }

    #[test]
    fn test_staff_sees_nothing() {
        let caps = Capabilities::for_role(Role::Staff);
        assert!(!caps.can_create_plans);
        assert!(!caps.can_pay_installments);
        assert!(caps.can_list_users);
        assert_eq!(caps.plan_visibility, PlanVisibility::None);
    }
}
