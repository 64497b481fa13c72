//! Caller roles and per-operation permission requirements.
//!
//! A caller's role is computed exactly once per request from the two stored
//! booleans (administrator, technician) and then checked against the
//! [`PermissionRequirement`] an operation declares. Admin-technician is the
//! conjunction of the two flags, not a separate stored state.

use serde::{Deserialize, Serialize};

/// Resolved role of the caller for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// No identity resolved.
    Anonymous,
    /// Authenticated customer with neither staff flag.
    Customer,
    /// Technician flag only.
    Technician,
    /// Administrator flag only.
    Administrator,
    /// Both staff flags.
    AdminTechnician,
}

impl Role {
    /// Resolve a role from the authentication state and the two staff flags.
    #[must_use]
    pub const fn resolve(authenticated: bool, administrator: bool, technician: bool) -> Self {
        match (authenticated, administrator, technician) {
            (false, _, _) => Self::Anonymous,
            (true, true, true) => Self::AdminTechnician,
            (true, true, false) => Self::Administrator,
            (true, false, true) => Self::Technician,
            (true, false, false) => Self::Customer,
        }
    }

    /// True for any resolved identity.
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        !matches!(self, Self::Anonymous)
    }

    /// True when the caller holds the administrator flag.
    #[must_use]
    pub const fn is_administrator(self) -> bool {
        matches!(self, Self::Administrator | Self::AdminTechnician)
    }

    /// True when the caller holds the technician flag.
    #[must_use]
    pub const fn is_technician(self) -> bool {
        matches!(self, Self::Technician | Self::AdminTechnician)
    }

    /// Whether this role may create customers and orders on another
    /// customer's behalf. Only admin-technicians may.
    #[must_use]
    pub const fn can_act_on_behalf_of_customers(self) -> bool {
        matches!(self, Self::AdminTechnician)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => write!(f, "anonymous"),
            Self::Customer => write!(f, "customer"),
            Self::Technician => write!(f, "technician"),
            Self::Administrator => write!(f, "administrator"),
            Self::AdminTechnician => write!(f, "admin_technician"),
        }
    }
}

/// What an operation demands of the caller.
///
/// A value object, never persisted. Operations declare one of the constants
/// below; custom combinations are possible but unused today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PermissionRequirement {
    /// Any resolved identity suffices.
    pub authenticated: bool,
    /// Administrator flag required.
    pub administrator: bool,
    /// Technician flag required.
    pub technician: bool,
    /// Both flags required.
    pub admin_technician: bool,
}

impl PermissionRequirement {
    /// No requirement; the operation is public.
    pub const PUBLIC: Self = Self {
        authenticated: false,
        administrator: false,
        technician: false,
        admin_technician: false,
    };

    /// Any authenticated caller.
    pub const AUTHENTICATED: Self = Self {
        authenticated: true,
        administrator: false,
        technician: false,
        admin_technician: false,
    };

    /// Administrator flag required.
    pub const ADMINISTRATOR: Self = Self {
        authenticated: true,
        administrator: true,
        technician: false,
        admin_technician: false,
    };

    /// Technician flag required.
    pub const TECHNICIAN: Self = Self {
        authenticated: true,
        administrator: false,
        technician: true,
        admin_technician: false,
    };

    /// Both staff flags required.
    pub const ADMIN_TECHNICIAN: Self = Self {
        authenticated: true,
        administrator: false,
        technician: false,
        admin_technician: true,
    };

    const fn demands_anything(self) -> bool {
        self.authenticated || self.administrator || self.technician || self.admin_technician
    }

    /// Check a resolved role against this requirement.
    ///
    /// Never panics and never errors; callers map a denial to a
    /// transport-level rejection.
    #[must_use]
    pub fn check(self, role: Role) -> AccessDecision {
        if !self.demands_anything() {
            return AccessDecision::allowed();
        }

        if !role.is_authenticated() {
            return AccessDecision::denied("authentication required");
        }

        if self.admin_technician && !(role.is_administrator() && role.is_technician()) {
            return AccessDecision::denied("admin-technician role required");
        }

        if self.administrator && !role.is_administrator() {
            return AccessDecision::denied("admin role required");
        }

        if self.technician && !role.is_technician() {
            return AccessDecision::denied("technician role required");
        }

        AccessDecision::allowed()
    }
}

/// Outcome of a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDecision {
    /// Whether the operation may proceed.
    pub allowed: bool,
    /// Denial reason, suitable for the caller and the audit log.
    pub reason: Option<&'static str>,
}

impl AccessDecision {
    const fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    const fn denied(reason: &'static str) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        assert_eq!(Role::resolve(false, true, true), Role::Anonymous);
        assert_eq!(Role::resolve(true, false, false), Role::Customer);
        assert_eq!(Role::resolve(true, false, true), Role::Technician);
        assert_eq!(Role::resolve(true, true, false), Role::Administrator);
        assert_eq!(Role::resolve(true, true, true), Role::AdminTechnician);
    }

    #[test]
    fn test_public_requirement_allows_anonymous() {
        let decision = PermissionRequirement::PUBLIC.check(Role::Anonymous);
        assert!(decision.allowed);
        assert_eq!(decision.reason, None);
    }

    #[test]
    fn test_authentication_required() {
        let decision = PermissionRequirement::AUTHENTICATED.check(Role::Anonymous);
        assert!(!decision.allowed);
        assert_eq!(decision.reason, Some("authentication required"));

        assert!(PermissionRequirement::AUTHENTICATED.check(Role::Customer).allowed);
    }

    #[test]
    fn test_admin_technician_needs_both_flags() {
        let req = PermissionRequirement::ADMIN_TECHNICIAN;
        for role in [Role::Customer, Role::Technician, Role::Administrator] {
            let decision = req.check(role);
            assert!(!decision.allowed);
            assert_eq!(decision.reason, Some("admin-technician role required"));
        }
        assert!(req.check(Role::AdminTechnician).allowed);
    }

    #[test]
    fn test_administrator_requirement() {
        let req = PermissionRequirement::ADMINISTRATOR;
        assert!(req.check(Role::Administrator).allowed);
        assert!(req.check(Role::AdminTechnician).allowed);
        let decision = req.check(Role::Technician);
        assert!(!decision.allowed);
        assert_eq!(decision.reason, Some("admin role required"));
    }

    #[test]
    fn test_technician_requirement() {
        let req = PermissionRequirement::TECHNICIAN;
        assert!(req.check(Role::Technician).allowed);
        assert!(req.check(Role::AdminTechnician).allowed);
        let decision = req.check(Role::Administrator);
        assert!(!decision.allowed);
        assert_eq!(decision.reason, Some("technician role required"));
    }

    #[test]
    fn test_on_behalf_capability_is_admin_technician_only() {
        assert!(Role::AdminTechnician.can_act_on_behalf_of_customers());
        for role in [
            Role::Anonymous,
            Role::Customer,
            Role::Technician,
            Role::Administrator,
        ] {
            assert!(!role.can_act_on_behalf_of_customers());
        }
    }
}
