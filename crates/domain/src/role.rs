use std::collections::BTreeSet;
use std::str::FromStr;

use stafflow_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::navigation::navigation_catalog;
use crate::security::Permission;

/// Organizational roles. A user holds exactly one role at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full administrative access.
    Admin,
    /// Near-administrative access with explicit carve-outs.
    SubAdmin,
    /// Human-resources staff.
    Hr,
    /// Leads one or more teams; scoped to team members.
    TeamLead,
    /// Regular employee; scoped to own records.
    Employee,
    /// Business development; employee scope plus the CRM surface.
    BusinessDevelopment,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::SubAdmin => "sub_admin",
            Self::Hr => "hr",
            Self::TeamLead => "team_lead",
            Self::Employee => "employee",
            Self::BusinessDevelopment => "business_development",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[
            Role::Admin,
            Role::SubAdmin,
            Role::Hr,
            Role::TeamLead,
            Role::Employee,
            Role::BusinessDevelopment,
        ];

        ALL
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|role| role.as_str() == value)
            .copied()
            .ok_or_else(|| AppError::Validation(format!("unknown role value '{value}'")))
    }
}

/// Returns the default permission set granted by a role.
///
/// This table is the single source of truth for role defaults; per-user
/// exceptions are layered on top as [`crate::PermissionOverride`] rows.
#[must_use]
pub fn role_default_permissions(role: Role) -> BTreeSet<Permission> {
    let permissions: &[Permission] = match role {
        Role::Admin => Permission::all(),
        Role::SubAdmin => &[
            Permission::DashboardView,
            Permission::AttendanceView,
            Permission::AttendanceManage,
            Permission::LeaveView,
            Permission::LeaveManage,
            Permission::LeaveApprove,
            Permission::PayrollView,
            Permission::PayrollManage,
            Permission::TaskView,
            Permission::TaskManage,
            Permission::TimesheetView,
            Permission::TimesheetManage,
            Permission::TimesheetApprove,
            Permission::LeadView,
            Permission::LeadManage,
            Permission::ClientView,
            Permission::ClientManage,
            Permission::TicketView,
            Permission::TicketManage,
            Permission::DirectoryView,
            Permission::DirectoryManage,
            Permission::SecurityAuditRead,
        ],
        Role::Hr => &[
            Permission::DashboardView,
            Permission::AttendanceView,
            Permission::AttendanceManage,
            Permission::LeaveView,
            Permission::LeaveManage,
            Permission::LeaveApprove,
            Permission::PayrollView,
            Permission::PayrollManage,
            Permission::TaskView,
            Permission::TimesheetView,
            Permission::TimesheetManage,
            Permission::TimesheetApprove,
            Permission::DirectoryView,
            Permission::DirectoryManage,
        ],
        Role::TeamLead => &[
            Permission::DashboardView,
            Permission::AttendanceView,
            Permission::LeaveView,
            Permission::LeaveApprove,
            Permission::TaskView,
            Permission::TaskManage,
            Permission::TimesheetView,
            Permission::TimesheetApprove,
            Permission::DirectoryView,
        ],
        Role::Employee => &[
            Permission::DashboardView,
            Permission::AttendanceView,
            Permission::LeaveView,
            Permission::TaskView,
            Permission::TimesheetView,
        ],
        Role::BusinessDevelopment => &[
            Permission::DashboardView,
            Permission::AttendanceView,
            Permission::LeaveView,
            Permission::TaskView,
            Permission::TimesheetView,
            Permission::LeadView,
            Permission::LeadManage,
            Permission::ClientView,
            Permission::ClientManage,
            Permission::TicketView,
            Permission::TicketManage,
        ],
    };

    permissions.iter().copied().collect()
}

/// Validates the static access tables at process start.
///
/// Detects drift between the permission catalog, the role default table,
/// and the navigation catalog. Runs once at boot; a failure is fatal and
/// must prevent the process from serving authorization decisions.
pub fn validate_access_tables() -> AppResult<()> {
    let full_catalog: BTreeSet<Permission> = Permission::all().iter().copied().collect();

    if role_default_permissions(Role::Admin) != full_catalog {
        return Err(AppError::Configuration(
            "admin role defaults must cover the full permission catalog".to_owned(),
        ));
    }

    for role in Role::all() {
        if role_default_permissions(*role).is_empty() {
            return Err(AppError::Configuration(format!(
                "role '{}' has an empty default permission set",
                role.as_str()
            )));
        }
    }

    for entry in navigation_catalog() {
        if entry.required_permissions().is_empty() {
            return Err(AppError::Configuration(format!(
                "navigation entry '{}' requires no permissions",
                entry.key()
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{Role, role_default_permissions, validate_access_tables};
    use crate::security::Permission;

    #[test]
    fn role_roundtrip_storage_value() {
        for role in Role::all() {
            assert_eq!(Role::from_str(role.as_str()).ok(), Some(*role));
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(Role::from_str("intern").is_err());
    }

    #[test]
    fn admin_defaults_cover_catalog() {
        let defaults = role_default_permissions(Role::Admin);
        for permission in Permission::all() {
            assert!(defaults.contains(permission), "{}", permission.as_str());
        }
    }

    #[test]
    fn sub_admin_cannot_manage_overrides_by_default() {
        let defaults = role_default_permissions(Role::SubAdmin);
        assert!(!defaults.contains(&Permission::SecurityOverrideManage));
        assert!(!defaults.contains(&Permission::SecurityTeamManage));
    }

    #[test]
    fn employee_defaults_are_view_only() {
        let defaults = role_default_permissions(Role::Employee);
        assert!(defaults.contains(&Permission::AttendanceView));
        assert!(!defaults.contains(&Permission::AttendanceManage));
        assert!(!defaults.contains(&Permission::PayrollView));
    }

    #[test]
    fn access_tables_are_consistent() {
        assert!(validate_access_tables().is_ok());
    }
}
