use std::str::FromStr;

use stafflow_core::AppError;
use serde::{Deserialize, Serialize};

/// Permissions enforced by application policy checks.
///
/// The catalog is static configuration: it is defined once here, loaded at
/// startup, and never mutated at runtime.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Allows viewing the dashboard landing page.
    DashboardView,
    /// Allows viewing attendance records within the caller's visibility scope.
    AttendanceView,
    /// Allows creating and editing attendance records for other users.
    AttendanceManage,
    /// Allows viewing leave requests within the caller's visibility scope.
    LeaveView,
    /// Allows editing leave requests for other users.
    LeaveManage,
    /// Allows approving or rejecting leave requests.
    LeaveApprove,
    /// Allows viewing payroll entries within the caller's visibility scope.
    PayrollView,
    /// Allows creating and editing payroll entries.
    PayrollManage,
    /// Allows viewing tasks within the caller's visibility scope.
    TaskView,
    /// Allows creating and editing tasks for other users.
    TaskManage,
    /// Allows viewing timesheets within the caller's visibility scope.
    TimesheetView,
    /// Allows editing timesheets for other users.
    TimesheetManage,
    /// Allows approving submitted timesheets.
    TimesheetApprove,
    /// Allows viewing hiring leads.
    LeadView,
    /// Allows creating and editing hiring leads.
    LeadManage,
    /// Allows viewing client accounts.
    ClientView,
    /// Allows creating and editing client accounts.
    ClientManage,
    /// Allows viewing support tickets.
    TicketView,
    /// Allows creating and editing support tickets.
    TicketManage,
    /// Allows viewing the employee directory.
    DirectoryView,
    /// Allows managing employee profiles, roles, and team assignments.
    DirectoryManage,
    /// Allows granting and revoking per-user permission overrides.
    SecurityOverrideManage,
    /// Allows managing team membership rows.
    SecurityTeamManage,
    /// Allows reading the audit log.
    SecurityAuditRead,
}

impl Permission {
    /// Returns a stable storage value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DashboardView => "dashboard.view",
            Self::AttendanceView => "attendance.view",
            Self::AttendanceManage => "attendance.manage",
            Self::LeaveView => "leave.view",
            Self::LeaveManage => "leave.manage",
            Self::LeaveApprove => "leave.approve",
            Self::PayrollView => "payroll.view",
            Self::PayrollManage => "payroll.manage",
            Self::TaskView => "task.view",
            Self::TaskManage => "task.manage",
            Self::TimesheetView => "timesheet.view",
            Self::TimesheetManage => "timesheet.manage",
            Self::TimesheetApprove => "timesheet.approve",
            Self::LeadView => "lead.view",
            Self::LeadManage => "lead.manage",
            Self::ClientView => "client.view",
            Self::ClientManage => "client.manage",
            Self::TicketView => "ticket.view",
            Self::TicketManage => "ticket.manage",
            Self::DirectoryView => "directory.view",
            Self::DirectoryManage => "directory.manage",
            Self::SecurityOverrideManage => "security.override.manage",
            Self::SecurityTeamManage => "security.team.manage",
            Self::SecurityAuditRead => "security.audit.read",
        }
    }

    /// Returns all known permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Permission] = &[
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
            Permission::SecurityOverrideManage,
            Permission::SecurityTeamManage,
            Permission::SecurityAuditRead,
        ];

        ALL
    }

    /// Parses a transport value into a permission.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|permission| permission.as_str() == value)
            .copied()
            .ok_or_else(|| AppError::Validation(format!("unknown permission value '{value}'")))
    }
}

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a leave request is approved.
    LeaveApproved,
    /// Emitted when a leave request is rejected.
    LeaveRejected,
    /// Emitted when a payroll entry is created or edited.
    PayrollWritten,
    /// Emitted when a timesheet is approved.
    TimesheetApproved,
    /// Emitted when an employee profile is created.
    DirectoryProfileCreated,
    /// Emitted when an employee's role changes.
    DirectoryRoleChanged,
    /// Emitted when an employee's team assignment changes.
    DirectoryTeamChanged,
    /// Emitted when a permission override is granted or revoked.
    SecurityOverrideWritten,
    /// Emitted when a permission override row is deleted.
    SecurityOverrideRemoved,
    /// Emitted when a team membership row is written.
    SecurityTeamMembershipWritten,
    /// Emitted when a team membership row is removed.
    SecurityTeamMembershipRemoved,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeaveApproved => "leave.approved",
            Self::LeaveRejected => "leave.rejected",
            Self::PayrollWritten => "payroll.written",
            Self::TimesheetApproved => "timesheet.approved",
            Self::DirectoryProfileCreated => "directory.profile.created",
            Self::DirectoryRoleChanged => "directory.role.changed",
            Self::DirectoryTeamChanged => "directory.team.changed",
            Self::SecurityOverrideWritten => "security.override.written",
            Self::SecurityOverrideRemoved => "security.override.removed",
            Self::SecurityTeamMembershipWritten => "security.team_membership.written",
            Self::SecurityTeamMembershipRemoved => "security.team_membership.removed",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::Permission;

    #[test]
    fn permission_roundtrip_storage_value() {
        for permission in Permission::all() {
            let restored = Permission::from_str(permission.as_str());
            assert_eq!(restored.ok(), Some(*permission));
        }
    }

    #[test]
    fn unknown_permission_is_rejected() {
        let parsed = Permission::from_str("attendance.unknown");
        assert!(parsed.is_err());
    }

    #[test]
    fn storage_values_are_unique() {
        let mut values: Vec<&str> = Permission::all().iter().map(|p| p.as_str()).collect();
        values.sort_unstable();
        values.dedup();
        assert_eq!(values.len(), Permission::all().len());
    }
}
