use std::collections::BTreeSet;

use crate::security::Permission;

/// One entry of the application navigation tree.
///
/// An entry is rendered when the caller holds any of its required
/// permissions; unauthorized entries are omitted entirely rather than
/// rendered disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavEntry {
    key: &'static str,
    label: &'static str,
    required: &'static [Permission],
}

impl NavEntry {
    /// Returns the stable navigation key.
    #[must_use]
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Returns the human-readable label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Returns the permissions that unlock this entry (OR semantics).
    #[must_use]
    pub fn required_permissions(&self) -> &'static [Permission] {
        self.required
    }
}

/// The full navigation catalog, ordered as rendered.
#[must_use]
pub fn navigation_catalog() -> &'static [NavEntry] {
    const CATALOG: &[NavEntry] = &[
        NavEntry {
            key: "dashboard",
            label: "Dashboard",
            required: &[Permission::DashboardView],
        },
        NavEntry {
            key: "attendance",
            label: "Attendance",
            required: &[Permission::AttendanceView, Permission::AttendanceManage],
        },
        NavEntry {
            key: "leave",
            label: "Leave",
            required: &[Permission::LeaveView, Permission::LeaveApprove],
        },
        NavEntry {
            key: "payroll",
            label: "Payroll",
            required: &[Permission::PayrollView, Permission::PayrollManage],
        },
        NavEntry {
            key: "tasks",
            label: "Tasks",
            required: &[Permission::TaskView, Permission::TaskManage],
        },
        NavEntry {
            key: "timesheets",
            label: "Timesheets",
            required: &[Permission::TimesheetView, Permission::TimesheetApprove],
        },
        NavEntry {
            key: "leads",
            label: "Hiring Leads",
            required: &[Permission::LeadView],
        },
        NavEntry {
            key: "clients",
            label: "Clients",
            required: &[Permission::ClientView],
        },
        NavEntry {
            key: "tickets",
            label: "Tickets",
            required: &[Permission::TicketView],
        },
        NavEntry {
            key: "directory",
            label: "Directory",
            required: &[Permission::DirectoryView],
        },
        NavEntry {
            key: "security",
            label: "Security",
            required: &[
                Permission::SecurityOverrideManage,
                Permission::SecurityTeamManage,
                Permission::SecurityAuditRead,
            ],
        },
    ];

    CATALOG
}

/// Filters the navigation catalog to the entries visible for an effective
/// permission set. Catalog order is preserved.
#[must_use]
pub fn visible_navigation(effective: &BTreeSet<Permission>) -> Vec<&'static NavEntry> {
    navigation_catalog()
        .iter()
        .filter(|entry| {
            entry
                .required
                .iter()
                .any(|permission| effective.contains(permission))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{navigation_catalog, visible_navigation};
    use crate::role::{Role, role_default_permissions};

    #[test]
    fn employee_navigation_omits_admin_surfaces() {
        let effective = role_default_permissions(Role::Employee);
        let keys: Vec<&str> = visible_navigation(&effective)
            .iter()
            .map(|entry| entry.key())
            .collect();

        assert!(keys.contains(&"dashboard"));
        assert!(keys.contains(&"attendance"));
        assert!(!keys.contains(&"payroll"));
        assert!(!keys.contains(&"security"));
    }

    #[test]
    fn admin_sees_every_entry() {
        let effective = role_default_permissions(Role::Admin);
        assert_eq!(
            visible_navigation(&effective).len(),
            navigation_catalog().len()
        );
    }

    #[test]
    fn business_development_sees_crm_entries() {
        let effective = role_default_permissions(Role::BusinessDevelopment);
        let keys: Vec<&str> = visible_navigation(&effective)
            .iter()
            .map(|entry| entry.key())
            .collect();

        assert!(keys.contains(&"leads"));
        assert!(keys.contains(&"clients"));
        assert!(keys.contains(&"tickets"));
        assert!(!keys.contains(&"directory"));
    }
}
