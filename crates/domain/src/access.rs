//! Permission resolution and role-scoped record visibility.
//!
//! Every function here is a pure computation over its inputs and the static
//! tables in [`crate::role`]; there is no I/O, no shared mutable state, and
//! no caching. Callers fetch override and membership rows once per request
//! and pass them in as plain data. Malformed principals fail closed: zero
//! permissions, zero visible records, a warning in the log, never a panic.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::principal::{Principal, TeamMembership, TeamRole};
use crate::role::{Role, role_default_permissions};
use crate::security::Permission;

/// Per-user exception to the role default table.
///
/// Overrides are sparse and applied after role defaults; for the same
/// permission key the most recently written row wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOverride {
    /// Subject the exception applies to.
    pub subject: String,
    /// Permission being granted or revoked.
    pub permission: Permission,
    /// `true` adds the permission, `false` removes it.
    pub grant: bool,
    /// Write timestamp used for last-writer-wins ordering.
    pub written_at: DateTime<Utc>,
}

/// Classes of owned records, used where the visibility rule is
/// record-class-specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordClass {
    /// Attendance records.
    Attendance,
    /// Leave requests.
    Leave,
    /// Payroll entries.
    Payroll,
    /// Tasks.
    Task,
    /// Timesheets.
    Timesheet,
    /// Hiring leads.
    Lead,
    /// Client accounts.
    Client,
    /// Support tickets.
    Ticket,
}

impl RecordClass {
    /// Returns a stable storage value for this record class.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attendance => "attendance",
            Self::Leave => "leave",
            Self::Payroll => "payroll",
            Self::Task => "task",
            Self::Timesheet => "timesheet",
            Self::Lead => "lead",
            Self::Client => "client",
            Self::Ticket => "ticket",
        }
    }
}

/// A record with an owner, as seen by the visibility rules.
pub trait OwnedRecord {
    /// Subject of the owning user.
    fn owner_subject(&self) -> &str;

    /// Role of the owning user, when known.
    fn owner_role(&self) -> Option<Role>;
}

/// Computes the effective permission set for a principal.
///
/// Starts from the role default table, then applies every override whose
/// subject matches, ordered by write time so the most recently written
/// override wins per permission key. Returns a fresh set each call.
#[must_use]
pub fn effective_permissions(
    principal: &Principal,
    overrides: &[PermissionOverride],
) -> BTreeSet<Permission> {
    if !principal.is_well_formed() {
        warn!("refusing permission resolution for malformed principal");
        return BTreeSet::new();
    }

    let mut permissions = role_default_permissions(principal.role());

    let mut applicable: Vec<&PermissionOverride> = overrides
        .iter()
        .filter(|row| row.subject == principal.subject())
        .collect();
    applicable.sort_by_key(|row| row.written_at);

    for row in applicable {
        if row.grant {
            permissions.insert(row.permission);
        } else {
            permissions.remove(&row.permission);
        }
    }

    permissions
}

/// Returns whether the principal holds the given permission.
#[must_use]
pub fn has_permission(
    principal: &Principal,
    overrides: &[PermissionOverride],
    permission: Permission,
) -> bool {
    effective_permissions(principal, overrides).contains(&permission)
}

/// Returns whether the principal holds any of the given permissions.
///
/// OR semantics: matches the "view own / view team / view all" pattern
/// used for navigation entries.
#[must_use]
pub fn has_any_permission(
    principal: &Principal,
    overrides: &[PermissionOverride],
    permissions: &[Permission],
) -> bool {
    if permissions.is_empty() {
        return false;
    }

    let effective = effective_permissions(principal, overrides);
    permissions
        .iter()
        .any(|permission| effective.contains(permission))
}

/// Returns whether the principal may see a record of the given class.
#[must_use]
pub fn can_view(
    principal: &Principal,
    class: RecordClass,
    owner_subject: &str,
    owner_role: Option<Role>,
    memberships: &[TeamMembership],
) -> bool {
    if !principal.is_well_formed() {
        warn!("refusing visibility resolution for malformed principal");
        return false;
    }

    match principal.role() {
        Role::Admin => true,
        Role::SubAdmin => {
            // Sub-Admin never sees payroll of Admins.
            !(class == RecordClass::Payroll && owner_role == Some(Role::Admin))
        }
        Role::Hr => !matches!(owner_role, Some(Role::Admin) | Some(Role::SubAdmin)),
        Role::TeamLead => {
            owner_subject == principal.subject()
                || is_led_subordinate(principal, owner_subject, memberships)
        }
        Role::Employee | Role::BusinessDevelopment => owner_subject == principal.subject(),
    }
}

/// Returns whether the principal may mutate a record of the given class.
///
/// Same rule as [`can_view`] with one narrowing: Sub-Admin may only act on
/// leave and attendance records owned by Employees or Team Leads.
#[must_use]
pub fn can_mutate(
    principal: &Principal,
    class: RecordClass,
    owner_subject: &str,
    owner_role: Option<Role>,
    memberships: &[TeamMembership],
) -> bool {
    if !can_view(principal, class, owner_subject, owner_role, memberships) {
        return false;
    }

    if principal.role() == Role::SubAdmin
        && matches!(class, RecordClass::Leave | RecordClass::Attendance)
        && owner_subject != principal.subject()
    {
        return matches!(owner_role, Some(Role::Employee) | Some(Role::TeamLead));
    }

    true
}

/// Filters a record list down to what the principal may see.
///
/// A pure filter: input order is preserved and no record is ever invented.
#[must_use]
pub fn visible_records<R: OwnedRecord>(
    principal: &Principal,
    class: RecordClass,
    records: Vec<R>,
    memberships: &[TeamMembership],
) -> Vec<R> {
    records
        .into_iter()
        .filter(|record| {
            can_view(
                principal,
                class,
                record.owner_subject(),
                record.owner_role(),
                memberships,
            )
        })
        .collect()
}

/// Returns whether `owner_subject` belongs to a team led by the principal.
///
/// Resolves the teams where the principal holds the lead role, then checks
/// membership of the owner across the union of those teams.
fn is_led_subordinate(
    principal: &Principal,
    owner_subject: &str,
    memberships: &[TeamMembership],
) -> bool {
    let led_teams: BTreeSet<&str> = memberships
        .iter()
        .filter(|row| row.subject == principal.subject() && row.role == TeamRole::Lead)
        .map(|row| row.team_id.as_str())
        .collect();

    if led_teams.is_empty() {
        return false;
    }

    memberships
        .iter()
        .any(|row| row.subject == owner_subject && led_teams.contains(row.team_id.as_str()))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;

    use super::{
        OwnedRecord, PermissionOverride, RecordClass, can_mutate, can_view,
        effective_permissions, has_any_permission, has_permission, visible_records,
    };
    use crate::principal::{Principal, TeamMembership, TeamRole};
    use crate::role::Role;
    use crate::security::Permission;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct TestRecord {
        owner: String,
        role: Option<Role>,
    }

    impl TestRecord {
        fn new(owner: &str, role: Role) -> Self {
            Self {
                owner: owner.to_owned(),
                role: Some(role),
            }
        }
    }

    impl OwnedRecord for TestRecord {
        fn owner_subject(&self) -> &str {
            self.owner.as_str()
        }

        fn owner_role(&self) -> Option<Role> {
            self.role
        }
    }

    fn principal(subject: &str, role: Role) -> Principal {
        Principal::new(subject, subject, role, None)
    }

    fn override_row(subject: &str, permission: Permission, grant: bool) -> PermissionOverride {
        PermissionOverride {
            subject: subject.to_owned(),
            permission,
            grant,
            written_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).single().unwrap_or_default(),
        }
    }

    #[test]
    fn malformed_principal_has_no_permissions() {
        let malformed = principal("", Role::Admin);
        assert!(effective_permissions(&malformed, &[]).is_empty());
        for permission in Permission::all() {
            assert!(!has_permission(&malformed, &[], *permission));
        }
    }

    #[test]
    fn malformed_principal_sees_no_records() {
        let malformed = principal("  ", Role::Admin);
        let records = vec![TestRecord::new("u-emp-1", Role::Employee)];
        let visible = visible_records(&malformed, RecordClass::Task, records, &[]);
        assert!(visible.is_empty());
    }

    #[test]
    fn admin_defaults_grant_every_catalog_permission() {
        let admin = principal("u-admin-1", Role::Admin);
        for permission in Permission::all() {
            assert!(has_permission(&admin, &[], *permission));
        }
    }

    #[test]
    fn override_is_idempotent() {
        let employee = principal("u-emp-1", Role::Employee);
        let grant = override_row("u-emp-1", Permission::SecurityAuditRead, true);

        let once = effective_permissions(&employee, std::slice::from_ref(&grant));
        let twice = effective_permissions(&employee, &[grant.clone(), grant]);
        assert_eq!(once, twice);
    }

    #[test]
    fn revoke_override_removes_role_default() {
        let employee = principal("u-emp-1", Role::Employee);
        let other = principal("u-emp-2", Role::Employee);
        let revoke = override_row("u-emp-1", Permission::LeaveView, false);

        assert!(!has_permission(&employee, std::slice::from_ref(&revoke), Permission::LeaveView));
        // Other users with the same role keep the default.
        assert!(has_permission(&other, std::slice::from_ref(&revoke), Permission::LeaveView));
    }

    #[test]
    fn most_recent_override_wins_per_key() {
        let employee = principal("u-emp-1", Role::Employee);
        let mut grant = override_row("u-emp-1", Permission::PayrollView, true);
        let mut revoke = override_row("u-emp-1", Permission::PayrollView, false);
        revoke.written_at = grant.written_at + Duration::minutes(5);

        // Later revoke beats earlier grant regardless of slice order.
        let slices = [
            vec![grant.clone(), revoke.clone()],
            vec![revoke.clone(), grant.clone()],
        ];
        for rows in &slices {
            assert!(!has_permission(&employee, rows, Permission::PayrollView));
        }

        // Flip the timestamps and the grant wins.
        grant.written_at = revoke.written_at + Duration::minutes(5);
        assert!(has_permission(&employee, &[revoke, grant], Permission::PayrollView));
    }

    #[test]
    fn grant_override_adds_beyond_role_default() {
        let employee = principal("u-emp-1", Role::Employee);
        let grant = override_row("u-emp-1", Permission::SecurityAuditRead, true);

        assert!(has_permission(&employee, std::slice::from_ref(&grant), Permission::SecurityAuditRead));

        let other = principal("u-emp-2", Role::Employee);
        assert!(!has_permission(&other, std::slice::from_ref(&grant), Permission::SecurityAuditRead));
    }

    #[test]
    fn has_any_permission_uses_or_semantics() {
        let employee = principal("u-emp-1", Role::Employee);
        assert!(has_any_permission(
            &employee,
            &[],
            &[Permission::PayrollManage, Permission::AttendanceView],
        ));
        assert!(!has_any_permission(
            &employee,
            &[],
            &[Permission::PayrollManage, Permission::SecurityOverrideManage],
        ));
        assert!(!has_any_permission(&employee, &[], &[]));
    }

    #[test]
    fn hr_excludes_admin_and_sub_admin_owned_records() {
        let hr = principal("u-hr-1", Role::Hr);
        let records = vec![
            TestRecord::new("u-emp-1", Role::Employee),
            TestRecord::new("u-admin-1", Role::Admin),
            TestRecord::new("u-sub-1", Role::SubAdmin),
        ];

        let visible = visible_records(&hr, RecordClass::Attendance, records, &[]);
        assert_eq!(visible, vec![TestRecord::new("u-emp-1", Role::Employee)]);
    }

    #[test]
    fn team_lead_sees_exactly_led_members_and_self() {
        let lead = principal("u-tl-1", Role::TeamLead);
        let memberships = vec![
            TeamMembership::new("t1", "u-tl-1", TeamRole::Lead),
            TeamMembership::new("t1", "u-emp-2", TeamRole::Member),
        ];
        let records = vec![
            TestRecord::new("u-tl-1", Role::TeamLead),
            TestRecord::new("u-emp-2", Role::Employee),
            TestRecord::new("u-emp-3", Role::Employee),
        ];

        let visible = visible_records(&lead, RecordClass::Timesheet, records, &memberships);
        assert_eq!(
            visible,
            vec![
                TestRecord::new("u-tl-1", Role::TeamLead),
                TestRecord::new("u-emp-2", Role::Employee),
            ]
        );
    }

    #[test]
    fn team_lead_union_across_multiple_led_teams() {
        let lead = principal("u-tl-1", Role::TeamLead);
        let memberships = vec![
            TeamMembership::new("t1", "u-tl-1", TeamRole::Lead),
            TeamMembership::new("t1", "u-emp-1", TeamRole::Member),
            TeamMembership::new("t2", "u-tl-1", TeamRole::Lead),
            TeamMembership::new("t2", "u-emp-2", TeamRole::Member),
            TeamMembership::new("t3", "u-emp-3", TeamRole::Member),
        ];

        for owner in ["u-emp-1", "u-emp-2"] {
            assert!(can_view(&lead, RecordClass::Task, owner, Some(Role::Employee), &memberships));
        }
        assert!(!can_view(&lead, RecordClass::Task, "u-emp-3", Some(Role::Employee), &memberships));
    }

    #[test]
    fn member_but_not_lead_gets_no_team_scope() {
        let member = principal("u-emp-2", Role::TeamLead);
        let memberships = vec![
            TeamMembership::new("t1", "u-emp-2", TeamRole::Member),
            TeamMembership::new("t1", "u-emp-1", TeamRole::Member),
        ];

        assert!(!can_view(
            &member,
            RecordClass::Task,
            "u-emp-1",
            Some(Role::Employee),
            &memberships,
        ));
    }

    #[test]
    fn employee_sees_only_own_records() {
        let employee = principal("u-emp-1", Role::Employee);
        let records = vec![
            TestRecord::new("u-emp-1", Role::Employee),
            TestRecord::new("u-emp-2", Role::Employee),
        ];

        let visible = visible_records(&employee, RecordClass::Leave, records, &[]);
        assert_eq!(visible, vec![TestRecord::new("u-emp-1", Role::Employee)]);
    }

    #[test]
    fn sub_admin_cannot_see_admin_payroll() {
        let sub_admin = principal("u-sub-1", Role::SubAdmin);
        assert!(!can_view(
            &sub_admin,
            RecordClass::Payroll,
            "u-admin-1",
            Some(Role::Admin),
            &[],
        ));
        // Every other payroll row stays visible.
        assert!(can_view(
            &sub_admin,
            RecordClass::Payroll,
            "u-emp-1",
            Some(Role::Employee),
            &[],
        ));
        // And admin-owned records of other classes stay visible too.
        assert!(can_view(
            &sub_admin,
            RecordClass::Task,
            "u-admin-1",
            Some(Role::Admin),
            &[],
        ));
    }

    #[test]
    fn sub_admin_mutates_leave_only_for_employee_and_team_lead_owners() {
        let sub_admin = principal("u-sub-1", Role::SubAdmin);

        for class in [RecordClass::Leave, RecordClass::Attendance] {
            assert!(can_mutate(&sub_admin, class, "u-emp-1", Some(Role::Employee), &[]));
            assert!(can_mutate(&sub_admin, class, "u-tl-1", Some(Role::TeamLead), &[]));
            assert!(!can_mutate(&sub_admin, class, "u-hr-1", Some(Role::Hr), &[]));
            assert!(!can_mutate(&sub_admin, class, "u-bd-1", Some(Role::BusinessDevelopment), &[]));
            assert!(!can_mutate(&sub_admin, class, "u-admin-1", Some(Role::Admin), &[]));
            // Unknown owner role fails closed.
            assert!(!can_mutate(&sub_admin, class, "u-x", None, &[]));
        }

        // Own records stay mutable, and the narrowing is class-specific.
        assert!(can_mutate(&sub_admin, RecordClass::Leave, "u-sub-1", Some(Role::SubAdmin), &[]));
        assert!(can_mutate(&sub_admin, RecordClass::Task, "u-hr-1", Some(Role::Hr), &[]));
    }

    // Scenario 1 from the acceptance checklist: HR over a mixed record set.
    #[test]
    fn hr_visibility_scenario() {
        let hr = principal("u-hr-1", Role::Hr);
        let records = vec![
            TestRecord::new("u-emp-1", Role::Employee),
            TestRecord::new("u-admin-1", Role::Admin),
        ];
        let visible = visible_records(&hr, RecordClass::Attendance, records, &[]);
        assert_eq!(visible, vec![TestRecord::new("u-emp-1", Role::Employee)]);
    }

    // Scenario 3: an override grants one employee audit access without
    // widening any other employee's set.
    #[test]
    fn audit_override_scenario() {
        let granted = principal("u-emp-1", Role::Employee);
        let ungranted = principal("u-emp-2", Role::Employee);
        let rows = vec![override_row("u-emp-1", Permission::SecurityAuditRead, true)];

        assert!(has_permission(&granted, &rows, Permission::SecurityAuditRead));
        assert!(!has_permission(&ungranted, &rows, Permission::SecurityAuditRead));
    }

    proptest! {
        // Visibility partition: the filter never invents records, and for
        // own-scope roles every surviving record is owned by the caller.
        #[test]
        fn visibility_partition_property(
            owners in prop::collection::vec("u-[a-z]{1,4}", 0..24),
            caller in "u-[a-z]{1,4}",
        ) {
            let records: Vec<TestRecord> = owners
                .iter()
                .map(|owner| TestRecord::new(owner, Role::Employee))
                .collect();

            for role in [Role::Employee, Role::BusinessDevelopment] {
                let principal = Principal::new(caller.clone(), caller.clone(), role, None);
                let visible = visible_records(&principal, RecordClass::Task, records.clone(), &[]);

                prop_assert!(visible.len() <= records.len());
                for record in &visible {
                    prop_assert!(records.contains(record));
                    prop_assert_eq!(record.owner_subject(), caller.as_str());
                }
            }
        }

        // Applying the same override list twice never changes the result.
        #[test]
        fn effective_permissions_is_deterministic(
            grant_flags in prop::collection::vec(any::<bool>(), 0..8),
        ) {
            let subject = "u-emp-1";
            let employee = Principal::new(subject, subject, Role::Employee, None);
            let base = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).single().unwrap_or_default();
            let rows: Vec<PermissionOverride> = grant_flags
                .iter()
                .enumerate()
                .map(|(index, grant)| PermissionOverride {
                    subject: subject.to_owned(),
                    permission: Permission::SecurityAuditRead,
                    grant: *grant,
                    written_at: base + Duration::minutes(index as i64),
                })
                .collect();

            let first = effective_permissions(&employee, &rows);
            let second = effective_permissions(&employee, &rows);
            prop_assert_eq!(&first, &second);

            // Last writer wins for the contested key.
            let expected = grant_flags.last().copied().unwrap_or(false);
            prop_assert_eq!(first.contains(&Permission::SecurityAuditRead), expected);
        }
    }
}
