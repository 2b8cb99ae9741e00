use serde::{Deserialize, Serialize};
use stafflow_core::UserIdentity;
use stafflow_domain::{
    AttendanceRecord, ClientAccount, EmployeeProfile, HiringLead, LeaveRequest, NavEntry,
    PayrollEntry, PermissionOverride, SupportTicket, TaskItem, TeamMembership, Timesheet,
};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// API representation of the authenticated user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-identity-response.ts"
)]
pub struct UserIdentityResponse {
    pub subject: String,
    pub display_name: String,
    pub email: Option<String>,
}

impl From<UserIdentity> for UserIdentityResponse {
    fn from(value: UserIdentity) -> Self {
        Self {
            subject: value.subject().to_owned(),
            display_name: value.display_name().to_owned(),
            email: value.email().map(str::to_owned),
        }
    }
}

/// Incoming payload for password login.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/login-request.ts"
)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Incoming payload for first-run bootstrap.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bootstrap-request.ts"
)]
pub struct BootstrapRequest {
    pub token: String,
    pub display_name: String,
    pub email: String,
    pub password: String,
}

/// API representation of one navigation entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/nav-entry-response.ts"
)]
pub struct NavEntryResponse {
    pub key: String,
    pub label: String,
}

impl From<&NavEntry> for NavEntryResponse {
    fn from(value: &NavEntry) -> Self {
        Self {
            key: value.key().to_owned(),
            label: value.label().to_owned(),
        }
    }
}

/// Incoming payload for recording attendance.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/record-attendance-request.ts"
)]
pub struct RecordAttendanceRequest {
    pub owner_subject: Option<String>,
    pub work_date: String,
    pub clock_in: Option<String>,
    pub clock_out: Option<String>,
    pub status: String,
    pub note: Option<String>,
}

/// Incoming payload for editing attendance.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-attendance-request.ts"
)]
pub struct UpdateAttendanceRequest {
    pub clock_in: Option<String>,
    pub clock_out: Option<String>,
    pub status: String,
    pub note: Option<String>,
}

/// API representation of an attendance row.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/attendance-response.ts"
)]
pub struct AttendanceResponse {
    pub id: String,
    pub owner_subject: String,
    pub work_date: String,
    pub clock_in: Option<String>,
    pub clock_out: Option<String>,
    pub status: String,
    pub note: Option<String>,
}

impl From<AttendanceRecord> for AttendanceResponse {
    fn from(value: AttendanceRecord) -> Self {
        use stafflow_domain::OwnedRecord;

        Self {
            id: value.id().to_string(),
            owner_subject: value.owner_subject().to_owned(),
            work_date: value.work_date().to_string(),
            clock_in: value.clock_in().map(|time| time.to_string()),
            clock_out: value.clock_out().map(|time| time.to_string()),
            status: value.status().as_str().to_owned(),
            note: value.note().map(str::to_owned),
        }
    }
}

/// Incoming payload for submitting a leave request.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/submit-leave-request.ts"
)]
pub struct SubmitLeaveRequest {
    pub kind: String,
    pub start_date: String,
    pub end_date: String,
    pub reason: String,
}

/// Incoming payload for editing a pending leave request.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-leave-request.ts"
)]
pub struct UpdateLeaveRequest {
    pub kind: String,
    pub start_date: String,
    pub end_date: String,
    pub reason: String,
}

/// API representation of a leave request.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/leave-response.ts"
)]
pub struct LeaveResponse {
    pub id: String,
    pub owner_subject: String,
    pub kind: String,
    pub start_date: String,
    pub end_date: String,
    pub reason: String,
    pub status: String,
    pub decided_by: Option<String>,
    pub decided_at: Option<String>,
}

impl From<LeaveRequest> for LeaveResponse {
    fn from(value: LeaveRequest) -> Self {
        use stafflow_domain::OwnedRecord;

        Self {
            id: value.id().to_string(),
            owner_subject: value.owner_subject().to_owned(),
            kind: value.kind().as_str().to_owned(),
            start_date: value.start_date().to_string(),
            end_date: value.end_date().to_string(),
            reason: value.reason().to_owned(),
            status: value.status().as_str().to_owned(),
            decided_by: value.decided_by().map(str::to_owned),
            decided_at: value.decided_at().map(|at| at.to_rfc3339()),
        }
    }
}

/// Incoming payload for creating a payroll entry.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-payroll-request.ts"
)]
pub struct CreatePayrollRequest {
    pub owner_subject: String,
    pub year: i32,
    pub month: u32,
    pub base_pay_minor: i64,
    pub allowances_minor: i64,
    pub deductions_minor: i64,
}

/// Incoming payload for editing a payroll entry.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-payroll-request.ts"
)]
pub struct UpdatePayrollRequest {
    pub base_pay_minor: i64,
    pub allowances_minor: i64,
    pub deductions_minor: i64,
    pub status: String,
}

/// API representation of a payroll entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/payroll-response.ts"
)]
pub struct PayrollResponse {
    pub id: String,
    pub owner_subject: String,
    pub year: i32,
    pub month: u32,
    pub base_pay_minor: i64,
    pub allowances_minor: i64,
    pub deductions_minor: i64,
    pub net_pay_minor: i64,
    pub status: String,
}

impl From<PayrollEntry> for PayrollResponse {
    fn from(value: PayrollEntry) -> Self {
        use stafflow_domain::OwnedRecord;

        Self {
            id: value.id().to_string(),
            owner_subject: value.owner_subject().to_owned(),
            year: value.year(),
            month: value.month(),
            base_pay_minor: value.base_pay_minor(),
            allowances_minor: value.allowances_minor(),
            deductions_minor: value.deductions_minor(),
            net_pay_minor: value.net_pay_minor(),
            status: value.status().as_str().to_owned(),
        }
    }
}

/// Incoming payload for creating a task.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-task-request.ts"
)]
pub struct CreateTaskRequest {
    pub owner_subject: Option<String>,
    pub title: String,
    pub detail: Option<String>,
    pub due_date: Option<String>,
    pub priority: String,
}

/// Incoming payload for editing a task.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-task-request.ts"
)]
pub struct UpdateTaskRequest {
    pub title: String,
    pub detail: Option<String>,
    pub due_date: Option<String>,
    pub priority: String,
    pub status: String,
}

/// API representation of a task.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/task-response.ts"
)]
pub struct TaskResponse {
    pub id: String,
    pub owner_subject: String,
    pub title: String,
    pub detail: Option<String>,
    pub due_date: Option<String>,
    pub priority: String,
    pub status: String,
}

impl From<TaskItem> for TaskResponse {
    fn from(value: TaskItem) -> Self {
        use stafflow_domain::OwnedRecord;

        Self {
            id: value.id().to_string(),
            owner_subject: value.owner_subject().to_owned(),
            title: value.title().to_owned(),
            detail: value.detail().map(str::to_owned),
            due_date: value.due_date().map(|date| date.to_string()),
            priority: value.priority().as_str().to_owned(),
            status: value.status().as_str().to_owned(),
        }
    }
}

/// Incoming payload for submitting a timesheet entry.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/submit-timesheet-request.ts"
)]
pub struct SubmitTimesheetRequest {
    pub work_date: String,
    pub project: String,
    pub minutes: u32,
    pub note: Option<String>,
}

/// Incoming payload for editing a timesheet entry.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-timesheet-request.ts"
)]
pub struct UpdateTimesheetRequest {
    pub project: String,
    pub minutes: u32,
    pub note: Option<String>,
}

/// API representation of a timesheet entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/timesheet-response.ts"
)]
pub struct TimesheetResponse {
    pub id: String,
    pub owner_subject: String,
    pub work_date: String,
    pub project: String,
    pub minutes: u32,
    pub note: Option<String>,
    pub status: String,
    pub approved_by: Option<String>,
}

impl From<Timesheet> for TimesheetResponse {
    fn from(value: Timesheet) -> Self {
        use stafflow_domain::OwnedRecord;

        Self {
            id: value.id().to_string(),
            owner_subject: value.owner_subject().to_owned(),
            work_date: value.work_date().to_string(),
            project: value.project().to_owned(),
            minutes: value.minutes(),
            note: value.note().map(str::to_owned),
            status: value.status().as_str().to_owned(),
            approved_by: value.approved_by().map(str::to_owned),
        }
    }
}

/// Incoming payload for capturing a hiring lead.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-lead-request.ts"
)]
pub struct CreateLeadRequest {
    pub candidate_name: String,
    pub contact_email: String,
    pub source: Option<String>,
}

/// Incoming payload for moving a hiring lead.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-lead-request.ts"
)]
pub struct UpdateLeadRequest {
    pub stage: String,
}

/// API representation of a hiring lead.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/lead-response.ts"
)]
pub struct LeadResponse {
    pub id: String,
    pub owner_subject: String,
    pub candidate_name: String,
    pub contact_email: String,
    pub source: Option<String>,
    pub stage: String,
}

impl From<HiringLead> for LeadResponse {
    fn from(value: HiringLead) -> Self {
        use stafflow_domain::OwnedRecord;

        Self {
            id: value.id().to_string(),
            owner_subject: value.owner_subject().to_owned(),
            candidate_name: value.candidate_name().to_owned(),
            contact_email: value.contact_email().as_str().to_owned(),
            source: value.source().map(str::to_owned),
            stage: value.stage().as_str().to_owned(),
        }
    }
}

/// Incoming payload for creating a client account.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-client-request.ts"
)]
pub struct CreateClientRequest {
    pub company_name: String,
    pub contact_name: String,
    pub contact_email: String,
}

/// Incoming payload for editing a client account.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-client-request.ts"
)]
pub struct UpdateClientRequest {
    pub contact_name: String,
    pub contact_email: String,
    pub status: String,
}

/// API representation of a client account.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/client-response.ts"
)]
pub struct ClientResponse {
    pub id: String,
    pub owner_subject: String,
    pub company_name: String,
    pub contact_name: String,
    pub contact_email: String,
    pub status: String,
}

impl From<ClientAccount> for ClientResponse {
    fn from(value: ClientAccount) -> Self {
        use stafflow_domain::OwnedRecord;

        Self {
            id: value.id().to_string(),
            owner_subject: value.owner_subject().to_owned(),
            company_name: value.company_name().to_owned(),
            contact_name: value.contact_name().to_owned(),
            contact_email: value.contact_email().as_str().to_owned(),
            status: value.status().as_str().to_owned(),
        }
    }
}

/// Incoming payload for filing a support ticket.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-ticket-request.ts"
)]
pub struct CreateTicketRequest {
    pub client_id: String,
    pub subject_line: String,
    pub body: String,
    pub severity: String,
}

/// Incoming payload for editing a support ticket.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-ticket-request.ts"
)]
pub struct UpdateTicketRequest {
    pub severity: String,
    pub status: String,
    pub body: String,
}

/// API representation of a support ticket.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/ticket-response.ts"
)]
pub struct TicketResponse {
    pub id: String,
    pub owner_subject: String,
    pub client_id: String,
    pub subject_line: String,
    pub body: String,
    pub severity: String,
    pub status: String,
}

impl From<SupportTicket> for TicketResponse {
    fn from(value: SupportTicket) -> Self {
        use stafflow_domain::OwnedRecord;

        Self {
            id: value.id().to_string(),
            owner_subject: value.owner_subject().to_owned(),
            client_id: value.client_id().to_string(),
            subject_line: value.subject_line().to_owned(),
            body: value.body().to_owned(),
            severity: value.severity().as_str().to_owned(),
            status: value.status().as_str().to_owned(),
        }
    }
}

/// Incoming payload for creating an employee profile.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-profile-request.ts"
)]
pub struct CreateProfileRequest {
    pub display_name: String,
    pub email: String,
    pub role: String,
    pub team_id: Option<String>,
    pub password: String,
}

/// Incoming payload for changing an employee's role.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/change-role-request.ts"
)]
pub struct ChangeRoleRequest {
    pub role: String,
}

/// Incoming payload for changing an employee's team.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/change-team-request.ts"
)]
pub struct ChangeTeamRequest {
    pub team_id: Option<String>,
}

/// API representation of an employee profile.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/profile-response.ts"
)]
pub struct ProfileResponse {
    pub subject: String,
    pub display_name: String,
    pub email: String,
    pub role: String,
    pub team_id: Option<String>,
    pub active: bool,
}

impl From<EmployeeProfile> for ProfileResponse {
    fn from(value: EmployeeProfile) -> Self {
        Self {
            subject: value.subject().to_owned(),
            display_name: value.display_name().to_owned(),
            email: value.email().as_str().to_owned(),
            role: value.role().as_str().to_owned(),
            team_id: value.team_id().map(str::to_owned),
            active: value.is_active(),
        }
    }
}

/// Incoming payload for granting or revoking a permission override.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/upsert-override-request.ts"
)]
pub struct UpsertOverrideRequest {
    pub subject: String,
    pub permission: String,
    pub has_permission: bool,
}

/// Incoming payload for deleting a permission override.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/remove-override-request.ts"
)]
pub struct RemoveOverrideRequest {
    pub subject: String,
    pub permission: String,
}

/// API representation of a permission override.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/override-response.ts"
)]
pub struct OverrideResponse {
    pub subject: String,
    pub permission: String,
    pub has_permission: bool,
    pub written_at: String,
}

impl From<PermissionOverride> for OverrideResponse {
    fn from(value: PermissionOverride) -> Self {
        Self {
            subject: value.subject,
            permission: value.permission.as_str().to_owned(),
            has_permission: value.grant,
            written_at: value.written_at.to_rfc3339(),
        }
    }
}

/// Incoming payload for writing a team membership row.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/upsert-membership-request.ts"
)]
pub struct UpsertMembershipRequest {
    pub team_id: String,
    pub subject: String,
    pub team_role: String,
}

/// Incoming payload for deleting a team membership row.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/remove-membership-request.ts"
)]
pub struct RemoveMembershipRequest {
    pub team_id: String,
    pub subject: String,
}

/// API representation of a team membership row.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/membership-response.ts"
)]
pub struct MembershipResponse {
    pub team_id: String,
    pub subject: String,
    pub team_role: String,
}

impl From<TeamMembership> for MembershipResponse {
    fn from(value: TeamMembership) -> Self {
        Self {
            team_id: value.team_id,
            subject: value.subject,
            team_role: value.role.as_str().to_owned(),
        }
    }
}

/// API representation of an audit log entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/audit-log-entry-response.ts"
)]
pub struct AuditLogEntryResponse {
    pub event_id: String,
    pub subject: String,
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
    pub detail: Option<String>,
    pub created_at: String,
}

impl From<stafflow_application::AuditLogEntry> for AuditLogEntryResponse {
    fn from(value: stafflow_application::AuditLogEntry) -> Self {
        Self {
            event_id: value.event_id,
            subject: value.subject,
            action: value.action,
            resource_type: value.resource_type,
            resource_id: value.resource_id,
            detail: value.detail,
            created_at: value.created_at,
        }
    }
}
