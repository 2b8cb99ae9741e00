//! Application services and ports.

#![forbid(unsafe_code)]

mod access_service;
mod attendance_service;
mod audit;
mod client_service;
mod directory_service;
mod lead_service;
mod leave_service;
mod navigation_service;
mod payroll_service;
mod security_admin_service;
mod task_service;
mod timesheet_service;

pub use access_service::{
    AccessContext, AccessRepository, AccessService, PrincipalRecord, PrincipalRepository,
};
pub use attendance_service::{
    AttendanceRepository, AttendanceService, RecordAttendanceInput, UpdateAttendanceInput,
};
pub use audit::{AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository};
pub use client_service::{
    ClientService, CreateClientInput, CreateTicketInput, CrmRepository, UpdateClientInput,
    UpdateTicketInput,
};
pub use directory_service::{
    CreateProfileInput, CredentialRecord, DirectoryRepository, DirectoryService, PasswordHasher,
};
pub use lead_service::{CreateLeadInput, LeadRepository, LeadService, UpdateLeadInput};
pub use leave_service::{LeaveRepository, LeaveService, SubmitLeaveInput, UpdateLeaveInput};
pub use navigation_service::NavigationService;
pub use payroll_service::{CreatePayrollInput, PayrollRepository, PayrollService, UpdatePayrollInput};
pub use security_admin_service::{
    SecurityAdminRepository, SecurityAdminService, UpsertOverrideInput,
};
pub use task_service::{CreateTaskInput, TaskRepository, TaskService, UpdateTaskInput};
pub use timesheet_service::{
    SubmitTimesheetInput, TimesheetRepository, TimesheetService, UpdateTimesheetInput,
};
