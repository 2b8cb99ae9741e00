//! Domain entities and the access-control core.

#![forbid(unsafe_code)]

mod access;
mod attendance;
mod client;
mod employee;
mod lead;
mod leave;
mod navigation;
mod payroll;
mod principal;
mod role;
mod security;
mod task;
mod timesheet;

pub use access::{
    OwnedRecord, PermissionOverride, RecordClass, can_mutate, can_view, effective_permissions,
    has_any_permission, has_permission, visible_records,
};
pub use attendance::{AttendanceRecord, AttendanceStatus};
pub use client::{
    ClientAccount, ClientStatus, SupportTicket, TicketSeverity, TicketStatus,
};
pub use employee::{EmailAddress, EmployeeProfile};
pub use lead::{HiringLead, LeadStage};
pub use leave::{LeaveKind, LeaveRequest, LeaveStatus};
pub use navigation::{NavEntry, navigation_catalog, visible_navigation};
pub use payroll::{PaymentStatus, PayrollEntry};
pub use principal::{Principal, TeamMembership, TeamRole};
pub use role::{Role, role_default_permissions, validate_access_tables};
pub use security::{AuditAction, Permission};
pub use task::{TaskItem, TaskPriority, TaskStatus};
pub use timesheet::{Timesheet, TimesheetStatus};
