//! Infrastructure adapters: PostgreSQL repositories and password hashing.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod in_memory_directory_repository;
mod postgres_access_repository;
mod postgres_attendance_repository;
mod postgres_audit_repository;
mod postgres_crm_repository;
mod postgres_directory_repository;
mod postgres_lead_repository;
mod postgres_leave_repository;
mod postgres_payroll_repository;
mod postgres_security_admin_repository;
mod postgres_task_repository;
mod postgres_timesheet_repository;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use in_memory_directory_repository::InMemoryDirectoryRepository;
pub use postgres_access_repository::PostgresAccessRepository;
pub use postgres_attendance_repository::PostgresAttendanceRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_crm_repository::PostgresCrmRepository;
pub use postgres_directory_repository::PostgresDirectoryRepository;
pub use postgres_lead_repository::PostgresLeadRepository;
pub use postgres_leave_repository::PostgresLeaveRepository;
pub use postgres_payroll_repository::PostgresPayrollRepository;
pub use postgres_security_admin_repository::PostgresSecurityAdminRepository;
pub use postgres_task_repository::PostgresTaskRepository;
pub use postgres_timesheet_repository::PostgresTimesheetRepository;
