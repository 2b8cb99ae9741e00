use stafflow_application::{
    AccessService, AttendanceService, ClientService, DirectoryService, LeadService, LeaveService,
    NavigationService, PayrollService, SecurityAdminService, TaskService, TimesheetService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub access_service: AccessService,
    pub navigation_service: NavigationService,
    pub attendance_service: AttendanceService,
    pub leave_service: LeaveService,
    pub payroll_service: PayrollService,
    pub task_service: TaskService,
    pub timesheet_service: TimesheetService,
    pub lead_service: LeadService,
    pub client_service: ClientService,
    pub directory_service: DirectoryService,
    pub security_admin_service: SecurityAdminService,
    pub frontend_url: String,
    pub bootstrap_token: String,
}
