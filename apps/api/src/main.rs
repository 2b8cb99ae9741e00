//! Stafflow API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod auth;
mod dev_seed;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, post, put};
use sqlx::postgres::PgPoolOptions;
use stafflow_application::{
    AccessService, AttendanceService, ClientService, DirectoryService, LeadService, LeaveService,
    NavigationService, PayrollService, SecurityAdminService, TaskService, TimesheetService,
};
use stafflow_core::AppError;
use stafflow_domain::validate_access_tables;
use stafflow_infrastructure::{
    Argon2PasswordHasher, PostgresAccessRepository, PostgresAttendanceRepository,
    PostgresAuditRepository, PostgresCrmRepository, PostgresDirectoryRepository,
    PostgresLeadRepository, PostgresLeaveRepository, PostgresPayrollRepository,
    PostgresSecurityAdminRepository, PostgresTaskRepository, PostgresTimesheetRepository,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;

use crate::api_config::ApiConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    api_config::init_tracing();

    // The static access tables are validated before anything is served; a
    // drifted table is fatal at boot, not at first request.
    validate_access_tables()?;

    let config = ApiConfig::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let session_store = PostgresStore::new(pool.clone())
        .with_table_name("tower_sessions")
        .map_err(|error| {
            AppError::Validation(format!("invalid session table name configuration: {error}"))
        })?;
    session_store.migrate().await.map_err(|error| {
        AppError::Internal(format!("failed to initialize session store: {error}"))
    })?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(30)));

    let directory_repository = Arc::new(PostgresDirectoryRepository::new(pool.clone()));
    let access_repository = Arc::new(PostgresAccessRepository::new(pool.clone()));
    let audit_repository = Arc::new(PostgresAuditRepository::new(pool.clone()));
    let password_hasher = Arc::new(Argon2PasswordHasher::new());

    let access_service = AccessService::new(directory_repository.clone(), access_repository);

    let app_state = AppState {
        access_service: access_service.clone(),
        navigation_service: NavigationService::new(access_service.clone()),
        attendance_service: AttendanceService::new(
            Arc::new(PostgresAttendanceRepository::new(pool.clone())),
            access_service.clone(),
        ),
        leave_service: LeaveService::new(
            Arc::new(PostgresLeaveRepository::new(pool.clone())),
            access_service.clone(),
            audit_repository.clone(),
        ),
        payroll_service: PayrollService::new(
            Arc::new(PostgresPayrollRepository::new(pool.clone())),
            access_service.clone(),
            audit_repository.clone(),
        ),
        task_service: TaskService::new(
            Arc::new(PostgresTaskRepository::new(pool.clone())),
            access_service.clone(),
        ),
        timesheet_service: TimesheetService::new(
            Arc::new(PostgresTimesheetRepository::new(pool.clone())),
            access_service.clone(),
            audit_repository.clone(),
        ),
        lead_service: LeadService::new(
            Arc::new(PostgresLeadRepository::new(pool.clone())),
            access_service.clone(),
        ),
        client_service: ClientService::new(
            Arc::new(PostgresCrmRepository::new(pool.clone())),
            access_service.clone(),
        ),
        directory_service: DirectoryService::new(
            directory_repository,
            password_hasher,
            access_service.clone(),
            audit_repository.clone(),
        ),
        security_admin_service: SecurityAdminService::new(
            access_service,
            Arc::new(PostgresSecurityAdminRepository::new(pool.clone())),
            audit_repository.clone(),
            audit_repository,
        ),
        frontend_url: config.frontend_url.clone(),
        bootstrap_token: config.bootstrap_token.clone(),
    };

    if config.dev_seed {
        dev_seed::run(&app_state).await?;
    }

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route("/api/navigation", get(handlers::navigation::navigation_handler))
        .route(
            "/api/attendance",
            get(handlers::attendance::list_attendance_handler)
                .post(handlers::attendance::record_attendance_handler),
        )
        .route(
            "/api/attendance/{id}",
            put(handlers::attendance::update_attendance_handler)
                .delete(handlers::attendance::delete_attendance_handler),
        )
        .route(
            "/api/leave",
            get(handlers::leave::list_leave_handler).post(handlers::leave::submit_leave_handler),
        )
        .route("/api/leave/{id}", put(handlers::leave::update_leave_handler))
        .route(
            "/api/leave/{id}/approve",
            post(handlers::leave::approve_leave_handler),
        )
        .route(
            "/api/leave/{id}/reject",
            post(handlers::leave::reject_leave_handler),
        )
        .route(
            "/api/payroll",
            get(handlers::payroll::list_payroll_handler)
                .post(handlers::payroll::create_payroll_handler),
        )
        .route(
            "/api/payroll/{id}",
            put(handlers::payroll::update_payroll_handler),
        )
        .route(
            "/api/tasks",
            get(handlers::tasks::list_tasks_handler).post(handlers::tasks::create_task_handler),
        )
        .route(
            "/api/tasks/{id}",
            put(handlers::tasks::update_task_handler)
                .delete(handlers::tasks::delete_task_handler),
        )
        .route(
            "/api/timesheets",
            get(handlers::timesheets::list_timesheets_handler)
                .post(handlers::timesheets::submit_timesheet_handler),
        )
        .route(
            "/api/timesheets/{id}",
            put(handlers::timesheets::update_timesheet_handler),
        )
        .route(
            "/api/timesheets/{id}/approve",
            post(handlers::timesheets::approve_timesheet_handler),
        )
        .route(
            "/api/leads",
            get(handlers::leads::list_leads_handler).post(handlers::leads::create_lead_handler),
        )
        .route("/api/leads/{id}", put(handlers::leads::update_lead_handler))
        .route(
            "/api/clients",
            get(handlers::clients::list_clients_handler)
                .post(handlers::clients::create_client_handler),
        )
        .route(
            "/api/clients/{id}",
            put(handlers::clients::update_client_handler),
        )
        .route(
            "/api/tickets",
            get(handlers::tickets::list_tickets_handler)
                .post(handlers::tickets::create_ticket_handler),
        )
        .route(
            "/api/tickets/{id}",
            put(handlers::tickets::update_ticket_handler),
        )
        .route(
            "/api/directory",
            get(handlers::directory::list_directory_handler)
                .post(handlers::directory::create_profile_handler),
        )
        .route(
            "/api/directory/{subject}/role",
            put(handlers::directory::change_role_handler),
        )
        .route(
            "/api/directory/{subject}/team",
            put(handlers::directory::change_team_handler),
        )
        .route(
            "/api/directory/{subject}",
            delete(handlers::directory::deactivate_profile_handler),
        )
        .route(
            "/api/security/overrides",
            get(handlers::security::list_overrides_handler)
                .post(handlers::security::upsert_override_handler)
                .delete(handlers::security::remove_override_handler),
        )
        .route(
            "/api/security/teams",
            get(handlers::security::list_memberships_handler)
                .post(handlers::security::upsert_membership_handler)
                .delete(handlers::security::remove_membership_handler),
        )
        .route(
            "/api/security/audit-log",
            get(handlers::security::list_audit_log_handler),
        )
        .route_layer(from_fn(middleware::require_auth));

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&config.frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    let app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/bootstrap", post(auth::bootstrap_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state);

    let address = config.socket_address()?;

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "stafflow-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
