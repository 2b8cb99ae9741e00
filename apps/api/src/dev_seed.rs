//! Deterministic local demo data, enabled with `DEV_SEED=true`.

use stafflow_application::{
    CreateClientInput, CreateLeadInput, CreateProfileInput, RecordAttendanceInput,
    SubmitLeaveInput, SubmitTimesheetInput,
};
use stafflow_core::{AppError, AppResult, UserIdentity};
use stafflow_domain::{
    AttendanceStatus, LeaveKind, Role, TeamMembership, TeamRole,
};
use tracing::info;

use crate::state::AppState;

const SEED_ADMIN_EMAIL: &str = "admin@stafflow.local";
const SEED_PASSWORD: &str = "local-dev-password";
const SEED_TEAM_ID: &str = "core";

/// Seeds a small, readable org with one record per surface.
///
/// Runs once: a second invocation hits the bootstrap conflict and returns
/// without touching existing data.
pub async fn run(state: &AppState) -> AppResult<()> {
    let admin = match state
        .directory_service
        .bootstrap_admin("Dev Admin", SEED_ADMIN_EMAIL, SEED_PASSWORD)
        .await
    {
        Ok(identity) => identity,
        Err(AppError::Conflict(_)) => {
            info!("dev seed skipped: directory already populated");
            return Ok(());
        }
        Err(error) => return Err(error),
    };

    let hr = seed_profile(state, &admin, "Harriet Reyes", "hr@stafflow.local", Role::Hr).await?;
    let lead = seed_profile(
        state,
        &admin,
        "Lena Ortiz",
        "lead@stafflow.local",
        Role::TeamLead,
    )
    .await?;
    let employee = seed_profile(
        state,
        &admin,
        "Evan Park",
        "employee@stafflow.local",
        Role::Employee,
    )
    .await?;
    let biz_dev = seed_profile(
        state,
        &admin,
        "Bisi Adeyemi",
        "bd@stafflow.local",
        Role::BusinessDevelopment,
    )
    .await?;

    state
        .security_admin_service
        .upsert_membership(
            &admin,
            TeamMembership::new(SEED_TEAM_ID, lead.subject(), TeamRole::Lead),
        )
        .await?;
    state
        .security_admin_service
        .upsert_membership(
            &admin,
            TeamMembership::new(SEED_TEAM_ID, employee.subject(), TeamRole::Member),
        )
        .await?;

    state
        .attendance_service
        .record(
            &employee,
            RecordAttendanceInput {
                owner_subject: None,
                work_date: seed_date(2),
                clock_in: None,
                clock_out: None,
                status: AttendanceStatus::Present,
                note: None,
            },
        )
        .await?;

    state
        .leave_service
        .submit(
            &employee,
            SubmitLeaveInput {
                kind: LeaveKind::Casual,
                start_date: seed_date(10),
                end_date: seed_date(11),
                reason: "long weekend".to_owned(),
            },
        )
        .await?;

    state
        .timesheet_service
        .submit(
            &employee,
            SubmitTimesheetInput {
                work_date: seed_date(2),
                project: "internal-tools".to_owned(),
                minutes: 480,
                note: None,
            },
        )
        .await?;

    state
        .lead_service
        .create(
            &biz_dev,
            CreateLeadInput {
                candidate_name: "Jordan Blake".to_owned(),
                contact_email: "jordan.blake@example.com".to_owned(),
                source: Some("referral".to_owned()),
            },
        )
        .await?;

    state
        .client_service
        .create_client(
            &biz_dev,
            CreateClientInput {
                company_name: "Northgate Logistics".to_owned(),
                contact_name: "Sam Oduya".to_owned(),
                contact_email: "sam@northgate.example.com".to_owned(),
            },
        )
        .await?;

    info!(
        hr = hr.subject(),
        lead = lead.subject(),
        "dev seed complete; login with {SEED_ADMIN_EMAIL} / {SEED_PASSWORD}"
    );
    Ok(())
}

async fn seed_profile(
    state: &AppState,
    admin: &UserIdentity,
    display_name: &str,
    email: &str,
    role: Role,
) -> AppResult<UserIdentity> {
    let profile = state
        .directory_service
        .create(
            admin,
            CreateProfileInput {
                display_name: display_name.to_owned(),
                email: email.to_owned(),
                role,
                team_id: None,
                password: SEED_PASSWORD.to_owned(),
            },
        )
        .await?;

    Ok(UserIdentity::new(
        profile.subject(),
        profile.display_name(),
        Some(profile.email().as_str().to_owned()),
    ))
}

fn seed_date(day: u32) -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(2025, 6, day).unwrap_or_default()
}
