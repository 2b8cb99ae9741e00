//! Employee profile types and validation rules.

use stafflow_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs basic structural validation: non-empty, contains exactly one
    /// `@`, local part and domain are non-empty, domain contains at least
    /// one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let parts: Vec<&str> = trimmed.splitn(2, '@').collect();
        if parts.len() != 2 {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        let local = parts[0];
        let domain = parts[1];

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if trimmed.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Stored profile for one employee, the record-store side of a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    subject: NonEmptyString,
    display_name: NonEmptyString,
    email: EmailAddress,
    role: Role,
    team_id: Option<String>,
    active: bool,
}

impl EmployeeProfile {
    /// Creates a validated employee profile.
    pub fn new(
        subject: impl Into<String>,
        display_name: impl Into<String>,
        email: EmailAddress,
        role: Role,
        team_id: Option<String>,
        active: bool,
    ) -> AppResult<Self> {
        let team_id = team_id.and_then(|value| {
            let trimmed = value.trim().to_owned();
            (!trimmed.is_empty()).then_some(trimmed)
        });

        Ok(Self {
            subject: NonEmptyString::new(subject)?,
            display_name: NonEmptyString::new(display_name)?,
            email,
            role,
            team_id,
            active,
        })
    }

    /// Returns the stable subject identifier.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the assigned role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the primary team, when assigned.
    #[must_use]
    pub fn team_id(&self) -> Option<&str> {
        self.team_id.as_deref()
    }

    /// Returns whether the profile may authenticate.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Replaces the assigned role.
    pub fn change_role(&mut self, role: Role) {
        self.role = role;
    }

    /// Replaces the primary team assignment.
    pub fn change_team(&mut self, team_id: Option<String>) {
        self.team_id = team_id.and_then(|value| {
            let trimmed = value.trim().to_owned();
            (!trimmed.is_empty()).then_some(trimmed)
        });
    }

    /// Deactivates the profile.
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::{EmailAddress, EmployeeProfile};
    use crate::role::Role;

    #[test]
    fn valid_email_is_accepted_and_lowercased() {
        let email = EmailAddress::new("USER@Example.COM");
        assert_eq!(email.map(|e| String::from(e)).ok().as_deref(), Some("user@example.com"));
    }

    #[test]
    fn email_without_at_is_rejected() {
        assert!(EmailAddress::new("noatsign").is_err());
    }

    #[test]
    fn email_without_domain_dot_is_rejected() {
        assert!(EmailAddress::new("user@nodot").is_err());
    }

    #[test]
    fn blank_team_assignment_is_normalized_to_none() {
        let email = EmailAddress::new("a@b.co");
        let Ok(email) = email else {
            panic!("fixture email must parse");
        };
        let profile = EmployeeProfile::new("u-1", "A", email, Role::Employee, Some("  ".to_owned()), true);
        assert_eq!(profile.ok().and_then(|p| p.team_id().map(str::to_owned)), None);
    }
}
