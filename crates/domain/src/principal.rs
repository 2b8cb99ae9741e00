use std::str::FromStr;

use stafflow_core::AppError;
use serde::{Deserialize, Serialize};

use crate::role::Role;

/// The resolved identity of the current actor.
///
/// Constructed fresh per authenticated request from the identity provider
/// plus the stored profile, and threaded explicitly through every call;
/// never held as process-global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    subject: String,
    display_name: String,
    role: Role,
    team_id: Option<String>,
}

impl Principal {
    /// Creates a principal. Well-formedness is checked at resolution time
    /// so that malformed input fails closed instead of panicking.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        display_name: impl Into<String>,
        role: Role,
        team_id: Option<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            display_name: display_name.into(),
            role,
            team_id,
        }
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

    /// Returns the principal's role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the primary team, when assigned.
    #[must_use]
    pub fn team_id(&self) -> Option<&str> {
        self.team_id.as_deref()
    }

    /// Returns whether the principal carries the fields every
    /// authorization decision requires.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.subject.trim().is_empty()
    }
}

/// Role of a user inside one team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    /// Leads the team; sees the records of every member.
    Lead,
    /// Regular member.
    Member,
}

impl TeamRole {
    /// Returns a stable storage value for this team role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Member => "member",
        }
    }
}

impl FromStr for TeamRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "lead" => Ok(Self::Lead),
            "member" => Ok(Self::Member),
            _ => Err(AppError::Validation(format!(
                "unknown team role value '{value}'"
            ))),
        }
    }
}

/// One row of the team membership relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMembership {
    /// Team identifier.
    pub team_id: String,
    /// Member subject.
    pub subject: String,
    /// Role inside the team.
    pub role: TeamRole,
}

impl TeamMembership {
    /// Creates a membership row.
    #[must_use]
    pub fn new(team_id: impl Into<String>, subject: impl Into<String>, role: TeamRole) -> Self {
        Self {
            team_id: team_id.into(),
            subject: subject.into(),
            role,
        }
    }
}
