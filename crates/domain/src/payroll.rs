use stafflow_core::{AppError, AppResult, RecordId};
use serde::{Deserialize, Serialize};

use crate::access::OwnedRecord;
use crate::role::Role;

/// Payment state of one payroll entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Not yet disbursed.
    Pending,
    /// Disbursed.
    Paid,
}

impl PaymentStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }

    /// Parses a storage value into a status.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            _ => Err(AppError::Validation(format!(
                "unknown payment status '{value}'"
            ))),
        }
    }
}

/// One payroll row for one user and month.
///
/// Amounts are opaque integers in minor currency units; computing them is
/// out of scope for this system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollEntry {
    id: RecordId,
    owner_subject: String,
    owner_role: Option<Role>,
    year: i32,
    month: u32,
    base_pay_minor: i64,
    allowances_minor: i64,
    deductions_minor: i64,
    status: PaymentStatus,
}

impl PayrollEntry {
    /// Creates a validated payroll entry.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: RecordId,
        owner_subject: impl Into<String>,
        owner_role: Option<Role>,
        year: i32,
        month: u32,
        base_pay_minor: i64,
        allowances_minor: i64,
        deductions_minor: i64,
        status: PaymentStatus,
    ) -> AppResult<Self> {
        let owner_subject = owner_subject.into();
        if owner_subject.trim().is_empty() {
            return Err(AppError::Validation(
                "payroll owner must not be empty".to_owned(),
            ));
        }

        if !(1..=12).contains(&month) {
            return Err(AppError::Validation(format!(
                "payroll month must be 1-12, got {month}"
            )));
        }

        if base_pay_minor < 0 || allowances_minor < 0 || deductions_minor < 0 {
            return Err(AppError::Validation(
                "payroll amounts must not be negative".to_owned(),
            ));
        }

        Ok(Self {
            id,
            owner_subject,
            owner_role,
            year,
            month,
            base_pay_minor,
            allowances_minor,
            deductions_minor,
            status,
        })
    }

    /// Returns the record identifier.
    #[must_use]
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Returns the payroll year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Returns the payroll month (1-12).
    #[must_use]
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Returns the base pay in minor units.
    #[must_use]
    pub fn base_pay_minor(&self) -> i64 {
        self.base_pay_minor
    }

    /// Returns the allowances in minor units.
    #[must_use]
    pub fn allowances_minor(&self) -> i64 {
        self.allowances_minor
    }

    /// Returns the deductions in minor units.
    #[must_use]
    pub fn deductions_minor(&self) -> i64 {
        self.deductions_minor
    }

    /// Returns the net pay in minor units.
    #[must_use]
    pub fn net_pay_minor(&self) -> i64 {
        self.base_pay_minor + self.allowances_minor - self.deductions_minor
    }

    /// Returns the payment status.
    #[must_use]
    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    /// Replaces the mutable portion of the entry.
    pub fn update(
        &mut self,
        base_pay_minor: i64,
        allowances_minor: i64,
        deductions_minor: i64,
        status: PaymentStatus,
    ) -> AppResult<()> {
        if base_pay_minor < 0 || allowances_minor < 0 || deductions_minor < 0 {
            return Err(AppError::Validation(
                "payroll amounts must not be negative".to_owned(),
            ));
        }

        self.base_pay_minor = base_pay_minor;
        self.allowances_minor = allowances_minor;
        self.deductions_minor = deductions_minor;
        self.status = status;
        Ok(())
    }
}

impl OwnedRecord for PayrollEntry {
    fn owner_subject(&self) -> &str {
        self.owner_subject.as_str()
    }

    fn owner_role(&self) -> Option<Role> {
        self.owner_role
    }
}

#[cfg(test)]
mod tests {
    use stafflow_core::RecordId;

    use super::{PaymentStatus, PayrollEntry};
    use crate::role::Role;

    #[test]
    fn month_out_of_range_is_rejected() {
        let entry = PayrollEntry::new(
            RecordId::new(),
            "u-emp-1",
            Some(Role::Employee),
            2025,
            13,
            100_000,
            0,
            0,
            PaymentStatus::Pending,
        );
        assert!(entry.is_err());
    }

    #[test]
    fn net_pay_sums_components() {
        let entry = PayrollEntry::new(
            RecordId::new(),
            "u-emp-1",
            Some(Role::Employee),
            2025,
            6,
            500_000,
            50_000,
            25_000,
            PaymentStatus::Paid,
        );
        assert_eq!(entry.ok().map(|e| e.net_pay_minor()), Some(525_000));
    }
}
